use crate::xor::Var;

/// Knobs controlling when and how XORs are grouped into Gauss-Jordan matrices
#[derive(Clone, Debug, PartialEq)]
pub struct GaussConfig {
    /// Master switch for matrix finding
    pub do_matrix_find: bool,
    /// Don't bother with matrices if there are fewer non-trivial XORs than this
    pub min_gauss_xor_clauses: usize,
    /// Partitioning is skipped above this many XORs when sampling variables are given
    pub max_gauss_xor_clauses: usize,
    pub max_matrix_rows: usize,
    pub max_matrix_columns: usize,
    pub min_matrix_rows: usize,
    pub max_num_matrices: usize,
}

impl Default for GaussConfig {
    fn default() -> Self {
        Self {
            do_matrix_find: true,
            min_gauss_xor_clauses: 2,
            max_gauss_xor_clauses: 500_000,
            max_matrix_rows: 3000,
            max_matrix_columns: 1000,
            min_matrix_rows: 3,
            max_num_matrices: 5,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolverConfig {
    pub gauss: GaussConfig,
    /// Externally numbered (outer, pre-bva) variables the user cares about
    pub sampling_vars: Option<Vec<Var>>,
    /// 0 is silent
    pub verbosity: u32,
}
