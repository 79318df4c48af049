use std::{collections::BTreeSet, time::Duration};

use crate::{
    config::SolverConfig,
    gauss::{GaussMatrix, GaussQueueData},
    status::Contradiction,
    xor::{Var, Xor},
};

/// Everything the matrix finder needs from the solver it runs inside of.
///
/// The finder never touches solver state other than through this trait, which
/// keeps the set of structures it mutates explicit: the XOR store, the matrix
/// registry, the per-matrix queues and the scratch marking array.
pub trait XorHost {
    fn num_vars(&self) -> usize;
    fn decision_level(&self) -> u32;
    /// Global consistency flag
    fn okay(&self) -> bool;
    fn config(&self) -> &SolverConfig;

    /// Move every stored XOR out of the solver, detaching it from propagation
    fn detach_xors(&mut self) -> Vec<Xor>;
    /// Store the given XORs and attach them as ordinary constraints. Returns the
    /// consistency flag afterwards.
    fn attach_xors(&mut self, xors: Vec<Xor>) -> bool;

    /// Remove assigned and replaced variables from the XORs
    fn clean_xors(&mut self, xors: &mut Vec<Xor>) -> Result<(), Contradiction>;
    /// Combine XORs with each other where that simplifies the set
    fn xor_together(&mut self, xors: &mut Vec<Xor>) -> Result<(), Contradiction>;
    fn set_clash_decision_vars(&mut self, vars: BTreeSet<Var>);

    /// Variable as the user numbers it -> outer variable, bva variables counted
    fn map_to_with_bva(&self, var: Var) -> Var;
    /// Outer variable -> representative of its equivalence class (outer)
    fn replaced_with_outer(&self, var: Var) -> Var;
    /// Outer numbering -> internal numbering
    fn map_outer_to_inter(&self, var: Var) -> Var;
    /// Level-0 value of an internal variable
    fn value(&self, var: Var) -> Option<bool>;

    /// Scratch marking array, one entry per variable. Must be all-clear
    /// whenever it's not borrowed.
    fn seen_mut(&mut self) -> &mut [bool];

    fn matrices(&self) -> &[GaussMatrix];
    fn push_matrix(&mut self, matrix: GaussMatrix);
    fn queue_data_mut(&mut self) -> &mut Vec<GaussQueueData>;

    fn verbosity(&self) -> u32 {
        self.config().verbosity
    }
    /// Diagnostic text. Only forwarded by the finder if `level <= verbosity`
    fn print(&mut self, text: &str);
    /// Named timing sample for the statistics sink. Does nothing by default
    fn record_time(&mut self, _name: &str, _elapsed: Duration) {}
}
