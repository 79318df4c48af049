//! Gauss-Jordan matrix records created by the matrix finder.
//!
//! Elimination itself happens elsewhere; a `GaussMatrix` only owns the rows it
//! was built from and knows its column set.

use crate::xor::{MatrixTag, Var, Xor};
use itertools::Itertools;

pub struct GaussMatrix {
    matrix_no: usize,
    xors: Vec<Xor>,
    /// Sorted column variables
    cols: Vec<Var>,
}

impl GaussMatrix {
    /// Takes ownership of the rows and tags each of them with `matrix_no`
    pub fn new(matrix_no: usize, mut xors: Vec<Xor>) -> GaussMatrix {
        for xor in xors.iter_mut() {
            xor.in_matrix = MatrixTag::Matrix(matrix_no);
        }
        let cols = xors
            .iter()
            .flat_map(|xor| xor.iter().copied())
            .sorted_unstable()
            .dedup()
            .collect();
        GaussMatrix {
            matrix_no,
            xors,
            cols,
        }
    }

    pub fn matrix_no(&self) -> usize {
        self.matrix_no
    }

    pub fn xors(&self) -> &[Xor] {
        &self.xors
    }

    pub fn num_rows(&self) -> usize {
        self.xors.len()
    }

    pub fn num_cols(&self) -> usize {
        self.cols.len()
    }

    pub fn cols(&self) -> &[Var] {
        &self.cols
    }
}

impl std::fmt::Display for GaussMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "matrix #{} ({} x {})",
            self.matrix_no,
            self.num_rows(),
            self.num_cols()
        )?;
        write!(f, "{}", self.xors.iter().map(|xor| format!("  {xor}")).join("\n"))
    }
}

/// Per-matrix propagation queue. One entry per registered matrix.
#[derive(Clone, Debug, Default)]
pub struct GaussQueueData {
    /// Variables whose propagation is pending for this matrix
    pub pending: Vec<Var>,
    /// Matrix got disabled during search
    pub disabled: bool,
}

#[cfg(test)]
mod test {
    use super::*;
    use expect_test::expect;

    #[test]
    fn test_new_matrix_tags_rows() {
        let matrix = GaussMatrix::new(
            3,
            vec![Xor::new([4, 1], true), Xor::new([1, 2, 9], false)],
        );

        assert!(matrix
            .xors()
            .iter()
            .all(|xor| xor.in_matrix == MatrixTag::Matrix(3)));
        assert_eq!(matrix.cols(), &[1, 2, 4, 9]);

        let expected = expect![[r#"
            matrix #3 (2 x 4)
              v4 ^ v1 = 1
              v1 ^ v2 ^ v9 = 0"#]];
        expected.assert_eq(&matrix.to_string());
    }
}
