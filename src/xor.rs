//! XOR constraints as they are stored by the solver.

use itertools::Itertools;

/// Solver variable (0-based, internal numbering unless stated otherwise)
pub type Var = u32;

/// Which Gauss-Jordan matrix (if any) an XOR constraint has been placed into.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum MatrixTag {
    /// Constraint has not been looked at by the matrix finder yet
    #[default]
    Unassigned,
    /// Constraint is a row of the matrix with the given number
    Matrix(usize),
    /// Constraint was returned to the general pool and is not in any matrix
    NotInMatrix,
}

/// Parity constraint `vars[0] ^ vars[1] ^ ... = rhs`.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Xor {
    /// Support of the constraint. Kept sorted and duplicate-free after cleaning.
    pub vars: Vec<Var>,
    /// Right hand side parity
    pub rhs: bool,
    /// Variables that were eliminated when this XOR was produced by combining others
    pub clash_vars: Vec<Var>,
    /// Matrix membership
    pub in_matrix: MatrixTag,
}

impl Xor {
    pub fn new(vars: impl IntoIterator<Item = Var>, rhs: bool) -> Xor {
        Xor {
            vars: vars.into_iter().collect(),
            rhs,
            clash_vars: vec![],
            in_matrix: MatrixTag::Unassigned,
        }
    }

    pub fn with_clash_vars(mut self, clash_vars: impl IntoIterator<Item = Var>) -> Xor {
        self.clash_vars.extend(clash_vars);
        self
    }

    /// XOR with an empty support. Those carry no information once the parity
    /// has been checked (an odd empty XOR is a contradiction, not a trivial one).
    pub fn is_trivial(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Var> {
        self.vars.iter()
    }
}

impl std::ops::Index<usize> for Xor {
    type Output = Var;

    fn index(&self, index: usize) -> &Var {
        &self.vars[index]
    }
}

impl<'a> IntoIterator for &'a Xor {
    type Item = &'a Var;
    type IntoIter = std::slice::Iter<'a, Var>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.iter()
    }
}

impl std::fmt::Display for Xor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.vars.is_empty() {
            write!(f, "0")?;
        } else {
            write!(f, "{}", self.vars.iter().map(|var| format!("v{var}")).join(" ^ "))?;
        }
        write!(f, " = {}", u8::from(self.rhs))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Xor::new([1, 2, 7], true).to_string(), "v1 ^ v2 ^ v7 = 1");
        assert_eq!(Xor::new([], false).to_string(), "0 = 0");
    }

    #[test]
    fn test_trivial() {
        assert!(Xor::new([], false).is_trivial());
        assert!(!Xor::new([3], false).is_trivial());
        assert_eq!(Xor::new([4, 5], true)[1], 5);
    }
}
