//! Decides which components become Gauss-Jordan matrices.
//!
//! The decision is an ordered list of rules. Each rule either passes or ends
//! evaluation with a verdict; a component that passes every rule is accepted.

use crate::{config::GaussConfig, finder::shape::ComponentShape};

/// Sampling coverage at which a component is turned into a matrix regardless
/// of its size
pub const SAMPLING_RATIO_THRESHOLD: f64 = 0.6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    NoRows,
    TooManyRows,
    TooManyColumns,
    TooFewRows,
    MatrixLimit,
    LowSamplingRatio,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    /// Accepted because it covers enough sampling variables
    AcceptBySampling,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_accepted(self) -> bool {
        matches!(self, Verdict::Accept | Verdict::AcceptBySampling)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Accept => write!(f, "accepted"),
            Verdict::AcceptBySampling => write!(f, "accepted (sampling ratio)"),
            Verdict::Reject(RejectReason::NoRows) => write!(f, "rejected (no rows)"),
            Verdict::Reject(RejectReason::TooManyRows) => write!(f, "rejected (too many rows)"),
            Verdict::Reject(RejectReason::TooManyColumns) => {
                write!(f, "rejected (too many columns)")
            }
            Verdict::Reject(RejectReason::TooFewRows) => write!(f, "rejected (too few rows)"),
            Verdict::Reject(RejectReason::MatrixLimit) => write!(f, "rejected (matrix limit)"),
            Verdict::Reject(RejectReason::LowSamplingRatio) => {
                write!(f, "rejected (sampling ratio)")
            }
        }
    }
}

/// What the policy gets to see about a component
pub(crate) struct Candidate<'a> {
    pub(crate) shape: &'a ComponentShape,
    /// `Some` iff sampling variables are configured
    pub(crate) ratio_sampling: Option<f64>,
    /// Matrices accepted before this component was looked at
    pub(crate) accepted_so_far: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rule {
    NoRows,
    SamplingOverride,
    MaxRows,
    MaxColumns,
    MinRows,
    MatrixLimit,
}

/// Evaluation order. The sampling override sits right after the empty check
/// as it supersedes every size and count rule.
const RULES: [Rule; 6] = [
    Rule::NoRows,
    Rule::SamplingOverride,
    Rule::MaxRows,
    Rule::MaxColumns,
    Rule::MinRows,
    Rule::MatrixLimit,
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AdmissionPolicy {
    pub(crate) max_rows: usize,
    pub(crate) max_columns: usize,
    pub(crate) min_rows: usize,
    pub(crate) max_num_matrices: usize,
}

impl AdmissionPolicy {
    /// `max_rows` is passed separately as it may be raised for the run
    pub(crate) fn new(conf: &GaussConfig, max_rows: usize) -> AdmissionPolicy {
        AdmissionPolicy {
            max_rows,
            max_columns: conf.max_matrix_columns,
            min_rows: conf.min_matrix_rows,
            max_num_matrices: conf.max_num_matrices,
        }
    }

    fn apply(&self, rule: Rule, candidate: &Candidate) -> Option<Verdict> {
        let shape = candidate.shape;
        let reject = |reason| Some(Verdict::Reject(reason));
        match rule {
            Rule::NoRows if shape.rows == 0 => reject(RejectReason::NoRows),
            Rule::SamplingOverride if shape.rows > self.min_rows => {
                let ratio = candidate.ratio_sampling?;
                if ratio >= SAMPLING_RATIO_THRESHOLD {
                    Some(Verdict::AcceptBySampling)
                } else {
                    reject(RejectReason::LowSamplingRatio)
                }
            }
            Rule::MaxRows if shape.rows > self.max_rows => reject(RejectReason::TooManyRows),
            Rule::MaxColumns if shape.cols > self.max_columns => {
                reject(RejectReason::TooManyColumns)
            }
            Rule::MinRows if shape.rows < self.min_rows => reject(RejectReason::TooFewRows),
            Rule::MatrixLimit if candidate.accepted_so_far >= self.max_num_matrices => {
                reject(RejectReason::MatrixLimit)
            }
            _ => None,
        }
    }

    pub(crate) fn decide(&self, candidate: &Candidate) -> Verdict {
        RULES
            .iter()
            .find_map(|rule| self.apply(*rule, candidate))
            .unwrap_or(Verdict::Accept)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn policy() -> AdmissionPolicy {
        AdmissionPolicy {
            max_rows: 10,
            max_columns: 20,
            min_rows: 3,
            max_num_matrices: 2,
        }
    }

    fn shape(rows: usize, cols: usize) -> ComponentShape {
        ComponentShape {
            id: 0,
            rows,
            cols,
            sum_xor_sizes: rows * 2,
            density: 0.5,
        }
    }

    fn decide(
        shape: &ComponentShape,
        ratio_sampling: Option<f64>,
        accepted_so_far: usize,
    ) -> Verdict {
        policy().decide(&Candidate {
            shape,
            ratio_sampling,
            accepted_so_far,
        })
    }

    #[test]
    fn test_size_rules() {
        assert_eq!(decide(&shape(5, 5), None, 0), Verdict::Accept);
        assert_eq!(
            decide(&shape(0, 0), None, 0),
            Verdict::Reject(RejectReason::NoRows)
        );
        assert_eq!(
            decide(&shape(11, 5), None, 0),
            Verdict::Reject(RejectReason::TooManyRows)
        );
        assert_eq!(
            decide(&shape(5, 21), None, 0),
            Verdict::Reject(RejectReason::TooManyColumns)
        );
        // Rows are checked before columns
        assert_eq!(
            decide(&shape(11, 21), None, 0),
            Verdict::Reject(RejectReason::TooManyRows)
        );
        assert_eq!(
            decide(&shape(2, 2), None, 0),
            Verdict::Reject(RejectReason::TooFewRows)
        );
        // Boundaries are inclusive
        assert_eq!(decide(&shape(10, 20), None, 0), Verdict::Accept);
        assert_eq!(decide(&shape(3, 3), None, 0), Verdict::Accept);
    }

    #[test]
    fn test_matrix_limit() {
        assert_eq!(decide(&shape(5, 5), None, 1), Verdict::Accept);
        assert_eq!(
            decide(&shape(5, 5), None, 2),
            Verdict::Reject(RejectReason::MatrixLimit)
        );
        // Size rejections are reported first
        assert_eq!(
            decide(&shape(50, 5), None, 2),
            Verdict::Reject(RejectReason::TooManyRows)
        );
    }

    #[test]
    fn test_sampling_override() {
        // Overrides row, column and count limits
        assert_eq!(decide(&shape(50, 50), Some(0.6), 7), Verdict::AcceptBySampling);
        assert_eq!(decide(&shape(5, 5), Some(1.0), 0), Verdict::AcceptBySampling);
        // And rejects components that would otherwise be fine
        assert_eq!(
            decide(&shape(5, 5), Some(0.59), 0),
            Verdict::Reject(RejectReason::LowSamplingRatio)
        );
    }

    #[test]
    fn test_sampling_override_needs_more_than_min_rows() {
        // rows == min_rows, the override doesn't apply and the ratio is ignored
        assert_eq!(decide(&shape(3, 3), Some(0.0), 0), Verdict::Accept);
        assert_eq!(
            decide(&shape(2, 3), Some(1.0), 0),
            Verdict::Reject(RejectReason::TooFewRows)
        );
        assert_eq!(
            decide(&shape(0, 0), Some(1.0), 0),
            Verdict::Reject(RejectReason::NoRows)
        );
    }
}
