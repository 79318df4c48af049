//! Matrix finder: groups the solver's XOR constraints into independent
//! Gauss-Jordan matrices.
//!
//! A run goes through these steps, each feeding the next:
//!
//! 1) All XORs are detached from the solver, cleaned and combined. A
//!    contradiction found here ends the run with `Err`.
//!
//! 2) Short-circuits: too few XORs, too many XORs while sampling variables
//!    are set, or matrix finding switched off. The XORs go back to the solver
//!    untouched.
//!
//! 3) Variables are partitioned into connected components (see [`partition`]),
//!    and each component gets its shape computed and a priority (see [`shape`]).
//!
//! 4) Components are offered to the admission policy (see [`admission`]) in
//!    priority order. Accepted ones become matrices, numbered from 0 in that
//!    order. XORs of rejected ones are tagged as not being in a matrix and
//!    reattached to the solver. Trivial XORs are dropped.

pub(crate) mod admission;
pub(crate) mod host;
pub(crate) mod marks;
pub(crate) mod partition;
pub(crate) mod sampling;
pub(crate) mod shape;

use std::{
    collections::BTreeSet,
    time::{Duration, Instant},
};

use crate::{
    gauss::GaussMatrix,
    status::Contradiction,
    xor::{MatrixTag, Xor},
};
use admission::{AdmissionPolicy, Candidate};
use partition::Partition;
use sampling::SamplingSet;
use shape::Component;

pub use admission::{RejectReason, Verdict, SAMPLING_RATIO_THRESHOLD};
pub use host::XorHost;
pub use shape::ComponentShape;

/// At most this many unused matrices are described in the log
const MAX_UNUSED_PRINTED: usize = 10;

/// Why a run did not look for matrices at all
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    TooFewXors,
    TooManyXorsForSampling,
    Disabled,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::TooFewXors => write!(f, "too few xors"),
            SkipReason::TooManyXorsForSampling => write!(f, "too many xors for sampling"),
            SkipReason::Disabled => write!(f, "disabled"),
        }
    }
}

/// What happened to a single component
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentDecision {
    pub shape: ComponentShape,
    /// Set iff sampling variables are configured
    pub ratio_sampling: Option<f64>,
    pub verdict: Verdict,
    /// Number of the matrix built from the component, if any
    pub matrix_no: Option<usize>,
}

/// Outcome of a successful run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FindReport {
    /// At least one matrix was built
    pub matrix_created: bool,
    pub num_matrices: usize,
    /// XORs left after cleaning and combining, trivial ones included
    pub num_xors: usize,
    pub skipped: Option<SkipReason>,
    /// In priority order
    pub decisions: Vec<ComponentDecision>,
    pub unused_matrices: usize,
    pub too_few_rows: usize,
    pub elapsed: Duration,
}

impl std::fmt::Display for FindReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(reason) = self.skipped {
            return write!(f, "xors: {}, skipped: {reason}", self.num_xors);
        }
        write!(
            f,
            "xors: {}, matrices: {}, unused: {} (too few rows: {})",
            self.num_xors, self.num_matrices, self.unused_matrices, self.too_few_rows
        )?;
        for decision in self.decisions.iter() {
            let shape = &decision.shape;
            write!(
                f,
                "\n#{}: {} x {}, density {:.4}",
                shape.id, shape.rows, shape.cols, shape.density
            )?;
            if let Some(ratio) = decision.ratio_sampling {
                write!(f, ", sampling {:.1}%", ratio * 100.0)?;
            }
            write!(f, ", {}", decision.verdict)?;
            if let Some(matrix_no) = decision.matrix_no {
                write!(f, " -> matrix {matrix_no}")?;
            }
        }
        Ok(())
    }
}

pub struct MatrixFinder<'a, H: XorHost + ?Sized> {
    host: &'a mut H,
}

impl<'a, H: XorHost + ?Sized> MatrixFinder<'a, H> {
    pub fn new(host: &'a mut H) -> Self {
        MatrixFinder { host }
    }

    fn verb_print(&mut self, level: u32, text: &str) {
        if self.host.verbosity() >= level {
            self.host.print(text);
        }
    }

    fn reattach(&mut self, xors: Vec<Xor>) -> Result<(), Contradiction> {
        if self.host.attach_xors(xors) {
            Ok(())
        } else {
            Err(Contradiction::new("inconsistent XOR found while reattaching"))
        }
    }

    fn has_sampling_vars(&self) -> bool {
        self.host.config().sampling_vars.is_some()
    }

    fn skip_reason(&mut self, xors: &[Xor]) -> Option<SkipReason> {
        let conf = &self.host.config().gauss;
        let (min_xors, max_xors, enabled) = (
            conf.min_gauss_xor_clauses,
            conf.max_gauss_xor_clauses,
            conf.do_matrix_find,
        );

        let non_trivial = xors.iter().filter(|xor| !xor.is_trivial()).count();
        if non_trivial < min_xors {
            self.verb_print(
                4,
                &format!("[matrix] too few xor clauses for GJ: {non_trivial}"),
            );
            return Some(SkipReason::TooFewXors);
        }
        if xors.len() > max_xors && self.has_sampling_vars() {
            self.verb_print(
                1,
                "WARNING sampling vars have been given but there are too many XORs \
                 and it would take too much time to put them into matrices. Skipping!",
            );
            return Some(SkipReason::TooManyXorsForSampling);
        }
        if !enabled {
            self.verb_print(
                1,
                "Matrix finding disabled through switch. Not using matrices",
            );
            return Some(SkipReason::Disabled);
        }
        None
    }

    /// Row limit for this run. Sampling variables need room for at least three
    /// rows each.
    fn effective_max_rows(&mut self, sampling: Option<&SamplingSet>) -> usize {
        let max_rows = self.host.config().gauss.max_matrix_rows;
        let Some(sampling) = sampling else {
            return max_rows;
        };
        let size_at_least = sampling.len() * 3;
        if max_rows < size_at_least {
            self.verb_print(
                1,
                &format!("[matrix] incrementing max number of rows to {size_at_least}"),
            );
            size_at_least
        } else {
            max_rows
        }
    }

    /// Puts the host's XORs into matrices. XORs that don't end up in a
    /// matrix are reattached to the host.
    ///
    /// Must be called at decision level 0, on a consistent solver without
    /// matrices.
    pub fn find_matrices(&mut self) -> Result<FindReport, Contradiction> {
        assert_eq!(self.host.decision_level(), 0);
        assert!(self.host.okay());
        assert!(self.host.matrices().is_empty());

        let start = Instant::now();
        let mut xors = self.host.detach_xors();
        self.host.clean_xors(&mut xors)?;
        self.host.xor_together(&mut xors)?;

        let clash_vars = xors
            .iter()
            .flat_map(|xor| xor.clash_vars.iter().copied())
            .collect::<BTreeSet<_>>();
        self.host.set_clash_decision_vars(clash_vars);

        let mut report = FindReport {
            num_xors: xors.len(),
            ..Default::default()
        };

        if let Some(reason) = self.skip_reason(&xors) {
            report.skipped = Some(reason);
            self.host.queue_data_mut().clear();
            self.reattach(xors)?;
            report.elapsed = start.elapsed();
            return Ok(report);
        }

        let sampling = SamplingSet::resolve(&*self.host);
        let max_rows = self.effective_max_rows(sampling.as_ref());
        let policy = AdmissionPolicy::new(&self.host.config().gauss, max_rows);

        let partition = Partition::from_xors(self.host.num_vars(), &xors);
        let components = shape::evaluate(&partition, xors);

        let mut pool = vec![];
        let mut unused_printed = 0;
        for Component { shape, xors } in components {
            let ratio_sampling = sampling.as_ref().map(|sampling| {
                let members = partition.members(shape.id).unwrap_or_default();
                sampling.ratio(members, self.host.seen_mut())
            });

            let verdict = policy.decide(&Candidate {
                shape: &shape,
                ratio_sampling,
                accepted_so_far: report.num_matrices,
            });
            if verdict == Verdict::Reject(RejectReason::NoRows) {
                continue;
            }
            self.explain(&shape, ratio_sampling, verdict);

            let matrix_no = if verdict.is_accepted() {
                let matrix_no = report.num_matrices;
                self.host.push_matrix(GaussMatrix::new(matrix_no, xors));
                let num_matrices = self.host.matrices().len();
                self.host
                    .queue_data_mut()
                    .resize_with(num_matrices, Default::default);
                report.num_matrices += 1;
                debug_assert_eq!(num_matrices, report.num_matrices);
                Some(matrix_no)
            } else {
                pool.extend(xors.into_iter().map(|mut xor| {
                    xor.in_matrix = MatrixTag::NotInMatrix;
                    xor
                }));
                report.unused_matrices += 1;
                if verdict == Verdict::Reject(RejectReason::TooFewRows) {
                    report.too_few_rows += 1;
                }
                None
            };

            let decision = ComponentDecision {
                shape,
                ratio_sampling,
                verdict,
                matrix_no,
            };
            self.print_decision(&decision, &mut unused_printed);
            report.decisions.push(decision);
        }
        // Entries left over from earlier runs go away even if nothing was accepted
        let num_matrices = self.host.matrices().len();
        self.host
            .queue_data_mut()
            .resize_with(num_matrices, Default::default);
        self.reattach(pool)?;

        if report.unused_matrices > 0 {
            self.verb_print(
                1,
                &format!(
                    "[matrix] unused matrices: {} of which too few rows: {}",
                    report.unused_matrices, report.too_few_rows
                ),
            );
        }

        report.matrix_created = report.num_matrices > 0;
        report.elapsed = start.elapsed();
        self.verb_print(
            1,
            &format!(
                "[matrix] Using {} matrices recovered from {} xors T: {:.2}",
                report.num_matrices,
                report.num_xors,
                report.elapsed.as_secs_f64()
            ),
        );
        self.host.record_time("matrix find", report.elapsed);
        Ok(report)
    }

    /// Log lines for the rule that fired
    fn explain(&mut self, shape: &ComponentShape, ratio_sampling: Option<f64>, verdict: Verdict) {
        let min_rows = self.host.config().gauss.min_matrix_rows;
        if let Some(ratio) = ratio_sampling.filter(|_| shape.rows > min_rows) {
            self.verb_print(2, &format!("[matrix] ratio_sampling: {ratio}"));
        }
        match verdict {
            Verdict::AcceptBySampling => {
                self.verb_print(1, "[matrix] sampling ratio good -> set usage to YES")
            }
            Verdict::Reject(RejectReason::LowSamplingRatio) => {
                self.verb_print(2, "[matrix] sampling ratio bad -> set usage to NO")
            }
            Verdict::Reject(RejectReason::TooManyRows) => self.verb_print(
                1,
                &format!(
                    "[matrix] Too many rows in matrix: {} -> set usage to NO",
                    shape.rows
                ),
            ),
            Verdict::Reject(RejectReason::TooManyColumns) => self.verb_print(
                1,
                &format!(
                    "[matrix] Too many columns in matrix: {} -> set usage to NO",
                    shape.cols
                ),
            ),
            Verdict::Reject(RejectReason::TooFewRows) => self.verb_print(
                2,
                &format!(
                    "[matrix] Too few rows in matrix: {} -> set usage to NO",
                    shape.rows
                ),
            ),
            Verdict::Reject(RejectReason::MatrixLimit) => self.verb_print(
                3,
                "[matrix] above max number of matrixes -> set usage to NO",
            ),
            Verdict::Accept | Verdict::Reject(RejectReason::NoRows) => {}
        }
    }

    /// One line per matrix. Unused small matrices are only shown at higher
    /// verbosity, and only the first few unused ones at all.
    fn print_decision(&mut self, decision: &ComponentDecision, unused_printed: &mut usize) {
        let verbosity = self.host.verbosity();
        if verbosity == 0 {
            return;
        }
        let shape = &decision.shape;
        let min_rows = self.host.config().gauss.min_matrix_rows;

        let prefix = match decision.matrix_no {
            Some(matrix_no) => format!("Good   matrix {matrix_no:>2}"),
            None => {
                let too_small = shape.rows < min_rows && verbosity < 2;
                if too_small || *unused_printed >= MAX_UNUSED_PRINTED {
                    return;
                }
                *unused_printed += 1;
                "UNused matrix   ".to_owned()
            }
        };

        let sampling = decision
            .ratio_sampling
            .map(|ratio| format!("  perc of sampl vars: {:>5.3} %", ratio * 100.0))
            .unwrap_or_default();
        self.host.print(&format!(
            "[matrix] {prefix} {:>7} x{:>5}  density:{:>5.4}  xorlen avg: {:>5.2}{sampling}",
            shape.rows,
            shape.cols,
            shape.density,
            shape.avg_xor_size()
        ));
    }
}
