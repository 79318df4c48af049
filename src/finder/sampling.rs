//! Coverage of the user's sampling variables by a component.

use crate::{
    finder::{host::XorHost, marks::Marks},
    xor::Var,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Resolved {
    /// Has a value at level 0, counts as covered by every component
    Assigned,
    /// Unassigned internal variable
    Inner(Var),
    /// Maps outside of the solver's variables
    Unknown,
}

/// Sampling variables translated to internal numbering once per run
pub(crate) struct SamplingSet {
    resolved: Vec<Resolved>,
}

impl SamplingSet {
    /// `None` if no sampling set is configured. An empty set still counts as
    /// configured.
    pub(crate) fn resolve<H: XorHost + ?Sized>(host: &H) -> Option<SamplingSet> {
        let sampling_vars = host.config().sampling_vars.as_ref()?;
        let resolved = sampling_vars
            .iter()
            .map(|&outside_var| {
                let outer_var = host.map_to_with_bva(outside_var);
                let outer_var = host.replaced_with_outer(outer_var);
                let int_var = host.map_outer_to_inter(outer_var);
                if int_var as usize >= host.num_vars() {
                    Resolved::Unknown
                } else if host.value(int_var).is_some() {
                    Resolved::Assigned
                } else {
                    Resolved::Inner(int_var)
                }
            })
            .collect();
        Some(SamplingSet { resolved })
    }

    pub(crate) fn len(&self) -> usize {
        self.resolved.len()
    }

    /// Fraction of sampling variables that are assigned or among `members`,
    /// 0 for an empty sampling set
    pub(crate) fn ratio(&self, members: &[Var], seen: &mut [bool]) -> f64 {
        if self.resolved.is_empty() {
            return 0.0;
        }
        let mut marks = Marks::borrow(seen);
        for &var in members {
            marks.mark(var);
        }

        let covered = self
            .resolved
            .iter()
            .filter(|resolved| match resolved {
                Resolved::Assigned => true,
                Resolved::Inner(var) => marks.is_marked(*var),
                Resolved::Unknown => false,
            })
            .count();
        covered as f64 / self.resolved.len() as f64
    }
}
