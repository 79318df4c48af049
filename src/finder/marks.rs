use crate::xor::Var;

/// Borrow of the solver's per-variable scratch flags. Every flag set through
/// the guard is cleared again when it goes out of scope, on any exit path.
pub(crate) struct Marks<'a> {
    seen: &'a mut [bool],
    marked: Vec<Var>,
}

impl<'a> Marks<'a> {
    pub(crate) fn borrow(seen: &'a mut [bool]) -> Marks<'a> {
        debug_assert!(seen.iter().all(|flag| !flag), "scratch flags not cleared");
        Marks {
            seen,
            marked: vec![],
        }
    }

    pub(crate) fn mark(&mut self, var: Var) {
        let flag = &mut self.seen[var as usize];
        if !*flag {
            *flag = true;
            self.marked.push(var);
        }
    }

    /// Variables outside of the array are never marked
    pub(crate) fn is_marked(&self, var: Var) -> bool {
        self.seen.get(var as usize).copied().unwrap_or(false)
    }
}

impl Drop for Marks<'_> {
    fn drop(&mut self) {
        for var in self.marked.drain(..) {
            self.seen[var as usize] = false;
        }
    }
}
