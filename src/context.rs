/// Context keeps track of all the solver state the matrix finder works with.
/// Namely, this includes
///
/// - Level-0 assignments and the consistency flag
/// - Variable numbering layers: bva, equivalent-variable replacement and the
///   outer to internal permutation
/// - The XOR store, the Gauss-Jordan matrix registry and its queues
/// - Sinks to send diagnostics to, and optional timing statistics
use std::{collections::BTreeSet, time::Duration};

use anyhow::bail;
use hashbrown::{hash_map::Entry, HashMap};
use itertools::Itertools;

use crate::{
    config::SolverConfig,
    dimacs::Problem,
    finder::{FindReport, MatrixFinder, XorHost},
    gauss::{GaussMatrix, GaussQueueData},
    log::{
        markdown::MarkdownLogStream,
        output::{LogSink, LogStream},
    },
    statistics::Statistics,
    status::{Contradiction, SATStatus},
    xor::{Var, Xor},
};

pub struct Context {
    conf: SolverConfig,
    /// Internal variable -> level-0 value
    assigns: Vec<Option<bool>>,
    ok: bool,
    decision_level: u32,
    /// XORs owned by the solver and not in any matrix
    xorclauses: Vec<Xor>,
    /// User variable -> outer variable, bva variables counted
    bva_map: Vec<Var>,
    /// Outer variable -> outer variable it was replaced with
    replaced_with: Vec<Var>,
    outer_to_inter: Vec<Var>,
    inter_to_outer: Vec<Var>,
    /// Scratch flags, one per internal variable
    seen: Vec<bool>,
    gmatrices: Vec<GaussMatrix>,
    gqueuedata: Vec<GaussQueueData>,
    clash_decision_vars: BTreeSet<Var>,
    pub(crate) stats: Option<Statistics>,
    sinks: LogSink,
}

impl Context {
    pub fn new(num_vars: usize, conf: SolverConfig) -> Context {
        let identity = (0..num_vars as Var).collect::<Vec<_>>();
        Context {
            conf,
            assigns: vec![None; num_vars],
            ok: true,
            decision_level: 0,
            xorclauses: vec![],
            bva_map: identity.clone(),
            replaced_with: identity.clone(),
            outer_to_inter: identity.clone(),
            inter_to_outer: identity,
            seen: vec![false; num_vars],
            gmatrices: vec![],
            gqueuedata: vec![],
            clash_decision_vars: BTreeSet::new(),
            stats: None,
            sinks: LogSink::new(),
        }
    }

    pub(crate) fn text(&mut self, text: &str) -> anyhow::Result<()> {
        self.sinks.add_text(text)
    }

    pub(crate) fn newline(&mut self) -> anyhow::Result<()> {
        self.sinks.newline()
    }

    pub fn add_output(&mut self, out: impl LogStream + 'static) {
        self.sinks.add_output(out);
    }

    pub fn add_markdown_sink(&mut self, path: &std::path::Path) -> anyhow::Result<()> {
        self.add_output(MarkdownLogStream::new(std::fs::File::create(path)?));
        Ok(())
    }

    pub fn print_results_to_stdout(&mut self) {
        struct StdoutStream;

        impl LogStream for StdoutStream {
            fn add_text(&mut self, text: &str) -> anyhow::Result<()> {
                for line in text.lines() {
                    println!("c {line}");
                }
                Ok(())
            }

            fn check_sat_status(&mut self, status: SATStatus) -> anyhow::Result<()> {
                match status {
                    SATStatus::UnSat => println!("s UNSATISFIABLE"),
                    SATStatus::Sat => println!("s SATISFIABLE"),
                    SATStatus::Unknown => println!("s INDETERMINATE"),
                }
                Ok(())
            }
        }

        self.add_output(StdoutStream);
    }

    pub fn enable_stats(&mut self) {
        self.stats.get_or_insert_with(Statistics::new);
    }

    pub fn stats(&self) -> Option<&Statistics> {
        self.stats.as_ref()
    }

    pub fn report_status(&mut self, status: SATStatus) -> anyhow::Result<()> {
        self.sinks.check_sat_status(status)
    }

    pub fn num_vars(&self) -> usize {
        self.assigns.len()
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn conf(&self) -> &SolverConfig {
        &self.conf
    }

    pub fn conf_mut(&mut self) -> &mut SolverConfig {
        &mut self.conf
    }

    /// XORs in the general pool
    pub fn xors(&self) -> &[Xor] {
        &self.xorclauses
    }

    pub fn gauss_matrices(&self) -> &[GaussMatrix] {
        &self.gmatrices
    }

    pub fn queue_data(&self) -> &[GaussQueueData] {
        &self.gqueuedata
    }

    pub fn clash_decision_vars(&self) -> &BTreeSet<Var> {
        &self.clash_decision_vars
    }

    pub fn add_xor(&mut self, vars: impl IntoIterator<Item = Var>, rhs: bool) {
        let xor = Xor::new(vars, rhs);
        assert!(
            xor.iter().all(|var| (*var as usize) < self.num_vars()),
            "XOR `{xor}` refers to an unknown variable"
        );
        self.xorclauses.push(xor);
    }

    /// Assign an internal variable at level 0
    pub fn assign(&mut self, var: Var, value: bool) -> Result<(), Contradiction> {
        match self.assigns[var as usize] {
            Some(old) if old != value => {
                self.ok = false;
                Err(Contradiction::new(format!(
                    "v{var} assigned both true and false"
                )))
            }
            _ => {
                self.assigns[var as usize] = Some(value);
                Ok(())
            }
        }
    }

    /// Record that outer variable `var` is equivalent to outer variable `with`
    pub fn replace(&mut self, var: Var, with: Var) {
        let with = self.replaced_with[with as usize];
        for replaced in self.replaced_with.iter_mut() {
            if *replaced == var {
                *replaced = with;
            }
        }
        self.replaced_with[var as usize] = with;
    }

    /// Number outer variables differently internally. `outer_to_inter` must be
    /// a permutation of the variables.
    pub fn set_outer_to_inter(&mut self, outer_to_inter: Vec<Var>) -> anyhow::Result<()> {
        if outer_to_inter.len() != self.num_vars() {
            bail!(
                "Expected a mapping of {} variables, got {}",
                self.num_vars(),
                outer_to_inter.len()
            );
        }
        let mut inter_to_outer = vec![Var::MAX; self.num_vars()];
        for (outer, &inter) in outer_to_inter.iter().enumerate() {
            match inter_to_outer.get_mut(inter as usize) {
                Some(slot) if *slot == Var::MAX => *slot = outer as Var,
                _ => bail!(
                    "Mapping is not a permutation, v{inter} is out of range or repeated"
                ),
            }
        }
        self.outer_to_inter = outer_to_inter;
        self.inter_to_outer = inter_to_outer;
        Ok(())
    }

    /// User variable `outside` became outer variable `outer` once bva
    /// variables were numbered in
    pub fn map_bva(&mut self, outside: Var, outer: Var) {
        let outside = outside as usize;
        if self.bva_map.len() <= outside {
            let len = self.bva_map.len() as Var;
            self.bva_map.extend(len..=outside as Var);
        }
        self.bva_map[outside] = outer;
    }

    pub fn add_problem(&mut self, problem: &Problem) -> Result<(), Contradiction> {
        for &(var, value) in problem.units.iter() {
            self.assign(var, value)?;
        }
        for xor in problem.xors.iter() {
            self.add_xor(xor.iter().copied(), xor.rhs);
        }
        Ok(())
    }

    /// Internal variable after applying variable replacement
    fn replaced_inter(&self, var: Var) -> Var {
        let outer = self.inter_to_outer[var as usize];
        self.outer_to_inter[self.replaced_with[outer as usize] as usize]
    }

    /// Run the matrix finder on this context, reporting the outcome to all sinks
    pub fn find_matrices(&mut self) -> Result<FindReport, Contradiction> {
        let result = MatrixFinder::new(self).find_matrices();
        match &result {
            Ok(report) => {
                if let Err(err) = self.sinks.find_report(report) {
                    eprintln!("Failed to write matrix report: {err:#}");
                }
            }
            Err(contradiction) => {
                self.ok = false;
                self.print(&format!("[matrix] {contradiction}"));
            }
        }
        result
    }
}

impl XorHost for Context {
    fn num_vars(&self) -> usize {
        self.assigns.len()
    }

    fn decision_level(&self) -> u32 {
        self.decision_level
    }

    fn okay(&self) -> bool {
        self.ok
    }

    fn config(&self) -> &SolverConfig {
        &self.conf
    }

    fn detach_xors(&mut self) -> Vec<Xor> {
        std::mem::take(&mut self.xorclauses)
    }

    fn attach_xors(&mut self, xors: Vec<Xor>) -> bool {
        if xors.iter().any(|xor| xor.is_empty() && xor.rhs) {
            self.ok = false;
        }
        self.xorclauses.extend(xors);
        self.ok
    }

    fn clean_xors(&mut self, xors: &mut Vec<Xor>) -> Result<(), Contradiction> {
        for xor in xors.iter_mut() {
            let mut rhs = xor.rhs;
            let mut vars = vec![];
            for &var in xor.iter() {
                let var = self.replaced_inter(var);
                match self.assigns[var as usize] {
                    Some(value) => rhs ^= value,
                    None => vars.push(var),
                }
            }
            vars.sort_unstable();

            // v ^ v cancels out
            xor.vars = vars
                .into_iter()
                .dedup_with_count()
                .filter(|(count, _)| count % 2 == 1)
                .map(|(_, var)| var)
                .collect();
            xor.rhs = rhs;

            if xor.is_empty() && xor.rhs {
                self.ok = false;
                return Err(Contradiction::new("XOR reduced to 0 = 1 during cleaning"));
            }
        }
        Ok(())
    }

    fn xor_together(&mut self, xors: &mut Vec<Xor>) -> Result<(), Contradiction> {
        let mut by_support: HashMap<Vec<Var>, usize> = HashMap::new();
        for index in 0..xors.len() {
            if xors[index].is_trivial() {
                continue;
            }
            match by_support.entry(xors[index].vars.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(index);
                }
                Entry::Occupied(entry) => {
                    let first = &xors[*entry.get()];
                    if first.rhs != xors[index].rhs {
                        self.ok = false;
                        return Err(Contradiction::new(format!(
                            "`{}` and `{}` can't both hold",
                            first, xors[index]
                        )));
                    }
                    // Adding the duplicate to the first one leaves 0 = 0
                    let duplicate = &mut xors[index];
                    let cancelled = std::mem::take(&mut duplicate.vars);
                    duplicate.clash_vars.extend(cancelled);
                    duplicate.rhs = false;
                }
            }
        }
        Ok(())
    }

    fn set_clash_decision_vars(&mut self, vars: BTreeSet<Var>) {
        self.clash_decision_vars = vars;
    }

    fn map_to_with_bva(&self, var: Var) -> Var {
        self.bva_map.get(var as usize).copied().unwrap_or(var)
    }

    fn replaced_with_outer(&self, var: Var) -> Var {
        self.replaced_with.get(var as usize).copied().unwrap_or(var)
    }

    fn map_outer_to_inter(&self, var: Var) -> Var {
        self.outer_to_inter.get(var as usize).copied().unwrap_or(var)
    }

    fn value(&self, var: Var) -> Option<bool> {
        self.assigns.get(var as usize).copied().flatten()
    }

    fn seen_mut(&mut self) -> &mut [bool] {
        &mut self.seen
    }

    fn matrices(&self) -> &[GaussMatrix] {
        &self.gmatrices
    }

    fn push_matrix(&mut self, matrix: GaussMatrix) {
        if let Err(err) = self.sinks.matrix_found(&matrix) {
            eprintln!("Failed to log matrix: {err:#}");
        }
        self.gmatrices.push(matrix);
    }

    fn queue_data_mut(&mut self) -> &mut Vec<GaussQueueData> {
        &mut self.gqueuedata
    }

    fn print(&mut self, text: &str) {
        if let Err(err) = self.text(text) {
            eprintln!("Failed to write diagnostics: {err:#}");
        }
    }

    fn record_time(&mut self, name: &str, elapsed: Duration) {
        if let Some(stats) = &mut self.stats {
            stats.time_passed(name, elapsed);
        }
    }
}
