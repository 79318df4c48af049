//! Reader for CNF files extended with XOR lines.
//!
//! Understood lines:
//!
//! - `p cnf <vars> <clauses>` header, required before anything else
//! - `x1 -2 3 0` XOR of literals that must be true. Negated literals flip
//!   the parity
//! - `4 0` unit clauses, which become level-0 assignments
//! - `c ind 1 2 0` or `c p show 1 2 0` sampling variables, may be repeated
//!
//! All other comments are ignored. Clauses with two or more literals are
//! counted but not kept. Variables are 1-based in the file and 0-based in the
//! resulting [`Problem`].

use std::io::BufRead;

use anyhow::{anyhow, bail, Context as _};
use lazy_static::lazy_static;
use regex::Regex;

use crate::xor::{Var, Xor};

lazy_static! {
    static ref HEADER_REGEX: Regex =
        Regex::new(r"^p\s+cnf\s+([0-9]+)\s+([0-9]+)\s*$").unwrap();
    static ref SAMPLING_REGEX: Regex = Regex::new(r"^c\s+(?:ind|p\s+show)\s+(.*)$").unwrap();
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Problem {
    pub num_vars: usize,
    pub xors: Vec<Xor>,
    /// Level-0 assignments from unit clauses
    pub units: Vec<(Var, bool)>,
    /// Outer variables from sampling set lines, `None` if there were none
    pub sampling_vars: Option<Vec<Var>>,
    /// Clauses with two or more literals, which are skipped
    pub skipped_clauses: usize,
}

/// Parse a zero-terminated list of literals as (variable, negated) pairs
fn parse_literals(text: &str, num_vars: usize) -> anyhow::Result<Vec<(Var, bool)>> {
    let mut literals = vec![];
    let mut terminated = false;
    for token in text.split_ascii_whitespace() {
        if terminated {
            bail!("Literal `{token}` after terminating 0");
        }
        let literal: i64 = token
            .parse()
            .with_context(|| format!("Invalid literal `{token}`"))?;
        if literal == 0 {
            terminated = true;
            continue;
        }
        let var = literal.unsigned_abs();
        if var > num_vars as u64 {
            bail!(
                "Variable {var} is out of range, header declares {num_vars} variables"
            );
        }
        literals.push(((var - 1) as Var, literal < 0));
    }
    if !terminated {
        bail!("Missing terminating 0");
    }
    Ok(literals)
}

fn parse_line(problem: &mut Problem, header_seen: &mut bool, line: &str) -> anyhow::Result<()> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }

    if let Some(captures) = HEADER_REGEX.captures(line) {
        if *header_seen {
            bail!("Duplicate header");
        }
        let (_, [vars, _clauses]) = captures.extract();
        problem.num_vars = vars.parse().context("Variable count")?;
        *header_seen = true;
        return Ok(());
    }

    if let Some(captures) = SAMPLING_REGEX.captures(line) {
        if !*header_seen {
            bail!("Sampling set before header");
        }
        let (_, [vars]) = captures.extract();
        let literals = parse_literals(vars, problem.num_vars)?;
        if literals.iter().any(|(_, negated)| *negated) {
            bail!("Sampling variables can't be negated");
        }
        problem
            .sampling_vars
            .get_or_insert_with(Vec::new)
            .extend(literals.into_iter().map(|(var, _)| var));
        return Ok(());
    }

    if line.starts_with('c') {
        return Ok(());
    }

    if !*header_seen {
        bail!("Expected `p cnf` header first");
    }

    if let Some(xor_text) = line.strip_prefix('x') {
        let literals = parse_literals(xor_text, problem.num_vars)?;
        let negations = literals.iter().filter(|(_, negated)| *negated).count();
        problem.xors.push(Xor::new(
            literals.into_iter().map(|(var, _)| var),
            negations % 2 == 0,
        ));
        return Ok(());
    }

    match parse_literals(line, problem.num_vars)?.as_slice() {
        [] => bail!("Empty clause"),
        [(var, negated)] => problem.units.push((*var, !negated)),
        _ => problem.skipped_clauses += 1,
    }
    Ok(())
}

pub fn parse(reader: impl BufRead) -> anyhow::Result<Problem> {
    let mut problem = Problem::default();
    let mut header_seen = false;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        parse_line(&mut problem, &mut header_seen, &line)
            .with_context(|| format!("Line {}: `{}`", index + 1, line.trim()))?;
    }
    if !header_seen {
        return Err(anyhow!("No `p cnf` header found"));
    }
    Ok(problem)
}

#[cfg(test)]
mod test {
    use super::*;
    use indoc::indoc;

    fn parse_str(text: &str) -> anyhow::Result<Problem> {
        parse(text.as_bytes())
    }

    #[test]
    fn test_parse() {
        let problem = parse_str(indoc! {"
            c some comment
            p cnf 6 4
            c ind 1 2 0
            c p show 6 0
            x1 2 0
            x-2 3 0
            x-4 -5 6 0
            3 0
            -1 2 0
        "})
        .unwrap();

        assert_eq!(problem.num_vars, 6);
        assert_eq!(
            problem.xors,
            vec![
                Xor::new([0, 1], true),
                Xor::new([1, 2], false),
                Xor::new([3, 4, 5], true),
            ]
        );
        assert_eq!(problem.units, vec![(2, true)]);
        assert_eq!(problem.sampling_vars, Some(vec![0, 1, 5]));
        assert_eq!(problem.skipped_clauses, 1);
    }

    #[test]
    fn test_no_sampling_set() {
        let problem = parse_str("p cnf 2 1\nx1 2 0\n").unwrap();
        assert_eq!(problem.sampling_vars, None);

        let problem = parse_str("p cnf 2 1\nc ind 0\nx1 2 0\n").unwrap();
        assert_eq!(problem.sampling_vars, Some(vec![]));
    }

    #[test]
    fn test_errors() {
        let message = |text: &str| format!("{:#}", parse_str(text).unwrap_err());

        assert_eq!(
            message("x1 2 0\n"),
            "Line 1: `x1 2 0`: Expected `p cnf` header first"
        );
        assert_eq!(
            message("p cnf 2 1\nx1 3 0\n"),
            "Line 2: `x1 3 0`: Variable 3 is out of range, header declares 2 variables"
        );
        assert_eq!(
            message("p cnf 2 1\nx1 2\n"),
            "Line 2: `x1 2`: Missing terminating 0"
        );
        assert_eq!(
            message("p cnf 2 1\n1 a 0\n"),
            "Line 2: `1 a 0`: Invalid literal `a`: invalid digit found in string"
        );
        assert_eq!(message("c nothing\n"), "No `p cnf` header found");
    }
}
