//// Markdown log stream implementation. Produces a human-readable report of
//// a matrix finding run: diagnostic text as paragraphs, every matrix as a
//// code block with its rows and a table with the fate of each component.
//// Output is flushed after every matrix so progress can be watched live.

use super::output::LogStream;
use crate::{finder::FindReport, gauss::GaussMatrix, status::SATStatus};
use indoc::formatdoc;
use std::io::Write;

pub(crate) struct MarkdownLogStream<W: Write> {
    file: std::io::BufWriter<W>,
    trailing_newline: bool,
}

impl<W: Write> MarkdownLogStream<W> {
    pub(crate) fn new(file: W) -> MarkdownLogStream<W> {
        MarkdownLogStream {
            file: std::io::BufWriter::new(file),
            trailing_newline: true,
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.file
            .into_inner()
            .unwrap_or_else(|_| panic!("flushing markdown output failed"))
    }
}

impl<W: Write> LogStream for MarkdownLogStream<W> {
    fn add_text(&mut self, text: &str) -> anyhow::Result<()> {
        self.trailing_newline = false;
        writeln!(self.file, "{text}")?;
        Ok(())
    }

    fn newline(&mut self) -> anyhow::Result<()> {
        if !self.trailing_newline {
            writeln!(self.file)?;
            self.trailing_newline = true;
        }
        Ok(())
    }

    fn check_sat_status(&mut self, status: SATStatus) -> anyhow::Result<()> {
        self.newline()?;
        writeln!(self.file, "**Status:** `{status}`")?;
        self.trailing_newline = false;
        self.file.flush()?;
        Ok(())
    }

    fn matrix_found(&mut self, matrix: &GaussMatrix) -> anyhow::Result<()> {
        self.newline()?;
        writeln!(self.file, "```\n{matrix}\n```")?;
        self.trailing_newline = false;
        self.file.flush()?;
        Ok(())
    }

    fn find_report(&mut self, report: &FindReport) -> anyhow::Result<()> {
        self.newline()?;
        if let Some(reason) = report.skipped {
            writeln!(
                self.file,
                "Matrix finding skipped ({reason}), {} xors left as they are.",
                report.num_xors
            )?;
            self.trailing_newline = false;
            return Ok(());
        }

        write!(
            self.file,
            "{}",
            formatdoc!(
                "
                #### Components

                {} matrices recovered from {} xors in {:?}

                | Component | Rows | Columns | Density | Sampling | Decision |
                |-----------|------|---------|---------|----------|----------|
                ",
                report.num_matrices,
                report.num_xors,
                report.elapsed
            )
        )?;
        for decision in report.decisions.iter() {
            let shape = &decision.shape;
            let sampling = decision
                .ratio_sampling
                .map(|ratio| format!("{:.1}%", ratio * 100.0))
                .unwrap_or_else(|| "-".to_owned());
            writeln!(
                self.file,
                "| #{} | {} | {} | {:.4} | {sampling} | {} |",
                shape.id, shape.rows, shape.cols, shape.density, decision.verdict
            )?;
        }
        self.trailing_newline = false;
        self.file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        finder::{ComponentDecision, ComponentShape, RejectReason, SkipReason, Verdict},
        xor::Xor,
    };
    use expect_test::expect;

    #[test]
    fn test_markdown_output() {
        let mut stream = MarkdownLogStream::new(Vec::new());
        stream.add_text("## Matrix finding").unwrap();
        stream.newline().unwrap();
        stream.newline().unwrap();
        stream
            .matrix_found(&GaussMatrix::new(0, vec![Xor::new([1, 2], true)]))
            .unwrap();
        stream.check_sat_status(SATStatus::Unknown).unwrap();

        let output = String::from_utf8(stream.into_inner()).unwrap();
        let expected = expect![[r#"
            ## Matrix finding

            ```
            matrix #0 (1 x 2)
              v1 ^ v2 = 1
            ```

            **Status:** `unknown`
        "#]];
        expected.assert_eq(&output);
    }

    #[test]
    fn test_report_table() {
        let shape = |id, rows, cols, density| ComponentShape {
            id,
            rows,
            cols,
            sum_xor_sizes: 0,
            density,
        };
        let report = FindReport {
            matrix_created: true,
            num_matrices: 1,
            num_xors: 7,
            decisions: vec![
                ComponentDecision {
                    shape: shape(4, 5, 6, 0.5),
                    ratio_sampling: Some(0.75),
                    verdict: Verdict::AcceptBySampling,
                    matrix_no: Some(0),
                },
                ComponentDecision {
                    shape: shape(1, 2, 2, 1.0),
                    ratio_sampling: Some(0.0),
                    verdict: Verdict::Reject(RejectReason::TooFewRows),
                    matrix_no: None,
                },
            ],
            unused_matrices: 1,
            too_few_rows: 1,
            ..Default::default()
        };

        let mut stream = MarkdownLogStream::new(Vec::new());
        stream.find_report(&report).unwrap();
        stream
            .find_report(&FindReport {
                num_xors: 1,
                skipped: Some(SkipReason::TooFewXors),
                ..Default::default()
            })
            .unwrap();

        let output = String::from_utf8(stream.into_inner()).unwrap();
        let expected = expect![[r#"
            #### Components

            1 matrices recovered from 7 xors in 0ns

            | Component | Rows | Columns | Density | Sampling | Decision |
            |-----------|------|---------|---------|----------|----------|
            | #4 | 5 | 6 | 0.5000 | 75.0% | accepted (sampling ratio) |
            | #1 | 2 | 2 | 1.0000 | 0.0% | rejected (too few rows) |

            Matrix finding skipped (too few xors), 1 xors left as they are.
        "#]];
        expected.assert_eq(&output);
    }
}
