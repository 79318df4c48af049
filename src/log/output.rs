use crate::{finder::FindReport, gauss::GaussMatrix, status::SATStatus};

/// Receiver of solver diagnostics. All methods default to ignoring their input
pub trait LogStream {
    fn add_text(&mut self, _text: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn newline(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn check_sat_status(&mut self, _status: SATStatus) -> anyhow::Result<()> {
        Ok(())
    }

    /// A matrix is about to be handed over to the matrix registry
    fn matrix_found(&mut self, _matrix: &GaussMatrix) -> anyhow::Result<()> {
        Ok(())
    }

    /// Matrix finder completed a run
    fn find_report(&mut self, _report: &FindReport) -> anyhow::Result<()> {
        Ok(())
    }
}

pub(crate) struct LogSink {
    outputs: Vec<Box<dyn LogStream>>,
}

impl LogSink {
    pub(crate) fn new() -> LogSink {
        LogSink { outputs: vec![] }
    }

    pub(crate) fn add_output(&mut self, out: impl LogStream + 'static) {
        self.outputs.push(Box::new(out));
    }

    /// Every output gets the event, even after one of them failed. The first
    /// failure is returned.
    fn broadcast(
        &mut self,
        mut send: impl FnMut(&mut Box<dyn LogStream>) -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        let mut first_error = None;
        for output in self.outputs.iter_mut() {
            if let Err(err) = send(output) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl LogStream for LogSink {
    fn add_text(&mut self, text: &str) -> anyhow::Result<()> {
        self.broadcast(|output| output.add_text(text))
    }

    fn newline(&mut self) -> anyhow::Result<()> {
        self.broadcast(|output| output.newline())
    }

    fn check_sat_status(&mut self, status: SATStatus) -> anyhow::Result<()> {
        self.broadcast(|output| output.check_sat_status(status))
    }

    fn matrix_found(&mut self, matrix: &GaussMatrix) -> anyhow::Result<()> {
        self.broadcast(|output| output.matrix_found(matrix))
    }

    fn find_report(&mut self, report: &FindReport) -> anyhow::Result<()> {
        self.broadcast(|output| output.find_report(report))
    }
}

#[cfg(test)]
mod test {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use anyhow::bail;

    struct Broken(&'static str);

    impl LogStream for Broken {
        fn add_text(&mut self, _text: &str) -> anyhow::Result<()> {
            bail!("{} is broken", self.0)
        }

        fn check_sat_status(&mut self, _status: SATStatus) -> anyhow::Result<()> {
            bail!("{} is broken", self.0)
        }
    }

    struct Record(Rc<RefCell<Vec<String>>>);

    impl LogStream for Record {
        fn add_text(&mut self, text: &str) -> anyhow::Result<()> {
            self.0.borrow_mut().push(text.to_owned());
            Ok(())
        }

        fn check_sat_status(&mut self, status: SATStatus) -> anyhow::Result<()> {
            self.0.borrow_mut().push(format!("status {status}"));
            Ok(())
        }
    }

    #[test]
    fn test_failing_output_does_not_silence_others() {
        let seen = Rc::new(RefCell::new(vec![]));
        let mut sink = LogSink::new();
        sink.add_output(Broken("first"));
        sink.add_output(Record(seen.clone()));
        sink.add_output(Broken("second"));

        let err = sink.add_text("hello").unwrap_err();
        assert_eq!(err.to_string(), "first is broken");
        assert!(sink.check_sat_status(SATStatus::UnSat).is_err());
        sink.newline().unwrap();

        assert_eq!(*seen.borrow(), vec!["hello", "status unsat"]);
    }
}
