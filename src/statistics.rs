use std::time::Duration;

use hashbrown::HashMap;
use itertools::Itertools;

use crate::context::Context;

/// Timing samples, keyed by the name of the step that was timed
#[derive(Debug, Default)]
pub struct Statistics {
    samples: HashMap<String, Vec<Duration>>,
}

impl Statistics {
    pub fn new() -> Statistics {
        Statistics::default()
    }

    pub fn time_passed(&mut self, name: &str, elapsed: Duration) {
        self.samples.entry_ref(name).or_default().push(elapsed);
    }

    pub fn num_samples(&self, name: &str) -> usize {
        self.samples.get(name).map_or(0, Vec::len)
    }

    pub fn total(&self, name: &str) -> Duration {
        self.samples
            .get(name)
            .map(|samples| samples.iter().sum())
            .unwrap_or(Duration::ZERO)
    }

    /// (name, samples, total time), most expensive first
    fn rows(&self) -> Vec<(&str, usize, Duration)> {
        self.samples
            .iter()
            .map(|(name, samples)| {
                (
                    name.as_str(),
                    samples.len(),
                    samples.iter().sum::<Duration>(),
                )
            })
            .sorted_by_key(|(name, _, total)| (std::cmp::Reverse(*total), *name))
            .collect()
    }
}

impl Context {
    pub fn print_stats(&mut self) -> anyhow::Result<()> {
        let Some(stats) = &self.stats else {
            return Ok(());
        };
        let lines = stats
            .rows()
            .into_iter()
            .map(|(name, count, total)| format!("| {name} | {count} | {total:?} |"))
            .collect::<Vec<_>>();

        self.text("#### Timing statistics")?;
        self.newline()?;
        self.text("| Step | Samples | Total time |")?;
        self.text("|------|---------|------------|")?;
        for line in lines.iter() {
            self.text(line)?;
        }
        self.newline()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_samples() {
        let mut stats = Statistics::new();
        stats.time_passed("matrix find", Duration::from_millis(3));
        stats.time_passed("clean", Duration::from_millis(10));
        stats.time_passed("matrix find", Duration::from_millis(4));

        assert_eq!(stats.num_samples("matrix find"), 2);
        assert_eq!(stats.total("matrix find"), Duration::from_millis(7));
        assert_eq!(stats.total("missing"), Duration::ZERO);
        assert_eq!(
            stats.rows(),
            vec![
                ("clean", 1, Duration::from_millis(10)),
                ("matrix find", 2, Duration::from_millis(7)),
            ]
        );
    }
}
