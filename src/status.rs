#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SATStatus {
    UnSat,
    Sat,
    Unknown,
}

impl std::fmt::Display for SATStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SATStatus::UnSat => write!(f, "unsat"),
            SATStatus::Sat => write!(f, "sat"),
            SATStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// The constraint set was found to be unsatisfiable while restructuring it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Contradiction {
    reason: String,
}

impl Contradiction {
    pub fn new(reason: impl Into<String>) -> Contradiction {
        Contradiction {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl std::fmt::Display for Contradiction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "contradiction: {}", self.reason)
    }
}

impl std::error::Error for Contradiction {}
