pub(crate) mod config;
pub(crate) mod context;
pub(crate) mod dimacs;
pub(crate) mod finder;
pub(crate) mod gauss;
pub(crate) mod log;
pub(crate) mod statistics;
pub(crate) mod status;
pub(crate) mod xor;

pub use config::{GaussConfig, SolverConfig};
pub use context::Context;
pub use dimacs::{parse as parse_dimacs, Problem};
pub use finder::{
    ComponentDecision, ComponentShape, FindReport, MatrixFinder, RejectReason, SkipReason,
    Verdict, XorHost, SAMPLING_RATIO_THRESHOLD,
};
pub use gauss::{GaussMatrix, GaussQueueData};
pub use log::output::LogStream;
pub use statistics::Statistics;
pub use status::{Contradiction, SATStatus};
pub use xor::{MatrixTag, Var, Xor};
