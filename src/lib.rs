pub mod clip;
pub mod config;
pub mod error;
pub mod extract;
pub mod interactive;
pub mod orchestrator;
pub mod resolve;
pub mod transcode;

pub use clip::{ClipRequest, CutWindow, ResolvedSource, TimeSpec};
pub use config::{Config, Strategy};
pub use error::{ClipError, FailureKind, Result};
pub use orchestrator::{
    print_summary, ClipOrchestrator, ClipOutcome, ClipReport, ClipState, ClipSubmission,
    RequestHandle,
};
