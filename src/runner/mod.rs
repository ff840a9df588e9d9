//! Orchestration of a local test cluster: health wait, provisioning, output
//! and shutdown, driven by [`driver::run`].

pub mod driver;
mod health;
mod orchestrator;
mod output;
mod shutdown;
mod state;
mod steps;
mod wallet;

pub use health::*;
pub use orchestrator::resolve_logs_dir;
pub use orchestrator::Orchestrator;
pub use orchestrator::RunnerHandle;
pub use output::*;
pub use state::*;
pub use steps::*;
pub use wallet::*;
