// [apps/script-runner/src/lib.rs]
//! Script Executor (C12) as a library: the binary in `main.rs` is a thin stdout-contract wrapper
//! around `executor::run`.

pub mod client;
pub mod config;
pub mod errors;
pub mod executor;
pub mod script;

pub mod prelude {
    pub use crate::client::ServerClient;
    pub use crate::config::ScriptRunnerConfig;
    pub use crate::errors::RunnerError;
    pub use crate::executor::{run, RunSummary, StepReport};
    pub use crate::script::{Script, ScriptStep};
}
