// gh module: everything that talks to (or stands in for) the `gh` CLI

pub mod commands;
mod error;
pub mod parse;
mod runner;
pub mod stub;

pub use error::GhError;
pub use runner::{CliRunner, ProcessOutput, ProcessRunner};
pub use stub::{StubResponse, StubRunner};
