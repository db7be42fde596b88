// config module: file discovery, typed options, live settings handle

pub mod loader;
mod settings;
pub mod types;

pub use settings::Settings;
pub use types::{AppConfig, WorkflowVisibility};
