// engine module: fetch orchestration and snapshot cache

mod cache;
mod fetchers;
mod generation;
mod interface;
mod orchestrator;
mod panel;
pub mod pipeline;
mod refresh;
mod username;

pub use cache::{Snapshot, SnapshotCache};
pub use interface::{Engine, EngineHandle, Event, Request};
pub use panel::PanelEngine;
