// Shared domain types, used by both the engine and the presentation layer.
// Neither layer depends on the other; both import from this module.

pub mod pr;
pub mod workflow_run;

pub use pr::*;
pub use workflow_run::*;
