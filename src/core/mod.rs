pub mod context;
pub mod engine;
pub mod menu;
pub mod params;
pub mod runner;

pub use context::PluginContext;
pub use engine::{PluginEngine, RunOutcome};
pub use menu::{Justify, Menu};
pub use params::{ParamValue, Params};
pub use runner::{prepare_context, run_plugin};
