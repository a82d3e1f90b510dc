pub mod config;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod policy;
pub mod writer;

pub use config::SimulatorConfig;
pub use orchestrator::{Orchestrator, TickSummary};
pub use writer::PgnWriter;
