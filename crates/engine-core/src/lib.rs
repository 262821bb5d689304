pub mod bytes;
pub mod connectors;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod progress;
pub mod state;
pub mod validation;
