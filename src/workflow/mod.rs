//! Staged workflow controller
//!
//! An explicit state machine: [`Stage`] enumerates the states, [`next`] is the
//! pure transition function, and [`WorkflowEngine`] runs phases and folds their
//! results into a [`WorkflowState`] it owns for the lifetime of the run.

mod config;
mod engine;
mod phase;
mod stage;
mod state;

pub use config::{WorkflowConfig, DEFAULT_MAX_RETRIES};
pub use engine::{WorkflowEngine, RUN_EVENT_PHASE};
pub use phase::{descriptor, PhaseDescriptor, PhaseStep, PHASES};
pub use stage::{next, PhaseOutcome, Stage};
pub use state::{WorkflowError, WorkflowState};
