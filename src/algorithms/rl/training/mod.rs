//! Training loop and convergence detection.
//!
//! A [`Trainer`] repeatedly resets its agent to a random vertex and walks it
//! toward the goal until the running total of value changes stops moving.

pub mod convergence;
pub mod trainer;

pub use convergence::{is_converged, ConvergenceTracker};
pub use trainer::{ConvergenceStatus, Trainer, TrainingReport};
