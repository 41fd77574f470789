//! Repository modules implementing the workflow operations.
//!
//! Each module adds methods to `WorkflowService` via `impl WorkflowService` blocks.

pub mod audit;
pub mod catalog;
pub mod diagnostic;
pub mod movement;
pub mod preparation;
pub mod review;
pub mod validator;
