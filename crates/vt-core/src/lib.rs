//! # vt-core
//!
//! Core types, workflow rules, and error types for valtrack.
//!
//! This crate provides the foundational types shared across all valtrack crates:
//! - Entity structs for validators, movements and their stage records
//! - Origin and status enums
//! - ID prefix constants
//! - The workflow error taxonomy (`WorkflowError`)
//! - Pure workflow rules: intake plan, review propagation, preparation gate,
//!   final-status derivation, and edit-lock closure
//! - An injectable clock for the current processing date
//! - Audit detail sub-types

pub mod audit_detail;
pub mod clock;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod workflow;
