//! Update builder types for workflow mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some` fields
//! generate SET clauses in the dynamic UPDATE SQL. The serialized update (changed
//! fields only) becomes the `detail` of the `updated` audit entry.

pub mod diagnostic;
pub mod movement;
pub mod preparation;
pub mod review;

pub use diagnostic::{DiagnosticUpdate, DiagnosticUpdateBuilder};
pub use movement::{MovementUpdate, MovementUpdateBuilder};
pub use preparation::{PreparationUpdate, PreparationUpdateBuilder};
pub use review::{ReviewUpdate, ReviewUpdateBuilder};
