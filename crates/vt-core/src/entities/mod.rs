//! Entity structs for all valtrack domain objects.
//!
//! Each entity maps to a table in the libSQL database (see
//! `vt-db/migrations/001_initial.sql`). All structs derive `Serialize`,
//! `Deserialize`, and `JsonSchema` for JSON output and schema export.

mod audit;
mod catalog;
mod diagnostic;
mod movement;
mod preparation;
mod review;
mod validator;

pub use audit::AuditEntry;
pub use catalog::CatalogEntry;
pub use diagnostic::Diagnostic;
pub use movement::{Movement, MovementStages};
pub use preparation::Preparation;
pub use review::SupervisorReview;
pub use validator::Validator;
