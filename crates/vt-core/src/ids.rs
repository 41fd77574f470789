//! ID prefixes for every persisted entity.
//!
//! IDs are `{prefix}-{8 hex chars}`, e.g. `mov-a3f8b2c1`. The random part is
//! generated by the database (`randomblob(4)`), see `vt_db::VtDb::generate_id`.

pub const PREFIX_VALIDATOR: &str = "val";
pub const PREFIX_MOVEMENT: &str = "mov";
pub const PREFIX_DIAGNOSTIC: &str = "dgn";
pub const PREFIX_REVIEW: &str = "rev";
pub const PREFIX_PREPARATION: &str = "prp";
pub const PREFIX_AUDIT: &str = "aud";

/// Every prefix in use, for exhaustive tests.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_VALIDATOR,
    PREFIX_MOVEMENT,
    PREFIX_DIAGNOSTIC,
    PREFIX_REVIEW,
    PREFIX_PREPARATION,
    PREFIX_AUDIT,
];

/// Whether `id` carries the given prefix followed by a dash.
#[must_use]
pub fn has_prefix(id: &str, prefix: &str) -> bool {
    id.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('-') && rest.len() > 1)
}
