//! Human-readable catalog names the workflow resolves at startup.
//!
//! The catalog table stores the labels operators see ("Terreno", "Pendiente").
//! The workflow never compares labels while processing a write: these names are
//! looked up once when the service opens and turned into stable ids.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogConfig {
    pub origin_field: String,
    pub origin_warranty: String,
    pub origin_new: String,
    pub status_pending: String,
    pub status_ok: String,
    pub status_not_ok: String,
    pub status_operational: String,
    pub status_not_operational: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            origin_field: "Terreno".into(),
            origin_warranty: "Garantía".into(),
            origin_new: "Nuevo".into(),
            status_pending: "Pendiente".into(),
            status_ok: "OK".into(),
            status_not_ok: "NO OK".into(),
            status_operational: "Operativo".into(),
            status_not_operational: "No operativo".into(),
        }
    }
}

impl CatalogConfig {
    /// `(field, name)` pairs for every configured name.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, &str); 8] {
        [
            ("catalog.origin_field", &self.origin_field),
            ("catalog.origin_warranty", &self.origin_warranty),
            ("catalog.origin_new", &self.origin_new),
            ("catalog.status_pending", &self.status_pending),
            ("catalog.status_ok", &self.status_ok),
            ("catalog.status_not_ok", &self.status_not_ok),
            ("catalog.status_operational", &self.status_operational),
            ("catalog.status_not_operational", &self.status_not_operational),
        ]
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for (field, name) in self.entries() {
            if name.trim().is_empty() {
                return Err(ConfigError::invalid(field, "catalog name must not be empty"));
            }
        }
        let origins = [&self.origin_field, &self.origin_warranty, &self.origin_new];
        let statuses = [
            &self.status_pending,
            &self.status_ok,
            &self.status_not_ok,
            &self.status_operational,
            &self.status_not_operational,
        ];
        reject_duplicates("origin", &origins)?;
        reject_duplicates("status", &statuses)?;
        Ok(())
    }
}

/// Two slots of one kind sharing a label would resolve to the same row.
fn reject_duplicates(kind: &str, names: &[&String]) -> Result<(), ConfigError> {
    for (i, a) in names.iter().enumerate() {
        if names[i + 1..].contains(a) {
            return Err(ConfigError::invalid(
                "catalog",
                format!("{kind} name '{a}' is configured twice"),
            ));
        }
    }
    Ok(())
}
