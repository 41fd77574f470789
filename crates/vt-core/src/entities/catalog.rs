use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::CatalogKind;

/// A row of the lookup catalog: a durable id behind a human-readable name.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: i64,
    pub kind: CatalogKind,
    pub name: String,
}
