//! Catalog resolution.
//!
//! The configured labels are resolved into catalog row ids once, when the
//! service opens. Workflow decisions then run on `Origin`/`StageStatus`/
//! `FinalStatus` values and their ids; no label is compared on the write path.
//! A label missing from the table does not fail the open: the operation that
//! needs it fails with `WorkflowError::Configuration`, before touching anything.

use std::collections::HashMap;

use vt_config::CatalogConfig;
use vt_core::entities::CatalogEntry;
use vt_core::enums::{CatalogKind, FinalStatus, Origin, StageStatus};
use vt_core::errors::WorkflowError;

use crate::error::DatabaseError;
use crate::helpers::parse_enum;

#[derive(Debug, Clone, Copy)]
struct Resolved {
    name_idx: usize,
    id: Option<i64>,
}

/// Ids for the configured origin and status labels, plus shipment types.
#[derive(Debug, Clone)]
pub struct Catalog {
    names: CatalogConfig,
    origins: [Resolved; 3],
    stages: [Resolved; 3],
    finals: [Resolved; 2],
    shipment_types: HashMap<String, i64>,
}

const fn origin_slot(origin: Origin) -> usize {
    match origin {
        Origin::Field => 0,
        Origin::Warranty => 1,
        Origin::New => 2,
    }
}

const fn stage_slot(status: StageStatus) -> usize {
    match status {
        StageStatus::Pending => 0,
        StageStatus::Ok => 1,
        StageStatus::NotOk => 2,
    }
}

const fn final_slot(status: FinalStatus) -> usize {
    match status {
        FinalStatus::Operational => 0,
        FinalStatus::NotOperational => 1,
    }
}

impl Catalog {
    /// Read the catalog table and resolve the configured names.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the catalog table cannot be read.
    pub async fn load(
        conn: &libsql::Connection,
        names: &CatalogConfig,
    ) -> Result<Self, DatabaseError> {
        let mut by_name: HashMap<(CatalogKind, String), i64> = HashMap::new();
        let mut rows = conn.query("SELECT id, kind, name FROM catalog", ()).await?;
        while let Some(row) = rows.next().await? {
            let Ok(kind) = parse_enum::<CatalogKind>(&row.get::<String>(1)?) else {
                tracing::warn!(id = row.get::<i64>(0)?, "catalog row with unknown kind skipped");
                continue;
            };
            by_name.insert((kind, row.get::<String>(2)?), row.get::<i64>(0)?);
        }

        let entries = names.entries();
        let resolve = |kind: CatalogKind, name_idx: usize| Resolved {
            name_idx,
            id: by_name.get(&(kind, entries[name_idx].1.to_string())).copied(),
        };

        let origins = [
            resolve(CatalogKind::Origin, 0),
            resolve(CatalogKind::Origin, 1),
            resolve(CatalogKind::Origin, 2),
        ];
        let stages = [
            resolve(CatalogKind::Status, 3),
            resolve(CatalogKind::Status, 4),
            resolve(CatalogKind::Status, 5),
        ];
        let finals = [
            resolve(CatalogKind::Status, 6),
            resolve(CatalogKind::Status, 7),
        ];
        let shipment_types = by_name
            .iter()
            .filter(|((kind, _), _)| *kind == CatalogKind::ShipmentType)
            .map(|((_, name), id)| (name.clone(), *id))
            .collect();

        let catalog = Self {
            names: names.clone(),
            origins,
            stages,
            finals,
            shipment_types,
        };
        catalog.check_distinct()?;
        for (kind, name) in catalog.unresolved() {
            tracing::warn!(%kind, name, "configured catalog name not found");
        }
        Ok(catalog)
    }

    /// Two configured slots must never resolve to one row; reads map ids back
    /// to a single variant.
    fn check_distinct(&self) -> Result<(), DatabaseError> {
        let entries = self.names.entries();
        let mut seen: HashMap<i64, usize> = HashMap::new();
        let slots = self.origins.iter().chain(&self.stages).chain(&self.finals);
        for slot in slots {
            let Some(id) = slot.id else {
                continue;
            };
            if let Some(first) = seen.insert(id, slot.name_idx) {
                return Err(DatabaseError::InvalidState(format!(
                    "{} and {} both resolve to catalog id {id} ('{}')",
                    entries[first].0, entries[slot.name_idx].0, entries[first].1
                )));
            }
        }
        Ok(())
    }

    fn name_of(&self, slot: Resolved) -> String {
        self.names.entries()[slot.name_idx].1.to_string()
    }

    fn require(&self, kind: CatalogKind, slot: Resolved) -> Result<i64, WorkflowError> {
        slot.id.ok_or_else(|| WorkflowError::Configuration {
            kind,
            name: self.name_of(slot),
        })
    }

    /// Configured names that have no catalog row.
    #[must_use]
    pub fn unresolved(&self) -> Vec<(CatalogKind, String)> {
        let origins = self.origins.iter().map(|s| (CatalogKind::Origin, *s));
        let statuses = self
            .stages
            .iter()
            .chain(self.finals.iter())
            .map(|s| (CatalogKind::Status, *s));
        origins
            .chain(statuses)
            .filter(|(_, slot)| slot.id.is_none())
            .map(|(kind, slot)| (kind, self.name_of(slot)))
            .collect()
    }

    /// Fail if any name the intake path depends on is unresolved.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Configuration` naming the first missing entry.
    pub fn ensure_bootstrap(&self) -> Result<(), WorkflowError> {
        self.origin_id(Origin::Field)?;
        self.stage_id(StageStatus::Pending)?;
        Ok(())
    }

    /// Catalog id of an origin.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Configuration` if the configured name is missing.
    pub fn origin_id(&self, origin: Origin) -> Result<i64, WorkflowError> {
        self.require(CatalogKind::Origin, self.origins[origin_slot(origin)])
    }

    /// Catalog id of a stage status.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Configuration` if the configured name is missing.
    pub fn stage_id(&self, status: StageStatus) -> Result<i64, WorkflowError> {
        self.require(CatalogKind::Status, self.stages[stage_slot(status)])
    }

    /// Catalog id of a final status.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Configuration` if the configured name is missing.
    pub fn final_id(&self, status: FinalStatus) -> Result<i64, WorkflowError> {
        self.require(CatalogKind::Status, self.finals[final_slot(status)])
    }

    /// Catalog id of a shipment type label.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Configuration` if no such shipment type exists.
    pub fn shipment_type_id(&self, name: &str) -> Result<i64, WorkflowError> {
        self.shipment_types
            .get(name)
            .copied()
            .ok_or_else(|| WorkflowError::Configuration {
                kind: CatalogKind::ShipmentType,
                name: name.to_string(),
            })
    }

    pub(crate) fn origin_of(&self, id: i64) -> Result<Origin, DatabaseError> {
        Origin::ALL
            .into_iter()
            .find(|o| self.origins[origin_slot(*o)].id == Some(id))
            .ok_or_else(|| DatabaseError::InvalidState(format!("origin id {id} is not configured")))
    }

    pub(crate) fn stage_of(&self, id: i64) -> Result<StageStatus, DatabaseError> {
        StageStatus::ALL
            .into_iter()
            .find(|s| self.stages[stage_slot(*s)].id == Some(id))
            .ok_or_else(|| DatabaseError::InvalidState(format!("stage status id {id} is not configured")))
    }

    pub(crate) fn final_of(&self, id: i64) -> Result<FinalStatus, DatabaseError> {
        FinalStatus::ALL
            .into_iter()
            .find(|s| self.finals[final_slot(*s)].id == Some(id))
            .ok_or_else(|| DatabaseError::InvalidState(format!("final status id {id} is not configured")))
    }

    pub(crate) fn shipment_type_name(&self, id: i64) -> Result<String, DatabaseError> {
        self.shipment_types
            .iter()
            .find(|(_, v)| **v == id)
            .map(|(name, _)| name.clone())
            .ok_or_else(|| DatabaseError::InvalidState(format!("shipment type id {id} is unknown")))
    }

    /// Operator-facing label for a final status.
    #[must_use]
    pub fn final_label(&self, status: FinalStatus) -> String {
        self.name_of(self.finals[final_slot(status)])
    }
}

/// Read catalog rows, optionally restricted to one kind.
pub(crate) async fn list_entries(
    conn: &libsql::Connection,
    kind: Option<CatalogKind>,
) -> Result<Vec<CatalogEntry>, DatabaseError> {
    let mut rows = match kind {
        Some(kind) => {
            conn.query(
                "SELECT id, kind, name FROM catalog WHERE kind = ?1 ORDER BY kind, id",
                [kind.as_str()],
            )
            .await?
        }
        None => {
            conn.query("SELECT id, kind, name FROM catalog ORDER BY kind, id", ())
                .await?
        }
    };
    let mut entries = Vec::new();
    while let Some(row) = rows.next().await? {
        let Ok(kind) = parse_enum::<CatalogKind>(&row.get::<String>(1)?) else {
            continue;
        };
        entries.push(CatalogEntry {
            id: row.get(0)?,
            kind,
            name: row.get(2)?,
        });
    }
    Ok(entries)
}
