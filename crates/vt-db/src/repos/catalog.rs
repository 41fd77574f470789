//! Catalog listing.

use vt_core::entities::CatalogEntry;
use vt_core::enums::CatalogKind;

use crate::catalog::list_entries;
use crate::error::DatabaseError;
use crate::service::WorkflowService;

impl WorkflowService {
    /// Catalog rows, optionally of one kind, grouped by kind.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_catalog(
        &self,
        kind: Option<CatalogKind>,
    ) -> Result<Vec<CatalogEntry>, DatabaseError> {
        let _gate = self.read_gate().await;
        list_entries(self.db().conn(), kind).await
    }
}
