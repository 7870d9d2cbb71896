//! The contract every storage backend fulfils.
//!
//! A backend owns the in-memory [`Tables`] the manager reads from, and decides
//! how (and whether) writes reach durable storage. Backends differ only in
//! durability and batching; all business rules live in
//! [`DataManager`](crate::model::DataManager).

use log::error;

use crate::error::Result;
use crate::model::tables::{Change, Tables};

#[rocket::async_trait]
pub trait DataModel: Send + Sync {
    /// Short name for logging, e.g. `"memory"`.
    fn name(&self) -> &'static str;

    fn tables(&self) -> &Tables;

    /// Direct access to the collections. Writes made this way are not
    /// persisted, and must be followed by
    /// [`Tables::refresh_relational_lists`].
    fn tables_mut(&mut self) -> &mut Tables;

    /// Make `changes` durable, in order. Called before the changes are
    /// applied to [`DataModel::tables`].
    ///
    /// Changes may be written in several steps. On error, the steps before
    /// the failing one may already be durable; [`DataModel::recover`] then
    /// brings the tables back in line with storage.
    async fn persist(&mut self, changes: &[Change]) -> Result<()>;

    /// Re-read the tables from durable storage after a failed
    /// [`DataModel::persist`]. Backends without durable storage have
    /// nothing to do.
    async fn recover(&mut self) -> Result<()> {
        Ok(())
    }

    /// Remove everything, both in memory and in durable storage.
    async fn reset(&mut self) -> Result<()>;

    /// Replace everything with the given data set and rebuild relationships.
    async fn load(&mut self, tables: Tables) -> Result<()>;

    /// Persist `changes`, then apply them to the in-memory tables.
    ///
    /// If persisting fails, the tables are re-read from storage and the
    /// persist error is returned.
    async fn commit(&mut self, changes: Vec<Change>) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }
        if let Err(err) = self.persist(&changes).await {
            error!("Failed to persist {} change(s): {err}", changes.len());
            if let Err(recover_err) = self.recover().await {
                error!("Failed to re-read {} storage: {recover_err}", self.name());
            }
            return Err(err);
        }
        let tables = self.tables_mut();
        for change in changes {
            tables.apply(change);
        }
        Ok(())
    }
}
