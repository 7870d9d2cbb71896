use log::trace;

use crate::error::Result;
use crate::model::{
    data_model::DataModel,
    tables::{Change, Tables},
};

/// Volatile backend: the tables are the only copy of the data.
#[derive(Debug, Default)]
pub struct MemoryDataModel {
    tables: Tables,
}

impl MemoryDataModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend pre-filled with the given data set.
    pub fn with_tables(mut tables: Tables) -> Self {
        tables.refresh_relational_lists();
        Self { tables }
    }
}

#[rocket::async_trait]
impl DataModel for MemoryDataModel {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn tables(&self) -> &Tables {
        &self.tables
    }

    fn tables_mut(&mut self) -> &mut Tables {
        &mut self.tables
    }

    async fn persist(&mut self, changes: &[Change]) -> Result<()> {
        trace!("Keeping {} change(s) in memory only", changes.len());
        Ok(())
    }

    async fn reset(&mut self) -> Result<()> {
        self.tables.clear();
        Ok(())
    }

    async fn load(&mut self, mut tables: Tables) -> Result<()> {
        tables.refresh_relational_lists();
        self.tables = tables;
        Ok(())
    }
}
