use std::collections::HashMap;

use log::{debug, info, trace, warn};
use mongodb::{
    bson::{doc, Bson, Document},
    options::{FindOptions, ReplaceOptions},
    Collection, Database,
};
use rocket::futures::{future::try_join_all, TryStreamExt};
use serde::{de::DeserializeOwned, Serialize};

use super::{
    bson::{id_filter, ids_filter, key_bson, record_document, row_document},
    collection::{collection_name, Coll, MongoCollection, ALL_COLLECTIONS},
};
use crate::error::Result;
use crate::model::{
    data_model::DataModel,
    table::{Record, Table},
    tables::{Change, Key, Kind, Tables},
};

/// Upper bound on the documents sent in one `insert_many`.
pub const WRITE_BATCH_SIZE: usize = 100;

/// Persistent backend: every table mirrored in a MongoDB collection.
///
/// All rows are read when the backend is opened, in the collections' natural
/// (insertion) order. From then on the in-memory tables serve every read, and
/// each write reaches the database before it is applied to them. Replacing a
/// stored row never moves it, so that order survives reopening.
pub struct MongoDataModel {
    db: Database,
    tables: Tables,
}

impl MongoDataModel {
    /// Open the backend on `db`, reading everything it already holds.
    pub async fn open(db: Database) -> Result<Self> {
        let tables = read_tables(&db).await?;
        info!(
            "Opened database `{}` with {} users, {} polls and {} nominations",
            db.name(),
            tables.users.len(),
            tables.polls.len(),
            tables.nominations.len()
        );
        Ok(Self { db, tables })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn collection(&self, kind: Kind) -> Collection<Document> {
        self.db.collection(collection_name(kind))
    }

    async fn upsert_one(&self, kind: Kind, id: Bson, document: Document) -> Result<()> {
        replace_one(&self.collection(kind), id, document).await
    }

    /// Save a run of rows of one kind. Rows already stored are replaced in
    /// place, each by its own `replace_one`. New rows are inserted in batches.
    async fn upsert_many(&self, kind: Kind, rows: Vec<UpsertRow>) -> Result<()> {
        // Later saves of the same key win, at the position of the first.
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut unique: Vec<UpsertRow> = Vec::with_capacity(rows.len());
        for row in rows {
            match positions.get(&row.id.to_string()) {
                Some(&pos) => unique[pos].document = row.document,
                None => {
                    positions.insert(row.id.to_string(), unique.len());
                    unique.push(row);
                }
            }
        }

        let (stored, new): (Vec<UpsertRow>, Vec<UpsertRow>) =
            unique.into_iter().partition(|row| row.stored);
        trace!(
            "Replacing {} and inserting {} {kind:?} document(s)",
            stored.len(),
            new.len()
        );

        let collection = self.collection(kind);
        let mut stored = stored.into_iter().peekable();
        while stored.peek().is_some() {
            let replacements = stored
                .by_ref()
                .take(WRITE_BATCH_SIZE)
                .map(|row| replace_one(&collection, row.id, row.document));
            try_join_all(replacements).await?;
        }
        insert_batched(&collection, new.into_iter().map(|row| row.document).collect()).await
    }

    async fn delete_many(&self, kind: Kind, ids: Vec<Bson>) -> Result<()> {
        let result = self
            .collection(kind)
            .delete_many(ids_filter(ids), None)
            .await?;
        trace!("Deleted {} {kind:?} document(s)", result.deleted_count);
        Ok(())
    }

    async fn clear_collections(&self) -> Result<()> {
        for name in ALL_COLLECTIONS {
            self.db
                .collection::<Document>(name)
                .delete_many(doc! {}, None)
                .await?;
        }
        Ok(())
    }
}

#[rocket::async_trait]
impl DataModel for MongoDataModel {
    fn name(&self) -> &'static str {
        "mongodb"
    }

    fn tables(&self) -> &Tables {
        &self.tables
    }

    fn tables_mut(&mut self) -> &mut Tables {
        &mut self.tables
    }

    /// Write runs of consecutive changes of the same kind and direction
    /// together. A lone upsert is a single replace.
    async fn persist(&mut self, changes: &[Change]) -> Result<()> {
        // Whether earlier runs left a key stored. The tables do not show
        // these writes yet.
        let mut written: HashMap<Key, bool> = HashMap::new();
        for run in runs(changes) {
            let kind = run[0].kind();
            match &run[0] {
                Change::Upsert(_) => {
                    let mut rows = Vec::with_capacity(run.len());
                    for change in run {
                        if let Change::Upsert(row) = change {
                            let key = row.key();
                            rows.push(UpsertRow {
                                id: key_bson(&key)?,
                                document: row_document(row)?,
                                stored: written
                                    .get(&key)
                                    .copied()
                                    .unwrap_or_else(|| self.tables.contains(&key)),
                            });
                            written.insert(key, true);
                        }
                    }
                    if let [row] = &rows[..] {
                        debug!("Saving one {kind:?}");
                        self.upsert_one(kind, row.id.clone(), row.document.clone())
                            .await?;
                    } else {
                        debug!("Saving {} {kind:?} rows", rows.len());
                        self.upsert_many(kind, rows).await?;
                    }
                }
                Change::Delete(_) => {
                    let mut ids = Vec::with_capacity(run.len());
                    for change in run {
                        if let Change::Delete(key) = change {
                            ids.push(key_bson(key)?);
                            written.insert(*key, false);
                        }
                    }
                    debug!("Deleting {} {kind:?} row(s)", ids.len());
                    self.delete_many(kind, ids).await?;
                }
            }
        }
        Ok(())
    }

    async fn recover(&mut self) -> Result<()> {
        warn!("Re-reading database `{}`", self.db.name());
        self.tables = read_tables(&self.db).await?;
        Ok(())
    }

    async fn reset(&mut self) -> Result<()> {
        self.clear_collections().await?;
        self.tables.clear();
        Ok(())
    }

    async fn load(&mut self, mut tables: Tables) -> Result<()> {
        self.clear_collections().await?;
        write_all(&self.db, &tables.users).await?;
        write_all(&self.db, &tables.administrators).await?;
        write_all(&self.db, &tables.poll_subjects).await?;
        write_all(&self.db, &tables.polls).await?;
        write_all(&self.db, &tables.nominations).await?;
        write_all(&self.db, &tables.votes).await?;
        write_all(&self.db, &tables.news).await?;

        tables.refresh_relational_lists();
        self.tables = tables;
        Ok(())
    }
}

/// One row of an upsert run, ready to write.
struct UpsertRow {
    id: Bson,
    document: Document,
    /// Whether the database already holds a document with this id.
    stored: bool,
}

/// Split `changes` into maximal runs sharing kind and direction.
fn runs(changes: &[Change]) -> Vec<&[Change]> {
    let same_run = |a: &Change, b: &Change| {
        a.kind() == b.kind()
            && matches!(
                (a, b),
                (Change::Upsert(_), Change::Upsert(_)) | (Change::Delete(_), Change::Delete(_))
            )
    };

    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=changes.len() {
        if i == changes.len() || !same_run(&changes[i - 1], &changes[i]) {
            runs.push(&changes[start..i]);
            start = i;
        }
    }
    runs
}

async fn read_tables(db: &Database) -> Result<Tables> {
    let mut tables = Tables::new();
    tables.users = read_all(db).await?;
    tables.administrators = read_all(db).await?;
    tables.poll_subjects = read_all(db).await?;
    tables.polls = read_all(db).await?;
    tables.nominations = read_all(db).await?;
    tables.votes = read_all(db).await?;
    tables.news = read_all(db).await?;
    tables.refresh_relational_lists();
    Ok(tables)
}

/// Every document of a collection, in natural order.
async fn read_all<T>(db: &Database) -> Result<Table<T>>
where
    T: Record + MongoCollection + DeserializeOwned + Unpin,
{
    let options = FindOptions::builder().sort(doc! {"$natural": 1}).build();
    let rows: Vec<T> = Coll::<T>::from_db(db)
        .find(None, options)
        .await?
        .try_collect()
        .await?;
    Ok(rows.into_iter().collect())
}

async fn write_all<T>(db: &Database, table: &Table<T>) -> Result<()>
where
    T: Record + MongoCollection + Serialize,
    T::Key: Serialize,
{
    let documents = table
        .iter()
        .map(record_document)
        .collect::<Result<Vec<_>>>()?;
    insert_batched(&Coll::<T>::from_db(db).documents(), documents).await
}

async fn replace_one(collection: &Collection<Document>, id: Bson, document: Document) -> Result<()> {
    let options = ReplaceOptions::builder().upsert(true).build();
    collection
        .replace_one(id_filter(id), document, options)
        .await?;
    Ok(())
}

async fn insert_batched(collection: &Collection<Document>, documents: Vec<Document>) -> Result<()> {
    for batch in documents.chunks(WRITE_BATCH_SIZE) {
        collection.insert_many(batch, None).await?;
    }
    Ok(())
}
