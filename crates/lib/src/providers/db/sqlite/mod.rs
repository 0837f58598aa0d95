use crate::{
    errors::StorageError,
    providers::db::storage::ContentStore,
    types::{Body, ContentId, ContentRecord, FileId, NewContentRecord, NewManagedFile, TermId},
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt::{self, Debug};
use tracing::{debug, error, info, warn};
use turso::{params, Connection, Database, Row, Value as TursoValue};

pub mod sql;

/// A provider for interacting with a local SQLite database using Turso.
///
/// When cloned, it shares the same underlying database, so a single
/// `:memory:` database can be handed to several collaborators in tests.
#[derive(Clone)]
pub struct SqliteProvider {
    /// The Turso database instance. It's cloneable and thread-safe.
    pub db: Database,
}

impl SqliteProvider {
    /// Opens (or creates) the database at `db_path`.
    ///
    /// Use ":memory:" for a unique, isolated in-memory database.
    pub async fn new(db_path: &str) -> Result<Self, StorageError> {
        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        // PRAGMA returns a row, so it has to go through `query`.
        conn.query("PRAGMA journal_mode=WAL;", ())
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(Self { db })
    }

    /// Ensures that all required tables and indexes exist. Idempotent.
    pub async fn initialize_schema(&self) -> Result<(), StorageError> {
        let conn = self.connect()?;
        for statement in sql::ALL_TABLE_CREATION_SQL {
            conn.execute(statement, ()).await?;
        }
        debug!("SQLite schema initialized.");
        Ok(())
    }

    fn connect(&self) -> Result<Connection, StorageError> {
        self.db
            .connect()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    async fn load_tags(conn: &Connection, id: ContentId) -> Result<Vec<TermId>, StorageError> {
        let mut rows = conn.query(sql::SELECT_CONTENT_TAGS, params![id.0]).await?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next().await? {
            tags.push(TermId(row.get::<i64>(0)?));
        }
        Ok(tags)
    }

    /// Maps a content row onto a record. Tags are loaded separately once the
    /// row cursor has been released.
    fn content_from_row(row: &Row) -> Result<ContentRecord, StorageError> {
        let image = match row.get_value(12)? {
            TursoValue::Null => None,
            TursoValue::Integer(file_id) => Some(FileId(file_id)),
            other => {
                return Err(StorageError::UnexpectedValue {
                    column: "image_file_id",
                    detail: format!("{other:?}"),
                })
            }
        };

        Ok(ContentRecord {
            id: ContentId(row.get::<i64>(0)?),
            content_type: row.get(1)?,
            published: row.get::<i64>(2)? != 0,
            owner_id: row.get(3)?,
            title: row.get(4)?,
            guid: row.get(5)?,
            link: row.get(6)?,
            created: row.get(7)?,
            changed: row.get(8)?,
            body: Body {
                summary: row.get(9)?,
                value: row.get(10)?,
                format: row.get(11)?,
            },
            image,
            tags: Vec::new(),
        })
    }

    async fn query_content(
        conn: &Connection,
        query: &str,
        params: Vec<TursoValue>,
    ) -> Result<Option<ContentRecord>, StorageError> {
        let record = {
            let mut rows = conn.query(query, params).await?;
            match rows.next().await? {
                Some(row) => Some(Self::content_from_row(&row)?),
                None => None,
            }
        };

        match record {
            Some(mut record) => {
                record.tags = Self::load_tags(conn, record.id).await?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn returning_id(
        conn: &Connection,
        query: &str,
        params: Vec<TursoValue>,
    ) -> Result<i64, StorageError> {
        let mut rows = conn.query(query, params).await?;
        match rows.next().await? {
            Some(row) => Ok(row.get::<i64>(0)?),
            None => Err(StorageError::UnexpectedValue {
                column: "id",
                detail: "INSERT ... RETURNING produced no row".to_string(),
            }),
        }
    }

    async fn insert_content(
        conn: &Connection,
        record: &NewContentRecord,
    ) -> Result<ContentId, StorageError> {
        let params: Vec<TursoValue> = vec![
            TursoValue::Text(record.content_type.clone()),
            TursoValue::Integer(i64::from(record.published)),
            TursoValue::Integer(record.owner_id),
            TursoValue::Text(record.title.clone()),
            TursoValue::Text(record.guid.clone()),
            TursoValue::Text(record.link.clone()),
            TursoValue::Integer(record.created),
            TursoValue::Integer(record.changed),
            TursoValue::Text(record.body.summary.clone()),
            TursoValue::Text(record.body.value.clone()),
            TursoValue::Text(record.body.format.clone()),
            record
                .image
                .map_or(TursoValue::Null, |file| TursoValue::Integer(file.0)),
        ];

        let id = ContentId(Self::returning_id(conn, sql::INSERT_CONTENT, params).await?);

        for (delta, term) in record.tags.iter().enumerate() {
            conn.execute(sql::INSERT_CONTENT_TAG, params![id.0, delta as i64, term.0])
                .await?;
        }
        Ok(id)
    }

    /// Rolls back the open transaction. A failed rollback is logged only, so
    /// the caller can still return the error that caused it.
    async fn rollback(conn: &Connection) {
        if let Err(e) = conn.execute("ROLLBACK", ()).await {
            error!("Failed to roll back transaction: {e}");
        }
    }

    async fn remove_content(conn: &Connection, id: ContentId) -> Result<(), StorageError> {
        conn.execute(sql::DELETE_CONTENT_TAGS, params![id.0]).await?;
        conn.execute(sql::DELETE_CONTENT, params![id.0]).await?;
        Ok(())
    }
}

impl Debug for SqliteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl ContentStore for SqliteProvider {
    fn name(&self) -> &str {
        "SQLite"
    }

    async fn find_term(
        &self,
        name: &str,
        vocabulary: &str,
    ) -> Result<Option<TermId>, StorageError> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(sql::SELECT_TERM_BY_NAME, params![name, vocabulary])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(TermId(row.get::<i64>(0)?))),
            None => Ok(None),
        }
    }

    async fn create_term(&self, name: &str, vocabulary: &str) -> Result<TermId, StorageError> {
        let conn = self.connect()?;
        let params: Vec<TursoValue> = vec![
            TursoValue::Text(name.to_string()),
            TursoValue::Text(vocabulary.to_string()),
        ];
        let id = TermId(Self::returning_id(&conn, sql::INSERT_TERM, params).await?);
        info!("Created term '{name}' in vocabulary '{vocabulary}' (ID: {id}).");
        Ok(id)
    }

    async fn find_content_by_title(
        &self,
        content_type: &str,
        title: &str,
    ) -> Result<Option<ContentRecord>, StorageError> {
        let conn = self.connect()?;
        let params: Vec<TursoValue> = vec![
            TursoValue::Text(content_type.to_string()),
            TursoValue::Text(title.to_string()),
        ];
        Self::query_content(&conn, &sql::select_content_by_title(), params).await
    }

    async fn load_content(&self, id: ContentId) -> Result<Option<ContentRecord>, StorageError> {
        let conn = self.connect()?;
        Self::query_content(&conn, &sql::select_content_by_id(), vec![TursoValue::Integer(id.0)])
            .await
    }

    /// Inserts the record and its tag rows in one transaction.
    async fn create_content(&self, record: &NewContentRecord) -> Result<ContentId, StorageError> {
        let conn = self.connect()?;
        conn.execute("BEGIN TRANSACTION", ()).await?;

        match Self::insert_content(&conn, record).await {
            Ok(id) => {
                conn.execute("COMMIT", ()).await?;
                debug!("Created content '{}' (ID: {id}).", record.title);
                Ok(id)
            }
            Err(e) => {
                warn!("Rolling back creation of '{}': {e}", record.title);
                Self::rollback(&conn).await;
                Err(e)
            }
        }
    }

    async fn content_ids_excluding_titles(
        &self,
        content_type: &str,
        titles: &[String],
    ) -> Result<Vec<ContentId>, StorageError> {
        // Filtered in memory: the title list has no size bound.
        let keep: HashSet<&str> = titles.iter().map(String::as_str).collect();
        let conn = self.connect()?;
        let mut rows = conn
            .query(sql::SELECT_CONTENT_IDS_AND_TITLES, params![content_type])
            .await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            let title = row.get::<String>(1)?;
            if !keep.contains(title.as_str()) {
                ids.push(ContentId(row.get::<i64>(0)?));
            }
        }
        Ok(ids)
    }

    /// Deletes the record and its tag rows in one transaction.
    async fn delete_content(&self, id: ContentId) -> Result<(), StorageError> {
        let conn = self.connect()?;
        conn.execute("BEGIN TRANSACTION", ()).await?;

        match Self::remove_content(&conn, id).await {
            Ok(()) => {
                conn.execute("COMMIT", ()).await?;
                Ok(())
            }
            Err(e) => {
                warn!("Rolling back deletion of content {id}: {e}");
                Self::rollback(&conn).await;
                Err(e)
            }
        }
    }

    async fn register_file(&self, file: &NewManagedFile) -> Result<FileId, StorageError> {
        let conn = self.connect()?;
        let size = file.size as i64;

        let existing = {
            let mut rows = conn
                .query(sql::SELECT_FILE_BY_URI, params![file.uri.as_str()])
                .await?;
            match rows.next().await? {
                Some(row) => Some(FileId(row.get::<i64>(0)?)),
                None => None,
            }
        };

        if let Some(id) = existing {
            conn.execute(
                sql::UPDATE_FILE,
                params![
                    file.source_url.as_str(),
                    file.filename.as_str(),
                    size,
                    id.0
                ],
            )
            .await?;
            debug!("Replaced managed file '{}' (ID: {id}).", file.uri);
            return Ok(id);
        }

        let params: Vec<TursoValue> = vec![
            TursoValue::Text(file.uri.clone()),
            TursoValue::Text(file.source_url.clone()),
            TursoValue::Text(file.filename.clone()),
            TursoValue::Integer(size),
        ];
        let id = FileId(Self::returning_id(&conn, sql::INSERT_FILE, params).await?);
        debug!("Registered managed file '{}' (ID: {id}).", file.uri);
        Ok(id)
    }
}
