//! # SQLite Specific SQL Queries
//!
//! This module centralizes SQL strings for the SQLite provider so the store
//! implementation stays free of database-specific syntax.

pub const CREATE_TAXONOMY_TERMS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS taxonomy_terms (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        vocabulary TEXT NOT NULL,
        UNIQUE (vocabulary, name)
    );
";

pub const CREATE_MANAGED_FILES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS managed_files (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        uri TEXT NOT NULL UNIQUE,
        source_url TEXT NOT NULL,
        filename TEXT NOT NULL,
        filesize INTEGER NOT NULL,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    );
";

pub const CREATE_CONTENT_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS content (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        content_type TEXT NOT NULL,
        status INTEGER NOT NULL,
        owner_id INTEGER NOT NULL,
        title TEXT NOT NULL,
        guid TEXT NOT NULL,
        link TEXT NOT NULL,
        created INTEGER NOT NULL,
        changed INTEGER NOT NULL,
        body_summary TEXT NOT NULL,
        body_value TEXT NOT NULL,
        body_format TEXT NOT NULL,
        image_file_id INTEGER REFERENCES managed_files(id)
    );
";

pub const CREATE_CONTENT_TAGS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS content_tags (
        content_id INTEGER NOT NULL REFERENCES content(id),
        delta INTEGER NOT NULL,
        term_id INTEGER NOT NULL REFERENCES taxonomy_terms(id),
        PRIMARY KEY (content_id, delta)
    );
";

/// Every statement needed to bring an empty database up to the current schema.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[
    CREATE_TAXONOMY_TERMS_TABLE,
    CREATE_MANAGED_FILES_TABLE,
    CREATE_CONTENT_TABLE,
    CREATE_CONTENT_TAGS_TABLE,
];

pub const SELECT_TERM_BY_NAME: &str =
    "SELECT id FROM taxonomy_terms WHERE name = ? AND vocabulary = ? ORDER BY id ASC LIMIT 1";

pub const INSERT_TERM: &str =
    "INSERT INTO taxonomy_terms (name, vocabulary) VALUES (?, ?) RETURNING id";

const CONTENT_COLUMNS: &str = "id, content_type, status, owner_id, title, guid, link, created, changed, body_summary, body_value, body_format, image_file_id";

pub fn select_content_by_title() -> String {
    format!(
        "SELECT {CONTENT_COLUMNS} FROM content WHERE content_type = ? AND title = ? ORDER BY id ASC LIMIT 1"
    )
}

pub fn select_content_by_id() -> String {
    format!("SELECT {CONTENT_COLUMNS} FROM content WHERE id = ?")
}

pub const INSERT_CONTENT: &str = "
    INSERT INTO content (content_type, status, owner_id, title, guid, link, created, changed, body_summary, body_value, body_format, image_file_id)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    RETURNING id
";

pub const INSERT_CONTENT_TAG: &str =
    "INSERT INTO content_tags (content_id, delta, term_id) VALUES (?, ?, ?)";

pub const SELECT_CONTENT_TAGS: &str =
    "SELECT term_id FROM content_tags WHERE content_id = ? ORDER BY delta ASC";

pub const DELETE_CONTENT_TAGS: &str = "DELETE FROM content_tags WHERE content_id = ?";

pub const DELETE_CONTENT: &str = "DELETE FROM content WHERE id = ?";

/// Ids and titles of all content of one type, used by the reconciler to find
/// titles that dropped out of the feed.
pub const SELECT_CONTENT_IDS_AND_TITLES: &str =
    "SELECT id, title FROM content WHERE content_type = ? ORDER BY id ASC";

pub const SELECT_FILE_BY_URI: &str = "SELECT id FROM managed_files WHERE uri = ?";

pub const UPDATE_FILE: &str =
    "UPDATE managed_files SET source_url = ?, filename = ?, filesize = ? WHERE id = ?";

pub const INSERT_FILE: &str =
    "INSERT INTO managed_files (uri, source_url, filename, filesize) VALUES (?, ?, ?, ?) RETURNING id";
