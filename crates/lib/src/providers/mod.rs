//! Storage backends for the migration.

pub mod db;
