/*!
 * Database module for persistent storage of vocabulary, transcripts and tags.
 *
 * This module provides SQLite-based persistence for:
 * - Vocabulary entries, unique per type, language and normalized value
 * - Transcripts with their subtitle source, deduplicated by content hash
 * - Tag occurrences, replaced per transcript in a single transaction
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::DatabaseConnection;
pub use repository::Repository;
