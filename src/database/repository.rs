/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for all database operations,
 * abstracting away the SQL details and providing type-safe access. It also
 * implements the collaborator traits the tagging engine talks to:
 * `VocabularyLookup` for get-or-create of terms and `OccurrenceSink` for
 * replacing a transcript's stored tags.
 */

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row};
use sha2::{Digest, Sha256};

use super::connection::DatabaseConnection;
use super::models::{ImportResult, TagRecord, VocabularyUpdate};
use crate::errors::VocabularyError;
use crate::language_utils::normalize_language_code;
use crate::tagging::Occurrence;
use crate::transcript::{OccurrenceSink, ReplaceSummary, Transcript};
use crate::vocabulary::{normalize_value, VocabularyEntry, VocabularyLookup};

const VOCABULARY_COLUMNS: &str =
    "id, type, language, display_value, normalized_value, meaning, allow_auto_tag";

const TAG_SELECT: &str = r#"
    SELECT t.id, t.transcript_id, tr.title, t.start_ms, t.exact_ms,
           v.id, v.type, v.language, v.display_value, v.normalized_value, v.meaning, v.allow_auto_tag
    FROM tags t
    JOIN vocabulary v ON v.id = t.vocabulary_id
    JOIN transcripts tr ON tr.id = t.transcript_id
"#;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Open the database at `path`, or at the default location
    pub fn open(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Ok(Self::new(DatabaseConnection::new(path)?)),
            None => Self::new_default(),
        }
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    // =========================================================================
    // Vocabulary Operations
    // =========================================================================

    fn vocabulary_from_row(row: &Row, offset: usize) -> rusqlite::Result<VocabularyEntry> {
        Ok(VocabularyEntry {
            id: row.get(offset)?,
            tag_type: row.get(offset + 1)?,
            language: row.get(offset + 2)?,
            display_value: row.get(offset + 3)?,
            normalized_value: row.get(offset + 4)?,
            meaning: row.get(offset + 5)?,
            allow_auto_tag: row.get(offset + 6)?,
        })
    }

    /// Insert-or-fetch a vocabulary entry (synchronous version for use within transactions)
    fn get_or_create_vocabulary_sync(
        conn: &Connection,
        tag_type: &str,
        language: &str,
        value: &str,
    ) -> Result<VocabularyEntry> {
        let value = value.trim();
        if value.is_empty() {
            return Err(VocabularyError::EmptyValue(tag_type.to_string()).into());
        }
        let normalized = normalize_value(value);

        let inserted = conn.execute(
            r#"
            INSERT INTO vocabulary (type, language, display_value, normalized_value, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, datetime('now'), datetime('now'))
            ON CONFLICT(type, language, normalized_value) DO NOTHING
            "#,
            params![tag_type, language, value, normalized],
        )?;
        if inserted > 0 {
            debug!("Created vocabulary entry: {} ({})", value, tag_type);
        }

        let entry = conn.query_row(
            &format!(
                "SELECT {} FROM vocabulary WHERE type = ?1 AND language = ?2 AND normalized_value = ?3",
                VOCABULARY_COLUMNS
            ),
            params![tag_type, language, normalized],
            |row| Self::vocabulary_from_row(row, 0),
        )?;

        Ok(entry)
    }

    fn get_vocabulary_sync(conn: &Connection, id: i64) -> Result<Option<VocabularyEntry>> {
        let entry = conn
            .query_row(
                &format!("SELECT {} FROM vocabulary WHERE id = ?1", VOCABULARY_COLUMNS),
                [id],
                |row| Self::vocabulary_from_row(row, 0),
            )
            .optional()?;

        Ok(entry)
    }

    /// List vocabulary entries ordered by ID, optionally of one type
    pub async fn list_vocabulary(&self, tag_type: Option<&str>) -> Result<Vec<VocabularyEntry>> {
        let tag_type = tag_type.map(str::to_string);

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM vocabulary WHERE ?1 IS NULL OR type = ?1 ORDER BY id",
                    VOCABULARY_COLUMNS
                ))?;

                let entries = stmt
                    .query_map([tag_type], |row| Self::vocabulary_from_row(row, 0))?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                Ok(entries)
            })
            .await
    }

    /// Entries eligible for auto-tagging transcripts in `language`, ordered by ID
    pub async fn auto_taggable_vocabulary(
        &self,
        language: &str,
        tag_types: &[String],
    ) -> Result<Vec<VocabularyEntry>> {
        let language = language.to_string();
        let tag_types = tag_types.to_vec();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM vocabulary WHERE language = ?1 AND allow_auto_tag = 1 ORDER BY id",
                    VOCABULARY_COLUMNS
                ))?;

                let entries = stmt
                    .query_map([language], |row| Self::vocabulary_from_row(row, 0))?
                    .filter(|entry| {
                        entry
                            .as_ref()
                            .map_or(true, |e| tag_types.contains(&e.tag_type))
                    })
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                Ok(entries)
            })
            .await
    }

    /// Update the editable fields of a vocabulary entry
    pub async fn update_vocabulary(&self, id: i64, update: VocabularyUpdate) -> Result<VocabularyEntry> {
        self.db
            .transaction_async(move |tx| {
                if let Some(meaning) = &update.meaning {
                    tx.execute(
                        "UPDATE vocabulary SET meaning = ?1, updated_at = datetime('now') WHERE id = ?2",
                        params![meaning, id],
                    )?;
                }
                if let Some(allow_auto_tag) = update.allow_auto_tag {
                    tx.execute(
                        "UPDATE vocabulary SET allow_auto_tag = ?1, updated_at = datetime('now') WHERE id = ?2",
                        params![allow_auto_tag, id],
                    )?;
                }

                Self::get_vocabulary_sync(tx, id)?
                    .ok_or_else(|| VocabularyError::NotFound(id).into())
            })
            .await
    }

    // =========================================================================
    // Transcript Operations
    // =========================================================================

    /// Compute SHA256 hash of text
    pub fn hash_text(text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn transcript_from_row(row: &Row) -> rusqlite::Result<Transcript> {
        Ok(Transcript {
            id: row.get(0)?,
            title: row.get(1)?,
            language: row.get(2)?,
            source: row.get(3)?,
            content_hash: row.get(4)?,
        })
    }

    fn find_transcript_by_hash_sync(conn: &Connection, hash: &str) -> Result<Option<Transcript>> {
        let transcript = conn
            .query_row(
                "SELECT id, title, language, source_text, content_hash FROM transcripts WHERE content_hash = ?1 ORDER BY id LIMIT 1",
                [hash],
                Self::transcript_from_row,
            )
            .optional()?;

        Ok(transcript)
    }

    /// Store a transcript.
    ///
    /// Content identical to an already stored transcript returns that
    /// transcript instead of creating a new one.
    pub async fn import_transcript(
        &self,
        title: &str,
        language: &str,
        source_path: Option<&Path>,
        source_text: String,
    ) -> Result<ImportResult> {
        let title = title.to_string();
        let language = normalize_language_code(language)?;
        let source_path = source_path.map(|p| p.to_string_lossy().to_string());
        let hash = Self::hash_text(&source_text);

        self.db
            .transaction_async(move |tx| {
                if let Some(existing) = Self::find_transcript_by_hash_sync(tx, &hash)? {
                    debug!("Transcript content already stored as {}", existing.id);
                    return Ok(ImportResult {
                        transcript: existing,
                        created: false,
                    });
                }

                tx.execute(
                    r#"
                    INSERT INTO transcripts (title, language, source_path, source_text, content_hash, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'), datetime('now'))
                    "#,
                    params![title, language, source_path, source_text, hash],
                )?;
                let id = tx.last_insert_rowid();
                info!("Imported transcript {}: {}", id, title);

                Ok(ImportResult {
                    transcript: Transcript {
                        id,
                        title,
                        language,
                        source: Some(source_text),
                        content_hash: Some(hash),
                    },
                    created: true,
                })
            })
            .await
    }

    /// Get a transcript by ID, with its source text
    pub async fn get_transcript(&self, id: i64) -> Result<Option<Transcript>> {
        self.db
            .execute_async(move |conn| {
                let transcript = conn
                    .query_row(
                        "SELECT id, title, language, source_text, content_hash FROM transcripts WHERE id = ?1",
                        [id],
                        Self::transcript_from_row,
                    )
                    .optional()?;

                Ok(transcript)
            })
            .await
    }

    /// List transcripts ordered by ID; source texts are not loaded
    pub async fn list_transcripts(&self) -> Result<Vec<Transcript>> {
        self.db
            .execute_async(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, title, language, NULL, content_hash FROM transcripts ORDER BY id",
                )?;

                let transcripts = stmt
                    .query_map([], Self::transcript_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                Ok(transcripts)
            })
            .await
    }

    // =========================================================================
    // Tag Operations
    // =========================================================================

    fn tag_from_row(row: &Row) -> rusqlite::Result<TagRecord> {
        Ok(TagRecord {
            id: row.get(0)?,
            transcript_id: row.get(1)?,
            transcript_title: row.get(2)?,
            start_ms: row.get::<_, i64>(3)? as u64,
            exact_ms: row.get::<_, i64>(4)? as u64,
            vocabulary: Self::vocabulary_from_row(row, 5)?,
        })
    }

    fn query_tags(conn: &Connection, filter: &str, transcript_id: i64) -> Result<Vec<TagRecord>> {
        let mut stmt = conn.prepare(&format!("{} {}", TAG_SELECT, filter))?;

        let tags = stmt
            .query_map([transcript_id], Self::tag_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(tags)
    }

    /// Tags of one transcript in time order
    pub async fn get_tags(&self, transcript_id: i64) -> Result<Vec<TagRecord>> {
        self.db
            .execute_async(move |conn| {
                Self::query_tags(
                    conn,
                    "WHERE t.transcript_id = ?1 ORDER BY t.start_ms, t.exact_ms, t.id",
                    transcript_id,
                )
            })
            .await
    }

    /// Tags in other transcripts sharing a vocabulary entry with this one
    pub async fn related_tags(&self, transcript_id: i64) -> Result<Vec<TagRecord>> {
        self.db
            .execute_async(move |conn| {
                Self::query_tags(
                    conn,
                    r#"
                    WHERE t.transcript_id != ?1
                      AND t.vocabulary_id IN (SELECT vocabulary_id FROM tags WHERE transcript_id = ?1)
                    ORDER BY t.transcript_id, t.exact_ms, t.id
                    "#,
                    transcript_id,
                )
            })
            .await
    }

    /// Number of occurrences per vocabulary entry within one transcript
    pub async fn occurrence_counts(&self, transcript_id: i64) -> Result<HashMap<i64, usize>> {
        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT vocabulary_id, COUNT(*) FROM tags WHERE transcript_id = ?1 GROUP BY vocabulary_id",
                )?;

                let counts = stmt
                    .query_map([transcript_id], |row| {
                        Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)? as usize))
                    })?
                    .collect::<rusqlite::Result<HashMap<_, _>>>()?;

                Ok(counts)
            })
            .await
    }
}

impl VocabularyLookup for Repository {
    fn get_or_create(&self, tag_type: &str, language: &str, value: &str) -> Result<VocabularyEntry> {
        self.db
            .execute(|conn| Self::get_or_create_vocabulary_sync(conn, tag_type, language, value))
    }
}

#[async_trait]
impl OccurrenceSink for Repository {
    async fn replace_all(&self, transcript_id: i64, occurrences: Vec<Occurrence>) -> Result<ReplaceSummary> {
        self.db
            .transaction_async(move |tx| {
                let deleted = tx.execute("DELETE FROM tags WHERE transcript_id = ?1", [transcript_id])?;

                let mut stmt = tx.prepare(
                    "INSERT INTO tags (transcript_id, vocabulary_id, start_ms, exact_ms) VALUES (?1, ?2, ?3, ?4)",
                )?;
                for occurrence in &occurrences {
                    stmt.execute(params![
                        transcript_id,
                        occurrence.vocabulary.id,
                        occurrence.cue_start_ms as i64,
                        occurrence.exact_ms as i64,
                    ])?;
                }

                let summary = ReplaceSummary {
                    deleted,
                    inserted: occurrences.len(),
                };
                info!("Transcript {}: {}", transcript_id, summary);

                Ok(summary)
            })
            .await
    }
}
