use anyhow::{Result, Context, anyhow};
use log::{error, warn, info, debug};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::database::models::{ImportResult, TagRecord, VocabularyUpdate};
use crate::database::Repository;
use crate::errors::TranscriptError;
use crate::file_utils::FileManager;
use crate::subtitle_processor::SubtitleDocument;
use crate::tagging::{parse_cues, AutoTagger, ParseOutcome};
use crate::transcript::{OccurrenceSink, ReplaceSummary, TagSummary, Transcript};
use crate::uniqueness::UniquenessScorer;
use crate::vocabulary::{InMemoryVocabulary, TermSpec, VocabularyEntry};

// @module: Application controller for transcript tagging

/// Parse result for one subtitle file
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: ParseOutcome,
}

/// Result of running the tagging workflow on a stored transcript
#[derive(Debug)]
pub struct ProcessReport {
    pub transcript: Transcript,
    pub outcome: ParseOutcome,
    /// Set when stored tags were replaced
    pub saved: Option<ReplaceSummary>,
}

/// A stored tag with its uniqueness score
#[derive(Debug, Clone)]
pub struct ScoredTag {
    pub tag: TagRecord,
    pub uniqueness: f64,
}

/// Main application controller for transcript tagging
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Vocabulary, transcript and tag storage
    repository: Repository,
}

impl Controller {
    // @method: Create a controller over an open repository
    pub fn new(config: Config, repository: Repository) -> Self {
        Self { config, repository }
    }

    // @method: Create a controller with the database named by the configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let repository = Repository::open(config.database_path().as_deref())
            .context("Failed to open database")?;

        Ok(Self::new(config, repository))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Auto-taggable vocabulary of a language as auto-tagger terms
    async fn auto_tag_terms(&self, language: &str) -> Result<Vec<TermSpec>> {
        let entries = self
            .repository
            .auto_taggable_vocabulary(language, &self.config.auto_tag_types())
            .await?;

        Ok(entries.iter().map(TermSpec::from).collect())
    }

    /// A throwaway copy of the stored vocabulary, so previews never write
    async fn preview_vocabulary(&self) -> Result<InMemoryVocabulary> {
        let entries = self.repository.list_vocabulary(None).await?;
        Ok(InMemoryVocabulary::with_entries(entries))
    }

    /// Parse the existing tags of a file, or of every subtitle file under a directory
    pub async fn parse_path(&self, path: &Path) -> Result<Vec<FileReport>> {
        let files = if path.is_dir() {
            FileManager::find_subtitle_files(path)?
        } else if path.is_file() {
            vec![path.to_path_buf()]
        } else {
            return Err(anyhow!("Input path does not exist: {:?}", path));
        };

        if files.is_empty() {
            return Err(anyhow!("No subtitle files found in directory: {:?}", path));
        }

        let vocabulary = self.preview_vocabulary().await?;
        let valid_types = self.config.valid_types();

        let progress_bar = ProgressBar::new(files.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("=> "));
        if files.len() == 1 {
            progress_bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        }

        let mut reports = Vec::new();
        let mut error_count = 0;

        for file in &files {
            let file_name = file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            progress_bar.set_message(file_name.clone());

            let parsed = SubtitleDocument::from_file(file).and_then(|document| {
                parse_cues(&document.cues, &self.config.language, &valid_types, &vocabulary)
            });

            match parsed {
                Ok(outcome) => {
                    debug!("{}: {} tags, {} errors", file_name, outcome.occurrences.len(), outcome.errors.len());
                    reports.push(FileReport {
                        path: file.clone(),
                        outcome,
                    });
                }
                Err(e) if files.len() == 1 => return Err(e),
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    error_count += 1;
                }
            }

            progress_bar.inc(1);
        }

        progress_bar.finish_and_clear();
        info!("Parsed {} files, {} failed", reports.len(), error_count);

        Ok(reports)
    }

    /// Write an auto-tagged WebVTT copy of a subtitle file
    pub async fn auto_tag_file(&self, input: &Path, output: Option<&Path>) -> Result<PathBuf> {
        let document = SubtitleDocument::from_file(input)?;
        let terms = self.auto_tag_terms(&self.config.language).await?;

        let tagger = AutoTagger::new(terms)?;
        let tagged = SubtitleDocument::from_cues(tagger.tag_cues(&document.cues));

        let output_path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| FileManager::generate_tagged_path(input));
        FileManager::write_to_file(&output_path, &tagged.to_vtt())?;

        info!("Success: {}", output_path.display());
        Ok(output_path)
    }

    /// Store a subtitle file as a transcript
    pub async fn import(&self, path: &Path, title: Option<&str>, language: Option<&str>) -> Result<ImportResult> {
        let content = FileManager::read_to_string(path)?;

        // refuse content the workflow could never parse
        SubtitleDocument::parse(&content)
            .with_context(|| format!("Failed to parse subtitle file: {}", path.display()))?;

        let default_title = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let title = title.unwrap_or(&default_title);
        let language = language.unwrap_or(&self.config.language);

        let result = self
            .repository
            .import_transcript(title, language, Some(path), content)
            .await?;

        if !result.created {
            warn!("Identical content already stored as transcript {}", result.transcript.id);
        }
        Ok(result)
    }

    async fn load_transcript(&self, id: i64) -> Result<Transcript> {
        self.repository
            .get_transcript(id)
            .await?
            .ok_or_else(|| TranscriptError::NotFound(id).into())
    }

    /// Auto-tag and parse a stored transcript, optionally replacing its stored tags.
    ///
    /// Without `save` nothing is written, including new vocabulary entries.
    pub async fn process_transcript(&self, id: i64, save: bool) -> Result<ProcessReport> {
        let transcript = self.load_transcript(id).await?;
        if !transcript.has_source() {
            return Err(TranscriptError::MissingSource(id).into());
        }

        let terms = self.auto_tag_terms(&transcript.language).await?;
        let valid_types = self.config.valid_types();

        let outcome = if save {
            let repository = self.repository.clone();
            let parsed = transcript.clone();
            tokio::task::spawn_blocking(move || parsed.parse_transcript(&terms, &valid_types, &repository))
                .await
                .context("Parse task panicked")??
        } else {
            let vocabulary = self.preview_vocabulary().await?;
            transcript.parse_transcript(&terms, &valid_types, &vocabulary)?
        };

        for parse_error in &outcome.errors {
            error!("{}", parse_error);
        }

        let saved = if !save {
            None
        } else if outcome.has_errors() && self.config.abort_on_errors {
            warn!("Not saving tags for {}: {} errors", transcript, outcome.errors.len());
            None
        } else {
            if outcome.occurrences.is_empty() {
                info!("No tags found in {}, clearing stored tags", transcript);
            }
            Some(self.repository.replace_all(id, outcome.occurrences.clone()).await?)
        };

        Ok(ProcessReport {
            transcript,
            outcome,
            saved,
        })
    }

    /// Stored tags of a transcript with their uniqueness scores, in time order
    pub async fn scores(&self, id: i64) -> Result<Vec<ScoredTag>> {
        self.load_transcript(id).await?;

        let mut tags = self.repository.get_tags(id).await?;
        tags.sort_by_key(|t| (t.exact_ms, t.id));

        let history: Vec<_> = tags.iter().map(TagRecord::to_history).collect();
        let scorer = UniquenessScorer::with_counts(self.repository.occurrence_counts(id).await?);
        let scores = scorer.score(&history);

        Ok(tags
            .into_iter()
            .zip(scores)
            .map(|(tag, uniqueness)| ScoredTag { tag, uniqueness })
            .collect())
    }

    /// Tags of a transcript grouped by type, with related transcripts
    pub async fn summary(&self, id: i64) -> Result<TagSummary> {
        self.load_transcript(id).await?;

        let own = self.repository.get_tags(id).await?;
        let related = self.repository.related_tags(id).await?;
        let labels: HashMap<String, String> = self
            .config
            .tag_types
            .iter()
            .map(|t| (t.name.clone(), t.label().to_string()))
            .collect();

        Ok(TagSummary::build(&own, &related, &labels))
    }

    pub async fn list_transcripts(&self) -> Result<Vec<Transcript>> {
        self.repository.list_transcripts().await
    }

    pub async fn list_vocabulary(&self, tag_type: Option<&str>) -> Result<Vec<VocabularyEntry>> {
        self.repository.list_vocabulary(tag_type).await
    }

    pub async fn update_vocabulary(&self, id: i64, update: VocabularyUpdate) -> Result<VocabularyEntry> {
        if update.is_empty() {
            warn!("Nothing to update for vocabulary entry {}", id);
        }
        self.repository.update_vocabulary(id, update).await
    }
}
