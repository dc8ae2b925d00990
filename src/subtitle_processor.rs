use std::fmt;
use std::fs;
use std::path::Path;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context};
use log::{debug, warn};

use crate::errors::{AppError, SubtitleError};

// @module: Timed subtitle cues and the WebVTT/SRT readers that produce them

// @const: Cue timing line, either `HH:MM:SS.mmm`, `MM:SS.mmm` or SRT's comma form
static TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*((?:\d+:)?\d{2}:\d{2}[.,]\d{3})\s+-->\s+((?:\d+:)?\d{2}:\d{2}[.,]\d{3})(?:\s+.*)?$")
        .expect("Invalid timing regex")
});

/// Single timed subtitle cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// Start time in ms
    pub start_ms: u64,

    /// End time in ms
    pub end_ms: u64,

    /// Raw cue text, markup included
    pub text: String,
}

impl Cue {
    pub fn new(start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        Cue {
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    /// Cue length in ms
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} --> {}", format_timestamp(self.start_ms), format_timestamp(self.end_ms))?;
        writeln!(f, "{}", self.text)
    }
}

/// Anything that can yield the ordered cue sequence of a transcript
pub trait CueSource {
    /// Read the cues, in transcript order
    fn cues(&self) -> Result<Vec<Cue>, AppError>;
}

/// Subtitle file flavours understood by the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    WebVtt,
    Srt,
}

impl SubtitleFormat {
    /// Guess the format from the content signature
    pub fn detect(content: &str) -> Self {
        if content.trim_start_matches('\u{feff}').starts_with("WEBVTT") {
            SubtitleFormat::WebVtt
        } else {
            SubtitleFormat::Srt
        }
    }
}

/// An in-memory subtitle file
#[derive(Debug, Clone)]
pub struct SubtitleDocument {
    /// Format the document was read from
    pub format: SubtitleFormat,

    /// Cues in file order
    pub cues: Vec<Cue>,
}

impl SubtitleDocument {
    /// Wrap an existing cue sequence
    pub fn from_cues(cues: Vec<Cue>) -> Self {
        SubtitleDocument {
            format: SubtitleFormat::WebVtt,
            cues,
        }
    }

    /// Parse subtitle content, detecting WebVTT or SRT
    pub fn parse(content: &str) -> Result<Self, SubtitleError> {
        let format = SubtitleFormat::detect(content);
        let cues = match format {
            SubtitleFormat::WebVtt => parse_vtt_string(content)?,
            SubtitleFormat::Srt => parse_srt_string(content)?,
        };

        Ok(SubtitleDocument { format, cues })
    }

    /// Read and parse a subtitle file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse subtitle file: {}", path.display()))
    }

    /// Render as WebVTT with numeric cue indexes
    pub fn to_vtt(&self) -> String {
        write_vtt_string(&self.cues)
    }

    /// Write as WebVTT to a file
    pub fn write_to_vtt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        fs::write(path, self.to_vtt())
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))
    }
}

impl CueSource for SubtitleDocument {
    fn cues(&self) -> Result<Vec<Cue>, AppError> {
        Ok(self.cues.clone())
    }
}

/// Parse WebVTT content into cues
///
/// The `WEBVTT` signature is required. Header metadata and `NOTE`, `STYLE` and
/// `REGION` blocks are skipped. Cue settings after the end time are ignored.
pub fn parse_vtt_string(content: &str) -> Result<Vec<Cue>, SubtitleError> {
    let content = content.trim_start_matches('\u{feff}');
    let first_line = content.lines().next().unwrap_or_default().trim_end();

    let valid_header = first_line == "WEBVTT"
        || first_line.starts_with("WEBVTT ")
        || first_line.starts_with("WEBVTT\t");
    if !valid_header {
        return Err(SubtitleError::InvalidHeader(first_line.to_string()));
    }

    // the first block is the header and its metadata
    parse_blocks(content, true)
}

/// Parse SRT content into cues
pub fn parse_srt_string(content: &str) -> Result<Vec<Cue>, SubtitleError> {
    parse_blocks(content.trim_start_matches('\u{feff}'), false)
}

/// Walk blank-line separated blocks, turning each into a cue
fn parse_blocks(content: &str, skip_header: bool) -> Result<Vec<Cue>, SubtitleError> {
    let mut cues = Vec::new();
    let mut block: Vec<(usize, &str)> = Vec::new();
    let mut header_pending = skip_header;

    let lines = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')));

    for (line_num, line) in lines.chain(std::iter::once((0, ""))) {
        if !line.trim().is_empty() {
            block.push((line_num, line));
            continue;
        }

        if block.is_empty() {
            continue;
        }

        if header_pending {
            header_pending = false;
        } else if let Some(cue) = parse_block(&block)? {
            cues.push(cue);
        }
        block.clear();
    }

    if cues.is_empty() {
        warn!("No cues found in subtitle content");
    } else {
        debug!("Parsed {} cues", cues.len());
    }

    Ok(cues)
}

/// Turn one block into a cue; comment blocks yield `None`
fn parse_block(block: &[(usize, &str)]) -> Result<Option<Cue>, SubtitleError> {
    let (first_num, first) = block[0];

    if ["NOTE", "STYLE", "REGION"].iter().any(|kw| first.starts_with(kw)) {
        return Ok(None);
    }

    // the identifier line is optional
    let timing_idx = if first.contains("-->") || block.len() == 1 { 0 } else { 1 };
    let (line_num, timing) = block.get(timing_idx).copied().unwrap_or((first_num, first));

    let caps = TIMING_REGEX.captures(timing).ok_or_else(|| SubtitleError::InvalidTiming {
        line: line_num,
        content: timing.to_string(),
    })?;

    let invalid = || SubtitleError::InvalidTiming {
        line: line_num,
        content: timing.to_string(),
    };
    let start_ms = parse_timestamp(&caps[1]).ok_or_else(invalid)?;
    let end_ms = parse_timestamp(&caps[2]).ok_or_else(invalid)?;

    if end_ms < start_ms {
        return Err(SubtitleError::InvertedTiming {
            line: line_num,
            start_ms,
            end_ms,
        });
    }

    let text = block[timing_idx + 1..]
        .iter()
        .map(|(_, line)| *line)
        .collect::<Vec<_>>()
        .join("\n");

    Ok(Some(Cue::new(start_ms, end_ms, text)))
}

/// Parse `HH:MM:SS.mmm`, `MM:SS.mmm` or `HH:MM:SS,mmm` to milliseconds
pub fn parse_timestamp(timestamp: &str) -> Option<u64> {
    let (clock, millis) = timestamp.trim().split_once(['.', ','])?;
    let parts: Vec<&str> = clock.split(':').collect();

    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (h.parse::<u64>().ok()?, m.parse::<u64>().ok()?, s.parse::<u64>().ok()?),
        [m, s] => (0, m.parse::<u64>().ok()?, s.parse::<u64>().ok()?),
        _ => return None,
    };
    let millis: u64 = millis.parse().ok()?;

    if minutes >= 60 || seconds >= 60 || millis >= 1000 {
        return None;
    }

    hours
        .checked_mul(3_600_000)?
        .checked_add(minutes * 60_000 + seconds * 1_000 + millis)
}

/// Format milliseconds as a WebVTT timestamp (HH:MM:SS.mmm)
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

/// Render cues as WebVTT, numbering them from 1
pub fn write_vtt_string(cues: &[Cue]) -> String {
    let mut output = String::from("WEBVTT\n");

    for (i, cue) in cues.iter().enumerate() {
        output.push('\n');
        output.push_str(&format!("{}\n{}", i + 1, cue));
    }

    output
}
