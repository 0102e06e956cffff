//! Subtitle cues and SRT / WebVTT parsing.
//!
//! [`SubtitleCue`] is the shape every cue source produces, whether a
//! subtitle file, an embedded subtitle track (see
//! [`decoder::extract_subtitle_cues`](crate::decoder)) or a transcription
//! service. The aligner only reads cues; it never reorders or edits them.
//!
//! # Example
//!
//! ```
//! use lecture2pdf::{SubtitleFormat, parse_subtitles};
//!
//! let srt = "1\n00:00:01,000 --> 00:00:04,500\nHello <i>world</i>\n";
//! let cues = parse_subtitles(srt, SubtitleFormat::Srt)?;
//! assert_eq!(cues[0].text, "Hello world");
//! assert_eq!(cues[0].end, 4.5);
//! # Ok::<(), lecture2pdf::PipelineError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;

use crate::error::PipelineError;

/// A single subtitle entry: an interval in seconds and its text.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    /// When the cue starts, in seconds.
    pub start: f64,
    /// When the cue ends, in seconds. Must be greater than `start`.
    pub end: f64,
    /// The spoken text, markup removed.
    pub text: String,
}

impl SubtitleCue {
    /// Create a cue shown from `start` to `end` seconds.
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// The instant the aligner uses to place this cue.
    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Input format of a subtitle file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    /// SubRip Text (.srt).
    Srt,
    /// Web Video Text Tracks (.vtt).
    WebVtt,
}

impl SubtitleFormat {
    /// Guess the format from a file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "srt" => Some(SubtitleFormat::Srt),
            "vtt" | "webvtt" => Some(SubtitleFormat::WebVtt),
            _ => None,
        }
    }
}

impl Display for SubtitleFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SubtitleFormat::Srt => write!(f, "SRT"),
            SubtitleFormat::WebVtt => write!(f, "WebVTT"),
        }
    }
}

/// Parse subtitle text in the given format.
///
/// Cues are returned in file order; ordering is checked later by the
/// aligner, not corrected here.
///
/// # Errors
///
/// [`PipelineError::SubtitleParse`] with the offending line number.
pub fn parse_subtitles(text: &str, format: SubtitleFormat) -> Result<Vec<SubtitleCue>, PipelineError> {
    match format {
        SubtitleFormat::Srt => parse_srt(text),
        SubtitleFormat::WebVtt => parse_webvtt(text),
    }
}

/// Read and parse a subtitle file, picking the format from its extension.
///
/// # Errors
///
/// I/O errors, [`PipelineError::SubtitleParse`] for bad content, or for an
/// extension other than `.srt` / `.vtt`.
pub fn load_subtitles<P: AsRef<Path>>(path: P) -> Result<Vec<SubtitleCue>, PipelineError> {
    let path = path.as_ref();
    let format = SubtitleFormat::from_path(path).ok_or_else(|| PipelineError::SubtitleParse {
        line: 0,
        reason: format!("unrecognised subtitle extension: {}", path.display()),
    })?;
    log::debug!("Loading {format} subtitles from {}", path.display());
    let text = std::fs::read_to_string(path)?;
    parse_subtitles(&text, format)
}

/// Parse SubRip text.
pub fn parse_srt(text: &str) -> Result<Vec<SubtitleCue>, PipelineError> {
    let mut cues = Vec::new();
    let mut lines = numbered_lines(text);

    while let Some((number, line)) = lines.next() {
        if line.trim().is_empty() {
            continue;
        }

        // The counter line is optional in the wild.
        let timing = if line.contains("-->") {
            (number, line)
        } else {
            lines.next().ok_or_else(|| PipelineError::SubtitleParse {
                line: number,
                reason: "cue counter without a timing line".to_string(),
            })?
        };

        let (start, end) = parse_timing_line(timing.1, timing.0)?;
        let body = collect_body(&mut lines);
        cues.push(SubtitleCue::new(start, end, body));
    }

    Ok(cues)
}

/// Parse WebVTT text. `NOTE`, `STYLE` and `REGION` blocks are skipped;
/// cue settings after the end timestamp are ignored.
pub fn parse_webvtt(text: &str) -> Result<Vec<SubtitleCue>, PipelineError> {
    let mut lines = numbered_lines(text);

    match lines.next() {
        Some((_, header)) if header.starts_with("WEBVTT") => {}
        Some((number, _)) => {
            return Err(PipelineError::SubtitleParse {
                line: number,
                reason: "missing WEBVTT header".to_string(),
            });
        }
        None => return Ok(Vec::new()),
    }
    // Header metadata runs until the first blank line.
    for (_, line) in lines.by_ref() {
        if line.trim().is_empty() {
            break;
        }
    }

    let mut cues = Vec::new();
    while let Some((number, line)) = lines.next() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if ["NOTE", "STYLE", "REGION"]
            .iter()
            .any(|keyword| trimmed == *keyword || trimmed.starts_with(&format!("{keyword} ")))
        {
            skip_block(&mut lines);
            continue;
        }

        let timing = if trimmed.contains("-->") {
            (number, line)
        } else {
            // Cue identifier.
            match lines.next() {
                Some(next) if next.1.contains("-->") => next,
                _ => {
                    return Err(PipelineError::SubtitleParse {
                        line: number,
                        reason: "cue identifier without a timing line".to_string(),
                    });
                }
            }
        };

        let (start, end) = parse_timing_line(timing.1, timing.0)?;
        let body = collect_body(&mut lines);
        cues.push(SubtitleCue::new(start, end, body));
    }

    Ok(cues)
}

fn numbered_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.trim_start_matches('\u{feff}')
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
}

fn skip_block<'a>(lines: &mut impl Iterator<Item = (usize, &'a str)>) {
    for (_, line) in lines.by_ref() {
        if line.trim().is_empty() {
            break;
        }
    }
}

fn collect_body<'a>(lines: &mut impl Iterator<Item = (usize, &'a str)>) -> String {
    let mut parts = Vec::new();
    for (_, line) in lines.by_ref() {
        if line.trim().is_empty() {
            break;
        }
        let cleaned = strip_markup(line);
        if !cleaned.is_empty() {
            parts.push(cleaned);
        }
    }
    parts.join("\n")
}

fn parse_timing_line(line: &str, number: usize) -> Result<(f64, f64), PipelineError> {
    let error = |reason: String| PipelineError::SubtitleParse {
        line: number,
        reason,
    };

    let (left, right) = line
        .split_once("-->")
        .ok_or_else(|| error(format!("expected a timing line, got {line:?}")))?;
    let end_token = right.split_whitespace().next().unwrap_or_default();

    let start = parse_timestamp(left.trim())
        .ok_or_else(|| error(format!("bad start timestamp {:?}", left.trim())))?;
    let end = parse_timestamp(end_token)
        .ok_or_else(|| error(format!("bad end timestamp {end_token:?}")))?;

    if end <= start {
        return Err(error(format!("cue ends at {end}s, not after its start {start}s")));
    }
    Ok((start, end))
}

/// Parse `HH:MM:SS,mmm`, `HH:MM:SS.mmm` or `MM:SS.mmm` into seconds.
pub(crate) fn parse_timestamp(token: &str) -> Option<f64> {
    let fields: Vec<&str> = token.split(':').collect();
    let (hours, minutes, seconds) = match fields.as_slice() {
        [h, m, s] => (h.parse::<u64>().ok()?, m.parse::<u64>().ok()?, *s),
        [m, s] => (0, m.parse::<u64>().ok()?, *s),
        _ => return None,
    };

    let (whole, fraction) = match seconds.split_once([',', '.']) {
        Some((whole, fraction)) => (whole, fraction),
        None => (seconds, ""),
    };
    let whole = whole.parse::<u64>().ok()?;
    if minutes >= 60 || whole >= 60 {
        return None;
    }
    let fraction = if fraction.is_empty() {
        0.0
    } else if fraction.bytes().all(|b| b.is_ascii_digit()) {
        fraction.parse::<u64>().ok()? as f64 / 10f64.powi(fraction.len() as i32)
    } else {
        return None;
    };

    let total = hours
        .checked_mul(3600)?
        .checked_add(minutes * 60 + whole)?;
    Some(total as f64 + fraction)
}

/// Remove HTML-style tags and ASS `{\...}` override blocks, unescape the
/// common entities, and trim.
pub(crate) fn strip_markup(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut closing: Option<char> = None;

    for c in input.chars() {
        match closing {
            Some(end) if c == end => closing = None,
            Some(_) => {}
            None if c == '<' => closing = Some('>'),
            None if c == '{' => closing = Some('}'),
            None => result.push(c),
        }
    }

    result
        .replace("\\N", "\n")
        .replace("\\n", "\n")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}
