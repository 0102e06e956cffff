//! Error types for the `lecture2pdf` crate.
//!
//! This module defines [`PipelineError`], the unified error type returned by
//! every fallible stage of the conversion pipeline. Variants carry enough
//! context (cue indices, offending timestamps, parser line numbers) to
//! diagnose a failed run without extra logging at the call site.

use std::io::Error as IoError;
#[cfg(feature = "ffmpeg")]
use std::path::PathBuf;

#[cfg(feature = "ffmpeg")]
use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use serde_json::Error as JsonError;
use thiserror::Error;

/// The unified error type for all `lecture2pdf` operations.
///
/// Every fatal variant aborts the run it occurs in; nothing in the pipeline
/// retries. [`PipelineError::UnsortedCue`] and [`PipelineError::InvalidCue`]
/// are the only variants the pipeline can degrade around (see
/// [`PipelineOptions::with_image_only_fallback`](crate::PipelineOptions::with_image_only_fallback)).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// The decoded frame stream broke its contract: a timestamp regressed,
    /// repeated, or was not a finite non-negative number, the decoder failed,
    /// or the stream produced no frames at all.
    #[error("Malformed frame stream: {0}")]
    MalformedStream(String),

    /// The segmenter was handed no samples (zero-length video).
    #[error("No content: the video produced no frame samples")]
    EmptyInput,

    /// Subtitle cues were not ordered by non-decreasing start time.
    #[error(
        "Subtitle cue {index} starts at {start}s, before the previous cue's start of {previous_start}s"
    )]
    UnsortedCue {
        /// Zero-based index of the first out-of-order cue.
        index: usize,
        /// Start time of that cue, in seconds.
        start: f64,
        /// Start time of the cue before it, in seconds.
        previous_start: f64,
    },

    /// A subtitle cue has an invalid interval.
    #[error("Invalid subtitle cue {index}: {reason}")]
    InvalidCue {
        /// Zero-based position of the cue in its source.
        index: usize,
        /// What is wrong with the cue.
        reason: String,
    },

    /// A configuration value is out of range. Raised before any frame is read.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// SRT or WebVTT text could not be parsed.
    #[error("Subtitle parse error at line {line}: {reason}")]
    SubtitleParse {
        /// One-based line number in the subtitle text.
        line: usize,
        /// Description of the problem.
        reason: String,
    },

    /// The document renderer rejected the page sequence.
    #[error("Render error: {0}")]
    Render(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate while encoding page images.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),

    /// The page manifest could not be serialised.
    #[error("JSON error: {0}")]
    Json(#[from] JsonError),

    /// The media file could not be opened.
    #[cfg(feature = "ffmpeg")]
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`VideoDecoder::open`](crate::decoder::VideoDecoder::open).
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[cfg(feature = "ffmpeg")]
    #[error("No video stream found in file")]
    NoVideoStream,

    /// The file does not contain a subtitle stream.
    #[cfg(feature = "ffmpeg")]
    #[error("No subtitle stream found in file")]
    NoSubtitleStream,

    /// An error originating from the FFmpeg libraries.
    #[cfg(feature = "ffmpeg")]
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),
}

#[cfg(feature = "ffmpeg")]
impl From<FfmpegError> for PipelineError {
    fn from(error: FfmpegError) -> Self {
        PipelineError::Ffmpeg(error.to_string())
    }
}
