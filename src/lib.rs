//! # lecture2pdf
//!
//! Turn a recorded lecture into a slide-by-slide document: one page per
//! visually stable scene, each carrying its representative frame and the
//! subtitle text spoken while it was on screen.
//!
//! The conversion is a lazy, pull-based chain of iterators. Frames are read
//! once, forward-only; memory stays bounded by one anchor frame and one
//! pending scene per stage, however long the video is.
//!
//! ```text
//! frames ─▶ FrameSampler ─▶ SceneSegmenter ─▶ SceneDeduplicator
//!        ─▶ SubtitleAligner ─▶ PageAssembler ─▶ DocumentRenderer
//! ```
//!
//! ## Quick Start
//!
//! ### Any frame source
//!
//! The pipeline never looks inside a frame. It only asks a [`Similarity`]
//! how alike two descriptors are, so any fingerprint works:
//!
//! ```
//! use lecture2pdf::{DecodedFrame, Pipeline, PipelineOptions, parse_subtitles, SubtitleFormat};
//!
//! let pipeline = Pipeline::new(PipelineOptions::new(), |a: &u8, b: &u8| {
//!     if a == b { 1.0 } else { 0.0 }
//! })?;
//!
//! let slides = [1u8, 1, 1, 2, 2, 3];
//! let frames = slides
//!     .iter()
//!     .enumerate()
//!     .map(|(second, &slide)| Ok(DecodedFrame::new(second as f64, slide)));
//! let cues = parse_subtitles(
//!     "1\n00:00:00,500 --> 00:00:02,000\nHello\n\n2\n00:00:03,000 --> 00:00:04,500\nSecond slide\n",
//!     SubtitleFormat::Srt,
//! )?;
//!
//! let pages = pipeline.collect_pages(frames, &cues)?;
//! assert_eq!(pages.len(), 3);
//! assert_eq!(pages[1].text, "Second slide");
//! # Ok::<(), lecture2pdf::PipelineError>(())
//! ```
//!
//! ### A video file
//!
//! ```no_run
//! # #[cfg(feature = "ffmpeg")]
//! # fn main() -> Result<(), lecture2pdf::PipelineError> {
//! use lecture2pdf::decoder::VideoDecoder;
//! use lecture2pdf::{
//!     FrameOutputOptions, HistogramSimilarity, ManifestRenderer, Pipeline, PipelineOptions,
//!     load_subtitles,
//! };
//!
//! let metric = HistogramSimilarity::default();
//! let frames = VideoDecoder::open("lecture.mp4", FrameOutputOptions::default())?.fingerprinted(metric);
//! let cues = load_subtitles("lecture.srt")?;
//!
//! let pipeline = Pipeline::new(PipelineOptions::new().with_sample_interval_seconds(2.0), metric)?;
//! let report = pipeline.convert(frames, &cues, &mut ManifestRenderer::new("lecture_pages"))?;
//! println!("{report}");
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "ffmpeg"))]
//! # fn main() {}
//! ```
//!
//! ## Features
//!
//! - **Frame sampling** every N seconds or every Nth frame, always keeping
//!   the first and last frame
//! - **Scene segmentation** against a per-scene anchor with a configurable
//!   similarity threshold and a minimum trailing-scene duration
//! - **Deduplication** of spuriously split scenes with a stricter threshold
//! - **Subtitle alignment** by cue midpoint with deterministic boundary
//!   tie-breaking; no cue is ever dropped
//! - **SRT and WebVTT** parsing
//! - **Image-only fallback** when subtitles are unusable
//! - **Progress callbacks** for sampling and page assembly
//! - **Validation** of the finished page sequence
//! - **Manifest output**: PNG per page plus a `pages.json` index
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ffmpeg` | `VideoDecoder` and embedded subtitle extraction via FFmpeg |
//! | `rayon` | `Pipeline::convert_batch` runs many lectures on the rayon pool |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! The `ffmpeg` feature needs the FFmpeg development libraries installed on
//! your system. Everything else is pure Rust.

pub mod aligner;
pub mod assembler;
pub mod configuration;
#[cfg(feature = "ffmpeg")]
pub mod decoder;
pub mod dedup;
pub mod error;
pub mod frame;
pub mod histogram;
#[cfg(feature = "rayon")]
mod parallel;
pub mod pipeline;
pub mod progress;
pub mod render;
pub mod sampler;
pub mod scene;
pub mod segmenter;
pub mod similarity;
pub mod subtitle;
pub mod validation;

pub use aligner::{SubtitleAligner, validate_cues};
pub use assembler::{PageAssembler, PageRecord, join_cue_text};
pub use configuration::{
    DEFAULT_DEDUP_THRESHOLD, DEFAULT_MIN_SCENE_DURATION, DEFAULT_SAMPLE_INTERVAL_SECONDS,
    DEFAULT_SIMILARITY_THRESHOLD, FrameOutputOptions, PipelineOptions, PixelFormat,
    SampleInterval,
};
pub use dedup::SceneDeduplicator;
pub use error::PipelineError;
pub use frame::{DecodedFrame, FrameSample};
pub use histogram::{ColorHistogram, DEFAULT_HISTOGRAM_BINS, HistogramFrame, HistogramSimilarity};
pub use pipeline::{Pages, Pipeline};
pub use progress::{OperationType, ProgressCallback, ProgressInfo};
pub use render::{DocumentRenderer, ManifestRenderer, PageImage};
pub use sampler::FrameSampler;
pub use scene::{Scene, SceneBuilder};
pub use segmenter::SceneSegmenter;
pub use similarity::Similarity;
pub use subtitle::{
    SubtitleCue, SubtitleFormat, load_subtitles, parse_srt, parse_subtitles, parse_webvtt,
};
pub use validation::{ValidationReport, validate_pages};
