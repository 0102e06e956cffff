//! Pipeline configuration.
//!
//! [`PipelineOptions`] is a builder that carries the segmentation thresholds,
//! the sampling interval, the degradation policy, and progress settings into
//! every stage constructor. [`FrameOutputOptions`] controls how the
//! FFmpeg decoder scales frames before they are fingerprinted.
//!
//! # Example
//!
//! ```
//! use lecture2pdf::PipelineOptions;
//!
//! let options = PipelineOptions::new()
//!     .with_sample_interval_seconds(0.5)
//!     .with_similarity_threshold(0.80)
//!     .with_dedup_threshold(0.97)
//!     .with_min_scene_duration(2.0);
//! assert!(options.validate().is_ok());
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

#[cfg(feature = "ffmpeg")]
use ffmpeg_next::format::Pixel;

use crate::error::PipelineError;
use crate::progress::{NoOpProgress, ProgressCallback};

/// Default seconds between samples.
pub const DEFAULT_SAMPLE_INTERVAL_SECONDS: f64 = 1.0;
/// Default segmentation cutoff on the 0–1 similarity scale.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;
/// Default deduplication cutoff; must stay above the segmentation cutoff.
pub const DEFAULT_DEDUP_THRESHOLD: f64 = 0.95;
/// Default floor, in seconds, for a zero-width trailing scene.
pub const DEFAULT_MIN_SCENE_DURATION: f64 = 1.0;

/// How the frame sampler thins the decoded stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleInterval {
    /// Sample a frame once at least this many seconds have passed since the
    /// previous sample.
    Seconds(f64),
    /// Sample every N-th decoded frame.
    EveryNthFrame(u64),
}

impl Default for SampleInterval {
    fn default() -> Self {
        SampleInterval::Seconds(DEFAULT_SAMPLE_INTERVAL_SECONDS)
    }
}

/// Configuration for one conversion pipeline.
///
/// A default-constructed value is valid. Call
/// [`validate`](PipelineOptions::validate) (done for you by
/// [`Pipeline::new`](crate::Pipeline::new)) to reject out-of-range values
/// before any frame is read.
#[derive(Clone)]
pub struct PipelineOptions {
    pub(crate) sample_interval: SampleInterval,
    pub(crate) similarity_threshold: f64,
    pub(crate) dedup_threshold: f64,
    pub(crate) dedup_enabled: bool,
    pub(crate) min_scene_duration: f64,
    /// When `true`, unusable cues degrade the run to image-only pages
    /// instead of failing it.
    pub(crate) image_only_fallback: bool,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    /// How often to fire the progress callback (every N items).
    pub(crate) batch_size: u64,
    /// Expected video length in seconds, used for progress percentages.
    pub(crate) expected_duration: Option<f64>,
}

impl Debug for PipelineOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PipelineOptions")
            .field("sample_interval", &self.sample_interval)
            .field("similarity_threshold", &self.similarity_threshold)
            .field("dedup_threshold", &self.dedup_threshold)
            .field("dedup_enabled", &self.dedup_enabled)
            .field("min_scene_duration", &self.min_scene_duration)
            .field("image_only_fallback", &self.image_only_fallback)
            .field("batch_size", &self.batch_size)
            .field("expected_duration", &self.expected_duration)
            .finish_non_exhaustive()
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineOptions {
    /// Create options with the default thresholds.
    ///
    /// Defaults: one sample per second, similarity threshold 0.85, dedup
    /// threshold 0.95 (enabled), minimum trailing scene 1 s, no image-only
    /// fallback, no progress callback.
    pub fn new() -> Self {
        Self {
            sample_interval: SampleInterval::default(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            dedup_threshold: DEFAULT_DEDUP_THRESHOLD,
            dedup_enabled: true,
            min_scene_duration: DEFAULT_MIN_SCENE_DURATION,
            image_only_fallback: false,
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
            expected_duration: None,
        }
    }

    /// Sample one frame every `seconds` of video.
    #[must_use]
    pub fn with_sample_interval_seconds(mut self, seconds: f64) -> Self {
        self.sample_interval = SampleInterval::Seconds(seconds);
        self
    }

    /// Sample every `n`-th decoded frame instead of by elapsed time.
    #[must_use]
    pub fn with_sample_every_nth_frame(mut self, n: u64) -> Self {
        self.sample_interval = SampleInterval::EveryNthFrame(n);
        self
    }

    /// Set the similarity score below which a new scene starts.
    #[must_use]
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Set the similarity score at or above which adjacent scenes merge.
    #[must_use]
    pub fn with_dedup_threshold(mut self, threshold: f64) -> Self {
        self.dedup_threshold = threshold;
        self
    }

    /// Enable or disable scene deduplication. Enabled by default.
    #[must_use]
    pub fn with_dedup(mut self, enabled: bool) -> Self {
        self.dedup_enabled = enabled;
        self
    }

    /// Set the duration given to a trailing scene that would otherwise have
    /// zero width.
    ///
    /// `0.0` is accepted; such a scene then lasts one millisecond, so every
    /// page keeps `start < end`.
    #[must_use]
    pub fn with_min_scene_duration(mut self, seconds: f64) -> Self {
        self.min_scene_duration = seconds;
        self
    }

    /// Produce image-only pages when the cue source is unusable instead of
    /// aborting the run.
    #[must_use]
    pub fn with_image_only_fallback(mut self, enabled: bool) -> Self {
        self.image_only_fallback = enabled;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Set how often the progress callback fires.
    ///
    /// A value of 1 means every item; 10 means every 10th item.
    /// Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Tell the progress reporter how long the video is, in seconds.
    #[must_use]
    pub fn with_expected_duration(mut self, seconds: f64) -> Self {
        self.expected_duration = Some(seconds);
        self
    }

    /// How frames are picked for comparison.
    pub fn sample_interval(&self) -> SampleInterval {
        self.sample_interval
    }

    /// Score below which the segmenter starts a new scene.
    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    /// Score at or above which a scene is folded into the previous one.
    pub fn dedup_threshold(&self) -> f64 {
        self.dedup_threshold
    }

    /// Whether the deduplication stage runs.
    pub fn dedup_enabled(&self) -> bool {
        self.dedup_enabled
    }

    /// Duration given to a zero-width trailing scene, in seconds.
    pub fn min_scene_duration(&self) -> f64 {
        self.min_scene_duration
    }

    /// Whether unusable cues degrade the run instead of failing it.
    pub fn image_only_fallback(&self) -> bool {
        self.image_only_fallback
    }

    /// Check every value against its allowed range.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Configuration`] naming the first offending option.
    pub fn validate(&self) -> Result<(), PipelineError> {
        match self.sample_interval {
            SampleInterval::Seconds(seconds) if !(seconds.is_finite() && seconds > 0.0) => {
                return Err(PipelineError::Configuration(format!(
                    "sample_interval_seconds must be a finite value > 0, got {seconds}"
                )));
            }
            SampleInterval::EveryNthFrame(0) => {
                return Err(PipelineError::Configuration(
                    "frame sampling stride must be greater than zero".to_string(),
                ));
            }
            _ => {}
        }

        let similarity = self.similarity_threshold;
        if !(similarity > 0.0 && similarity < 1.0) {
            return Err(PipelineError::Configuration(format!(
                "similarity_threshold must lie in (0, 1), got {similarity}"
            )));
        }

        let dedup = self.dedup_threshold;
        if !(dedup > similarity && dedup <= 1.0) {
            return Err(PipelineError::Configuration(format!(
                "dedup_threshold must lie in ({similarity}, 1], got {dedup}"
            )));
        }

        let floor = self.min_scene_duration;
        if !(floor.is_finite() && floor >= 0.0) {
            return Err(PipelineError::Configuration(format!(
                "min_scene_duration must be a finite value >= 0, got {floor}"
            )));
        }

        if let Some(duration) = self.expected_duration
            && !(duration.is_finite() && duration > 0.0)
        {
            return Err(PipelineError::Configuration(format!(
                "expected duration must be a finite value > 0, got {duration}"
            )));
        }

        Ok(())
    }
}

/// Output pixel format for decoded frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// 8-bit RGB (24 bpp). This is the default.
    #[default]
    Rgb8,
    /// 8-bit grayscale (8 bpp). Cheaper to fingerprint, but pages lose colour.
    Gray8,
}

impl PixelFormat {
    #[cfg(feature = "ffmpeg")]
    pub(crate) fn to_ffmpeg_pixel(self) -> Pixel {
        match self {
            PixelFormat::Rgb8 => Pixel::RGB24,
            PixelFormat::Gray8 => Pixel::GRAY8,
        }
    }

    #[cfg(feature = "ffmpeg")]
    pub(crate) fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// Frame output settings for the FFmpeg decoder.
///
/// When no dimensions are set the source resolution is used. Setting one
/// dimension together with
/// [`maintain_aspect_ratio`](FrameOutputOptions::maintain_aspect_ratio)
/// computes the other one.
#[derive(Debug, Clone)]
pub struct FrameOutputOptions {
    /// Output pixel format.
    pub pixel_format: PixelFormat,
    /// Target width. `None` keeps the source width.
    pub width: Option<u32>,
    /// Target height. `None` keeps the source height.
    pub height: Option<u32>,
    /// When `true` and only one dimension is specified, the other is
    /// computed to preserve the source aspect ratio.
    pub maintain_aspect_ratio: bool,
}

impl Default for FrameOutputOptions {
    fn default() -> Self {
        Self {
            pixel_format: PixelFormat::Rgb8,
            width: None,
            height: None,
            maintain_aspect_ratio: true,
        }
    }
}

impl FrameOutputOptions {
    /// Resolve the final output dimensions given the source size.
    ///
    /// Returns `(width, height)`.
    #[cfg_attr(not(feature = "ffmpeg"), allow(dead_code))]
    pub(crate) fn resolve_dimensions(&self, source_width: u32, source_height: u32) -> (u32, u32) {
        match (self.width, self.height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) if self.maintain_aspect_ratio && source_width > 0 => {
                let ratio = w as f64 / source_width as f64;
                let h = (source_height as f64 * ratio).round() as u32;
                (w, h.max(1))
            }
            (Some(w), None) => (w, source_height),
            (None, Some(h)) if self.maintain_aspect_ratio && source_height > 0 => {
                let ratio = h as f64 / source_height as f64;
                let w = (source_width as f64 * ratio).round() as u32;
                (w.max(1), h)
            }
            (None, Some(h)) => (source_width, h),
            (None, None) => (source_width, source_height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = PipelineOptions::new();
        assert!(options.validate().is_ok());
        assert_eq!(options.similarity_threshold(), DEFAULT_SIMILARITY_THRESHOLD);
        assert!(options.dedup_enabled());
        assert!(!options.image_only_fallback());
    }

    #[test]
    fn batch_size_clamps_zero() {
        let options = PipelineOptions::new().with_batch_size(0);
        assert!(format!("{options:?}").contains("batch_size: 1"));
    }

    #[test]
    fn rejects_non_positive_interval() {
        for seconds in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let options = PipelineOptions::new().with_sample_interval_seconds(seconds);
            assert!(matches!(
                options.validate(),
                Err(PipelineError::Configuration(_))
            ));
        }
        let options = PipelineOptions::new().with_sample_every_nth_frame(0);
        assert!(options.validate().is_err());
    }

    #[test]
    fn similarity_threshold_is_open_interval() {
        for threshold in [0.0, 1.0, -0.2, f64::NAN] {
            let options = PipelineOptions::new()
                .with_similarity_threshold(threshold)
                .with_dedup_threshold(1.0);
            assert!(options.validate().is_err(), "{threshold} accepted");
        }
    }

    #[test]
    fn dedup_threshold_must_exceed_similarity() {
        let equal = PipelineOptions::new()
            .with_similarity_threshold(0.9)
            .with_dedup_threshold(0.9);
        assert!(equal.validate().is_err());

        let one = PipelineOptions::new()
            .with_similarity_threshold(0.9)
            .with_dedup_threshold(1.0);
        assert!(one.validate().is_ok());

        let above_one = PipelineOptions::new().with_dedup_threshold(1.01);
        assert!(above_one.validate().is_err());
    }

    #[test]
    fn min_scene_duration_may_be_zero() {
        assert!(PipelineOptions::new().with_min_scene_duration(0.0).validate().is_ok());
        assert!(PipelineOptions::new().with_min_scene_duration(-0.1).validate().is_err());
    }

    #[test]
    fn resolve_dimensions_keeps_aspect_ratio() {
        let output = FrameOutputOptions {
            width: Some(320),
            ..FrameOutputOptions::default()
        };
        assert_eq!(output.resolve_dimensions(640, 480), (320, 240));

        let output = FrameOutputOptions {
            height: Some(240),
            ..FrameOutputOptions::default()
        };
        assert_eq!(output.resolve_dimensions(640, 480), (320, 240));

        let output = FrameOutputOptions {
            width: Some(200),
            height: Some(100),
            maintain_aspect_ratio: false,
            ..FrameOutputOptions::default()
        };
        assert_eq!(output.resolve_dimensions(640, 480), (200, 100));
    }
}
