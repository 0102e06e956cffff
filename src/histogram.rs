//! Colour histogram fingerprints.
//!
//! The default [`Similarity`] for decoded video: each frame is reduced to a
//! per-channel RGB histogram and two frames are compared by histogram
//! intersection. Slides that differ only by compression noise or a moving
//! cursor score close to 1; a new slide scores well below.
//!
//! # Example
//!
//! ```
//! use image::{DynamicImage, Rgb, RgbImage};
//! use lecture2pdf::{HistogramSimilarity, Similarity};
//!
//! let metric = HistogramSimilarity::new(16);
//! let white = metric.fingerprint(DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, Rgb([255, 255, 255]))));
//! let black = metric.fingerprint(DynamicImage::ImageRgb8(RgbImage::new(32, 32)));
//!
//! assert_eq!(metric.similarity(&white, &white), 1.0);
//! assert_eq!(metric.similarity(&white, &black), 0.0);
//! ```

use image::DynamicImage;

use crate::similarity::Similarity;

/// Bins per channel used by [`HistogramSimilarity::default`].
pub const DEFAULT_HISTOGRAM_BINS: usize = 32;

const CHANNELS: usize = 3;

/// Normalised per-channel RGB histogram.
///
/// `bins` buckets for red, then green, then blue; every channel sums to 1
/// unless the image had no pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorHistogram {
    bins: usize,
    values: Vec<f32>,
}

impl ColorHistogram {
    /// Compute the histogram of `image`. `bins` is clamped to `1..=256`.
    pub fn from_image(image: &DynamicImage, bins: usize) -> Self {
        let bins = bins.clamp(1, 256);
        let rgb = image.to_rgb8();
        let mut counts = vec![0u32; bins * CHANNELS];

        for pixel in rgb.pixels() {
            for (channel, &value) in pixel.0.iter().enumerate() {
                let bucket = usize::from(value) * bins / 256;
                counts[channel * bins + bucket] += 1;
            }
        }

        let total = rgb.width() as u64 * rgb.height() as u64;
        let values = counts
            .into_iter()
            .map(|count| {
                if total == 0 {
                    0.0
                } else {
                    (f64::from(count) / total as f64) as f32
                }
            })
            .collect();

        Self { bins, values }
    }

    /// Buckets per channel.
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Bucket fractions, red channel first.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Histogram intersection averaged over channels, in `[0, 1]`.
    ///
    /// Histograms with different bin counts, or of empty images, score 0.
    pub fn intersection(&self, other: &ColorHistogram) -> f64 {
        if self.bins != other.bins {
            return 0.0;
        }

        let overlap: f64 = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| f64::from(a.min(*b)))
            .sum();
        let mass = self
            .values
            .iter()
            .map(|&v| f64::from(v))
            .sum::<f64>()
            .max(other.values.iter().map(|&v| f64::from(v)).sum());

        if mass == 0.0 {
            return 0.0;
        }
        (overlap / mass).clamp(0.0, 1.0)
    }
}

/// A decoded frame together with its histogram fingerprint.
///
/// Keeping the image lets the renderer write the representative frame of
/// each scene without decoding the video again.
#[derive(Debug, Clone)]
pub struct HistogramFrame {
    image: DynamicImage,
    histogram: ColorHistogram,
}

impl HistogramFrame {
    /// Fingerprint `image` with `bins` buckets per channel.
    pub fn new(image: DynamicImage, bins: usize) -> Self {
        let histogram = ColorHistogram::from_image(&image, bins);
        Self { image, histogram }
    }

    /// The decoded frame.
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// The fingerprint compared by [`HistogramSimilarity`].
    pub fn histogram(&self) -> &ColorHistogram {
        &self.histogram
    }

    /// Consume the frame, dropping the histogram.
    pub fn into_image(self) -> DynamicImage {
        self.image
    }
}

/// Histogram-intersection similarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramSimilarity {
    bins: usize,
}

impl HistogramSimilarity {
    /// Create a metric with `bins` buckets per channel, clamped to `1..=256`.
    pub fn new(bins: usize) -> Self {
        Self {
            bins: bins.clamp(1, 256),
        }
    }

    /// Buckets per channel of the fingerprints this metric produces.
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Fingerprint `image` with this metric's bin count.
    pub fn fingerprint(&self, image: DynamicImage) -> HistogramFrame {
        HistogramFrame::new(image, self.bins)
    }
}

impl Default for HistogramSimilarity {
    fn default() -> Self {
        Self::new(DEFAULT_HISTOGRAM_BINS)
    }
}

impl Similarity<ColorHistogram> for HistogramSimilarity {
    fn similarity(&self, a: &ColorHistogram, b: &ColorHistogram) -> f64 {
        a.intersection(b)
    }
}

impl Similarity<HistogramFrame> for HistogramSimilarity {
    fn similarity(&self, a: &HistogramFrame, b: &HistogramFrame) -> f64 {
        a.histogram.intersection(&b.histogram)
    }
}
