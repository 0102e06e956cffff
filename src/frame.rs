//! Frame values flowing between the decoder and the segmenter.
//!
//! [`DecodedFrame`] is one item of the decoder collaborator's stream;
//! [`FrameSample`] is what the sampler keeps. Both are generic over the
//! descriptor type `D`, which the pipeline never inspects beyond handing two
//! of them to a [`Similarity`](crate::Similarity) implementation.

/// A decoded frame tagged with its presentation time.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame<D> {
    /// Presentation timestamp in seconds.
    pub timestamp: f64,
    /// The decoded frame or its fingerprint.
    pub frame: D,
}

impl<D> DecodedFrame<D> {
    /// Pair `frame` with its presentation time in seconds.
    pub fn new(timestamp: f64, frame: D) -> Self {
        Self { timestamp, frame }
    }

    /// Convert the payload, keeping the timestamp.
    ///
    /// Used to fingerprint frames between decoding and sampling, e.g. to turn
    /// a [`DynamicImage`](image::DynamicImage) into a
    /// [`HistogramFrame`](crate::HistogramFrame).
    pub fn map<E>(self, f: impl FnOnce(D) -> E) -> DecodedFrame<E> {
        DecodedFrame {
            timestamp: self.timestamp,
            frame: f(self.frame),
        }
    }
}

/// A sampled frame: a timestamp plus an opaque, comparable descriptor.
///
/// Immutable once the sampler has produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSample<D> {
    timestamp: f64,
    descriptor: D,
}

impl<D> FrameSample<D> {
    /// Create a sample at `timestamp` seconds.
    pub fn new(timestamp: f64, descriptor: D) -> Self {
        Self {
            timestamp,
            descriptor,
        }
    }

    /// Presentation timestamp in seconds.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// The descriptor compared by the similarity metric.
    pub fn descriptor(&self) -> &D {
        &self.descriptor
    }

    /// Consume the sample, returning its descriptor.
    pub fn into_descriptor(self) -> D {
        self.descriptor
    }
}
