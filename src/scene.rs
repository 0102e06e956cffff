//! Scene intervals.
//!
//! A scene goes through two phases. While the pipeline is still working on
//! it, it is a [`SceneBuilder`]: the segmenter creates it, the deduplicator
//! may stretch its end, and the aligner appends cue text. Once the aligner
//! is done with it, [`SceneBuilder::build`] freezes it into a read-only
//! [`Scene`].

use crate::frame::FrameSample;

/// A scene still open to modification by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneBuilder<D> {
    start: f64,
    end: f64,
    representative: FrameSample<D>,
    cue_text: Vec<String>,
}

impl<D> SceneBuilder<D> {
    /// Start a scene spanning `[start, end)` with no cue text.
    pub fn new(start: f64, end: f64, representative: FrameSample<D>) -> Self {
        debug_assert!(start <= end, "scene interval [{start}, {end}) is inverted");
        Self {
            start,
            end,
            representative,
            cue_text: Vec::new(),
        }
    }

    /// Start of the interval, in seconds.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Current end of the interval, in seconds.
    pub fn end(&self) -> f64 {
        self.end
    }

    /// The frame that opened the scene.
    pub fn representative(&self) -> &FrameSample<D> {
        &self.representative
    }

    /// Extend this scene over a following one that was dropped.
    pub(crate) fn absorb(&mut self, end: f64) {
        if end > self.end {
            self.end = end;
        }
    }

    pub(crate) fn push_cue(&mut self, text: &str) {
        self.cue_text.push(text.to_string());
    }

    /// Freeze the scene.
    pub fn build(self) -> Scene<D> {
        Scene {
            start: self.start,
            end: self.end,
            representative: self.representative,
            cue_text: self.cue_text,
        }
    }
}

/// A finished, immutable scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene<D> {
    start: f64,
    end: f64,
    representative: FrameSample<D>,
    cue_text: Vec<String>,
}

impl<D> Scene<D> {
    /// Start of the interval, in seconds.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// End of the interval, in seconds. Equal to the next scene's start.
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Length of the interval, in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// The frame that opened the scene.
    pub fn representative(&self) -> &FrameSample<D> {
        &self.representative
    }

    /// Cue texts in chronological order.
    pub fn cue_text(&self) -> &[String] {
        &self.cue_text
    }

    pub(crate) fn into_parts(self) -> (f64, f64, FrameSample<D>, Vec<String>) {
        (self.start, self.end, self.representative, self.cue_text)
    }
}
