//! Scene segmentation.
//!
//! [`SceneSegmenter`] turns a stream of [`FrameSample`]s into gapless
//! [`SceneBuilder`] intervals. Each scene is anchored at its first sample;
//! every later sample is scored against that anchor, and a score strictly
//! below the similarity threshold starts a new scene at the later sample's
//! timestamp. A score exactly at the threshold stays in the current scene.

use crate::configuration::PipelineOptions;
use crate::error::PipelineError;
use crate::frame::FrameSample;
use crate::scene::SceneBuilder;
use crate::similarity::{Similarity, score};

/// Shortest trailing scene ever emitted, in seconds. Applies when
/// `min_scene_duration` is zero.
const MIN_TAIL_SECONDS: f64 = 1e-3;

/// A lazy iterator of scenes over a sample stream.
///
/// Holds only the current anchor and the latest timestamp. The last scene
/// ends at the last sample's timestamp; if that would make it zero-width it
/// is given `min_scene_duration` instead, and never less than a millisecond.
pub struct SceneSegmenter<'s, I, D, S: ?Sized> {
    samples: I,
    similarity: &'s S,
    threshold: f64,
    min_scene_duration: f64,
    anchor: Option<FrameSample<D>>,
    last_timestamp: f64,
    emitted: usize,
    done: bool,
}

impl<'s, I, D, S> SceneSegmenter<'s, I, D, S>
where
    I: Iterator<Item = Result<FrameSample<D>, PipelineError>>,
    S: Similarity<D> + ?Sized,
{
    /// Segment `samples` with the threshold and tail duration from `options`.
    pub fn new<T>(samples: T, similarity: &'s S, options: &PipelineOptions) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        log::debug!(
            "Segmenting scenes (threshold={}, min_scene_duration={})",
            options.similarity_threshold,
            options.min_scene_duration
        );
        Self {
            samples: samples.into_iter(),
            similarity,
            threshold: options.similarity_threshold,
            min_scene_duration: options.min_scene_duration,
            anchor: None,
            last_timestamp: 0.0,
            emitted: 0,
            done: false,
        }
    }

    fn close_final_scene(&mut self) -> Option<Result<SceneBuilder<D>, PipelineError>> {
        self.done = true;
        let Some(anchor) = self.anchor.take() else {
            return Some(Err(PipelineError::EmptyInput));
        };

        let start = anchor.timestamp();
        let mut end = self.last_timestamp;
        if end <= start {
            end = start + self.min_scene_duration.max(MIN_TAIL_SECONDS);
        }
        self.emitted += 1;
        log::debug!("Segmented {} scenes", self.emitted);
        Some(Ok(SceneBuilder::new(start, end, anchor)))
    }
}

impl<I, D, S> Iterator for SceneSegmenter<'_, I, D, S>
where
    I: Iterator<Item = Result<FrameSample<D>, PipelineError>>,
    S: Similarity<D> + ?Sized,
{
    type Item = Result<SceneBuilder<D>, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let sample = match self.samples.next() {
                Some(Ok(sample)) => sample,
                Some(Err(error)) => {
                    self.done = true;
                    return Some(Err(error));
                }
                None => return self.close_final_scene(),
            };

            self.last_timestamp = sample.timestamp();

            let similarity = self.anchor.as_ref().map(|anchor| {
                score(self.similarity, anchor.descriptor(), sample.descriptor())
            });

            match similarity {
                None => self.anchor = Some(sample),
                Some(value) if value >= self.threshold => {}
                Some(value) => {
                    let boundary = sample.timestamp();
                    log::debug!("Scene boundary at {boundary:.3}s (similarity {value:.3})");
                    if let Some(closed) = self.anchor.replace(sample) {
                        self.emitted += 1;
                        return Some(Ok(SceneBuilder::new(closed.timestamp(), boundary, closed)));
                    }
                }
            }
        }
    }
}
