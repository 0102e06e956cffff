//! Scene deduplication.
//!
//! Camera flicker and compression noise can split one slide into several
//! scenes. [`SceneDeduplicator`] compares each scene's representative frame
//! with that of the last scene it kept, using a threshold stricter than the
//! segmenter's, and folds near-duplicates into the kept scene by extending
//! its end. Timeline coverage is unchanged: a dropped scene's interval is
//! always absorbed, never lost.

use crate::configuration::PipelineOptions;
use crate::error::PipelineError;
use crate::scene::SceneBuilder;
use crate::similarity::{Similarity, score};

/// A lazy iterator that merges near-duplicate neighbouring scenes.
///
/// Holds back one kept scene until it sees the next distinct one (or the
/// end of the stream). The first scene is always kept; the last may be
/// absorbed into the one before it. When deduplication is disabled in the
/// options, scenes pass through unchanged.
pub struct SceneDeduplicator<'s, I, D, S: ?Sized> {
    scenes: I,
    similarity: &'s S,
    threshold: f64,
    enabled: bool,
    kept: Option<SceneBuilder<D>>,
    absorbed: usize,
    done: bool,
}

impl<'s, I, D, S> SceneDeduplicator<'s, I, D, S>
where
    I: Iterator<Item = Result<SceneBuilder<D>, PipelineError>>,
    S: Similarity<D> + ?Sized,
{
    /// Wrap `scenes`, reading the threshold and toggle from `options`.
    pub fn new<T>(scenes: T, similarity: &'s S, options: &PipelineOptions) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        log::debug!(
            "Deduplicating scenes (enabled={}, threshold={})",
            options.dedup_enabled,
            options.dedup_threshold
        );
        Self {
            scenes: scenes.into_iter(),
            similarity,
            threshold: options.dedup_threshold,
            enabled: options.dedup_enabled,
            kept: None,
            absorbed: 0,
            done: false,
        }
    }

    /// Number of scenes folded into an earlier one so far.
    pub fn absorbed(&self) -> usize {
        self.absorbed
    }
}

impl<I, D, S> Iterator for SceneDeduplicator<'_, I, D, S>
where
    I: Iterator<Item = Result<SceneBuilder<D>, PipelineError>>,
    S: Similarity<D> + ?Sized,
{
    type Item = Result<SceneBuilder<D>, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.enabled {
            return self.scenes.next();
        }

        loop {
            let scene = match self.scenes.next() {
                Some(Ok(scene)) => scene,
                Some(Err(error)) => {
                    self.done = true;
                    self.kept = None;
                    return Some(Err(error));
                }
                None => {
                    self.done = true;
                    if self.absorbed > 0 {
                        log::debug!("Absorbed {} duplicate scenes", self.absorbed);
                    }
                    return self.kept.take().map(Ok);
                }
            };

            let Some(mut kept) = self.kept.take() else {
                self.kept = Some(scene);
                continue;
            };

            let value = score(
                self.similarity,
                kept.representative().descriptor(),
                scene.representative().descriptor(),
            );
            if value >= self.threshold {
                log::debug!(
                    "Absorbing scene [{:.3}, {:.3}) into scene starting at {:.3}s (similarity {value:.3})",
                    scene.start(),
                    scene.end(),
                    kept.start()
                );
                kept.absorb(scene.end());
                self.absorbed += 1;
                self.kept = Some(kept);
            } else {
                self.kept = Some(scene);
                return Some(Ok(kept));
            }
        }
    }
}
