//! Subtitle-to-scene alignment.
//!
//! Each cue goes to exactly one scene: the one whose half-open interval
//! `[start, end)` contains the cue's midpoint. A midpoint on a boundary
//! belongs to the later scene. Midpoints before the first scene land in the
//! first scene and midpoints past the last scene's end land in the last, so
//! no cue is ever dropped.
//!
//! Cues arrive sorted by start time, which does not sort them by midpoint (a
//! long cue can start before a short one yet end after it). The aligner
//! therefore orders cue indices by midpoint once, then walks that order and
//! the scene stream together in a single merge pass. Within a scene, texts
//! are appended in the cues' input order.

use crate::error::PipelineError;
use crate::scene::{Scene, SceneBuilder};
use crate::subtitle::SubtitleCue;

/// Check the cue source's contract: every cue has a finite, non-empty
/// interval and start times never decrease.
///
/// # Errors
///
/// - [`PipelineError::InvalidCue`] for a cue with `start >= end` or a
///   non-finite bound.
/// - [`PipelineError::UnsortedCue`] for the first cue that starts before its
///   predecessor.
pub fn validate_cues(cues: &[SubtitleCue]) -> Result<(), PipelineError> {
    let mut previous_start: Option<f64> = None;

    for (index, cue) in cues.iter().enumerate() {
        if !(cue.start.is_finite() && cue.end.is_finite()) {
            return Err(PipelineError::InvalidCue {
                index,
                reason: format!("non-finite interval [{}, {})", cue.start, cue.end),
            });
        }
        if cue.start >= cue.end {
            return Err(PipelineError::InvalidCue {
                index,
                reason: format!("start {}s is not before end {}s", cue.start, cue.end),
            });
        }
        if let Some(previous) = previous_start
            && cue.start < previous
        {
            return Err(PipelineError::UnsortedCue {
                index,
                start: cue.start,
                previous_start: previous,
            });
        }
        previous_start = Some(cue.start);
    }

    Ok(())
}

/// A lazy iterator that attaches cue text to scenes and freezes them.
///
/// Looks one scene ahead so it knows which scene is last.
pub struct SubtitleAligner<'c, I, D> {
    scenes: I,
    cues: &'c [SubtitleCue],
    /// Cue indices ordered by (midpoint, index).
    order: Vec<usize>,
    cursor: usize,
    pending: Option<SceneBuilder<D>>,
    emitted: usize,
    done: bool,
}

impl<'c, I, D> SubtitleAligner<'c, I, D>
where
    I: Iterator<Item = Result<SceneBuilder<D>, PipelineError>>,
{
    /// # Errors
    ///
    /// Anything [`validate_cues`] reports.
    pub fn new<T>(scenes: T, cues: &'c [SubtitleCue]) -> Result<Self, PipelineError>
    where
        T: IntoIterator<IntoIter = I>,
    {
        validate_cues(cues)?;
        Ok(Self::from_validated(scenes, cues))
    }

    /// Build an aligner over cues that already passed [`validate_cues`].
    pub(crate) fn from_validated<T>(scenes: T, cues: &'c [SubtitleCue]) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        log::debug!("Aligning {} subtitle cues", cues.len());

        let mut order: Vec<usize> = (0..cues.len()).collect();
        order.sort_by(|&a, &b| {
            cues[a]
                .midpoint()
                .total_cmp(&cues[b].midpoint())
                .then(a.cmp(&b))
        });

        Self {
            scenes: scenes.into_iter(),
            cues,
            order,
            cursor: 0,
            pending: None,
            emitted: 0,
            done: false,
        }
    }

    /// An aligner that attaches no text, for image-only output.
    pub fn without_cues<T>(scenes: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            scenes: scenes.into_iter(),
            cues: &[],
            order: Vec::new(),
            cursor: 0,
            pending: None,
            emitted: 0,
            done: false,
        }
    }

    fn pull(&mut self) -> Result<Option<SceneBuilder<D>>, PipelineError> {
        self.scenes.next().transpose()
    }

    fn attach(&mut self, scene: &mut SceneBuilder<D>, is_last: bool) {
        let first = self.cursor;
        while self.cursor < self.order.len() {
            let cue = &self.cues[self.order[self.cursor]];
            if !is_last && cue.midpoint() >= scene.end() {
                break;
            }
            self.cursor += 1;
        }

        let mut assigned = self.order[first..self.cursor].to_vec();
        assigned.sort_unstable();
        for index in assigned {
            scene.push_cue(&self.cues[index].text);
        }
    }
}

impl<I, D> Iterator for SubtitleAligner<'_, I, D>
where
    I: Iterator<Item = Result<SceneBuilder<D>, PipelineError>>,
{
    type Item = Result<Scene<D>, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let current = match self.pending.take() {
            Some(scene) => Ok(Some(scene)),
            None => self.pull(),
        };
        let mut current = match current {
            Ok(Some(scene)) => scene,
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(error) => {
                self.done = true;
                return Some(Err(error));
            }
        };

        let next = match self.pull() {
            Ok(next) => next,
            Err(error) => {
                self.done = true;
                return Some(Err(error));
            }
        };

        self.attach(&mut current, next.is_none());
        self.pending = next;
        self.emitted += 1;
        if self.pending.is_none() {
            log::debug!(
                "Aligned {} cues across {} scenes",
                self.cursor,
                self.emitted
            );
        }
        Some(Ok(current.build()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameSample;

    fn scenes(bounds: &[(f64, f64)]) -> Vec<Result<SceneBuilder<()>, PipelineError>> {
        bounds
            .iter()
            .map(|&(start, end)| Ok(SceneBuilder::new(start, end, FrameSample::new(start, ()))))
            .collect()
    }

    fn align(bounds: &[(f64, f64)], cues: &[SubtitleCue]) -> Vec<Vec<String>> {
        SubtitleAligner::new(scenes(bounds), cues)
            .unwrap()
            .map(|scene| scene.unwrap().cue_text().to_vec())
            .collect()
    }

    #[test]
    fn boundary_midpoint_goes_to_later_scene() {
        let cues = [SubtitleCue::new(8.0, 12.0, "x")];
        let texts = align(&[(0.0, 10.0), (10.0, 20.0)], &cues);
        assert_eq!(texts, vec![Vec::<String>::new(), vec!["x".to_string()]]);
    }

    #[test]
    fn early_and_late_cues_are_clamped() {
        let cues = [
            SubtitleCue::new(-1.0, 1.0, "before"),
            SubtitleCue::new(3.0, 4.0, "inside"),
            SubtitleCue::new(30.0, 40.0, "after"),
        ];
        let texts = align(&[(2.0, 5.0), (5.0, 9.0)], &cues);
        assert_eq!(texts[0], vec!["before", "inside"]);
        assert_eq!(texts[1], vec!["after"]);
    }

    #[test]
    fn out_of_order_midpoints_keep_chronological_text_order() {
        // Sorted by start, but the long first cue has the later midpoint.
        let cues = [
            SubtitleCue::new(0.0, 9.0, "long"),
            SubtitleCue::new(1.0, 2.0, "short"),
        ];
        let texts = align(&[(0.0, 10.0)], &cues);
        assert_eq!(texts, vec![vec!["long", "short"]]);
    }

    #[test]
    fn every_cue_lands_exactly_once() {
        let cues: Vec<SubtitleCue> = (0..50)
            .map(|i| {
                let start = i as f64 * 0.7;
                SubtitleCue::new(start, start + 1.3, format!("cue {i}"))
            })
            .collect();
        let texts = align(&[(0.0, 3.0), (3.0, 11.5), (11.5, 12.0), (12.0, 20.0)], &cues);
        let flat: Vec<String> = texts.into_iter().flatten().collect();
        let expected: Vec<String> = (0..50).map(|i| format!("cue {i}")).collect();
        assert_eq!(flat, expected);
    }

    #[test]
    fn unsorted_cues_are_rejected() {
        let cues = [SubtitleCue::new(5.0, 6.0, "b"), SubtitleCue::new(1.0, 2.0, "a")];
        let result = SubtitleAligner::new(scenes(&[(0.0, 10.0)]), &cues);
        assert!(matches!(
            result,
            Err(PipelineError::UnsortedCue { index: 1, .. })
        ));
    }

    #[test]
    fn equal_start_times_are_sorted() {
        let cues = [SubtitleCue::new(1.0, 2.0, "a"), SubtitleCue::new(1.0, 3.0, "b")];
        assert!(validate_cues(&cues).is_ok());
    }

    #[test]
    fn inverted_cue_is_invalid() {
        let cues = [SubtitleCue::new(2.0, 2.0, "zero")];
        assert!(matches!(
            validate_cues(&cues),
            Err(PipelineError::InvalidCue { index: 0, .. })
        ));
    }

    #[test]
    fn without_cues_yields_empty_text() {
        let aligned: Vec<_> = SubtitleAligner::without_cues(scenes(&[(0.0, 1.0), (1.0, 2.0)]))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(aligned.len(), 2);
        assert!(aligned.iter().all(|scene| scene.cue_text().is_empty()));
    }
}
