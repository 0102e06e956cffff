//! The end-to-end conversion pipeline.
//!
//! [`Pipeline`] owns validated [`PipelineOptions`] and the similarity
//! collaborator. Each run chains the five stages lazily:
//!
//! ```text
//! frames ─▶ FrameSampler ─▶ SceneSegmenter ─▶ SceneDeduplicator
//!        ─▶ SubtitleAligner ─▶ PageAssembler ─▶ pages
//! ```
//!
//! All per-run state lives in the returned [`Pages`] iterator, so one
//! `Pipeline` can serve any number of runs. Dropping `Pages` before it is
//! exhausted cancels the run.
//!
//! # Example
//!
//! ```
//! use lecture2pdf::{DecodedFrame, PipelineError, Pipeline, PipelineOptions, SubtitleCue};
//!
//! // Frames are plain numbers here; similar numbers mean similar slides.
//! let similarity = |a: &f64, b: &f64| 1.0 - (a - b).abs();
//! let pipeline = Pipeline::new(PipelineOptions::new(), similarity)?;
//!
//! let frames = [0.0, 0.01, 0.02, 0.9, 0.91]
//!     .iter()
//!     .enumerate()
//!     .map(|(second, &value)| Ok(DecodedFrame::new(second as f64, value)));
//! let cues = [SubtitleCue::new(0.5, 1.5, "Welcome"), SubtitleCue::new(3.2, 3.8, "Next slide")];
//!
//! let pages = pipeline.collect_pages(frames, &cues)?;
//! assert_eq!(pages.len(), 2);
//! assert_eq!(pages[0].text, "Welcome");
//! assert_eq!((pages[1].start, pages[1].end), (3.0, 4.0));
//! # Ok::<(), PipelineError>(())
//! ```

use crate::aligner::{SubtitleAligner, validate_cues};
use crate::assembler::{PageAssembler, PageRecord};
use crate::configuration::PipelineOptions;
use crate::dedup::SceneDeduplicator;
use crate::error::PipelineError;
use crate::frame::DecodedFrame;
use crate::progress::{OperationType, ProgressTracker};
use crate::render::DocumentRenderer;
use crate::sampler::FrameSampler;
use crate::segmenter::SceneSegmenter;
use crate::similarity::Similarity;
use crate::subtitle::SubtitleCue;
use crate::validation::{ValidationReport, validate_pages};

type Stages<'a, I, D, S> = PageAssembler<
    SubtitleAligner<'a, SceneDeduplicator<'a, SceneSegmenter<'a, FrameSampler<I, D>, D, S>, D, S>, D>,
>;

/// Validated configuration plus the similarity metric, reusable across runs.
///
/// `Pipeline` is immutable after construction and is `Sync` whenever `S`
/// is, so several runs may share it across threads.
pub struct Pipeline<S> {
    options: PipelineOptions,
    similarity: S,
}

impl<S> Pipeline<S> {
    /// Create a pipeline, rejecting invalid options before any frame is read.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] if an option is out of range.
    pub fn new(options: PipelineOptions, similarity: S) -> Result<Self, PipelineError> {
        options.validate()?;
        log::debug!("Created pipeline with {options:?}");
        Ok(Self {
            options,
            similarity,
        })
    }

    /// The validated options every run uses.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// The similarity metric shared by segmentation and dedup.
    pub fn similarity(&self) -> &S {
        &self.similarity
    }

    /// Start a run over `frames`, attaching text from `cues`.
    ///
    /// Cues are checked up front. If they are unsorted or one has an
    /// invalid interval, the run fails with that error, or, when
    /// [`PipelineOptions::with_image_only_fallback`] is set, proceeds
    /// without captions and reports itself as [`Pages::degraded`].
    ///
    /// # Errors
    ///
    /// [`PipelineError::UnsortedCue`] or [`PipelineError::InvalidCue`] when
    /// the fallback is not enabled. Frame stream errors surface from the
    /// returned iterator.
    pub fn pages<'a, T, I, D>(
        &'a self,
        frames: T,
        cues: &'a [SubtitleCue],
    ) -> Result<Pages<'a, I, D, S>, PipelineError>
    where
        T: IntoIterator<IntoIter = I>,
        I: Iterator<Item = Result<DecodedFrame<D>, PipelineError>>,
        S: Similarity<D>,
    {
        let degraded = match validate_cues(cues) {
            Ok(()) => false,
            Err(
                error @ (PipelineError::UnsortedCue { .. } | PipelineError::InvalidCue { .. }),
            ) if self.options.image_only_fallback => {
                log::warn!("Ignoring subtitles and producing image-only pages: {error}");
                true
            }
            Err(error) => return Err(error),
        };

        let samples = FrameSampler::new(frames, &self.options);
        let scenes = SceneSegmenter::new(samples, &self.similarity, &self.options);
        let scenes = SceneDeduplicator::new(scenes, &self.similarity, &self.options);
        let aligned = if degraded {
            SubtitleAligner::without_cues(scenes)
        } else {
            SubtitleAligner::from_validated(scenes, cues)
        };

        Ok(Pages {
            stages: PageAssembler::new(aligned),
            tracker: ProgressTracker::new(
                self.options.progress.clone(),
                OperationType::PageAssembly,
                self.options.expected_duration,
                self.options.batch_size,
            ),
            degraded,
            produced: 0,
            cues: 0,
            done: false,
        })
    }

    /// Run to completion and return every page.
    ///
    /// # Errors
    ///
    /// The first error of the run. No partial output is returned.
    pub fn collect_pages<T, I, D>(
        &self,
        frames: T,
        cues: &[SubtitleCue],
    ) -> Result<Vec<PageRecord<D>>, PipelineError>
    where
        T: IntoIterator<IntoIter = I>,
        I: Iterator<Item = Result<DecodedFrame<D>, PipelineError>>,
        S: Similarity<D>,
    {
        self.pages(frames, cues)?.collect()
    }

    /// Run to completion, validate the result, and hand it to `renderer`.
    ///
    /// The renderer is only called once every page was produced. The
    /// returned report notes a degraded (image-only) run.
    ///
    /// # Errors
    ///
    /// The first error of the run, or whatever the renderer reports.
    pub fn convert<T, I, D, R>(
        &self,
        frames: T,
        cues: &[SubtitleCue],
        renderer: &mut R,
    ) -> Result<ValidationReport, PipelineError>
    where
        T: IntoIterator<IntoIter = I>,
        I: Iterator<Item = Result<DecodedFrame<D>, PipelineError>>,
        S: Similarity<D>,
        R: DocumentRenderer<D> + ?Sized,
    {
        let mut run = self.pages(frames, cues)?;
        let pages = run.by_ref().collect::<Result<Vec<_>, _>>()?;

        let mut report = validate_pages(&pages);
        if run.degraded() {
            report
                .warnings
                .push("Subtitles were rejected; pages carry no captions".to_string());
        }
        for warning in &report.warnings {
            log::warn!("{warning}");
        }

        renderer.render(&pages)?;
        Ok(report)
    }
}

/// A lazy run of the pipeline, yielding one [`PageRecord`] per scene.
///
/// Created by [`Pipeline::pages`]. After the first error the iterator is
/// finished.
pub struct Pages<'a, I, D, S> {
    stages: Stages<'a, I, D, S>,
    tracker: ProgressTracker,
    degraded: bool,
    produced: usize,
    cues: usize,
    done: bool,
}

impl<I, D, S> Pages<'_, I, D, S> {
    /// Whether subtitles were rejected and the run is image-only.
    pub fn degraded(&self) -> bool {
        self.degraded
    }
}

impl<I, D, S> Iterator for Pages<'_, I, D, S>
where
    I: Iterator<Item = Result<DecodedFrame<D>, PipelineError>>,
    S: Similarity<D>,
{
    type Item = Result<PageRecord<D>, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.stages.next() {
            Some(Ok(page)) => {
                self.produced += 1;
                self.cues += page.cue_count;
                self.tracker.advance(Some(page.end));
                Some(Ok(page))
            }
            Some(Err(error)) => {
                self.done = true;
                log::debug!("Run failed after {} pages: {error}", self.produced);
                Some(Err(error))
            }
            None => {
                self.done = true;
                self.tracker.finish();
                log::info!(
                    "Produced {} pages with {} captioned cues{}",
                    self.produced,
                    self.cues,
                    if self.degraded { " (image-only)" } else { "" }
                );
                None
            }
        }
    }
}
