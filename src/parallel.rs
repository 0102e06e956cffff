//! Batch conversion on the rayon pool (feature `rayon`).
//!
//! Every job is an independent run: it builds its own frame stream, cue list
//! and renderer inside `run`. Workers share only the immutable [`Pipeline`].

use ::rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};

use crate::error::PipelineError;
use crate::pipeline::Pipeline;

impl<S: Sync> Pipeline<S> {
    /// Run `run` once per job in parallel.
    ///
    /// Results come back in job order. One failed job does not stop the
    /// others.
    ///
    /// # Example
    ///
    /// ```
    /// use lecture2pdf::{DecodedFrame, Pipeline, PipelineOptions};
    ///
    /// let pipeline = Pipeline::new(PipelineOptions::new(), |a: &f64, b: &f64| 1.0 - (a - b).abs())?;
    /// let lectures = vec![vec![0.0, 0.0, 0.9], vec![0.5, 0.5]];
    ///
    /// let counts = pipeline.convert_batch(lectures, |pipeline, values| {
    ///     let frames = values
    ///         .into_iter()
    ///         .enumerate()
    ///         .map(|(second, value)| Ok(DecodedFrame::new(second as f64, value)));
    ///     Ok(pipeline.collect_pages(frames, &[])?.len())
    /// });
    /// assert_eq!(counts[0].as_ref().ok(), Some(&2));
    /// assert_eq!(counts[1].as_ref().ok(), Some(&1));
    /// # Ok::<(), lecture2pdf::PipelineError>(())
    /// ```
    pub fn convert_batch<J, T, F>(&self, jobs: Vec<J>, run: F) -> Vec<Result<T, PipelineError>>
    where
        J: Send,
        T: Send,
        F: Fn(&Self, J) -> Result<T, PipelineError> + Sync,
    {
        log::debug!("Converting {} jobs in parallel", jobs.len());

        jobs.into_par_iter()
            .enumerate()
            .map(|(index, job)| {
                let result = run(self, job);
                if let Err(error) = &result {
                    log::warn!("Batch job {index} failed: {error}");
                }
                result
            })
            .collect()
    }
}
