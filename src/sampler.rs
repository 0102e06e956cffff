//! Lazy frame sampling.
//!
//! [`FrameSampler`] walks the decoder's forward-only stream and keeps one
//! frame per sampling interval. It reads the input exactly once; restarting
//! means constructing a new sampler over a fresh stream.

use crate::configuration::{PipelineOptions, SampleInterval};
use crate::error::PipelineError;
use crate::frame::{DecodedFrame, FrameSample};
use crate::progress::{OperationType, ProgressTracker};

/// Slack for accumulated floating-point error in frame timestamps
/// (e.g. thirty steps of 1/30 s summing to 0.9999999).
const INTERVAL_EPSILON: f64 = 1e-9;

/// A lazy iterator of [`FrameSample`]s over a decoded frame stream.
///
/// The first decoded frame is always sampled, and so is the last, so the
/// sampled timeline spans the whole video. Every decoded timestamp must be
/// finite, non-negative and strictly greater than the one before; the first
/// violation is reported as [`PipelineError::MalformedStream`] and ends the
/// iteration.
pub struct FrameSampler<I, D> {
    frames: I,
    interval: SampleInterval,
    last_decoded: Option<f64>,
    last_sampled: Option<f64>,
    /// Frames decoded since the last sample.
    skipped: u64,
    /// Most recent frame that was decoded but not sampled.
    held: Option<DecodedFrame<D>>,
    frames_seen: u64,
    tracker: ProgressTracker,
    exhausted: bool,
    done: bool,
}

impl<I, D> FrameSampler<I, D>
where
    I: Iterator<Item = Result<DecodedFrame<D>, PipelineError>>,
{
    /// Sample `frames` at the interval set in `options`.
    pub fn new<T>(frames: T, options: &PipelineOptions) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        log::debug!("Sampling frames ({:?})", options.sample_interval);
        Self {
            frames: frames.into_iter(),
            interval: options.sample_interval,
            last_decoded: None,
            last_sampled: None,
            skipped: 0,
            held: None,
            frames_seen: 0,
            tracker: ProgressTracker::new(
                options.progress.clone(),
                OperationType::FrameSampling,
                options.expected_duration,
                options.batch_size,
            ),
            exhausted: false,
            done: false,
        }
    }

    /// Number of decoded frames read so far.
    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    fn fail(&mut self, reason: String) -> Option<Result<FrameSample<D>, PipelineError>> {
        self.done = true;
        self.held = None;
        Some(Err(PipelineError::MalformedStream(reason)))
    }

    fn should_sample(&self, timestamp: f64) -> bool {
        let Some(last) = self.last_sampled else {
            return true;
        };
        match self.interval {
            SampleInterval::Seconds(seconds) => timestamp - last + INTERVAL_EPSILON >= seconds,
            SampleInterval::EveryNthFrame(n) => self.skipped + 1 >= n,
        }
    }

    fn emit(&mut self, frame: DecodedFrame<D>) -> FrameSample<D> {
        self.last_sampled = Some(frame.timestamp);
        self.skipped = 0;
        self.tracker.advance(Some(frame.timestamp));
        FrameSample::new(frame.timestamp, frame.frame)
    }
}

impl<I, D> Iterator for FrameSampler<I, D>
where
    I: Iterator<Item = Result<DecodedFrame<D>, PipelineError>>,
{
    type Item = Result<FrameSample<D>, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if self.exhausted {
                if let Some(frame) = self.held.take() {
                    return Some(Ok(self.emit(frame)));
                }
                self.done = true;
                self.tracker.finish();
                return None;
            }

            let frame = match self.frames.next() {
                Some(Ok(frame)) => frame,
                Some(Err(PipelineError::MalformedStream(reason))) => return self.fail(reason),
                Some(Err(error)) => return self.fail(format!("decoder failed: {error}")),
                None => {
                    self.exhausted = true;
                    if self.frames_seen == 0 {
                        return self.fail("the stream yielded zero frames".to_string());
                    }
                    log::debug!("Frame stream ended after {} frames", self.frames_seen);
                    continue;
                }
            };

            let timestamp = frame.timestamp;
            if !(timestamp.is_finite() && timestamp >= 0.0) {
                return self.fail(format!(
                    "frame {} has invalid timestamp {timestamp}",
                    self.frames_seen
                ));
            }
            if let Some(previous) = self.last_decoded
                && timestamp <= previous
            {
                return self.fail(format!(
                    "frame {} timestamp {timestamp}s does not advance past {previous}s",
                    self.frames_seen
                ));
            }
            self.last_decoded = Some(timestamp);
            self.frames_seen += 1;

            if self.should_sample(timestamp) {
                self.held = None;
                return Some(Ok(self.emit(frame)));
            }
            self.skipped += 1;
            self.held = Some(frame);
        }
    }
}
