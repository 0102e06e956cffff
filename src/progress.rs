//! Progress reporting.
//!
//! This module provides [`ProgressCallback`] for observing a conversion run
//! and [`ProgressInfo`] for detailed progress snapshots. Callbacks observe but
//! never steer the run; to stop early, stop pulling from
//! [`Pages`](crate::Pages) and drop it.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use lecture2pdf::{PipelineOptions, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("[{:?}] {pct:.1}% complete", info.operation);
//!         }
//!     }
//! }
//!
//! let options = PipelineOptions::new()
//!     .with_progress(Arc::new(PrintProgress))
//!     .with_expected_duration(3600.0);
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// The pipeline stage a progress report comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Sampling decoded frames.
    FrameSampling,
    /// Emitting finished page records.
    PageAssembly,
}

/// A snapshot of run progress.
///
/// Delivered to [`ProgressCallback::on_progress`] every
/// [`batch_size`](crate::PipelineOptions::with_batch_size) items.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Which stage is reporting.
    pub operation: OperationType,
    /// How many items (samples / pages) the stage has produced so far.
    pub current: u64,
    /// Completion percentage (0.0 – 100.0), if an expected duration was
    /// configured and the item carries a timestamp.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the stage started.
    pub elapsed: Duration,
    /// Video timestamp of the latest item, in seconds.
    pub current_timestamp: Option<f64>,
}

/// Trait for receiving progress updates during a run.
///
/// Implementations must be [`Send`] and [`Sync`] because the same callback
/// may observe several runs at once under
/// [`Pipeline::convert_batch`](crate::Pipeline).
pub trait ProgressCallback: Send + Sync {
    /// Called at regular intervals while a stage produces items.
    fn on_progress(&self, info: &ProgressInfo);
}

/// A no-op implementation that discards all progress notifications.
///
/// This is the default when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Internal helper that tracks progress timing and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    expected_duration: Option<f64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        expected_duration: Option<f64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            operation,
            expected_duration,
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
        }
    }

    /// Record one produced item and fire the callback if the batch
    /// threshold is reached.
    pub(crate) fn advance(&mut self, timestamp: Option<f64>) {
        self.current += 1;
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size {
            self.report(timestamp);
            self.items_since_last_report = 0;
        }
    }

    /// Unconditionally emit a final progress report.
    pub(crate) fn finish(&mut self) {
        self.report(None);
    }

    fn report(&self, timestamp: Option<f64>) {
        let percentage = match (self.expected_duration, timestamp) {
            (Some(total), Some(ts)) if total > 0.0 => {
                Some(((ts / total) * 100.0).clamp(0.0, 100.0) as f32)
            }
            _ => None,
        };

        let info = ProgressInfo {
            operation: self.operation,
            current: self.current,
            percentage,
            elapsed: self.start_time.elapsed(),
            current_timestamp: timestamp,
        };

        self.callback.on_progress(&info);
    }
}
