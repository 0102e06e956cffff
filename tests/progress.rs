//! Progress reporting integration tests.

use std::sync::{Arc, Mutex};

use lecture2pdf::{
    DecodedFrame, OperationType, Pipeline, PipelineError, PipelineOptions, ProgressCallback,
    ProgressInfo,
};

#[derive(Default)]
struct Recorder {
    reports: Mutex<Vec<(OperationType, u64, Option<f32>)>>,
}

impl Recorder {
    fn reports(&self, operation: OperationType) -> Vec<(u64, Option<f32>)> {
        self.reports
            .lock()
            .unwrap()
            .iter()
            .filter(|(op, _, _)| *op == operation)
            .map(|&(_, current, percentage)| (current, percentage))
            .collect()
    }
}

impl ProgressCallback for Recorder {
    fn on_progress(&self, info: &ProgressInfo) {
        self.reports
            .lock()
            .unwrap()
            .push((info.operation, info.current, info.percentage));
    }
}

fn ramp(count: u32) -> Vec<Result<DecodedFrame<f64>, PipelineError>> {
    (0..count)
        .map(|i| Ok(DecodedFrame::new(f64::from(i), f64::from(i / 10) * 0.5)))
        .collect()
}

fn scalar(a: &f64, b: &f64) -> f64 {
    1.0 - (a - b).abs()
}

// ── Sampling ───────────────────────────────────────────────────────

#[test]
fn sampling_reports_every_sample_and_finishes() {
    let recorder = Arc::new(Recorder::default());
    let options = PipelineOptions::new()
        .with_progress(recorder.clone())
        .with_expected_duration(19.0);
    let pipeline = Pipeline::new(options, scalar).unwrap();
    pipeline.collect_pages(ramp(20), &[]).unwrap();

    let sampling = recorder.reports(OperationType::FrameSampling);
    // 20 samples plus the final report.
    assert_eq!(sampling.len(), 21);
    assert_eq!(sampling[19], (20, Some(100.0)));
    assert_eq!(sampling[20], (20, None));

    let percentages: Vec<f32> = sampling.iter().filter_map(|(_, pct)| *pct).collect();
    assert!(percentages.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn batch_size_throttles_reports() {
    let recorder = Arc::new(Recorder::default());
    let options = PipelineOptions::new()
        .with_progress(recorder.clone())
        .with_batch_size(5);
    let pipeline = Pipeline::new(options, scalar).unwrap();
    pipeline.collect_pages(ramp(20), &[]).unwrap();

    let sampling = recorder.reports(OperationType::FrameSampling);
    assert_eq!(sampling.len(), 5);
    assert!(sampling.iter().all(|(_, pct)| pct.is_none()));
}

// ── Page assembly ──────────────────────────────────────────────────

#[test]
fn page_assembly_reports_per_page() {
    let recorder = Arc::new(Recorder::default());
    let options = PipelineOptions::new()
        .with_progress(recorder.clone())
        .with_expected_duration(19.0);
    let pipeline = Pipeline::new(options, scalar).unwrap();
    let pages = pipeline.collect_pages(ramp(20), &[]).unwrap();
    assert_eq!(pages.len(), 2);

    let assembly = recorder.reports(OperationType::PageAssembly);
    assert_eq!(assembly.len(), 3);
    assert_eq!(assembly[0].0, 1);
    assert_eq!(assembly[1], (2, Some(100.0)));
}

#[test]
fn dropping_the_run_early_stops_reporting() {
    let recorder = Arc::new(Recorder::default());
    let options = PipelineOptions::new().with_progress(recorder.clone());
    let pipeline = Pipeline::new(options, scalar).unwrap();

    let frames = ramp(100);
    let mut run = pipeline.pages(frames, &[]).unwrap();
    let first = run.next().unwrap().unwrap();
    drop(run);

    assert_eq!(first.index, 0);
    let sampling = recorder.reports(OperationType::FrameSampling);
    assert!(sampling.len() < 100, "sampling should stop with the consumer");
    assert!(recorder.reports(OperationType::PageAssembly).len() == 1);
}
