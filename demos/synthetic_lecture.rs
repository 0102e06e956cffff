//! Convert a synthetic lecture with progress reporting and validation.
//!
//! Frames are plain numbers standing in for slide fingerprints, so this runs
//! without FFmpeg.
//!
//! Usage:
//!   cargo run --example synthetic_lecture

use std::error::Error;
use std::sync::Arc;

use lecture2pdf::{
    DecodedFrame, Pipeline, PipelineOptions, ProgressCallback, ProgressInfo, SubtitleCue,
    validate_pages,
};

/// Simple progress callback that prints to stdout.
struct PrintProgress;

impl ProgressCallback for PrintProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let pct = info
            .percentage
            .map_or("??".to_string(), |p| format!("{p:.1}"));
        println!(
            "[{:?}] {} items ({pct}%) elapsed={:.3}s",
            info.operation,
            info.current,
            info.elapsed.as_secs_f64(),
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Four slides of 30 s each at 25 fps, with a little noise per frame.
    let slides = [0.1, 0.5, 0.9, 0.3];
    let frames = (0..120 * 25).map(|i| {
        let timestamp = f64::from(i) / 25.0;
        let slide = slides[(i / (30 * 25)) as usize];
        let noise = f64::from(i % 7) * 0.002;
        Ok(DecodedFrame::new(timestamp, slide + noise))
    });

    let cues = vec![
        SubtitleCue::new(1.0, 4.0, "Welcome to today's lecture."),
        SubtitleCue::new(28.0, 33.0, "Let's move on to the definitions."),
        SubtitleCue::new(61.5, 64.0, "Here is the main theorem."),
        SubtitleCue::new(95.0, 99.0, "To summarise."),
    ];

    let options = PipelineOptions::new()
        .with_progress(Arc::new(PrintProgress))
        .with_batch_size(30)
        .with_expected_duration(120.0);
    let pipeline = Pipeline::new(options, |a: &f64, b: &f64| 1.0 - (a - b).abs())?;

    // ── Pages ──────────────────────────────────────────────────────
    let pages = pipeline.collect_pages(frames, &cues)?;
    println!();
    for page in &pages {
        println!(
            "Page {}: {:>6.1}s - {:>6.1}s  {:?}",
            page.index, page.start, page.end, page.text
        );
    }

    // ── Validation ─────────────────────────────────────────────────
    println!("\n{}", validate_pages(&pages));

    Ok(())
}
