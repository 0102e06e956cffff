//! Convert several lectures in parallel (feature = "rayon").
//!
//! Usage:
//!   cargo run --features=rayon --example rayon

use std::error::Error;
use std::time::Instant;

use lecture2pdf::{DecodedFrame, Pipeline, PipelineOptions};

/// A synthetic lecture of `slides` slides, one frame per second.
fn lecture(slides: u32, seconds_per_slide: u32) -> Vec<f64> {
    (0..slides * seconds_per_slide)
        .map(|second| f64::from(second / seconds_per_slide) * 0.3 % 1.0)
        .collect()
}

fn main() -> Result<(), Box<dyn Error>> {
    let jobs: Vec<Vec<f64>> = (1..=16).map(|n| lecture(n, 60)).collect();
    let pipeline = Pipeline::new(PipelineOptions::new(), |a: &f64, b: &f64| 1.0 - (a - b).abs())?;

    println!("Converting {} lectures in parallel...", jobs.len());
    let start = Instant::now();
    let results = pipeline.convert_batch(jobs, |pipeline, values| {
        let frames = values
            .into_iter()
            .enumerate()
            .map(|(second, value)| Ok(DecodedFrame::new(second as f64, value)));
        pipeline.collect_pages(frames, &[])
    });
    let elapsed = start.elapsed();

    for (index, result) in results.iter().enumerate() {
        match result {
            Ok(pages) => println!("Lecture {index}: {} pages", pages.len()),
            Err(error) => println!("Lecture {index}: failed ({error})"),
        }
    }
    println!("Done in {elapsed:.2?}");

    Ok(())
}
