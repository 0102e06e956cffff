//! Benchmarks for the conversion pipeline and its similarity metrics.
//!
//! Run with: cargo bench
//! Run with all features: cargo bench --all-features
//!
//! Decoder benchmarks require fixture files from
//! `tests/fixtures/generate_fixtures.sh`.

use std::time::Duration;

use criterion::{BenchmarkId, Criterion};
use image::{DynamicImage, Rgb, RgbImage};
use lecture2pdf::{
    DecodedFrame, HistogramFrame, HistogramSimilarity, Pipeline, PipelineError, PipelineOptions,
    SubtitleCue, parse_srt,
};

fn scalar(a: &f64, b: &f64) -> f64 {
    1.0 - (a - b).abs()
}

/// One descriptor per frame at 25 fps, stepping every 30 seconds.
fn scalar_lecture(minutes: u32) -> Vec<Result<DecodedFrame<f64>, PipelineError>> {
    (0..minutes * 60 * 25)
        .map(|i| {
            let timestamp = f64::from(i) / 25.0;
            let slide = (timestamp / 30.0).floor();
            Ok(DecodedFrame::new(timestamp, (slide * 0.2) % 1.0))
        })
        .collect()
}

fn lecture_cues(minutes: u32) -> Vec<SubtitleCue> {
    (0..minutes * 20)
        .map(|i| {
            let start = f64::from(i) * 3.0;
            SubtitleCue::new(start, start + 2.5, format!("Sentence number {i}."))
        })
        .collect()
}

fn slide_image(colour: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(320, 240, Rgb(colour)))
}

fn benchmark_scalar_pipeline(criterion: &mut Criterion) {
    let pipeline = Pipeline::new(PipelineOptions::new(), scalar).unwrap();

    let mut group = criterion.benchmark_group("scalar pipeline");
    for minutes in [10u32, 60] {
        let cues = lecture_cues(minutes);
        group.bench_with_input(BenchmarkId::from_parameter(minutes), &minutes, |bencher, &minutes| {
            bencher.iter_batched(
                || scalar_lecture(minutes),
                |frames| pipeline.collect_pages(frames, &cues).unwrap(),
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn benchmark_histogram(criterion: &mut Criterion) {
    let image = slide_image([245, 245, 245]);

    let mut group = criterion.benchmark_group("histogram fingerprint");
    for bins in [8usize, 32, 256] {
        let metric = HistogramSimilarity::new(bins);
        group.bench_with_input(BenchmarkId::from_parameter(bins), &metric, |bencher, metric| {
            bencher.iter(|| metric.fingerprint(image.clone()));
        });
    }
    group.finish();
}

fn benchmark_histogram_pipeline(criterion: &mut Criterion) {
    let metric = HistogramSimilarity::default();
    let colours = [[245, 245, 245], [20, 30, 120], [30, 120, 20], [200, 40, 40]];
    let frames: Vec<DecodedFrame<HistogramFrame>> = (0..240u32)
        .map(|i| {
            let colour = colours[(i / 60) as usize];
            DecodedFrame::new(f64::from(i) * 0.5, metric.fingerprint(slide_image(colour)))
        })
        .collect();
    let pipeline = Pipeline::new(PipelineOptions::new(), metric).unwrap();

    let mut group = criterion.benchmark_group("histogram pipeline");
    group.measurement_time(Duration::from_secs(10));
    group.bench_function("2 minutes at 2 fps", |bencher| {
        bencher.iter_batched(
            || frames.iter().cloned().map(Ok).collect::<Vec<_>>(),
            |frames| pipeline.collect_pages(frames, &[]).unwrap(),
            criterion::BatchSize::LargeInput,
        );
    });
    group.finish();
}

fn benchmark_subtitle_parsing(criterion: &mut Criterion) {
    let mut text = String::new();
    for (i, cue) in lecture_cues(60).iter().enumerate() {
        let stamp = |seconds: f64| {
            let millis = (seconds * 1000.0).round() as u64;
            format!(
                "{:02}:{:02}:{:02},{:03}",
                millis / 3_600_000,
                millis / 60_000 % 60,
                millis / 1000 % 60,
                millis % 1000
            )
        };
        text.push_str(&format!("{}\n{} --> {}\n{}\n\n", i + 1, stamp(cue.start), stamp(cue.end), cue.text));
    }

    criterion.bench_function("parse one hour of SRT", |bencher| {
        bencher.iter(|| parse_srt(&text).unwrap());
    });
}

#[cfg(feature = "ffmpeg")]
fn benchmark_decoder(criterion: &mut Criterion) {
    use std::path::Path;

    use lecture2pdf::FrameOutputOptions;
    use lecture2pdf::decoder::VideoDecoder;

    const LECTURE_VIDEO: &str = "tests/fixtures/lecture.mp4";

    if !Path::new(LECTURE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    let metric = HistogramSimilarity::default();
    let pipeline = Pipeline::new(PipelineOptions::new(), metric).unwrap();

    criterion.bench_function("convert fixture lecture", |bencher| {
        bencher.iter(|| {
            let decoder = VideoDecoder::open(LECTURE_VIDEO, FrameOutputOptions::default()).unwrap();
            pipeline.collect_pages(decoder.fingerprinted(metric), &[]).unwrap()
        });
    });
}

#[cfg(not(feature = "ffmpeg"))]
fn benchmark_decoder(_criterion: &mut Criterion) {}

criterion::criterion_group!(
    benches,
    benchmark_scalar_pipeline,
    benchmark_histogram,
    benchmark_histogram_pipeline,
    benchmark_subtitle_parsing,
    benchmark_decoder,
);
criterion::criterion_main!(benches);
