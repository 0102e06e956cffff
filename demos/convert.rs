//! Convert a lecture video into page images plus a JSON manifest
//! (feature = "ffmpeg").
//!
//! Subtitles come from a sidecar file when given, otherwise from the
//! video's own subtitle track, otherwise the pages carry no captions.
//!
//! Usage:
//!   cargo run --features=ffmpeg --example convert -- <input_file> [subtitle_file] [output_dir]

use std::error::Error;

use lecture2pdf::decoder::{VideoDecoder, extract_subtitle_cues};
use lecture2pdf::{
    FrameOutputOptions, HistogramSimilarity, ManifestRenderer, Pipeline, PipelineError,
    PipelineOptions, load_subtitles,
};

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let input_path = args.next().unwrap_or_else(|| "input.mp4".to_string());
    let subtitle_path = args.next();
    let output_dir = args.next().unwrap_or_else(|| "pages".to_string());

    let cues = match subtitle_path {
        Some(path) => load_subtitles(path)?,
        None => match extract_subtitle_cues(&input_path) {
            Ok(cues) => cues,
            Err(PipelineError::NoSubtitleStream) => {
                println!("No subtitle track found; pages will have no captions.");
                Vec::new()
            }
            Err(error) => return Err(error.into()),
        },
    };
    println!("Using {} subtitle cues", cues.len());

    let output = FrameOutputOptions {
        width: Some(960),
        ..FrameOutputOptions::default()
    };
    let decoder = VideoDecoder::open(&input_path, output)?;
    let (width, height) = decoder.dimensions();
    println!("Decoding {input_path} at {width}x{height}");

    let mut options = PipelineOptions::new().with_image_only_fallback(true);
    if let Some(seconds) = decoder.duration_seconds() {
        options = options.with_expected_duration(seconds);
    }

    let metric = HistogramSimilarity::default();
    let pipeline = Pipeline::new(options, metric)?;
    let report = pipeline.convert(
        decoder.fingerprinted(metric),
        &cues,
        &mut ManifestRenderer::new(&output_dir),
    )?;

    println!("{report}");
    println!("Pages written to {output_dir}");
    Ok(())
}
