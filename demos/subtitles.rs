//! Load an SRT or WebVTT file and check it is usable for alignment.
//!
//! Usage:
//!   cargo run --example subtitles -- <subtitle_file>

use std::error::Error;

use lecture2pdf::{load_subtitles, validate_cues};

fn main() -> Result<(), Box<dyn Error>> {
    let input_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "lecture.srt".to_string());

    let cues = load_subtitles(&input_path)?;
    println!("Loaded {} cues from {input_path}", cues.len());

    for cue in cues.iter().take(10) {
        println!("{:>8.3}s -> {:>8.3}s  {}", cue.start, cue.end, cue.text.replace('\n', " / "));
    }
    if cues.len() > 10 {
        println!("... and {} more", cues.len() - 10);
    }

    match validate_cues(&cues) {
        Ok(()) => println!("Cues are ordered and well-formed."),
        Err(error) => println!("Cues cannot be aligned as-is: {error}"),
    }

    Ok(())
}
