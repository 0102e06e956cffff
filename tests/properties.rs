//! Structural properties of the page sequence over generated streams.
//!
//! Streams come from a small deterministic generator so every run sees the
//! same inputs without pulling in a property-testing framework.

use lecture2pdf::{
    DecodedFrame, PageRecord, Pipeline, PipelineError, PipelineOptions, SubtitleCue,
    validate_pages,
};

fn scalar(a: &f64, b: &f64) -> f64 {
    1.0 - (a - b).abs()
}

/// Linear congruential generator; good enough to shuffle test inputs.
struct Lcg(u64);

impl Lcg {
    fn next_unit(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// A lecture at 10 fps: slides of random length with small per-frame noise.
fn lecture(seed: u64, frames: usize) -> Vec<(f64, f64)> {
    let mut rng = Lcg(seed);
    let mut slide = rng.next_unit();
    let mut remaining = 0usize;

    (0..frames)
        .map(|i| {
            if remaining == 0 {
                slide = rng.next_unit();
                remaining = 20 + (rng.next_unit() * 200.0) as usize;
            }
            remaining -= 1;
            let noise = (rng.next_unit() - 0.5) * 0.04;
            (i as f64 / 10.0, (slide + noise).clamp(0.0, 1.0))
        })
        .collect()
}

/// Sorted cues of random length, possibly overlapping, spread past both
/// ends of the video.
fn cues(seed: u64, count: usize, span: f64) -> Vec<SubtitleCue> {
    let mut rng = Lcg(seed ^ 0x9e37_79b9_7f4a_7c15);
    let mut cues: Vec<SubtitleCue> = (0..count)
        .map(|i| {
            let start = rng.next_unit() * (span + 10.0) - 5.0;
            let length = 0.2 + rng.next_unit() * 6.0;
            SubtitleCue::new(start, start + length, format!("cue{i}"))
        })
        .collect();
    cues.sort_by(|a, b| a.start.total_cmp(&b.start));
    cues
}

fn frames(points: &[(f64, f64)]) -> impl Iterator<Item = Result<DecodedFrame<f64>, PipelineError>> + '_ {
    points
        .iter()
        .map(|&(timestamp, value)| Ok(DecodedFrame::new(timestamp, value)))
}

fn run(options: PipelineOptions, points: &[(f64, f64)], cues: &[SubtitleCue]) -> Vec<PageRecord<f64>> {
    Pipeline::new(options, scalar)
        .unwrap()
        .collect_pages(frames(points), cues)
        .unwrap()
}

/// Where the last page must end: the last sample, unless the final scene
/// opened on that very sample and was floored to the minimum duration.
fn expected_end(pages: &[PageRecord<f64>], last_sample: f64) -> f64 {
    let last_page = &pages[pages.len() - 1];
    if last_page.start == last_sample {
        last_sample + lecture2pdf::DEFAULT_MIN_SCENE_DURATION
    } else {
        last_sample
    }
}

// ── Coverage ───────────────────────────────────────────────────────

#[test]
fn pages_cover_the_sampled_timeline_without_gaps() {
    for seed in 0..20 {
        let points = lecture(seed, 3_000);
        let pages = run(PipelineOptions::new(), &points, &[]);

        assert_eq!(pages[0].start, 0.0, "seed {seed}");
        let last = points.last().unwrap().0;
        assert_eq!(pages.last().unwrap().end, expected_end(&pages, last), "seed {seed}");
        for pair in pages.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "seed {seed}");
            assert!(pair[0].start < pair[0].end, "seed {seed}");
        }
        assert!(validate_pages(&pages).is_valid(), "seed {seed}");
    }
}

#[test]
fn sum_of_durations_equals_video_length() {
    for seed in 0..10 {
        let points = lecture(seed, 1_500);
        let pages = run(PipelineOptions::new().with_sample_interval_seconds(0.5), &points, &[]);
        let total: f64 = pages.iter().map(|page| page.end - page.start).sum();
        let length = expected_end(&pages, points.last().unwrap().0);
        assert!((total - length).abs() < 1e-9, "seed {seed}: {total} vs {length}");
    }
}

// ── Cue assignment ─────────────────────────────────────────────────

#[test]
fn every_cue_lands_on_exactly_one_page() {
    for seed in 0..20 {
        let points = lecture(seed, 2_000);
        let span = points.last().unwrap().0;
        let cues = cues(seed, 150, span);
        let pages = run(PipelineOptions::new(), &points, &cues);

        let total: usize = pages.iter().map(|page| page.cue_count).sum();
        assert_eq!(total, cues.len(), "seed {seed}");

        let mut words: Vec<&str> = pages.iter().flat_map(|page| page.text.split(' ')).collect();
        words.retain(|word| !word.is_empty());
        words.sort_unstable();
        let mut expected: Vec<&str> = cues.iter().map(|cue| cue.text.as_str()).collect();
        expected.sort_unstable();
        assert_eq!(words, expected, "seed {seed}");
    }
}

#[test]
fn cues_land_on_the_page_containing_their_midpoint() {
    let points = lecture(7, 2_000);
    let span = points.last().unwrap().0;
    let cues = cues(7, 200, span);
    let pages = run(PipelineOptions::new(), &points, &cues);

    for cue in &cues {
        let midpoint = cue.midpoint();
        let expected = pages
            .iter()
            .position(|page| midpoint < page.end)
            .unwrap_or(pages.len() - 1);
        let actual = pages
            .iter()
            .position(|page| page.text.split(' ').any(|word| word == cue.text))
            .unwrap();
        assert_eq!(actual, expected, "{} at midpoint {midpoint}", cue.text);
    }
}

// ── Determinism ────────────────────────────────────────────────────

#[test]
fn identical_input_gives_identical_pages() {
    let points = lecture(3, 2_500);
    let cues = cues(3, 100, 250.0);
    let first = run(PipelineOptions::new(), &points, &cues);
    let second = run(PipelineOptions::new(), &points, &cues);
    assert_eq!(first, second);
}

// ── Threshold monotonicity ─────────────────────────────────────────

#[test]
fn threshold_monotonicity_on_gradual_drift() {
    // A slow fade: every sample is a little brighter than the last.
    let points: Vec<(f64, f64)> = (0..400).map(|i| (f64::from(i), f64::from(i) / 400.0)).collect();

    let mut previous = 0;
    for step in 1..20 {
        let threshold = f64::from(step) * 0.05;
        let options = PipelineOptions::new()
            .with_similarity_threshold(threshold)
            .with_dedup_threshold(1.0)
            .with_dedup(false);
        let count = run(options, &points, &[]).len();
        assert!(
            count >= previous,
            "threshold {threshold} gave {count} pages, fewer than {previous}"
        );
        previous = count;
    }
    assert!(previous > 1);
}
