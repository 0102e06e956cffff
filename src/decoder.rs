//! FFmpeg-backed frame and subtitle sources (feature `ffmpeg`).
//!
//! [`VideoDecoder`] decodes the best video stream of a media file
//! forward-only and yields [`DecodedFrame`]s of [`DynamicImage`], scaled per
//! [`FrameOutputOptions`]. [`extract_subtitle_cues`] reads the best text
//! subtitle track into [`SubtitleCue`]s.
//!
//! # Example
//!
//! ```no_run
//! use lecture2pdf::decoder::{VideoDecoder, extract_subtitle_cues};
//! use lecture2pdf::{FrameOutputOptions, HistogramSimilarity, ManifestRenderer, Pipeline, PipelineOptions};
//!
//! let metric = HistogramSimilarity::default();
//! let decoder = VideoDecoder::open("lecture.mp4", FrameOutputOptions::default())?;
//! let cues = extract_subtitle_cues("lecture.mp4")?;
//!
//! let mut options = PipelineOptions::new();
//! if let Some(seconds) = decoder.duration_seconds() {
//!     options = options.with_expected_duration(seconds);
//! }
//! let pipeline = Pipeline::new(options, metric)?;
//! let report = pipeline.convert(decoder.fingerprinted(metric), &cues, &mut ManifestRenderer::new("out"))?;
//! println!("{report}");
//! # Ok::<(), lecture2pdf::PipelineError>(())
//! ```

use std::path::{Path, PathBuf};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational, Subtitle,
    codec::context::Context as CodecContext,
    decoder::Video as FfmpegVideoDecoder,
    format::context::Input,
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
    subtitle::Rect,
};
use image::{DynamicImage, GrayImage, RgbImage};

use crate::configuration::{FrameOutputOptions, PixelFormat};
use crate::error::PipelineError;
use crate::frame::DecodedFrame;
use crate::histogram::{HistogramFrame, HistogramSimilarity};
use crate::subtitle::{SubtitleCue, strip_markup};

/// Container durations and subtitle pts are in `AV_TIME_BASE` units.
const MICROSECONDS_PER_SECOND: f64 = 1_000_000.0;

/// Read errors in a row tolerated before the stream counts as broken.
const MAX_CONSECUTIVE_READ_ERRORS: u32 = 32;

/// Counts packet read failures since the last successful read.
#[derive(Debug, Default)]
struct ReadErrors {
    consecutive: u32,
}

impl ReadErrors {
    fn reset(&mut self) {
        self.consecutive = 0;
    }

    /// Record a failure. Returns `true` once the limit is exceeded.
    fn record(&mut self) -> bool {
        self.consecutive += 1;
        self.consecutive > MAX_CONSECUTIVE_READ_ERRORS
    }
}

fn open_input(path: &Path) -> Result<Input, PipelineError> {
    log::debug!("Opening media file: {}", path.display());

    ffmpeg_next::init().map_err(|error| PipelineError::FileOpen {
        path: path.to_path_buf(),
        reason: format!("FFmpeg initialisation failed: {error}"),
    })?;

    ffmpeg_next::format::input(&path).map_err(|error| PipelineError::FileOpen {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })
}

fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator().max(1) as f64
}

/// Copy the first plane of a scaled frame into a tightly packed buffer.
fn frame_to_buffer(frame: &VideoFrame, width: u32, height: u32, bytes_per_pixel: usize) -> Vec<u8> {
    let stride = frame.stride(0);
    let row = width as usize * bytes_per_pixel;
    let data = frame.data(0);

    if stride == row {
        data[..row * height as usize].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row * height as usize);
        for line in 0..height as usize {
            let offset = line * stride;
            buffer.extend_from_slice(&data[offset..offset + row]);
        }
        buffer
    }
}

/// A forward-only decoder over the best video stream of a file.
///
/// Owns the demuxer, so it can be handed to the pipeline by value. Decode
/// failures are reported as [`PipelineError::MalformedStream`] and end the
/// iteration.
pub struct VideoDecoder {
    path: PathBuf,
    input: Input,
    decoder: FfmpegVideoDecoder,
    scaler: ScalingContext,
    stream_index: usize,
    time_base: Rational,
    start_offset: i64,
    duration: Option<f64>,
    output: FrameOutputOptions,
    width: u32,
    height: u32,
    decoded_frame: VideoFrame,
    scaled_frame: VideoFrame,
    read_errors: ReadErrors,
    eof_sent: bool,
    done: bool,
}

impl VideoDecoder {
    /// Open `path` and prepare to decode its best video stream.
    ///
    /// # Errors
    ///
    /// [`PipelineError::FileOpen`] if the file cannot be opened,
    /// [`PipelineError::NoVideoStream`] if it has no video, or
    /// [`PipelineError::Ffmpeg`] if the codec or scaler cannot be set up.
    pub fn open<P: AsRef<Path>>(path: P, output: FrameOutputOptions) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let input = open_input(path)?;

        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or(PipelineError::NoVideoStream)?;
        let stream_index = stream.index();
        let time_base = stream.time_base();
        let start_offset = stream.start_time().max(0);
        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        let decoder = decoder_context.decoder().video()?;

        let duration =
            (input.duration() > 0).then(|| input.duration() as f64 / MICROSECONDS_PER_SECOND);

        let (width, height) = output.resolve_dimensions(decoder.width(), decoder.height());
        let scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            output.pixel_format.to_ffmpeg_pixel(),
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;

        log::debug!(
            "Decoding stream {stream_index} of {} at {width}x{height} ({:.1}s)",
            path.display(),
            duration.unwrap_or_default()
        );

        Ok(Self {
            path: path.to_path_buf(),
            input,
            decoder,
            scaler,
            stream_index,
            time_base,
            start_offset,
            duration,
            output,
            width,
            height,
            decoded_frame: VideoFrame::empty(),
            scaled_frame: VideoFrame::empty(),
            read_errors: ReadErrors::default(),
            eof_sent: false,
            done: false,
        })
    }

    /// The file being decoded.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Container duration in seconds, if the container records one.
    pub fn duration_seconds(&self) -> Option<f64> {
        self.duration
    }

    /// Output frame size after scaling.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Fingerprint every decoded frame with `metric`.
    pub fn fingerprinted(
        self,
        metric: HistogramSimilarity,
    ) -> impl Iterator<Item = Result<DecodedFrame<HistogramFrame>, PipelineError>> {
        self.map(move |frame| frame.map(|frame| frame.map(|image| metric.fingerprint(image))))
    }

    fn convert_current_frame(&mut self) -> Result<DynamicImage, PipelineError> {
        self.scaler
            .run(&self.decoded_frame, &mut self.scaled_frame)?;

        let (width, height) = (self.width, self.height);
        let buffer = frame_to_buffer(
            &self.scaled_frame,
            width,
            height,
            self.output.pixel_format.bytes_per_pixel(),
        );

        let image = match self.output.pixel_format {
            PixelFormat::Rgb8 => RgbImage::from_raw(width, height, buffer).map(DynamicImage::ImageRgb8),
            PixelFormat::Gray8 => {
                GrayImage::from_raw(width, height, buffer).map(DynamicImage::ImageLuma8)
            }
        };
        image.ok_or_else(|| {
            PipelineError::MalformedStream("decoded frame has fewer bytes than its size".to_string())
        })
    }

    fn current_timestamp(&self) -> Result<f64, PipelineError> {
        let pts = self
            .decoded_frame
            .timestamp()
            .or_else(|| self.decoded_frame.pts())
            .ok_or_else(|| PipelineError::MalformedStream("frame without timestamp".to_string()))?;
        Ok(pts_to_seconds(pts - self.start_offset, self.time_base))
    }

    fn fail(&mut self, error: PipelineError) -> Option<<Self as Iterator>::Item> {
        self.done = true;
        Some(Err(error))
    }
}

impl Iterator for VideoDecoder {
    type Item = Result<DecodedFrame<DynamicImage>, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                let timestamp = match self.current_timestamp() {
                    Ok(timestamp) => timestamp,
                    Err(error) => return self.fail(error),
                };
                return match self.convert_current_frame() {
                    Ok(image) => Some(Ok(DecodedFrame::new(timestamp, image))),
                    Err(error) => self.fail(error),
                };
            }

            if self.eof_sent {
                self.done = true;
                return None;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    self.read_errors.reset();
                    if packet.stream() == self.stream_index
                        && let Err(error) = self.decoder.send_packet(&packet)
                    {
                        return self.fail(PipelineError::MalformedStream(format!(
                            "decoder rejected packet: {error}"
                        )));
                    }
                }
                Err(FfmpegError::Eof) => {
                    if let Err(error) = self.decoder.send_eof() {
                        return self.fail(PipelineError::MalformedStream(format!(
                            "decoder failed to flush: {error}"
                        )));
                    }
                    self.eof_sent = true;
                }
                Err(error) => {
                    if self.read_errors.record() {
                        return self.fail(PipelineError::MalformedStream(format!(
                            "{MAX_CONSECUTIVE_READ_ERRORS} packet reads failed in a row, last: {error}"
                        )));
                    }
                    log::debug!("Skipping unreadable packet: {error}");
                }
            }
        }
    }
}

/// The text of an ASS event.
///
/// Legacy `Dialogue:` lines carry nine fields before the text. Packet-level
/// events (`ReadOrder,Layer,Style,Name,MarginL,MarginR,MarginV,Effect,Text`)
/// carry eight. Input with fewer fields is returned whole.
fn dialogue_text(input: &str) -> &str {
    let fields = if input.starts_with("Dialogue:") { 9 } else { 8 };
    input
        .char_indices()
        .filter(|&(_, c)| c == ',')
        .nth(fields - 1)
        .map_or(input, |(index, _)| &input[index + 1..])
}

/// Decode the best subtitle stream of `path` into cues sorted by start.
///
/// Text and ASS events are supported; bitmap subtitles are skipped. Events
/// whose display interval is empty fall back to the packet duration, and
/// are dropped if that is empty too.
///
/// # Errors
///
/// [`PipelineError::FileOpen`] or [`PipelineError::NoSubtitleStream`], or
/// [`PipelineError::Ffmpeg`] if decoding fails.
pub fn extract_subtitle_cues<P: AsRef<Path>>(path: P) -> Result<Vec<SubtitleCue>, PipelineError> {
    let mut input = open_input(path.as_ref())?;

    let stream = input
        .streams()
        .best(Type::Subtitle)
        .ok_or(PipelineError::NoSubtitleStream)?;
    let stream_index = stream.index();
    let time_base = stream.time_base();
    let decoder_context = CodecContext::from_parameters(stream.parameters())?;
    let mut decoder = decoder_context.decoder().subtitle()?;

    log::debug!("Extracting subtitles from stream {stream_index}");

    let mut cues = Vec::new();
    let mut subtitle = Subtitle::new();

    for (stream, packet) in input.packets() {
        if stream.index() != stream_index {
            continue;
        }
        if !decoder.decode(&packet, &mut subtitle)? {
            continue;
        }

        // Subtitle pts is in microseconds; fall back to the packet's.
        let base = match subtitle.pts() {
            Some(pts) => pts.max(0) as f64 / MICROSECONDS_PER_SECOND,
            None => pts_to_seconds(packet.pts().unwrap_or(0).max(0), time_base),
        };
        let start = base + f64::from(subtitle.start()) / 1000.0;
        let mut end = base + f64::from(subtitle.end()) / 1000.0;
        if end <= start {
            end = start + pts_to_seconds(packet.duration(), time_base);
        }
        if end <= start {
            log::debug!("Dropping subtitle event at {start:.3}s with no duration");
            continue;
        }

        let text: Vec<String> = subtitle
            .rects()
            .filter_map(|rect| match rect {
                Rect::Text(text) => Some(strip_markup(text.get())),
                Rect::Ass(ass) => Some(strip_markup(dialogue_text(ass.get()))),
                _ => None,
            })
            .filter(|text| !text.is_empty())
            .collect();

        if !text.is_empty() {
            cues.push(SubtitleCue::new(start, end, text.join("\n")));
        }
    }

    cues.sort_by(|a, b| a.start.total_cmp(&b.start));
    log::debug!("Extracted {} subtitle cues", cues.len());
    Ok(cues)
}
