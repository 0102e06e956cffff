//! Document rendering.
//!
//! Turning pages into a finished PDF is the renderer collaborator's job.
//! The crate ships [`ManifestRenderer`], which writes each page image as a
//! PNG plus a `pages.json` index that a layout tool can turn into a
//! document.

use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use serde_json::{Value, json};

use crate::assembler::PageRecord;
use crate::error::PipelineError;
use crate::histogram::HistogramFrame;

/// Consumes a finished page sequence.
///
/// Called once per run, with every page, only after the run succeeded.
pub trait DocumentRenderer<D> {
    fn render(&mut self, pages: &[PageRecord<D>]) -> Result<(), PipelineError>;
}

impl<D, F> DocumentRenderer<D> for F
where
    F: FnMut(&[PageRecord<D>]) -> Result<(), PipelineError>,
{
    fn render(&mut self, pages: &[PageRecord<D>]) -> Result<(), PipelineError> {
        self(pages)
    }
}

/// Descriptors that carry a picture of their frame.
pub trait PageImage {
    fn page_image(&self) -> &DynamicImage;
}

impl PageImage for DynamicImage {
    fn page_image(&self) -> &DynamicImage {
        self
    }
}

impl PageImage for HistogramFrame {
    fn page_image(&self) -> &DynamicImage {
        self.image()
    }
}

/// Writes `page_NNNN.png` for every page and a `pages.json` manifest into
/// one directory.
///
/// The manifest looks like:
///
/// ```json
/// {
///   "page_count": 2,
///   "pages": [
///     { "index": 0, "start": 0.0, "end": 31.0, "text": "...", "image": "page_0000.png" },
///     ...
///   ]
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ManifestRenderer {
    directory: PathBuf,
}

impl ManifestRenderer {
    /// Name of the manifest file inside the output directory.
    pub const MANIFEST_FILE: &'static str = "pages.json";

    /// Render into `directory`, creating it if needed.
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    /// Output directory for images and the manifest.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// File name used for the image of page `index`.
    pub fn image_file_name(index: usize) -> String {
        format!("page_{index:04}.png")
    }

    fn manifest<D>(pages: &[PageRecord<D>]) -> Value {
        let entries: Vec<Value> = pages
            .iter()
            .map(|page| {
                json!({
                    "index": page.index,
                    "start": page.start,
                    "end": page.end,
                    "text": page.text,
                    "image": Self::image_file_name(page.index),
                })
            })
            .collect();

        json!({
            "page_count": pages.len(),
            "pages": entries,
        })
    }
}

impl<D: PageImage> DocumentRenderer<D> for ManifestRenderer {
    fn render(&mut self, pages: &[PageRecord<D>]) -> Result<(), PipelineError> {
        if pages.is_empty() {
            return Err(PipelineError::Render("no pages to render".to_string()));
        }

        fs::create_dir_all(&self.directory)?;

        for page in pages {
            let path = self.directory.join(Self::image_file_name(page.index));
            page.image.descriptor().page_image().save(&path)?;
        }

        let manifest = serde_json::to_string_pretty(&Self::manifest(pages))?;
        fs::write(self.directory.join(Self::MANIFEST_FILE), manifest)?;

        log::info!(
            "Wrote {} pages to {}",
            pages.len(),
            self.directory.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameSample;

    #[test]
    fn image_names_are_zero_padded() {
        assert_eq!(ManifestRenderer::image_file_name(7), "page_0007.png");
        assert_eq!(ManifestRenderer::image_file_name(12345), "page_12345.png");
    }

    #[test]
    fn manifest_lists_pages_in_order() {
        let pages = vec![
            PageRecord {
                index: 0,
                image: FrameSample::new(0.0, ()),
                start: 0.0,
                end: 2.5,
                text: "intro".to_string(),
                cue_count: 1,
            },
            PageRecord {
                index: 1,
                image: FrameSample::new(2.5, ()),
                start: 2.5,
                end: 4.0,
                text: String::new(),
                cue_count: 0,
            },
        ];
        let manifest = ManifestRenderer::manifest(&pages);
        assert_eq!(manifest["page_count"], 2);
        assert_eq!(manifest["pages"][0]["text"], "intro");
        assert_eq!(manifest["pages"][1]["start"], 2.5);
        assert_eq!(manifest["pages"][1]["image"], "page_0001.png");
    }

    #[test]
    fn closures_are_renderers() {
        let mut seen = 0;
        let mut renderer = |pages: &[PageRecord<u8>]| {
            seen = pages.len();
            Ok::<(), PipelineError>(())
        };
        renderer.render(&[]).unwrap();
        assert_eq!(seen, 0);
    }
}
