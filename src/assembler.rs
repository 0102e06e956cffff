//! Page assembly.
//!
//! The last stage: one [`PageRecord`] per finished scene, in order, with the
//! scene's cue texts joined into one caption.

use crate::error::PipelineError;
use crate::frame::FrameSample;
use crate::scene::Scene;

/// One page of the output document.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord<D> {
    /// Zero-based page number; equals the scene's position.
    pub index: usize,
    /// The scene's representative frame.
    pub image: FrameSample<D>,
    /// Start of the scene, in seconds.
    pub start: f64,
    /// End of the scene, in seconds.
    pub end: f64,
    /// Cue texts joined by single spaces. Empty when nothing was said.
    pub text: String,
    /// How many cues contributed to `text`.
    pub cue_count: usize,
}

/// Join cue texts with single spaces, collapsing whitespace runs and
/// skipping pieces that are blank.
pub fn join_cue_text<S: AsRef<str>>(pieces: &[S]) -> String {
    pieces
        .iter()
        .flat_map(|piece| piece.as_ref().split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A lazy iterator mapping scenes to page records.
pub struct PageAssembler<I> {
    scenes: I,
    index: usize,
}

impl<I, D> PageAssembler<I>
where
    I: Iterator<Item = Result<Scene<D>, PipelineError>>,
{
    /// Number pages of `scenes` from zero.
    pub fn new<T>(scenes: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            scenes: scenes.into_iter(),
            index: 0,
        }
    }
}

impl<I, D> Iterator for PageAssembler<I>
where
    I: Iterator<Item = Result<Scene<D>, PipelineError>>,
{
    type Item = Result<PageRecord<D>, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        let scene = match self.scenes.next()? {
            Ok(scene) => scene,
            Err(error) => return Some(Err(error)),
        };

        let (start, end, image, cue_text) = scene.into_parts();
        let page = PageRecord {
            index: self.index,
            image,
            start,
            end,
            text: join_cue_text(&cue_text),
            cue_count: cue_text.len(),
        };
        self.index += 1;
        Some(Ok(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneBuilder;

    #[test]
    fn joins_and_normalises_whitespace() {
        assert_eq!(join_cue_text(&["  Hello\nthere ", "", "  world\t!"]), "Hello there world !");
        assert_eq!(join_cue_text::<&str>(&[]), "");
    }

    #[test]
    fn pages_are_indexed_in_order() {
        let scenes = vec![
            Ok(SceneBuilder::new(0.0, 1.0, FrameSample::new(0.0, 'a')).build()),
            Ok(SceneBuilder::new(1.0, 2.0, FrameSample::new(1.0, 'b')).build()),
        ];
        let pages: Vec<_> = PageAssembler::new(scenes).collect::<Result<_, _>>().unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].index, 1);
        assert_eq!(*pages[1].image.descriptor(), 'b');
        assert_eq!(pages[0].text, "");
        assert_eq!(pages[0].cue_count, 0);
    }
}
