//! The image-similarity collaborator.
//!
//! Segmentation and deduplication only ever ask "how alike are these two
//! descriptors?". [`Similarity`] is that question. Swap the implementation
//! (histograms, perceptual hashes, embeddings) without touching the stages.

/// A symmetric, side-effect-free similarity score in `[0, 1]`.
///
/// Higher means more alike. Implementations must return the same value for
/// `(a, b)` and `(b, a)` and must not depend on call order; the pipeline's
/// determinism rests on it.
///
/// Closures implement the trait directly:
///
/// ```
/// use lecture2pdf::Similarity;
///
/// let scalar = |a: &f64, b: &f64| 1.0 - (a - b).abs();
/// assert_eq!(scalar.similarity(&0.25, &0.5), 0.75);
/// ```
pub trait Similarity<D: ?Sized> {
    fn similarity(&self, a: &D, b: &D) -> f64;
}

impl<D: ?Sized, F> Similarity<D> for F
where
    F: Fn(&D, &D) -> f64,
{
    fn similarity(&self, a: &D, b: &D) -> f64 {
        self(a, b)
    }
}

/// Score two descriptors, mapping NaN to 0 and clamping into `[0, 1]`.
///
/// A misbehaving collaborator then splits scenes rather than silently
/// merging them.
pub(crate) fn score<D: ?Sized, S: Similarity<D> + ?Sized>(similarity: &S, a: &D, b: &D) -> f64 {
    let value = similarity.similarity(a, b);
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_similarities() {
        let exact = |a: &u8, b: &u8| if a == b { 1.0 } else { 0.0 };
        assert_eq!(exact.similarity(&3, &3), 1.0);
        assert_eq!(exact.similarity(&3, &4), 0.0);
    }

    #[test]
    fn score_sanitises_out_of_range_values() {
        let nan = |_: &u8, _: &u8| f64::NAN;
        let large = |_: &u8, _: &u8| 3.0;
        let negative = |_: &u8, _: &u8| -1.0;
        assert_eq!(score(&nan, &0, &0), 0.0);
        assert_eq!(score(&large, &0, &0), 1.0);
        assert_eq!(score(&negative, &0, &0), 0.0);
    }
}
