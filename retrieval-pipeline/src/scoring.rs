use std::cmp::Ordering;

use common::storage::types::StoredObject;

/// Item paired with its similarity to the query.
#[derive(Debug, Clone)]
pub struct Scored<T> {
    pub item: T,
    pub score: f32,
}

impl<T> Scored<T> {
    pub const fn new(item: T, score: f32) -> Self {
        Self { item, score }
    }
}

/// Cosine similarity of two equal-length vectors. Zero vectors and
/// non-finite results score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| {
            (x.mul_add(*y, dot), x.mul_add(*x, na), y.mul_add(*y, nb))
        });

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator <= f32::EPSILON {
        return 0.0;
    }

    let similarity = dot / denominator;
    if similarity.is_finite() {
        similarity
    } else {
        0.0
    }
}

pub fn sort_by_score_desc<T>(items: &mut [Scored<T>])
where
    T: StoredObject,
{
    items.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.item.get_id().cmp(b.item.get_id()))
    });
}

/// Keeps the `k` best-scoring items, highest first.
pub fn top_k<T>(mut items: Vec<Scored<T>>, k: usize) -> Vec<Scored<T>>
where
    T: StoredObject,
{
    sort_by_score_desc(&mut items);
    items.truncate(k);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::storage::types::{text_chunk::TextChunk, Metadata};

    fn chunk(id: &str) -> TextChunk {
        TextChunk {
            id: id.into(),
            doc_id: "doc".into(),
            text: id.into(),
            metadata: Metadata::new(),
        }
    }

    #[test]
    fn cosine_similarity_of_parallel_and_orthogonal_vectors() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vectors_score_zero() {
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]).abs() < f32::EPSILON);
    }

    #[test]
    fn top_k_orders_by_score_then_id() {
        let items = vec![
            Scored::new(chunk("b"), 0.5),
            Scored::new(chunk("c"), 0.9),
            Scored::new(chunk("a"), 0.5),
            Scored::new(chunk("d"), 0.1),
        ];

        let best = top_k(items, 3);
        let ids: Vec<&str> = best.iter().map(|s| s.item.id.as_str()).collect();

        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn top_k_larger_than_input_returns_everything() {
        let items = vec![Scored::new(chunk("a"), 0.2)];
        assert_eq!(top_k(items, 10).len(), 1);
    }
}
