use std::collections::HashMap;

use crate::{
	chunk::{ArmHit, FusedHit},
	ranking,
};

/// Arm weights renormalized to sum to one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HybridWeights {
	pub vector: f64,
	pub text: f64,
}
impl HybridWeights {
	pub fn new(vector: f64, text: f64) -> Self {
		let vector = if vector.is_finite() { vector.max(0.0) } else { 0.0 };
		let text = if text.is_finite() { text.max(0.0) } else { 0.0 };
		let total = vector + text;

		if total <= 0.0 {
			return Self { vector: 0.5, text: 0.5 };
		}

		Self { vector: vector / total, text: text / total }
	}

	pub fn fuse(&self, vector_score: f64, text_score: f64) -> f64 {
		self.vector * vector_score + self.text * text_score
	}
}

/// Merges both arms into one entry per chunk id, substituting zero for a missing side.
///
/// Output is ordered by fused score, ties keeping first-seen order with vector hits first.
pub fn merge_hybrid(
	vector: Vec<ArmHit>,
	keyword: Vec<ArmHit>,
	weights: HybridWeights,
) -> Vec<FusedHit> {
	let mut index: HashMap<String, usize> = HashMap::new();
	let mut merged: Vec<FusedHit> = Vec::with_capacity(vector.len() + keyword.len());

	for hit in vector {
		match index.get(&hit.chunk.chunk_id) {
			Some(&pos) => {
				let entry = &mut merged[pos];

				entry.vector_score = Some(entry.vector_score.unwrap_or(0.0).max(hit.score));
			},
			None => {
				index.insert(hit.chunk.chunk_id.clone(), merged.len());
				merged.push(FusedHit::from_vector(hit));
			},
		}
	}
	for hit in keyword {
		match index.get(&hit.chunk.chunk_id) {
			Some(&pos) => {
				let entry = &mut merged[pos];

				entry.text_score = Some(entry.text_score.unwrap_or(0.0).max(hit.score));
			},
			None => {
				index.insert(hit.chunk.chunk_id.clone(), merged.len());
				merged.push(FusedHit::from_keyword(hit));
			},
		}
	}

	for entry in merged.iter_mut() {
		entry.score =
			weights.fuse(entry.vector_score.unwrap_or(0.0), entry.text_score.unwrap_or(0.0));
	}

	merged.sort_by(|a, b| ranking::cmp_score_desc(a.score, b.score));

	merged
}

/// Keyword-only merge: one entry per chunk id keeping the best score seen across terms.
pub fn merge_max(hits: Vec<ArmHit>) -> Vec<FusedHit> {
	let mut index: HashMap<String, usize> = HashMap::new();
	let mut merged: Vec<FusedHit> = Vec::with_capacity(hits.len());

	for hit in hits {
		match index.get(&hit.chunk.chunk_id) {
			Some(&pos) =>
				if hit.score > merged[pos].score {
					merged[pos] = FusedHit::from_keyword(hit);
				},
			None => {
				index.insert(hit.chunk.chunk_id.clone(), merged.len());
				merged.push(FusedHit::from_keyword(hit));
			},
		}
	}

	merged.sort_by(|a, b| {
		ranking::cmp_score_desc(a.score, b.score)
			.then_with(|| a.chunk.chunk_id.cmp(&b.chunk.chunk_id))
	});

	merged
}
