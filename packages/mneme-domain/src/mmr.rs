//! Maximal marginal relevance (Carbonell & Goldstein, 1998) over chunk text.

use std::collections::HashSet;

use crate::{chunk::FusedHit, ranking};

#[derive(Clone, Copy)]
struct MmrPick {
	remaining_pos: usize,
	mmr_score: f64,
	score: f64,
}
impl MmrPick {
	fn better_than(self, other: &Self) -> bool {
		self.mmr_score > other.mmr_score
			|| (self.mmr_score == other.mmr_score && self.score > other.score)
	}
}

/// Lowercased runs of alphanumerics and underscores.
pub fn text_tokens(text: &str) -> HashSet<String> {
	text.split(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
		.filter(|token| !token.is_empty())
		.map(str::to_lowercase)
		.collect()
}

pub fn jaccard_similarity(lhs: &HashSet<String>, rhs: &HashSet<String>) -> f64 {
	if lhs.is_empty() && rhs.is_empty() {
		return 0.0;
	}

	let intersection = lhs.intersection(rhs).count();
	let union = lhs.len() + rhs.len() - intersection;

	if union == 0 {
		return 0.0;
	}

	intersection as f64 / union as f64
}

pub fn mmr_score(lambda: f64, relevance: f64, max_similarity: f64) -> f64 {
	lambda * relevance - (1.0 - lambda) * max_similarity
}

/// Reorders hits to trade relevance against redundancy. Scores are not modified.
pub fn mmr_rerank(hits: Vec<FusedHit>, lambda: f64) -> Vec<FusedHit> {
	if hits.len() < 2 {
		return hits;
	}

	let lambda = if lambda.is_finite() { lambda.clamp(0.0, 1.0) } else { 1.0 };

	if lambda == 1.0 {
		let mut hits = hits;

		hits.sort_by(|a, b| ranking::cmp_score_desc(a.score, b.score));

		return hits;
	}

	let relevance = normalized_relevance(&hits);
	// Computed once per call; reused for every comparison below.
	let tokens = hits.iter().map(|hit| text_tokens(&hit.chunk.text)).collect::<Vec<_>>();
	let mut remaining = (0..hits.len()).collect::<Vec<_>>();
	let mut selected: Vec<usize> = Vec::with_capacity(hits.len());

	while !remaining.is_empty() {
		let Some(pick) = pick_next(&hits, &relevance, &tokens, &remaining, &selected, lambda)
		else {
			break;
		};

		selected.push(remaining.remove(pick.remaining_pos));
	}

	let mut slots = hits.into_iter().map(Some).collect::<Vec<_>>();

	selected.into_iter().filter_map(|idx| slots[idx].take()).collect()
}

fn normalized_relevance(hits: &[FusedHit]) -> Vec<f64> {
	let min = hits.iter().map(|hit| hit.score).fold(f64::INFINITY, f64::min);
	let max = hits.iter().map(|hit| hit.score).fold(f64::NEG_INFINITY, f64::max);
	let range = max - min;

	hits.iter()
		.map(|hit| if range > 0.0 { (hit.score - min) / range } else { 1.0 })
		.collect()
}

fn pick_next(
	hits: &[FusedHit],
	relevance: &[f64],
	tokens: &[HashSet<String>],
	remaining: &[usize],
	selected: &[usize],
	lambda: f64,
) -> Option<MmrPick> {
	let mut best: Option<MmrPick> = None;

	for (remaining_pos, &idx) in remaining.iter().enumerate() {
		let max_similarity = selected
			.iter()
			.map(|&chosen| jaccard_similarity(&tokens[idx], &tokens[chosen]))
			.fold(0.0, f64::max);
		let pick = MmrPick {
			remaining_pos,
			mmr_score: mmr_score(lambda, relevance[idx], max_similarity),
			score: hits[idx].score,
		};

		if best.as_ref().map(|current| pick.better_than(current)).unwrap_or(true) {
			best = Some(pick);
		}
	}

	best
}
