use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct ChunkRecord {
	pub chunk_id: String,
	pub path: String,
	pub source: String,
	pub start_line: Option<i32>,
	pub end_line: Option<i32>,
	pub text: String,
	pub model: Option<String>,
	pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct LexicalMatchRow {
	#[sqlx(flatten)]
	pub chunk: ChunkRecord,
	/// `ts_rank_cd` with length normalization plus dense-script substring hits; higher is better.
	pub rank_score: f32,
}
impl LexicalMatchRow {
	/// Lower-is-better rank relative to `best`, the highest `rank_score` in the same result set.
	///
	/// The best match gets rank 0, and `1 / (1 + rank)` recovers `rank_score / best`.
	pub fn rank(&self, best: f32) -> f64 {
		let score = f64::from(self.rank_score);
		let best = f64::from(best);

		if score <= 0.0 || !score.is_finite() || best <= 0.0 || !best.is_finite() {
			return f64::INFINITY;
		}

		((best - score) / score).max(0.0)
	}
}

/// Highest `rank_score` in a result set, or 0 when it is empty.
pub fn best_rank_score(rows: &[LexicalMatchRow]) -> f32 {
	rows.iter()
		.map(|row| row.rank_score)
		.filter(|score| score.is_finite())
		.fold(0.0, f32::max)
}

#[derive(Debug, sqlx::FromRow)]
pub struct ChunkVectorRow {
	#[sqlx(flatten)]
	pub chunk: ChunkRecord,
	pub vec: Vec<f32>,
}

/// A nearest-neighbor match from the native vector index.
#[derive(Clone, Debug, PartialEq)]
pub struct NeighborRecord {
	pub chunk_id: String,
	/// Cosine distance, `1 - similarity`.
	pub distance: f64,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn row(chunk_id: &str, rank_score: f32) -> LexicalMatchRow {
		LexicalMatchRow {
			chunk: ChunkRecord {
				chunk_id: chunk_id.to_string(),
				path: format!("memory/{chunk_id}.md"),
				source: "memory".to_string(),
				start_line: None,
				end_line: None,
				text: "billing outage retrospective".to_string(),
				model: None,
				updated_at: None,
			},
			rank_score,
		}
	}

	fn score(rank: f64) -> f64 {
		1.0 / (1.0 + rank)
	}

	#[test]
	fn best_match_scores_one_even_when_ts_rank_is_small() {
		// A single-term match over a short text ranks about 0.0909.
		let rows = vec![row("a", 0.090_909_09), row("b", 0.045_454_55)];
		let best = best_rank_score(&rows);

		assert_eq!(rows[0].rank(best), 0.0);
		assert!((score(rows[0].rank(best)) - 1.0).abs() < 1e-9);
		assert!((score(rows[1].rank(best)) - 0.5).abs() < 1e-6);
	}

	#[test]
	fn non_positive_scores_rank_last() {
		let rows = vec![row("a", 0.2), row("b", 0.0), row("c", f32::NAN)];
		let best = best_rank_score(&rows);

		assert_eq!(best, 0.2);
		assert_eq!(rows[1].rank(best), f64::INFINITY);
		assert_eq!(rows[2].rank(best), f64::INFINITY);
		assert_eq!(best_rank_score(&[]), 0.0);
	}
}
