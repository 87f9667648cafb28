use time::OffsetDateTime;

use mneme_domain::chunk::{ArmHit, Chunk, FusedHit};

pub fn chunk(chunk_id: &str, path: &str, text: &str) -> Chunk {
	Chunk {
		chunk_id: chunk_id.to_string(),
		path: path.to_string(),
		source: "memory".to_string(),
		start_line: Some(1),
		end_line: Some(10),
		text: text.to_string(),
		model: None,
		updated_at: None,
	}
}

pub fn arm_hit(chunk_id: &str, score: f64) -> ArmHit {
	ArmHit { chunk: chunk(chunk_id, "notes/a.md", chunk_id), raw_score: score, score }
}

pub fn fused(chunk_id: &str, text: &str, score: f64) -> FusedHit {
	let chunk = chunk(chunk_id, "notes/a.md", text);

	FusedHit { chunk, vector_score: None, text_score: None, score }
}

pub fn fused_at(
	chunk_id: &str,
	path: &str,
	updated_at: Option<OffsetDateTime>,
	score: f64,
) -> FusedHit {
	let mut chunk = chunk(chunk_id, path, chunk_id);

	chunk.updated_at = updated_at;

	FusedHit { chunk, vector_score: None, text_score: None, score }
}

pub fn ids(hits: &[FusedHit]) -> Vec<&str> {
	hits.iter().map(|hit| hit.chunk.chunk_id.as_str()).collect()
}
