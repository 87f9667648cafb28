use time::OffsetDateTime;

/// An indexed unit of text. Produced by ingestion and read-only to retrieval.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
	pub chunk_id: String,
	/// Origin identifier, usually a workspace-relative file path.
	pub path: String,
	pub source: String,
	pub start_line: Option<i32>,
	pub end_line: Option<i32>,
	pub text: String,
	/// Embedding model the chunk's vector was computed with, if any.
	pub model: Option<String>,
	/// Last-modified time of the chunk's origin.
	pub updated_at: Option<OffsetDateTime>,
}

/// A chunk scored by a single retrieval arm.
#[derive(Clone, Debug)]
pub struct ArmHit {
	pub chunk: Chunk,
	/// Arm-specific score, not comparable across arms.
	pub raw_score: f64,
	/// Score in `[0, 1]`.
	pub score: f64,
}

/// One entry per chunk after the arms are combined.
#[derive(Clone, Debug)]
pub struct FusedHit {
	pub chunk: Chunk,
	pub vector_score: Option<f64>,
	pub text_score: Option<f64>,
	pub score: f64,
}
impl FusedHit {
	pub fn from_keyword(hit: ArmHit) -> Self {
		Self { score: hit.score, text_score: Some(hit.score), vector_score: None, chunk: hit.chunk }
	}

	pub fn from_vector(hit: ArmHit) -> Self {
		Self { score: hit.score, vector_score: Some(hit.score), text_score: None, chunk: hit.chunk }
	}
}
