/// Cosine similarity accumulated in `f64`.
///
/// Empty input, mismatched dimensions, and zero-norm vectors all yield `0.0` instead of an error
/// or a division by zero.
pub fn cosine_similarity(lhs: &[f32], rhs: &[f32]) -> f64 {
	if lhs.is_empty() || lhs.len() != rhs.len() {
		return 0.0;
	}

	let mut dot = 0.0_f64;
	let mut lhs_norm = 0.0_f64;
	let mut rhs_norm = 0.0_f64;

	for (l, r) in lhs.iter().zip(rhs.iter()) {
		let (l, r) = (f64::from(*l), f64::from(*r));

		dot += l * r;
		lhs_norm += l * l;
		rhs_norm += r * r;
	}

	if lhs_norm == 0.0 || rhs_norm == 0.0 {
		return 0.0;
	}

	dot / (lhs_norm.sqrt() * rhs_norm.sqrt())
}

pub fn is_zero_vector(vector: &[f32]) -> bool {
	vector.iter().all(|value| *value == 0.0)
}

/// Maps a native cosine distance back onto the similarity scale.
pub fn distance_to_similarity(distance: f64) -> f64 {
	1.0 - distance
}

/// Clamps a similarity into the `[0, 1]` range shared by every arm.
pub fn normalize_similarity(similarity: f64) -> f64 {
	if similarity.is_nan() {
		return 0.0;
	}

	similarity.clamp(0.0, 1.0)
}
