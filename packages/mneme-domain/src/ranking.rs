use std::cmp::Ordering;

/// Descending score order with NaN sorted last.
pub fn cmp_score_desc(a: f64, b: f64) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}

/// Number of candidates each retrieval arm fetches before fusion.
pub fn candidate_pool(max_results: u32, multiplier: u32) -> u32 {
	const MAX_CANDIDATES: u32 = 200;

	max_results.saturating_mul(multiplier).clamp(1, MAX_CANDIDATES)
}

/// Keeps scores at or above `min_score` and truncates to `max_results`, preserving order.
pub fn select_top<T>(
	items: Vec<T>,
	min_score: f64,
	max_results: u32,
	score: impl Fn(&T) -> f64,
) -> Vec<T> {
	items
		.into_iter()
		.filter(|item| score(item) >= min_score)
		.take(max_results as usize)
		.collect()
}
