use std::{fmt, sync::LazyLock};

use regex::Regex;

/// Rank assigned to non-finite lexical ranks before conversion, so they score near zero.
pub const NON_FINITE_RANK: f64 = 999.0;

static TERM_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[\p{L}\p{N}_]+").ok());

/// A boolean AND match over the letter, digit, and underscore runs of a raw query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchQuery {
	terms: Vec<String>,
}
impl MatchQuery {
	/// Returns `None` when the query has no searchable terms. The index must not be queried with
	/// an empty expression.
	pub fn parse(raw: &str) -> Option<Self> {
		let re = TERM_RE.as_ref()?;
		let terms = re
			.find_iter(raw)
			.map(|m| m.as_str().trim().to_string())
			.filter(|term| !term.is_empty())
			.collect::<Vec<_>>();

		if terms.is_empty() {
			return None;
		}

		Some(Self { terms })
	}

	pub fn terms(&self) -> &[String] {
		&self.terms
	}
}
impl fmt::Display for MatchQuery {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (idx, term) in self.terms.iter().enumerate() {
			if idx > 0 {
				f.write_str(" AND ")?;
			}

			write!(f, "\"{term}\"")?;
		}

		Ok(())
	}
}

/// Converts a lower-is-better lexical rank into a score in (0, 1].
pub fn bm25_rank_to_score(rank: f64) -> f64 {
	let rank = if rank.is_finite() { rank.max(0.0) } else { NON_FINITE_RANK };

	1.0 / (1.0 + rank)
}
