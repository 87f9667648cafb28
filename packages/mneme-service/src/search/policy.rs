use mneme_config::{Search, SearchOverrides};
use mneme_domain::{decay::DecaySettings, hybrid::HybridWeights, ranking};

use crate::{Error, Result};

/// Search settings for a single call: stored defaults with the call's overrides applied.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedSearchPolicy {
	pub max_results: u32,
	pub min_score: f64,
	/// Candidates fetched per retrieval arm.
	pub candidates: u32,
	pub weights: HybridWeights,
	pub hybrid_enabled: bool,
	/// MMR lambda when diversity reranking is enabled.
	pub mmr_lambda: Option<f64>,
	pub decay: Option<DecaySettings>,
	pub snippet_max_chars: usize,
	pub sources: Vec<String>,
}
impl ResolvedSearchPolicy {
	pub fn resolve(cfg: &Search, overrides: &SearchOverrides) -> Result<Self> {
		let min_score = overrides.min_score.unwrap_or(cfg.min_score);
		let max_results = overrides.max_results.unwrap_or(cfg.max_results);

		mneme_config::validate_min_score("min_score", min_score)
			.map_err(|err| Error::InvalidRequest { message: err.to_string() })?;

		if max_results == 0 {
			return Err(Error::InvalidRequest {
				message: "max_results must be greater than zero.".to_string(),
			});
		}

		Ok(Self {
			max_results,
			min_score,
			candidates: ranking::candidate_pool(max_results, cfg.hybrid.candidate_multiplier),
			weights: HybridWeights::new(cfg.hybrid.vector_weight, cfg.hybrid.text_weight),
			hybrid_enabled: cfg.hybrid.enabled,
			mmr_lambda: cfg.mmr.enabled.then_some(cfg.mmr.lambda),
			decay: cfg
				.temporal_decay
				.enabled
				.then_some(DecaySettings { half_life_days: cfg.temporal_decay.half_life_days }),
			snippet_max_chars: cfg.snippet_max_chars as usize,
			sources: cfg.sources.clone(),
		})
	}
}
