mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Chunking, Config, EmbeddingProviderConfig, Postgres, Providers, Qdrant, Search, SearchHybrid,
	SearchMmr, SearchOverrides, SearchTemporalDecay, SearchVector, Service, Storage, SyncConfig,
	VectorBackend,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}

	validate_storage(cfg)?;
	validate_embedding(cfg)?;

	if cfg.chunking.tokens == 0 {
		return Err(Error::Validation {
			message: "chunking.tokens must be greater than zero.".to_string(),
		});
	}
	if cfg.chunking.overlap >= cfg.chunking.tokens {
		return Err(Error::Validation {
			message: "chunking.overlap must be less than chunking.tokens.".to_string(),
		});
	}

	validate_search(&cfg.search)?;

	if cfg.search.vector.backend == VectorBackend::Native && cfg.storage.qdrant.is_none() {
		return Err(Error::Validation {
			message: "search.vector.backend = native requires [storage.qdrant].".to_string(),
		});
	}

	Ok(())
}

/// Checks a single per-call minimum score against the same bounds as `search.min_score`.
pub fn validate_min_score(label: &str, min_score: f64) -> Result<()> {
	if !min_score.is_finite() {
		return Err(Error::Validation { message: format!("{label} must be a finite number.") });
	}
	if !(0.0..=1.0).contains(&min_score) {
		return Err(Error::Validation { message: format!("{label} must be in the range 0.0-1.0.") });
	}

	Ok(())
}

fn validate_storage(cfg: &Config) -> Result<()> {
	if let Some(postgres) = cfg.storage.postgres.as_ref() {
		if postgres.dsn.trim().is_empty() {
			return Err(Error::Validation {
				message: "storage.postgres.dsn must be non-empty.".to_string(),
			});
		}
		if postgres.pool_max_conns == 0 {
			return Err(Error::Validation {
				message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
			});
		}
	}
	if let Some(qdrant) = cfg.storage.qdrant.as_ref() {
		if qdrant.url.trim().is_empty() {
			return Err(Error::Validation {
				message: "storage.qdrant.url must be non-empty.".to_string(),
			});
		}
		if qdrant.collection.trim().is_empty() {
			return Err(Error::Validation {
				message: "storage.qdrant.collection must be non-empty.".to_string(),
			});
		}
		if qdrant.vector_dim == 0 {
			return Err(Error::Validation {
				message: "storage.qdrant.vector_dim must be greater than zero.".to_string(),
			});
		}
	}

	Ok(())
}

fn validate_embedding(cfg: &Config) -> Result<()> {
	let Some(embedding) = cfg.providers.embedding.as_ref() else {
		return Ok(());
	};

	for (label, value) in [
		("providers.embedding.provider_id", &embedding.provider_id),
		("providers.embedding.api_base", &embedding.api_base),
		("providers.embedding.model", &embedding.model),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if embedding.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if embedding.query_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.query_timeout_ms must be greater than zero.".to_string(),
		});
	}

	if let Some(qdrant) = cfg.storage.qdrant.as_ref()
		&& qdrant.vector_dim != embedding.dimensions
	{
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}

	Ok(())
}

fn validate_search(search: &Search) -> Result<()> {
	if search.max_results == 0 {
		return Err(Error::Validation {
			message: "search.max_results must be greater than zero.".to_string(),
		});
	}

	validate_min_score("search.min_score", search.min_score)?;

	if search.snippet_max_chars == 0 {
		return Err(Error::Validation {
			message: "search.snippet_max_chars must be greater than zero.".to_string(),
		});
	}

	let hybrid = &search.hybrid;

	for (label, weight) in [
		("search.hybrid.vector_weight", hybrid.vector_weight),
		("search.hybrid.text_weight", hybrid.text_weight),
	] {
		if !weight.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if weight < 0.0 {
			return Err(Error::Validation { message: format!("{label} must be zero or greater.") });
		}
	}

	if hybrid.vector_weight + hybrid.text_weight <= 0.0 {
		return Err(Error::Validation {
			message: "search.hybrid.vector_weight and search.hybrid.text_weight must not both be zero."
				.to_string(),
		});
	}
	if hybrid.candidate_multiplier == 0 {
		return Err(Error::Validation {
			message: "search.hybrid.candidate_multiplier must be greater than zero.".to_string(),
		});
	}
	if !search.mmr.lambda.is_finite() {
		return Err(Error::Validation {
			message: "search.mmr.lambda must be a finite number.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&search.mmr.lambda) {
		return Err(Error::Validation {
			message: "search.mmr.lambda must be in the range 0.0-1.0.".to_string(),
		});
	}

	let decay = &search.temporal_decay;

	if !decay.half_life_days.is_finite() {
		return Err(Error::Validation {
			message: "search.temporal_decay.half_life_days must be a finite number.".to_string(),
		});
	}
	if decay.half_life_days <= 0.0 {
		return Err(Error::Validation {
			message: "search.temporal_decay.half_life_days must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if let Some(qdrant) = cfg.storage.qdrant.as_mut() {
		qdrant.url = qdrant.url.trim().trim_end_matches('/').to_string();
	}
	if let Some(embedding) = cfg.providers.embedding.as_mut() {
		embedding.api_base = embedding.api_base.trim().trim_end_matches('/').to_string();
	}

	normalize_list(&mut cfg.search.sources);
	normalize_list(&mut cfg.search.temporal_decay.evergreen_files);
	normalize_list(&mut cfg.search.temporal_decay.evergreen_dirs);

	for dir in cfg.search.temporal_decay.evergreen_dirs.iter_mut() {
		*dir = dir.trim_matches('/').to_string();
	}

	cfg.search.temporal_decay.evergreen_dirs.retain(|dir| !dir.is_empty());
}

fn normalize_list(values: &mut Vec<String>) {
	let mut out: Vec<String> = Vec::with_capacity(values.len());

	for value in values.drain(..) {
		let trimmed = value.trim();

		if trimmed.is_empty() || out.iter().any(|seen| seen == trimmed) {
			continue;
		}

		out.push(trimmed.to_string());
	}

	*values = out;
}
