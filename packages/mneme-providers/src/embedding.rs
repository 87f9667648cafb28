use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// Embeds `texts` with an OpenAI-compatible `/embeddings` endpoint, one vector per input in order.
pub async fn embed(
	cfg: &mneme_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	if texts.is_empty() {
		return Ok(Vec::new());
	}

	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(format!("{}{}", cfg.api_base, cfg.path))
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let vectors = parse_embedding_response(json)?;

	check_shape(&vectors, texts.len(), cfg.dimensions as usize)?;

	Ok(vectors)
}

/// Reads `data[*].embedding`, ordered by each item's `index` (position when absent).
pub fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let Some(data) = json.get("data").and_then(Value::as_array) else {
		return Err(invalid("Embedding response is missing data array."));
	};
	let mut indexed = data
		.iter()
		.enumerate()
		.map(|(position, item)| {
			let index = item
				.get("index")
				.and_then(Value::as_u64)
				.map(|index| index as usize)
				.unwrap_or(position);

			Ok((index, parse_vector(item)?))
		})
		.collect::<Result<Vec<_>>>()?;

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
}

/// One vector per input, each with the configured dimension.
pub fn check_shape(vectors: &[Vec<f32>], inputs: usize, dimensions: usize) -> Result<()> {
	if vectors.len() != inputs {
		return Err(invalid(format!(
			"Embedding response has {} vectors for {inputs} inputs.",
			vectors.len()
		)));
	}
	if let Some(vector) = vectors.iter().find(|vector| vector.len() != dimensions) {
		return Err(invalid(format!(
			"Embedding has {} dimensions, expected {dimensions}.",
			vector.len()
		)));
	}

	Ok(())
}

fn parse_vector(item: &Value) -> Result<Vec<f32>> {
	let Some(values) = item.get("embedding").and_then(Value::as_array) else {
		return Err(invalid("Embedding item is missing embedding array."));
	};

	values
		.iter()
		.map(|value| {
			value.as_f64().map(|number| number as f32).ok_or_else(|| {
				invalid("Embedding value must be numeric.")
			})
		})
		.collect()
}

fn invalid(message: impl Into<String>) -> Error {
	Error::InvalidResponse { message: message.into() }
}
