//! Similarity backends for the vector arm.
//!
//! [`LinearScanBackend`] is the reference: it loads every same-model vector and computes cosine
//! similarity directly. [`NativeBackend`] asks a nearest-neighbor index instead and must agree
//! with the scan within floating-point tolerance.

use std::{collections::HashMap, sync::Arc};

use mneme_config::VectorBackend;
use mneme_domain::{
	chunk::{ArmHit, Chunk},
	ranking,
	similarity::{cosine_similarity, distance_to_similarity, normalize_similarity},
};

use crate::{BoxFuture, ChunkStore, Error, NearestNeighbors, Result, SearchScope};

pub trait SimilarityBackend
where
	Self: Send + Sync,
{
	fn name(&self) -> &'static str;

	/// Top `limit` chunks by cosine similarity to `vector`, best first.
	fn search<'a>(
		&'a self,
		vector: &'a [f32],
		scope: &'a SearchScope,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<ArmHit>>>;
}

pub struct LinearScanBackend {
	store: Arc<dyn ChunkStore>,
}
impl LinearScanBackend {
	pub fn new(store: Arc<dyn ChunkStore>) -> Self {
		Self { store }
	}
}
impl SimilarityBackend for LinearScanBackend {
	fn name(&self) -> &'static str {
		"linear"
	}

	fn search<'a>(
		&'a self,
		vector: &'a [f32],
		scope: &'a SearchScope,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<ArmHit>>> {
		Box::pin(async move {
			let model = scope_model(scope)?;
			let rows = self.store.vectors_by_model(model, scope).await?;
			let total = rows.len();
			let mut hits = rows
				.into_iter()
				.filter(|(_, stored)| stored.len() == vector.len())
				.map(|(chunk, stored)| arm_hit(chunk, cosine_similarity(vector, &stored)))
				.collect::<Vec<_>>();

			if hits.len() < total {
				tracing::debug!(
					skipped = total - hits.len(),
					dim = vector.len(),
					"Skipped stored vectors with a different dimension."
				);
			}

			hits.sort_by(|a, b| {
				ranking::cmp_score_desc(a.raw_score, b.raw_score)
					.then_with(|| a.chunk.chunk_id.cmp(&b.chunk.chunk_id))
			});
			hits.truncate(limit as usize);

			Ok(hits)
		})
	}
}

pub struct NativeBackend {
	index: Arc<dyn NearestNeighbors>,
	store: Arc<dyn ChunkStore>,
}
impl NativeBackend {
	pub fn new(index: Arc<dyn NearestNeighbors>, store: Arc<dyn ChunkStore>) -> Self {
		Self { index, store }
	}
}
impl SimilarityBackend for NativeBackend {
	fn name(&self) -> &'static str {
		"native"
	}

	fn search<'a>(
		&'a self,
		vector: &'a [f32],
		scope: &'a SearchScope,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<ArmHit>>> {
		Box::pin(async move {
			scope_model(scope)?;

			let neighbors = self.index.nearest(vector, scope, limit).await?;
			let ids = neighbors.iter().map(|neighbor| neighbor.chunk_id.clone()).collect::<Vec<_>>();
			let mut chunks = self
				.store
				.get_chunks(&ids)
				.await?
				.into_iter()
				.map(|chunk| (chunk.chunk_id.clone(), chunk))
				.collect::<HashMap<_, _>>();
			let mut hits = Vec::with_capacity(neighbors.len());

			for neighbor in neighbors {
				let Some(chunk) = chunks.remove(&neighbor.chunk_id) else {
					tracing::warn!(
						chunk_id = %neighbor.chunk_id,
						"Nearest neighbor is missing from the chunk store."
					);

					continue;
				};

				hits.push(arm_hit(chunk, distance_to_similarity(neighbor.distance)));
			}

			Ok(hits)
		})
	}
}

/// Picks the similarity backend at startup. The native path is used only after a successful
/// probe; `auto` falls back to the linear scan otherwise.
pub async fn select_backend(
	setting: VectorBackend,
	store: Arc<dyn ChunkStore>,
	native: Option<Arc<dyn NearestNeighbors>>,
) -> Result<Arc<dyn SimilarityBackend>> {
	if setting == VectorBackend::Linear {
		return Ok(Arc::new(LinearScanBackend::new(store)));
	}

	let Some(index) = native else {
		if setting == VectorBackend::Native {
			return Err(Error::Config {
				message: "search.vector.backend = native requires a nearest-neighbor index."
					.to_string(),
			});
		}

		tracing::info!("No nearest-neighbor index configured. Using linear scan.");

		return Ok(Arc::new(LinearScanBackend::new(store)));
	};

	match index.probe().await {
		Ok(true) => Ok(Arc::new(NativeBackend::new(index, store))),
		Ok(false) if setting == VectorBackend::Native => Err(Error::Config {
			message: "Nearest-neighbor index is not ready.".to_string(),
		}),
		Err(err) if setting == VectorBackend::Native => Err(err),
		Ok(false) => {
			tracing::warn!("Nearest-neighbor index is not ready. Falling back to linear scan.");

			Ok(Arc::new(LinearScanBackend::new(store)))
		},
		Err(err) => {
			tracing::warn!(
				error = %err,
				"Nearest-neighbor probe failed. Falling back to linear scan."
			);

			Ok(Arc::new(LinearScanBackend::new(store)))
		},
	}
}

fn scope_model(scope: &SearchScope) -> Result<&str> {
	scope.model.as_deref().ok_or_else(|| Error::InvalidRequest {
		message: "Vector search requires an embedding model.".to_string(),
	})
}

fn arm_hit(chunk: Chunk, similarity: f64) -> ArmHit {
	ArmHit { chunk, raw_score: similarity, score: normalize_similarity(similarity) }
}
