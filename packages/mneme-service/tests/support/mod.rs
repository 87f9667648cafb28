#![allow(dead_code)]

use std::{
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use serde_json::Map;
use tokio::sync::Notify;

use mneme_config::{Config, EmbeddingProviderConfig};
use mneme_domain::{
	chunk::{ArmHit, Chunk},
	lexical::MatchQuery,
	similarity::cosine_similarity,
};
use mneme_service::{
	BoxFuture, ChunkStore, EmbeddingProvider, Error, IndexSync, LexicalHit, LexicalIndex,
	NearestNeighbors, Neighbor, Result, SearchResult, SearchScope, SimilarityBackend,
};

pub const MODEL: &str = "test-embed";

pub fn chunk(chunk_id: &str, path: &str, text: &str, model: Option<&str>) -> Chunk {
	Chunk {
		chunk_id: chunk_id.to_string(),
		path: path.to_string(),
		source: "memory".to_string(),
		start_line: Some(1),
		end_line: Some(3),
		text: text.to_string(),
		model: model.map(str::to_string),
		updated_at: None,
	}
}

/// Unit vector in the plane whose cosine with `[1, 0]` is `cos`.
pub fn unit(cos: f64) -> Vec<f32> {
	vec![cos as f32, (1.0 - cos * cos).max(0.0).sqrt() as f32]
}

pub fn embedding_config(query_timeout_ms: u64) -> EmbeddingProviderConfig {
	EmbeddingProviderConfig {
		provider_id: "test".to_string(),
		api_base: "http://127.0.0.1:1".to_string(),
		api_key: String::new(),
		path: "/embeddings".to_string(),
		model: MODEL.to_string(),
		dimensions: 2,
		timeout_ms: 1_000,
		query_timeout_ms,
		default_headers: Map::new(),
	}
}

pub fn keyword_config() -> Config {
	Config::default()
}

pub fn hybrid_config() -> Config {
	let mut cfg = Config::default();

	cfg.providers.embedding = Some(embedding_config(1_000));

	cfg
}

pub fn result_ids(results: &[SearchResult]) -> Vec<&str> {
	results.iter().map(|result| result.chunk_id.as_str()).collect()
}

pub fn hit_ids(hits: &[ArmHit]) -> Vec<&str> {
	hits.iter().map(|hit| hit.chunk.chunk_id.as_str()).collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct LexicalCall {
	pub terms: Vec<String>,
	pub model: Option<String>,
	pub limit: u32,
}

/// Substring matcher that records every query it receives.
pub struct SpyLexical {
	docs: Vec<(Chunk, f64)>,
	fail: bool,
	calls: Mutex<Vec<LexicalCall>>,
}
impl SpyLexical {
	pub fn new(docs: Vec<(Chunk, f64)>) -> Self {
		Self { docs, fail: false, calls: Mutex::new(Vec::new()) }
	}

	pub fn failing() -> Self {
		Self { docs: Vec::new(), fail: true, calls: Mutex::new(Vec::new()) }
	}

	pub fn calls(&self) -> Vec<LexicalCall> {
		self.calls.lock().expect("Failed to lock lexical calls.").clone()
	}
}
impl LexicalIndex for SpyLexical {
	fn ranked_match<'a>(
		&'a self,
		query: &'a MatchQuery,
		scope: &'a SearchScope,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<LexicalHit>>> {
		self.calls.lock().expect("Failed to lock lexical calls.").push(LexicalCall {
			terms: query.terms().to_vec(),
			model: scope.model.clone(),
			limit,
		});

		if self.fail {
			return Box::pin(async move {
				Err(Error::Storage { message: "Lexical index is unreachable.".to_string() })
			});
		}

		let mut hits = self
			.docs
			.iter()
			.filter(|(chunk, _)| {
				let text = chunk.text.to_lowercase();

				query.terms().iter().all(|term| text.contains(&term.to_lowercase()))
			})
			.filter(|(chunk, _)| match scope.model.as_deref() {
				Some(model) => chunk.model.as_deref() == Some(model),
				None => true,
			})
			.filter(|(chunk, _)| scope.sources.is_empty() || scope.sources.contains(&chunk.source))
			.map(|(chunk, rank)| LexicalHit { chunk: chunk.clone(), rank: *rank })
			.collect::<Vec<_>>();

		hits.sort_by(|a, b| a.rank.total_cmp(&b.rank));
		hits.truncate(limit as usize);

		Box::pin(async move { Ok(hits) })
	}
}

pub struct MemoryStore {
	rows: Vec<(Chunk, Vec<f32>)>,
}
impl MemoryStore {
	pub fn new(rows: Vec<(Chunk, Vec<f32>)>) -> Self {
		Self { rows }
	}
}
impl ChunkStore for MemoryStore {
	fn get_chunks<'a>(&'a self, chunk_ids: &'a [String]) -> BoxFuture<'a, Result<Vec<Chunk>>> {
		let chunks = self
			.rows
			.iter()
			.filter(|(chunk, _)| chunk_ids.contains(&chunk.chunk_id))
			.map(|(chunk, _)| chunk.clone())
			.collect();

		Box::pin(async move { Ok(chunks) })
	}

	fn vectors_by_model<'a>(
		&'a self,
		model: &'a str,
		scope: &'a SearchScope,
	) -> BoxFuture<'a, Result<Vec<(Chunk, Vec<f32>)>>> {
		let rows = self
			.rows
			.iter()
			.filter(|(chunk, _)| chunk.model.as_deref() == Some(model))
			.filter(|(chunk, _)| scope.sources.is_empty() || scope.sources.contains(&chunk.source))
			.cloned()
			.collect();

		Box::pin(async move { Ok(rows) })
	}
}

#[derive(Clone, Copy, Debug)]
pub enum Probe {
	Ready,
	NotReady,
	Unreachable,
}

/// Nearest-neighbor index that answers by brute force over its own rows.
pub struct ScanNeighbors {
	rows: Vec<(Chunk, Vec<f32>)>,
	probe: Probe,
}
impl ScanNeighbors {
	pub fn new(rows: Vec<(Chunk, Vec<f32>)>, probe: Probe) -> Self {
		Self { rows, probe }
	}
}
impl NearestNeighbors for ScanNeighbors {
	fn probe<'a>(&'a self) -> BoxFuture<'a, Result<bool>> {
		let probe = self.probe;

		Box::pin(async move {
			match probe {
				Probe::Ready => Ok(true),
				Probe::NotReady => Ok(false),
				Probe::Unreachable =>
					Err(Error::Qdrant { message: "Connection refused.".to_string() }),
			}
		})
	}

	fn nearest<'a>(
		&'a self,
		vector: &'a [f32],
		scope: &'a SearchScope,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<Neighbor>>> {
		let mut neighbors = self
			.rows
			.iter()
			.filter(|(chunk, _)| chunk.model.as_deref() == scope.model.as_deref())
			.filter(|(_, stored)| stored.len() == vector.len())
			.map(|(chunk, stored)| Neighbor {
				chunk_id: chunk.chunk_id.clone(),
				distance: 1.0 - cosine_similarity(vector, stored),
			})
			.collect::<Vec<_>>();

		neighbors.sort_by(|a, b| {
			a.distance.total_cmp(&b.distance).then_with(|| a.chunk_id.cmp(&b.chunk_id))
		});
		neighbors.truncate(limit as usize);

		Box::pin(async move { Ok(neighbors) })
	}
}

pub struct FailingBackend;
impl SimilarityBackend for FailingBackend {
	fn name(&self) -> &'static str {
		"failing"
	}

	fn search<'a>(
		&'a self,
		_vector: &'a [f32],
		_scope: &'a SearchScope,
		_limit: u32,
	) -> BoxFuture<'a, Result<Vec<ArmHit>>> {
		Box::pin(async move {
			Err(Error::Storage { message: "Vector store is unreachable.".to_string() })
		})
	}
}

pub struct FixedEmbedding {
	vector: Vec<f32>,
}
impl FixedEmbedding {
	pub fn new(vector: Vec<f32>) -> Self {
		Self { vector }
	}
}
impl EmbeddingProvider for FixedEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		let vectors = vec![self.vector.clone(); texts.len()];

		Box::pin(async move { Ok(vectors) })
	}
}

pub struct SlowEmbedding;
impl EmbeddingProvider for SlowEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			tokio::time::sleep(Duration::from_secs(10)).await;

			Ok(vec![vec![1.0, 0.0]; texts.len()])
		})
	}
}

pub struct FailingEmbedding;
impl EmbeddingProvider for FailingEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			Err(Error::Provider { message: "Embedding service returned 503.".to_string() })
		})
	}
}

/// Counts checks and syncs. Each sync signals `started` and then waits for `release`.
pub struct GatedSync {
	dirty: bool,
	checks: AtomicUsize,
	syncs: AtomicUsize,
	pub started: Notify,
	pub release: Notify,
}
impl GatedSync {
	pub fn new(dirty: bool) -> Arc<Self> {
		Arc::new(Self {
			dirty,
			checks: AtomicUsize::new(0),
			syncs: AtomicUsize::new(0),
			started: Notify::new(),
			release: Notify::new(),
		})
	}

	pub fn checks(&self) -> usize {
		self.checks.load(Ordering::SeqCst)
	}

	pub fn syncs(&self) -> usize {
		self.syncs.load(Ordering::SeqCst)
	}
}
impl IndexSync for GatedSync {
	fn is_dirty(&self) -> bool {
		self.checks.fetch_add(1, Ordering::SeqCst);

		self.dirty
	}

	fn sync<'a>(&'a self, _reason: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			self.syncs.fetch_add(1, Ordering::SeqCst);
			self.started.notify_one();
			self.release.notified().await;

			Err(Error::Storage { message: "Sync failures never reach the caller.".to_string() })
		})
	}
}
