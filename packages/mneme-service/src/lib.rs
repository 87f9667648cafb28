pub mod adapters;
pub mod search;
pub mod sync;

mod error;

pub use error::{Error, Result};
pub use search::{
	MemorySearch, SearchMode, SearchResult,
	policy::ResolvedSearchPolicy,
	vector::{LinearScanBackend, NativeBackend, SimilarityBackend, select_backend},
};
pub use sync::SyncHandle;

use std::{future::Future, pin::Pin};

use mneme_config::EmbeddingProviderConfig;
use mneme_domain::{chunk::Chunk, lexical::MatchQuery};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

/// Read access to indexed chunks and their stored vectors.
pub trait ChunkStore
where
	Self: Send + Sync,
{
	/// Unknown ids are skipped. Order is not guaranteed.
	fn get_chunks<'a>(&'a self, chunk_ids: &'a [String]) -> BoxFuture<'a, Result<Vec<Chunk>>>;

	fn vectors_by_model<'a>(
		&'a self,
		model: &'a str,
		scope: &'a SearchScope,
	) -> BoxFuture<'a, Result<Vec<(Chunk, Vec<f32>)>>>;
}

pub trait LexicalIndex
where
	Self: Send + Sync,
{
	/// Chunks matching every term of `query`, best rank first.
	fn ranked_match<'a>(
		&'a self,
		query: &'a MatchQuery,
		scope: &'a SearchScope,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<LexicalHit>>>;
}

/// A native nearest-neighbor index over chunk vectors.
pub trait NearestNeighbors
where
	Self: Send + Sync,
{
	/// Whether the index is reachable and ready to serve queries.
	fn probe<'a>(&'a self) -> BoxFuture<'a, Result<bool>>;

	fn nearest<'a>(
		&'a self,
		vector: &'a [f32],
		scope: &'a SearchScope,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<Neighbor>>>;
}

/// Freshness bookkeeping for the index, driven from a background worker.
pub trait IndexSync
where
	Self: Send + Sync,
{
	fn is_dirty(&self) -> bool;

	fn sync<'a>(&'a self, reason: &'a str) -> BoxFuture<'a, Result<()>>;
}

/// Filters shared by both retrieval arms of one search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchScope {
	/// Embedding model filter. `None` searches chunks embedded under any model, or none.
	pub model: Option<String>,
	/// Source allowlist. Empty means every source.
	pub sources: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LexicalHit {
	pub chunk: Chunk,
	/// Lower is better. May be non-finite.
	pub rank: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Neighbor {
	pub chunk_id: String,
	/// Cosine distance.
	pub distance: f64,
}
