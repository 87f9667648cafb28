use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub chunking: Chunking,
	pub search: Search,
	pub sync: SyncConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Service {
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { log_level: "info".to_string() }
	}
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Storage {
	pub postgres: Option<Postgres>,
	/// Optional. Enables the native nearest-neighbor similarity backend.
	pub qdrant: Option<Qdrant>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	#[serde(default = "default_pool_max_conns")]
	pub pool_max_conns: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	#[serde(default = "default_qdrant_collection")]
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Providers {
	/// Optional. Without an embedding provider every search runs in keyword-only mode.
	pub embedding: Option<EmbeddingProviderConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	#[serde(default)]
	pub api_key: String,
	#[serde(default = "default_embedding_path")]
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	/// Upper bound on embedding a single search query before the vector arm is dropped.
	#[serde(default = "default_query_timeout_ms")]
	pub query_timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// Ingestion-time chunking parameters. Recognized and validated here, consumed by the indexer.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Chunking {
	pub tokens: u32,
	pub overlap: u32,
}
impl Default for Chunking {
	fn default() -> Self {
		Self { tokens: 400, overlap: 80 }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	pub max_results: u32,
	pub min_score: f64,
	pub snippet_max_chars: u32,
	/// Source tags to search. Empty means every source.
	pub sources: Vec<String>,
	pub hybrid: SearchHybrid,
	pub vector: SearchVector,
	pub mmr: SearchMmr,
	pub temporal_decay: SearchTemporalDecay,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			max_results: 6,
			min_score: 0.35,
			snippet_max_chars: 700,
			sources: Vec::new(),
			hybrid: SearchHybrid::default(),
			vector: SearchVector::default(),
			mmr: SearchMmr::default(),
			temporal_decay: SearchTemporalDecay::default(),
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SearchHybrid {
	pub enabled: bool,
	pub vector_weight: f64,
	pub text_weight: f64,
	pub candidate_multiplier: u32,
}
impl Default for SearchHybrid {
	fn default() -> Self {
		Self { enabled: true, vector_weight: 0.7, text_weight: 0.3, candidate_multiplier: 4 }
	}
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchVector {
	pub backend: VectorBackend,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorBackend {
	/// Use the native index when the startup probe succeeds, otherwise scan.
	#[default]
	Auto,
	Native,
	Linear,
}
impl VectorBackend {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Auto => "auto",
			Self::Native => "native",
			Self::Linear => "linear",
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SearchMmr {
	pub enabled: bool,
	pub lambda: f64,
}
impl Default for SearchMmr {
	fn default() -> Self {
		Self { enabled: false, lambda: 0.7 }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SearchTemporalDecay {
	pub enabled: bool,
	pub half_life_days: f64,
	/// File names that are never decayed.
	pub evergreen_files: Vec<String>,
	/// Directories whose undated files are never decayed.
	pub evergreen_dirs: Vec<String>,
}
impl Default for SearchTemporalDecay {
	fn default() -> Self {
		Self {
			enabled: false,
			half_life_days: 30.0,
			evergreen_files: vec!["MEMORY.md".to_string(), "memory.md".to_string()],
			evergreen_dirs: vec!["memory".to_string()],
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
	pub on_search: bool,
}
impl Default for SyncConfig {
	fn default() -> Self {
		Self { on_search: true }
	}
}

/// Per-call overrides merged onto [`Search`] when a search is resolved.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchOverrides {
	pub min_score: Option<f64>,
	pub max_results: Option<u32>,
}

fn default_pool_max_conns() -> u32 {
	4
}

fn default_qdrant_collection() -> String {
	"mneme_chunks".to_string()
}

fn default_embedding_path() -> String {
	"/embeddings".to_string()
}

fn default_timeout_ms() -> u64 {
	30_000
}

fn default_query_timeout_ms() -> u64 {
	60_000
}
