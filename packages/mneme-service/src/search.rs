pub mod policy;
pub mod vector;

use std::{sync::Arc, time::Duration};

use time::OffsetDateTime;
use tokio::task::JoinSet;
use unicode_segmentation::UnicodeSegmentation;

use mneme_config::{Config, EmbeddingProviderConfig, SearchOverrides};
use mneme_domain::{
	chunk::{ArmHit, FusedHit},
	decay::{self, EvergreenPolicy, PathEvergreenPolicy},
	hybrid,
	keywords::extract_keywords,
	lexical::{MatchQuery, bm25_rank_to_score},
	mmr, ranking,
	similarity::is_zero_vector,
};

use crate::{
	EmbeddingProvider, Error, LexicalHit, LexicalIndex, Result, SearchScope, SyncHandle,
	search::{policy::ResolvedSearchPolicy, vector::SimilarityBackend},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchMode {
	/// No embedding provider. Each expanded keyword is searched on its own.
	KeywordOnly,
	Hybrid,
}
impl SearchMode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::KeywordOnly => "keyword_only",
			Self::Hybrid => "hybrid",
		}
	}
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SearchResult {
	pub chunk_id: String,
	pub path: String,
	pub source: String,
	pub start_line: Option<i32>,
	pub end_line: Option<i32>,
	pub score: f64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub vector_score: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub text_score: Option<f64>,
	pub snippet: String,
}

enum ArmOutcome {
	Skipped,
	Hits(Vec<ArmHit>),
	Failed(Error),
}

pub struct MemorySearch {
	cfg: Config,
	lexical: Arc<dyn LexicalIndex>,
	similarity: Arc<dyn SimilarityBackend>,
	embedding: Option<Arc<dyn EmbeddingProvider>>,
	evergreen: Arc<dyn EvergreenPolicy>,
	sync: Option<SyncHandle>,
}
impl MemorySearch {
	pub fn new(
		cfg: Config,
		lexical: Arc<dyn LexicalIndex>,
		similarity: Arc<dyn SimilarityBackend>,
	) -> Self {
		let evergreen = Arc::new(PathEvergreenPolicy::from_config(&cfg.search.temporal_decay));

		Self { cfg, lexical, similarity, embedding: None, evergreen, sync: None }
	}

	pub fn with_embedding(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
		self.embedding = Some(provider);

		self
	}

	pub fn with_evergreen_policy(mut self, policy: Arc<dyn EvergreenPolicy>) -> Self {
		self.evergreen = policy;

		self
	}

	pub fn with_sync(mut self, handle: SyncHandle) -> Self {
		self.sync = Some(handle);

		self
	}

	pub fn config(&self) -> &Config {
		&self.cfg
	}

	pub fn mode(&self) -> SearchMode {
		match self.embedding_setup() {
			Some(_) => SearchMode::Hybrid,
			None => SearchMode::KeywordOnly,
		}
	}

	pub async fn search(
		&self,
		query: &str,
		overrides: &SearchOverrides,
	) -> Result<Vec<SearchResult>> {
		self.search_at(query, overrides, OffsetDateTime::now_utc()).await
	}

	/// Same as [`MemorySearch::search`] with an explicit clock for temporal decay.
	pub async fn search_at(
		&self,
		query: &str,
		overrides: &SearchOverrides,
		now: OffsetDateTime,
	) -> Result<Vec<SearchResult>> {
		let policy = ResolvedSearchPolicy::resolve(&self.cfg.search, overrides)?;
		let query = query.trim();

		if query.is_empty() {
			return Ok(Vec::new());
		}
		if self.cfg.sync.on_search
			&& let Some(sync) = self.sync.as_ref()
		{
			sync.request("search");
		}

		let mode = self.mode();
		let hits = match self.embedding_setup() {
			Some((provider, embed_cfg)) =>
				self.hybrid_search(query, &policy, provider, embed_cfg, now).await?,
			None => self.keyword_only_search(query, &policy).await?,
		};
		let results = hits
			.into_iter()
			.map(|hit| to_result(hit, policy.snippet_max_chars))
			.collect::<Vec<_>>();

		tracing::debug!(
			mode = mode.as_str(),
			candidates = policy.candidates,
			results = results.len(),
			"Search finished."
		);

		Ok(results)
	}

	fn embedding_setup(&self) -> Option<(&Arc<dyn EmbeddingProvider>, &EmbeddingProviderConfig)> {
		Some((self.embedding.as_ref()?, self.cfg.providers.embedding.as_ref()?))
	}

	async fn keyword_only_search(
		&self,
		query: &str,
		policy: &ResolvedSearchPolicy,
	) -> Result<Vec<FusedHit>> {
		let terms = extract_keywords(query);

		if terms.is_empty() {
			tracing::debug!("Query expansion produced no keywords.");

			return Ok(Vec::new());
		}

		let scope = SearchScope { model: None, sources: policy.sources.clone() };
		let mut tasks = JoinSet::new();

		for term in terms {
			let Some(match_query) = MatchQuery::parse(&term) else {
				continue;
			};
			let lexical = self.lexical.clone();
			let scope = scope.clone();
			let limit = policy.candidates;

			tasks.spawn(async move {
				let result = lexical.ranked_match(&match_query, &scope, limit).await;

				(term, result)
			});
		}

		let mut attempted = 0_usize;
		let mut failures = Vec::new();
		let mut arm_hits = Vec::new();

		while let Some(joined) = tasks.join_next().await {
			attempted += 1;

			match joined {
				Ok((_, Ok(hits))) => arm_hits.extend(hits.into_iter().map(keyword_hit)),
				Ok((term, Err(err))) => {
					tracing::warn!(error = %err, term = %term, "Keyword search failed for term.");

					failures.push(err.to_string());
				},
				Err(err) => {
					tracing::warn!(error = %err, "Keyword search task failed.");

					failures.push(err.to_string());
				},
			}
		}

		if attempted > 0 && failures.len() == attempted {
			return Err(Error::SearchUnavailable { message: failures.join("; ") });
		}

		let merged = hybrid::merge_max(arm_hits);

		Ok(ranking::select_top(merged, policy.min_score, policy.max_results, |hit| hit.score))
	}

	async fn hybrid_search(
		&self,
		query: &str,
		policy: &ResolvedSearchPolicy,
		provider: &Arc<dyn EmbeddingProvider>,
		embed_cfg: &EmbeddingProviderConfig,
		now: OffsetDateTime,
	) -> Result<Vec<FusedHit>> {
		let scope =
			SearchScope { model: Some(embed_cfg.model.clone()), sources: policy.sources.clone() };
		let keyword_arm = async {
			if !policy.hybrid_enabled {
				return ArmOutcome::Skipped;
			}

			self.keyword_arm(query, &scope, policy.candidates).await
		};
		let vector_arm = self.vector_arm(query, provider, embed_cfg, &scope, policy.candidates);
		let (vector, keyword) = tokio::join!(vector_arm, keyword_arm);
		let mut failures = Vec::new();
		let mut any_hits = false;
		let mut vector_hits = Vec::new();
		let mut keyword_hits = Vec::new();

		for (arm, outcome, slot) in
			[("vector", vector, &mut vector_hits), ("keyword", keyword, &mut keyword_hits)]
		{
			match outcome {
				ArmOutcome::Skipped => {},
				ArmOutcome::Hits(hits) => {
					any_hits = true;
					*slot = hits;
				},
				ArmOutcome::Failed(err) => {
					tracing::warn!(error = %err, arm, "Retrieval arm failed.");

					failures.push(format!("{arm}: {err}"));
				},
			}
		}

		if !any_hits {
			if !failures.is_empty() {
				return Err(Error::SearchUnavailable { message: failures.join("; ") });
			}

			tracing::warn!("No retrieval arm was usable for this query.");

			return Ok(Vec::new());
		}

		tracing::debug!(
			vector = vector_hits.len(),
			keyword = keyword_hits.len(),
			"Retrieval arms finished."
		);

		if !policy.hybrid_enabled {
			let mut hits = vector_hits.into_iter().map(FusedHit::from_vector).collect::<Vec<_>>();

			hits.sort_by(|a, b| ranking::cmp_score_desc(a.score, b.score));

			return Ok(ranking::select_top(hits, policy.min_score, policy.max_results, |hit| {
				hit.score
			}));
		}

		let mut fused = hybrid::merge_hybrid(vector_hits, keyword_hits, policy.weights);

		if let Some(settings) = policy.decay {
			decay::apply_temporal_decay(&mut fused, settings, self.evergreen.as_ref(), now);
		}
		if let Some(lambda) = policy.mmr_lambda {
			fused = mmr::mmr_rerank(fused, lambda);
		}

		Ok(ranking::select_top(fused, policy.min_score, policy.max_results, |hit| hit.score))
	}

	async fn keyword_arm(&self, query: &str, scope: &SearchScope, limit: u32) -> ArmOutcome {
		let Some(match_query) = MatchQuery::parse(query) else {
			return ArmOutcome::Hits(Vec::new());
		};

		match self.lexical.ranked_match(&match_query, scope, limit).await {
			Ok(hits) => ArmOutcome::Hits(hits.into_iter().map(keyword_hit).collect()),
			Err(err) => ArmOutcome::Failed(err),
		}
	}

	async fn vector_arm(
		&self,
		query: &str,
		provider: &Arc<dyn EmbeddingProvider>,
		embed_cfg: &EmbeddingProviderConfig,
		scope: &SearchScope,
		limit: u32,
	) -> ArmOutcome {
		let texts = vec![query.to_string()];
		let embedded = tokio::time::timeout(
			Duration::from_millis(embed_cfg.query_timeout_ms),
			provider.embed(embed_cfg, &texts),
		)
		.await;
		let vector = match embedded {
			Ok(Ok(vectors)) => vectors.into_iter().next(),
			Ok(Err(err)) => {
				tracing::warn!(
					error = %err,
					"Query embedding failed. Continuing without vector search."
				);

				return ArmOutcome::Skipped;
			},
			Err(_) => {
				tracing::warn!(
					timeout_ms = embed_cfg.query_timeout_ms,
					"Query embedding timed out. Continuing without vector search."
				);

				return ArmOutcome::Skipped;
			},
		};
		let Some(vector) = vector.filter(|vector| !is_zero_vector(vector)) else {
			tracing::warn!("Query embedding is empty. Continuing without vector search.");

			return ArmOutcome::Skipped;
		};

		match self.similarity.search(&vector, scope, limit).await {
			Ok(hits) => ArmOutcome::Hits(hits),
			Err(err) => ArmOutcome::Failed(err),
		}
	}
}

fn keyword_hit(hit: LexicalHit) -> ArmHit {
	ArmHit { raw_score: hit.rank, score: bm25_rank_to_score(hit.rank), chunk: hit.chunk }
}

fn to_result(hit: FusedHit, snippet_max_chars: usize) -> SearchResult {
	let snippet = truncate_graphemes(&hit.chunk.text, snippet_max_chars);

	SearchResult {
		chunk_id: hit.chunk.chunk_id,
		path: hit.chunk.path,
		source: hit.chunk.source,
		start_line: hit.chunk.start_line,
		end_line: hit.chunk.end_line,
		score: hit.score,
		vector_score: hit.vector_score,
		text_score: hit.text_score,
		snippet,
	}
}

fn truncate_graphemes(text: &str, max: usize) -> String {
	text.graphemes(true).take(max).collect()
}
