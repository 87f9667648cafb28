//! Collaborator implementations backed by Postgres, Qdrant, and the HTTP embedding API.

use mneme_config::EmbeddingProviderConfig;
use mneme_domain::{chunk::Chunk, cjk, lexical::MatchQuery};
use mneme_providers::embedding;
use mneme_storage::{
	db::Db,
	models::{self, ChunkRecord},
	qdrant::QdrantStore,
	queries,
};

use crate::{
	BoxFuture, ChunkStore, EmbeddingProvider, LexicalHit, LexicalIndex, NearestNeighbors, Neighbor,
	Result, SearchScope,
};

/// OpenAI-compatible `/embeddings` endpoint.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpEmbedding;
impl EmbeddingProvider for HttpEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, texts).await?) })
	}
}

impl ChunkStore for Db {
	fn get_chunks<'a>(&'a self, chunk_ids: &'a [String]) -> BoxFuture<'a, Result<Vec<Chunk>>> {
		Box::pin(async move {
			let rows = queries::get_chunks(self, chunk_ids).await?;

			Ok(rows.into_iter().map(chunk_from_record).collect())
		})
	}

	fn vectors_by_model<'a>(
		&'a self,
		model: &'a str,
		scope: &'a SearchScope,
	) -> BoxFuture<'a, Result<Vec<(Chunk, Vec<f32>)>>> {
		Box::pin(async move {
			let rows = queries::vectors_by_model(self, model, &scope.sources).await?;

			Ok(rows.into_iter().map(|row| (chunk_from_record(row.chunk), row.vec)).collect())
		})
	}
}

impl LexicalIndex for Db {
	fn ranked_match<'a>(
		&'a self,
		query: &'a MatchQuery,
		scope: &'a SearchScope,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<LexicalHit>>> {
		Box::pin(async move {
			let (dense, plain): (Vec<&String>, Vec<&String>) =
				query.terms().iter().partition(|term| cjk::contains_cjk(term));
			let terms = plain.iter().map(|term| term.as_str()).collect::<Vec<_>>().join(" ");
			let dense = dense.into_iter().map(|term| term.to_lowercase()).collect::<Vec<_>>();
			let rows = queries::lexical_match(
				self,
				&terms,
				&dense,
				scope.model.as_deref(),
				&scope.sources,
				limit,
			)
			.await?;
			let best = models::best_rank_score(&rows);

			Ok(rows
				.into_iter()
				.map(|row| {
					let rank = row.rank(best);

					LexicalHit { chunk: chunk_from_record(row.chunk), rank }
				})
				.collect())
		})
	}
}

impl NearestNeighbors for QdrantStore {
	fn probe<'a>(&'a self) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move { Ok(self.collection_exists().await?) })
	}

	fn nearest<'a>(
		&'a self,
		vector: &'a [f32],
		scope: &'a SearchScope,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<Neighbor>>> {
		Box::pin(async move {
			let records = QdrantStore::nearest(
				self,
				vector.to_vec(),
				scope.model.as_deref(),
				&scope.sources,
				limit,
			)
			.await?;

			Ok(records
				.into_iter()
				.map(|record| Neighbor { chunk_id: record.chunk_id, distance: record.distance })
				.collect())
		})
	}
}

pub fn chunk_from_record(record: ChunkRecord) -> Chunk {
	Chunk {
		chunk_id: record.chunk_id,
		path: record.path,
		source: record.source,
		start_line: record.start_line,
		end_line: record.end_line,
		text: record.text,
		model: record.model,
		updated_at: record.updated_at,
	}
}
