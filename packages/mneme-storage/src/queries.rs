use crate::{
	Result,
	db::Db,
	models::{ChunkRecord, ChunkVectorRow, LexicalMatchRow},
};

pub async fn upsert_chunk(db: &Db, chunk: &ChunkRecord) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO mneme_chunks (
	chunk_id,
	path,
	source,
	start_line,
	end_line,
	text,
	model,
	updated_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
ON CONFLICT (chunk_id) DO UPDATE
SET
	path = EXCLUDED.path,
	source = EXCLUDED.source,
	start_line = EXCLUDED.start_line,
	end_line = EXCLUDED.end_line,
	text = EXCLUDED.text,
	model = EXCLUDED.model,
	updated_at = EXCLUDED.updated_at",
	)
	.bind(chunk.chunk_id.as_str())
	.bind(chunk.path.as_str())
	.bind(chunk.source.as_str())
	.bind(chunk.start_line)
	.bind(chunk.end_line)
	.bind(chunk.text.as_str())
	.bind(chunk.model.as_deref())
	.bind(chunk.updated_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn upsert_embedding(db: &Db, chunk_id: &str, model: &str, vec: &[f32]) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO mneme_chunk_embeddings (chunk_id, model, dim, vec)
VALUES ($1, $2, $3, $4)
ON CONFLICT (chunk_id, model) DO UPDATE
SET
	dim = EXCLUDED.dim,
	vec = EXCLUDED.vec,
	created_at = now()",
	)
	.bind(chunk_id)
	.bind(model)
	.bind(vec.len() as i32)
	.bind(vec)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn get_chunks(db: &Db, chunk_ids: &[String]) -> Result<Vec<ChunkRecord>> {
	if chunk_ids.is_empty() {
		return Ok(Vec::new());
	}

	let rows = sqlx::query_as::<_, ChunkRecord>(
		"\
SELECT chunk_id, path, source, start_line, end_line, text, model, updated_at
FROM mneme_chunks
WHERE chunk_id = ANY($1)",
	)
	.bind(chunk_ids)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

/// Chunks matching every term, best first.
///
/// `terms` go through the `simple` text-search config. `dense_terms` (Han, kana, or Hangul) are
/// matched as case-insensitive substrings because the tokenizer keeps a whole dense-script run as
/// one lexeme. Each substring hit adds `hits / (hits + 1)` to the rank score.
///
/// `model` restricts matches to chunks embedded with that model; `None` searches every chunk.
/// An empty `sources` slice searches every source.
pub async fn lexical_match(
	db: &Db,
	terms: &str,
	dense_terms: &[String],
	model: Option<&str>,
	sources: &[String],
	limit: u32,
) -> Result<Vec<LexicalMatchRow>> {
	if terms.trim().is_empty() && dense_terms.is_empty() {
		return Ok(Vec::new());
	}

	let rows = sqlx::query_as::<_, LexicalMatchRow>(
		"\
SELECT
	c.chunk_id,
	c.path,
	c.source,
	c.start_line,
	c.end_line,
	c.text,
	c.model,
	c.updated_at,
	(
		CASE WHEN btrim($1::text) = '' THEN 0 ELSE ts_rank_cd(c.tsv, q.query, 32) END
		+ COALESCE(
			(
				SELECT sum(d.hits::real / (d.hits + 1)::real)
				FROM (
					SELECT
						(length(lower(c.text)) - length(replace(lower(c.text), t, '')))
							/ length(t) AS hits
					FROM unnest($2::text[]) AS t
				) AS d
			),
			0
		)
	)::real AS rank_score
FROM mneme_chunks c, plainto_tsquery('simple', $1::text) AS q(query)
WHERE (btrim($1::text) = '' OR c.tsv @@ q.query)
	AND (
		SELECT bool_and(strpos(lower(c.text), t) > 0)
		FROM unnest($2::text[]) AS t
	) IS NOT FALSE
	AND ($3::text IS NULL OR c.model = $3)
	AND (cardinality($4::text[]) = 0 OR c.source = ANY($4))
ORDER BY rank_score DESC, c.chunk_id ASC
LIMIT $5",
	)
	.bind(terms)
	.bind(dense_terms)
	.bind(model)
	.bind(sources)
	.bind(i64::from(limit))
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn vectors_by_model(
	db: &Db,
	model: &str,
	sources: &[String],
) -> Result<Vec<ChunkVectorRow>> {
	let rows = sqlx::query_as::<_, ChunkVectorRow>(
		"\
SELECT
	c.chunk_id,
	c.path,
	c.source,
	c.start_line,
	c.end_line,
	c.text,
	c.model,
	c.updated_at,
	e.vec
FROM mneme_chunk_embeddings e
JOIN mneme_chunks c ON c.chunk_id = e.chunk_id
WHERE e.model = $1
	AND (cardinality($2::text[]) = 0 OR c.source = ANY($2))",
	)
	.bind(model)
	.bind(sources)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}
