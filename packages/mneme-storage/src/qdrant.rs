use std::collections::HashMap;

use qdrant_client::{
	Payload,
	qdrant::{
		Condition, CreateCollectionBuilder, Distance, Filter, PointStruct, Query,
		QueryPointsBuilder, UpsertPointsBuilder, Value, Vector, VectorParamsBuilder,
		VectorsConfigBuilder, value::Kind,
	},
};
use uuid::Uuid;

use crate::{Error, Result, models::NeighborRecord};

pub const DENSE_VECTOR_NAME: &str = "dense";

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &mneme_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	pub async fn collection_exists(&self) -> Result<bool> {
		Ok(self.client.collection_exists(self.collection.clone()).await?)
	}

	pub async fn ensure_collection(&self) -> Result<()> {
		if self.collection_exists().await? {
			return Ok(());
		}

		let mut vectors_config = VectorsConfigBuilder::default();

		vectors_config.add_named_vector_params(
			DENSE_VECTOR_NAME,
			VectorParamsBuilder::new(self.vector_dim.into(), Distance::Cosine),
		);

		let builder =
			CreateCollectionBuilder::new(self.collection.clone()).vectors_config(vectors_config);

		self.client.create_collection(builder).await?;

		Ok(())
	}

	pub async fn upsert_chunk_vector(
		&self,
		chunk_id: &str,
		model: &str,
		source: &str,
		vector: Vec<f32>,
	) -> Result<()> {
		if vector.len() != self.vector_dim as usize {
			return Err(Error::InvalidArgument(format!(
				"Vector for chunk {chunk_id:?} has {} dimensions, expected {}.",
				vector.len(),
				self.vector_dim
			)));
		}

		let mut payload = Payload::new();

		payload.insert("chunk_id", chunk_id.to_string());
		payload.insert("model", model.to_string());
		payload.insert("source", source.to_string());

		let mut vectors = HashMap::new();

		vectors.insert(DENSE_VECTOR_NAME.to_string(), Vector::from(vector));

		let point = PointStruct::new(point_id(chunk_id).to_string(), vectors, payload);

		self.client
			.upsert_points(UpsertPointsBuilder::new(self.collection.clone(), vec![point]).wait(true))
			.await?;

		Ok(())
	}

	/// Nearest chunks by cosine distance, closest first.
	pub async fn nearest(
		&self,
		vector: Vec<f32>,
		model: Option<&str>,
		sources: &[String],
		limit: u32,
	) -> Result<Vec<NeighborRecord>> {
		let mut must = Vec::new();

		if let Some(model) = model {
			must.push(Condition::matches("model", model.to_string()));
		}
		if !sources.is_empty() {
			must.push(Condition::matches("source", sources.to_vec()));
		}

		let mut search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector))
			.using(DENSE_VECTOR_NAME)
			.limit(u64::from(limit))
			.with_payload(true);

		if !must.is_empty() {
			search = search.filter(Filter::must(must));
		}

		let response = self.client.query(search).await?;
		let neighbors = response
			.result
			.into_iter()
			.filter_map(|point| {
				let chunk_id = payload_string(&point.payload, "chunk_id")?;

				Some(NeighborRecord { chunk_id, distance: 1.0 - f64::from(point.score) })
			})
			.collect();

		Ok(neighbors)
	}
}

/// Deterministic point id for a chunk id.
pub fn point_id(chunk_id: &str) -> Uuid {
	Uuid::new_v5(&Uuid::NAMESPACE_OID, chunk_id.as_bytes())
}

fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	match &payload.get(key)?.kind {
		Some(Kind::StringValue(text)) => Some(text.clone()),
		_ => None,
	}
}
