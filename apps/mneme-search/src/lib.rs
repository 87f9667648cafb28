use std::{path::PathBuf, sync::Arc};

use clap::{
	Parser,
	builder::{
		Styles,
		styling::{AnsiColor, Effects},
	},
};
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

use mneme_config::{Config, SearchOverrides};
use mneme_service::{MemorySearch, NearestNeighbors, adapters::HttpEmbedding, select_backend};
use mneme_storage::{db::Db, qdrant::QdrantStore};

#[derive(Debug, Parser)]
#[command(version, rename_all = "kebab", styles = styles())]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Overrides `search.min_score` for this query.
	#[arg(long, value_name = "SCORE")]
	pub min_score: Option<f64>,
	/// Overrides `search.max_results` for this query.
	#[arg(long, value_name = "N")]
	pub max_results: Option<u32>,
	#[arg(required = true, num_args = 1.., value_name = "QUERY")]
	pub query: Vec<String>,
}
impl Args {
	pub fn overrides(&self) -> SearchOverrides {
		SearchOverrides { min_score: self.min_score, max_results: self.max_results }
	}

	pub fn query_text(&self) -> String {
		self.query.join(" ")
	}
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = mneme_config::load(&args.config)?;

	init_tracing(&config);

	let Some(postgres) = config.storage.postgres.as_ref() else {
		return Err(eyre::eyre!("[storage.postgres] is required to search."));
	};
	let db = Arc::new(Db::connect(postgres).await?);

	db.ensure_schema().await?;

	let native = match config.storage.qdrant.as_ref() {
		Some(qdrant) => Some(Arc::new(QdrantStore::new(qdrant)?) as Arc<dyn NearestNeighbors>),
		None => None,
	};
	let similarity = select_backend(config.search.vector.backend, db.clone(), native).await?;

	tracing::info!(
		backend = similarity.name(),
		requested = config.search.vector.backend.as_str(),
		"Similarity backend selected."
	);

	let mut search = MemorySearch::new(config.clone(), db, similarity);

	if config.providers.embedding.is_some() {
		search = search.with_embedding(Arc::new(HttpEmbedding));
	}

	let results = search.search(&args.query_text(), &args.overrides()).await?;

	println!("{}", serde_json::to_string_pretty(&results)?);

	Ok(())
}

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Red.on_default() | Effects::BOLD)
		.usage(AnsiColor::Red.on_default() | Effects::BOLD)
		.literal(AnsiColor::Blue.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}

fn init_tracing(config: &Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}
