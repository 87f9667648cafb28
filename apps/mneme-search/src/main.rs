use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = mneme_search::Args::parse();

	mneme_search::run(args).await
}
