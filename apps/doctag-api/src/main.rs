use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = doctag_api::Args::parse();

	doctag_api::run(args).await
}
