use clap::Parser;

use doctag_tag::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	doctag_tag::run(args).await
}
