use std::{fs, io, path::PathBuf};

use clap::Parser;
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

use doctag_service::{TaggingRequest, TaggingService};

/// Tags one UTF-8 text file and prints the tagging response as JSON.
#[derive(Debug, Parser)]
#[command(
	version = doctag_cli::VERSION,
	rename_all = "kebab",
	styles = doctag_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[arg(long, short = 'i', value_name = "FILE")]
	pub input: PathBuf,
	#[arg(long, value_name = "ID")]
	pub document_id: Option<String>,
	/// Overrides `tagging.chunk_size`.
	#[arg(long, value_name = "N")]
	pub chunk_size: Option<u32>,
	/// Overrides `tagging.min_extractive_threshold`.
	#[arg(long, value_name = "PERCENT")]
	pub threshold: Option<f64>,
}
impl Args {
	pub fn request(&self, text: String) -> TaggingRequest {
		TaggingRequest {
			document_id: self.document_id.clone(),
			text,
			chunk_size: self.chunk_size,
			min_extractive_threshold: self.threshold,
		}
	}
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = doctag_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	// Stdout carries the JSON result.
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

	let text = fs::read_to_string(&args.input)
		.map_err(|err| eyre::eyre!("Failed to read input file at {:?}: {err}.", args.input))?;

	tracing::info!(input = ?args.input, chars = text.chars().count(), "Read input document.");

	let service = TaggingService::new(config)?;
	let response = service.tag_document(args.request(text)).await?;
	let json = serde_json::to_string_pretty(&response)?;

	println!("{json}");

	Ok(())
}
