//! Word-boundary chunking of document text into bounded-size segments.

#[derive(Clone, Debug)]
pub struct ChunkingConfig {
	/// Upper bound on a chunk's length in characters, counting one separator per word.
	pub max_chars: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
	pub chunk_index: usize,
	pub text: String,
}

/// Greedily packs whitespace-delimited words into chunks.
///
/// A chunk is closed only when the next word would push its running length past
/// `max_chars`. A word longer than the bound still opens a chunk of its own, so no
/// chunk is ever empty and words are never split.
pub fn split_text(text: &str, cfg: &ChunkingConfig) -> Vec<Chunk> {
	let mut chunks = Vec::new();
	let mut current: Vec<&str> = Vec::new();
	let mut current_len = 0_usize;

	for word in text.split_whitespace() {
		let word_len = word.chars().count();

		if current_len + word_len > cfg.max_chars && !current.is_empty() {
			chunks.push(Chunk { chunk_index: chunks.len(), text: current.join(" ") });

			current.clear();

			current_len = 0;
		}

		current.push(word);

		current_len += word_len + 1;
	}

	if !current.is_empty() {
		chunks.push(Chunk { chunk_index: chunks.len(), text: current.join(" ") });
	}

	tracing::debug!(chunks = chunks.len(), max_chars = cfg.max_chars, "Split text into chunks.");

	chunks
}
