//! Token bags, inverse document frequencies and BM25 over dictionary entries.

use std::collections::HashMap;

use regex::Regex;

use crate::{Result, taxonomy::DictionaryEntry};

pub const K1: f64 = 1.5;
pub const B: f64 = 0.75;

const MIN_TOKEN_CHARS: usize = 3;

/// Shared by indexed entries and query text; both sides must tokenize identically.
#[derive(Debug, Clone)]
pub struct Tokenizer {
	word: Regex,
}
impl Tokenizer {
	pub fn new() -> Result<Self> {
		Ok(Self { word: Regex::new(r"\w+")? })
	}

	/// Lower-cased maximal word-character runs, dropping runs of two characters or fewer.
	pub fn tokenize(&self, text: &str) -> Vec<String> {
		self.word
			.find_iter(text)
			.map(|m| m.as_str())
			.filter(|word| word.chars().count() >= MIN_TOKEN_CHARS)
			.map(str::to_lowercase)
			.collect()
	}
}

#[derive(Debug, Clone)]
struct EntityDoc {
	name: String,
	len: usize,
	term_freq: HashMap<String, usize>,
}

/// BM25 statistics over one dictionary family (products or indications).
#[derive(Debug, Clone)]
pub struct LexicalIndex {
	tokenizer: Tokenizer,
	docs: Vec<EntityDoc>,
	idf: HashMap<String, f64>,
	avg_doc_len: f64,
}
impl LexicalIndex {
	pub fn build(tokenizer: Tokenizer, entries: &[DictionaryEntry]) -> Self {
		let docs: Vec<EntityDoc> = entries
			.iter()
			.map(|entry| {
				let tokens = tokenizer.tokenize(&entry.text());
				let mut term_freq = HashMap::new();

				for token in &tokens {
					*term_freq.entry(token.clone()).or_insert(0) += 1;
				}

				EntityDoc { name: entry.name.clone(), len: tokens.len(), term_freq }
			})
			.collect();
		let idf = compute_idf(&docs);
		let avg_doc_len = if docs.is_empty() {
			0.0
		} else {
			docs.iter().map(|doc| doc.len as f64).sum::<f64>() / docs.len() as f64
		};

		Self { tokenizer, docs, idf, avg_doc_len }
	}

	pub fn is_empty(&self) -> bool {
		self.docs.is_empty()
	}

	pub fn tokenizer(&self) -> &Tokenizer {
		&self.tokenizer
	}

	pub fn idf(&self, token: &str) -> Option<f64> {
		self.idf.get(token).copied()
	}

	pub fn avg_doc_len(&self) -> f64 {
		self.avg_doc_len
	}

	/// Raw BM25 score of the query tokens against every entry, in entry order.
	pub fn score_all<'a>(&'a self, query: &'a [String]) -> impl Iterator<Item = (&'a str, f64)> {
		self.docs.iter().map(move |doc| (doc.name.as_str(), self.score_doc(query, doc)))
	}

	pub fn score(&self, query: &[String], name: &str) -> Option<f64> {
		self.docs.iter().find(|doc| doc.name == name).map(|doc| self.score_doc(query, doc))
	}

	// Every query occurrence contributes, so repeated query tokens count repeatedly.
	fn score_doc(&self, query: &[String], doc: &EntityDoc) -> f64 {
		let mut score = 0.0;

		for term in query {
			let Some(&tf) = doc.term_freq.get(term) else {
				continue;
			};
			let tf = tf as f64;
			let idf = self.idf.get(term).copied().unwrap_or(0.0);
			let norm = 1.0 - B + B * (doc.len as f64 / self.avg_doc_len);

			score += idf * (tf * (K1 + 1.0)) / (tf + K1 * norm);
		}

		score
	}
}

// idf(t) = ln((N - df + 0.5) / (df + 0.5)); negative for tokens in most entries, never clamped.
fn compute_idf(docs: &[EntityDoc]) -> HashMap<String, f64> {
	let n = docs.len() as f64;
	let mut df: HashMap<&str, usize> = HashMap::new();

	for doc in docs {
		for term in doc.term_freq.keys() {
			*df.entry(term.as_str()).or_insert(0) += 1;
		}
	}

	df.into_iter()
		.map(|(term, count)| {
			let count = count as f64;

			(term.to_string(), ((n - count + 0.5) / (count + 0.5)).ln())
		})
		.collect()
}
