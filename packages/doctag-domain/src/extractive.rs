//! Extractive tagging: BM25 relevance of document text against product and indication
//! dictionaries, reported as percentages.

use std::{collections::BTreeMap, path::Path};

use crate::{
	ExtractiveTags, Result,
	lexical::{LexicalIndex, Tokenizer},
	round1,
	taxonomy::{self, DictionaryEntry},
};

#[derive(Debug, Clone)]
pub struct ExtractiveTagger {
	products: LexicalIndex,
	indications: LexicalIndex,
}
impl ExtractiveTagger {
	pub fn new(products: &[DictionaryEntry], indications: &[DictionaryEntry]) -> Result<Self> {
		let tokenizer = Tokenizer::new()?;

		Ok(Self {
			products: LexicalIndex::build(tokenizer.clone(), products),
			indications: LexicalIndex::build(tokenizer, indications),
		})
	}

	pub fn load(products: &Path, indications: &Path) -> Result<Self> {
		let products = taxonomy::load_products(products)?;
		let indications = taxonomy::load_indications(indications)?;

		tracing::info!(
			products = products.len(),
			indication_categories = indications.len(),
			"Loaded extractive dictionaries."
		);

		Self::new(&products, &indications)
	}

	/// Scores both families independently. `min_percentage` drops weak entries before the
	/// survivors are renormalized to 100.
	pub fn tag(&self, text: &str, min_percentage: f64) -> ExtractiveTags {
		ExtractiveTags {
			indication: score_family(&self.indications, text, min_percentage),
			product: score_family(&self.products, text, min_percentage),
		}
	}
}

fn score_family(index: &LexicalIndex, text: &str, min_percentage: f64) -> BTreeMap<String, f64> {
	if index.is_empty() {
		return BTreeMap::new();
	}

	let query = index.tokenizer().tokenize(text);

	if query.is_empty() {
		return BTreeMap::new();
	}

	let positive: Vec<(&str, f64)> =
		index.score_all(&query).filter(|(_, score)| *score > 0.0).collect();
	let total: f64 = positive.iter().map(|(_, score)| score).sum();

	if positive.is_empty() || total <= 0.0 {
		return BTreeMap::new();
	}

	let survivors: Vec<(&str, f64)> = positive
		.into_iter()
		.map(|(name, score)| (name, score / total * 100.0))
		.filter(|(_, percentage)| *percentage >= min_percentage)
		.map(|(name, percentage)| (name, round1(percentage)))
		.collect();
	let remaining: f64 = survivors.iter().map(|(_, percentage)| percentage).sum();

	if remaining <= 0.0 {
		return BTreeMap::new();
	}

	survivors
		.into_iter()
		.map(|(name, percentage)| (name.to_string(), round1(percentage / remaining * 100.0)))
		.collect()
}
