//! Canonical tag vocabulary: abstractive categories and extractive dictionaries.
//!
//! Everything here is built once at startup and only read afterwards.

use std::{
	collections::{HashMap, HashSet},
	fs,
	path::Path,
};

use serde_json::{Map, Value};

use crate::{Category, Error, Result};

const CONTENT_TAXONOMY_KEY: &str = "Content Taxonomy";
const DEFINITION_KEY: &str = "definition";
const SYNONYMS_KEY: &str = "synonyms";
const INDICATION_SYNONYMS_KEY: &str = "Synonyms";

#[derive(Debug, Clone)]
pub struct NestedSubtag {
	pub name: String,
	pub definition: String,
	pub synonyms: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Subtag {
	pub name: String,
	pub definition: String,
	pub synonyms: Vec<String>,
	pub nested: Vec<NestedSubtag>,
}

/// One abstractive category with its subtags and the flat lookups derived from them.
#[derive(Debug, Clone)]
pub struct TaxonomyCategory {
	pub category: Category,
	pub definition: String,
	pub subtags: Vec<Subtag>,
	lookup: CategoryLookup,
}
impl TaxonomyCategory {
	pub fn new(category: Category, definition: String, subtags: Vec<Subtag>) -> Self {
		let lookup = CategoryLookup::build(&subtags);

		Self { category, definition, subtags, lookup }
	}

	/// Exact-name lookup of a subtag.
	pub fn subtag_named(&self, name: &str) -> Option<&str> {
		self.lookup.subtags.get(name).map(String::as_str)
	}

	/// Exact-name lookup of a nested subtag.
	pub fn nested_named(&self, name: &str) -> Option<&str> {
		self.lookup.nested.get(name).map(String::as_str)
	}

	pub fn subtag_for_synonym(&self, label: &str) -> Option<&str> {
		self.lookup.subtag_synonyms.get(&label.to_lowercase()).map(String::as_str)
	}

	pub fn nested_for_synonym(&self, label: &str) -> Option<&str> {
		self.lookup.nested_synonyms.get(&label.to_lowercase()).map(String::as_str)
	}

	/// Case-insensitive match against every canonical subtag and nested subtag name.
	pub fn canonical_ignore_case(&self, label: &str) -> Option<&str> {
		self.lookup.canonical_lower.get(&label.to_lowercase()).map(String::as_str)
	}

	/// Parent subtag of a nested subtag.
	pub fn parent_of(&self, nested: &str) -> Option<&str> {
		self.lookup.nested_parent.get(nested).map(String::as_str)
	}

	/// Whether the subtag has at least one nested child.
	pub fn has_children(&self, subtag: &str) -> bool {
		self.lookup.parents.contains(subtag)
	}
}

#[derive(Debug, Clone, Default)]
struct CategoryLookup {
	subtags: HashSet<String>,
	nested: HashSet<String>,
	subtag_synonyms: HashMap<String, String>,
	nested_synonyms: HashMap<String, String>,
	canonical_lower: HashMap<String, String>,
	nested_parent: HashMap<String, String>,
	parents: HashSet<String>,
}
impl CategoryLookup {
	// On key collisions the first writer wins.
	fn build(subtags: &[Subtag]) -> Self {
		let mut lookup = Self::default();

		for subtag in subtags {
			lookup.subtags.insert(subtag.name.clone());

			for synonym in &subtag.synonyms {
				lookup
					.subtag_synonyms
					.entry(synonym.to_lowercase())
					.or_insert_with(|| subtag.name.clone());
			}
		}
		for subtag in subtags {
			for nested in &subtag.nested {
				lookup.nested.insert(nested.name.clone());
				lookup.parents.insert(subtag.name.clone());
				lookup
					.nested_parent
					.entry(nested.name.clone())
					.or_insert_with(|| subtag.name.clone());

				for synonym in &nested.synonyms {
					lookup
						.nested_synonyms
						.entry(synonym.to_lowercase())
						.or_insert_with(|| nested.name.clone());
				}
			}
		}

		let canonical_names = subtags
			.iter()
			.map(|subtag| &subtag.name)
			.chain(subtags.iter().flat_map(|subtag| subtag.nested.iter().map(|n| &n.name)));

		for name in canonical_names {
			lookup.canonical_lower.entry(name.to_lowercase()).or_insert_with(|| name.clone());
		}

		lookup
	}
}

/// The abstractive taxonomy, in source order.
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
	categories: Vec<TaxonomyCategory>,
}
impl Taxonomy {
	pub fn load(path: &Path) -> Result<Self> {
		let value = read_json(path)?;

		Self::from_value(&value).map_err(|message| Error::InvalidTaxonomy {
			path: path.to_path_buf(),
			message,
		})
	}

	/// Parses `{category: {definition, <subtag>: {definition, synonyms, <nested>: {..}}}}`,
	/// optionally wrapped under a `"Content Taxonomy"` key.
	pub fn from_value(value: &Value) -> std::result::Result<Self, String> {
		let root = value.as_object().ok_or_else(|| "root must be a JSON object".to_string())?;
		let root = match root.get(CONTENT_TAXONOMY_KEY).and_then(Value::as_object) {
			Some(inner) => inner,
			None => root,
		};
		let mut categories: Vec<TaxonomyCategory> = Vec::new();

		for (heading, data) in root {
			let Some(data) = data.as_object() else {
				continue;
			};
			let Some(category) = Category::from_heading(heading) else {
				tracing::warn!(heading = %heading, "Ignoring unrecognized taxonomy category.");

				continue;
			};
			let parsed = TaxonomyCategory::new(category, definition_of(data), parse_subtags(data));

			// A later heading that maps to the same category replaces the earlier one.
			match categories.iter_mut().find(|existing| existing.category == category) {
				Some(existing) => *existing = parsed,
				None => categories.push(parsed),
			}
		}

		if categories.is_empty() {
			return Err("no recognized abstractive categories".to_string());
		}

		Ok(Self { categories })
	}

	pub fn categories(&self) -> &[TaxonomyCategory] {
		&self.categories
	}

	pub fn category(&self, category: Category) -> Option<&TaxonomyCategory> {
		self.categories.iter().find(|entry| entry.category == category)
	}
}

fn parse_subtags(data: &Map<String, Value>) -> Vec<Subtag> {
	tag_children(data)
		.map(|(name, node)| Subtag {
			name: name.clone(),
			definition: definition_of(node),
			synonyms: synonyms_of(node, SYNONYMS_KEY),
			nested: tag_children(node)
				.map(|(nested_name, nested)| NestedSubtag {
					name: nested_name.clone(),
					definition: definition_of(nested),
					synonyms: synonyms_of(nested, SYNONYMS_KEY),
				})
				.collect(),
		})
		.collect()
}

// A child is a tag only when it is an object carrying a definition.
fn tag_children(data: &Map<String, Value>) -> impl Iterator<Item = (&String, &Map<String, Value>)> {
	data.iter()
		.filter(|(key, _)| key.as_str() != DEFINITION_KEY && key.as_str() != SYNONYMS_KEY)
		.filter_map(|(key, value)| value.as_object().map(|node| (key, node)))
		.filter(|(_, node)| node.contains_key(DEFINITION_KEY))
}

fn definition_of(node: &Map<String, Value>) -> String {
	node.get(DEFINITION_KEY).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn synonyms_of(node: &Map<String, Value>, key: &str) -> Vec<String> {
	node.get(key).and_then(Value::as_array).map(|list| string_list(list)).unwrap_or_default()
}

// String members in order, first occurrence only; anything else is skipped.
fn string_list(values: &[Value]) -> Vec<String> {
	let mut synonyms: Vec<String> = Vec::new();

	for synonym in values {
		if let Some(raw) = synonym.as_str()
			&& !synonyms.iter().any(|existing| existing == raw)
		{
			synonyms.push(raw.to_string());
		}
	}

	synonyms
}

/// An extractive dictionary entry: a canonical entity and the free text that describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
	pub name: String,
	pub terms: Vec<String>,
}
impl DictionaryEntry {
	/// Canonical name followed by every term, space-separated.
	pub fn text(&self) -> String {
		std::iter::once(self.name.as_str())
			.chain(self.terms.iter().map(String::as_str))
			.collect::<Vec<_>>()
			.join(" ")
	}
}

/// Loads `{product: [synonym, ..]}`. Entries whose value is not a list are skipped.
pub fn load_products(path: &Path) -> Result<Vec<DictionaryEntry>> {
	let value = read_json(path)?;

	products_from_value(&value).map_err(|message| Error::InvalidTaxonomy {
		path: path.to_path_buf(),
		message,
	})
}

pub fn products_from_value(value: &Value) -> std::result::Result<Vec<DictionaryEntry>, String> {
	let root = value.as_object().ok_or_else(|| "root must be a JSON object".to_string())?;

	Ok(root
		.iter()
		.filter_map(|(name, synonyms)| {
			let synonyms = synonyms.as_array()?;

			Some(DictionaryEntry {
				name: name.clone(),
				terms: string_list(synonyms),
			})
		})
		.collect())
}

/// Loads `{category: {indication: {Synonyms: [..], <sub>: {Synonyms: [..]}}}}` and flattens each
/// top-level category into a single entry.
pub fn load_indications(path: &Path) -> Result<Vec<DictionaryEntry>> {
	let value = read_json(path)?;

	indications_from_value(&value).map_err(|message| Error::InvalidTaxonomy {
		path: path.to_path_buf(),
		message,
	})
}

pub fn indications_from_value(value: &Value) -> std::result::Result<Vec<DictionaryEntry>, String> {
	let root = value.as_object().ok_or_else(|| "root must be a JSON object".to_string())?;
	let mut entries = Vec::new();

	for (category, indications) in root {
		let Some(indications) = indications.as_object() else {
			continue;
		};
		let mut terms = Vec::new();

		for (indication, data) in indications {
			let Some(data) = data.as_object() else {
				continue;
			};

			terms.push(indication.clone());
			terms.extend(synonyms_of(data, INDICATION_SYNONYMS_KEY));

			for (sub_key, sub_value) in data {
				if sub_key == INDICATION_SYNONYMS_KEY {
					continue;
				}

				let Some(sub_value) = sub_value.as_object() else {
					continue;
				};

				terms.push(sub_key.clone());
				terms.extend(synonyms_of(sub_value, INDICATION_SYNONYMS_KEY));
			}
		}

		entries.push(DictionaryEntry { name: category.clone(), terms });
	}

	Ok(entries)
}

fn read_json(path: &Path) -> Result<Value> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadTaxonomy { path: path.to_path_buf(), source: err })?;

	serde_json::from_str(&raw)
		.map_err(|err| Error::ParseTaxonomy { path: path.to_path_buf(), source: err })
}
