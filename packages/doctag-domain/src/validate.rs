//! Maps untrusted classifier output onto canonical taxonomy names.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::{Category, ChunkTagResult, Taxonomy, taxonomy::TaxonomyCategory};

const ABSTRACTIVE_KEY: &str = "abstractive";

/// Classifier output that passed the structural check but whose labels are still unresolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawChunkTags {
	categories: BTreeMap<Category, Map<String, Value>>,
}
impl RawChunkTags {
	/// Accepts `{"abstractive": {<category>: {label: confidence}}}`.
	///
	/// Returns `None` when the top level or the `abstractive` member is not an object, or when a
	/// known category is present but is not an object. Missing categories read as empty and
	/// unknown category keys are ignored.
	pub fn from_value(value: &Value) -> Option<Self> {
		let abstractive = value.as_object()?.get(ABSTRACTIVE_KEY)?.as_object()?;
		let mut categories = BTreeMap::new();

		for (key, labels) in abstractive {
			let Some(category) = Category::from_key(key) else {
				continue;
			};

			categories.insert(category, labels.as_object()?.clone());
		}

		Some(Self { categories })
	}
}

/// Resolves every raw label to a canonical name, dropping unresolvable labels and
/// confidences outside [0, 1].
pub fn validate(raw: &RawChunkTags, taxonomy: &Taxonomy) -> ChunkTagResult {
	let mut cleaned = ChunkTagResult::empty();

	for (category, labels) in &raw.categories {
		let Some(scope) = taxonomy.category(*category) else {
			continue;
		};

		for (label, score) in labels {
			let Some(score) = score.as_f64().filter(|score| (0.0..=1.0).contains(score)) else {
				continue;
			};
			let Some(canonical) = resolve_label(scope, label) else {
				tracing::debug!(category = category.as_str(), label = %label, "Dropping unknown tag.");

				continue;
			};

			cleaned.insert(*category, canonical, score);
		}
	}

	cleaned
}

/// Subtag name, subtag synonym, nested name, nested synonym, then any canonical name ignoring case.
pub fn resolve_label<'a>(scope: &'a TaxonomyCategory, label: &str) -> Option<&'a str> {
	scope
		.subtag_named(label)
		.or_else(|| scope.subtag_for_synonym(label))
		.or_else(|| scope.nested_named(label))
		.or_else(|| scope.nested_for_synonym(label))
		.or_else(|| scope.canonical_ignore_case(label))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn taxonomy() -> Taxonomy {
		Taxonomy::from_value(&serde_json::json!({
			"Audience": {
				"definition": "Readers.",
				"HCP": { "definition": "Professionals.", "synonyms": ["Physician"] }
			},
			"Clinical Topic": {
				"definition": "Clinical matter.",
				"Treatment": {
					"definition": "Interventions.",
					"synonyms": ["Therapy"],
					"Dosing": { "definition": "Doses.", "synonyms": ["Posology"] }
				}
			}
		}))
		.expect("taxonomy")
	}

	fn scope(taxonomy: &Taxonomy, category: Category) -> &TaxonomyCategory {
		taxonomy.category(category).expect("missing category")
	}

	#[test]
	fn resolves_in_priority_order() {
		let taxonomy = taxonomy();
		let clinical = scope(&taxonomy, Category::ClinicalTopic);

		assert_eq!(resolve_label(clinical, "Treatment"), Some("Treatment"));
		assert_eq!(resolve_label(clinical, "THERAPY"), Some("Treatment"));
		assert_eq!(resolve_label(clinical, "Dosing"), Some("Dosing"));
		assert_eq!(resolve_label(clinical, "posology"), Some("Dosing"));
		assert_eq!(resolve_label(clinical, "dosing"), Some("Dosing"));
		assert_eq!(resolve_label(clinical, "Surgery"), None);
	}

	#[test]
	fn rejects_structurally_invalid_payloads() {
		assert!(RawChunkTags::from_value(&serde_json::json!([])).is_none());
		assert!(RawChunkTags::from_value(&serde_json::json!({ "tags": {} })).is_none());
		assert!(RawChunkTags::from_value(&serde_json::json!({ "abstractive": [] })).is_none());
		assert!(
			RawChunkTags::from_value(&serde_json::json!({ "abstractive": { "audience": 0.4 } }))
				.is_none()
		);
		assert!(RawChunkTags::from_value(&serde_json::json!({ "abstractive": {} })).is_some());
	}

	#[test]
	fn drops_unknown_labels_and_out_of_range_scores() {
		let taxonomy = taxonomy();
		let raw = RawChunkTags::from_value(&serde_json::json!({
			"abstractive": {
				"audience": { "physician": 0.9, "Caregiver": 0.8, "HCP": 1.5 },
				"clinical topic": { "therapy": 0.6, "Dosing": "high", "posology": -0.1 },
				"format": { "Slides": 0.9 }
			}
		}))
		.expect("valid shape");
		let cleaned = validate(&raw, &taxonomy);

		assert_eq!(cleaned.category(Category::Audience).collect::<Vec<_>>(), vec![("HCP", 0.9)]);
		assert_eq!(
			cleaned.category(Category::ClinicalTopic).collect::<Vec<_>>(),
			vec![("Treatment", 0.6)]
		);
	}
}
