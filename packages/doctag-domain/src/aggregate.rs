//! Folds per-chunk results into document-level percentages.

use std::collections::BTreeMap;

use crate::{
	AbstractiveTags, Category, ChunkTagResult, ClinicalNode, ContentDistribution, Taxonomy,
	round1, taxonomy::TaxonomyCategory,
};

const ROUNDING_TOLERANCE: f64 = 0.1;

/// Per category: mean confidence where observed times the fraction of chunks observing it,
/// normalized to percentages. The clinical topic is then folded into parent/child nodes.
pub fn combine(
	chunks: &[ChunkTagResult],
	taxonomy: &Taxonomy,
	min_confidence: f64,
) -> AbstractiveTags {
	let mut combined = AbstractiveTags::default();

	if chunks.is_empty() {
		return combined;
	}

	for category in Category::ALL {
		let percentages = category_percentages(chunks, category, min_confidence);

		if percentages.is_empty() {
			continue;
		}

		if category == Category::ClinicalTopic {
			let nodes = match taxonomy.category(category) {
				Some(scope) => fold_clinical(&percentages, scope),
				None => standalone_nodes(&percentages),
			};

			combined.clinical_topic = renormalize(nodes);
		} else if let Some(slot) = combined.flat_mut(category) {
			*slot = percentages;
		}
	}

	combined
}

pub fn category_percentages(
	chunks: &[ChunkTagResult],
	category: Category,
	min_confidence: f64,
) -> BTreeMap<String, f64> {
	let mut occurrences: BTreeMap<&str, Vec<f64>> = BTreeMap::new();

	for chunk in chunks {
		for (tag, score) in chunk.category(category) {
			if score >= min_confidence {
				occurrences.entry(tag).or_default().push(score);
			}
		}
	}

	let total_chunks = chunks.len() as f64;
	let raw: Vec<(&str, f64)> = occurrences
		.into_iter()
		.map(|(tag, scores)| {
			let observed = scores.len() as f64;
			let avg_score = scores.iter().sum::<f64>() / observed;

			(tag, avg_score * (observed / total_chunks))
		})
		.collect();
	let total: f64 = raw.iter().map(|(_, score)| score).sum();

	// A floor of zero admits zero confidences; a category with no mass emits nothing.
	if total <= 0.0 {
		return BTreeMap::new();
	}

	raw.into_iter().map(|(tag, score)| (tag.to_string(), round1(score / total * 100.0))).collect()
}

#[derive(Default)]
struct ParentGroup {
	score: f64,
	observed: bool,
	subtags: BTreeMap<String, f64>,
}

/// Groups nested subtags under their parent. A parent seen only through its children scores 0;
/// a parent with neither a direct observation nor observed children is never emitted.
pub fn fold_clinical(
	percentages: &BTreeMap<String, f64>,
	scope: &TaxonomyCategory,
) -> BTreeMap<String, ClinicalNode> {
	let mut groups: BTreeMap<String, ParentGroup> = BTreeMap::new();
	let mut standalone: BTreeMap<String, f64> = BTreeMap::new();

	for (tag, score) in percentages {
		if let Some(parent) = scope.parent_of(tag) {
			groups.entry(parent.to_string()).or_default().subtags.insert(tag.clone(), *score);
		} else if scope.has_children(tag) {
			let group = groups.entry(tag.clone()).or_default();

			group.score = *score;
			group.observed = true;
		} else {
			standalone.insert(tag.clone(), *score);
		}
	}

	let mut nodes: BTreeMap<String, ClinicalNode> = groups
		.into_iter()
		.filter(|(_, group)| group.observed || !group.subtags.is_empty())
		.map(|(parent, group)| {
			let score = if group.observed { group.score } else { 0.0 };

			(parent, ClinicalNode { score, subtags: group.subtags })
		})
		.collect();

	nodes.extend(standalone_nodes(&standalone));

	nodes
}

fn standalone_nodes(percentages: &BTreeMap<String, f64>) -> BTreeMap<String, ClinicalNode> {
	percentages
		.iter()
		.map(|(tag, score)| (tag.clone(), ClinicalNode { score: *score, subtags: BTreeMap::new() }))
		.collect()
}

/// Rescales top-level node scores to sum to 100, leaving child scores untouched.
pub fn renormalize(nodes: BTreeMap<String, ClinicalNode>) -> BTreeMap<String, ClinicalNode> {
	let total: f64 = nodes.values().map(|node| node.score).sum();

	if total == 0.0 {
		return nodes;
	}

	nodes
		.into_iter()
		.map(|(tag, node)| {
			(tag, ClinicalNode { score: round1(node.score / total * 100.0), subtags: node.subtags })
		})
		.collect()
}

/// Share of clinical versus non-clinical content across chunks.
pub fn content_distribution(
	chunks: &[ChunkTagResult],
	min_confidence: f64,
) -> ContentDistribution {
	let clinical = weighted_mass(chunks, Category::ClinicalTopic, min_confidence);
	let non_clinical = weighted_mass(chunks, Category::NonClinicalTopics, min_confidence);
	let total = clinical + non_clinical;

	if total == 0.0 {
		return ContentDistribution::default();
	}

	let clinical_pct = round1(clinical / total * 100.0);
	let non_clinical_pct = round1(non_clinical / total * 100.0);
	let (clinical_pct, non_clinical_pct) = reconcile(clinical_pct, non_clinical_pct);

	ContentDistribution {
		clinical: round1(clinical_pct).max(0.0),
		non_clinical: round1(non_clinical_pct).max(0.0),
	}
}

// Folds a rounding discrepancy within tolerance into the larger share, clinical on a tie.
// Anything larger is left as is.
fn reconcile(clinical: f64, non_clinical: f64) -> (f64, f64) {
	let diff = 100.0 - (clinical + non_clinical);

	if diff == 0.0 {
		return (clinical, non_clinical);
	}
	if diff.abs() > ROUNDING_TOLERANCE + f64::EPSILON * 100.0 {
		tracing::warn!(
			clinical,
			non_clinical,
			diff,
			"Content distribution rounding discrepancy exceeds tolerance."
		);

		return (clinical, non_clinical);
	}

	if clinical >= non_clinical {
		(clinical + diff, non_clinical)
	} else {
		(clinical, non_clinical + diff)
	}
}

// Mean qualifying confidence times the fraction of chunks with at least one qualifying tag.
fn weighted_mass(chunks: &[ChunkTagResult], category: Category, min_confidence: f64) -> f64 {
	if chunks.is_empty() {
		return 0.0;
	}

	let mut scores = Vec::new();
	let mut chunks_hit = 0_usize;

	for chunk in chunks {
		let before = scores.len();

		scores.extend(
			chunk.category(category).map(|(_, score)| score).filter(|s| *s >= min_confidence),
		);

		if scores.len() > before {
			chunks_hit += 1;
		}
	}

	if scores.is_empty() {
		return 0.0;
	}

	let avg = scores.iter().sum::<f64>() / scores.len() as f64;

	avg * (chunks_hit as f64 / chunks.len() as f64)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn taxonomy() -> Taxonomy {
		Taxonomy::from_value(&serde_json::json!({
			"Clinical Topic": {
				"definition": "Clinical matter.",
				"Treatment": {
					"definition": "Interventions.",
					"Dosing": { "definition": "Doses." },
					"Adverse Events": { "definition": "Side effects." }
				},
				"Diagnosis": {
					"definition": "Finding disease.",
					"Imaging": { "definition": "Scans." }
				},
				"Oncology": { "definition": "Cancer care." }
			},
			"Non Clinical Topics": {
				"definition": "Everything else.",
				"Market Access": { "definition": "Pricing and reimbursement." }
			}
		}))
		.expect("taxonomy")
	}

	fn chunk(entries: &[(Category, &str, f64)]) -> ChunkTagResult {
		let mut result = ChunkTagResult::empty();

		for (category, tag, score) in entries {
			result.insert(*category, *tag, *score);
		}

		result
	}

	fn scope(taxonomy: &Taxonomy) -> &TaxonomyCategory {
		taxonomy.category(Category::ClinicalTopic).expect("clinical")
	}

	#[test]
	fn frequency_weights_average_confidence() {
		let chunks = vec![
			chunk(&[(Category::Audience, "HCP", 0.8), (Category::Audience, "Patient", 0.4)]),
			chunk(&[(Category::Audience, "HCP", 0.6), (Category::Audience, "Patient", 0.2)]),
		];
		let percentages = category_percentages(&chunks, Category::Audience, 0.3);

		// HCP: 0.7 * 1.0 = 0.7, Patient: 0.4 * 0.5 = 0.2.
		assert_eq!(percentages["HCP"], 77.8);
		assert_eq!(percentages["Patient"], 22.2);
	}

	#[test]
	fn zero_mass_category_is_empty() {
		let chunks = vec![chunk(&[(Category::Audience, "HCP", 0.0)])];

		assert!(category_percentages(&chunks, Category::Audience, 0.0).is_empty());
		assert!(combine(&chunks, &taxonomy(), 0.0).audience.is_empty());
	}

	#[test]
	fn sole_clinical_tag_takes_the_whole_share() {
		let taxonomy = taxonomy();
		let chunks =
			vec![chunk(&[(Category::ClinicalTopic, "Oncology", 0.9)]), ChunkTagResult::empty()];
		let combined = combine(&chunks, &taxonomy, 0.3);

		assert_eq!(
			combined.clinical_topic,
			BTreeMap::from([(
				"Oncology".to_string(),
				ClinicalNode { score: 100.0, subtags: BTreeMap::new() }
			)])
		);
		assert!(combined.audience.is_empty());
	}

	#[test]
	fn parent_seen_only_through_children_scores_zero() {
		let taxonomy = taxonomy();
		let percentages =
			BTreeMap::from([("Dosing".to_string(), 60.0), ("Oncology".to_string(), 40.0)]);
		let nodes = fold_clinical(&percentages, scope(&taxonomy));

		assert_eq!(nodes["Treatment"].score, 0.0);
		assert_eq!(nodes["Treatment"].subtags, BTreeMap::from([("Dosing".to_string(), 60.0)]));
		assert_eq!(nodes["Oncology"].score, 40.0);
		assert!(!nodes.contains_key("Diagnosis"));
	}

	#[test]
	fn parent_observed_directly_keeps_its_score_and_children() {
		let taxonomy = taxonomy();
		let percentages = BTreeMap::from([
			("Treatment".to_string(), 50.0),
			("Adverse Events".to_string(), 30.0),
			("Diagnosis".to_string(), 20.0),
		]);
		let nodes = renormalize(fold_clinical(&percentages, scope(&taxonomy)));

		assert_eq!(nodes.len(), 2);
		assert_eq!(nodes["Treatment"].score, 71.4);
		assert_eq!(nodes["Treatment"].subtags["Adverse Events"], 30.0);
		assert_eq!(nodes["Diagnosis"].score, 28.6);
		assert!(nodes["Diagnosis"].subtags.is_empty());
	}

	#[test]
	fn renormalize_leaves_all_zero_structure_unchanged() {
		let taxonomy = taxonomy();
		let percentages = BTreeMap::from([("Imaging".to_string(), 100.0)]);
		let nodes = renormalize(fold_clinical(&percentages, scope(&taxonomy)));

		assert_eq!(nodes["Diagnosis"].score, 0.0);
		assert_eq!(nodes["Diagnosis"].subtags["Imaging"], 100.0);
	}

	#[test]
	fn distribution_is_zero_without_topics() {
		let chunks = vec![chunk(&[(Category::Audience, "HCP", 0.9)])];

		assert_eq!(content_distribution(&chunks, 0.3), ContentDistribution::default());
		assert_eq!(content_distribution(&[], 0.3), ContentDistribution::default());
	}

	#[test]
	fn distribution_sums_to_one_hundred() {
		let chunks = vec![
			chunk(&[(Category::ClinicalTopic, "Oncology", 0.9)]),
			chunk(&[(Category::NonClinicalTopics, "Market Access", 0.5)]),
			chunk(&[
				(Category::ClinicalTopic, "Treatment", 0.7),
				(Category::ClinicalTopic, "Dosing", 0.2),
			]),
		];
		let distribution = content_distribution(&chunks, 0.3);

		// Clinical: 0.8 * 2/3, non-clinical: 0.5 * 1/3.
		assert_eq!(distribution.clinical, 76.2);
		assert_eq!(distribution.non_clinical, 23.8);
		assert!((distribution.clinical + distribution.non_clinical - 100.0).abs() <= 0.1);
	}

	#[test]
	fn distribution_takes_the_rounding_excess_off_the_larger_share() {
		// 31.25 / 68.75 round to 31.3 + 68.8 = 100.1.
		let chunks = vec![
			chunk(&[(Category::ClinicalTopic, "Oncology", 0.3)]),
			chunk(&[(Category::NonClinicalTopics, "Market Access", 0.66)]),
		];
		let distribution = content_distribution(&chunks, 0.3);

		assert_eq!(distribution, ContentDistribution { clinical: 31.3, non_clinical: 68.7 });

		// 53.75 / 46.25 round to 53.8 + 46.3 = 100.1.
		let chunks = vec![
			chunk(&[(Category::ClinicalTopic, "Oncology", 0.43)]),
			chunk(&[(Category::NonClinicalTopics, "Market Access", 0.37)]),
		];
		let distribution = content_distribution(&chunks, 0.3);

		assert_eq!(distribution, ContentDistribution { clinical: 53.7, non_clinical: 46.3 });
	}

	#[test]
	fn reconcile_adjusts_the_larger_share_and_clinical_on_a_tie() {
		let (clinical, non_clinical) = reconcile(12.4, 87.7);

		assert_eq!(clinical, 12.4);
		assert_eq!(round1(non_clinical), 87.6);

		// Dyadic inputs keep the arithmetic exact: 100 - 2 * 49.96875 = 0.0625.
		assert_eq!(reconcile(49.96875, 49.96875), (50.03125, 49.96875));
	}

	#[test]
	fn reconcile_leaves_exact_and_out_of_tolerance_splits_alone() {
		assert_eq!(reconcile(66.7, 33.3), (66.7, 33.3));
		assert_eq!(reconcile(33.3, 33.3), (33.3, 33.3));
	}
}
