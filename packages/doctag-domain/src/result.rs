use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The five fixed abstractive categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
	#[serde(rename = "audience")]
	Audience,
	#[serde(rename = "content purpose")]
	ContentPurpose,
	#[serde(rename = "content complexity")]
	ContentComplexity,
	#[serde(rename = "non clinical topics")]
	NonClinicalTopics,
	#[serde(rename = "clinical topic")]
	ClinicalTopic,
}
impl Category {
	pub const ALL: [Self; 5] = [
		Self::Audience,
		Self::ContentPurpose,
		Self::ContentComplexity,
		Self::NonClinicalTopics,
		Self::ClinicalTopic,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Audience => "audience",
			Self::ContentPurpose => "content purpose",
			Self::ContentComplexity => "content complexity",
			Self::NonClinicalTopics => "non clinical topics",
			Self::ClinicalTopic => "clinical topic",
		}
	}

	pub fn from_key(key: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|category| category.as_str() == key)
	}

	/// Maps a free-form source category heading onto a fixed category.
	pub fn from_heading(heading: &str) -> Option<Self> {
		let lower = heading.trim().to_lowercase();

		if lower == "audience" {
			Some(Self::Audience)
		} else if lower.contains("purpose") {
			Some(Self::ContentPurpose)
		} else if lower.contains("complexity") {
			Some(Self::ContentComplexity)
		} else if lower.contains("non clinical")
			|| lower.contains("nonclinical")
			|| lower.contains("non-clinical")
		{
			Some(Self::NonClinicalTopics)
		} else if lower.contains("clinical") {
			Some(Self::ClinicalTopic)
		} else {
			None
		}
	}
}

/// Validated tags for one chunk: category to canonical tag name to confidence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkTagResult {
	tags: BTreeMap<Category, BTreeMap<String, f64>>,
}
impl ChunkTagResult {
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, category: Category, tag: impl Into<String>, confidence: f64) {
		self.tags.entry(category).or_default().insert(tag.into(), confidence);
	}

	pub fn category(&self, category: Category) -> impl Iterator<Item = (&str, f64)> {
		self.tags
			.get(&category)
			.into_iter()
			.flat_map(|tags| tags.iter().map(|(name, score)| (name.as_str(), *score)))
	}

	pub fn is_empty(&self) -> bool {
		self.tags.values().all(BTreeMap::is_empty)
	}
}

/// A clinical-topic parent tag with its detected nested children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalNode {
	pub score: f64,
	pub subtags: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractiveTags {
	pub indication: BTreeMap<String, f64>,
	pub product: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbstractiveTags {
	pub audience: BTreeMap<String, f64>,
	#[serde(rename = "content purpose")]
	pub content_purpose: BTreeMap<String, f64>,
	#[serde(rename = "content complexity")]
	pub content_complexity: BTreeMap<String, f64>,
	#[serde(rename = "non clinical topics")]
	pub non_clinical_topics: BTreeMap<String, f64>,
	#[serde(rename = "clinical topic")]
	pub clinical_topic: BTreeMap<String, ClinicalNode>,
}
impl AbstractiveTags {
	/// Flat percentage map for every category except the clinical topic, which is folded.
	pub fn flat_mut(&mut self, category: Category) -> Option<&mut BTreeMap<String, f64>> {
		match category {
			Category::Audience => Some(&mut self.audience),
			Category::ContentPurpose => Some(&mut self.content_purpose),
			Category::ContentComplexity => Some(&mut self.content_complexity),
			Category::NonClinicalTopics => Some(&mut self.non_clinical_topics),
			Category::ClinicalTopic => None,
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentDistribution {
	pub clinical: f64,
	pub non_clinical: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaggingResult {
	pub extractive: ExtractiveTags,
	pub abstractive: AbstractiveTags,
	pub content_distribution: ContentDistribution,
}
impl TaggingResult {
	/// The all-empty, all-zero result.
	pub fn empty() -> Self {
		Self::default()
	}
}
