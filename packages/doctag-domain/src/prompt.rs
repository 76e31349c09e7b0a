//! Instruction payload for the abstractive classifier.

use serde_json::Value;

use crate::Taxonomy;

const SUBTAG_SYNONYMS_SHOWN: usize = 3;
const NESTED_SYNONYMS_SHOWN: usize = 2;

const SYSTEM_PROMPT: &str = "You are an expert content analyzer. Return only valid JSON responses with exact subtag names from the provided options.";

const RULES: &str = "Important Rules:
1. ONLY use the exact subtag names provided in the categories above
2. You can also use synonyms of the subtags if they appear in the content
3. Multiple subtags can be selected from each category if relevant
4. Confidence scores should be between 0.0 and 1.0
5. Only select subtags you are highly confident about (>= 0.3)
6. If no specific subtags are relevant, return empty objects for that category
7. Look for exact matches, synonym matches, and conceptual matches based on definitions
8. Pay attention to the context and meaning of the content when selecting tags
9. For parent tags with nested subtags (like Treatment), identify both the parent and relevant nested subtags
10. Score nested subtags separately from their parent tags";

const OUTPUT_FORMAT: &str = r#"Output Format:
Return ONLY a valid JSON object with this exact structure:
{
    "abstractive": {
        "audience": {"exact_subtag_name_or_synonym": confidence_score},
        "content purpose": {"exact_subtag_name_or_synonym": confidence_score},
        "content complexity": {"exact_subtag_name_or_synonym": confidence_score},
        "non clinical topics": {"exact_subtag_name_or_synonym": confidence_score},
        "clinical topic": {"exact_subtag_name_or_synonym": confidence_score}
    }
}"#;

/// Renders every category with its definition, subtags and nested subtags.
pub fn describe_taxonomy(taxonomy: &Taxonomy) -> String {
	let mut lines = vec!["=== ABSTRACTIVE CATEGORIES ===".to_string()];

	for entry in taxonomy.categories() {
		lines.push(format!("\n{}:", entry.category.as_str().to_uppercase()));
		lines.push(format!("Definition: {}", entry.definition));

		if entry.subtags.is_empty() {
			continue;
		}

		lines.push("Available subtags:".to_string());

		for subtag in &entry.subtags {
			lines.push(format!(
				"  - {}: {}{}",
				subtag.name,
				subtag.definition,
				synonym_suffix(&subtag.synonyms, SUBTAG_SYNONYMS_SHOWN)
			));

			for nested in &subtag.nested {
				lines.push(format!(
					"    * {}: {}{}",
					nested.name,
					nested.definition,
					synonym_suffix(&nested.synonyms, NESTED_SYNONYMS_SHOWN)
				));
			}
		}
	}

	lines.join("\n")
}

fn synonym_suffix(synonyms: &[String], shown: usize) -> String {
	if synonyms.is_empty() {
		return String::new();
	}

	let listed: Vec<&str> = synonyms.iter().take(shown).map(String::as_str).collect();

	format!(" (Synonyms: {})", listed.join(", "))
}

/// Chat messages asking the classifier to tag `chunk` against `description`.
pub fn build_messages(description: &str, chunk: &str) -> Vec<Value> {
	let user = format!(
		"You are an expert content analyzer. Analyze the provided text content and identify relevant abstractive tags from the given categories. You must select ONLY the specific subtags provided in the available options, not generic terms.\n\nAvailable Categories and Subtags:\n{description}\n\n{RULES}\n\n{OUTPUT_FORMAT}\n\nText Content to Analyze:\n{chunk}"
	);

	vec![
		serde_json::json!({ "role": "system", "content": SYSTEM_PROMPT }),
		serde_json::json!({ "role": "user", "content": user }),
	]
}
