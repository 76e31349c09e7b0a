pub mod aggregate;
pub mod extractive;
pub mod lexical;
pub mod prompt;
pub mod result;
pub mod taxonomy;
pub mod validate;

mod error;

pub use error::{Error, Result};
pub use result::{
	AbstractiveTags, Category, ChunkTagResult, ClinicalNode, ContentDistribution, ExtractiveTags,
	TaggingResult,
};
pub use taxonomy::Taxonomy;

/// Rounds a percentage to one decimal place, halves away from zero.
pub fn round1(value: f64) -> f64 {
	(value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round1_takes_halves_away_from_zero() {
		assert_eq!(round1(12.25), 12.3);
		assert_eq!(round1(0.75), 0.8);
		assert_eq!(round1(33.333), 33.3);
	}
}
