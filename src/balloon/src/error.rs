use protocol::FruitKind;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
	#[error("ring needs at least 3 nodes, got {count}")]
	TooFewNodes { count: usize },

	#[error("no ring template for {kind}")]
	MissingTemplate { kind: FruitKind },

	#[error("invalid template parameter `{name}`: {reason}")]
	InvalidParameter { name: &'static str, reason: String },
}

impl BuildError {
	pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
		Self::InvalidParameter {
			name,
			reason: reason.into(),
		}
	}
}
