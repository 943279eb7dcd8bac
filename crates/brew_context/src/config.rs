// Copyright 2025 Irreducible Inc.

use getset::CopyGetters;

use crate::{Backend, Phase};

/// Seed used for both random subsystems when none is configured.
pub const DEFAULT_SEED: u64 = 1701;

/// Initial state of a [`crate::ComputeContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct ContextConfig {
	backend: Backend,
	phase: Phase,
	/// Seed for both random subsystems; `None` selects [`DEFAULT_SEED`].
	seed: Option<u64>,
}

impl ContextConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_backend(mut self, backend: Backend) -> Self {
		self.backend = backend;
		self
	}

	pub fn with_phase(mut self, phase: Phase) -> Self {
		self.phase = phase;
		self
	}

	pub fn with_seed(mut self, seed: u64) -> Self {
		self.seed = Some(seed);
		self
	}

	pub fn initial_seed(&self) -> u64 {
		self.seed.unwrap_or(DEFAULT_SEED)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = ContextConfig::new();
		assert_eq!(config.backend(), Backend::Host);
		assert_eq!(config.phase(), Phase::Train);
		assert_eq!(config.seed(), None);
		assert_eq!(config.initial_seed(), DEFAULT_SEED);
	}

	#[test]
	fn test_builder() {
		let config = ContextConfig::new()
			.with_backend(Backend::Accelerator)
			.with_phase(Phase::Evaluate)
			.with_seed(7);
		assert_eq!(config.backend(), Backend::Accelerator);
		assert_eq!(config.phase(), Phase::Evaluate);
		assert_eq!(config.initial_seed(), 7);
	}
}
