// Copyright 2025 Irreducible Inc.

use std::{
	fmt,
	marker::PhantomData,
	sync::atomic::{AtomicU8, Ordering},
};

/// Processor that executes subsequently issued numerical operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Backend {
	#[default]
	Host,
	Accelerator,
}

/// Whether operations run with training or evaluation semantics, e.g. for dropout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
	#[default]
	Train,
	Evaluate,
}

impl fmt::Display for Backend {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Host => "host",
			Self::Accelerator => "accelerator",
		})
	}
}

impl fmt::Display for Phase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Train => "train",
			Self::Evaluate => "evaluate",
		})
	}
}

pub(crate) trait Flag: Copy {
	fn into_bits(self) -> u8;
	fn from_bits(bits: u8) -> Self;
}

impl Flag for Backend {
	fn into_bits(self) -> u8 {
		self as u8
	}

	fn from_bits(bits: u8) -> Self {
		match bits {
			1 => Self::Accelerator,
			_ => Self::Host,
		}
	}
}

impl Flag for Phase {
	fn into_bits(self) -> u8 {
		self as u8
	}

	fn from_bits(bits: u8) -> Self {
		match bits {
			1 => Self::Evaluate,
			_ => Self::Train,
		}
	}
}

/// A [`Flag`] that can be read and replaced from any thread.
///
/// A store is visible to every load that happens after it on the same thread, and to loads on
/// other threads that synchronize with it. Nothing orders a flag change against operations that
/// already read the old value.
pub(crate) struct AtomicFlag<T> {
	bits: AtomicU8,
	_marker: PhantomData<T>,
}

impl<T: Flag> AtomicFlag<T> {
	pub fn new(value: T) -> Self {
		Self {
			bits: AtomicU8::new(value.into_bits()),
			_marker: PhantomData,
		}
	}

	pub fn load(&self) -> T {
		T::from_bits(self.bits.load(Ordering::Acquire))
	}

	/// Stores `value` and returns the previous one.
	pub fn swap(&self, value: T) -> T {
		T::from_bits(self.bits.swap(value.into_bits(), Ordering::AcqRel))
	}
}

impl<T: Flag + fmt::Debug> fmt::Debug for AtomicFlag<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.load().fmt(f)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_bits_roundtrip() {
		for backend in [Backend::Host, Backend::Accelerator] {
			assert_eq!(Backend::from_bits(backend.into_bits()), backend);
		}
		for phase in [Phase::Train, Phase::Evaluate] {
			assert_eq!(Phase::from_bits(phase.into_bits()), phase);
		}
	}

	#[test]
	fn test_atomic_flag_swap() {
		let flag = AtomicFlag::new(Phase::default());
		assert_eq!(flag.load(), Phase::Train);
		assert_eq!(flag.swap(Phase::Evaluate), Phase::Train);
		assert_eq!(flag.load(), Phase::Evaluate);
		assert_eq!(format!("{flag:?}"), "Evaluate");
	}
}
