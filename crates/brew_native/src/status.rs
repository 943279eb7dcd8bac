// Copyright 2025 Irreducible Inc.

use std::fmt;

/// Raw status code reported by a native call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(pub i32);

impl Status {
	pub const SUCCESS: Self = Self(0);
	pub const NOT_INITIALIZED: Self = Self(1);
	pub const ALLOC_FAILED: Self = Self(3);
	pub const INVALID_VALUE: Self = Self(7);
	pub const ARCH_MISMATCH: Self = Self(8);
	pub const INTERNAL_ERROR: Self = Self(14);

	pub const fn is_success(self) -> bool {
		self.0 == Self::SUCCESS.0
	}

	/// Converts a status reported by `op` into a result.
	pub fn check(self, op: NativeOp) -> Result<(), NativeError> {
		if self.is_success() {
			Ok(())
		} else {
			Err(NativeError { op, status: self })
		}
	}

	fn name(self) -> Option<&'static str> {
		let name = match self {
			Self::SUCCESS => "SUCCESS",
			Self::NOT_INITIALIZED => "NOT_INITIALIZED",
			Self::ALLOC_FAILED => "ALLOC_FAILED",
			Self::INVALID_VALUE => "INVALID_VALUE",
			Self::ARCH_MISMATCH => "ARCH_MISMATCH",
			Self::INTERNAL_ERROR => "INTERNAL_ERROR",
			_ => return None,
		};
		Some(name)
	}
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.name() {
			Some(name) => write!(f, "{name} ({})", self.0),
			None => write!(f, "status {}", self.0),
		}
	}
}

/// A native operation that reports a [`Status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeOp {
	CreateLinalgHandle,
	DestroyLinalgHandle,
	CreateDeviceGenerator,
	DestroyDeviceGenerator,
	CreateHostStream,
	DestroyHostStream,
	ReseedHostStream,
	GenerateRandom,
	Gemm,
	Axpy,
}

impl fmt::Display for NativeOp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::CreateLinalgHandle => "create linear algebra handle",
			Self::DestroyLinalgHandle => "destroy linear algebra handle",
			Self::CreateDeviceGenerator => "create accelerator random generator",
			Self::DestroyDeviceGenerator => "destroy accelerator random generator",
			Self::CreateHostStream => "create host random stream",
			Self::DestroyHostStream => "destroy host random stream",
			Self::ReseedHostStream => "reseed host random stream",
			Self::GenerateRandom => "generate random numbers",
			Self::Gemm => "gemm",
			Self::Axpy => "axpy",
		};
		f.write_str(name)
	}
}

/// A native resource operation that did not report success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("native call `{op}` failed with {status}")]
pub struct NativeError {
	pub op: NativeOp,
	pub status: Status,
}

impl NativeError {
	pub const fn new(op: NativeOp, status: Status) -> Self {
		Self { op, status }
	}
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;

	use super::*;

	#[test]
	fn test_check_success() {
		assert_matches!(Status::SUCCESS.check(NativeOp::Gemm), Ok(()));
	}

	#[test]
	fn test_check_failure_keeps_op_and_code() {
		let err = Status(3).check(NativeOp::CreateHostStream).unwrap_err();
		assert_eq!(err, NativeError::new(NativeOp::CreateHostStream, Status::ALLOC_FAILED));
	}

	#[test]
	fn test_error_message_names_operation_and_code() {
		let err = NativeError::new(NativeOp::CreateLinalgHandle, Status::NOT_INITIALIZED);
		assert_eq!(
			err.to_string(),
			"native call `create linear algebra handle` failed with NOT_INITIALIZED (1)"
		);

		let err = NativeError::new(NativeOp::ReseedHostStream, Status(-1003));
		assert_eq!(err.to_string(), "native call `reseed host random stream` failed with status -1003");
	}
}
