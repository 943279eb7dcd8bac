// Copyright 2025 Irreducible Inc.

use brew_native::NativeError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0}")]
	Native(#[from] NativeError),
	#[error("the process-wide compute context is already initialized")]
	AlreadyInitialized,
	#[error("the process-wide compute context is not initialized")]
	NotInitialized,
}
