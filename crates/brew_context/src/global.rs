// Copyright 2025 Irreducible Inc.

//! The process-wide compute context.
//!
//! The context is installed at most once at a time, either explicitly with [`init`] or lazily by
//! the first call to [`instance`], which uses [`SoftwareLibrary`] and the default
//! [`ContextConfig`]. Installation is serialized by a lock, so concurrent first accesses construct
//! exactly one context.
//!
//! "Exactly one" holds between installation and [`shutdown`]. `shutdown` only uninstalls the
//! context: an `Arc` obtained earlier keeps it, and its handles, alive. A following [`instance`]
//! then constructs a second context while the first is still reachable through that `Arc`. Drop
//! every `Arc` before calling `shutdown` to keep a single context alive at any time.
//!
//! Every function here except [`init`] and [`shutdown`] treats a native failure as fatal: it logs
//! a single diagnostic line and aborts the process. Code that prefers to handle failures should
//! own a [`ComputeContext`] directly.

use std::sync::Arc;

use brew_native::{NativeLibrary, SoftwareLibrary};
use parking_lot::{const_rwlock, RwLock};
use tracing::{debug, enabled, error, Level};

use crate::{Backend, ComputeContext, ContextConfig, Error, Phase};

static GLOBAL: RwLock<Option<Arc<ComputeContext>>> = const_rwlock(None);

/// Installs a context built from `library` and `config`.
pub fn init(
	library: impl NativeLibrary + 'static,
	config: ContextConfig,
) -> Result<Arc<ComputeContext>, Error> {
	let mut slot = GLOBAL.write();
	if slot.is_some() {
		return Err(Error::AlreadyInitialized);
	}

	let context = Arc::new(ComputeContext::new(library, config)?);
	*slot = Some(Arc::clone(&context));
	Ok(context)
}

/// Like [`init`], aborting the process if the context cannot be installed.
pub fn init_or_abort(
	library: impl NativeLibrary + 'static,
	config: ContextConfig,
) -> Arc<ComputeContext> {
	init(library, config).unwrap_or_else(|err| fatal(&err))
}

/// The installed context, if any, without constructing one.
pub fn try_instance() -> Option<Arc<ComputeContext>> {
	GLOBAL.read().clone()
}

/// The installed context, constructing the default one on first use.
pub fn instance() -> Arc<ComputeContext> {
	if let Some(context) = try_instance() {
		return context;
	}

	let mut slot = GLOBAL.write();
	if let Some(context) = slot.as_ref() {
		return Arc::clone(context);
	}

	let context = ComputeContext::new(SoftwareLibrary::new(), ContextConfig::default())
		.unwrap_or_else(|err| fatal(&err));
	let context = Arc::new(context);
	*slot = Some(Arc::clone(&context));
	context
}

/// Uninstalls the context.
///
/// Its handles are destroyed immediately if no other reference to it is alive, otherwise when the
/// last reference is dropped. A later [`instance`] call constructs a new context.
pub fn shutdown() -> Result<(), Error> {
	let context = GLOBAL.write().take().ok_or(Error::NotInitialized)?;
	match Arc::try_unwrap(context) {
		Ok(context) => context.close(),
		Err(context) => {
			debug!(
				references = Arc::strong_count(&context) - 1,
				"compute context still referenced, release deferred"
			);
			Ok(())
		}
	}
}

pub fn backend() -> Backend {
	instance().backend()
}

pub fn set_backend(backend: Backend) {
	instance().set_backend(backend);
}

pub fn phase() -> Phase {
	instance().phase()
}

pub fn set_phase(phase: Phase) {
	instance().set_phase(phase);
}

pub fn set_random_seed(seed: u64) {
	instance()
		.set_random_seed(seed)
		.unwrap_or_else(|err| fatal(&err));
}

/// Reports `err` and aborts the process.
pub fn fatal(err: &Error) -> ! {
	if enabled!(Level::ERROR) {
		error!(%err, "fatal compute context failure");
	} else {
		eprintln!("fatal compute context failure: {err}");
	}
	std::process::abort()
}
