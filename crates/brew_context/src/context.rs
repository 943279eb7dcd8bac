// Copyright 2025 Irreducible Inc.

use std::{fmt, sync::Arc};

use brew_native::{DeviceGenerator, HostStream, LinalgHandle, NativeError, NativeLibrary};
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use static_assertions::assert_impl_all;
use tracing::{debug, error, info, instrument, warn};

use crate::{
	mode::AtomicFlag,
	seeding::{discard_replacement, install_replacement, recreate, reseed_in_place},
	Backend, ContextConfig, Error, Phase,
};

/// Owner of the native handles and session flags used by accelerated and randomized operations.
///
/// The three handles are acquired in [`ComputeContext::new`] and stay valid until the context is
/// closed or dropped, except for the accelerator generator, which is replaced on every
/// [`ComputeContext::set_random_seed`].
///
/// ## Thread safety
///
/// The context is `Send + Sync`. Backend and phase are atomics: a switch is seen by every
/// operation issued after it, while operations already running keep the value they read. The two
/// random resources are each behind a mutex, and reseeding holds both, so a draw through
/// [`Self::device_generator`] or [`Self::host_stream`] never observes a half-reseeded context.
/// Guards returned by those accessors must be dropped before calling
/// [`Self::set_random_seed`] on the same thread, otherwise the call deadlocks.
pub struct ComputeContext {
	library: Arc<dyn NativeLibrary>,
	// The handles are `None` only after `release`, which needs `&mut self` or ownership, so every
	// `&self` method sees them present.
	linalg: Option<Box<dyn LinalgHandle>>,
	// Lock order: host stream before device generator.
	host_stream: Mutex<Option<Box<dyn HostStream>>>,
	device_generator: Mutex<Option<Box<dyn DeviceGenerator>>>,
	backend: AtomicFlag<Backend>,
	phase: AtomicFlag<Phase>,
}

const PRESENT: &str = "handles are present until the context is released";

assert_impl_all!(ComputeContext: Send, Sync);

impl ComputeContext {
	/// Acquires all native handles from `library`.
	///
	/// If any acquisition fails, the handles acquired before it are destroyed and the error is
	/// returned; no partially constructed context is ever observable.
	pub fn new(library: impl NativeLibrary + 'static, config: ContextConfig) -> Result<Self, Error> {
		Self::with_shared_library(Arc::new(library), config)
	}

	#[instrument(skip_all, name = "ComputeContext::new", fields(library = library.name()))]
	pub fn with_shared_library(
		library: Arc<dyn NativeLibrary>,
		config: ContextConfig,
	) -> Result<Self, Error> {
		let seed = config.initial_seed();

		let linalg = library.create_linalg_handle()?;
		let device_generator = match library.create_device_generator(seed) {
			Ok(generator) => generator,
			Err(err) => {
				cleanup(library.destroy_linalg_handle(linalg));
				return Err(err.into());
			}
		};
		let host_stream = match library.create_host_stream(seed) {
			Ok(stream) => stream,
			Err(err) => {
				cleanup(library.destroy_device_generator(device_generator));
				cleanup(library.destroy_linalg_handle(linalg));
				return Err(err.into());
			}
		};

		info!(
			seed,
			backend = %config.backend(),
			phase = %config.phase(),
			linalg = %linalg.id(),
			"compute context created"
		);

		Ok(Self {
			library,
			linalg: Some(linalg),
			host_stream: Mutex::new(Some(host_stream)),
			device_generator: Mutex::new(Some(device_generator)),
			backend: AtomicFlag::new(config.backend()),
			phase: AtomicFlag::new(config.phase()),
		})
	}

	/// The native library the handles were acquired from.
	pub fn library(&self) -> &dyn NativeLibrary {
		&*self.library
	}

	pub fn linalg_handle(&self) -> &dyn LinalgHandle {
		self.linalg.as_deref().expect(PRESENT)
	}

	/// Locks the accelerator generator.
	pub fn device_generator(&self) -> MappedMutexGuard<'_, dyn DeviceGenerator + 'static> {
		MutexGuard::map(self.device_generator.lock(), |generator| {
			generator.as_deref_mut().expect(PRESENT)
		})
	}

	/// Locks the host stream.
	pub fn host_stream(&self) -> MappedMutexGuard<'_, dyn HostStream + 'static> {
		MutexGuard::map(self.host_stream.lock(), |stream| stream.as_deref_mut().expect(PRESENT))
	}

	pub fn backend(&self) -> Backend {
		self.backend.load()
	}

	pub fn phase(&self) -> Phase {
		self.phase.load()
	}

	pub fn set_backend(&self, backend: Backend) {
		let previous = self.backend.swap(backend);
		debug!(%previous, current = %backend, "backend set");
	}

	pub fn set_phase(&self, phase: Phase) {
		let previous = self.phase.swap(phase);
		debug!(%previous, current = %phase, "phase set");
	}

	/// Reseeds both random subsystems from one seed.
	///
	/// The host stream restarts in place; the accelerator generator is recreated with `seed`.
	/// Afterwards both produce the same sequences as a context freshly created with `seed`.
	///
	/// ## Errors
	///
	/// Both subsystems move to the new seed together or not at all:
	///
	/// * if the replacement generator cannot be created, nothing changes;
	/// * if the host stream cannot be reseeded, the replacement is destroyed and the old generator
	///   stays installed, and the host stream keeps its previous seed unless the native reseed
	///   modified it before failing;
	/// * if the old generator cannot be destroyed, both subsystems already run on `seed` and the
	///   old generator is unreachable.
	#[instrument(skip(self), level = "debug")]
	pub fn set_random_seed(&self, seed: u64) -> Result<(), Error> {
		let mut host_stream = self.host_stream.lock();
		let mut device_generator = self.device_generator.lock();
		let host_stream = host_stream.as_deref_mut().expect(PRESENT);
		let device_generator = device_generator.as_mut().expect(PRESENT);

		let replacement = recreate(&*self.library, seed)?;
		if let Err(err) = reseed_in_place(host_stream, seed) {
			discard_replacement(&*self.library, replacement);
			return Err(err.into());
		}
		install_replacement(&*self.library, device_generator, replacement)?;
		Ok(())
	}

	/// Destroys all native handles, returning the first failure.
	///
	/// Dropping the context does the same but can only log failures.
	pub fn close(mut self) -> Result<(), Error> {
		self.release().map_err(Into::into)
	}

	fn release(&mut self) -> Result<(), NativeError> {
		let library = &self.library;

		// Every handle is destroyed even if an earlier destroy fails.
		let results = [
			self.host_stream
				.get_mut()
				.take()
				.map(|stream| library.destroy_host_stream(stream)),
			self.device_generator
				.get_mut()
				.take()
				.map(|generator| library.destroy_device_generator(generator)),
			self.linalg
				.take()
				.map(|linalg| library.destroy_linalg_handle(linalg)),
		];
		if results.iter().any(Option::is_some) {
			debug!("compute context released");
		}
		results.into_iter().flatten().collect()
	}
}

impl Drop for ComputeContext {
	fn drop(&mut self) {
		if let Err(err) = self.release() {
			error!(%err, "failed to release compute context");
		}
	}
}

impl fmt::Debug for ComputeContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ComputeContext")
			.field("library", &self.library.name())
			.field("backend", &self.backend)
			.field("phase", &self.phase)
			.finish_non_exhaustive()
	}
}

fn cleanup(result: Result<(), NativeError>) {
	if let Err(err) = result {
		warn!(%err, "failed to release handle after construction error");
	}
}
