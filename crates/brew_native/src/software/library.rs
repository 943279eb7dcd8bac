// Copyright 2025 Irreducible Inc.

use tracing::trace;

use super::{
	linalg::SoftwareLinalg,
	random::{SoftwareDeviceGenerator, SoftwareHostStream},
	registry::{Fault, HandleKind, HandleStats, SharedRegistry},
};
use crate::{
	DeviceGenerator, HandleId, HostStream, LinalgHandle, NativeError, NativeLibrary, NativeOp,
};

/// Native libraries emulated on the host.
///
/// Clones share their bookkeeping, so a clone kept aside observes every handle created or
/// destroyed through the original.
#[derive(Debug, Clone, Default)]
pub struct SoftwareLibrary {
	registry: SharedRegistry,
}

impl SoftwareLibrary {
	pub fn new() -> Self {
		Self::default()
	}

	/// Schedules a failure of a future native call.
	pub fn inject(&self, fault: Fault) {
		self.registry.lock().inject(fault);
	}

	pub fn stats(&self) -> HandleStats {
		self.registry.lock().stats()
	}

	/// Number of times `op` has been called, failed calls included.
	pub fn calls(&self, op: NativeOp) -> usize {
		self.registry.lock().calls(op)
	}

	/// Whether a handle with this id has been created and not yet destroyed.
	pub fn is_live(&self, id: HandleId) -> bool {
		self.registry.lock().is_live(id)
	}

	fn acquire(&self, op: NativeOp, kind: HandleKind) -> Result<HandleId, NativeError> {
		let id = self.registry.lock().acquire(op, kind)?;
		trace!(%id, ?kind, "native handle created");
		Ok(id)
	}

	fn release(&self, op: NativeOp, kind: HandleKind, id: HandleId) -> Result<(), NativeError> {
		self.registry.lock().release(op, kind, id)?;
		trace!(%id, ?kind, "native handle destroyed");
		Ok(())
	}
}

impl NativeLibrary for SoftwareLibrary {
	fn name(&self) -> &str {
		"software"
	}

	fn create_linalg_handle(&self) -> Result<Box<dyn LinalgHandle>, NativeError> {
		let id = self.acquire(NativeOp::CreateLinalgHandle, HandleKind::Linalg)?;
		Ok(Box::new(SoftwareLinalg::new(id, self.registry.clone())))
	}

	fn destroy_linalg_handle(&self, handle: Box<dyn LinalgHandle>) -> Result<(), NativeError> {
		self.release(NativeOp::DestroyLinalgHandle, HandleKind::Linalg, handle.id())
	}

	fn create_device_generator(&self, seed: u64) -> Result<Box<dyn DeviceGenerator>, NativeError> {
		let id = self.acquire(NativeOp::CreateDeviceGenerator, HandleKind::DeviceGenerator)?;
		Ok(Box::new(SoftwareDeviceGenerator::new(id, seed, self.registry.clone())))
	}

	fn destroy_device_generator(
		&self,
		generator: Box<dyn DeviceGenerator>,
	) -> Result<(), NativeError> {
		self.release(NativeOp::DestroyDeviceGenerator, HandleKind::DeviceGenerator, generator.id())
	}

	fn create_host_stream(&self, seed: u64) -> Result<Box<dyn HostStream>, NativeError> {
		let id = self.acquire(NativeOp::CreateHostStream, HandleKind::HostStream)?;
		Ok(Box::new(SoftwareHostStream::new(id, seed, self.registry.clone())))
	}

	fn destroy_host_stream(&self, stream: Box<dyn HostStream>) -> Result<(), NativeError> {
		self.release(NativeOp::DestroyHostStream, HandleKind::HostStream, stream.id())
	}
}
