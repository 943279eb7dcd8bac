// Copyright 2025 Irreducible Inc.

//! The two ways a random resource can be brought to a new seed.
//!
//! Host streams restart their sequence in place. Accelerator generators cannot be reseeded, so
//! the generator is replaced by a freshly created one and the old one is destroyed. The two steps
//! are separate so a caller can create the replacement, do other fallible work, and only then
//! commit it.

use brew_native::{DeviceGenerator, NativeError, NativeLibrary, ReseedInPlace};
use tracing::{debug, warn};

pub(crate) fn reseed_in_place<R: ReseedInPlace + ?Sized>(
	resource: &mut R,
	seed: u64,
) -> Result<(), NativeError> {
	resource.reseed(seed)
}

/// First step of reseeding an accelerator generator: a generator created with `seed`, not yet
/// installed anywhere.
pub(crate) fn recreate(
	library: &dyn NativeLibrary,
	seed: u64,
) -> Result<Box<dyn DeviceGenerator>, NativeError> {
	library.create_device_generator(seed)
}

/// Second step: puts `replacement` into `slot` and destroys the generator it held.
///
/// If destroying the old generator fails, `slot` already holds the replacement and the old
/// generator is unreachable.
pub(crate) fn install_replacement(
	library: &dyn NativeLibrary,
	slot: &mut Box<dyn DeviceGenerator>,
	replacement: Box<dyn DeviceGenerator>,
) -> Result<(), NativeError> {
	let retired = std::mem::replace(slot, replacement);
	let retired_id = retired.id();
	library.destroy_device_generator(retired)?;

	debug!(retired = %retired_id, current = %slot.id(), "accelerator generator recreated");
	Ok(())
}

/// Destroys a replacement that will not be installed.
pub(crate) fn discard_replacement(
	library: &dyn NativeLibrary,
	replacement: Box<dyn DeviceGenerator>,
) {
	let id = replacement.id();
	if let Err(err) = library.destroy_device_generator(replacement) {
		warn!(%id, %err, "failed to destroy unused accelerator generator");
	}
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;
	use brew_native::{software::Fault, NativeOp, SoftwareLibrary, Status};

	use super::*;

	fn reseed_by_recreate(
		library: &SoftwareLibrary,
		slot: &mut Box<dyn DeviceGenerator>,
		seed: u64,
	) -> Result<(), NativeError> {
		let replacement = recreate(library, seed)?;
		install_replacement(library, slot, replacement)
	}

	#[test]
	fn test_recreate_replaces_and_destroys() {
		let library = SoftwareLibrary::new();
		let mut slot = library.create_device_generator(1).unwrap();
		let old_id = slot.id();

		reseed_by_recreate(&library, &mut slot, 2).unwrap();
		assert_eq!(slot.seed(), 2);
		assert_ne!(slot.id(), old_id);
		assert!(!library.is_live(old_id));
		assert_eq!(library.stats().device_generators.live(), 1);
	}

	#[test]
	fn test_failed_creation_keeps_old_generator() {
		let library = SoftwareLibrary::new();
		let mut slot = library.create_device_generator(1).unwrap();
		let old_id = slot.id();
		library.inject(Fault::new(NativeOp::CreateDeviceGenerator, Status::ALLOC_FAILED));

		assert_matches!(
			reseed_by_recreate(&library, &mut slot, 2),
			Err(NativeError { op: NativeOp::CreateDeviceGenerator, .. })
		);
		assert_eq!(slot.id(), old_id);
		assert_eq!(slot.seed(), 1);
	}

	#[test]
	fn test_failed_destroy_still_installs_replacement() {
		let library = SoftwareLibrary::new();
		let mut slot = library.create_device_generator(1).unwrap();
		let old_id = slot.id();
		library.inject(Fault::new(NativeOp::DestroyDeviceGenerator, Status::INTERNAL_ERROR));

		assert_matches!(
			reseed_by_recreate(&library, &mut slot, 2),
			Err(NativeError { op: NativeOp::DestroyDeviceGenerator, .. })
		);
		assert_ne!(slot.id(), old_id);
		assert_eq!(slot.seed(), 2);
	}

	#[test]
	fn test_discarded_replacement_is_destroyed() {
		let library = SoftwareLibrary::new();
		let replacement = recreate(&library, 4).unwrap();
		let id = replacement.id();

		discard_replacement(&library, replacement);
		assert!(!library.is_live(id));
		assert_eq!(library.stats().device_generators.live(), 0);
	}

	#[test]
	fn test_in_place_keeps_identity() {
		let library = SoftwareLibrary::new();
		let mut stream = library.create_host_stream(1).unwrap();
		let id = stream.id();

		reseed_in_place(&mut *stream, 9).unwrap();
		assert_eq!(stream.id(), id);
		assert_eq!(stream.seed(), 9);
		assert_eq!(library.stats().host_streams.created, 1);
	}
}
