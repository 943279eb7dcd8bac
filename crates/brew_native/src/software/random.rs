// Copyright 2025 Irreducible Inc.

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Bernoulli, Distribution, Normal, Uniform};

use super::registry::SharedRegistry;
use crate::{DeviceGenerator, HandleId, HostStream, NativeError, NativeOp, ReseedInPlace, Status};

fn invalid_value() -> NativeError {
	NativeError::new(NativeOp::GenerateRandom, Status::INVALID_VALUE)
}

fn normal(mean: f32, stddev: f32) -> Result<Normal<f32>, NativeError> {
	Normal::new(mean, stddev).map_err(|_| invalid_value())
}

/// Emulated accelerator generator. There is intentionally no way to change its seed.
#[derive(Debug)]
pub(super) struct SoftwareDeviceGenerator {
	id: HandleId,
	seed: u64,
	rng: StdRng,
	registry: SharedRegistry,
}

impl SoftwareDeviceGenerator {
	pub fn new(id: HandleId, seed: u64, registry: SharedRegistry) -> Self {
		Self {
			id,
			seed,
			rng: StdRng::seed_from_u64(seed),
			registry,
		}
	}
}

impl DeviceGenerator for SoftwareDeviceGenerator {
	fn id(&self) -> HandleId {
		self.id
	}

	fn seed(&self) -> u64 {
		self.seed
	}

	fn generate_u32(&mut self, out: &mut [u32]) -> Result<(), NativeError> {
		self.registry.lock().enter(NativeOp::GenerateRandom)?;
		self.rng.fill(out);
		Ok(())
	}

	fn generate_uniform(&mut self, out: &mut [f32]) -> Result<(), NativeError> {
		self.registry.lock().enter(NativeOp::GenerateRandom)?;
		for x in out {
			*x = 1.0 - self.rng.gen::<f32>();
		}
		Ok(())
	}

	fn generate_normal(
		&mut self,
		out: &mut [f32],
		mean: f32,
		stddev: f32,
	) -> Result<(), NativeError> {
		self.registry.lock().enter(NativeOp::GenerateRandom)?;
		let dist = normal(mean, stddev)?;
		for x in out {
			*x = dist.sample(&mut self.rng);
		}
		Ok(())
	}
}

/// Emulated host stream, reseedable in place.
#[derive(Debug)]
pub(super) struct SoftwareHostStream {
	id: HandleId,
	seed: u64,
	rng: ChaCha8Rng,
	registry: SharedRegistry,
}

impl SoftwareHostStream {
	pub fn new(id: HandleId, seed: u64, registry: SharedRegistry) -> Self {
		Self {
			id,
			seed,
			rng: ChaCha8Rng::seed_from_u64(seed),
			registry,
		}
	}
}

impl ReseedInPlace for SoftwareHostStream {
	fn reseed(&mut self, seed: u64) -> Result<(), NativeError> {
		self.registry.lock().enter(NativeOp::ReseedHostStream)?;
		self.rng = ChaCha8Rng::seed_from_u64(seed);
		self.seed = seed;
		Ok(())
	}
}

impl HostStream for SoftwareHostStream {
	fn id(&self) -> HandleId {
		self.id
	}

	fn seed(&self) -> u64 {
		self.seed
	}

	fn uniform(&mut self, out: &mut [f32], low: f32, high: f32) -> Result<(), NativeError> {
		self.registry.lock().enter(NativeOp::GenerateRandom)?;
		// `Uniform` also needs the width of the range to be representable.
		if !(low.is_finite() && high.is_finite() && low < high && (high - low).is_finite()) {
			return Err(invalid_value());
		}
		let dist = Uniform::new(low, high);
		for x in out {
			*x = dist.sample(&mut self.rng);
		}
		Ok(())
	}

	fn gaussian(&mut self, out: &mut [f32], mean: f32, sigma: f32) -> Result<(), NativeError> {
		self.registry.lock().enter(NativeOp::GenerateRandom)?;
		let dist = normal(mean, sigma)?;
		for x in out {
			*x = dist.sample(&mut self.rng);
		}
		Ok(())
	}

	fn bernoulli(&mut self, out: &mut [u32], p: f64) -> Result<(), NativeError> {
		self.registry.lock().enter(NativeOp::GenerateRandom)?;
		let dist = Bernoulli::new(p).map_err(|_| invalid_value())?;
		for x in out {
			*x = u32::from(dist.sample(&mut self.rng));
		}
		Ok(())
	}
}
