// Copyright 2025 Irreducible Inc.

use std::fmt::{self, Debug};

use auto_impl::auto_impl;

use crate::NativeError;

/// Identifier of a native handle, unique among all handles created by one library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transpose {
	#[default]
	No,
	Yes,
}

/// Shape of a matrix product `C = alpha * op(A) * op(B) + beta * C`.
///
/// All matrices are dense and row-major. `op(A)` is `m x k`, `op(B)` is `k x n` and `C` is
/// `m x n`. A transposed operand is stored with its dimensions swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GemmShape {
	pub trans_a: Transpose,
	pub trans_b: Transpose,
	pub m: usize,
	pub n: usize,
	pub k: usize,
}

impl GemmShape {
	pub const fn new(m: usize, n: usize, k: usize) -> Self {
		Self {
			trans_a: Transpose::No,
			trans_b: Transpose::No,
			m,
			n,
			k,
		}
	}

	pub const fn transpose_a(mut self) -> Self {
		self.trans_a = Transpose::Yes;
		self
	}

	pub const fn transpose_b(mut self) -> Self {
		self.trans_b = Transpose::Yes;
		self
	}
}

/// Handle bound to the accelerator's linear-algebra engine.
pub trait LinalgHandle: Debug + Send + Sync {
	fn id(&self) -> HandleId;

	fn sgemm(
		&self,
		shape: GemmShape,
		alpha: f32,
		a: &[f32],
		b: &[f32],
		beta: f32,
		c: &mut [f32],
	) -> Result<(), NativeError>;

	fn dgemm(
		&self,
		shape: GemmShape,
		alpha: f64,
		a: &[f64],
		b: &[f64],
		beta: f64,
		c: &mut [f64],
	) -> Result<(), NativeError>;

	/// `y = alpha * x + y`
	fn saxpy(&self, alpha: f32, x: &[f32], y: &mut [f32]) -> Result<(), NativeError>;

	/// `y = alpha * x + y`
	fn daxpy(&self, alpha: f64, x: &[f64], y: &mut [f64]) -> Result<(), NativeError>;
}

/// Pseudo-random generator resident on the accelerator.
///
/// The generator cannot be reseeded. A different seed requires destroying it and creating a new
/// one through [`NativeLibrary::create_device_generator`].
pub trait DeviceGenerator: Debug + Send {
	fn id(&self) -> HandleId;

	/// Seed the generator was created with.
	fn seed(&self) -> u64;

	fn generate_u32(&mut self, out: &mut [u32]) -> Result<(), NativeError>;

	/// Fills `out` with values uniformly distributed over `(0, 1]`.
	fn generate_uniform(&mut self, out: &mut [f32]) -> Result<(), NativeError>;

	fn generate_normal(&mut self, out: &mut [f32], mean: f32, stddev: f32)
		-> Result<(), NativeError>;
}

/// A resource whose state can be reset to a seed without being recreated.
pub trait ReseedInPlace {
	/// Restarts the sequence as if the resource had been created with `seed`.
	fn reseed(&mut self, seed: u64) -> Result<(), NativeError>;
}

/// Pseudo-random stream resident on the host.
pub trait HostStream: ReseedInPlace + Debug + Send {
	fn id(&self) -> HandleId;

	/// Seed of the current sequence.
	fn seed(&self) -> u64;

	/// Fills `out` with values uniformly distributed over `[low, high)`.
	fn uniform(&mut self, out: &mut [f32], low: f32, high: f32) -> Result<(), NativeError>;

	fn gaussian(&mut self, out: &mut [f32], mean: f32, sigma: f32) -> Result<(), NativeError>;

	/// Fills `out` with 0/1 draws where 1 occurs with probability `p`.
	fn bernoulli(&mut self, out: &mut [u32], p: f64) -> Result<(), NativeError>;
}

/// The native libraries a compute context acquires its handles from.
///
/// Handles are released only through the matching `destroy_*` call. Dropping a handle without
/// destroying it leaks the native resource.
#[auto_impl(&, Box, Arc)]
pub trait NativeLibrary: Debug + Send + Sync {
	/// Human readable name used in diagnostics.
	fn name(&self) -> &str;

	fn create_linalg_handle(&self) -> Result<Box<dyn LinalgHandle>, NativeError>;

	fn destroy_linalg_handle(&self, handle: Box<dyn LinalgHandle>) -> Result<(), NativeError>;

	fn create_device_generator(&self, seed: u64) -> Result<Box<dyn DeviceGenerator>, NativeError>;

	fn destroy_device_generator(
		&self,
		generator: Box<dyn DeviceGenerator>,
	) -> Result<(), NativeError>;

	fn create_host_stream(&self, seed: u64) -> Result<Box<dyn HostStream>, NativeError>;

	fn destroy_host_stream(&self, stream: Box<dyn HostStream>) -> Result<(), NativeError>;
}
