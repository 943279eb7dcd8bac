// Copyright 2025 Irreducible Inc.

use std::ops::{Add, Mul};

use brew_utils::ensure;
use rayon::prelude::*;
use tracing::instrument;

use super::registry::SharedRegistry;
use crate::{GemmShape, HandleId, LinalgHandle, NativeError, NativeOp, Status, Transpose};

trait Element: Copy + Send + Sync + PartialEq + Add<Output = Self> + Mul<Output = Self> {
	const ZERO: Self;
}

impl Element for f32 {
	const ZERO: Self = 0.0;
}

impl Element for f64 {
	const ZERO: Self = 0.0;
}

#[derive(Debug)]
pub(super) struct SoftwareLinalg {
	id: HandleId,
	registry: SharedRegistry,
}

impl SoftwareLinalg {
	pub fn new(id: HandleId, registry: SharedRegistry) -> Self {
		Self { id, registry }
	}

	#[instrument(skip_all, level = "trace", fields(m = shape.m, n = shape.n, k = shape.k))]
	fn gemm<T: Element>(
		&self,
		shape: GemmShape,
		alpha: T,
		a: &[T],
		b: &[T],
		beta: T,
		c: &mut [T],
	) -> Result<(), NativeError> {
		self.registry.lock().enter(NativeOp::Gemm)?;

		let GemmShape {
			trans_a,
			trans_b,
			m,
			n,
			k,
		} = shape;
		let len = |rows: usize, cols: usize| rows.checked_mul(cols);
		ensure!(
			len(m, k) == Some(a.len()) && len(k, n) == Some(b.len()) && len(m, n) == Some(c.len()),
			NativeError::new(NativeOp::Gemm, Status::INVALID_VALUE)
		);
		if n == 0 {
			return Ok(());
		}

		let op_a = |i: usize, p: usize| match trans_a {
			Transpose::No => a[i * k + p],
			Transpose::Yes => a[p * m + i],
		};
		let op_b = |p: usize, j: usize| match trans_b {
			Transpose::No => b[p * n + j],
			Transpose::Yes => b[j * k + p],
		};

		c.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
			for (j, out) in row.iter_mut().enumerate() {
				let acc = (0..k).fold(T::ZERO, |acc, p| acc + op_a(i, p) * op_b(p, j));
				// beta == 0 overwrites C, so uninitialised values in C never propagate.
				*out = if beta == T::ZERO {
					alpha * acc
				} else {
					alpha * acc + beta * *out
				};
			}
		});
		Ok(())
	}

	fn axpy<T: Element>(&self, alpha: T, x: &[T], y: &mut [T]) -> Result<(), NativeError> {
		self.registry.lock().enter(NativeOp::Axpy)?;
		ensure!(x.len() == y.len(), NativeError::new(NativeOp::Axpy, Status::INVALID_VALUE));

		for (y, &x) in y.iter_mut().zip(x) {
			*y = alpha * x + *y;
		}
		Ok(())
	}
}

impl LinalgHandle for SoftwareLinalg {
	fn id(&self) -> HandleId {
		self.id
	}

	fn sgemm(
		&self,
		shape: GemmShape,
		alpha: f32,
		a: &[f32],
		b: &[f32],
		beta: f32,
		c: &mut [f32],
	) -> Result<(), NativeError> {
		self.gemm(shape, alpha, a, b, beta, c)
	}

	fn dgemm(
		&self,
		shape: GemmShape,
		alpha: f64,
		a: &[f64],
		b: &[f64],
		beta: f64,
		c: &mut [f64],
	) -> Result<(), NativeError> {
		self.gemm(shape, alpha, a, b, beta, c)
	}

	fn saxpy(&self, alpha: f32, x: &[f32], y: &mut [f32]) -> Result<(), NativeError> {
		self.axpy(alpha, x, y)
	}

	fn daxpy(&self, alpha: f64, x: &[f64], y: &mut [f64]) -> Result<(), NativeError> {
		self.axpy(alpha, x, y)
	}
}
