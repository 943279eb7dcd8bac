// Copyright 2025 Irreducible Inc.

//! Launch geometry shared by accelerator kernels.

/// Number of threads per block used for every kernel launch.
pub const THREADS_PER_BLOCK: usize = 512;

/// Number of blocks needed to cover `n` elements with [`THREADS_PER_BLOCK`] threads each.
pub const fn num_blocks(n: usize) -> usize {
	n.div_ceil(THREADS_PER_BLOCK)
}
