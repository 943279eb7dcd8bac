// Copyright 2025 Irreducible Inc.

//! Boundary to the native libraries a compute context wraps.
//!
//! Three native resources are modelled: a linear-algebra engine handle, an accelerator-resident
//! pseudo-random generator and a host-resident pseudo-random stream. Every native call reports a
//! [`Status`]; anything other than [`Status::SUCCESS`] surfaces as a [`NativeError`].
//!
//! The two random-number resources deliberately expose different capabilities. A host stream can
//! be reseeded in place through [`ReseedInPlace`], whereas an accelerator generator has no reseed
//! operation at all and must be destroyed and created again through its [`NativeLibrary`].

pub mod launch;
mod library;
pub mod software;
mod status;

pub use library::*;
pub use software::SoftwareLibrary;
pub use status::*;
