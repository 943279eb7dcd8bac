// Copyright 2025 Irreducible Inc.

//! Reference implementation of the native libraries, emulated in software on the host.
//!
//! It is not meant to be fast. It validates the abstract interfaces, provides reproducible random
//! sequences for tests, and records every handle it hands out so that resource leaks and
//! injected failures can be observed.

mod library;
mod linalg;
mod random;
mod registry;

pub use library::SoftwareLibrary;
pub use registry::{Fault, HandleStats, Lifetimes};
