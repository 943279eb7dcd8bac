// Copyright 2025 Irreducible Inc.

//! The compute context: the single owner of the native handles and session state that every
//! accelerated or randomized operation needs.
//!
//! A [`ComputeContext`] can be created explicitly and passed to the code that needs it, or the
//! process-wide instance in [`global`] can be used.

mod config;
mod context;
mod error;
pub mod global;
mod mode;
mod seeding;

pub use brew_native as native;
pub use config::*;
pub use context::*;
pub use error::*;
pub use mode::*;
