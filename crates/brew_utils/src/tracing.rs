// Copyright 2023 Ulvetanna Inc.

use crate::env::boolean_env_flag_set;

/// Environment flag that turns on span-close events, which carry the busy/idle time of every
/// instrumented call (context construction, reseeding, gemm).
pub const TRACE_SPANS_FLAG: &str = "BREW_TRACE_SPANS";

/// Installs a global `tracing` subscriber writing to stderr.
///
/// The filter is taken from `RUST_LOG` and defaults to `info`. Calling this more than once, or
/// after another subscriber was installed, is a no-op.
pub fn init_tracing() {
	use tracing_subscriber::{
		fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
	};

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let span_events = if boolean_env_flag_set(TRACE_SPANS_FLAG) {
		FmtSpan::CLOSE
	} else {
		FmtSpan::NONE
	};

	let _ = tracing_subscriber::registry()
		.with(filter)
		.with(
			tracing_subscriber::fmt::layer()
				.with_writer(std::io::stderr)
				.with_span_events(span_events),
		)
		.try_init();
}
