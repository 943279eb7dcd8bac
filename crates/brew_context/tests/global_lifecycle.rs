// Copyright 2025 Irreducible Inc.

//! The process-wide context is shared by every test in a binary, so the whole lifecycle is
//! exercised by a single test.

use std::{sync::Arc, thread};

use assert_matches::assert_matches;
use brew_context::{
	global,
	native::{NativeOp, SoftwareLibrary},
	Backend, ContextConfig, Error, Phase, DEFAULT_SEED,
};

fn draw_host(n: usize) -> Vec<f32> {
	let mut out = vec![0.0; n];
	global::instance()
		.host_stream()
		.uniform(&mut out, 0.0, 1.0)
		.unwrap();
	out
}

fn draw_device(n: usize) -> Vec<f32> {
	let mut out = vec![0.0; n];
	global::instance()
		.device_generator()
		.generate_uniform(&mut out)
		.unwrap();
	out
}

#[test]
fn test_global_lifecycle() {
	brew_utils::tracing::init_tracing();

	// Lazy construction happens once, whichever thread gets there first.
	assert!(global::try_instance().is_none());
	let ids = (0..8)
		.map(|_| thread::spawn(|| global::instance().linalg_handle().id()))
		.collect::<Vec<_>>()
		.into_iter()
		.map(|handle| handle.join().unwrap())
		.collect::<Vec<_>>();
	assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));

	let context = global::instance();
	assert!(Arc::ptr_eq(&context, &global::instance()));
	assert_eq!(context.library().name(), "software");
	assert_eq!(context.host_stream().seed(), DEFAULT_SEED);

	// Defaults, then the switch laws through the free functions.
	assert_eq!(global::backend(), Backend::Host);
	assert_eq!(global::phase(), Phase::Train);
	global::set_backend(Backend::Accelerator);
	assert_eq!(global::backend(), Backend::Accelerator);
	global::set_backend(Backend::Host);
	assert_eq!(global::backend(), Backend::Host);
	global::set_phase(Phase::Evaluate);
	assert_eq!(global::phase(), Phase::Evaluate);
	global::set_phase(Phase::Train);
	assert_eq!(global::phase(), Phase::Train);

	// Seed 42 twice yields the same draws from both subsystems.
	global::set_random_seed(42);
	let (host, device) = (draw_host(32), draw_device(32));
	global::set_random_seed(42);
	assert_eq!(draw_host(32), host);
	assert_eq!(draw_device(32), device);

	// An explicit init is rejected while a context is installed.
	assert_matches!(
		global::init(SoftwareLibrary::new(), ContextConfig::default()),
		Err(Error::AlreadyInitialized)
	);

	drop(context);
	global::shutdown().unwrap();
	assert!(global::try_instance().is_none());
	assert_matches!(global::shutdown(), Err(Error::NotInitialized));

	// Explicit init with an injected library; shutdown releases its handles.
	let library = SoftwareLibrary::new();
	let config = ContextConfig::new().with_phase(Phase::Evaluate).with_seed(3);
	let context = global::init(library.clone(), config).unwrap();
	assert_eq!(global::phase(), Phase::Evaluate);
	assert_eq!(global::instance().device_generator().seed(), 3);

	global::set_random_seed(4);
	assert_eq!(library.calls(NativeOp::ReseedHostStream), 1);

	// A reference held elsewhere defers the release until it is dropped.
	global::shutdown().unwrap();
	assert_eq!(library.stats().live(), 3);

	// Meanwhile a new instance is a distinct context with its own handles.
	let second = global::instance();
	assert!(!Arc::ptr_eq(&second, &context));
	assert_ne!(second.library().name(), "");
	drop(second);
	global::shutdown().unwrap();
	assert_eq!(library.stats().live(), 3);

	drop(context);
	assert_eq!(library.stats().live(), 0);
}
