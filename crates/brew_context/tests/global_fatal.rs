// Copyright 2025 Irreducible Inc.

//! Native failures behind the process-wide facade abort the process. Each scenario re-runs this
//! test binary as a child restricted to one test, and inspects how the child died.

use std::process::{Command, Output};

use brew_context::{
	global,
	native::{software::Fault, NativeOp, SoftwareLibrary, Status},
	ContextConfig,
};

const SCENARIO_ENV: &str = "BREW_FATAL_SCENARIO";

fn scenario() -> Option<String> {
	std::env::var(SCENARIO_ENV).ok()
}

fn run_child(test_name: &str) -> Output {
	Command::new(std::env::current_exe().unwrap())
		.args([test_name, "--exact", "--nocapture", "--test-threads=1"])
		.env(SCENARIO_ENV, test_name)
		.output()
		.unwrap()
}

#[test]
fn test_construction_failure_aborts() {
	if scenario().is_some() {
		let library = SoftwareLibrary::new();
		library.inject(Fault::new(NativeOp::CreateHostStream, Status::ALLOC_FAILED));
		let _context = global::init_or_abort(library, ContextConfig::default());
		// Reaching this point means no abort happened; report success so the parent fails.
		std::process::exit(0);
	}

	let output = run_child("test_construction_failure_aborts");
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(!output.status.success(), "{stderr}");
	assert!(stderr.contains("create host random stream"), "{stderr}");
	assert!(stderr.contains("ALLOC_FAILED (3)"), "{stderr}");
}

#[test]
fn test_reseed_failure_aborts() {
	if scenario().is_some() {
		let library = SoftwareLibrary::new();
		library.inject(Fault::new(NativeOp::CreateDeviceGenerator, Status::ARCH_MISMATCH).on_call(2));
		global::init_or_abort(library, ContextConfig::default());
		global::set_random_seed(11);
		std::process::exit(0);
	}

	let output = run_child("test_reseed_failure_aborts");
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(!output.status.success(), "{stderr}");
	assert!(stderr.contains("create accelerator random generator"), "{stderr}");
	assert!(stderr.contains("ARCH_MISMATCH"), "{stderr}");
}
