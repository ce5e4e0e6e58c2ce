// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

pub mod faulty;
pub mod tempdir;

pub use faulty::{FaultyStore, Operation};
use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber writing through the test harness. Respects
/// `RUST_LOG`; repeated calls are no-ops.
pub fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_test_writer()
		.try_init();
}
