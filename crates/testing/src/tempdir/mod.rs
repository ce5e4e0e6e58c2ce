// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{env, fs, path::Path};

use uuid::Uuid;

/// Runs `f` with a fresh directory that is removed afterwards, whatever
/// `f` returns.
pub fn temp_dir<F, T, E>(f: F) -> Result<T, E>
where
	F: FnOnce(&Path) -> Result<T, E>,
	E: From<std::io::Error>,
{
	let mut path = env::temp_dir();
	path.push(format!("tabula-{}", Uuid::new_v4()));

	fs::create_dir(&path)?;
	let result = f(&path);

	let _ = fs::remove_dir_all(&path);
	result
}
