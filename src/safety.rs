// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Panic containment.
//!
//! Calls into the vision and graphics libraries, and every JNI entry point,
//! run inside [`contain`] so a panic surfaces as
//! [`Error::ExternalLibrary`] instead of unwinding into the JVM.

use crate::error::{Error, Result};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Runs `f`, converting a panic into [`Error::ExternalLibrary`].
///
/// `AssertUnwindSafe` holds because shared state is guarded by
/// `parking_lot` mutexes, which do not poison, and transforms only write
/// into buffers after the external call has returned.
pub fn contain<T, F>(what: &str, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(res) => res,
        Err(panic) => {
            let msg = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!("{what}: caught panic: {msg}");
            Err(Error::ExternalLibrary(format!("{what}: {msg}")))
        }
    }
}
