// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Process-wide claim-check manager registry.
//!
//! Activity workers are dispatched by name and cannot thread a manager
//! handle through the durable engine, so the process registers one manager
//! at startup and workers resolve it from here. The registry is immutable
//! after that one-time initialization.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::manager::ClaimCheckManager;

static MANAGER_INSTANCE: OnceCell<Arc<ClaimCheckManager>> = OnceCell::new();

/// Register the process-wide claim-check manager.
///
/// Call once at application startup, before any worker starts polling.
///
/// # Panics
///
/// Panics if called more than once.
pub fn register_manager(manager: Arc<ClaimCheckManager>) {
    if MANAGER_INSTANCE.set(manager).is_err() {
        panic!("claim-check manager already registered. register_manager() should only be called once.");
    }
}

/// Get the registered manager.
///
/// # Panics
///
/// Panics if no manager has been registered.
pub fn manager() -> &'static Arc<ClaimCheckManager> {
    MANAGER_INSTANCE
        .get()
        .expect("no claim-check manager registered. Call register_manager() at application startup.")
}

/// Get the registered manager, or `None` when claim-check is not enabled
/// for this process.
pub fn try_manager() -> Option<&'static Arc<ClaimCheckManager>> {
    MANAGER_INSTANCE.get()
}
