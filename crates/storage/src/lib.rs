// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ul-storage: JSON-file persistence for the unlist agent

mod definitions;
mod file;
mod repository;
mod state;

pub use definitions::{load_definitions, FAKE_PREFIX};
pub use file::{StateFile, StorageError};
pub use repository::JsonRepository;
pub use state::StoredState;
