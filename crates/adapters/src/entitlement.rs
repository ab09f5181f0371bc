// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription entitlement

/// Whether the user may run opt-outs as well as scans
pub trait Entitlement: Clone + Send + Sync + 'static {
    fn is_entitled(&self) -> bool;
}

/// Entitlement fixed at startup
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StaticEntitlement(pub bool);

impl Entitlement for StaticEntitlement {
    fn is_entitled(&self) -> bool {
        self.0
    }
}
