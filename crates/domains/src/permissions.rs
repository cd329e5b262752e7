//! # Permissions
//!
//! Staff capabilities are a compact bitset. Board-scoped sets are computed by
//! the session layer from the board's staff map; global staff carry the
//! `ManageGlobal*` bits everywhere.

use serde::{Deserialize, Serialize};

/// A single named capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Permission {
    ManageGlobalGeneral = 0,
    ManageGlobalBans = 1,
    ManageBoardGeneral = 2,
    ManageBoardBans = 3,
    ManageBoardLogs = 4,
}

impl Permission {
    const fn bit(self) -> u64 {
        1 << (self as u64)
    }
}

/// An actor's capability set, scoped to the board a request targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(u64);

impl PermissionSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn has(&self, permission: Permission) -> bool {
        self.0 & permission.bit() != 0
    }

    pub fn grant(&mut self, permission: Permission) {
        self.0 |= permission.bit();
    }

    #[must_use]
    pub const fn with(self, permission: Permission) -> Self {
        Self(self.0 | permission.bit())
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}
