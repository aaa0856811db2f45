//! # Capabilities
//!
//! Who may do what. Each staff role carries a fixed set of capability
//! strings; screens ask for a capability, never for a role.
//!
//! ## Role Grants
//! ```text
//! ┌──────────────────────┬─────────────┬───────────────────┬─────────┐
//! │ capability           │ shop_owner  │ warehouse_manager │ cashier │
//! ├──────────────────────┼─────────────┼───────────────────┼─────────┤
//! │ inventory.view       │      ✓      │         ✓         │    ✓    │
//! │ inventory.create     │      ✓      │         ✓         │         │
//! │ inventory.update     │      ✓      │         ✓         │         │
//! │ inventory.delete     │      ✓      │         ✓         │         │
//! │ categories.*         │      ✓      │         ✓         │         │
//! │ reports.inventory    │      ✓      │         ✓         │         │
//! │ pos.view, pos.create │      ✓      │                   │    ✓    │
//! │ reports.view         │      ✓      │                   │         │
//! │ users.*              │      ✓      │                   │         │
//! └──────────────────────┴─────────────┴───────────────────┴─────────┘
//! ```
//!
//! The sale transaction itself does not look at capabilities; gating happens
//! at the surface that calls it.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::Role;

// =============================================================================
// Capability
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Capability {
    #[serde(rename = "inventory.view")]
    InventoryView,
    #[serde(rename = "inventory.create")]
    InventoryCreate,
    #[serde(rename = "inventory.update")]
    InventoryUpdate,
    #[serde(rename = "inventory.delete")]
    InventoryDelete,
    #[serde(rename = "pos.view")]
    PosView,
    #[serde(rename = "pos.create")]
    PosCreate,
    #[serde(rename = "reports.view")]
    ReportsView,
    #[serde(rename = "reports.inventory")]
    ReportsInventory,
    #[serde(rename = "users.view")]
    UsersView,
    #[serde(rename = "users.create")]
    UsersCreate,
    #[serde(rename = "users.update")]
    UsersUpdate,
    #[serde(rename = "users.delete")]
    UsersDelete,
    #[serde(rename = "categories.view")]
    CategoriesView,
    #[serde(rename = "categories.create")]
    CategoriesCreate,
    #[serde(rename = "categories.update")]
    CategoriesUpdate,
    #[serde(rename = "categories.delete")]
    CategoriesDelete,
}

impl Capability {
    pub const ALL: [Capability; 16] = [
        Capability::InventoryView,
        Capability::InventoryCreate,
        Capability::InventoryUpdate,
        Capability::InventoryDelete,
        Capability::PosView,
        Capability::PosCreate,
        Capability::ReportsView,
        Capability::ReportsInventory,
        Capability::UsersView,
        Capability::UsersCreate,
        Capability::UsersUpdate,
        Capability::UsersDelete,
        Capability::CategoriesView,
        Capability::CategoriesCreate,
        Capability::CategoriesUpdate,
        Capability::CategoriesDelete,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Capability::InventoryView => "inventory.view",
            Capability::InventoryCreate => "inventory.create",
            Capability::InventoryUpdate => "inventory.update",
            Capability::InventoryDelete => "inventory.delete",
            Capability::PosView => "pos.view",
            Capability::PosCreate => "pos.create",
            Capability::ReportsView => "reports.view",
            Capability::ReportsInventory => "reports.inventory",
            Capability::UsersView => "users.view",
            Capability::UsersCreate => "users.create",
            Capability::UsersUpdate => "users.update",
            Capability::UsersDelete => "users.delete",
            Capability::CategoriesView => "categories.view",
            Capability::CategoriesCreate => "categories.create",
            Capability::CategoriesUpdate => "categories.update",
            Capability::CategoriesDelete => "categories.delete",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|cap| cap.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "capability".to_string(),
                allowed: Capability::ALL.iter().map(|c| c.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Role Grants
// =============================================================================

const WAREHOUSE_MANAGER: &[Capability] = &[
    Capability::InventoryView,
    Capability::InventoryCreate,
    Capability::InventoryUpdate,
    Capability::InventoryDelete,
    Capability::ReportsInventory,
    Capability::CategoriesView,
    Capability::CategoriesCreate,
    Capability::CategoriesUpdate,
    Capability::CategoriesDelete,
];

const CASHIER: &[Capability] = &[
    Capability::PosView,
    Capability::PosCreate,
    Capability::InventoryView,
];

impl Role {
    pub fn capabilities(&self) -> CapabilitySet {
        match self {
            Role::ShopOwner => Capability::ALL.into_iter().collect(),
            Role::WarehouseManager => WAREHOUSE_MANAGER.iter().copied().collect(),
            Role::Cashier => CASHIER.iter().copied().collect(),
        }
    }

    #[inline]
    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities().contains(capability)
    }
}

/// The capabilities held by one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    #[inline]
    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }

    /// Dashboard slices these capabilities unlock, in display order.
    pub fn dashboard_slices(&self) -> Vec<DashboardSlice> {
        DashboardSlice::ALL
            .into_iter()
            .filter(|slice| self.contains(slice.required_capability()))
            .collect()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        CapabilitySet(iter.into_iter().collect())
    }
}

// =============================================================================
// Dashboard Slices
// =============================================================================

/// Optional dashboard panels, each behind one capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DashboardSlice {
    /// Latest stock movements.
    StockMovements,
    /// Active products at or below their threshold.
    LowStockAlerts,
    /// Latest sales.
    RecentSales,
}

impl DashboardSlice {
    pub const ALL: [DashboardSlice; 3] = [
        DashboardSlice::StockMovements,
        DashboardSlice::LowStockAlerts,
        DashboardSlice::RecentSales,
    ];

    pub const fn required_capability(&self) -> Capability {
        match self {
            DashboardSlice::StockMovements | DashboardSlice::LowStockAlerts => {
                Capability::InventoryUpdate
            }
            DashboardSlice::RecentSales => Capability::PosView,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
