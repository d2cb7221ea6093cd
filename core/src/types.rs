//! Domain DTOs for the truck API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.

use serde::{Deserialize, Serialize};

/// A registered truck as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Truck {
    pub id: i64,
    pub license_plate: String,
    pub brand: String,
    pub model: String,
    pub manufacturing_year: i32,
    /// Decimal string computed server-side from the FIPE table, e.g. `"243652.00"`.
    pub fipe_price: String,
}

/// One entry of a FIPE catalog (brands, models or years).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FipeItem {
    pub code: String,
    pub name: String,
}

impl FipeItem {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Request payload for registering a truck.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateTruck {
    pub license_plate: String,
    pub brand: String,
    pub model: String,
    pub manufacturing_year: i32,
}

/// Request payload for editing a truck. The plate is immutable and has no
/// field here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateTruck {
    pub brand: String,
    pub model: String,
    pub manufacturing_year: i32,
}
