//! Playground venue records
//!
//! Venue records are created once when the catalog loads and never mutated.
//! Requests share them through `Arc<VenueRecord>`.

use super::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Sun coverage over the play area
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadeLevel {
    None,
    Partial,
    Full,
}

impl ShadeLevel {
    /// One tier more coverage, saturating at `Full`
    #[must_use]
    pub fn upgraded(self) -> Self {
        match self {
            ShadeLevel::None => ShadeLevel::Partial,
            ShadeLevel::Partial | ShadeLevel::Full => ShadeLevel::Full,
        }
    }
}

/// Ground surface under the equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceMaterial {
    Rubber,
    Bark,
    Sand,
    Grass,
    SyntheticTurf,
    Concrete,
}

impl SurfaceMaterial {
    /// Surfaces that soak up heat and get uncomfortable underfoot
    #[must_use]
    pub fn retains_heat(self) -> bool {
        matches!(
            self,
            SurfaceMaterial::Rubber | SurfaceMaterial::SyntheticTurf | SurfaceMaterial::Concrete
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facility {
    Toilets,
    Bbq,
    WaterFountain,
    PicnicTables,
    Parking,
    Fenced,
    Cafe,
    BabyChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    Swings,
    Slides,
    ClimbingFrame,
    Sandpit,
    FlyingFox,
    Spinner,
    WaterPlay,
    BalanceBeam,
    Trampoline,
}

/// Age suitability tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    Toddler,
    Kinder,
    Primary,
    Older,
}

/// A playground from the venue catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub suburb: Option<String>,
    pub coordinate: Coordinate,
    pub shade: ShadeLevel,
    #[serde(default)]
    pub has_covered_structure: bool,
    #[serde(default)]
    pub has_metal_equipment: bool,
    pub surface: SurfaceMaterial,
    #[serde(default)]
    pub facilities: BTreeSet<Facility>,
    #[serde(default)]
    pub equipment: BTreeSet<Equipment>,
    #[serde(default)]
    pub age_groups: BTreeSet<AgeGroup>,
}

impl VenueRecord {
    /// Shade used for sun exposure; a covered structure adds one tier
    #[must_use]
    pub fn effective_shade(&self) -> ShadeLevel {
        if self.has_covered_structure {
            self.shade.upgraded()
        } else {
            self.shade
        }
    }
}
