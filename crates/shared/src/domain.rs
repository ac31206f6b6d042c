use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub i64);
    };
}

id_newtype!(NeighborhoodId);
id_newtype!(IncidentId);

/// Opaque correlation id tying a fetch settlement back to the request that
/// started it. A settlement whose token no longer matches the slice's current
/// token is stale and must be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestToken(pub Uuid);

impl RequestToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One independently-fetched civic dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Affordability,
    Rent,
    Neighborhoods,
    FireIncidents,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::Affordability,
        Domain::Rent,
        Domain::Neighborhoods,
        Domain::FireIncidents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Affordability => "affordability",
            Domain::Rent => "rent",
            Domain::Neighborhoods => "neighborhoods",
            Domain::FireIncidents => "fire_incidents",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownValueError {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownValueError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Unit sizes the rent dataset is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RentUnitSize {
    #[default]
    Studio,
    OneBedroom,
    TwoBedroom,
    ThreeBedroom,
}

impl RentUnitSize {
    pub const ALL: [RentUnitSize; 4] = [
        RentUnitSize::Studio,
        RentUnitSize::OneBedroom,
        RentUnitSize::TwoBedroom,
        RentUnitSize::ThreeBedroom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RentUnitSize::Studio => "studio",
            RentUnitSize::OneBedroom => "one_bedroom",
            RentUnitSize::TwoBedroom => "two_bedroom",
            RentUnitSize::ThreeBedroom => "three_bedroom",
        }
    }
}

impl fmt::Display for RentUnitSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RentUnitSize {
    type Err = UnknownValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.as_str() == s)
            .ok_or_else(|| UnknownValueError::new("rent unit size", s))
    }
}

/// Unit sizes the affordability dataset is keyed by. The upstream census
/// tables have no studio breakdown, so this domain is narrower than
/// [`RentUnitSize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffordabilityUnitSize {
    #[default]
    OneBedroom,
    TwoBedroom,
    ThreeBedroom,
}

impl AffordabilityUnitSize {
    pub const ALL: [AffordabilityUnitSize; 3] = [
        AffordabilityUnitSize::OneBedroom,
        AffordabilityUnitSize::TwoBedroom,
        AffordabilityUnitSize::ThreeBedroom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AffordabilityUnitSize::OneBedroom => "one_bedroom",
            AffordabilityUnitSize::TwoBedroom => "two_bedroom",
            AffordabilityUnitSize::ThreeBedroom => "three_bedroom",
        }
    }
}

impl fmt::Display for AffordabilityUnitSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AffordabilityUnitSize {
    type Err = UnknownValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.as_str() == s)
            .ok_or_else(|| UnknownValueError::new("affordability unit size", s))
    }
}

/// Household demographics the affordability dataset can be filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Demographic {
    #[default]
    AllHouseholds,
    SingleMother,
    Senior,
    ForeignBorn,
    HouseholdOfColor,
}

impl Demographic {
    pub const ALL: [Demographic; 5] = [
        Demographic::AllHouseholds,
        Demographic::SingleMother,
        Demographic::Senior,
        Demographic::ForeignBorn,
        Demographic::HouseholdOfColor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Demographic::AllHouseholds => "all_households",
            Demographic::SingleMother => "single_mother",
            Demographic::Senior => "senior",
            Demographic::ForeignBorn => "foreign_born",
            Demographic::HouseholdOfColor => "household_of_color",
        }
    }
}

impl fmt::Display for Demographic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Demographic {
    type Err = UnknownValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|demo| demo.as_str() == s)
            .ok_or_else(|| UnknownValueError::new("demographic", s))
    }
}
