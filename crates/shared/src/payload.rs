use serde::{Deserialize, Serialize};

use crate::domain::{
    AffordabilityUnitSize, Demographic, Domain, IncidentId, NeighborhoodId, RentUnitSize,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodSummary {
    pub neighborhood_id: NeighborhoodId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub centroid: Option<Centroid>,
}

/// Average observed rent for one unit size in one neighborhood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentRecord {
    pub neighborhood_id: NeighborhoodId,
    pub unit_size: RentUnitSize,
    pub average_rent: f64,
}

/// Affordability of one unit size for one demographic in one neighborhood.
/// `can_afford` is computed upstream from census income tables; the core only
/// transports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityRecord {
    pub neighborhood_id: NeighborhoodId,
    pub demographic: Demographic,
    pub unit_size: AffordabilityUnitSize,
    pub average_hourly_income: f64,
    pub can_afford: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireIncident {
    pub incident_id: IncidentId,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood_id: Option<NeighborhoodId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_level: Option<u8>,
}

/// The opaque per-domain payload carried by a slice. The store and the
/// orchestrator transport it without inspecting internals; only selectors
/// and presentation read through the variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", content = "records", rename_all = "snake_case")]
pub enum DomainPayload {
    Affordability(Vec<AffordabilityRecord>),
    Rent(Vec<RentRecord>),
    Neighborhoods(Vec<NeighborhoodSummary>),
    FireIncidents(Vec<FireIncident>),
}

impl DomainPayload {
    pub fn domain(&self) -> Domain {
        match self {
            DomainPayload::Affordability(_) => Domain::Affordability,
            DomainPayload::Rent(_) => Domain::Rent,
            DomainPayload::Neighborhoods(_) => Domain::Neighborhoods,
            DomainPayload::FireIncidents(_) => Domain::FireIncidents,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DomainPayload::Affordability(records) => records.len(),
            DomainPayload::Rent(records) => records.len(),
            DomainPayload::Neighborhoods(records) => records.len(),
            DomainPayload::FireIncidents(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
