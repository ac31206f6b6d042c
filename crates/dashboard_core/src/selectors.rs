use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use shared::{
    domain::{AffordabilityUnitSize, Demographic, Domain, NeighborhoodId, RentUnitSize},
    payload::DomainPayload,
};

use crate::params::Parameters;
use crate::store::SliceStore;

/// Full-time hours assumed when turning the hourly income slider into a
/// monthly figure.
const HOURS_PER_MONTH: f64 = 160.0;
/// Standard rent-burden threshold: housing is affordable when rent stays at
/// or below this share of monthly income.
const RENT_BURDEN_RATIO: f64 = 0.3;

/// One neighborhood as presentation consumes it: the roster entry joined
/// with the rent and affordability slices and the client-side income filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborhoodView {
    pub neighborhood_id: NeighborhoodId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_average_income: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_can_afford: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_can_afford: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CombinedNeighborhoods {
    pub neighborhoods: Vec<NeighborhoodView>,
}

/// Identity of the selector's inputs: settled content per source slice plus
/// the scalar parameter values. Equal keys guarantee an equal (and in fact
/// the identical, cached) output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    affordability_data: u64,
    rent_data: u64,
    neighborhoods_data: u64,
    income_bits: u64,
    user_unit_size: RentUnitSize,
    other_unit_size: AffordabilityUnitSize,
    other_demographic: Demographic,
}

impl CacheKey {
    fn capture(slices: &SliceStore, params: &Parameters) -> Self {
        Self {
            affordability_data: slices.get(Domain::Affordability).data_version,
            rent_data: slices.get(Domain::Rent).data_version,
            neighborhoods_data: slices.get(Domain::Neighborhoods).data_version,
            income_bits: params.user_income.to_bits(),
            user_unit_size: params.user_unit_size,
            other_unit_size: params.other_unit_size,
            other_demographic: params.other_demographic,
        }
    }
}

/// Memoized wrapper around [`combine`]. Returns the previously computed
/// `Arc` untouched while the cache key is unchanged, so downstream consumers
/// can use identity comparison to skip re-renders.
#[derive(Debug, Default)]
pub struct CombinedNeighborhoodsSelector {
    cached: Option<(CacheKey, Arc<CombinedNeighborhoods>)>,
    recompute_count: u64,
}

impl CombinedNeighborhoodsSelector {
    pub fn select(
        &mut self,
        slices: &SliceStore,
        params: &Parameters,
    ) -> Arc<CombinedNeighborhoods> {
        let key = CacheKey::capture(slices, params);
        if let Some((cached_key, cached_view)) = &self.cached {
            if *cached_key == key {
                return Arc::clone(cached_view);
            }
        }

        let view = Arc::new(combine(slices, params));
        self.recompute_count += 1;
        debug!(
            recompute = self.recompute_count,
            neighborhoods = view.neighborhoods.len(),
            "selectors: combined view recomputed"
        );
        self.cached = Some((key, Arc::clone(&view)));
        view
    }

    /// Number of times the combined view was actually recomputed, exposed so
    /// callers (and tests) can verify memoization.
    pub fn recompute_count(&self) -> u64 {
        self.recompute_count
    }
}

/// Pure combination of the three housing slices and the parameters. Reads,
/// never writes; deterministic in its inputs.
pub fn combine(slices: &SliceStore, params: &Parameters) -> CombinedNeighborhoods {
    let Some(DomainPayload::Neighborhoods(roster)) =
        slices.get(Domain::Neighborhoods).data.as_deref()
    else {
        return CombinedNeighborhoods::default();
    };

    let rents: HashMap<NeighborhoodId, f64> = match slices.get(Domain::Rent).data.as_deref() {
        Some(DomainPayload::Rent(records)) => records
            .iter()
            .filter(|record| record.unit_size == params.user_unit_size)
            .map(|record| (record.neighborhood_id, record.average_rent))
            .collect(),
        _ => HashMap::new(),
    };

    let affordability: HashMap<NeighborhoodId, (f64, bool)> =
        match slices.get(Domain::Affordability).data.as_deref() {
            Some(DomainPayload::Affordability(records)) => records
                .iter()
                .filter(|record| {
                    record.demographic == params.other_demographic
                        && record.unit_size == params.other_unit_size
                })
                .map(|record| {
                    (
                        record.neighborhood_id,
                        (record.average_hourly_income, record.can_afford),
                    )
                })
                .collect(),
            _ => HashMap::new(),
        };

    let monthly_budget = params.user_income * HOURS_PER_MONTH * RENT_BURDEN_RATIO;

    let neighborhoods = roster
        .iter()
        .map(|summary| {
            let average_rent = rents.get(&summary.neighborhood_id).copied();
            let other = affordability.get(&summary.neighborhood_id).copied();
            NeighborhoodView {
                neighborhood_id: summary.neighborhood_id,
                name: summary.name.clone(),
                average_rent,
                other_average_income: other.map(|(income, _)| income),
                other_can_afford: other.map(|(_, can_afford)| can_afford),
                user_can_afford: average_rent.map(|rent| rent <= monthly_budget),
            }
        })
        .collect();

    CombinedNeighborhoods { neighborhoods }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SliceEvent;
    use shared::domain::RequestToken;
    use shared::payload::{AffordabilityRecord, NeighborhoodSummary, RentRecord};

    fn settled(store: &mut SliceStore, payload: DomainPayload) {
        let domain = payload.domain();
        let token = RequestToken::new();
        store.apply(domain, SliceEvent::RequestStarted { token });
        store.apply(domain, SliceEvent::RequestSucceeded { token, payload });
    }

    fn populated_store() -> SliceStore {
        let mut store = SliceStore::new();
        settled(
            &mut store,
            DomainPayload::Neighborhoods(vec![
                NeighborhoodSummary {
                    neighborhood_id: NeighborhoodId(1),
                    name: "Montavilla".to_string(),
                    centroid: None,
                },
                NeighborhoodSummary {
                    neighborhood_id: NeighborhoodId(2),
                    name: "Pearl".to_string(),
                    centroid: None,
                },
            ]),
        );
        settled(
            &mut store,
            DomainPayload::Rent(vec![
                RentRecord {
                    neighborhood_id: NeighborhoodId(1),
                    unit_size: RentUnitSize::Studio,
                    average_rent: 900.0,
                },
                RentRecord {
                    neighborhood_id: NeighborhoodId(2),
                    unit_size: RentUnitSize::Studio,
                    average_rent: 1800.0,
                },
                RentRecord {
                    neighborhood_id: NeighborhoodId(2),
                    unit_size: RentUnitSize::TwoBedroom,
                    average_rent: 2600.0,
                },
            ]),
        );
        settled(
            &mut store,
            DomainPayload::Affordability(vec![AffordabilityRecord {
                neighborhood_id: NeighborhoodId(1),
                demographic: Demographic::AllHouseholds,
                unit_size: AffordabilityUnitSize::OneBedroom,
                average_hourly_income: 22.5,
                can_afford: true,
            }]),
        );
        store
    }

    #[test]
    fn joins_roster_with_rent_and_affordability() {
        let store = populated_store();
        let view = combine(&store, &Parameters::default());

        assert_eq!(view.neighborhoods.len(), 2);
        let montavilla = &view.neighborhoods[0];
        assert_eq!(montavilla.average_rent, Some(900.0));
        assert_eq!(montavilla.other_average_income, Some(22.5));
        assert_eq!(montavilla.other_can_afford, Some(true));

        let pearl = &view.neighborhoods[1];
        assert_eq!(pearl.average_rent, Some(1800.0));
        assert_eq!(pearl.other_can_afford, None);
    }

    #[test]
    fn income_filter_is_applied_client_side() {
        let store = populated_store();
        let mut params = Parameters::default();

        // $15/hr: 15 * 160 * 0.3 = $720/month budget, below both rents
        params.set_user_income(15.0).expect("income");
        let view = combine(&store, &params);
        assert_eq!(view.neighborhoods[0].user_can_afford, Some(false));
        assert_eq!(view.neighborhoods[1].user_can_afford, Some(false));

        // $25/hr budgets $1200/month, enough for Montavilla only
        params.set_user_income(25.0).expect("income");
        let view = combine(&store, &params);
        assert_eq!(view.neighborhoods[0].user_can_afford, Some(true));
        assert_eq!(view.neighborhoods[1].user_can_afford, Some(false));
    }

    #[test]
    fn missing_roster_yields_empty_view() {
        let store = SliceStore::new();
        let view = combine(&store, &Parameters::default());
        assert!(view.neighborhoods.is_empty());
    }

    #[test]
    fn unchanged_inputs_return_the_cached_reference() {
        let store = populated_store();
        let params = Parameters::default();
        let mut selector = CombinedNeighborhoodsSelector::default();

        let first = selector.select(&store, &params);
        let second = selector.select(&store, &params);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(selector.recompute_count(), 1);
    }

    #[test]
    fn parameter_change_invalidates_the_cache() {
        let store = populated_store();
        let mut params = Parameters::default();
        let mut selector = CombinedNeighborhoodsSelector::default();

        let first = selector.select(&store, &params);
        params.set_user_income(40.0).expect("income");
        let second = selector.select(&store, &params);

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(selector.recompute_count(), 2);
    }

    #[test]
    fn settlement_invalidates_the_cache() {
        let mut store = populated_store();
        let params = Parameters::default();
        let mut selector = CombinedNeighborhoodsSelector::default();

        selector.select(&store, &params);
        settled(
            &mut store,
            DomainPayload::Rent(vec![RentRecord {
                neighborhood_id: NeighborhoodId(1),
                unit_size: RentUnitSize::Studio,
                average_rent: 950.0,
            }]),
        );
        let refreshed = selector.select(&store, &params);

        assert_eq!(selector.recompute_count(), 2);
        assert_eq!(refreshed.neighborhoods[0].average_rent, Some(950.0));
    }

    #[test]
    fn loading_transition_alone_does_not_invalidate() {
        let mut store = populated_store();
        let params = Parameters::default();
        let mut selector = CombinedNeighborhoodsSelector::default();

        let first = selector.select(&store, &params);
        store.apply(
            Domain::Rent,
            SliceEvent::RequestStarted {
                token: RequestToken::new(),
            },
        );
        let second = selector.select(&store, &params);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(selector.recompute_count(), 1);
    }
}
