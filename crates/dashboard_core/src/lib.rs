//! Asynchronous multi-source state orchestration for the civic dashboard.
//!
//! Parameter changes route to a minimal set of domain fetches; each fetch is
//! correlated back to its slice by token, so out-of-order settlements never
//! leave stale data behind. All mutable state lives behind one dispatch path
//! and presentation reads immutable snapshots, pending-call counts, and
//! memoized combined views.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use shared::{
    domain::{AffordabilityUnitSize, Demographic, Domain, RentUnitSize, RequestToken},
    error::FetchError,
    payload::DomainPayload,
};

pub mod params;
pub mod registry;
pub mod routing;
pub mod selectors;
pub mod store;

pub use params::{ParameterField, Parameters, ValidationError};
pub use registry::PendingCalls;
pub use routing::RoutingTable;
pub use selectors::{CombinedNeighborhoods, CombinedNeighborhoodsSelector, NeighborhoodView};
pub use store::{DomainSlice, SliceStatus};

use selectors::CombinedNeighborhoodsSelector as Selector;
use store::{Applied, SliceEvent, SliceStore};

/// Injected per-domain fetch dependency. The core is agnostic to transport,
/// authentication, and payload provenance; implementations live outside this
/// crate and are wired in by the embedding application.
#[async_trait]
pub trait DomainFetcher: Send + Sync {
    async fn fetch_domain(
        &self,
        domain: Domain,
        params: &Parameters,
    ) -> Result<DomainPayload, FetchError>;
}

/// Null implementation used when no upstream is wired in.
pub struct MissingDomainFetcher;

#[async_trait]
impl DomainFetcher for MissingDomainFetcher {
    async fn fetch_domain(
        &self,
        domain: Domain,
        _params: &Parameters,
    ) -> Result<DomainPayload, FetchError> {
        Err(FetchError::unavailable(format!(
            "no upstream fetcher configured for domain {domain}"
        )))
    }
}

/// Notifications published to presentation consumers. Receivers may lag;
/// state reads always go through the snapshot surface, events only signal
/// that something changed.
#[derive(Debug, Clone)]
pub enum CoreEvent {
    ParametersChanged { field: ParameterField },
    SliceUpdated { domain: Domain, status: SliceStatus },
    StaleResponseDiscarded { domain: Domain },
}

struct StoreState {
    parameters: Parameters,
    slices: SliceStore,
    pending: PendingCalls,
    selector: Selector,
}

impl StoreState {
    fn new() -> Self {
        Self {
            parameters: Parameters::default(),
            slices: SliceStore::new(),
            pending: PendingCalls::new(),
            selector: Selector::default(),
        }
    }

    /// The single mutation entry point for slice state. Registry bookkeeping
    /// rides along with the transition so increment/decrement stay balanced
    /// per dispatched fetch, stale settlements included.
    fn dispatch(&mut self, domain: Domain, event: SliceEvent) -> Applied {
        let settlement = !matches!(&event, SliceEvent::RequestStarted { .. });
        let applied = self.slices.apply(domain, event);
        if settlement {
            self.pending.decrement(domain);
        } else {
            self.pending.increment(domain);
        }
        applied
    }
}

/// The central store plus fetch orchestrator. Owns parameters, slices, and
/// the pending-call registry exclusively; network calls run on spawned tasks
/// and re-enter only through settlement dispatches.
pub struct DashboardCore {
    fetcher: Arc<dyn DomainFetcher>,
    routing: RoutingTable,
    inner: Mutex<StoreState>,
    events: broadcast::Sender<CoreEvent>,
}

impl DashboardCore {
    pub fn new(fetcher: Arc<dyn DomainFetcher>) -> Arc<Self> {
        Self::new_with_routing(fetcher, RoutingTable::default())
    }

    pub fn new_with_routing(fetcher: Arc<dyn DomainFetcher>, routing: RoutingTable) -> Arc<Self> {
        let (events, _) = broadcast::channel(1024);
        Arc::new(Self {
            fetcher,
            routing,
            inner: Mutex::new(StoreState::new()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CoreEvent> {
        self.events.subscribe()
    }

    // ---- read surface (immutable snapshots) ----

    pub async fn parameters(&self) -> Parameters {
        self.inner.lock().await.parameters.clone()
    }

    pub async fn slice(&self, domain: Domain) -> DomainSlice {
        self.inner.lock().await.slices.get(domain).clone()
    }

    pub async fn is_pending(&self, domain: Domain) -> bool {
        self.inner.lock().await.pending.is_pending(domain)
    }

    pub async fn is_any_pending(&self) -> bool {
        self.inner.lock().await.pending.is_any_pending()
    }

    /// Memoized combined view over the housing slices and parameters.
    /// Unchanged inputs return the identical `Arc`.
    pub async fn combined_neighborhoods(&self) -> Arc<CombinedNeighborhoods> {
        let mut guard = self.inner.lock().await;
        let state = &mut *guard;
        state.selector.select(&state.slices, &state.parameters)
    }

    /// How many times the combined view was recomputed; diagnostic surface
    /// for memoization checks.
    pub async fn combined_recompute_count(&self) -> u64 {
        self.inner.lock().await.selector.recompute_count()
    }

    // ---- write surface (user input) ----

    pub async fn set_user_income(self: &Arc<Self>, income: f64) -> Result<(), ValidationError> {
        {
            let mut guard = self.inner.lock().await;
            guard.parameters.set_user_income(income)?;
        }
        self.parameter_changed(ParameterField::UserIncome).await;
        Ok(())
    }

    pub async fn set_user_unit_size(self: &Arc<Self>, size: RentUnitSize) {
        {
            let mut guard = self.inner.lock().await;
            guard.parameters.set_user_unit_size(size);
        }
        self.parameter_changed(ParameterField::UserUnitSize).await;
    }

    pub async fn set_other_unit_size(self: &Arc<Self>, size: AffordabilityUnitSize) {
        {
            let mut guard = self.inner.lock().await;
            guard.parameters.set_other_unit_size(size);
        }
        self.parameter_changed(ParameterField::OtherUnitSize).await;
    }

    pub async fn set_other_demographic(self: &Arc<Self>, demographic: Demographic) {
        {
            let mut guard = self.inner.lock().await;
            guard.parameters.set_other_demographic(demographic);
        }
        self.parameter_changed(ParameterField::OtherDemographic).await;
    }

    // ---- orchestration ----

    /// Initial-mount trigger: fetches every domain in the routing table's
    /// initial-load set.
    pub async fn load_all(self: &Arc<Self>) {
        info!(domains = self.routing.initial_load.len(), "fetch: initial load");
        for domain in self.routing.initial_load.clone() {
            self.start_fetch(domain).await;
        }
    }

    /// Re-issues the fetch for one domain with the current parameters; the
    /// retry affordance for a slice stuck in `Failed`.
    pub async fn refresh_domain(self: &Arc<Self>, domain: Domain) {
        self.start_fetch(domain).await;
    }

    async fn parameter_changed(self: &Arc<Self>, field: ParameterField) {
        info!(field = %field, "params: parameter updated");
        self.publish(CoreEvent::ParametersChanged { field });
        for domain in self.routing.domains_for(field).to_vec() {
            self.start_fetch(domain).await;
        }
    }

    async fn start_fetch(self: &Arc<Self>, domain: Domain) {
        let token = RequestToken::new();
        let params = {
            let mut guard = self.inner.lock().await;
            guard.dispatch(domain, SliceEvent::RequestStarted { token });
            guard.parameters.clone()
        };
        info!(domain = %domain, token = %token, "fetch: request started");
        self.publish(CoreEvent::SliceUpdated {
            domain,
            status: SliceStatus::Loading,
        });

        let core = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = core.fetcher.fetch_domain(domain, &params).await;
            core.settle(domain, token, outcome).await;
        });
    }

    async fn settle(
        &self,
        domain: Domain,
        token: RequestToken,
        outcome: Result<DomainPayload, FetchError>,
    ) {
        let event = match outcome {
            Ok(payload) => SliceEvent::RequestSucceeded { token, payload },
            Err(error) => {
                warn!(domain = %domain, error = %error, "fetch: request failed");
                SliceEvent::RequestFailed { token, error }
            }
        };

        let (applied, status) = {
            let mut guard = self.inner.lock().await;
            let applied = guard.dispatch(domain, event);
            (applied, guard.slices.get(domain).status)
        };

        match applied {
            Applied::Settled => {
                info!(domain = %domain, status = ?status, "fetch: request settled");
                self.publish(CoreEvent::SliceUpdated { domain, status });
            }
            Applied::Stale => {
                debug!(domain = %domain, token = %token, "fetch: superseded response dropped");
                self.publish(CoreEvent::StaleResponseDiscarded { domain });
            }
            Applied::Started => unreachable!("settlement events never start a request"),
        }
    }

    fn publish(&self, event: CoreEvent) {
        // nobody subscribed is fine
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
