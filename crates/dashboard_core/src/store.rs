use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use shared::{
    domain::{Domain, RequestToken},
    error::FetchError,
    payload::DomainPayload,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceStatus {
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// The versioned state container for one domain. Transitions always produce
/// a new value; `version` changes on every applied transition while
/// `data_version` changes only when a settlement lands, so derived views can
/// key their caches on settled content alone.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainSlice {
    pub status: SliceStatus,
    pub data: Option<Arc<DomainPayload>>,
    pub error: Option<FetchError>,
    pub last_request_token: Option<RequestToken>,
    pub version: u64,
    pub data_version: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for DomainSlice {
    fn default() -> Self {
        Self {
            status: SliceStatus::Idle,
            data: None,
            error: None,
            last_request_token: None,
            version: 0,
            data_version: 0,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum SliceEvent {
    RequestStarted {
        token: RequestToken,
    },
    RequestSucceeded {
        token: RequestToken,
        payload: DomainPayload,
    },
    RequestFailed {
        token: RequestToken,
        error: FetchError,
    },
}

/// What applying a [`SliceEvent`] did, used by the orchestrator for registry
/// bookkeeping and event publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Started,
    Settled,
    Stale,
}

impl DomainSlice {
    /// Pure transition function. A start supersedes any outstanding token;
    /// a settlement is applied only if its token still matches, otherwise the
    /// slice is returned untouched.
    pub fn apply(&self, domain: Domain, event: SliceEvent) -> (DomainSlice, Applied) {
        match event {
            SliceEvent::RequestStarted { token } => {
                let mut next = self.clone();
                next.status = SliceStatus::Loading;
                next.last_request_token = Some(token);
                next.version += 1;
                (next, Applied::Started)
            }
            SliceEvent::RequestSucceeded { token, payload } => {
                if !self.accepts(token) {
                    debug!(domain = %domain, token = %token, "store: stale success discarded");
                    return (self.clone(), Applied::Stale);
                }
                let mut next = self.clone();
                next.status = SliceStatus::Succeeded;
                next.data = Some(Arc::new(payload));
                next.error = None;
                next.version += 1;
                next.data_version += 1;
                next.updated_at = Some(Utc::now());
                (next, Applied::Settled)
            }
            SliceEvent::RequestFailed { token, error } => {
                if !self.accepts(token) {
                    debug!(domain = %domain, token = %token, "store: stale failure discarded");
                    return (self.clone(), Applied::Stale);
                }
                let mut next = self.clone();
                next.status = SliceStatus::Failed;
                next.error = Some(error);
                next.version += 1;
                next.data_version += 1;
                next.updated_at = Some(Utc::now());
                (next, Applied::Settled)
            }
        }
    }

    fn accepts(&self, token: RequestToken) -> bool {
        self.status == SliceStatus::Loading && self.last_request_token == Some(token)
    }
}

/// All domain slices, created `Idle` at construction and never destroyed.
#[derive(Debug)]
pub struct SliceStore {
    slices: HashMap<Domain, DomainSlice>,
}

impl Default for SliceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SliceStore {
    pub fn new() -> Self {
        let slices = Domain::ALL
            .into_iter()
            .map(|domain| (domain, DomainSlice::default()))
            .collect();
        Self { slices }
    }

    pub fn get(&self, domain: Domain) -> &DomainSlice {
        self.slices
            .get(&domain)
            .unwrap_or_else(|| unreachable!("slice exists for every domain"))
    }

    /// Applies the event to the addressed slice, replacing it with the new
    /// immutable value.
    pub fn apply(&mut self, domain: Domain, event: SliceEvent) -> Applied {
        let (next, applied) = self.get(domain).apply(domain, event);
        self.slices.insert(domain, next);
        applied
    }
}
