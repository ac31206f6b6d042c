//! HTTP client for the civic data APIs, wired into the core as its injected
//! [`DomainFetcher`]. Owns endpoint paths, query construction, and the JSON
//! result envelope; the core stays agnostic to all of it.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use dashboard_core::{DomainFetcher, Parameters};
use shared::{
    domain::Domain,
    error::FetchError,
    payload::{
        AffordabilityRecord, DomainPayload, FireIncident, NeighborhoodSummary, RentRecord,
    },
};

const NEIGHBORHOODS_PATH: &str = "housing/api/neighborhoods/";
const RENTS_PATH: &str = "housing/api/rents/";
const AFFORDABILITY_PATH: &str = "housing/api/affordability/";
const FIRE_INCIDENTS_PATH: &str = "fire/api/incidents/";

/// Standard list envelope the civic APIs wrap their rows in.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    results: Vec<T>,
}

#[derive(Debug, Clone)]
pub struct CivicApiClient {
    http: Client,
    base_url: Url,
}

impl CivicApiClient {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url).map_err(|err| {
            FetchError::unavailable(format!("invalid base url '{base_url}': {err}"))
        })?;
        Ok(Self::with_client(Client::new(), base_url))
    }

    pub fn with_client(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path)
            .map_err(|err| FetchError::unavailable(format!("invalid endpoint '{path}': {err}")))
    }

    async fn get_results<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, FetchError> {
        let response = self
            .http
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|err| FetchError::transport(format!("request to {url} failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(format!("{url} returned {status}")));
        }

        let envelope: Envelope<T> = response.json().await.map_err(|err| {
            FetchError::decode(format!("invalid response body from {url}: {err}"))
        })?;
        Ok(envelope.results)
    }

    async fn fetch_neighborhoods(&self) -> Result<DomainPayload, FetchError> {
        let records: Vec<NeighborhoodSummary> = self
            .get_results(self.endpoint(NEIGHBORHOODS_PATH)?, &[])
            .await?;
        Ok(DomainPayload::Neighborhoods(records))
    }

    async fn fetch_rents(&self, params: &Parameters) -> Result<DomainPayload, FetchError> {
        let records: Vec<RentRecord> = self
            .get_results(
                self.endpoint(RENTS_PATH)?,
                &[("unit_size", params.user_unit_size.as_str())],
            )
            .await?;
        Ok(DomainPayload::Rent(records))
    }

    async fn fetch_affordability(&self, params: &Parameters) -> Result<DomainPayload, FetchError> {
        let records: Vec<AffordabilityRecord> = self
            .get_results(
                self.endpoint(AFFORDABILITY_PATH)?,
                &[
                    ("unit_size", params.other_unit_size.as_str()),
                    ("demographic", params.other_demographic.as_str()),
                ],
            )
            .await?;
        Ok(DomainPayload::Affordability(records))
    }

    async fn fetch_fire_incidents(&self) -> Result<DomainPayload, FetchError> {
        let records: Vec<FireIncident> = self
            .get_results(self.endpoint(FIRE_INCIDENTS_PATH)?, &[])
            .await?;
        Ok(DomainPayload::FireIncidents(records))
    }
}

#[async_trait]
impl DomainFetcher for CivicApiClient {
    async fn fetch_domain(
        &self,
        domain: Domain,
        params: &Parameters,
    ) -> Result<DomainPayload, FetchError> {
        debug!(domain = %domain, "api: fetching domain");
        match domain {
            Domain::Neighborhoods => self.fetch_neighborhoods().await,
            Domain::Rent => self.fetch_rents(params).await,
            Domain::Affordability => self.fetch_affordability(params).await,
            Domain::FireIncidents => self.fetch_fire_incidents().await,
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
