use crate::apis::build_url;
use crate::client::{HttpFetch, UpstreamRequest};
use crate::common::constants::{DPD_CARRIER, DPD_DEFAULT_LOCALE, DPD_DETAILS_URL};
use crate::common::error::{Result, TrackerError};
use crate::common::types::{CarrierApi, RawTrackingData, Status, StatusInfo, TrackingInfo, TrackingQuery};
use crate::config::UpstreamConfig;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// DPD Germany, via the public parcel lifecycle REST endpoint
pub struct DpdTracker {
    fetcher: Arc<dyn HttpFetch>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct LifecycleEnvelope {
    #[serde(rename = "parcellifecycleResponse")]
    response: LifecycleResponse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LifecycleResponse {
    parcel_life_cycle_data: LifecycleData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LifecycleData {
    status_info: Vec<LifecycleEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LifecycleEntry {
    status: Option<String>,
    label: Option<String>,
    description: Option<LifecycleDescription>,
    status_has_been_reached: bool,
    is_current_status: bool,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LifecycleDescription {
    #[serde(default)]
    content: Vec<String>,
}

impl DpdTracker {
    pub fn new(fetcher: Arc<dyn HttpFetch>, upstream: &UpstreamConfig) -> Self {
        Self {
            fetcher,
            base_url: upstream.dpd_base_url.clone(),
        }
    }

    /// Redirect into DPD's tracking page; the zip saves the visitor a step there.
    pub fn details_link(parcelno: &str, zip: Option<&str>) -> Result<String> {
        let mut query = Vec::with_capacity(3);
        if let Some(zip) = zip {
            query.push(("zip", zip));
        }
        query.push(("parcelno", parcelno));
        query.push(("action", "2"));
        Ok(build_url(DPD_DETAILS_URL, &[], &query)?.to_string())
    }

    /// Maps the lifecycle array one to one, keeping upstream order.
    pub fn normalize(raw: &RawTrackingData) -> Result<StatusInfo> {
        let envelope = LifecycleEnvelope::deserialize(raw).map_err(|e| {
            TrackerError::shape(DPD_CARRIER, format!("no parcel lifecycle in response: {}", e))
        })?;

        let states = envelope
            .response
            .parcel_life_cycle_data
            .status_info
            .into_iter()
            .enumerate()
            .map(|(i, entry)| Status {
                id: i as u32,
                code: entry.status,
                name: entry.label,
                description: entry
                    .description
                    .and_then(|d| d.content.into_iter().next()),
                has_been_reached: entry.status_has_been_reached,
                is_current_status: entry.is_current_status,
                date: entry.date,
            })
            .collect();

        Ok(StatusInfo::from_states(states))
    }
}

#[async_trait::async_trait]
impl CarrierApi for DpdTracker {
    fn carrier_name(&self) -> &'static str {
        DPD_CARRIER
    }

    fn default_locale(&self) -> &'static str {
        DPD_DEFAULT_LOCALE
    }

    #[instrument(skip(self))]
    async fn track(&self, query: &TrackingQuery) -> Result<TrackingInfo> {
        let locale = query.locale_or(DPD_DEFAULT_LOCALE);
        let url = build_url(&self.base_url, &["rest", "plc", locale, query.parcelno.as_str()], &[])?;

        debug!("Fetching DPD lifecycle for {}", query.parcelno);
        let body = self.fetcher.fetch(&UpstreamRequest::get(url)).await?;
        let raw: RawTrackingData = serde_json::from_str(&body)?;

        let status = Self::normalize(&raw)?;
        info!(
            "DPD parcel {}: {} states, current {:?}",
            query.parcelno, status.states_count, status.current_state
        );

        let details_link = Self::details_link(&query.parcelno, query.zip.as_deref())?;
        Ok(TrackingInfo::new(query, details_link, status, raw))
    }
}
