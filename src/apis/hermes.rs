use crate::apis::build_url;
use crate::client::{HttpFetch, UpstreamRequest};
use crate::common::constants::{
    HERMES_CARRIER, HERMES_DEFAULT_LOCALE, HERMES_DETAILS_URL, HERMES_ORIGIN, HERMES_REFERER,
};
use crate::common::error::{Result, TrackerError};
use crate::common::types::{CarrierApi, RawTrackingData, Status, StatusInfo, TrackingInfo, TrackingQuery};
use crate::config::UpstreamConfig;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Hermes Germany. The API only answers requests that look like they come
/// from the myhermes.de tracking page.
pub struct HermesTracker {
    fetcher: Arc<dyn HttpFetch>,
    base_url: String,
    user_agent: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParcelDetails {
    status: CurrentStatus,
    parcel_history: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentStatus {
    parcel_status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryEntry {
    index: u32,
    status: String,
    short_text: Option<String>,
    next_status_short_text: Option<String>,
    status_text: Option<String>,
    is_next_status: bool,
    timestamp: Option<String>,
}

impl HermesTracker {
    pub fn new(fetcher: Arc<dyn HttpFetch>, upstream: &UpstreamConfig) -> Self {
        Self {
            fetcher,
            base_url: upstream.hermes_base_url.clone(),
            user_agent: upstream.user_agent.clone(),
        }
    }

    pub fn details_link(parcelno: &str) -> Result<String> {
        let mut url = build_url(HERMES_DETAILS_URL, &[], &[])?;
        url.set_fragment(Some(parcelno));
        Ok(url.to_string())
    }

    /// Ids come from the upstream status index rather than the array position.
    pub fn normalize(raw: &RawTrackingData) -> Result<StatusInfo> {
        let details = ParcelDetails::deserialize(raw).map_err(|e| {
            TrackerError::shape(HERMES_CARRIER, format!("no parcel history in response: {}", e))
        })?;

        let current_code = details.status.parcel_status;
        let mut current_seen = false;
        let states = details
            .parcel_history
            .into_iter()
            .enumerate()
            .map(|(position, entry)| {
                if entry.index as usize != position {
                    warn!("Hermes status index {} sits at position {}", entry.index, position);
                }
                // Only the first entry carrying the current code is current
                let is_current = !current_seen && entry.status == current_code;
                current_seen |= is_current;
                Status {
                    id: entry.index,
                    name: entry.short_text.or(entry.next_status_short_text),
                    code: Some(entry.status),
                    description: entry.status_text,
                    has_been_reached: !entry.is_next_status,
                    is_current_status: is_current,
                    date: entry.timestamp,
                }
            })
            .collect();

        Ok(StatusInfo::from_states(states))
    }

    fn request(&self, url: reqwest::Url, locale: &str) -> UpstreamRequest {
        UpstreamRequest::get(url)
            .header("origin", HERMES_ORIGIN)
            .header("referer", HERMES_REFERER)
            .header("user-agent", self.user_agent.as_str())
            .header("accept-language", locale)
            .header("x-language", locale)
    }

    async fn fetch_json(&self, request: &UpstreamRequest) -> Result<RawTrackingData> {
        let body = self.fetcher.fetch(request).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait::async_trait]
impl CarrierApi for HermesTracker {
    fn carrier_name(&self) -> &'static str {
        HERMES_CARRIER
    }

    fn default_locale(&self) -> &'static str {
        HERMES_DEFAULT_LOCALE
    }

    #[instrument(skip(self))]
    async fn track(&self, query: &TrackingQuery) -> Result<TrackingInfo> {
        let locale = query.locale_or(HERMES_DEFAULT_LOCALE);
        let parcelno = query.parcelno.as_str();

        debug!("Fetching Hermes parcel details for {}", parcelno);
        let details_url = build_url(
            &self.base_url,
            &["tnt", "parcelservice", "parceldetails", parcelno],
            &[],
        )?;
        let mut raw = self.fetch_json(&self.request(details_url, locale)).await?;
        let status = Self::normalize(&raw)?;

        // The zip unlocks the delivery address; it does not change the history.
        if let Some(zip) = query.zip.as_deref() {
            debug!("Fetching Hermes address details for {}", parcelno);
            let address_url = build_url(
                &self.base_url,
                &["tnt", "parcelservice", "parceladdress", parcelno],
                &[],
            )?;
            let request = self.request(address_url, locale).header("x-zip", zip);
            let address = self.fetch_json(&request).await?;

            raw.as_object_mut()
                .ok_or_else(|| TrackerError::shape(HERMES_CARRIER, "parcel details are not an object"))?
                .insert("address".to_string(), address);
        }

        info!(
            "Hermes parcel {}: {} states, current {:?}",
            parcelno, status.states_count, status.current_state
        );

        Ok(TrackingInfo::new(query, Self::details_link(parcelno)?, status, raw))
    }
}
