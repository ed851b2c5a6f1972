use crate::apis::build_url;
use crate::client::{HttpFetch, UpstreamRequest};
use crate::common::constants::{DHL_CARRIER, DHL_DEFAULT_LOCALE, DHL_DETAILS_URL};
use crate::common::error::{Result, TrackerError};
use crate::common::types::{CarrierApi, RawTrackingData, Status, StatusInfo, TrackingInfo, TrackingQuery};
use crate::config::UpstreamConfig;
use crate::parser::extract_json_parse_payload;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// DHL's progress bar has a handful of steps; anything this large is garbage.
const MAX_PROGRESS_STEPS: u32 = 100;

/// DHL Germany. There is no public JSON API, so the tracking page is scraped
/// for the document it embeds.
pub struct DhlTracker {
    fetcher: Arc<dyn HttpFetch>,
    base_url: String,
    user_agent: String,
}

#[derive(Debug, Deserialize)]
struct TrackingPage {
    #[serde(rename = "sendungen")]
    shipments: Vec<Shipment>,
}

#[derive(Debug, Deserialize)]
struct Shipment {
    #[serde(rename = "sendungsdetails")]
    details: ShipmentDetails,
}

#[derive(Debug, Deserialize)]
struct ShipmentDetails {
    #[serde(rename = "sendungsverlauf")]
    history: ShipmentHistory,
}

#[derive(Debug, Deserialize)]
struct ShipmentHistory {
    #[serde(rename = "fortschritt")]
    progress: u32,
    #[serde(rename = "maximalFortschritt")]
    max_progress: u32,
    #[serde(default)]
    events: Vec<ShipmentEvent>,
}

#[derive(Debug, Deserialize)]
struct ShipmentEvent {
    #[serde(rename = "datum")]
    date: Option<String>,
    status: Option<String>,
}

impl DhlTracker {
    pub fn new(fetcher: Arc<dyn HttpFetch>, upstream: &UpstreamConfig) -> Self {
        Self {
            fetcher,
            base_url: upstream.dhl_base_url.clone(),
            user_agent: upstream.user_agent.clone(),
        }
    }

    pub fn details_link(parcelno: &str, locale: &str, zip: Option<&str>) -> Result<String> {
        let mut query = vec![("lang", locale), ("idc", parcelno)];
        if let Some(zip) = zip {
            query.push(("zip", zip));
        }
        Ok(build_url(DHL_DETAILS_URL, &[], &query)?.to_string())
    }

    /// Normalizes the embedded document. DHL only reports a progress index, so
    /// reached/current flags are derived from each state's position.
    pub fn normalize(raw: &RawTrackingData) -> Result<StatusInfo> {
        let page = TrackingPage::deserialize(raw).map_err(|e| {
            TrackerError::shape(DHL_CARRIER, format!("no shipment history in page: {}", e))
        })?;
        let history = page
            .shipments
            .into_iter()
            .next()
            .ok_or_else(|| TrackerError::shape(DHL_CARRIER, "page lists no shipments"))?
            .details
            .history;

        if history.max_progress >= MAX_PROGRESS_STEPS {
            return Err(TrackerError::shape(
                DHL_CARRIER,
                format!("implausible maximum progress {}", history.max_progress),
            ));
        }
        if history.progress > history.max_progress {
            return Err(TrackerError::shape(
                DHL_CARRIER,
                format!(
                    "progress {} exceeds maximum progress {}",
                    history.progress, history.max_progress
                ),
            ));
        }

        let current = history.progress;
        let mut events = history.events.into_iter();
        let states = (0..=history.max_progress)
            .map(|id| {
                let event = events.next();
                Status {
                    id,
                    code: None,
                    name: None,
                    description: event.as_ref().and_then(|e| e.status.clone()),
                    has_been_reached: id <= current,
                    is_current_status: id == current,
                    date: event.and_then(|e| e.date),
                }
            })
            .collect();

        Ok(StatusInfo::from_states(states))
    }
}

#[async_trait::async_trait]
impl CarrierApi for DhlTracker {
    fn carrier_name(&self) -> &'static str {
        DHL_CARRIER
    }

    fn default_locale(&self) -> &'static str {
        DHL_DEFAULT_LOCALE
    }

    #[instrument(skip(self))]
    async fn track(&self, query: &TrackingQuery) -> Result<TrackingInfo> {
        let locale = query.locale_or(DHL_DEFAULT_LOCALE);
        let url = build_url(
            &self.base_url,
            &["int-verfolgen", "search"],
            &[
                ("language", locale),
                ("lang", locale),
                ("domain", "de"),
                ("piececode", query.parcelno.as_str()),
            ],
        )?;

        debug!("Fetching DHL tracking page for {}", query.parcelno);
        let request = UpstreamRequest::get(url).header("user-agent", self.user_agent.as_str());
        let html = self.fetcher.fetch(&request).await?;

        let raw = extract_json_parse_payload(&html)?;
        let status = Self::normalize(&raw)?;
        info!(
            "DHL parcel {}: {} states, current {:?}",
            query.parcelno, status.states_count, status.current_state
        );

        let details_link = Self::details_link(&query.parcelno, locale, query.zip.as_deref())?;
        Ok(TrackingInfo::new(query, details_link, status, raw))
    }
}
