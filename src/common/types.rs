use crate::common::error::Result;
use serde::{Deserialize, Serialize};

/// Raw upstream payload as returned by a carrier
pub type RawTrackingData = serde_json::Value;

/// One normalized tracking lookup. Built per request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingInfo {
    pub parcelno: String,
    pub zip: Option<String>,
    /// The carrier's public tracking page for this parcel
    pub details_link: String,
    pub status: StatusInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orig: Option<RawTrackingData>,
}

impl TrackingInfo {
    pub fn new(
        query: &TrackingQuery,
        details_link: String,
        status: StatusInfo,
        raw: RawTrackingData,
    ) -> Self {
        Self {
            parcelno: query.parcelno.clone(),
            zip: query.zip.clone(),
            details_link,
            status,
            orig: query.include_original.then_some(raw),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusInfo {
    pub states_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_state: Option<u32>,
    pub states: Vec<Status>,
}

impl StatusInfo {
    /// Builds the summary from ordered states. `current_state` is the id of the
    /// last state flagged current.
    pub fn from_states(states: Vec<Status>) -> Self {
        let current_state = states.iter().rev().find(|s| s.is_current_status).map(|s| s.id);
        Self {
            states_count: states.len(),
            current_state,
            states,
        }
    }

    pub fn current(&self) -> Option<&Status> {
        let id = self.current_state?;
        self.states.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// Position in the carrier's lifecycle sequence
    pub id: u32,
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub has_been_reached: bool,
    pub is_current_status: bool,
    pub date: Option<String>,
}

/// Arguments of a tracking lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackingQuery {
    pub parcelno: String,
    pub zip: Option<String>,
    pub locale: Option<String>,
    pub include_original: bool,
}

impl TrackingQuery {
    pub fn new(parcelno: impl Into<String>) -> Self {
        Self {
            parcelno: parcelno.into(),
            ..Default::default()
        }
    }

    /// Builds a query from user input; blank zip or locale values count as absent.
    pub fn from_input(
        parcelno: impl Into<String>,
        zip: Option<String>,
        locale: Option<String>,
        include_original: bool,
    ) -> Self {
        Self {
            parcelno: parcelno.into(),
            zip: non_blank(zip),
            locale: non_blank(locale),
            include_original,
        }
    }

    pub fn with_zip(mut self, zip: impl Into<String>) -> Self {
        self.zip = Some(zip.into());
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn include_original(mut self, include: bool) -> Self {
        self.include_original = include;
        self
    }

    /// The requested locale, or the carrier's default when none was given
    pub fn locale_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.locale.as_deref().filter(|l| !l.is_empty()).unwrap_or(default)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Core trait that every carrier adapter implements
#[async_trait::async_trait]
pub trait CarrierApi: Send + Sync {
    /// Route and registry name of this carrier
    fn carrier_name(&self) -> &'static str;

    /// Locale used when the query does not name one
    fn default_locale(&self) -> &'static str;

    /// Fetch tracking data upstream and normalize it
    async fn track(&self, query: &TrackingQuery) -> Result<TrackingInfo>;
}
