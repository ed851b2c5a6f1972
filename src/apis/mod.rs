pub mod dhl;
pub mod dpd;
pub mod hermes;

use crate::client::HttpFetch;
use crate::common::constants::{DHL_CARRIER, DPD_CARRIER, HERMES_CARRIER};
use crate::common::error::{Result, TrackerError};
use crate::common::types::CarrierApi;
use crate::config::UpstreamConfig;
use reqwest::Url;
use std::sync::Arc;

pub use dhl::DhlTracker;
pub use dpd::DpdTracker;
pub use hermes::HermesTracker;

/// Build the adapter registered under `carrier_name`
pub fn create_carrier(
    carrier_name: &str,
    upstream: &UpstreamConfig,
    fetcher: Arc<dyn HttpFetch>,
) -> Option<Arc<dyn CarrierApi>> {
    match carrier_name {
        DPD_CARRIER => Some(Arc::new(DpdTracker::new(fetcher, upstream))),
        DHL_CARRIER => Some(Arc::new(DhlTracker::new(fetcher, upstream))),
        HERMES_CARRIER => Some(Arc::new(HermesTracker::new(fetcher, upstream))),
        _ => None,
    }
}

/// Appends path segments and query pairs to `base`, encoding each value.
pub(crate) fn build_url(base: &str, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| TrackerError::Config(format!("invalid base url '{}': {}", base, e)))?;

    if !segments.is_empty() {
        url.path_segments_mut()
            .map_err(|_| TrackerError::Config(format!("base url '{}' cannot take a path", base)))?
            .pop_if_empty()
            .extend(segments);
    }
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::UpstreamRequest;

    struct NoFetch;

    #[async_trait::async_trait]
    impl HttpFetch for NoFetch {
        async fn fetch(&self, _request: &UpstreamRequest) -> Result<String> {
            Err(TrackerError::Config("offline".into()))
        }
    }

    #[test]
    fn test_create_carrier_known_names() {
        let upstream = UpstreamConfig::default();
        for name in crate::common::constants::get_supported_carriers() {
            let carrier = create_carrier(name, &upstream, Arc::new(NoFetch)).unwrap();
            assert_eq!(carrier.carrier_name(), name);
        }
    }

    #[test]
    fn test_create_carrier_unknown_name() {
        assert!(create_carrier("ups", &UpstreamConfig::default(), Arc::new(NoFetch)).is_none());
    }

    #[test]
    fn test_build_url_encodes_segments_and_query() {
        let url = build_url("https://tracking.dpd.de", &["rest", "plc", "en_US", "01 23/4"], &[]).unwrap();
        assert_eq!(url.as_str(), "https://tracking.dpd.de/rest/plc/en_US/01%2023%2F4");

        let url = build_url("http://localhost:9000/mock/", &["a"], &[("zip", "12 345")]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/mock/a?zip=12+345");
    }

    #[test]
    fn test_build_url_rejects_bad_base() {
        assert!(matches!(build_url("not a url", &[], &[]), Err(TrackerError::Config(_))));
    }
}
