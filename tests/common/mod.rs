#![allow(dead_code)]

use parcel_track::client::{HttpFetch, UpstreamRequest};
use parcel_track::{Result, TrackerError};
use std::sync::Mutex;

/// Canned upstream: answers by URL path fragment and records every request.
#[derive(Default)]
pub struct StubFetcher {
    routes: Vec<(String, Option<String>, u16)>,
    calls: Mutex<Vec<UpstreamRequest>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, path_fragment: &str, body: impl Into<String>) -> Self {
        self.routes.push((path_fragment.to_string(), Some(body.into()), 200));
        self
    }

    pub fn failing(mut self, path_fragment: &str, status: u16) -> Self {
        self.routes.push((path_fragment.to_string(), None, status));
        self
    }

    pub fn calls(&self) -> Vec<UpstreamRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl HttpFetch for StubFetcher {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<String> {
        self.calls.lock().unwrap().push(request.clone());

        let route = self
            .routes
            .iter()
            .find(|(fragment, _, _)| request.url.path().contains(fragment.as_str()));

        match route {
            Some((_, Some(body), _)) => Ok(body.clone()),
            Some((_, None, status)) => Err(TrackerError::UpstreamStatus {
                status: *status,
                url: request.url.to_string(),
            }),
            None => Err(TrackerError::UpstreamStatus {
                status: 404,
                url: request.url.to_string(),
            }),
        }
    }
}

/// Checks the invariants every normalized result must hold
pub fn assert_current_state_consistent(info: &parcel_track::TrackingInfo) {
    let current: Vec<_> = info.status.states.iter().filter(|s| s.is_current_status).collect();
    match info.status.current_state {
        Some(id) => {
            assert_eq!(current.len(), 1, "exactly one state must be current");
            assert_eq!(current[0].id, id);
            let indexed = info
                .status
                .states
                .get(id as usize)
                .expect("currentState must index into states");
            assert!(indexed.is_current_status);
        }
        None => assert!(current.is_empty()),
    }
    assert_eq!(info.status.states_count, info.status.states.len());
}

pub fn dpd_lifecycle() -> serde_json::Value {
    serde_json::json!({
        "parcellifecycleResponse": {
            "parcelLifeCycleData": {
                "shipmentInfo": { "parcelLabelNumber": "01234567890123" },
                "statusInfo": [
                    {
                        "status": "ACCEPTED",
                        "label": "Parcel handed to DPD",
                        "description": { "content": ["DPD has received your parcel.", "Extra line"] },
                        "statusHasBeenReached": true,
                        "isCurrentStatus": false,
                        "date": "12.03.2024, 09:41"
                    },
                    {
                        "status": "ON_THE_ROAD",
                        "label": "In transit",
                        "description": { "content": ["The parcel is at the parcel delivery centre."] },
                        "statusHasBeenReached": true,
                        "isCurrentStatus": true,
                        "date": "13.03.2024, 05:02"
                    },
                    {
                        "status": "AT_DELIVERY_DEPOT",
                        "label": "At parcel delivery centre",
                        "description": { "content": [] },
                        "statusHasBeenReached": false,
                        "isCurrentStatus": false
                    },
                    {
                        "status": "DELIVERED",
                        "label": "Delivered",
                        "statusHasBeenReached": false,
                        "isCurrentStatus": false
                    }
                ]
            }
        }
    })
}

pub fn dhl_page() -> String {
    let blob = serde_json::json!({
        "sendungen": [{
            "id": "00340434161094042557",
            "sendungsdetails": {
                "sendungsverlauf": {
                    "fortschritt": 3,
                    "maximalFortschritt": 5,
                    "kurzStatus": "Zustellung erfolgt heute",
                    "events": [
                        { "datum": "2024-03-11T18:22:00+01:00", "status": "The shipment has been electronically announced." },
                        { "datum": "2024-03-12T07:10:00+01:00", "status": "The shipment has been processed in the parcel center." },
                        { "datum": "2024-03-13T03:45:00+01:00", "status": "The shipment has been processed in the destination parcel center." },
                        { "datum": "2024-03-13T08:01:00+01:00", "status": "The shipment has been loaded onto the delivery vehicle." }
                    ]
                }
            }
        }]
    });
    // Encode the document as a JS string literal the way the page does
    let literal = serde_json::to_string(&blob.to_string()).unwrap().replace('/', "\\/");
    format!(
        "<!DOCTYPE html>\n<html><head><script src=\"/static/main.js\"></script></head>\n<body>\n<div id=\"app\"></div>\n<script>\n  window.__ANALYTICS__ = {{}};\n  var initialState = JSON.parse({});\n  window.__INITIAL_APP_STATE__ = initialState;\n</script>\n</body></html>",
        literal
    )
}

pub fn hermes_details() -> serde_json::Value {
    serde_json::json!({
        "parcelNumber": "H1001990012345678901",
        "status": { "parcelStatus": "DELIVERY_TODAY", "text": "Your parcel will be delivered today." },
        "parcelHistory": [
            {
                "index": 0,
                "status": "ANNOUNCED",
                "shortText": "Announced",
                "nextStatusShortText": "Received",
                "statusText": "The sender has announced the parcel.",
                "isNextStatus": false,
                "timestamp": "2024-03-10T12:00:00"
            },
            {
                "index": 1,
                "status": "IN_TRANSIT",
                "shortText": "On its way",
                "statusText": "The parcel is on its way.",
                "isNextStatus": false,
                "timestamp": "2024-03-11T06:30:00"
            },
            {
                "index": 2,
                "status": "DELIVERY_TODAY",
                "shortText": "Out for delivery",
                "statusText": "The parcel will be delivered today.",
                "isNextStatus": false,
                "timestamp": "2024-03-12T07:45:00"
            },
            {
                "index": 3,
                "status": "DELIVERED",
                "nextStatusShortText": "Delivered",
                "isNextStatus": true
            }
        ]
    })
}

pub fn hermes_address() -> serde_json::Value {
    serde_json::json!({
        "street": "Musterweg",
        "houseNumber": "12",
        "zipCode": "22767",
        "city": "Hamburg"
    })
}
