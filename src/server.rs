use crate::apis::create_carrier;
use crate::client::HttpFetch;
use crate::common::constants::get_supported_carriers;
use crate::common::error::TrackerError;
use crate::common::types::{CarrierApi, TrackingQuery};
use crate::config::{ServerConfig, UpstreamConfig};
use axum::{
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use hyper::Server;
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Carrier adapters shared by every request
#[derive(Clone)]
pub struct AppState {
    carriers: Arc<BTreeMap<&'static str, Arc<dyn CarrierApi>>>,
}

impl AppState {
    pub fn new(carriers: Vec<Arc<dyn CarrierApi>>) -> Self {
        let carriers = carriers.into_iter().map(|c| (c.carrier_name(), c)).collect();
        Self {
            carriers: Arc::new(carriers),
        }
    }

    /// All supported carriers, talking to upstream through `fetcher`
    pub fn from_config(upstream: &UpstreamConfig, fetcher: Arc<dyn HttpFetch>) -> Self {
        let carriers = get_supported_carriers()
            .into_iter()
            .filter_map(|name| create_carrier(name, upstream, fetcher.clone()))
            .collect();
        Self::new(carriers)
    }

    pub fn carrier_names(&self) -> Vec<&'static str> {
        self.carriers.keys().copied().collect()
    }
}

/// Query string accepted by every carrier route
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackParams {
    pub parcelno: String,
    pub zip: Option<String>,
    pub locale: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub include_original_api_response: bool,
}

impl From<TrackParams> for TrackingQuery {
    fn from(params: TrackParams) -> Self {
        TrackingQuery::from_input(
            params.parcelno,
            params.zip,
            params.locale,
            params.include_original_api_response,
        )
    }
}

/// Query flags accept the usual spellings: true/false, 1/0, yes/no, on/off, t/f, y/n.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "on" | "t" => Some(true),
        "false" | "0" | "no" | "n" | "off" | "f" => Some(false),
        _ => None,
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flag(&raw).ok_or_else(|| de::Error::invalid_value(Unexpected::Str(&raw), &"a boolean flag"))
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "parcel-track",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn list_carriers(State(state): State<AppState>) -> impl IntoResponse {
    let carriers: Vec<_> = state
        .carriers
        .values()
        .map(|c| serde_json::json!({ "name": c.carrier_name(), "defaultLocale": c.default_locale() }))
        .collect();
    Json(serde_json::json!({ "carriers": carriers }))
}

async fn track(state: AppState, carrier: &'static str, params: TrackParams) -> Response {
    let Some(api) = state.carriers.get(carrier) else {
        return error_response(carrier, &TrackerError::UnknownCarrier(carrier.to_string()));
    };

    let query = TrackingQuery::from(params);
    match api.track(&query).await {
        Ok(info) => Json(info).into_response(),
        Err(e) => {
            error!("{} lookup for {} failed: {}", carrier, query.parcelno, e);
            error_response(carrier, &e)
        }
    }
}

fn error_response(carrier: &str, err: &TrackerError) -> Response {
    let status = if err.is_upstream() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    let body = serde_json::json!({ "error": err.to_string(), "carrier": carrier });
    (status, Json(body)).into_response()
}

/// Create the HTTP router with one GET route per carrier
pub fn create_server(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    let mut router: Router<AppState> = Router::new()
        .route("/health", get(health))
        .route("/carriers", get(list_carriers));

    for carrier in state.carrier_names() {
        router = router.route(
            &format!("/{}", carrier),
            get(
                move |State(state): State<AppState>, Query(params): Query<TrackParams>| async move {
                    track(state, carrier, params).await
                },
            ),
        );
    }

    router
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}

/// Start the HTTP server on the configured address
pub async fn start_server(config: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let carriers = state.carrier_names();
    let app = create_server(state);

    info!("HTTP server listening on http://{}", addr);
    info!("Carrier routes: {}", carriers.iter().map(|c| format!("/{}", c)).collect::<Vec<_>>().join(", "));

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
