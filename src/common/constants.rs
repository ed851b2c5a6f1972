/// Carrier name constants to ensure consistency across the codebase.
/// These are the names used in routes, the CLI and the carrier registry.
pub const DPD_CARRIER: &str = "dpd";
pub const DHL_CARRIER: &str = "dhl";
pub const HERMES_CARRIER: &str = "hermes";

// Default locales per carrier
pub const DPD_DEFAULT_LOCALE: &str = "en_US";
pub const DHL_DEFAULT_LOCALE: &str = "en";
pub const HERMES_DEFAULT_LOCALE: &str = "en";

// Upstream endpoints
pub const DPD_BASE_URL: &str = "https://tracking.dpd.de";
pub const DHL_BASE_URL: &str = "https://www.dhl.de";
pub const HERMES_BASE_URL: &str = "https://api.my-deliveries.de";

// Public tracking pages linked from `details_link`
pub const DPD_DETAILS_URL: &str = "https://my.dpd.de/redirect.aspx";
pub const DHL_DETAILS_URL: &str = "https://www.dhl.de/int-verfolgen/";
pub const HERMES_DETAILS_URL: &str =
    "https://www.myhermes.de/empfangen/sendungsverfolgung/sendungsinformation";

// Hermes gates its API on these
pub const HERMES_ORIGIN: &str = "https://www.myhermes.de";
pub const HERMES_REFERER: &str = "https://www.myhermes.de/";

/// Some upstreams reject requests that do not look like they come from a browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Get all supported carrier names
pub fn get_supported_carriers() -> Vec<&'static str> {
    vec![DPD_CARRIER, DHL_CARRIER, HERMES_CARRIER]
}
