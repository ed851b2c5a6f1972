pub mod embedded_json;

pub use embedded_json::extract_json_parse_payload;
