//! Network constants for the CoinGecko REST API.

/// Default REST API base URL (public tier).
pub const DEFAULT_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Base URL of the paid tier. Requests against it carry the pro key header.
pub const PRO_API_URL: &str = "https://pro-api.coingecko.com/api/v3";

/// Quote currency for every price the SDK requests.
pub const VS_CURRENCY: &str = "usd";

/// Header carrying a demo (free tier) API key.
pub const DEMO_API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// Header carrying a pro API key.
pub const PRO_API_KEY_HEADER: &str = "x-cg-pro-api-key";

/// Environment variable overriding the API base URL.
pub const ENV_API_URL: &str = "COINGECKO_API_URL";

/// Environment variable holding an API key.
pub const ENV_API_KEY: &str = "COINGECKO_API_KEY";

/// Pick the key header matching the host a client talks to.
pub fn api_key_header(base_url: &str) -> &'static str {
    if base_url.contains("pro-api.") {
        PRO_API_KEY_HEADER
    } else {
        DEMO_API_KEY_HEADER
    }
}
