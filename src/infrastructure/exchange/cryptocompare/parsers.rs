use serde_json::Value;
use url::Url;

use crate::domain::errors::FetchError;
use crate::domain::model::quote::PriceQuote;

/// Parses CryptoCompare `pricemulti` responses
pub struct CryptoCompareParser;

impl CryptoCompareParser {
    /// Build the `pricemulti` request url for the given assets and currencies
    pub fn build_url(base_url: &str, assets: &[String], currencies: &[String]) -> Result<Url, FetchError> {
        let mut url = Url::parse(base_url)?;
        url.query_pairs_mut()
            .append_pair("fsyms", &assets.join(","))
            .append_pair("tsyms", &currencies.join(","));
        Ok(url)
    }

    /// Parse a response body into a quote.
    ///
    /// CryptoCompare reports some failures in-band with a 200 status, as
    /// `{"Response": "Error", "Message": "..."}`.
    pub fn parse_quote(body: &str) -> Result<PriceQuote, FetchError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| FetchError::Parse(format!("body is not JSON: {}", e)))?;

        if value.get("Response").and_then(|v| v.as_str()) == Some("Error") {
            let message = value
                .get("Message")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error")
                .to_string();
            return Err(FetchError::Api(message));
        }

        serde_json::from_value(value).map_err(|e| FetchError::Parse(e.to_string()))
    }
}
