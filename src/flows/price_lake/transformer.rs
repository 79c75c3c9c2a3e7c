use chrono::{DateTime, Utc};
use log::info;

use crate::domain::constants::TIME_COLUMN;
use crate::domain::errors::TransformError;
use crate::domain::model::quote::PriceQuote;
use crate::domain::model::record::{PriceColumn, PriceRecord};

/// Shapes a quote into a single lake row and stamps it with the
/// observation time.
pub struct RecordTransformer {
    assets: Vec<String>,
    currencies: Vec<String>,
}

impl RecordTransformer {
    /// Empty `assets` or `currencies` means "whatever the quote carries";
    /// every asset must then be quoted in the same set of currencies.
    pub fn new(assets: Vec<String>, currencies: Vec<String>) -> Self {
        Self { assets, currencies }
    }

    /// Transform using the current UTC time as `TIME`
    pub fn transform(&self, quote: &PriceQuote) -> Result<PriceRecord, TransformError> {
        let now = Utc::now();
        info!("Adding a column {} with current time: {}", TIME_COLUMN, now);
        self.transform_at(quote, now)
    }

    pub fn transform_at(&self, quote: &PriceQuote, time: DateTime<Utc>) -> Result<PriceRecord, TransformError> {
        if quote.is_empty() {
            return Err(TransformError::EmptyQuote);
        }

        // Fall back to whatever the quote carries
        let assets: Vec<String> = if self.assets.is_empty() {
            quote.assets().map(str::to_string).collect()
        } else {
            self.assets.clone()
        };
        let currencies = if self.currencies.is_empty() {
            Self::quoted_currencies(quote)
        } else {
            self.currencies.clone()
        };

        // One column per asset/currency pair; every pair must be present
        let mut columns = Vec::with_capacity(assets.len() * currencies.len());
        for asset in &assets {
            validate_symbol(asset, true)?;
            let quoted = quote
                .currencies(asset)
                .ok_or_else(|| TransformError::MissingAsset(asset.clone()))?;

            for currency in &currencies {
                validate_symbol(currency, false)?;
                let value = *quoted.get(currency).ok_or_else(|| TransformError::MissingPrice {
                    asset: asset.clone(),
                    currency: currency.clone(),
                })?;
                // NaN and infinities cannot be stored
                if !value.is_finite() {
                    return Err(TransformError::NonFinitePrice {
                        asset: asset.clone(),
                        currency: currency.clone(),
                        value,
                    });
                }
                columns.push(PriceColumn {
                    name: PriceRecord::column_name(asset, currency),
                    value,
                });
            }
        }

        // Sorts columns by name
        Ok(PriceRecord::new(columns, time))
    }

    fn quoted_currencies(quote: &PriceQuote) -> Vec<String> {
        let mut currencies: Vec<String> = quote
            .assets()
            .filter_map(|asset| quote.currencies(asset))
            .flat_map(|quoted| quoted.keys().cloned())
            .collect();
        currencies.sort();
        currencies.dedup();
        currencies
    }
}

// Symbols become column names in both the Parquet files and the Avro catalog schema.
fn validate_symbol(symbol: &str, leading: bool) -> Result<(), TransformError> {
    let valid = !symbol.is_empty()
        && symbol.chars().all(|c| c.is_ascii_alphanumeric())
        && (!leading || symbol.starts_with(|c: char| c.is_ascii_alphabetic()));
    if valid {
        Ok(())
    } else {
        Err(TransformError::InvalidSymbol(symbol.to_string()))
    }
}
