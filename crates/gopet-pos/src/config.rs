//! # Service Configuration
//!
//! Stores deployment configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`GOPET_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.
//! If hot-reloading is added later, we'd wrap in `RwLock`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use gopet_core::{TaxRate, DEFAULT_BUSINESS_ID};

/// Service configuration.
///
/// ## Fields
/// Most fields have sensible defaults for development.
/// Production deployments should configure these properly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosConfig {
    /// Business ID for multi-business support.
    pub business_id: String,

    /// Store name (displayed on receipts)
    pub store_name: String,

    /// Store address lines (for receipts)
    pub store_address: Vec<String>,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,

    /// Business-level tax rate in basis points
    /// e.g., 850 = 8.5%
    pub tax_rate_bps: u32,

    /// Simulated card authorization delay, in milliseconds.
    /// There is no real gateway behind the card path; the delay stands in
    /// for it. Set to 0 in tests.
    pub card_processing_delay_ms: u64,

    /// Prefix for generated QR payment references.
    pub qr_reference_prefix: String,
}

impl Default for PosConfig {
    /// Returns default configuration suitable for development.
    ///
    /// ## Default Values
    /// - Store: "GoPet Grooming & Daycare"
    /// - Currency: USD ($)
    /// - Tax: 8.5%
    /// - Card authorization: 400ms simulated delay
    fn default() -> Self {
        PosConfig {
            business_id: DEFAULT_BUSINESS_ID.to_string(),
            store_name: "GoPet Grooming & Daycare".to_string(),
            store_address: vec!["123 Main Street".to_string(), "City, ST 12345".to_string()],
            currency_code: "USD".to_string(),
            currency_symbol: "$".to_string(),
            currency_decimals: 2,
            tax_rate_bps: 850, // 8.5%
            card_processing_delay_ms: 400,
            qr_reference_prefix: "GOPET-QR".to_string(),
        }
    }
}

impl PosConfig {
    /// Creates a new PosConfig from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `GOPET_BUSINESS_ID`: Override business ID
    /// - `GOPET_STORE_NAME`: Override store name
    /// - `GOPET_TAX_RATE`: Override tax rate (e.g., "8.5")
    pub fn from_env() -> Self {
        let mut config = PosConfig::default();

        if let Ok(business_id) = std::env::var("GOPET_BUSINESS_ID") {
            config.business_id = business_id;
        }

        if let Ok(store_name) = std::env::var("GOPET_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Ok(tax_rate_str) = std::env::var("GOPET_TAX_RATE") {
            if let Ok(rate) = tax_rate_str.parse::<f64>() {
                config.tax_rate_bps = (rate * 100.0) as u32;
            }
        }

        config
    }

    /// Returns the configured tax rate.
    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Returns the simulated card authorization delay.
    #[inline]
    pub fn card_processing_delay(&self) -> Duration {
        Duration::from_millis(self.card_processing_delay_ms)
    }

    /// Formats a cent amount as a currency string.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = PosConfig::default();
    /// assert_eq!(config.format_currency(1234), "$12.34");
    /// ```
    pub fn format_currency(&self, cents: i64) -> String {
        let divisor = 10_i64.pow(self.currency_decimals as u32);
        let whole = cents / divisor;
        let frac = (cents % divisor).abs();

        format!(
            "{}{}{}",
            if cents < 0 { "-" } else { "" },
            self.currency_symbol,
            if self.currency_decimals > 0 {
                format!(
                    "{}.{:0width$}",
                    whole.abs(),
                    frac,
                    width = self.currency_decimals as usize
                )
            } else {
                whole.abs().to_string()
            }
        )
    }
}
