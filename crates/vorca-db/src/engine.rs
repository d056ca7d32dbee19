//! # Engine Configuration
//!
//! Deployment knobs that change what the engine operations do, as opposed
//! to [`DbConfig`](crate::DbConfig), which only shapes the connection pool.
//!
//! ```text
//! EngineConfig
//! ├── tax_rate                      flat checkout rate (default 11%)
//! ├── stock_policy                  AllowNegative | Strict
//! ├── default_low_stock_threshold   for rows created lazily (default 10)
//! ├── retry                         busy/locked retry bound + backoff
//! └── invoice_attempts              suffix bumps before Conflict
//! ```

use vorca_core::{StockPolicy, TaxRate, DEFAULT_LOW_STOCK_THRESHOLD};

use crate::retry::RetryPolicy;

/// Engine behaviour configuration.
///
/// ## Example
/// ```rust
/// use vorca_db::EngineConfig;
/// use vorca_core::{StockPolicy, TaxRate};
///
/// let engine = EngineConfig::default()
///     .tax_rate(TaxRate::from_bps(1100))
///     .stock_policy(StockPolicy::Strict)
///     .max_attempts(16);
/// assert_eq!(engine.retry.max_attempts, 16);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub tax_rate: TaxRate,
    pub stock_policy: StockPolicy,
    pub default_low_stock_threshold: i64,
    pub retry: RetryPolicy,
    /// How many invoice numbers checkout tries before giving up.
    pub invoice_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            tax_rate: TaxRate::default(),
            stock_policy: StockPolicy::default(),
            default_low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            retry: RetryPolicy::default(),
            invoice_attempts: 16,
        }
    }
}

impl EngineConfig {
    pub fn tax_rate(mut self, rate: TaxRate) -> Self {
        self.tax_rate = rate;
        self
    }

    pub fn stock_policy(mut self, policy: StockPolicy) -> Self {
        self.stock_policy = policy;
        self
    }

    pub fn default_low_stock_threshold(mut self, threshold: i64) -> Self {
        self.default_low_stock_threshold = threshold;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Shorthand for adjusting only the retry attempt bound.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.retry = self.retry.max_attempts(attempts);
        self
    }

    pub fn invoice_attempts(mut self, attempts: u32) -> Self {
        self.invoice_attempts = attempts.max(1);
        self
    }
}
