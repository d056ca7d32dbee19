//! # Invoice Numbers
//!
//! ```text
//! INV-20261018-482913
//! │   │        └── six-digit suffix: clock millis mod 10⁶, zero padded
//! │   └── sale date (UTC), yyyyMMdd
//! └── fixed prefix
//! ```
//!
//! Two checkouts in the same millisecond produce the same suffix. The sale
//! processor detects the UNIQUE clash and walks forward with [`next_suffix`].

use chrono::{DateTime, Utc};

use crate::INVOICE_SUFFIX_MODULUS;

/// Suffix derived from the millisecond clock.
pub fn initial_suffix(now: DateTime<Utc>) -> u32 {
    now.timestamp_millis().rem_euclid(INVOICE_SUFFIX_MODULUS as i64) as u32
}

/// The suffix to try after a collision. Wraps 999999 → 000000.
#[inline]
pub fn next_suffix(suffix: u32) -> u32 {
    (suffix + 1) % INVOICE_SUFFIX_MODULUS
}

/// Formats `INV-{yyyyMMdd}-{suffix:06}`.
pub fn format_invoice_number(now: DateTime<Utc>, suffix: u32) -> String {
    format!(
        "INV-{}-{:06}",
        now.format("%Y%m%d"),
        suffix % INVOICE_SUFFIX_MODULUS
    )
}
