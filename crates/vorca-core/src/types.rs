//! # Domain Types
//!
//! Core domain types used throughout Vorca POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Location     │   │    Product      │   │   Inventory     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, code       │◄──│  location_id    │   │  (product,      │       │
//! │  │  name, active   │   │  sku, price     │◄──│   location) UQ  │       │
//! │  └─────────────────┘   └─────────────────┘   │  quantity       │       │
//! │                                              └────────┬────────┘       │
//! │                                                       │ 1:N            │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌────────▼────────┐       │
//! │  │      Sale       │   │    Transfer     │   │   Adjustment    │       │
//! │  │  invoice_number │   │  from → to      │   │  signed delta   │       │
//! │  │  items[]        │   │  status, items[]│   │  reason, ref    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ledger Rule
//! Every change to `Inventory::quantity` writes exactly one
//! [`InventoryAdjustment`]. A row's quantity is always the sum of its
//! adjustment deltas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1100 bps = 11%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

/// The flat 11% rate applied at checkout.
impl Default for TaxRate {
    fn default() -> Self {
        TaxRate(crate::DEFAULT_TAX_RATE_BPS)
    }
}

// =============================================================================
// Stock Policy
// =============================================================================

/// Whether stock-decreasing operations may take on-hand quantity below zero.
///
/// ```text
/// AllowNegative (default)         Strict
/// ───────────────────────         ──────
/// on hand 1, sell 3 → -2          on hand 1, sell 3 → InsufficientStock
/// backlog visible in alerts       nothing written
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum StockPolicy {
    /// Oversell is accepted and shows up as negative quantity.
    #[default]
    AllowNegative,
    /// Reject any decrement that would leave quantity below zero.
    Strict,
}

impl StockPolicy {
    /// Returns true when a row at `current` may absorb `delta`.
    ///
    /// Increments are always permitted.
    pub fn permits(&self, current: i64, delta: i64) -> bool {
        match self {
            StockPolicy::AllowNegative => true,
            StockPolicy::Strict => delta >= 0 || current.saturating_add(delta) >= 0,
        }
    }
}

impl std::str::FromStr for StockPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "allow_negative" | "allow-negative" | "oversell" => Ok(StockPolicy::AllowNegative),
            "strict" => Ok(StockPolicy::Strict),
            other => Err(format!(
                "Unknown stock policy: '{}'. Valid options: allow_negative, strict",
                other
            )),
        }
    }
}

// =============================================================================
// Location
// =============================================================================

/// A physical store/branch owning its own inventory and sales.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Location {
    pub id: String,
    pub name: String,
    /// Short unique code printed on transfer slips (e.g. `KMG`).
    pub code: String,
    pub active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale at its owning location.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: String,
    /// Stock Keeping Unit - unique business identifier.
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub barcode: Option<String>,
    /// Current list price. Sale lines snapshot the price they were sold at.
    pub price: Money,
    pub cost: Option<Money>,
    pub location_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Inventory
// =============================================================================

/// On-hand stock of one product at one location.
///
/// Unique by `(product_id, location_id)`. `quantity` may be negative: that is
/// the oversell/backlog signal, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Inventory {
    pub id: String,
    pub product_id: String,
    pub location_id: String,
    pub quantity: i64,
    pub low_stock_threshold: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Inventory {
    /// At or below threshold. Negative rows always qualify.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }
}

/// Why an inventory quantity changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum AdjustmentReason {
    StockTake,
    Damage,
    Return,
    Transfer,
    Manual,
    /// Checkout decrement. Only the sale processor records this reason.
    Sale,
}

impl AdjustmentReason {
    /// Reasons a caller may submit through the adjustment operation.
    pub const CALLER_REASONS: [AdjustmentReason; 5] = [
        AdjustmentReason::StockTake,
        AdjustmentReason::Damage,
        AdjustmentReason::Return,
        AdjustmentReason::Transfer,
        AdjustmentReason::Manual,
    ];

    /// True for reasons that may be submitted directly by a caller.
    pub fn is_caller_reason(&self) -> bool {
        !matches!(self, AdjustmentReason::Sale)
    }

    /// Upper-case wire name, as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentReason::StockTake => "STOCK_TAKE",
            AdjustmentReason::Damage => "DAMAGE",
            AdjustmentReason::Return => "RETURN",
            AdjustmentReason::Transfer => "TRANSFER",
            AdjustmentReason::Manual => "MANUAL",
            AdjustmentReason::Sale => "SALE",
        }
    }
}

impl std::fmt::Display for AdjustmentReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable audit record of one applied inventory delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InventoryAdjustment {
    pub id: String,
    pub inventory_id: String,
    /// Signed, never zero.
    pub quantity: i64,
    pub reason: AdjustmentReason,
    pub notes: Option<String>,
    pub actor_id: String,
    /// Sale or transfer id for engine-driven deltas.
    pub reference_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Result of one applied delta: the row after the change plus its audit record.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AppliedDelta {
    pub inventory: Inventory,
    pub adjustment: InventoryAdjustment,
}

/// Ledger check for one inventory row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Reconciliation {
    pub quantity: i64,
    pub ledger_sum: i64,
    pub adjustment_count: i64,
}

impl Reconciliation {
    /// True when the row equals the running total of its deltas.
    pub fn is_consistent(&self) -> bool {
        self.quantity == self.ledger_sum
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PaymentMethod {
    Cash,
    Card,
    /// Indonesian standard QR payment.
    Qris,
    Debit,
}

impl std::str::FromStr for PaymentMethod {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CASH" => Ok(PaymentMethod::Cash),
            "CARD" => Ok(PaymentMethod::Card),
            "QRIS" => Ok(PaymentMethod::Qris),
            "DEBIT" => Ok(PaymentMethod::Debit),
            _ => Err(crate::error::ValidationError::NotAllowed {
                field: "paymentMethod".to_string(),
                allowed: vec![
                    "CASH".to_string(),
                    "CARD".to_string(),
                    "QRIS".to_string(),
                    "DEBIT".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// The status of a persisted sale. Checkout only ever writes completed sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum SaleStatus {
    #[default]
    Completed,
}

/// A sale header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub invoice_number: String,
    pub location_id: String,
    pub actor_id: String,
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    /// subtotal + tax − discount; negative when the discount is larger.
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    /// Position in the cart, starting at 1.
    pub line_no: i64,
    pub product_id: String,
    pub sku_snapshot: String,
    pub name_snapshot: String,
    pub quantity: i64,
    pub unit_price: Money,
    /// unit_price × quantity
    pub line_subtotal: Money,
}

/// A sale together with its ordered line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Transfer
// =============================================================================

/// Lifecycle of a stock transfer. Strictly forward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum TransferStatus {
    Pending,
    InTransit,
    Completed,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "PENDING",
            TransferStatus::InTransit => "IN_TRANSIT",
            TransferStatus::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transfer header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Transfer {
    pub id: String,
    pub from_location_id: String,
    pub to_location_id: String,
    pub status: TransferStatus,
    pub requested_by: String,
    #[ts(as = "String")]
    pub requested_at: DateTime<Utc>,
    pub approved_by: Option<String>,
    #[ts(as = "Option<String>")]
    pub approved_at: Option<DateTime<Utc>>,
    pub completed_by: Option<String>,
    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// One product line of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TransferItem {
    pub id: String,
    pub transfer_id: String,
    pub line_no: i64,
    pub product_id: String,
    /// Requested quantity; this is what approve/complete move.
    pub quantity: i64,
    /// Zero until the transfer completes.
    pub received_quantity: i64,
}

/// A transfer together with its ordered items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TransferDetail {
    #[serde(flatten)]
    pub transfer: Transfer,
    pub items: Vec<TransferItem>,
}

// =============================================================================
// Request Inputs
// =============================================================================

/// One cart line submitted to checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: Money,
}

/// One product line of a transfer request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TransferLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Fields for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub cost: Option<Money>,
    pub location_id: String,
}

/// Partial product update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductPatch {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub cost: Option<Money>,
}

/// Fields for creating a location.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewLocation {
    pub name: String,
    pub code: String,
}

/// A caller-submitted inventory adjustment.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdjustmentRequest {
    pub product_id: String,
    pub location_id: String,
    /// Signed delta, non-zero.
    pub quantity: i64,
    pub reason: AdjustmentReason,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Sets the low-stock threshold of one inventory row.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ThresholdRequest {
    pub product_id: String,
    pub location_id: String,
    pub low_stock_threshold: i64,
}

/// A checkout request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutRequest {
    pub location_id: String,
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub discount: Money,
    pub payment_method: PaymentMethod,
}

/// A transfer request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TransferRequest {
    pub from_location_id: String,
    pub to_location_id: String,
    pub items: Vec<TransferLine>,
}

/// An inventory row joined with the product it counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InventoryLevel {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub inventory: Inventory,
    pub sku: String,
    pub product_name: String,
}

// =============================================================================
// Analytics
// =============================================================================

/// Basic sales KPIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalesSummary {
    pub total_transactions: i64,
    pub total_revenue: Money,
    /// Integer average; zero when there are no sales.
    pub average_transaction: Money,
    /// Location of the largest sale in the trailing 30 days.
    pub top_location: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
