//! Trade execution port.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::TokenId;
use crate::error::Error;

/// Represents an order to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    /// The outcome token to trade.
    pub token: TokenId,
    /// Buy or Sell.
    pub side: OrderSide,
    /// Order size in shares.
    pub size: Decimal,
    /// Limit price per share.
    pub price: Decimal,
}

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    /// Buy order.
    Buy,
    /// Sell order.
    Sell,
}

/// Receipt for a submitted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReceipt {
    /// The order ID returned by the exchange, or a synthetic marker in
    /// dry-run.
    pub order_id: String,
    /// True when no order actually reached an exchange.
    pub dry_run: bool,
}

impl OrderReceipt {
    #[must_use]
    pub fn live(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            dry_run: false,
        }
    }

    #[must_use]
    pub fn dry_run() -> Self {
        Self {
            order_id: "dry-run".to_string(),
            dry_run: true,
        }
    }
}

/// Executor for submitting orders to an exchange.
///
/// Submission errors are captured by the caller and surfaced in the
/// resolution report and notification; they never abort a resolution.
#[async_trait]
pub trait TradeExecutor: Send + Sync {
    /// Submit an order.
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderReceipt, Error>;

    /// Executor name for logging/debugging.
    fn executor_name(&self) -> &'static str;
}
