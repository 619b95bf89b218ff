//! Order execution for the Polymarket CLOB.
//!
//! [`ClobExecutor`] signs and posts real limit orders through the
//! Polymarket SDK and only exists behind the `trading` feature.
//! [`DryRunExecutor`] is always available: it records what would have been
//! sent and answers with a synthetic receipt.

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::info;

use crate::error::Result;
use crate::port::{OrderReceipt, OrderRequest, TradeExecutor};

/// Executor that never touches an exchange.
///
/// Used when `dry_run` is set and as the fallback when the binary is built
/// without the `trading` feature. Submitted orders are kept in memory so a
/// test or an operator can inspect what resolution would have traded.
#[derive(Default)]
pub struct DryRunExecutor {
    orders: Mutex<Vec<OrderRequest>>,
}

impl DryRunExecutor {
    /// Snapshot of every order submitted so far.
    #[must_use]
    pub fn submitted(&self) -> Vec<OrderRequest> {
        self.orders.lock().clone()
    }
}

#[async_trait]
impl TradeExecutor for DryRunExecutor {
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderReceipt> {
        info!(
            token = %order.token,
            side = ?order.side,
            size = %order.size,
            price = %order.price,
            "Dry-run order recorded, nothing submitted"
        );
        self.orders.lock().push(order.clone());
        Ok(OrderReceipt::dry_run())
    }

    fn executor_name(&self) -> &'static str {
        "dry-run"
    }
}

#[cfg(feature = "trading")]
pub use live::ClobExecutor;

#[cfg(feature = "trading")]
mod live {
    use std::str::FromStr;
    use std::sync::Arc;

    use alloy_signer_local::PrivateKeySigner;
    use async_trait::async_trait;
    use polymarket_client_sdk::auth::state::Authenticated;
    use polymarket_client_sdk::auth::Normal;
    use polymarket_client_sdk::clob::types::Side;
    use polymarket_client_sdk::clob::{Client, Config as ClobConfig};
    use polymarket_client_sdk::types::U256;
    use tracing::info;

    use super::super::settings::PolymarketConfig;
    use crate::error::{ConfigError, ExecutionError, Result};
    use crate::port::{OrderReceipt, OrderRequest, OrderSide, TradeExecutor};

    type AuthenticatedClient = Client<Authenticated<Normal>>;

    /// Live trade executor for the Polymarket CLOB.
    ///
    /// Holds an authenticated client and a local signer; every order is
    /// built, signed locally, and posted.
    pub struct ClobExecutor {
        client: Arc<AuthenticatedClient>,
        signer: Arc<PrivateKeySigner>,
    }

    impl ClobExecutor {
        /// Authenticate with the CLOB using the configured wallet key.
        ///
        /// # Errors
        ///
        /// Returns an error if the private key is missing or invalid, or
        /// if CLOB authentication fails.
        pub async fn new(config: &PolymarketConfig) -> Result<Self> {
            let key = config
                .private_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .ok_or(ConfigError::MissingField {
                    field: "WALLET_PRIVATE_KEY",
                })?;

            let signer = PrivateKeySigner::from_str(key)
                .map_err(|e| ConfigError::InvalidValue {
                    field: "WALLET_PRIVATE_KEY",
                    reason: e.to_string(),
                })?
                .with_chain_id(Some(config.chain_id));

            info!(
                chain_id = config.chain_id,
                address = %signer.address(),
                "Creating CLOB client"
            );

            let client = Client::new(&config.clob_url, ClobConfig::default())
                .map_err(|e| {
                    ExecutionError::AuthFailed(format!("Failed to create CLOB client: {e}"))
                })?
                .authentication_builder(&signer)
                .authenticate()
                .await
                .map_err(|e| ExecutionError::AuthFailed(e.to_string()))?;

            info!("CLOB client authenticated successfully");

            Ok(Self {
                client: Arc::new(client),
                signer: Arc::new(signer),
            })
        }
    }

    #[async_trait]
    impl TradeExecutor for ClobExecutor {
        async fn place_order(&self, order: &OrderRequest) -> Result<OrderReceipt> {
            let token_id =
                U256::from_str(order.token.as_str()).map_err(|e| {
                    ExecutionError::InvalidTokenId {
                        token_id: order.token.to_string(),
                        reason: e.to_string(),
                    }
                })?;

            let side = match order.side {
                OrderSide::Buy => Side::Buy,
                OrderSide::Sell => Side::Sell,
            };

            let built = self
                .client
                .limit_order()
                .token_id(token_id)
                .side(side)
                .price(order.price)
                .size(order.size)
                .build()
                .await
                .map_err(|e| ExecutionError::OrderBuildFailed(e.to_string()))?;

            let signed = self
                .client
                .sign(self.signer.as_ref(), built)
                .await
                .map_err(|e| ExecutionError::SigningFailed(e.to_string()))?;

            let response = self
                .client
                .post_order(signed)
                .await
                .map_err(|e| ExecutionError::SubmissionFailed(e.to_string()))?;

            info!(
                order_id = %response.order_id,
                token = %order.token,
                side = ?order.side,
                size = %order.size,
                price = %order.price,
                "Order submitted"
            );

            Ok(OrderReceipt::live(response.order_id))
        }

        fn executor_name(&self) -> &'static str {
            "polymarket-clob"
        }
    }
}
