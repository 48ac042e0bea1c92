//! Trade engine: validates a buy/sell against the user's ledger and commits
//! the resulting balance, position, and transaction atomically.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::error::CoreError;
use crate::persistence::{LedgerStore, PositionChange, StoreError, TradeCommit};
use crate::pricing::resolve_price;
use crate::quotes::QuoteProvider;
use crate::types::{TradeAction, Transaction};

/// Commit retries after a version conflict before giving up.
const MAX_COMMIT_RETRIES: u32 = 3;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TradeReceipt {
    pub symbol: String,
    pub shares: i64,
    pub price: Decimal,
    pub total: Decimal,
    pub action: TradeAction,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TradeOutcome {
    pub new_balance: Decimal,
    pub transaction: TradeReceipt,
}

/// Execute one trade. The price is resolved once, up front; the balance and
/// share checks run against fresh ledger state on every commit attempt, so a
/// concurrent trade can never make this one overdraw or oversell.
pub async fn execute_trade(
    ledger: &dyn LedgerStore,
    quotes: &dyn QuoteProvider,
    user_id: Uuid,
    symbol: &str,
    shares: i64,
    action: TradeAction,
) -> Result<TradeOutcome, CoreError> {
    if shares <= 0 {
        return Err(CoreError::InvalidShares(shares));
    }
    let symbol = symbol.to_uppercase();

    let price = resolve_price(quotes, &symbol)
        .await
        .ok_or_else(|| CoreError::PriceUnavailable(symbol.clone()))?;
    let total = price * Decimal::from(shares);

    let mut retries = 0;
    loop {
        let user = ledger
            .get_user(user_id)
            .await?
            .ok_or(CoreError::UserNotFound)?;
        let position = ledger.get_position(user_id, &symbol).await?;

        let (new_balance, change) = match action {
            TradeAction::Buy => {
                if total > user.cash_balance {
                    return Err(CoreError::InsufficientFunds {
                        cost: total,
                        balance: user.cash_balance,
                    });
                }
                let change = match position {
                    Some(pos) => {
                        let new_shares = pos.shares + shares;
                        let new_avg = (pos.average_cost * Decimal::from(pos.shares) + total)
                            / Decimal::from(new_shares);
                        PositionChange::Upsert {
                            symbol: symbol.clone(),
                            shares: new_shares,
                            average_cost: new_avg,
                        }
                    }
                    None => PositionChange::Upsert {
                        symbol: symbol.clone(),
                        shares,
                        average_cost: price,
                    },
                };
                (user.cash_balance - total, change)
            }
            TradeAction::Sell => {
                let pos = position.ok_or_else(|| CoreError::NoSuchPosition(symbol.clone()))?;
                if shares > pos.shares {
                    return Err(CoreError::InsufficientShares { owned: pos.shares });
                }
                let remaining = pos.shares - shares;
                let change = if remaining == 0 {
                    PositionChange::Remove {
                        symbol: symbol.clone(),
                    }
                } else {
                    PositionChange::Upsert {
                        symbol: symbol.clone(),
                        shares: remaining,
                        average_cost: pos.average_cost,
                    }
                };
                (user.cash_balance + total, change)
            }
        };

        let record = Transaction {
            id: Uuid::new_v4(),
            user_id,
            symbol: symbol.clone(),
            shares,
            price,
            action,
            created_at: Utc::now(),
        };
        let commit = TradeCommit {
            user_id,
            expected_version: user.version,
            new_balance,
            position: change,
            record,
        };

        match ledger.commit_trade(commit).await {
            Ok(()) => {
                tracing::info!(
                    %user_id,
                    %symbol,
                    shares,
                    %price,
                    action = action.as_str(),
                    "trade executed"
                );
                return Ok(TradeOutcome {
                    new_balance,
                    transaction: TradeReceipt {
                        symbol,
                        shares,
                        price,
                        total,
                        action,
                    },
                });
            }
            Err(StoreError::VersionConflict) if retries < MAX_COMMIT_RETRIES => {
                retries += 1;
                tracing::debug!(%user_id, %symbol, retries, "ledger changed under us, retrying");
            }
            Err(err) => return Err(err.into()),
        }
    }
}
