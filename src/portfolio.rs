//! Portfolio valuator: positions plus cash priced into one snapshot. A symbol
//! whose price cannot be resolved is skipped, never fatal.

use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::error::CoreError;
use crate::persistence::LedgerStore;
use crate::pricing::resolve_price;
use crate::quotes::QuoteProvider;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PortfolioEntry {
    pub symbol: String,
    pub shares: i64,
    pub avg_price: Decimal,
    pub current_price: Decimal,
    pub value: Decimal,
    pub gain_loss: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PortfolioSnapshot {
    pub portfolio: Vec<PortfolioEntry>,
    pub total_value: Decimal,
    pub cash_balance: Decimal,
}

pub async fn get_portfolio(
    ledger: &dyn LedgerStore,
    quotes: &dyn QuoteProvider,
    user_id: Uuid,
) -> Result<PortfolioSnapshot, CoreError> {
    let user = ledger
        .get_user(user_id)
        .await?
        .ok_or(CoreError::UserNotFound)?;
    let positions = ledger.list_positions(user_id).await?;

    // Positions are independent once priced; fan the lookups out.
    let prices = join_all(
        positions
            .iter()
            .map(|pos| resolve_price(quotes, &pos.symbol)),
    )
    .await;

    let mut entries = Vec::with_capacity(positions.len());
    let mut total_value = user.cash_balance;
    for (pos, price) in positions.into_iter().zip(prices) {
        let Some(current_price) = price else {
            tracing::warn!(symbol = %pos.symbol, "no price available, omitting from portfolio");
            continue;
        };
        let shares = Decimal::from(pos.shares);
        let value = shares * current_price;
        let gain_loss = value - pos.average_cost * shares;
        total_value += value;
        entries.push(PortfolioEntry {
            symbol: pos.symbol,
            shares: pos.shares,
            avg_price: pos.average_cost,
            current_price,
            value,
            gain_loss,
        });
    }

    Ok(PortfolioSnapshot {
        portfolio: entries,
        total_value,
        cash_balance: user.cash_balance,
    })
}
