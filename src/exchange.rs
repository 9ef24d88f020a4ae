use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::balance::{compute_net_balances, NetBalances};
use crate::error::BalanceError;
use crate::money::MoneyCents;
use crate::schemas::{DebtSummary, Expense, User};

/// Balances whose magnitude is below this are treated as settled. One cent
/// means anything under half a cent before rounding, i.e. only exact zeros.
pub const SETTLEMENT_EPSILON: MoneyCents = MoneyCents::new(1);

/// How equal magnitudes are ordered when picking the next debtor/creditor.
pub const DEFAULT_TIE_BREAK: TieBreak = TieBreak::UserIdAscending;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Lower user id goes first.
    #[default]
    UserIdAscending,
    /// The user that appears first in the expense list goes first.
    FirstSeen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SettlementConfig {
    pub epsilon: MoneyCents,
    pub tie_break: TieBreak,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            epsilon: SETTLEMENT_EPSILON,
            tie_break: DEFAULT_TIE_BREAK,
        }
    }
}

impl SettlementConfig {
    /// Whether `remaining` counts as settled. Zero always does, whatever the
    /// configured epsilon.
    fn is_settled(&self, remaining: MoneyCents) -> bool {
        remaining.is_zero() || remaining < self.epsilon
    }
}

#[derive(Clone, Debug)]
struct Outstanding {
    user: User,
    seen_at: usize,
    remaining: MoneyCents,
}

/// Orders so that the entry to settle next sorts last.
fn by_priority(tie_break: TieBreak) -> impl Fn(&Outstanding, &Outstanding) -> Ordering {
    move |a, b| {
        a.remaining.cmp(&b.remaining).then_with(|| match tie_break {
            TieBreak::UserIdAscending => b.user.user_id.cmp(&a.user.user_id),
            TieBreak::FirstSeen => b.seen_at.cmp(&a.seen_at),
        })
    }
}

/// Greedy settlement: the largest debtor pays the largest creditor as much as
/// either of them can, until nobody is left owing or owed.
///
/// Produces at most `n - 1` transfers for `n` users with a non-zero balance.
/// The result keeps the order in which transfers were produced.
pub fn settle_balances(balances: &NetBalances, config: &SettlementConfig) -> Vec<DebtSummary> {
    let mut payers = Vec::new();
    let mut receivers = Vec::new();

    for (seen_at, balance) in balances.iter().enumerate() {
        let person = Outstanding {
            user: balance.user.clone(),
            seen_at,
            remaining: balance.net.abs(),
        };
        if config.is_settled(person.remaining) {
            continue;
        }
        if balance.net.is_negative() {
            payers.push(person);
        } else {
            receivers.push(person);
        }
    }

    let priority = by_priority(config.tie_break);
    let mut exchanges = Vec::new();

    while !payers.is_empty() && !receivers.is_empty() {
        payers.sort_by(&priority);
        receivers.sort_by(&priority);

        let (Some(payer), Some(receiver)) = (payers.last_mut(), receivers.last_mut()) else {
            break;
        };

        let amount = payer.remaining.min(receiver.remaining);
        payer.remaining -= amount;
        receiver.remaining -= amount;

        tracing::trace!(
            from = %payer.user.user_id,
            to = %receiver.user.user_id,
            amount = %amount,
            "settlement transfer"
        );
        exchanges.push(DebtSummary {
            from_user: payer.user.clone(),
            to_user: receiver.user.clone(),
            amount,
        });

        if config.is_settled(payer.remaining) {
            payers.pop();
        }
        if config.is_settled(receiver.remaining) {
            receivers.pop();
        }
    }

    exchanges
}

/// Net balances and greedy settlement in one go.
pub fn settle_expenses(
    expenses: &[Expense],
    config: &SettlementConfig,
) -> Result<Vec<DebtSummary>, BalanceError> {
    let balances = compute_net_balances(expenses)?;
    Ok(settle_balances(&balances, config))
}
