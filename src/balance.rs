use std::collections::{BTreeMap, HashMap};

use crate::error::BalanceError;
use crate::money::MoneyCents;
use crate::schemas::{DebtSummary, Expense, User, UserId};

/// Net position of a single user: positive when owed money, negative when
/// owing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersonalBalance {
    pub user: User,
    pub net: MoneyCents,
}

/// Net balances keyed by user id, remembering the order in which users were
/// first seen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetBalances {
    entries: Vec<PersonalBalance>,
    index: HashMap<UserId, usize>,
}

impl NetBalances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds balances from raw `(user id, net)` pairs. Repeated ids are
    /// summed.
    pub fn from_amounts<I, K>(amounts: I) -> Result<Self, BalanceError>
    where
        I: IntoIterator<Item = (K, MoneyCents)>,
        K: Into<UserId>,
    {
        let mut balances = Self::new();
        for (user_id, net) in amounts {
            balances.credit(&User::from_id(user_id), net)?;
        }
        Ok(balances)
    }

    pub fn get(&self, user_id: &str) -> Option<MoneyCents> {
        self.index.get(user_id).map(|&slot| self.entries[slot].net)
    }

    /// Iterates in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &PersonalBalance> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of every positive balance, `None` on overflow.
    pub fn total_credit(&self) -> Option<MoneyCents> {
        self.entries
            .iter()
            .filter(|entry| entry.net.is_positive())
            .try_fold(MoneyCents::ZERO, |acc, entry| acc.checked_add(entry.net))
    }

    /// Sum of the magnitudes of every negative balance, `None` on overflow.
    pub fn total_debt(&self) -> Option<MoneyCents> {
        self.entries
            .iter()
            .filter(|entry| entry.net.is_negative())
            .try_fold(MoneyCents::ZERO, |acc, entry| acc.checked_sub(entry.net))
    }

    fn slot(&mut self, user: &User) -> usize {
        if let Some(&slot) = self.index.get(&user.user_id) {
            return slot;
        }
        let slot = self.entries.len();
        self.entries.push(PersonalBalance {
            user: user.clone(),
            net: MoneyCents::ZERO,
        });
        self.index.insert(user.user_id.clone(), slot);
        slot
    }

    fn credit(&mut self, user: &User, amount: MoneyCents) -> Result<(), BalanceError> {
        let slot = self.slot(user);
        let entry = &mut self.entries[slot];
        entry.net = entry
            .net
            .checked_add(amount)
            .and_then(MoneyCents::negatable)
            .ok_or_else(|| BalanceError::Overflow {
                user_id: user.user_id.clone(),
            })?;
        Ok(())
    }

    fn debit(&mut self, user: &User, amount: MoneyCents) -> Result<(), BalanceError> {
        let slot = self.slot(user);
        let entry = &mut self.entries[slot];
        entry.net = entry
            .net
            .checked_sub(amount)
            .and_then(MoneyCents::negatable)
            .ok_or_else(|| BalanceError::Overflow {
                user_id: user.user_id.clone(),
            })?;
        Ok(())
    }
}

/// Rejects negative prices and shares. `expense` is the position reported in
/// errors.
pub fn validate_expense(expense: usize, record: &Expense) -> Result<(), BalanceError> {
    if record.price.is_negative() {
        return Err(BalanceError::NegativePrice { expense });
    }
    if let Some(split) = record
        .split_details
        .iter()
        .find(|split| split.amount.is_negative())
    {
        return Err(BalanceError::NegativeSplit {
            expense,
            user_id: split.user.user_id.clone(),
        });
    }
    Ok(())
}

/// Replays every split as a transfer from the splitter to the payer.
///
/// Split amounts are trusted as recorded: they are not checked against the
/// expense price. Shares owed by the payer to themselves are skipped.
pub fn compute_net_balances(expenses: &[Expense]) -> Result<NetBalances, BalanceError> {
    let mut balances = NetBalances::new();
    for (position, expense) in expenses.iter().enumerate() {
        validate_expense(position, expense)?;
        balances.slot(&expense.paid_by);
        for split in &expense.split_details {
            if split.user.user_id == expense.paid_by.user_id {
                continue;
            }
            balances.debit(&split.user, split.amount)?;
            balances.credit(&expense.paid_by, split.amount)?;
        }
    }
    Ok(balances)
}

/// The debts that exist if nobody simplifies anything: every pair of users is
/// netted on its own, without routing money through third parties.
///
/// Ordered by debtor id, then creditor id.
pub fn pairwise_debts(expenses: &[Expense]) -> Result<Vec<DebtSummary>, BalanceError> {
    let mut users: HashMap<UserId, User> = HashMap::new();
    // Keyed by the alphabetically ordered pair, positive when the second user
    // owes the first.
    let mut balances_between_people: BTreeMap<(UserId, UserId), MoneyCents> = BTreeMap::new();

    for (position, expense) in expenses.iter().enumerate() {
        validate_expense(position, expense)?;
        let payer = &expense.paid_by;
        for split in &expense.split_details {
            let receiver = &split.user;
            if receiver.user_id == payer.user_id {
                continue;
            }
            users
                .entry(payer.user_id.clone())
                .or_insert_with(|| payer.clone());
            users
                .entry(receiver.user_id.clone())
                .or_insert_with(|| receiver.clone());

            let (pair, amount) = if payer.user_id < receiver.user_id {
                ((payer.user_id.clone(), receiver.user_id.clone()), split.amount)
            } else {
                ((receiver.user_id.clone(), payer.user_id.clone()), -split.amount)
            };
            let balance = balances_between_people.entry(pair).or_default();
            *balance = balance
                .checked_add(amount)
                .and_then(MoneyCents::negatable)
                .ok_or_else(|| BalanceError::Overflow {
                    user_id: payer.user_id.clone(),
                })?;
        }
    }

    let lookup = |user_id: &UserId| {
        users
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| User::from_id(user_id.clone()))
    };

    let mut debts: Vec<DebtSummary> = balances_between_people
        .into_iter()
        .filter(|(_, balance)| !balance.is_zero())
        .map(|((first, second), balance)| {
            let (from, to) = if balance.is_positive() {
                (second, first)
            } else {
                (first, second)
            };
            DebtSummary {
                from_user: lookup(&from),
                to_user: lookup(&to),
                amount: balance.abs(),
            }
        })
        .collect();
    debts.sort_by(|a, b| {
        a.from_user
            .user_id
            .cmp(&b.from_user.user_id)
            .then_with(|| a.to_user.user_id.cmp(&b.to_user.user_id))
    });
    Ok(debts)
}
