//! Shared-expense bookkeeping: net balances, debt settlement and the HTTP
//! service around them.
//!
//! The engine ([`compute_net_balances`], [`settle_balances`]) is pure and
//! synchronous; everything async lives in [`store`] and [`routes`].
pub mod balance;
pub mod categories;
pub mod error;
pub mod exchange;
pub mod money;
pub mod routes;
pub mod schemas;
pub mod settings;
pub mod store;

pub use balance::{compute_net_balances, pairwise_debts, NetBalances, PersonalBalance};
pub use categories::{category_totals, CategoryTotal};
pub use error::{BalanceError, StoreError};
pub use exchange::{
    settle_balances, settle_expenses, SettlementConfig, TieBreak, DEFAULT_TIE_BREAK,
    SETTLEMENT_EPSILON,
};
pub use money::MoneyCents;
pub use schemas::{DebtSummary, Expense, Group, GroupSummary, SplitDetail, User, UserId};
