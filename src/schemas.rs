use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::MoneyCents;

pub type UserId = String;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub user_id: UserId,
    pub name: String,
    #[serde(default)]
    pub profile_image: String,
}

impl User {
    pub fn new(user_id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            profile_image: String::new(),
        }
    }

    /// A user known only by id, with the id doubling as display name.
    pub fn from_id(user_id: impl Into<UserId>) -> Self {
        let user_id = user_id.into();
        Self {
            name: user_id.clone(),
            user_id,
            profile_image: String::new(),
        }
    }
}

/// One participant's share of a single expense.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SplitDetail {
    pub user: User,
    pub amount: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Expense {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    pub price: MoneyCents,
    pub paid_by: User,
    #[serde(default)]
    pub split_details: Vec<SplitDetail>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Expense {
    pub fn new(price: MoneyCents, paid_by: User, split_details: Vec<SplitDetail>) -> Self {
        Self {
            title: String::new(),
            category: None,
            price,
            paid_by,
            split_details,
            created_at: None,
        }
    }

    /// Shares `price` evenly among `users`, handing leftover cents to the
    /// first users in the list so that the shares always add up to `price`.
    pub fn split_evenly(price: MoneyCents, paid_by: User, users: &[User]) -> Self {
        let mut split_details = Vec::with_capacity(users.len());
        if let Ok(count) = i64::try_from(users.len()) {
            if count > 0 {
                let share = price.cents() / count;
                let remainder = price.cents() % count;
                for (idx, user) in (0..).zip(users) {
                    let extra = i64::from(idx < remainder);
                    split_details.push(SplitDetail {
                        user: user.clone(),
                        amount: MoneyCents::new(share + extra),
                    });
                }
            }
        }
        Self::new(price, paid_by, split_details)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// A single settlement transfer: `from_user` pays `to_user`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DebtSummary {
    pub from_user: User,
    pub to_user: User,
    pub amount: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GroupSummary {
    pub id: String,
    pub name: String,
    pub expense_count: usize,
}

impl From<&Group> for GroupSummary {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id.clone(),
            name: group.name.clone(),
            expense_count: group.expenses.len(),
        }
    }
}
