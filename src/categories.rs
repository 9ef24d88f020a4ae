use std::collections::BTreeMap;

use serde::Serialize;

use crate::balance::validate_expense;
use crate::error::BalanceError;
use crate::money::MoneyCents;
use crate::schemas::Expense;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    /// `None` collects every uncategorised expense.
    pub category: Option<String>,
    pub total: MoneyCents,
    pub expense_count: usize,
}

/// Sums expense prices per category. Named categories come first in
/// alphabetical order, uncategorised spending last.
pub fn category_totals(expenses: &[Expense]) -> Result<Vec<CategoryTotal>, BalanceError> {
    let mut named: BTreeMap<&str, (MoneyCents, usize)> = BTreeMap::new();
    let mut uncategorised = (MoneyCents::ZERO, 0usize);

    for (position, expense) in expenses.iter().enumerate() {
        validate_expense(position, expense)?;
        let slot = match expense.category.as_deref().map(str::trim) {
            Some(category) if !category.is_empty() => named.entry(category).or_default(),
            _ => &mut uncategorised,
        };
        slot.0 = slot
            .0
            .checked_add(expense.price)
            .ok_or_else(|| BalanceError::Overflow {
                user_id: expense.paid_by.user_id.clone(),
            })?;
        slot.1 += 1;
    }

    let mut totals: Vec<CategoryTotal> = named
        .into_iter()
        .map(|(category, (total, expense_count))| CategoryTotal {
            category: Some(category.to_string()),
            total,
            expense_count,
        })
        .collect();
    if uncategorised.1 > 0 {
        totals.push(CategoryTotal {
            category: None,
            total: uncategorised.0,
            expense_count: uncategorised.1,
        });
    }
    Ok(totals)
}
