//! Net-balance calculator and expense aggregations over one dashboard.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::money;
use crate::schemas::{Dashboard, MemberName};

pub type BalanceSheet = BTreeMap<MemberName, Decimal>;

/// Net position of every group member: positive means the group owes them,
/// negative means they owe the group.
///
/// Every member starts at `0.00`. For each expense the payer is credited the
/// other sharers' portions and each other sharer is debited one even share,
/// with every touched balance re-rounded to two decimals before the next
/// expense is applied. The payer absorbs any division remainder through
/// their own share, so the sheet sums to exactly `0.00` and the result does
/// not depend on the order the expenses are applied in.
pub fn net_balances(dashboard: &Dashboard) -> BalanceSheet {
    let mut balances: BalanceSheet = dashboard
        .members
        .iter()
        .map(|member| (member.name.clone(), money::zero()))
        .collect();

    for expense in &dashboard.expenses {
        if expense.shared_by.is_empty() {
            continue;
        }
        let share = money::split_evenly(expense.amount, expense.shared_by.len());
        let others = expense.shared_by.len() as i64 - 1;
        if let Some(balance) = balances.get_mut(&expense.paid_by) {
            *balance = money::round2(*balance + share * Decimal::from(others));
        }
        for sharer in &expense.shared_by {
            if sharer.as_str() == expense.paid_by {
                continue;
            }
            if let Some(balance) = balances.get_mut(sharer) {
                *balance = money::round2(*balance - share);
            }
        }
    }

    balances
}

/// Sum of all expense amounts on the dashboard.
pub fn total_sum(dashboard: &Dashboard) -> Decimal {
    money::round2(dashboard.expenses.iter().map(|expense| expense.amount).sum())
}

/// Total amount spent per expense type.
pub fn sum_by_type(dashboard: &Dashboard) -> BTreeMap<String, Decimal> {
    let mut sums = BTreeMap::new();
    for expense in &dashboard.expenses {
        let entry = sums
            .entry(expense.expense_type.clone())
            .or_insert_with(money::zero);
        *entry = money::round2(*entry + expense.amount);
    }
    sums
}

/// Number of expenses per expense type.
pub fn count_by_type(dashboard: &Dashboard) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for expense in &dashboard.expenses {
        *counts.entry(expense.expense_type.clone()).or_insert(0) += 1;
    }
    counts
}
