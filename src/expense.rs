//! Expense create/edit/delete with balance-maintaining side effects.
//!
//! Stored member balances are a cache over the expense list. Every mutation
//! validates first, then applies or reverses the per-member share, so the
//! cache always equals what [`crate::balance::net_balances`] would recompute
//! and a failed operation leaves the dashboard untouched.

use std::collections::BTreeSet;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::Error;
use crate::money;
use crate::schemas::{Dashboard, Expense, MemberName};

/// Client-supplied expense details, used for both create and edit.
#[derive(Clone, Debug, Deserialize)]
pub struct NewExpense {
    #[serde(rename = "type")]
    pub expense_type: String,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    pub paid_by: MemberName,
    pub shared_by: BTreeSet<MemberName>,
}

fn validate(dashboard: &Dashboard, details: &NewExpense) -> Result<(), Error> {
    if details.expense_type.trim().is_empty() {
        return Err(Error::InvalidExpense("expense type must not be empty"));
    }
    if details.amount <= Decimal::ZERO {
        return Err(Error::InvalidExpense("amount must be positive"));
    }
    if details.amount.scale() > 2 {
        return Err(Error::InvalidExpense(
            "amount must have at most two decimal places",
        ));
    }
    if details.shared_by.is_empty() {
        return Err(Error::InvalidExpense(
            "an expense must be shared by at least one member",
        ));
    }
    if !details.shared_by.contains(&details.paid_by) {
        return Err(Error::InvalidExpense("the payer must be one of the sharers"));
    }
    for sharer in &details.shared_by {
        if dashboard.member(sharer).is_none() {
            return Err(Error::GroupMemberNotFound(sharer.clone()));
        }
    }
    Ok(())
}

/// Moves one expense's worth of shares through the stored balances: the
/// payer is credited the other sharers' portions and each other sharer is
/// debited one even share. The payer absorbs the division remainder, so the
/// sheet stays exactly zero-sum. Called with a negated amount to reverse a
/// previously applied expense.
fn distribute(dashboard: &mut Dashboard, amount: Decimal, paid_by: &str, shared_by: &BTreeSet<MemberName>) {
    let share = money::split_evenly(amount, shared_by.len());
    let others = shared_by.len() as i64 - 1;
    if let Some(payer) = dashboard.member_mut(paid_by) {
        payer.balance = money::round2(payer.balance + share * Decimal::from(others));
    }
    for sharer in shared_by {
        if sharer.as_str() == paid_by {
            continue;
        }
        if let Some(member) = dashboard.member_mut(sharer) {
            member.balance = money::round2(member.balance - share);
        }
    }
}

/// Validates and records a new expense, updating every sharer's balance.
pub fn add_expense(dashboard: &mut Dashboard, details: NewExpense) -> Result<Expense, Error> {
    validate(dashboard, &details)?;
    distribute(dashboard, details.amount, &details.paid_by, &details.shared_by);

    let expense = Expense {
        id: Uuid::new_v4(),
        expense_type: details.expense_type,
        amount: money::round2(details.amount),
        description: details.description,
        paid_by: details.paid_by,
        shared_by: details.shared_by,
        created_at: Utc::now(),
    };
    tracing::info!(id = %expense.id, amount = %expense.amount, "added expense");
    dashboard.expenses.push(expense.clone());
    Ok(expense)
}

/// Replaces an expense's details, reversing the original share under the
/// original amount and sharer set before applying the new one.
pub fn update_expense(
    dashboard: &mut Dashboard,
    id: Uuid,
    details: NewExpense,
) -> Result<Expense, Error> {
    let index = dashboard
        .expenses
        .iter()
        .position(|expense| expense.id == id)
        .ok_or(Error::ExpenseNotFound)?;
    validate(dashboard, &details)?;

    let original = dashboard.expenses[index].clone();
    distribute(dashboard, -original.amount, &original.paid_by, &original.shared_by);
    distribute(dashboard, details.amount, &details.paid_by, &details.shared_by);

    let expense = &mut dashboard.expenses[index];
    expense.expense_type = details.expense_type;
    expense.amount = money::round2(details.amount);
    expense.description = details.description;
    expense.paid_by = details.paid_by;
    expense.shared_by = details.shared_by;
    tracing::info!(id = %expense.id, amount = %expense.amount, "updated expense");
    Ok(expense.clone())
}

/// Removes an expense after reversing its share from every sharer's balance.
pub fn delete_expense(dashboard: &mut Dashboard, id: Uuid) -> Result<Expense, Error> {
    let index = dashboard
        .expenses
        .iter()
        .position(|expense| expense.id == id)
        .ok_or(Error::ExpenseNotFound)?;

    let expense = dashboard.expenses.remove(index);
    distribute(dashboard, -expense.amount, &expense.paid_by, &expense.shared_by);
    tracing::info!(id = %expense.id, "deleted expense");
    Ok(expense)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::net_balances;
    use crate::schemas::GroupMember;
    use rust_decimal_macros::dec;

    fn dashboard_with(members: &[&str]) -> Dashboard {
        let mut dashboard = Dashboard::new("jane01", "Jane");
        for name in members {
            dashboard.members.push(GroupMember::new((*name).to_owned()));
        }
        dashboard
    }

    fn details(amount: Decimal, paid_by: &str, shared_by: &[&str]) -> NewExpense {
        NewExpense {
            expense_type: "Food".to_owned(),
            amount,
            description: String::new(),
            paid_by: paid_by.to_owned(),
            shared_by: shared_by.iter().map(|name| (*name).to_owned()).collect(),
        }
    }

    fn stored_balances(dashboard: &Dashboard) -> Vec<(String, Decimal)> {
        dashboard
            .members
            .iter()
            .map(|member| (member.name.clone(), member.balance))
            .collect()
    }

    /// Stored balances must stay equal to a from-scratch recomputation.
    fn assert_cache_consistent(dashboard: &Dashboard) {
        let recomputed = net_balances(dashboard);
        for member in &dashboard.members {
            assert_eq!(member.balance, recomputed[&member.name], "{}", member.name);
        }
    }

    #[test]
    fn add_updates_stored_balances() {
        let mut dashboard = dashboard_with(&["Jane", "Doe", "John"]);
        add_expense(&mut dashboard, details(dec!(100.00), "Jane", &["Jane", "Doe", "John"]))
            .unwrap();

        assert_eq!(dashboard.member("Jane").unwrap().balance, dec!(66.66));
        assert_eq!(dashboard.member("Doe").unwrap().balance, dec!(-33.33));
        assert_eq!(dashboard.member("John").unwrap().balance, dec!(-33.33));
        assert_cache_consistent(&dashboard);
    }

    #[test]
    fn add_rejects_unknown_sharer_without_touching_balances() {
        let mut dashboard = dashboard_with(&["Jane", "Doe"]);
        let before = stored_balances(&dashboard);

        let result = add_expense(&mut dashboard, details(dec!(10.00), "Jane", &["Jane", "Ghost"]));
        assert!(matches!(result, Err(Error::GroupMemberNotFound(name)) if name == "Ghost"));
        assert_eq!(stored_balances(&dashboard), before);
        assert!(dashboard.expenses.is_empty());
    }

    #[test]
    fn add_rejects_invalid_details() {
        let mut dashboard = dashboard_with(&["Jane", "Doe"]);

        let nonpositive = add_expense(&mut dashboard, details(dec!(0.00), "Jane", &["Jane", "Doe"]));
        assert!(matches!(nonpositive, Err(Error::InvalidExpense(_))));

        let no_sharers = add_expense(&mut dashboard, details(dec!(10.00), "Jane", &[]));
        assert!(matches!(no_sharers, Err(Error::InvalidExpense(_))));

        let payer_outside = add_expense(&mut dashboard, details(dec!(10.00), "Jane", &["Doe"]));
        assert!(matches!(payer_outside, Err(Error::InvalidExpense(_))));

        let sub_cent = add_expense(&mut dashboard, details(dec!(10.005), "Jane", &["Jane", "Doe"]));
        assert!(matches!(sub_cent, Err(Error::InvalidExpense(_))));

        let mut blank_type = details(dec!(10.00), "Jane", &["Jane", "Doe"]);
        blank_type.expense_type = "  ".to_owned();
        assert!(matches!(
            add_expense(&mut dashboard, blank_type),
            Err(Error::InvalidExpense(_))
        ));
    }

    #[test]
    fn update_reverses_then_reapplies() {
        let mut dashboard = dashboard_with(&["Jane", "Doe", "John"]);
        let expense = add_expense(
            &mut dashboard,
            details(dec!(120.00), "Jane", &["Jane", "Doe"]),
        )
        .unwrap();

        // Move the cost onto a different payer and sharer set.
        update_expense(
            &mut dashboard,
            expense.id,
            details(dec!(90.00), "Doe", &["Doe", "John"]),
        )
        .unwrap();

        assert_eq!(dashboard.member("Jane").unwrap().balance, dec!(0.00));
        assert_eq!(dashboard.member("Doe").unwrap().balance, dec!(45.00));
        assert_eq!(dashboard.member("John").unwrap().balance, dec!(-45.00));
        assert_cache_consistent(&dashboard);
    }

    #[test]
    fn update_of_unknown_expense_fails() {
        let mut dashboard = dashboard_with(&["Jane", "Doe"]);
        let result = update_expense(
            &mut dashboard,
            Uuid::new_v4(),
            details(dec!(10.00), "Jane", &["Jane", "Doe"]),
        );
        assert!(matches!(result, Err(Error::ExpenseNotFound)));
    }

    #[test]
    fn failed_update_leaves_balances_alone() {
        let mut dashboard = dashboard_with(&["Jane", "Doe"]);
        let expense = add_expense(
            &mut dashboard,
            details(dec!(120.00), "Jane", &["Jane", "Doe"]),
        )
        .unwrap();
        let before = stored_balances(&dashboard);

        let result = update_expense(
            &mut dashboard,
            expense.id,
            details(dec!(90.00), "Ghost", &["Ghost", "Doe"]),
        );
        assert!(matches!(result, Err(Error::GroupMemberNotFound(_))));
        assert_eq!(stored_balances(&dashboard), before);
    }

    #[test]
    fn delete_restores_prior_balances() {
        let mut dashboard = dashboard_with(&["Jane", "Doe", "John"]);
        add_expense(&mut dashboard, details(dec!(50.00), "Doe", &["Doe", "John"])).unwrap();
        let before = stored_balances(&dashboard);

        let uneven = add_expense(
            &mut dashboard,
            details(dec!(100.00), "Jane", &["Jane", "Doe", "John"]),
        )
        .unwrap();
        delete_expense(&mut dashboard, uneven.id).unwrap();

        assert_eq!(stored_balances(&dashboard), before);
        assert_cache_consistent(&dashboard);
    }

    #[test]
    fn delete_of_unknown_expense_fails() {
        let mut dashboard = dashboard_with(&["Jane"]);
        assert!(matches!(
            delete_expense(&mut dashboard, Uuid::new_v4()),
            Err(Error::ExpenseNotFound)
        ));
    }
}
