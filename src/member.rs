//! Group-member management for one dashboard.

use std::collections::BTreeSet;

use crate::error::Error;
use crate::schemas::{Dashboard, GroupMember};

/// Registers new members with a starting balance of `0.00`. The whole batch
/// is rejected if any name is already taken or repeated within the request.
pub fn add_members(dashboard: &mut Dashboard, names: Vec<String>) -> Result<Vec<String>, Error> {
    let mut seen = BTreeSet::new();
    for name in &names {
        if dashboard.member(name).is_some() || !seen.insert(name.as_str()) {
            return Err(Error::DuplicateGroupMember(name.clone()));
        }
    }

    for name in &names {
        dashboard.members.push(GroupMember::new(name.clone()));
        tracing::info!(member = %name, dashboard = %dashboard.name, "added group member");
    }
    Ok(names)
}

/// Whether any expense references the member as payer or sharer.
fn has_expense_ties(dashboard: &Dashboard, name: &str) -> bool {
    dashboard
        .expenses
        .iter()
        .any(|expense| expense.paid_by == name || expense.shared_by.contains(name))
}

/// Removes a member, refusing outright if they are tied to any expense.
pub fn remove_member(dashboard: &mut Dashboard, name: &str) -> Result<(), Error> {
    if dashboard.member(name).is_none() {
        return Err(Error::GroupMemberNotFound(name.to_owned()));
    }
    if has_expense_ties(dashboard, name) {
        return Err(Error::MemberHasExpenses(name.to_owned()));
    }

    dashboard.members.retain(|member| member.name != name);
    tracing::info!(member = %name, dashboard = %dashboard.name, "removed group member");
    Ok(())
}

pub fn member_names(dashboard: &Dashboard) -> Vec<String> {
    dashboard
        .members
        .iter()
        .map(|member| member.name.clone())
        .collect()
}
