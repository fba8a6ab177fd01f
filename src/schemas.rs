use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money;

pub type MemberName = String;

/// One user's private container of group members and shared expenses.
///
/// Stored as a single document, so every balance-affecting mutation commits
/// as one atomic write and readers never see a half-updated dashboard.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Dashboard {
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub members: Vec<GroupMember>,
}

/// A named participant in cost-sharing, scoped to one dashboard.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GroupMember {
    pub name: MemberName,
    /// Cached net position: positive means the group owes this member.
    /// Kept equal to what `balance::net_balances` would recompute from the
    /// expense list; only the expense apply/reverse operations may touch it.
    pub balance: Decimal,
}

/// A shared cost, split evenly across `shared_by`.
///
/// `shared_by` is a set, not a list: duplicate sharers are impossible and
/// share order is irrelevant. `paid_by` must be one of the sharers.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Expense {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub expense_type: String,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    pub paid_by: MemberName,
    pub shared_by: BTreeSet<MemberName>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Dashboard {
    pub fn new(username: &str, display_name: &str) -> Self {
        Dashboard {
            username: username.to_owned(),
            name: format!("{display_name}'s Dashboard"),
            expenses: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn member(&self, name: &str) -> Option<&GroupMember> {
        self.members.iter().find(|member| member.name == name)
    }

    pub fn member_mut(&mut self, name: &str) -> Option<&mut GroupMember> {
        self.members.iter_mut().find(|member| member.name == name)
    }

    pub fn expense(&self, id: Uuid) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    /// Clears all expenses and group members. Idempotent.
    pub fn reset(&mut self) {
        self.expenses.clear();
        self.members.clear();
    }
}

impl GroupMember {
    pub fn new(name: MemberName) -> Self {
        GroupMember {
            name,
            balance: money::zero(),
        }
    }
}
