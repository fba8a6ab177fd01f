//! Greedy debt-settlement planner.
//!
//! Consumes the balance sheet produced by [`crate::balance::net_balances`]
//! and reduces it to per-debtor payment instructions by repeatedly matching
//! the smallest outstanding debt against the largest outstanding credit.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap};

use rust_decimal::Decimal;

use crate::balance::{net_balances, BalanceSheet};
use crate::money;
use crate::schemas::{Dashboard, MemberName};

/// Heap entry pairing a member with what they still owe or are still owed.
#[derive(Clone, Debug, PartialEq, Eq)]
struct MemberBalance {
    name: MemberName,
    amount: Decimal,
}

impl Ord for MemberBalance {
    fn cmp(&self, other: &Self) -> Ordering {
        // Amount first; the name breaks ties so two members owing the same
        // amount are always paired in the same order.
        self.amount
            .cmp(&other.amount)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for MemberBalance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reduce a zero-sum balance sheet to `"Pay {amount} to {creditor}"`
/// instructions, keyed by debtor, in the order they were generated.
///
/// Debtors are consumed smallest debt first and creditors largest credit
/// first, which clears small debts quickly. This is a greedy reduction, not
/// a guarantee of the globally minimal transaction count. Each round settles
/// `min(debt, credit)` and reinserts whichever side still has an amount
/// outstanding, so the loop strictly shrinks the total and terminates in at
/// most `debtors + creditors - 1` instructions.
pub fn settle(balances: &BalanceSheet) -> BTreeMap<MemberName, Vec<String>> {
    let mut debtors = BinaryHeap::new();
    let mut creditors = BinaryHeap::new();

    for (name, balance) in balances {
        if *balance > Decimal::ZERO {
            creditors.push(MemberBalance {
                name: name.clone(),
                amount: *balance,
            });
        } else if *balance < Decimal::ZERO {
            debtors.push(Reverse(MemberBalance {
                name: name.clone(),
                amount: -*balance,
            }));
        }
    }

    let mut settlements: BTreeMap<MemberName, Vec<String>> = BTreeMap::new();

    loop {
        let Some(Reverse(mut debtor)) = debtors.pop() else {
            break;
        };
        // Only pop a creditor once a debtor is in hand: if the sheet is not
        // zero-sum, the unmatched side stays in its heap instead of being
        // popped and lost.
        let Some(mut creditor) = creditors.pop() else {
            debtors.push(Reverse(debtor));
            break;
        };

        let settle_amount = money::round2(debtor.amount.min(creditor.amount));
        debtor.amount -= settle_amount;
        creditor.amount -= settle_amount;

        tracing::debug!(
            debtor = %debtor.name,
            creditor = %creditor.name,
            amount = %settle_amount,
            "matched settlement"
        );
        settlements
            .entry(debtor.name.clone())
            .or_default()
            .push(format!("Pay {settle_amount} to {}", creditor.name));

        if debtor.amount > Decimal::ZERO {
            debtors.push(Reverse(debtor));
        }
        if creditor.amount > Decimal::ZERO {
            creditors.push(creditor);
        }
    }

    settlements
}

/// Settlement instructions for a dashboard, computed from its net balances.
pub fn settle_dashboard(dashboard: &Dashboard) -> BTreeMap<MemberName, Vec<String>> {
    settle(&net_balances(dashboard))
}
