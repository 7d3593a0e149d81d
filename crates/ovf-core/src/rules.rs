//! Derived-value rules: writes that follow from other writes.
//!
//! A rule set is a declarative mapping from a controlling field id to a
//! pure function over the new value; the function's output is a batch of
//! dependent writes that go through the same write path as direct user
//! edits. New rules never touch the renderer.

use crate::id::FieldId;
use crate::model::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fee figures for one plan, as supplied by the plan table collaborator.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PlanFees {
    #[serde(rename = "baseFee", default)]
    pub base_fee: i64,
    #[serde(rename = "discountFee", default)]
    pub discount_fee: i64,
}

/// Plan id → fees. Read-only to the engine; may be empty.
pub type PlanTable = HashMap<String, PlanFees>;

/// Read-only context handed to rule functions.
pub struct RuleContext<'a> {
    pub plans: &'a PlanTable,
}

type RuleFn = Box<dyn Fn(&FieldValue, &RuleContext) -> Vec<(FieldId, FieldValue)> + Send + Sync>;

/// Controlling-field-id → derived-write function.
pub struct RuleSet {
    rules: HashMap<FieldId, RuleFn>,
}

impl RuleSet {
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// The rules every enrollment document carries: plan selection fills
    /// the fee fields.
    pub fn standard() -> Self {
        Self::empty().with_rule(FieldId::intern("plan"), plan_fee_rule)
    }

    pub fn with_rule(
        mut self,
        controlling: FieldId,
        rule: impl Fn(&FieldValue, &RuleContext) -> Vec<(FieldId, FieldValue)> + Send + Sync + 'static,
    ) -> Self {
        self.rules.insert(controlling, Box::new(rule));
        self
    }

    /// Derived writes for a change of `id` to `value`. Empty when `id`
    /// controls nothing.
    pub fn on_change(
        &self,
        id: FieldId,
        value: &FieldValue,
        ctx: &RuleContext,
    ) -> Vec<(FieldId, FieldValue)> {
        match self.rules.get(&id) {
            Some(rule) => rule(value, ctx),
            None => Vec::new(),
        }
    }
}

/// Plan selection → `baseFee`, `discountFee`, `totalFee`.
///
/// An unknown plan id means zero fees, never an error. The total is
/// floored at zero: a discount larger than the base fee must not produce
/// a negative total.
fn plan_fee_rule(value: &FieldValue, ctx: &RuleContext) -> Vec<(FieldId, FieldValue)> {
    let fees = value
        .as_str()
        .and_then(|plan| ctx.plans.get(plan))
        .copied()
        .unwrap_or_default();
    let total = (fees.base_fee - fees.discount_fee).max(0);
    vec![
        (FieldId::intern("baseFee"), FieldValue::int(fees.base_fee)),
        (
            FieldId::intern("discountFee"),
            FieldValue::int(fees.discount_fee),
        ),
        (FieldId::intern("totalFee"), FieldValue::int(total)),
    ]
}

// ─── Apply-date auto-fill ────────────────────────────────────────────────

/// The application date, supplied by the host shell. Kept as plain data
/// so sessions are deterministic and testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

/// Writes for the three date-component fields. Applied on every session
/// start through the ordinary write path, unconditionally overwriting any
/// previously persisted values.
pub fn apply_date_writes(date: ApplyDate) -> Vec<(FieldId, FieldValue)> {
    vec![
        (
            FieldId::intern("applyYear"),
            FieldValue::Text(date.year.to_string()),
        ),
        (
            FieldId::intern("applyMonth"),
            FieldValue::Text(format!("{:02}", date.month)),
        ),
        (
            FieldId::intern("applyDay"),
            FieldValue::Text(format!("{:02}", date.day)),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plans() -> PlanTable {
        let mut t = PlanTable::new();
        t.insert(
            "5G basic".into(),
            PlanFees {
                base_fee: 50_000,
                discount_fee: 10_000,
            },
        );
        t.insert(
            "promo".into(),
            PlanFees {
                base_fee: 50_000,
                discount_fee: 60_000,
            },
        );
        t
    }

    fn derived(plan: &str) -> HashMap<FieldId, FieldValue> {
        let plans = plans();
        let ctx = RuleContext { plans: &plans };
        RuleSet::standard()
            .on_change(FieldId::intern("plan"), &FieldValue::from(plan), &ctx)
            .into_iter()
            .collect()
    }

    #[test]
    fn plan_selection_fills_fees() {
        let writes = derived("5G basic");
        assert_eq!(writes[&FieldId::intern("baseFee")], FieldValue::int(50_000));
        assert_eq!(
            writes[&FieldId::intern("discountFee")],
            FieldValue::int(10_000)
        );
        assert_eq!(writes[&FieldId::intern("totalFee")], FieldValue::int(40_000));
    }

    #[test]
    fn total_floors_at_zero() {
        let writes = derived("promo");
        assert_eq!(writes[&FieldId::intern("totalFee")], FieldValue::int(0));
    }

    #[test]
    fn unknown_plan_means_zero_fees() {
        let writes = derived("no such plan");
        assert_eq!(writes[&FieldId::intern("baseFee")], FieldValue::int(0));
        assert_eq!(writes[&FieldId::intern("totalFee")], FieldValue::int(0));
    }

    #[test]
    fn uncontrolled_field_derives_nothing() {
        let plans = plans();
        let ctx = RuleContext { plans: &plans };
        let writes = RuleSet::standard().on_change(
            FieldId::intern("name"),
            &FieldValue::from("Kim"),
            &ctx,
        );
        assert!(writes.is_empty());
    }

    #[test]
    fn apply_date_is_zero_padded() {
        let writes: HashMap<_, _> = apply_date_writes(ApplyDate {
            year: 2026,
            month: 3,
            day: 7,
        })
        .into_iter()
        .collect();
        assert_eq!(
            writes[&FieldId::intern("applyYear")],
            FieldValue::Text("2026".into())
        );
        assert_eq!(
            writes[&FieldId::intern("applyMonth")],
            FieldValue::Text("03".into())
        );
        assert_eq!(
            writes[&FieldId::intern("applyDay")],
            FieldValue::Text("07".into())
        );
    }
}
