//! Installment allocation: splits a rule total across its occurrences.

use rust_decimal::Decimal;

use recurra_domain::{round_cents, Money, RecurrenceRule};

/// A total split into `count` installments.
///
/// Every installment but the last carries `round(total / count)`; the last
/// absorbs the rounding drift, so the installments always sum to `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallmentPlan {
    total: Money,
    count: u32,
}

impl InstallmentPlan {
    pub fn new(total: Money, count: u32) -> Self {
        Self { total, count }
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    fn base(&self) -> Money {
        match self.total.value().checked_div(Decimal::from(self.count)) {
            Some(share) => Money::new(share),
            None => self.total,
        }
    }

    /// Amount of the installment at zero-based `ordinal`.
    pub fn amount(&self, ordinal: usize) -> Money {
        let base = self.base();
        if self.count > 0 && ordinal == self.count as usize - 1 {
            let others = base.value() * Decimal::from(self.count - 1);
            Money::new(round_cents(self.total.value() - others))
        } else {
            base
        }
    }

    /// Description of the installment at one-based `ordinal`.
    pub fn label(&self, base_description: &str, ordinal: usize) -> String {
        installment_label(base_description, ordinal, self.count)
    }

    /// All installment amounts in ordinal order.
    pub fn amounts(&self) -> impl Iterator<Item = Money> + '_ {
        (0..self.count as usize).map(move |ordinal| self.amount(ordinal))
    }
}

/// `"{base} - Parcela {ordinal}/{count}"`, or just the suffix when `base` is
/// empty.
pub fn installment_label(base: &str, ordinal: usize, count: u32) -> String {
    let label = format!("Parcela {ordinal}/{count}");
    if base.is_empty() {
        label
    } else {
        format!("{base} - {label}")
    }
}

/// Amount and description for the occurrence at zero-based `ordinal`.
///
/// Plain rules repeat their amount and description; installment plans split
/// the total. Ordinals count across the rule's whole lifetime.
pub fn occurrence_terms(rule: &RecurrenceRule, ordinal: usize) -> (Money, String) {
    match rule.max_occurrences {
        Some(count) => {
            let plan = InstallmentPlan::new(rule.amount, count);
            (plan.amount(ordinal), plan.label(&rule.description, ordinal + 1))
        }
        None => (rule.amount, rule.description.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(cents: i64, count: u32) -> InstallmentPlan {
        InstallmentPlan::new(Money::from_cents(cents), count)
    }

    #[test]
    fn last_installment_absorbs_the_remainder() {
        let amounts: Vec<_> = plan(10000, 3).amounts().collect();
        assert_eq!(
            amounts,
            vec![Money::from_cents(3333), Money::from_cents(3333), Money::from_cents(3334)]
        );
    }

    #[test]
    fn rounding_up_base_makes_last_smaller() {
        let amounts: Vec<_> = plan(200, 3).amounts().collect();
        assert_eq!(
            amounts,
            vec![Money::from_cents(67), Money::from_cents(67), Money::from_cents(66)]
        );
    }

    #[test]
    fn sums_are_exact_for_many_splits() {
        for cents in [1, 7, 99, 100, 1001, 9999, 10000, 123457, 99999999] {
            for count in 1..=36 {
                let plan = plan(cents, count);
                let sum: Money = plan.amounts().sum();
                assert_eq!(sum, Money::from_cents(cents), "{cents} cents over {count}");
            }
        }
    }

    #[test]
    fn single_installment_is_the_total() {
        assert_eq!(plan(4999, 1).amount(0), Money::from_cents(4999));
    }

    #[test]
    fn labels_number_from_one() {
        let plan = plan(10000, 12);
        assert_eq!(plan.label("Notebook", 1), "Notebook - Parcela 1/12");
        assert_eq!(plan.label("", 12), "Parcela 12/12");
    }
}
