use rust_decimal::Decimal;

use recurra_domain::{has_cent_precision, Frequency, Money, NewRecurrenceRule};

use crate::{installment::InstallmentPlan, CoreError};

/// Checks a draft before anything is persisted and returns its parsed
/// frequency.
pub fn validate(draft: &NewRecurrenceRule) -> Result<Frequency, CoreError> {
    let frequency: Frequency = draft
        .frequency
        .parse()
        .map_err(|_| CoreError::InvalidFrequency(draft.frequency.clone()))?;

    if draft.amount <= Decimal::ZERO {
        return Err(CoreError::Validation(format!(
            "amount must be positive (got {})",
            draft.amount
        )));
    }
    if !has_cent_precision(draft.amount) {
        return Err(CoreError::Validation(format!(
            "amount {} has more than two decimal places",
            draft.amount
        )));
    }
    if let Some(day) = draft.day_of_month {
        if !(1..=31).contains(&day) {
            return Err(CoreError::Validation(format!(
                "day_of_month must be between 1 and 31 (got {day})"
            )));
        }
    }
    if let Some(count) = draft.max_occurrences {
        if count == 0 {
            return Err(CoreError::Validation(
                "max_occurrences must be at least 1".into(),
            ));
        }
        // Both the repeated share and the last one must stay positive.
        let plan = InstallmentPlan::new(Money::new(draft.amount), count);
        let last = count as usize - 1;
        if !plan.amount(0).is_positive() || !plan.amount(last).is_positive() {
            return Err(CoreError::Validation(format!(
                "amount {} cannot be split into {count} positive installments",
                draft.amount
            )));
        }
    }
    if let Some(end) = draft.end_date {
        if end < draft.start_date {
            return Err(CoreError::Validation(format!(
                "end_date {end} is before start_date {}",
                draft.start_date
            )));
        }
    }
    Ok(frequency)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use recurra_domain::TransactionKind;

    use super::*;

    fn draft() -> NewRecurrenceRule {
        NewRecurrenceRule {
            owner_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            kind: TransactionKind::Expense,
            amount: Decimal::new(5000, 2),
            description: "Rent".into(),
            frequency: "monthly".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            end_date: None,
            max_occurrences: None,
            day_of_month: None,
        }
    }

    #[test]
    fn accepts_well_formed_draft() {
        assert_eq!(validate(&draft()).unwrap(), Frequency::Monthly);
    }

    #[test]
    fn rejects_unknown_frequency() {
        let mut bad = draft();
        bad.frequency = "daily".into();
        let err = validate(&bad).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFrequency(ref f) if f == "daily"));
        assert!(err.is_validation());
    }

    #[test]
    fn rejects_non_positive_and_sub_cent_amounts() {
        let mut zero = draft();
        zero.amount = Decimal::ZERO;
        assert!(validate(&zero).unwrap_err().is_validation());

        let mut fractional = draft();
        fractional.amount = Decimal::new(10001, 3);
        assert!(validate(&fractional).unwrap_err().is_validation());
    }

    #[test]
    fn rejects_out_of_range_schedule_bounds() {
        let mut day = draft();
        day.day_of_month = Some(32);
        assert!(validate(&day).is_err());

        let mut count = draft();
        count.max_occurrences = Some(0);
        assert!(validate(&count).is_err());

        let mut end = draft();
        end.end_date = NaiveDate::from_ymd_opt(2024, 12, 31);
        assert!(validate(&end).is_err());
    }

    #[test]
    fn rejects_installment_plans_with_non_positive_shares() {
        // 0.05 / 10 rounds to 0.01, leaving -0.04 for the last installment.
        let mut negative_last = draft();
        negative_last.amount = Decimal::new(5, 2);
        negative_last.max_occurrences = Some(10);
        assert!(validate(&negative_last).unwrap_err().is_validation());

        // 0.04 / 10 rounds to 0.00 for every installment but the last.
        let mut zero_base = draft();
        zero_base.amount = Decimal::new(4, 2);
        zero_base.max_occurrences = Some(10);
        assert!(validate(&zero_base).unwrap_err().is_validation());

        let mut uneven = draft();
        uneven.amount = Decimal::new(10000, 2);
        uneven.max_occurrences = Some(3);
        assert_eq!(validate(&uneven).unwrap(), Frequency::Monthly);

        let mut single = draft();
        single.amount = Decimal::new(1, 2);
        single.max_occurrences = Some(1);
        assert!(validate(&single).is_ok());
    }
}
