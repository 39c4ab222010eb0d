use chrono::NaiveDate;
use mortgage_engine_rs::{
    compute_monthly_payment, current_state, simulate_prepayment, AmortizationState, Decimal,
    LoanTerms, Money, PrepaymentStrategy, Rate,
};
use proptest::prelude::*;

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn money_from_cents(cents: i64) -> Money {
    Money::from_minor(cents, 2)
}

/// annual rate in basis points, spread over a month
fn monthly_rate_from_bps(bps: i64) -> Rate {
    Rate::from_bps(bps).monthly_rate()
}

proptest! {
    #[test]
    fn payment_fully_amortizes_principal(
        cents in 100_000i64..200_000_000,
        bps in 0i64..1_500,
        months in 1u32..=480,
    ) {
        let principal = money_from_cents(cents);
        let rate = monthly_rate_from_bps(bps);
        let payment = compute_monthly_payment(principal, rate, months).unwrap();

        prop_assert!(!payment.is_negative());

        let mut balance = principal.as_decimal();
        for _ in 0..months {
            balance = balance + balance * rate.as_decimal() - payment.as_decimal();
        }
        prop_assert!(balance.abs() <= Decimal::new(1, 2), "residual {}", balance);
    }

    #[test]
    fn zero_rate_is_linear(cents in 1i64..100_000_000, months in 1u32..=480) {
        let principal = money_from_cents(cents);
        let payment = compute_monthly_payment(principal, Rate::ZERO, months).unwrap();
        prop_assert_eq!(payment, principal / Decimal::from(months));
    }

    #[test]
    fn reduce_term_never_costs_more(
        cents in 1_000_000i64..100_000_000,
        bps in 0i64..1_200,
        months in 12u32..=420,
        per_mille in 1i64..1_000,
    ) {
        let balance = money_from_cents(cents);
        let rate = monthly_rate_from_bps(bps);
        let state = AmortizationState::from_balance(as_of(), balance, rate, months).unwrap();
        let amount = balance * Decimal::new(per_mille, 3);

        let result = simulate_prepayment(&state, amount, PrepaymentStrategy::ReduceTerm).unwrap();

        prop_assert!(!result.settled);
        prop_assert!(result.after.remaining_months <= result.before.remaining_months);
        prop_assert_eq!(
            result.months_saved,
            result.before.remaining_months - result.after.remaining_months
        );
        prop_assert!(!result.interest_savings.is_negative());
        prop_assert_eq!(result.monthly_savings, Money::ZERO);
        prop_assert_eq!(result.after.monthly_payment, state.monthly_payment);
    }

    #[test]
    fn reduce_payment_never_raises_payment(
        cents in 1_000_000i64..100_000_000,
        bps in 0i64..1_200,
        months in 12u32..=420,
        per_mille in 1i64..1_000,
    ) {
        let balance = money_from_cents(cents);
        let rate = monthly_rate_from_bps(bps);
        let state = AmortizationState::from_balance(as_of(), balance, rate, months).unwrap();
        let amount = balance * Decimal::new(per_mille, 3);

        let result =
            simulate_prepayment(&state, amount, PrepaymentStrategy::ReducePayment).unwrap();

        prop_assert!(result.after.monthly_payment <= result.before.monthly_payment);
        prop_assert!(!result.monthly_savings.is_negative());
        prop_assert!(!result.interest_savings.is_negative());
        prop_assert_eq!(result.months_saved, 0);
        prop_assert_eq!(result.after.remaining_months, months);
    }

    #[test]
    fn prepaying_everything_settles(
        cents in 1_000_000i64..100_000_000,
        bps in 0i64..1_200,
        months in 1u32..=420,
        extra_cents in 0i64..10_000_000,
        reduce_term in any::<bool>(),
    ) {
        let balance = money_from_cents(cents);
        let rate = monthly_rate_from_bps(bps);
        let state = AmortizationState::from_balance(as_of(), balance, rate, months).unwrap();
        let strategy = if reduce_term {
            PrepaymentStrategy::ReduceTerm
        } else {
            PrepaymentStrategy::ReducePayment
        };

        let amount = balance + money_from_cents(extra_cents);
        let result = simulate_prepayment(&state, amount, strategy).unwrap();

        prop_assert!(result.settled);
        prop_assert_eq!(result.after.outstanding_balance, Money::ZERO);
        prop_assert_eq!(result.after.remaining_months, 0);
        prop_assert_eq!(result.after.monthly_payment, Money::ZERO);
        prop_assert_eq!(result.total_savings, result.total_interest_before);
    }

    #[test]
    fn current_state_is_idempotent(
        cents in 1_000_000i64..100_000_000,
        bps in 0i64..1_200,
        term in 12u32..=480,
        days in 0i64..15_000,
    ) {
        let origination = NaiveDate::from_ymd_opt(2010, 3, 31).unwrap();
        let terms =
            LoanTerms::fixed(money_from_cents(cents), Rate::from_bps(bps), term, origination);
        let on = origination + chrono::Duration::days(days);

        let first = current_state(&terms, on);
        let second = current_state(&terms, on);
        prop_assert_eq!(first, second);
    }
}
