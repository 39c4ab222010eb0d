//! prepayment - compare reducing the term with reducing the payment
use chrono::NaiveDate;
use mortgage_engine_rs::{AmortizationEngine, AmortizationState, Money, PrepaymentStrategy, Rate};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let engine = AmortizationEngine::default();
    let state = AmortizationState::from_balance(
        NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?,
        Money::from_major(150_000),
        Rate::from_decimal(dec!(0.0025)),
        240,
    )?;

    for strategy in [PrepaymentStrategy::ReduceTerm, PrepaymentStrategy::ReducePayment] {
        let result = engine
            .simulate_prepayment(&state, Money::from_major(10_000), strategy)?
            .rounded(2);
        println!("=== {:?} ===", strategy);
        println!("months saved:    {}", result.months_saved);
        println!("monthly savings: {}", result.monthly_savings);
        println!("interest saved:  {}\n", result.interest_savings);
    }

    Ok(())
}
