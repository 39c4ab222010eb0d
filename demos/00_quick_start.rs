//! quick start - monthly payment and current state of a fixed mortgage
use chrono::NaiveDate;
use mortgage_engine_rs::{compute_monthly_payment, current_state, LoanTerms, Money, Rate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let payment = compute_monthly_payment(
        Money::from_major(200_000),
        Rate::from_percentage(3).monthly_rate(),
        360,
    )?;
    println!("200k over 30 years at 3%: {}/month", payment.round_cents());

    let terms = LoanTerms::fixed(
        Money::from_major(200_000),
        Rate::from_percentage(3),
        360,
        NaiveDate::from_ymd_opt(2020, 1, 15).ok_or("bad date")?,
    );
    let state = current_state(&terms, NaiveDate::from_ymd_opt(2026, 10, 19).ok_or("bad date")?)?;
    println!("{}", serde_json::to_string_pretty(&state.rounded(2))?);

    Ok(())
}
