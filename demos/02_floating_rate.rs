//! floating rate - revise the reference index as time passes
use chrono::{Duration, TimeZone, Utc};
use mortgage_engine_rs::{Money, Mortgage, Rate, SafeTimeProvider, TimeSource};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();

    let mut mortgage = Mortgage::builder()
        .property_ref("portal-4-2a")
        .principal(Money::from_major(180_000))
        .term_years(25)
        .floating_rate(Rate::from_percentage_decimal(dec!(-0.48)), Rate::from_bps(89))
        .build(&time)?;

    println!("at origination:\n{}\n", mortgage.json(&time)?);

    controller.advance(Duration::days(365));
    mortgage.revise_index(Rate::from_percentage_decimal(dec!(2.1)), &time)?;
    println!("after the annual revision:\n{}\n", mortgage.json(&time)?);

    for event in mortgage.take_events() {
        println!("{:?}", event);
    }

    Ok(())
}
