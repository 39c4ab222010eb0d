use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{add_months, months_between};
use crate::config::EngineConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{AmortizationError, Result};
use crate::payments::amortization::{apply_period, compute_monthly_payment, total_interest};
use crate::terms::{IndexHistory, LoanTerms};
use crate::types::ScheduleProjection;

/// point-in-time view of a mortgage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationState {
    pub as_of: NaiveDate,
    pub elapsed_months: u32,
    pub remaining_months: u32,
    pub outstanding_balance: Money,
    pub monthly_payment: Money,
    pub annual_rate: Rate,
    pub monthly_rate: Rate,
    /// interest still due if the current schedule runs to completion
    pub total_remaining_interest: Money,
}

impl AmortizationState {
    /// state of a loan with `remaining_months` left on `balance` at `monthly_rate`
    pub fn from_balance(
        as_of: NaiveDate,
        outstanding_balance: Money,
        monthly_rate: Rate,
        remaining_months: u32,
    ) -> Result<Self> {
        let monthly_payment =
            compute_monthly_payment(outstanding_balance, monthly_rate, remaining_months)?;

        Ok(Self {
            as_of,
            elapsed_months: 0,
            remaining_months,
            outstanding_balance,
            monthly_payment,
            annual_rate: monthly_rate.annualized(),
            monthly_rate,
            total_remaining_interest: total_interest(
                outstanding_balance,
                monthly_rate,
                monthly_payment,
                remaining_months,
            ),
        })
    }

    /// a loan with nothing left to pay
    pub fn fully_amortized(as_of: NaiveDate, elapsed_months: u32, annual_rate: Rate) -> Self {
        Self {
            as_of,
            elapsed_months,
            remaining_months: 0,
            outstanding_balance: Money::ZERO,
            monthly_payment: Money::ZERO,
            annual_rate,
            monthly_rate: annual_rate.monthly_rate(),
            total_remaining_interest: Money::ZERO,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.remaining_months == 0 || self.outstanding_balance.is_zero()
    }

    pub fn projection(&self) -> ScheduleProjection {
        ScheduleProjection {
            outstanding_balance: self.outstanding_balance,
            monthly_payment: self.monthly_payment,
            remaining_months: self.remaining_months,
            total_interest: self.total_remaining_interest,
        }
    }

    /// copy with monetary fields rounded for output
    pub fn rounded(&self, dp: u32) -> Self {
        Self {
            outstanding_balance: self.outstanding_balance.round_dp(dp),
            monthly_payment: self.monthly_payment.round_dp(dp),
            total_remaining_interest: self.total_remaining_interest.round_dp(dp),
            ..self.clone()
        }
    }
}

/// derive the state of `terms` on `as_of`.
///
/// The balance is rolled forward from origination one month at a time. The
/// payment is re-derived whenever the monthly rate changes between periods,
/// which only happens for floating loans with a non-empty `history`.
pub(crate) fn current_state(
    config: &EngineConfig,
    terms: &LoanTerms,
    history: &IndexHistory,
    as_of: NaiveDate,
) -> Result<AmortizationState> {
    terms.validate(config)?;

    let elapsed = months_between(terms.origination_date, as_of);
    if elapsed >= terms.term_months {
        return Err(AmortizationError::InvalidLoanState {
            elapsed_months: elapsed,
            term_months: terms.term_months,
        });
    }

    let mut balance = terms.principal;
    let mut payment = Money::ZERO;
    let mut previous_rate: Option<Rate> = None;

    for month in 0..elapsed {
        let rate = period_monthly_rate(terms, history, month)?;
        if previous_rate != Some(rate) {
            payment = compute_monthly_payment(balance, rate, terms.term_months - month)?;
            previous_rate = Some(rate);
        }
        balance = apply_period(balance, rate, payment, false).ending_balance;
    }

    let annual_rate = terms.rate.annual_rate();
    let monthly_rate = annual_rate.monthly_rate();
    let remaining_months = terms.term_months - elapsed;
    let monthly_payment = compute_monthly_payment(balance, monthly_rate, remaining_months)?;

    Ok(AmortizationState {
        as_of,
        elapsed_months: elapsed,
        remaining_months,
        outstanding_balance: balance,
        monthly_payment,
        annual_rate,
        monthly_rate,
        total_remaining_interest: total_interest(
            balance,
            monthly_rate,
            monthly_payment,
            remaining_months,
        ),
    })
}

/// monthly rate for the period starting `month` months after origination
fn period_monthly_rate(terms: &LoanTerms, history: &IndexHistory, month: u32) -> Result<Rate> {
    if !terms.rate.is_floating() || history.is_empty() {
        return Ok(terms.monthly_rate());
    }

    let period_start = add_months(terms.origination_date, month)?;
    let annual = match history.index_on(period_start) {
        Some(index) => terms.rate.annual_rate_with_index(index),
        None => terms.rate.annual_rate(),
    };
    Ok(annual.monthly_rate())
}
