use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::add_months;
use crate::decimal::{Money, Rate};
use crate::errors::{AmortizationError, Result};

/// one row of an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPayment {
    pub payment_number: u32,
    pub due_date: NaiveDate,
    pub beginning_balance: Money,
    pub payment_amount: Money,
    pub interest_portion: Money,
    pub principal_portion: Money,
    pub ending_balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

impl ScheduledPayment {
    pub fn rounded(&self, dp: u32) -> Self {
        Self {
            payment_number: self.payment_number,
            due_date: self.due_date,
            beginning_balance: self.beginning_balance.round_dp(dp),
            payment_amount: self.payment_amount.round_dp(dp),
            interest_portion: self.interest_portion.round_dp(dp),
            principal_portion: self.principal_portion.round_dp(dp),
            ending_balance: self.ending_balance.round_dp(dp),
            cumulative_interest: self.cumulative_interest.round_dp(dp),
            cumulative_principal: self.cumulative_principal.round_dp(dp),
        }
    }
}

/// remaining payment plan from a balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub opening_balance: Money,
    pub monthly_rate: Rate,
    pub payments: Vec<ScheduledPayment>,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl AmortizationSchedule {
    /// project `months` payments of `payment` against `balance`.
    ///
    /// The last payment absorbs any residual so the plan ends at zero, and
    /// the plan stops early if the balance is cleared before then.
    pub fn project(
        balance: Money,
        monthly_rate: Rate,
        payment: Money,
        months: u32,
        first_due: NaiveDate,
    ) -> Result<Self> {
        let mut payments = Vec::with_capacity(months as usize);
        let mut remaining = balance.floor_zero();
        let mut cumulative_interest = Money::ZERO;
        let mut cumulative_principal = Money::ZERO;

        for number in 1..=months {
            if remaining.is_zero() {
                break;
            }
            let step = apply_period(remaining, monthly_rate, payment, number == months);
            cumulative_interest += step.interest;
            cumulative_principal += step.principal;

            payments.push(ScheduledPayment {
                payment_number: number,
                due_date: add_months(first_due, number - 1)?,
                beginning_balance: remaining,
                payment_amount: step.payment,
                interest_portion: step.interest,
                principal_portion: step.principal,
                ending_balance: step.ending_balance,
                cumulative_interest,
                cumulative_principal,
            });

            remaining = step.ending_balance;
        }

        let total_payment = payments.iter().map(|p| p.payment_amount).sum();

        Ok(Self {
            opening_balance: balance,
            monthly_rate,
            payments,
            total_interest: cumulative_interest,
            total_payment,
        })
    }

    pub fn get_payment(&self, payment_number: u32) -> Option<&ScheduledPayment> {
        payment_number
            .checked_sub(1)
            .and_then(|i| self.payments.get(i as usize))
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    pub fn rounded(&self, dp: u32) -> Self {
        Self {
            opening_balance: self.opening_balance.round_dp(dp),
            monthly_rate: self.monthly_rate,
            payments: self.payments.iter().map(|p| p.rounded(dp)).collect(),
            total_interest: self.total_interest.round_dp(dp),
            total_payment: self.total_payment.round_dp(dp),
        }
    }
}

/// split of a single monthly payment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodStep {
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub ending_balance: Money,
}

/// apply one month: interest accrues on the balance, the rest of the
/// payment goes to principal. A payment that covers the whole balance (or
/// the final period) is trimmed to exactly clear it.
pub fn apply_period(
    balance: Money,
    monthly_rate: Rate,
    payment: Money,
    is_final: bool,
) -> PeriodStep {
    let interest = balance.interest_at(monthly_rate);
    let payoff = balance + interest;

    if is_final || payment >= payoff {
        return PeriodStep {
            payment: payoff,
            interest,
            principal: balance,
            ending_balance: Money::ZERO,
        };
    }

    let principal = payment - interest;
    PeriodStep {
        payment,
        interest,
        principal,
        ending_balance: (balance - principal).floor_zero(),
    }
}

/// fixed monthly payment that amortizes `principal` over `remaining_months`
pub fn compute_monthly_payment(
    principal: Money,
    monthly_rate: Rate,
    remaining_months: u32,
) -> Result<Money> {
    if principal.is_negative() {
        return Err(AmortizationError::invalid_input(format!(
            "principal must not be negative, got {}",
            principal
        )));
    }
    if monthly_rate.is_negative() {
        return Err(AmortizationError::invalid_input(format!(
            "monthly rate must not be negative, got {}",
            monthly_rate.as_decimal()
        )));
    }

    if remaining_months == 0 || principal.is_zero() {
        return Ok(Money::ZERO);
    }

    if monthly_rate.is_zero() {
        return Ok(principal / Decimal::from(remaining_months));
    }

    // P * r * (1 + r)^n / ((1 + r)^n - 1)
    let r = monthly_rate.as_decimal();
    let overflow = || {
        AmortizationError::invalid_input(format!(
            "monthly rate {} over {} months is out of range",
            r, remaining_months
        ))
    };
    let compound = compound_factor(r, remaining_months).ok_or_else(overflow)?;
    let numerator = principal
        .as_decimal()
        .checked_mul(r)
        .and_then(|v| v.checked_mul(compound))
        .ok_or_else(overflow)?;
    let denominator = compound - Decimal::ONE;

    numerator
        .checked_div(denominator)
        .map(Money::from_decimal)
        .ok_or_else(overflow)
}

/// interest paid while amortizing `balance` with `payment`, settling in at
/// most `months` periods
pub fn total_interest(balance: Money, monthly_rate: Rate, payment: Money, months: u32) -> Money {
    let mut remaining = balance.floor_zero();
    let mut interest = Money::ZERO;

    for number in 1..=months {
        if remaining.is_zero() {
            break;
        }
        let step = apply_period(remaining, monthly_rate, payment, number == months);
        interest += step.interest;
        remaining = step.ending_balance;
    }

    interest
}

/// (1 + r)^n by repeated squaring, `None` once it leaves the decimal range
pub(crate) fn compound_factor(r: Decimal, n: u32) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    let mut base = Decimal::ONE.checked_add(r)?;
    let mut exp = n;

    while exp > 0 {
        if exp & 1 == 1 {
            result = result.checked_mul(base)?;
        }
        exp >>= 1;
        if exp > 0 {
            base = base.checked_mul(base)?;
        }
    }

    Some(result)
}
