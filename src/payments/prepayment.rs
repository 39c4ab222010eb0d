use crate::config::EngineConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{AmortizationError, Result};
use crate::state::AmortizationState;
use crate::types::{PrepaymentSimulationResult, PrepaymentStrategy, ScheduleProjection};

use super::amortization::{compute_monthly_payment, total_interest};

/// compare the remaining schedule of `state` with the one left after an
/// extraordinary payment of `amount`
pub(crate) fn simulate_prepayment(
    config: &EngineConfig,
    state: &AmortizationState,
    amount: Money,
    strategy: PrepaymentStrategy,
) -> Result<PrepaymentSimulationResult> {
    if !amount.is_positive() {
        return Err(AmortizationError::invalid_input(format!(
            "prepayment amount must be positive, got {}",
            amount
        )));
    }
    if state.is_settled() {
        return Err(AmortizationError::InvalidLoanState {
            elapsed_months: state.elapsed_months,
            term_months: state.elapsed_months + state.remaining_months,
        });
    }
    config.check_monthly_rate(state.monthly_rate)?;

    let rate = state.monthly_rate;
    let before = ScheduleProjection {
        outstanding_balance: state.outstanding_balance,
        monthly_payment: state.monthly_payment,
        remaining_months: state.remaining_months,
        total_interest: total_interest(
            state.outstanding_balance,
            rate,
            state.monthly_payment,
            state.remaining_months,
        ),
    };

    let new_balance = (state.outstanding_balance - amount).floor_zero();
    if new_balance.is_zero() {
        return Ok(settled_result(strategy, amount, before));
    }

    let after = match strategy {
        PrepaymentStrategy::ReduceTerm => {
            let months = solve_remaining_months(config, new_balance, rate, state.monthly_payment)?;
            ScheduleProjection {
                outstanding_balance: new_balance,
                monthly_payment: state.monthly_payment,
                remaining_months: months,
                total_interest: total_interest(new_balance, rate, state.monthly_payment, months),
            }
        }
        PrepaymentStrategy::ReducePayment => {
            let payment = compute_monthly_payment(new_balance, rate, state.remaining_months)?;
            ScheduleProjection {
                outstanding_balance: new_balance,
                monthly_payment: payment,
                remaining_months: state.remaining_months,
                total_interest: total_interest(new_balance, rate, payment, state.remaining_months),
            }
        }
    };

    let interest_savings = before.total_interest - after.total_interest;
    let (months_saved, monthly_savings) = match strategy {
        PrepaymentStrategy::ReduceTerm => (
            before.remaining_months.saturating_sub(after.remaining_months),
            Money::ZERO,
        ),
        PrepaymentStrategy::ReducePayment => (0, before.monthly_payment - after.monthly_payment),
    };

    Ok(PrepaymentSimulationResult {
        strategy,
        prepayment_amount: amount,
        before,
        after,
        total_interest_before: before.total_interest,
        total_interest_after: after.total_interest,
        interest_savings,
        months_saved,
        monthly_savings,
        total_savings: interest_savings,
        settled: false,
    })
}

/// the prepayment covers the whole balance
fn settled_result(
    strategy: PrepaymentStrategy,
    amount: Money,
    before: ScheduleProjection,
) -> PrepaymentSimulationResult {
    let (months_saved, monthly_savings) = match strategy {
        PrepaymentStrategy::ReduceTerm => (before.remaining_months, Money::ZERO),
        PrepaymentStrategy::ReducePayment => (0, before.monthly_payment),
    };

    PrepaymentSimulationResult {
        strategy,
        prepayment_amount: amount,
        before,
        after: ScheduleProjection::settled(),
        total_interest_before: before.total_interest,
        total_interest_after: Money::ZERO,
        interest_savings: before.total_interest,
        months_saved,
        monthly_savings,
        total_savings: before.total_interest,
        settled: true,
    }
}

/// smallest number of months in which `payment` clears `balance`.
///
/// Residuals within the settlement tolerance count as cleared so an exact
/// annuity doesn't pick up a spurious extra month from decimal rounding.
pub fn solve_remaining_months(
    config: &EngineConfig,
    balance: Money,
    monthly_rate: Rate,
    payment: Money,
) -> Result<u32> {
    if !balance.is_positive() {
        return Ok(0);
    }

    let monthly_interest = balance.interest_at(monthly_rate);
    if payment <= monthly_interest {
        return Err(AmortizationError::NonAmortizingSchedule {
            payment,
            monthly_interest,
        });
    }

    let mut remaining = balance;
    let mut months = 0;

    while months < config.max_term_months {
        months += 1;
        let payoff = remaining + remaining.interest_at(monthly_rate);
        if payoff <= payment + config.settlement_tolerance {
            return Ok(months);
        }
        remaining = payoff - payment;
    }

    Err(AmortizationError::NonAmortizingSchedule {
        payment,
        monthly_interest,
    })
}
