use chrono::NaiveDate;

use crate::calendar::add_months;
use crate::config::EngineConfig;
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::payments::{amortization, prepayment, AmortizationSchedule};
use crate::state::{self, AmortizationState};
use crate::terms::{IndexHistory, LoanTerms};
use crate::types::{PrepaymentRequest, PrepaymentSimulationResult, PrepaymentStrategy};

/// amortization engine bound to a configuration
#[derive(Debug, Clone, Default)]
pub struct AmortizationEngine {
    config: EngineConfig,
}

impl AmortizationEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn compute_monthly_payment(
        &self,
        principal: Money,
        monthly_rate: Rate,
        remaining_months: u32,
    ) -> Result<Money> {
        self.config.check_monthly_rate(monthly_rate)?;
        amortization::compute_monthly_payment(principal, monthly_rate, remaining_months)
    }

    /// state on `as_of`, applying the current index to the whole elapsed period
    pub fn current_state(&self, terms: &LoanTerms, as_of: NaiveDate) -> Result<AmortizationState> {
        state::current_state(&self.config, terms, &IndexHistory::new(), as_of)
    }

    pub fn current_state_with_history(
        &self,
        terms: &LoanTerms,
        history: &IndexHistory,
        as_of: NaiveDate,
    ) -> Result<AmortizationState> {
        state::current_state(&self.config, terms, history, as_of)
    }

    pub fn simulate_prepayment(
        &self,
        state: &AmortizationState,
        amount: Money,
        strategy: PrepaymentStrategy,
    ) -> Result<PrepaymentSimulationResult> {
        prepayment::simulate_prepayment(&self.config, state, amount, strategy)
    }

    /// derive the state on the request date and simulate against it
    pub fn simulate_request(
        &self,
        terms: &LoanTerms,
        history: &IndexHistory,
        request: &PrepaymentRequest,
    ) -> Result<PrepaymentSimulationResult> {
        let state = self.current_state_with_history(terms, history, request.as_of)?;
        self.simulate_prepayment(&state, request.amount, request.strategy)
    }

    /// payment-by-payment plan for the rest of the loan
    pub fn remaining_schedule(
        &self,
        terms: &LoanTerms,
        state: &AmortizationState,
    ) -> Result<AmortizationSchedule> {
        let first_due = add_months(terms.origination_date, state.elapsed_months + 1)?;
        AmortizationSchedule::project(
            state.outstanding_balance,
            state.monthly_rate,
            state.monthly_payment,
            state.remaining_months,
            first_due,
        )
    }
}

/// `AmortizationEngine::current_state` with the default configuration
pub fn current_state(terms: &LoanTerms, as_of: NaiveDate) -> Result<AmortizationState> {
    AmortizationEngine::default().current_state(terms, as_of)
}

/// `AmortizationEngine::simulate_prepayment` with the default configuration
pub fn simulate_prepayment(
    state: &AmortizationState,
    amount: Money,
    strategy: PrepaymentStrategy,
) -> Result<PrepaymentSimulationResult> {
    AmortizationEngine::default().simulate_prepayment(state, amount, strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AmortizationError;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_strict_engine_rejects_long_terms() {
        let engine = AmortizationEngine::new(EngineConfig::strict()).unwrap();
        let terms = LoanTerms::fixed(
            Money::from_major(100_000),
            Rate::from_percentage(3),
            540,
            d(2020, 1, 1),
        );

        let err = engine.current_state(&terms, d(2021, 1, 1)).unwrap_err();
        assert!(matches!(err, AmortizationError::InvalidInput { .. }));
        assert!(current_state(&terms, d(2021, 1, 1)).is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            max_term_months: 0,
            ..EngineConfig::default()
        };
        assert!(AmortizationEngine::new(config).is_err());
    }

    #[test]
    fn test_payment_rate_above_ceiling() {
        let engine = AmortizationEngine::default();
        let err = engine
            .compute_monthly_payment(Money::from_major(100_000), Rate::from_bps(5_000), 360)
            .unwrap_err();
        assert!(matches!(err, AmortizationError::InvalidInput { .. }));
    }

    #[test]
    fn test_simulate_request() {
        let engine = AmortizationEngine::default();
        let terms = LoanTerms::fixed(
            Money::from_major(200_000),
            Rate::from_percentage(3),
            360,
            d(2020, 1, 15),
        );
        let request = PrepaymentRequest {
            amount: Money::from_major(20_000),
            as_of: d(2024, 1, 15),
            strategy: PrepaymentStrategy::ReduceTerm,
        };

        let result = engine.simulate_request(&terms, &IndexHistory::new(), &request).unwrap();
        let state = engine.current_state(&terms, request.as_of).unwrap();

        assert_eq!(result.before.outstanding_balance, state.outstanding_balance);
        assert_eq!(result.before.remaining_months, 312);
        assert!(result.months_saved > 0);
    }

    #[test]
    fn test_remaining_schedule_matches_state() {
        let engine = AmortizationEngine::default();
        let terms = LoanTerms::fixed(
            Money::from_major(200_000),
            Rate::from_percentage(3),
            360,
            d(2020, 1, 15),
        );
        let state = engine.current_state(&terms, d(2045, 2, 1)).unwrap();
        let schedule = engine.remaining_schedule(&terms, &state).unwrap();

        assert_eq!(schedule.len() as u32, state.remaining_months);
        assert_eq!(schedule.payments[0].due_date, d(2045, 2, 15));
        assert_eq!(schedule.total_interest, state.total_remaining_interest);
    }
}
