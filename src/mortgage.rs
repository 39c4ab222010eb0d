use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use log::{debug, info};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::decimal::{Money, Rate};
use crate::engine::AmortizationEngine;
use crate::errors::{AmortizationError, Result};
use crate::events::{Event, EventStore};
use crate::payments::AmortizationSchedule;
use crate::state::AmortizationState;
use crate::terms::{IndexHistory, LoanTerms, RateStructure};
use crate::types::{LoanId, PrepaymentSimulationResult, PrepaymentStrategy};
use crate::views::{MortgageView, StateView, TermsView};

/// a registered mortgage: terms, index history and the events raised
/// while it is queried. "Today" always comes from the supplied time provider.
#[derive(Debug)]
pub struct Mortgage {
    id: LoanId,
    property_ref: String,
    terms: LoanTerms,
    history: IndexHistory,
    engine: AmortizationEngine,
    events: EventStore,
}

impl Mortgage {
    /// register validated terms
    pub fn new(
        property_ref: impl Into<String>,
        terms: LoanTerms,
        engine: AmortizationEngine,
    ) -> Result<Self> {
        terms.validate(engine.config())?;

        let mut history = IndexHistory::new();
        if let RateStructure::Floating { index, .. } = terms.rate {
            history.record(terms.origination_date, index);
        }

        let id = Uuid::new_v4();
        let mut events = EventStore::new();
        events.emit(Event::MortgageRegistered {
            loan_id: id,
            principal: terms.principal,
            term_months: terms.term_months,
            annual_rate: terms.rate.annual_rate(),
            origination_date: terms.origination_date,
        });

        Ok(Self {
            id,
            property_ref: property_ref.into(),
            terms,
            history,
            engine,
            events,
        })
    }

    pub fn builder() -> MortgageBuilder {
        MortgageBuilder::new()
    }

    pub fn id(&self) -> LoanId {
        self.id
    }

    pub fn property_ref(&self) -> &str {
        &self.property_ref
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    pub fn index_history(&self) -> &IndexHistory {
        &self.history
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    fn output_dp(&self) -> u32 {
        self.engine.config().output_decimal_places
    }

    /// state today; a loan past its term comes back as a zero state
    pub fn state(&mut self, time: &SafeTimeProvider) -> Result<AmortizationState> {
        let as_of = time.now().date_naive();
        let state = self.state_on(as_of)?;

        if state.is_settled() {
            debug!("mortgage {} fully amortized as of {}", self.id, as_of);
            self.events.emit(Event::FullyAmortized {
                loan_id: self.id,
                as_of,
                timestamp: time.now(),
            });
        } else {
            debug!(
                "mortgage {} as of {}: balance {}, payment {}, {} months left",
                self.id,
                as_of,
                state.outstanding_balance.round_cents(),
                state.monthly_payment.round_cents(),
                state.remaining_months
            );
            self.events.emit(Event::StateComputed {
                loan_id: self.id,
                as_of,
                outstanding_balance: state.outstanding_balance,
                monthly_payment: state.monthly_payment,
                remaining_months: state.remaining_months,
                timestamp: time.now(),
            });
        }

        Ok(state)
    }

    fn state_on(&self, as_of: NaiveDate) -> Result<AmortizationState> {
        match self
            .engine
            .current_state_with_history(&self.terms, &self.history, as_of)
        {
            Err(AmortizationError::InvalidLoanState { elapsed_months, .. }) => {
                Ok(AmortizationState::fully_amortized(
                    as_of,
                    elapsed_months,
                    self.terms.rate.annual_rate(),
                ))
            }
            other => other,
        }
    }

    /// apply a new reference-index value from today on
    pub fn revise_index(&mut self, new_index: Rate, time: &SafeTimeProvider) -> Result<()> {
        let old_index = match self.terms.rate {
            RateStructure::Floating { index, .. } => index,
            RateStructure::Fixed { .. } => {
                return Err(AmortizationError::InvalidInput {
                    message: format!(
                        "mortgage {} has a fixed rate, index cannot be revised",
                        self.id
                    ),
                });
            }
        };

        self.terms.with_index(new_index)?.validate(self.engine.config())?;

        let effective_date = time.now().date_naive();
        let old_rate = self.terms.rate.annual_rate();

        self.history.record(effective_date, new_index);
        // a backdated revision doesn't displace a later one
        let current_index = self
            .history
            .revisions()
            .last()
            .map_or(new_index, |r| r.index);
        self.terms = self.terms.with_index(current_index)?;
        let new_rate = self.terms.rate.annual_rate();

        info!(
            "mortgage {} index revised {} -> {} effective {}, rate now {}",
            self.id, old_index, new_index, effective_date, new_rate
        );
        self.events.emit(Event::IndexRevised {
            loan_id: self.id,
            effective_date,
            old_index,
            new_index,
            old_rate,
            new_rate,
            timestamp: time.now(),
        });

        Ok(())
    }

    /// simulate an extraordinary payment today, rounded for output
    pub fn simulate_prepayment(
        &mut self,
        amount: Money,
        strategy: PrepaymentStrategy,
        time: &SafeTimeProvider,
    ) -> Result<PrepaymentSimulationResult> {
        let as_of = time.now().date_naive();
        let state = self.state_on(as_of)?;
        let result = self.engine.simulate_prepayment(&state, amount, strategy)?;

        debug!(
            "mortgage {} prepayment of {} ({:?}): interest saved {}, months saved {}",
            self.id,
            amount,
            strategy,
            result.interest_savings.round_cents(),
            result.months_saved
        );
        self.events.emit(Event::PrepaymentSimulated {
            loan_id: self.id,
            amount,
            strategy,
            interest_savings: result.interest_savings,
            settled: result.settled,
            timestamp: time.now(),
        });

        Ok(result.rounded(self.output_dp()))
    }

    /// remaining payment plan from today
    pub fn remaining_schedule(&self, time: &SafeTimeProvider) -> Result<AmortizationSchedule> {
        let state = self.state_on(time.now().date_naive())?;
        self.engine.remaining_schedule(&self.terms, &state)
    }

    pub fn view(&self, time: &SafeTimeProvider) -> Result<MortgageView> {
        let dp = self.output_dp();
        let state = self.state_on(time.now().date_naive())?;
        let schedule = self.engine.remaining_schedule(&self.terms, &state)?;

        Ok(MortgageView {
            id: self.id,
            property_ref: self.property_ref.clone(),
            terms: TermsView::from_terms(&self.terms, dp),
            state: StateView::from_state(&self.terms, &state, schedule.get_payment(1), dp),
            index_history: self.history.revisions().to_vec(),
        })
    }

    /// pretty json of the current view
    pub fn json(&self, time: &SafeTimeProvider) -> Result<String> {
        Ok(self.view(time)?.to_json_pretty()?)
    }
}

/// builder for registering mortgages
#[derive(Debug, Default)]
pub struct MortgageBuilder {
    property_ref: Option<String>,
    principal: Option<Money>,
    term_months: Option<u32>,
    fixed_rate: Option<Rate>,
    index: Option<Rate>,
    margin: Option<Rate>,
    origination_date: Option<NaiveDate>,
    config: Option<EngineConfig>,
}

impl MortgageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property_ref(mut self, property_ref: impl Into<String>) -> Self {
        self.property_ref = Some(property_ref.into());
        self
    }

    pub fn principal(mut self, principal: Money) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn term_months(mut self, months: u32) -> Self {
        self.term_months = Some(months);
        self
    }

    pub fn term_years(mut self, years: u32) -> Self {
        self.term_months = Some(years.saturating_mul(12));
        self
    }

    pub fn fixed_rate(mut self, annual_rate: Rate) -> Self {
        self.fixed_rate = Some(annual_rate);
        self
    }

    /// floating rate: reference index plus margin
    pub fn floating_rate(mut self, index: Rate, margin: Rate) -> Self {
        self.index = Some(index);
        self.margin = Some(margin);
        self
    }

    pub fn origination_date(mut self, date: NaiveDate) -> Self {
        self.origination_date = Some(date);
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// build, defaulting the origination date to today
    pub fn build(self, time: &SafeTimeProvider) -> Result<Mortgage> {
        let principal = self.principal.ok_or(AmortizationError::InvalidConfiguration {
            message: "principal required".to_string(),
        })?;

        let term_months = self.term_months.ok_or(AmortizationError::InvalidConfiguration {
            message: "term required".to_string(),
        })?;

        let rate = match (self.fixed_rate, self.index, self.margin) {
            (Some(annual_rate), None, None) => RateStructure::Fixed { annual_rate },
            (None, Some(index), Some(margin)) => RateStructure::Floating { index, margin },
            (None, None, None) => {
                return Err(AmortizationError::InvalidConfiguration {
                    message: "rate required".to_string(),
                })
            }
            _ => {
                return Err(AmortizationError::InvalidConfiguration {
                    message: "set either a fixed rate or a floating rate, not both".to_string(),
                })
            }
        };

        let origination_date = self
            .origination_date
            .unwrap_or_else(|| time.now().date_naive());

        let engine = AmortizationEngine::new(self.config.unwrap_or_default())?;
        let terms = LoanTerms {
            principal,
            term_months,
            rate,
            origination_date,
        };

        Mortgage::new(self.property_ref.unwrap_or_default(), terms, engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    fn test_time(y: i32, m: u32, d: u32) -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()))
    }

    #[test]
    fn test_builder_requires_rate() {
        let time = test_time(2024, 1, 1);
        let err = Mortgage::builder()
            .principal(Money::from_major(100_000))
            .term_years(25)
            .build(&time)
            .unwrap_err();
        assert!(matches!(err, AmortizationError::InvalidConfiguration { .. }));

        let err = Mortgage::builder()
            .principal(Money::from_major(100_000))
            .term_years(25)
            .fixed_rate(Rate::from_percentage(3))
            .floating_rate(Rate::from_percentage(3), Rate::from_bps(80))
            .build(&time)
            .unwrap_err();
        assert!(matches!(err, AmortizationError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_state_follows_time() {
        let time = test_time(2020, 1, 15);
        let controller = time.test_control().unwrap();

        let mut mortgage = Mortgage::builder()
            .property_ref("calle-mayor-12")
            .principal(Money::from_major(200_000))
            .term_years(30)
            .fixed_rate(Rate::from_percentage(3))
            .build(&time)
            .unwrap();

        let first = mortgage.state(&time).unwrap();
        assert_eq!(first.remaining_months, 360);
        assert_eq!(first.monthly_payment.round_cents(), Money::from_decimal(dec!(843.21)));

        controller.advance(Duration::days(366));
        let later = mortgage.state(&time).unwrap();
        assert_eq!(later.elapsed_months, 12);
        assert!(later.outstanding_balance < first.outstanding_balance);

        let computed = mortgage
            .events()
            .iter()
            .filter(|e| matches!(e, Event::StateComputed { .. }))
            .count();
        assert_eq!(computed, 2);
    }

    #[test]
    fn test_past_term_is_zero_state() {
        let time = test_time(2024, 1, 1);
        let mut mortgage = Mortgage::builder()
            .principal(Money::from_major(10_000))
            .term_months(12)
            .fixed_rate(Rate::from_percentage(5))
            .origination_date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
            .build(&time)
            .unwrap();

        let state = mortgage.state(&time).unwrap();
        assert!(state.is_settled());
        assert_eq!(state.outstanding_balance, Money::ZERO);
        assert_eq!(state.monthly_payment, Money::ZERO);
        assert!(matches!(mortgage.events().last(), Some(Event::FullyAmortized { .. })));
    }

    #[test]
    fn test_revise_index() {
        let time = test_time(2022, 1, 1);
        let controller = time.test_control().unwrap();

        let mut mortgage = Mortgage::builder()
            .principal(Money::from_major(150_000))
            .term_years(25)
            .floating_rate(Rate::from_percentage_decimal(dec!(-0.5)), Rate::from_bps(99))
            .build(&time)
            .unwrap();
        assert_eq!(mortgage.index_history().len(), 1);

        controller.advance(Duration::days(365));
        let before = mortgage.state(&time).unwrap();

        mortgage.revise_index(Rate::from_percentage(3), &time).unwrap();
        let after = mortgage.state(&time).unwrap();

        assert_eq!(mortgage.index_history().len(), 2);
        assert_eq!(after.annual_rate, Rate::from_bps(399));
        assert_eq!(after.outstanding_balance, before.outstanding_balance);
        assert!(after.monthly_payment > before.monthly_payment);
        assert!(mortgage.events().iter().any(|e| matches!(
            e,
            Event::IndexRevised { new_rate, .. } if *new_rate == Rate::from_bps(399)
        )));
    }

    #[test]
    fn test_backdated_revision_keeps_latest_index() {
        let time = test_time(2023, 1, 1);
        let mut mortgage = Mortgage::builder()
            .origination_date(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap())
            .principal(Money::from_major(150_000))
            .term_years(25)
            .floating_rate(Rate::from_percentage(1), Rate::from_bps(99))
            .build(&time)
            .unwrap();
        mortgage.revise_index(Rate::from_percentage(3), &time).unwrap();

        // clock behind the latest revision
        let earlier = test_time(2022, 6, 1);
        mortgage.revise_index(Rate::from_percentage(2), &earlier).unwrap();

        assert_eq!(mortgage.index_history().len(), 3);
        let latest = mortgage.index_history().revisions().last().unwrap();
        assert_eq!(latest.index, Rate::from_percentage(3));
        assert_eq!(mortgage.terms().rate.annual_rate(), Rate::from_bps(399));
    }

    #[test]
    fn test_term_years_saturates() {
        let time = test_time(2022, 1, 1);
        let err = Mortgage::builder()
            .principal(Money::from_major(150_000))
            .term_years(u32::MAX)
            .fixed_rate(Rate::from_percentage(2))
            .build(&time)
            .unwrap_err();
        assert!(matches!(err, AmortizationError::InvalidInput { .. }));
    }

    #[test]
    fn test_revise_index_on_fixed_rate_fails() {
        let time = test_time(2022, 1, 1);
        let mut mortgage = Mortgage::builder()
            .principal(Money::from_major(150_000))
            .term_years(25)
            .fixed_rate(Rate::from_percentage(2))
            .build(&time)
            .unwrap();

        let err = mortgage.revise_index(Rate::from_percentage(3), &time).unwrap_err();
        assert!(matches!(err, AmortizationError::InvalidInput { .. }));
        assert!(mortgage.index_history().is_empty());
    }

    #[test]
    fn test_simulation_is_rounded_and_recorded() {
        let time = test_time(2024, 1, 1);
        let mut mortgage = Mortgage::builder()
            .principal(Money::from_major(150_000))
            .term_years(20)
            .fixed_rate(Rate::from_percentage(3))
            .build(&time)
            .unwrap();

        let result = mortgage
            .simulate_prepayment(
                Money::from_major(10_000),
                PrepaymentStrategy::ReducePayment,
                &time,
            )
            .unwrap();

        assert_eq!(result.before.monthly_payment, Money::from_decimal(dec!(831.90)));
        assert_eq!(result.interest_savings, result.interest_savings.round_cents());
        assert!(matches!(
            mortgage.events().last(),
            Some(Event::PrepaymentSimulated { strategy: PrepaymentStrategy::ReducePayment, .. })
        ));
    }

    #[test]
    fn test_json_view() {
        let time = test_time(2024, 1, 1);
        let mortgage = Mortgage::builder()
            .property_ref("flat-3b")
            .principal(Money::from_major(200_000))
            .term_years(30)
            .fixed_rate(Rate::from_percentage(3))
            .build(&time)
            .unwrap();

        let json = mortgage.json(&time).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["property_ref"], "flat-3b");
        assert_eq!(value["state"]["monthly_payment"], "843.21");
        assert_eq!(value["state"]["next_payment"]["due_date"], "2024-02-01");
        assert_eq!(value["terms"]["maturity_date"], "2054-01-01");
    }
}
