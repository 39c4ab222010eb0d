//! serializable views, rounded at the output boundary
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::payments::ScheduledPayment;
use crate::state::AmortizationState;
use crate::terms::{IndexRevision, LoanTerms};
use crate::types::{LoanId, RateBreakdown};

/// serializable view of a mortgage and its current state
#[derive(Debug, Serialize, Deserialize)]
pub struct MortgageView {
    pub id: LoanId,
    pub property_ref: String,
    pub terms: TermsView,
    pub state: StateView,
    pub index_history: Vec<IndexRevision>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TermsView {
    pub principal: Money,
    pub term_months: u32,
    pub origination_date: NaiveDate,
    pub maturity_date: Option<NaiveDate>,
    pub rate: RateBreakdown,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StateView {
    pub as_of: NaiveDate,
    pub elapsed_months: u32,
    pub remaining_months: u32,
    pub outstanding_balance: Money,
    pub monthly_payment: Money,
    pub annual_rate: Rate,
    pub total_remaining_interest: Money,
    pub principal_repaid: Money,
    pub next_payment: Option<ScheduledPayment>,
}

impl TermsView {
    pub fn from_terms(terms: &LoanTerms, dp: u32) -> Self {
        TermsView {
            principal: terms.principal.round_dp(dp),
            term_months: terms.term_months,
            origination_date: terms.origination_date,
            maturity_date: crate::calendar::add_months(terms.origination_date, terms.term_months)
                .ok(),
            rate: terms.rate.breakdown(),
        }
    }
}

impl StateView {
    pub fn from_state(
        terms: &LoanTerms,
        state: &AmortizationState,
        next_payment: Option<&ScheduledPayment>,
        dp: u32,
    ) -> Self {
        let rounded = state.rounded(dp);
        StateView {
            as_of: rounded.as_of,
            elapsed_months: rounded.elapsed_months,
            remaining_months: rounded.remaining_months,
            outstanding_balance: rounded.outstanding_balance,
            monthly_payment: rounded.monthly_payment,
            annual_rate: rounded.annual_rate,
            total_remaining_interest: rounded.total_remaining_interest,
            principal_repaid: (terms.principal - state.outstanding_balance)
                .floor_zero()
                .round_dp(dp),
            next_payment: next_payment.map(|p| p.rounded(dp)),
        }
    }
}

impl MortgageView {
    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
