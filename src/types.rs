use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};

/// unique identifier for a registered mortgage
pub type LoanId = Uuid;

/// how an extraordinary prepayment is applied to the remaining schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepaymentStrategy {
    /// keep the monthly payment, finish earlier
    ReduceTerm,
    /// keep the remaining term, pay less each month
    ReducePayment,
}

/// one-off extraordinary payment toward principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentRequest {
    pub amount: Money,
    pub as_of: NaiveDate,
    pub strategy: PrepaymentStrategy,
}

/// remaining balance, payment and cost of one schedule scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ScheduleProjection {
    pub outstanding_balance: Money,
    pub monthly_payment: Money,
    pub remaining_months: u32,
    pub total_interest: Money,
}

impl ScheduleProjection {
    /// a paid-off loan
    pub fn settled() -> Self {
        Self::default()
    }

    pub fn is_settled(&self) -> bool {
        self.outstanding_balance.is_zero() && self.remaining_months == 0
    }

    /// everything still to be paid under this scenario
    pub fn total_cost(&self) -> Money {
        self.outstanding_balance + self.total_interest
    }

    pub fn rounded(&self, dp: u32) -> Self {
        Self {
            outstanding_balance: self.outstanding_balance.round_dp(dp),
            monthly_payment: self.monthly_payment.round_dp(dp),
            remaining_months: self.remaining_months,
            total_interest: self.total_interest.round_dp(dp),
        }
    }
}

/// before/after comparison of an extraordinary prepayment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentSimulationResult {
    pub strategy: PrepaymentStrategy,
    pub prepayment_amount: Money,
    pub before: ScheduleProjection,
    pub after: ScheduleProjection,
    pub total_interest_before: Money,
    pub total_interest_after: Money,
    pub interest_savings: Money,
    /// only populated for `ReduceTerm`
    pub months_saved: u32,
    /// only populated for `ReducePayment`
    pub monthly_savings: Money,
    pub total_savings: Money,
    /// the prepayment paid the loan off
    pub settled: bool,
}

impl PrepaymentSimulationResult {
    /// copy with every monetary field rounded for output
    pub fn rounded(&self, dp: u32) -> Self {
        Self {
            strategy: self.strategy,
            prepayment_amount: self.prepayment_amount.round_dp(dp),
            before: self.before.rounded(dp),
            after: self.after.rounded(dp),
            total_interest_before: self.total_interest_before.round_dp(dp),
            total_interest_after: self.total_interest_after.round_dp(dp),
            interest_savings: self.interest_savings.round_dp(dp),
            months_saved: self.months_saved,
            monthly_savings: self.monthly_savings.round_dp(dp),
            total_savings: self.total_savings.round_dp(dp),
            settled: self.settled,
        }
    }
}

/// annual rate in effect for a loan, split into its parts when floating
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateBreakdown {
    pub index: Option<Rate>,
    pub margin: Option<Rate>,
    pub annual_rate: Rate,
}
