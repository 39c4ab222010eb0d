use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{AmortizationError, Result};
use crate::types::RateBreakdown;

/// interest rate structure agreed at origination
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RateStructure {
    /// fixed annual nominal rate
    Fixed { annual_rate: Rate },
    /// reference index (e.g. 12-month euribor) plus a fixed margin
    Floating { index: Rate, margin: Rate },
}

impl RateStructure {
    /// total annual rate; a negative index can pull it down but never below zero
    pub fn annual_rate(&self) -> Rate {
        match *self {
            RateStructure::Fixed { annual_rate } => annual_rate,
            RateStructure::Floating { index, margin } => (index + margin).max(Rate::ZERO),
        }
    }

    /// annual rate with an alternative index value
    pub fn annual_rate_with_index(&self, index_value: Rate) -> Rate {
        match *self {
            RateStructure::Fixed { annual_rate } => annual_rate,
            RateStructure::Floating { margin, .. } => (index_value + margin).max(Rate::ZERO),
        }
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, RateStructure::Floating { .. })
    }

    pub fn breakdown(&self) -> RateBreakdown {
        match *self {
            RateStructure::Fixed { annual_rate } => RateBreakdown {
                index: None,
                margin: None,
                annual_rate,
            },
            RateStructure::Floating { index, margin } => RateBreakdown {
                index: Some(index),
                margin: Some(margin),
                annual_rate: self.annual_rate(),
            },
        }
    }
}

/// mortgage terms at origination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub term_months: u32,
    pub rate: RateStructure,
    pub origination_date: NaiveDate,
}

impl LoanTerms {
    pub fn fixed(
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
        origination_date: NaiveDate,
    ) -> Self {
        Self {
            principal,
            term_months,
            rate: RateStructure::Fixed { annual_rate },
            origination_date,
        }
    }

    pub fn floating(
        principal: Money,
        index: Rate,
        margin: Rate,
        term_months: u32,
        origination_date: NaiveDate,
    ) -> Self {
        Self {
            principal,
            term_months,
            rate: RateStructure::Floating { index, margin },
            origination_date,
        }
    }

    /// same terms after a reference-index revision
    pub fn with_index(&self, new_index: Rate) -> Result<Self> {
        match self.rate {
            RateStructure::Floating { margin, .. } => Ok(Self {
                rate: RateStructure::Floating {
                    index: new_index,
                    margin,
                },
                ..self.clone()
            }),
            RateStructure::Fixed { .. } => Err(AmortizationError::invalid_input(
                "cannot revise the index of a fixed-rate loan",
            )),
        }
    }

    /// current monthly rate
    pub fn monthly_rate(&self) -> Rate {
        self.rate.annual_rate().monthly_rate()
    }

    /// check terms against the engine's bounds
    pub fn validate(&self, config: &EngineConfig) -> Result<()> {
        if !self.principal.is_positive() {
            return Err(AmortizationError::invalid_input(format!(
                "principal must be positive, got {}",
                self.principal
            )));
        }
        if self.term_months == 0 {
            return Err(AmortizationError::invalid_input("term must be at least one month"));
        }
        if self.term_months > config.max_term_months {
            return Err(AmortizationError::invalid_input(format!(
                "term of {} months exceeds the maximum of {}",
                self.term_months, config.max_term_months
            )));
        }
        match self.rate {
            RateStructure::Fixed { annual_rate } if annual_rate.is_negative() => {
                return Err(AmortizationError::invalid_input(format!(
                    "annual rate must not be negative, got {}",
                    annual_rate
                )));
            }
            RateStructure::Floating { margin, .. } if margin.is_negative() => {
                return Err(AmortizationError::invalid_input(format!(
                    "margin must not be negative, got {}",
                    margin
                )));
            }
            _ => {}
        }
        let annual = self.rate.annual_rate();
        if annual > config.max_annual_rate {
            return Err(AmortizationError::invalid_input(format!(
                "annual rate {} exceeds the maximum of {}",
                annual, config.max_annual_rate
            )));
        }
        Ok(())
    }
}

/// a reference-index value taking effect on a date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexRevision {
    pub effective_date: NaiveDate,
    pub index: Rate,
}

/// reference-index values over the life of a floating loan.
///
/// Periods starting before the first revision use the first revision's
/// value. An empty history means the current index applies throughout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexHistory {
    revisions: Vec<IndexRevision>,
}

impl IndexHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_revisions(mut revisions: Vec<IndexRevision>) -> Self {
        revisions.sort_by_key(|r| r.effective_date);
        Self { revisions }
    }

    /// add a revision, replacing any existing one on the same date
    pub fn record(&mut self, effective_date: NaiveDate, index: Rate) {
        match self
            .revisions
            .binary_search_by_key(&effective_date, |r| r.effective_date)
        {
            Ok(pos) => self.revisions[pos].index = index,
            Err(pos) => self.revisions.insert(
                pos,
                IndexRevision {
                    effective_date,
                    index,
                },
            ),
        }
    }

    /// index in effect for a period starting on `date`
    pub fn index_on(&self, date: NaiveDate) -> Option<Rate> {
        let first = self.revisions.first()?;
        let applicable = self
            .revisions
            .iter()
            .take_while(|r| r.effective_date <= date)
            .last()
            .unwrap_or(first);
        Some(applicable.index)
    }

    pub fn revisions(&self) -> &[IndexRevision] {
        &self.revisions
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }
}
