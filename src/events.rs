use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::{LoanId, PrepaymentStrategy};

/// events emitted by a mortgage as it is queried and revised
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    MortgageRegistered {
        loan_id: LoanId,
        principal: Money,
        term_months: u32,
        annual_rate: Rate,
        origination_date: NaiveDate,
    },
    IndexRevised {
        loan_id: LoanId,
        effective_date: NaiveDate,
        old_index: Rate,
        new_index: Rate,
        old_rate: Rate,
        new_rate: Rate,
        timestamp: DateTime<Utc>,
    },
    StateComputed {
        loan_id: LoanId,
        as_of: NaiveDate,
        outstanding_balance: Money,
        monthly_payment: Money,
        remaining_months: u32,
        timestamp: DateTime<Utc>,
    },
    FullyAmortized {
        loan_id: LoanId,
        as_of: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    PrepaymentSimulated {
        loan_id: LoanId,
        amount: Money,
        strategy: PrepaymentStrategy,
        interest_savings: Money,
        settled: bool,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    pub fn loan_id(&self) -> LoanId {
        match self {
            Event::MortgageRegistered { loan_id, .. }
            | Event::IndexRevised { loan_id, .. }
            | Event::StateComputed { loan_id, .. }
            | Event::FullyAmortized { loan_id, .. }
            | Event::PrepaymentSimulated { loan_id, .. } => *loan_id,
        }
    }
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}
