pub mod calendar;
pub mod config;
pub mod decimal;
pub mod engine;
pub mod errors;
pub mod events;
pub mod mortgage;
pub mod payments;
pub mod state;
pub mod terms;
pub mod types;
pub mod views;

// re-export key types
pub use config::EngineConfig;
pub use decimal::{Money, Rate};
pub use engine::{current_state, simulate_prepayment, AmortizationEngine};
pub use errors::{AmortizationError, Result};
pub use events::{Event, EventStore};
pub use mortgage::{Mortgage, MortgageBuilder};
pub use payments::{compute_monthly_payment, AmortizationSchedule, ScheduledPayment};
pub use state::AmortizationState;
pub use terms::{IndexHistory, IndexRevision, LoanTerms, RateStructure};
pub use types::{
    LoanId, PrepaymentRequest, PrepaymentSimulationResult, PrepaymentStrategy, RateBreakdown,
    ScheduleProjection,
};
pub use views::MortgageView;

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
