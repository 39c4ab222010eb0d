pub mod amortization;
pub mod prepayment;

pub use amortization::{
    apply_period, compute_monthly_payment, total_interest, AmortizationSchedule, PeriodStep,
    ScheduledPayment,
};
pub use prepayment::solve_remaining_months;
