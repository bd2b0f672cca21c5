pub mod payment;
pub mod schedule;
pub mod terms;
