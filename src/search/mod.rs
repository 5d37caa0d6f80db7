pub mod executor;
pub mod plate;

pub use executor::execute_phase1;
pub use plate::{normalize, plan_query, QueryPlan};
