pub mod metrics;
pub mod rate;
pub mod scenarios;
pub mod schedule;
