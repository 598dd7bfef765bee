//! Use cases (application services)

pub mod check_health;
pub mod run_battle;
