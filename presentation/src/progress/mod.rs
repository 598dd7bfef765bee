//! Progress reporting for battles

pub mod reporter;
