//! Output formatting for battle results and health reports

pub mod console;
pub mod formatter;
