//! Utility functions (timestamps, upload storage).

pub mod time;
pub mod uploads;
