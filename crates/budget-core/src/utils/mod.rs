//! Utility functions for display formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{format_amount, format_time, group_by_date, truncate_string, DateGroup};
