//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (import options, batch loading, formatting)
//! - `detect` - Bank format detection
//! - `summary` - Spending dashboard and insights
//! - `transactions` - Transaction listing and balance trend

pub mod core;
pub mod detect;
pub mod summary;
pub mod transactions;

// Re-export command functions for main.rs
pub use self::core::*;
pub use detect::*;
pub use summary::*;
pub use transactions::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
