//! Core data models for the league dashboard.

mod chip;
mod cup;
mod gameweek;
mod prize_fund;
mod score;
mod stats;

pub use chip::*;
pub use cup::*;
pub use gameweek::*;
pub use prize_fund::*;
pub use score::*;
pub use stats::*;
