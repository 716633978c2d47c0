pub mod config;
pub mod conflicts;
pub mod dispatch;
pub mod gaps;
pub mod schema;
pub mod score;
pub mod synthesize;
