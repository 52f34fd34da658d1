//! State module for tracking a harvest run
//!
//! # Components
//!
//! - `CrawlState`: where the coordinator is in its launch / page loop / close
//!   cycle, and which moves between those states are legal

mod crawl_state;

// Re-export main types
pub use crawl_state::CrawlState;
