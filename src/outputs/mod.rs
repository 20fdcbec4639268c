//! Persistent state written at the end of each region run.
//!
//! # Submodules
//!
//! - [`snapshot`]: Per-region snapshot of the last seen news listing
//!
//! # Output Structure
//!
//! ```text
//! state_dir/
//! ├── parsed_news_NA.json
//! └── parsed_news_JP.json
//! ```

pub mod snapshot;
