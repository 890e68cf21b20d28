pub mod config;
pub mod date_utils;
pub mod error;
pub mod export;
pub mod format;
pub mod logging;
pub mod models;
pub mod services;
pub mod sort_utils;
pub mod store;

pub use config::Config;
pub use error::{EngineError, EngineResult};
pub use models::{PackStatus, RecordId, ReferralRecord, TreeNode};
pub use services::filter::{FilterSpec, StatusFilter};
pub use services::tree_builder::{OrphanPolicy, TreeBuilder};
pub use store::{NetworkQuery, ReferralStore};

/// Library version from Cargo.toml (single source of truth)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
