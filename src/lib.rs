pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::{storage::LocalStorage, Settings};
pub use crate::core::aggregate::aggregate;
pub use crate::core::fetcher::{RecordFetcher, UserFetchOutcome};
pub use crate::core::report::ReportWriter;
pub use crate::core::session::SessionContext;
pub use crate::core::store::RecordStore;
pub use crate::utils::error::{Result, StatsError};
