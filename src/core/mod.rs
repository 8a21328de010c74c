pub mod aggregate;
pub mod fetcher;
pub mod report;
pub mod retry;
pub mod session;
pub mod store;

pub use crate::domain::model::{
    DateBoundary, DedupedProblem, DetailRow, SubmissionRecord, SummaryRow, UserIdentity,
    UserRecordSet, Verdict,
};
pub use crate::domain::ports::Storage;
pub use crate::utils::error::Result;
