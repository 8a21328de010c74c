use crate::utils::error::{Result, StatsError};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Judge status code Luogu assigns to an accepted submission.
pub const STATUS_ACCEPTED: u32 = 12;

/// One roster entry. Immutable for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub uid: u64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Accepted,
    Other,
}

impl Verdict {
    pub fn from_status(status: u32) -> Self {
        if status == STATUS_ACCEPTED {
            Verdict::Accepted
        } else {
            Verdict::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub problem_id: String,
    pub problem_name: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub submitted_at: DateTime<Utc>,
    pub verdict: Verdict,
}

/// One user's fetched records, persisted between the fetch and report phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecordSet {
    pub identity: UserIdentity,
    pub records: Vec<SubmissionRecord>,
}

/// One problem after dedup: earliest accepted submission wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupedProblem {
    pub problem_id: String,
    pub problem_name: String,
    pub first_accepted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub rank: usize,
    pub identity: UserIdentity,
    pub ac_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub identity: UserIdentity,
    pub problem: DedupedProblem,
}

/// Minimum-timestamp filter applied during fetch. Records older than the
/// boundary are excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateBoundary(DateTime<Utc>);

impl DateBoundary {
    /// Parses a `YYYY-MM-DD` date as midnight UTC of that day.
    pub fn parse(input: &str) -> Result<Self> {
        let date =
            NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|e| StatsError::Input {
                message: format!("invalid date boundary {:?}: {}", input, e),
            })?;
        Ok(Self(date.and_time(NaiveTime::MIN).and_utc()))
    }

    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }

    /// True when a submission time falls before the boundary.
    pub fn excludes(&self, submitted_at: DateTime<Utc>) -> bool {
        submitted_at < self.0
    }
}
