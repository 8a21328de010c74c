use crate::core::retry::{with_retry, RetryPolicy};
use crate::core::session::SessionContext;
use crate::domain::model::{
    DateBoundary, SubmissionRecord, UserIdentity, UserRecordSet, Verdict,
};
use crate::utils::error::{Result, StatsError};
use crate::utils::validation::{validate_positive_uid, validate_url};
use chrono::{DateTime, Utc};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; luogu-stats/0.1)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Paginated record listing as served by `GET {base}/record/list`.
#[derive(Debug, Deserialize)]
struct RecordListEnvelope {
    code: u32,
    #[serde(rename = "currentData")]
    current_data: Option<CurrentData>,
}

#[derive(Debug, Deserialize)]
struct CurrentData {
    records: RecordTable,
}

#[derive(Debug, Deserialize)]
struct RecordTable {
    result: Vec<WireRecord>,
    count: u64,
    #[serde(rename = "perPage")]
    per_page: u64,
}

#[derive(Debug, Deserialize)]
struct WireRecord {
    status: u32,
    #[serde(rename = "submitTime")]
    submit_time: i64,
    problem: WireProblem,
}

#[derive(Debug, Deserialize)]
struct WireProblem {
    pid: String,
    title: String,
}

/// Per-user result of a batch fetch. A failed user yields no record set.
#[derive(Debug)]
pub struct UserFetchOutcome {
    pub identity: UserIdentity,
    pub result: Result<UserRecordSet>,
}

/// Authenticated, paginated, rate-limited retrieval of one user's submission
/// history. Listing is newest-first; the judge signals the end of the listing
/// through `count`/`perPage`.
pub struct RecordFetcher {
    client: Client,
    session: SessionContext,
    list_url: String,
    policy: RetryPolicy,
}

impl RecordFetcher {
    pub fn new(base_url: &str, session: SessionContext, policy: RetryPolicy) -> Result<Self> {
        validate_url("base_url", base_url)?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            session,
            list_url: format!("{}/record/list", base_url.trim_end_matches('/')),
            policy,
        })
    }

    /// Fetches all Accepted records for one user, newest-first, stopping at
    /// the date boundary if one is set. An expired session aborts immediately;
    /// transient page failures are retried up to the policy bound and then
    /// fail the whole user.
    pub async fn fetch_user_records(
        &self,
        identity: &UserIdentity,
        boundary: Option<&DateBoundary>,
    ) -> Result<UserRecordSet> {
        validate_positive_uid("uid", identity.uid)?;

        let mut records = Vec::new();
        let mut page: u64 = 1;

        loop {
            if page > 1 {
                tokio::time::sleep(self.policy.delay).await;
            }

            tracing::debug!(uid = identity.uid, page = page, "fetching record page");
            let table = with_retry(&self.policy, || self.fetch_page(identity.uid, page))
                .await
                .map_err(|e| match e {
                    StatsError::Auth { .. } => e,
                    other => StatsError::Fetch {
                        uid: identity.uid,
                        message: format!("page {}: {}", page, other),
                    },
                })?;

            if table.result.is_empty() {
                break;
            }

            let mut crossed_boundary = false;
            for wire in &table.result {
                let submitted_at = timestamp_to_utc(wire.submit_time);
                if let Some(b) = boundary {
                    // Newest-first listing: the first entry older than the
                    // boundary ends the whole fetch for this user.
                    if b.excludes(submitted_at) {
                        crossed_boundary = true;
                        break;
                    }
                }
                let verdict = Verdict::from_status(wire.status);
                if verdict != Verdict::Accepted {
                    continue;
                }
                records.push(SubmissionRecord {
                    problem_id: wire.problem.pid.clone(),
                    problem_name: wire.problem.title.clone(),
                    submitted_at,
                    verdict,
                });
            }

            if crossed_boundary {
                tracing::debug!(uid = identity.uid, page = page, "date boundary reached");
                break;
            }

            // perPage == 0 would never satisfy the count check; treat the
            // degenerate envelope as end-of-listing.
            if table.per_page == 0 || page.saturating_mul(table.per_page) >= table.count {
                break;
            }
            page += 1;
        }

        Ok(UserRecordSet {
            identity: identity.clone(),
            records,
        })
    }

    /// Fetches every roster user in order, one at a time. A failure is scoped
    /// to its user; the batch always runs to completion.
    pub async fn fetch_roster(
        &self,
        roster: &[UserIdentity],
        boundary: Option<&DateBoundary>,
    ) -> Vec<UserFetchOutcome> {
        let mut outcomes = Vec::with_capacity(roster.len());

        for (index, identity) in roster.iter().enumerate() {
            if index > 0 {
                // Keep the inter-request floor across user boundaries too.
                tokio::time::sleep(self.policy.delay).await;
            }

            tracing::info!(uid = identity.uid, name = %identity.name, "fetching user records");
            let result = self.fetch_user_records(identity, boundary).await;
            match &result {
                Ok(set) => {
                    tracing::info!(uid = identity.uid, accepted = set.records.len(), "fetch complete")
                }
                Err(e) => tracing::warn!(uid = identity.uid, error = %e, "fetch failed"),
            }
            outcomes.push(UserFetchOutcome {
                identity: identity.clone(),
                result,
            });
        }

        outcomes
    }

    async fn fetch_page(&self, uid: u64, page: u64) -> Result<RecordTable> {
        let response = self
            .client
            .get(&self.list_url)
            .query(&[
                ("user", uid.to_string()),
                ("page", page.to_string()),
                ("_contentOnly", "1".to_string()),
            ])
            .header(header::COOKIE, self.session.cookie_header())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(StatsError::Auth {
                message: format!("server rejected session (status {})", status.as_u16()),
            });
        }
        if !status.is_success() {
            return Err(StatsError::Server {
                status: status.as_u16(),
            });
        }

        // A login redirect serves an HTML page here; failing to decode JSON
        // means the session cookies no longer work.
        let envelope: RecordListEnvelope =
            response.json().await.map_err(|_| StatsError::Auth {
                message: "non-JSON response, session cookies likely expired".to_string(),
            })?;

        if envelope.code == 401 || envelope.code == 403 {
            return Err(StatsError::Auth {
                message: format!("judge API returned code {}", envelope.code),
            });
        }

        let current = envelope.current_data.ok_or_else(|| StatsError::Input {
            message: format!(
                "unexpected record listing envelope (code {})",
                envelope.code
            ),
        })?;

        Ok(current.records)
    }
}

fn timestamp_to_utc(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default()
}
