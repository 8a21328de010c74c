use crate::domain::model::{DetailRow, SummaryRow};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, StatsError};

pub const SUMMARY_FILE: &str = "summary.csv";
pub const DETAIL_FILE: &str = "detail.csv";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders the two report sheets and hands them to the storage boundary.
pub struct ReportWriter<S: Storage> {
    storage: S,
}

impl<S: Storage> ReportWriter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn write(&self, summary: &[SummaryRow], detail: &[DetailRow]) -> Result<()> {
        self.storage
            .write_file(SUMMARY_FILE, &render_summary(summary)?)
            .await?;
        self.storage
            .write_file(DETAIL_FILE, &render_detail(detail)?)
            .await?;
        tracing::info!(
            summary_rows = summary.len(),
            detail_rows = detail.len(),
            "report sheets written"
        );
        Ok(())
    }
}

fn render_summary(rows: &[SummaryRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["rank", "name", "uid", "ac_count"])?;
    for row in rows {
        writer.write_record([
            row.rank.to_string(),
            row.identity.name.clone(),
            row.identity.uid.to_string(),
            row.ac_count.to_string(),
        ])?;
    }
    finish(writer)
}

fn render_detail(rows: &[DetailRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["name", "uid", "problem_id", "problem_name", "first_accepted_at"])?;
    for row in rows {
        writer.write_record([
            row.identity.name.clone(),
            row.identity.uid.to_string(),
            row.problem.problem_id.clone(),
            row.problem.problem_name.clone(),
            row.problem.first_accepted_at.format(TIME_FORMAT).to_string(),
        ])?;
    }
    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| StatsError::Io(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{DedupedProblem, UserIdentity};
    use chrono::{TimeZone, Utc};

    fn identity(uid: u64, name: &str) -> UserIdentity {
        UserIdentity {
            uid,
            name: name.to_string(),
        }
    }

    #[test]
    fn summary_sheet_lists_rows_in_given_order() {
        let rows = vec![
            SummaryRow {
                rank: 1,
                identity: identity(1, "Alice"),
                ac_count: 2,
            },
            SummaryRow {
                rank: 2,
                identity: identity(2, "Bob"),
                ac_count: 1,
            },
        ];

        let bytes = render_summary(&rows).unwrap();
        let sheet = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = sheet.lines().collect();

        assert_eq!(lines[0], "rank,name,uid,ac_count");
        assert_eq!(lines[1], "1,Alice,1,2");
        assert_eq!(lines[2], "2,Bob,2,1");
    }

    #[test]
    fn detail_sheet_formats_timestamps() {
        let rows = vec![DetailRow {
            identity: identity(7, "Alice"),
            problem: DedupedProblem {
                problem_id: "P1001".to_string(),
                problem_name: "A+B Problem".to_string(),
                first_accepted_at: Utc.with_ymd_and_hms(2024, 9, 10, 8, 30, 0).unwrap(),
            },
        }];

        let bytes = render_detail(&rows).unwrap();
        let sheet = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = sheet.lines().collect();

        assert_eq!(lines[0], "name,uid,problem_id,problem_name,first_accepted_at");
        assert_eq!(lines[1], "Alice,7,P1001,A+B Problem,2024-09-10 08:30:00");
    }

    #[test]
    fn problem_names_with_commas_are_quoted() {
        let rows = vec![DetailRow {
            identity: identity(7, "Alice"),
            problem: DedupedProblem {
                problem_id: "P2000".to_string(),
                problem_name: "Travel, Part 2".to_string(),
                first_accepted_at: Utc.with_ymd_and_hms(2024, 9, 10, 8, 30, 0).unwrap(),
            },
        }];

        let sheet = String::from_utf8(render_detail(&rows).unwrap()).unwrap();
        assert!(sheet.contains("\"Travel, Part 2\""));
    }

    #[test]
    fn empty_views_render_headers_only() {
        let summary = String::from_utf8(render_summary(&[]).unwrap()).unwrap();
        let detail = String::from_utf8(render_detail(&[]).unwrap()).unwrap();

        assert_eq!(summary.trim_end(), "rank,name,uid,ac_count");
        assert_eq!(
            detail.trim_end(),
            "name,uid,problem_id,problem_name,first_accepted_at"
        );
    }
}
