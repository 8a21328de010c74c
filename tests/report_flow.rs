use chrono::{TimeZone, Utc};
use luogu_stats::domain::model::{
    SubmissionRecord, UserIdentity, UserRecordSet, Verdict,
};
use luogu_stats::{aggregate, LocalStorage, RecordStore, ReportWriter};
use tempfile::TempDir;

fn accepted(pid: &str, title: &str, secs: i64) -> SubmissionRecord {
    SubmissionRecord {
        problem_id: pid.to_string(),
        problem_name: title.to_string(),
        submitted_at: Utc.timestamp_opt(secs, 0).unwrap(),
        verdict: Verdict::Accepted,
    }
}

fn identity(uid: u64, name: &str) -> UserIdentity {
    UserIdentity {
        uid,
        name: name.to_string(),
    }
}

#[tokio::test]
async fn stored_records_aggregate_into_both_sheets() {
    let records_dir = TempDir::new().unwrap();
    let report_dir = TempDir::new().unwrap();

    let store = RecordStore::new(LocalStorage::new(
        records_dir.path().to_str().unwrap().to_string(),
    ));

    // Alice solved p1 twice and p2 once; Bob solved p1; Carol's fetch failed,
    // so no document exists for her.
    let alice = UserRecordSet {
        identity: identity(1, "Alice"),
        records: vec![
            accepted("p1", "One", 10),
            accepted("p1", "One", 20),
            accepted("p2", "Two", 5),
        ],
    };
    let bob = UserRecordSet {
        identity: identity(2, "Bob"),
        records: vec![accepted("p1", "One", 1)],
    };
    store.save(&alice).await.unwrap();
    store.save(&bob).await.unwrap();

    let roster = vec![
        identity(1, "Alice"),
        identity(2, "Bob"),
        identity(3, "Carol"),
    ];

    let sets = store.load_roster(&roster).await.unwrap();
    assert_eq!(sets.len(), 2, "Carol has no document and is skipped");

    let (summary, detail) = aggregate(&sets);

    let writer = ReportWriter::new(LocalStorage::new(
        report_dir.path().to_str().unwrap().to_string(),
    ));
    writer.write(&summary, &detail).await.unwrap();

    let summary_sheet =
        std::fs::read_to_string(report_dir.path().join("summary.csv")).unwrap();
    let summary_lines: Vec<&str> = summary_sheet.lines().collect();
    assert_eq!(
        summary_lines,
        vec!["rank,name,uid,ac_count", "1,Alice,1,2", "2,Bob,2,1"]
    );

    let detail_sheet = std::fs::read_to_string(report_dir.path().join("detail.csv")).unwrap();
    let detail_lines: Vec<&str> = detail_sheet.lines().collect();
    assert_eq!(detail_lines[0], "name,uid,problem_id,problem_name,first_accepted_at");
    assert_eq!(detail_lines[1], "Bob,2,p1,One,1970-01-01 00:00:01");
    assert_eq!(detail_lines[2], "Alice,1,p2,Two,1970-01-01 00:00:05");
    assert_eq!(detail_lines[3], "Alice,1,p1,One,1970-01-01 00:00:10");

    // The failed user appears in neither sheet.
    assert!(!summary_sheet.contains("Carol"));
    assert!(!detail_sheet.contains("Carol"));
}

#[tokio::test]
async fn empty_record_set_still_earns_a_summary_row() {
    let records_dir = TempDir::new().unwrap();
    let report_dir = TempDir::new().unwrap();

    let store = RecordStore::new(LocalStorage::new(
        records_dir.path().to_str().unwrap().to_string(),
    ));

    let solver = UserRecordSet {
        identity: identity(1, "Solver"),
        records: vec![accepted("p1", "One", 100)],
    };
    let idle = UserRecordSet {
        identity: identity(2, "Idle"),
        records: vec![],
    };
    store.save(&solver).await.unwrap();
    store.save(&idle).await.unwrap();

    let roster = vec![identity(1, "Solver"), identity(2, "Idle")];
    let sets = store.load_roster(&roster).await.unwrap();
    let (summary, detail) = aggregate(&sets);

    let writer = ReportWriter::new(LocalStorage::new(
        report_dir.path().to_str().unwrap().to_string(),
    ));
    writer.write(&summary, &detail).await.unwrap();

    let summary_sheet =
        std::fs::read_to_string(report_dir.path().join("summary.csv")).unwrap();
    assert!(summary_sheet.contains("2,Idle,2,0"));

    let detail_sheet = std::fs::read_to_string(report_dir.path().join("detail.csv")).unwrap();
    assert!(!detail_sheet.contains("Idle"));
}

#[tokio::test]
async fn re_sorting_detail_rows_is_a_no_op() {
    let sets = vec![
        UserRecordSet {
            identity: identity(2, "B"),
            records: vec![accepted("p5", "Five", 50), accepted("p6", "Six", 30)],
        },
        UserRecordSet {
            identity: identity(1, "A"),
            records: vec![accepted("p7", "Seven", 40)],
        },
    ];

    let (_, detail) = aggregate(&sets);

    let mut resorted = detail.clone();
    resorted.sort_by(|a, b| {
        (
            a.problem.first_accepted_at,
            a.identity.uid,
            &a.problem.problem_id,
        )
            .cmp(&(
                b.problem.first_accepted_at,
                b.identity.uid,
                &b.problem.problem_id,
            ))
    });

    assert_eq!(detail, resorted);
}
