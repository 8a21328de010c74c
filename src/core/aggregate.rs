use crate::domain::model::{
    DedupedProblem, DetailRow, SummaryRow, UserIdentity, UserRecordSet, Verdict,
};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Collapses each user's Accepted records to one entry per problem (earliest
/// acceptance wins) and derives the two report views: a ranked summary and a
/// flattened, time-ordered detail list.
pub fn aggregate(sets: &[UserRecordSet]) -> (Vec<SummaryRow>, Vec<DetailRow>) {
    let mut per_user: Vec<(UserIdentity, Vec<DedupedProblem>)> = sets
        .iter()
        .map(|set| (set.identity.clone(), dedup_earliest(set)))
        .collect();

    let mut detail: Vec<DetailRow> = per_user
        .iter()
        .flat_map(|(identity, problems)| {
            problems.iter().map(move |problem| DetailRow {
                identity: identity.clone(),
                problem: problem.clone(),
            })
        })
        .collect();
    detail.sort_by(|a, b| {
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

    // Stable sort: equal counts keep roster order. Rank is the final row
    // number, so ties share a count but not a rank.
    per_user.sort_by_key(|(_, problems)| Reverse(problems.len()));
    let summary = per_user
        .into_iter()
        .enumerate()
        .map(|(index, (identity, problems))| SummaryRow {
            rank: index + 1,
            identity,
            ac_count: problems.len(),
        })
        .collect();

    (summary, detail)
}

fn dedup_earliest(set: &UserRecordSet) -> Vec<DedupedProblem> {
    let mut by_problem: BTreeMap<&str, DedupedProblem> = BTreeMap::new();

    for record in set
        .records
        .iter()
        .filter(|r| r.verdict == Verdict::Accepted)
    {
        match by_problem.get_mut(record.problem_id.as_str()) {
            Some(existing) => {
                if record.submitted_at < existing.first_accepted_at {
                    existing.problem_name = record.problem_name.clone();
                    existing.first_accepted_at = record.submitted_at;
                }
            }
            None => {
                by_problem.insert(
                    &record.problem_id,
                    DedupedProblem {
                        problem_id: record.problem_id.clone(),
                        problem_name: record.problem_name.clone(),
                        first_accepted_at: record.submitted_at,
                    },
                );
            }
        }
    }

    by_problem.into_values().collect()
}
