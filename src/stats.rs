use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{Report, ReportStatus};

/// Summary counters for the dashboard, derived from one collection
/// snapshot. Not persisted, not incrementally maintained: recomputed in
/// full every time the backing collection is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub count_user: usize,
    pub count_report_pending: usize,
    pub count_report_approved: usize,
    pub count_report_rejected: usize,
    pub count_report_solved: usize,
}

/// Pure, total and deterministic: no error cases, no side effects, all-zero
/// on an empty collection. Reports without any submitter identity collapse
/// into a single anonymous bucket of the user count.
pub fn compute_stats<'a, I>(reports: I) -> StatsSnapshot
where
    I: IntoIterator<Item = &'a Report>,
{
    let mut snapshot = StatsSnapshot::default();
    let mut submitters: HashSet<Option<&str>> = HashSet::new();

    for report in reports {
        match report.status {
            ReportStatus::Pending => snapshot.count_report_pending += 1,
            ReportStatus::Approved => snapshot.count_report_approved += 1,
            ReportStatus::Rejected => snapshot.count_report_rejected += 1,
            ReportStatus::Solved => snapshot.count_report_solved += 1,
        }
        submitters.insert(report.submitter_identity());
    }

    snapshot.count_user = submitters.len();
    snapshot
}
