//! # Report Sub-model
//!
//! Builds bounded, append-only report entries. Each post carries a
//! board-local and a global report list; both are fixed-capacity rings that
//! keep the newest entries.

use chrono::Utc;
use domains::actions::ActionRequest;
use domains::models::{Report, ReporterIp};
use uuid::Uuid;

/// Retained entries per report list.
pub const REPORT_CAP: usize = 5;

/// Construct one report entry for the acting identity.
pub fn build_report(reason: &str, ip: &ReporterIp) -> Report {
    Report {
        id: Uuid::now_v7(),
        reason: reason.to_string(),
        date: Utc::now(),
        ip: ip.clone(),
    }
}

/// Append, then retain only the `cap` most recent entries (drop-oldest).
pub fn append_report(list: &mut Vec<Report>, report: Report, cap: usize) {
    list.push(report);
    if list.len() > cap {
        let excess = list.len() - cap;
        list.drain(..excess);
    }
}

/// Which lists one invocation feeds. Both flags set with a shared reason
/// append the same entry to both lists.
#[derive(Debug, Clone)]
pub struct ReportPlan {
    pub report: Report,
    pub board_local: bool,
    pub global: bool,
}

/// Build the append plan for a request, or `None` when no report action is
/// set. The "reports must have a reason" rule runs before this is reached.
pub fn plan_reports(request: &ActionRequest, ip: &ReporterIp) -> Option<ReportPlan> {
    if !request.report && !request.global_report {
        return None;
    }
    let reason = request.report_reason.as_deref()?;
    Some(ReportPlan {
        report: build_report(reason, ip),
        board_local: request.report,
        global: request.global_report,
    })
}
