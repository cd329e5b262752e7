//! # Form normalization
//!
//! Converts the raw actions submission into a clean [`ActionRequest`]:
//! free-text fields are trimmed with empties dropped, `checkedposts` is
//! deduplicated preserving order, and report ids that fail to parse are
//! discarded rather than erroring.

use std::collections::HashSet;

use domains::actions::ActionRequest;
use serde::Deserialize;
use uuid::Uuid;

/// The actions form as submitted, before any cleanup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawActionForm {
    pub checkedposts: Vec<u64>,
    pub checkedreports: Vec<String>,

    pub delete: bool,
    pub spoiler: bool,
    pub unlink_file: bool,
    pub edit: bool,
    #[serde(rename = "move")]
    pub move_posts: bool,
    pub report: bool,
    pub global_report: bool,
    pub report_ban: bool,

    pub move_to_thread: Option<u64>,
    pub move_to_board: Option<String>,
    pub report_reason: Option<String>,
    pub ban_reason: Option<String>,
    pub ban_duration: Option<i64>,
    pub log_message: Option<String>,
    pub postpassword: Option<String>,
    pub sticky: Option<u16>,
}

fn trimmed(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn normalize(raw: RawActionForm) -> ActionRequest {
    let mut seen = HashSet::new();
    let checkedposts: Vec<u64> = raw
        .checkedposts
        .into_iter()
        .filter(|id| seen.insert(*id))
        .collect();
    let checkedreports: Vec<Uuid> = raw
        .checkedreports
        .iter()
        .filter_map(|id| Uuid::parse_str(id.trim()).ok())
        .collect();

    ActionRequest {
        checkedposts,
        checkedreports,
        delete: raw.delete,
        spoiler: raw.spoiler,
        unlink_file: raw.unlink_file,
        edit: raw.edit,
        move_posts: raw.move_posts,
        report: raw.report,
        global_report: raw.global_report,
        report_ban: raw.report_ban,
        move_to_thread: raw.move_to_thread,
        move_to_board: trimmed(raw.move_to_board),
        report_reason: trimmed(raw.report_reason),
        ban_reason: trimmed(raw.ban_reason),
        ban_duration: raw.ban_duration,
        log_message: trimmed(raw.log_message),
        postpassword: trimmed(raw.postpassword),
        sticky: raw.sticky,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_posts_collapse_first_wins() {
        let raw = RawActionForm {
            checkedposts: vec![3, 1, 3, 2, 1],
            ..Default::default()
        };
        let request = normalize(raw);
        assert_eq!(request.checkedposts, vec![3, 1, 2]);
    }

    #[test]
    fn text_fields_are_trimmed_and_emptied() {
        let raw = RawActionForm {
            report_reason: Some("  spam  ".into()),
            ban_reason: Some("   ".into()),
            move_to_board: Some(" b ".into()),
            ..Default::default()
        };
        let request = normalize(raw);
        assert_eq!(request.report_reason.as_deref(), Some("spam"));
        assert!(request.ban_reason.is_none());
        assert_eq!(request.move_to_board.as_deref(), Some("b"));
    }

    #[test]
    fn malformed_report_ids_are_dropped() {
        let id = Uuid::now_v7();
        let raw = RawActionForm {
            checkedreports: vec![id.to_string(), "not-a-uuid".into()],
            ..Default::default()
        };
        let request = normalize(raw);
        assert_eq!(request.checkedreports, vec![id]);
    }

    #[test]
    fn move_flag_deserializes_from_move_key() {
        let raw: RawActionForm =
            serde_json::from_str(r#"{"checkedposts":[1],"move":true}"#).unwrap();
        assert!(raw.move_posts);
        assert_eq!(raw.checkedposts, vec![1]);
    }
}
