//! # Batch Actions
//!
//! Request-scoped types for the moderation action pipeline: the set of
//! operations a single form submission may carry, and the actor it runs as.
//! An [`ActionRequest`] lives for one pipeline execution and owns no
//! persistent state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ReporterIp;
use crate::permissions::PermissionSet;

/// Every operation a batch action request can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionName {
    Delete,
    Spoiler,
    UnlinkFile,
    Edit,
    Move,
    Report,
    GlobalReport,
    ReportBan,
}

impl ActionName {
    pub const ALL: [ActionName; 8] = [
        ActionName::Delete,
        ActionName::Spoiler,
        ActionName::UnlinkFile,
        ActionName::Edit,
        ActionName::Move,
        ActionName::Report,
        ActionName::GlobalReport,
        ActionName::ReportBan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionName::Delete => "delete",
            ActionName::Spoiler => "spoiler",
            ActionName::UnlinkFile => "unlink_file",
            ActionName::Edit => "edit",
            ActionName::Move => "move",
            ActionName::Report => "report",
            ActionName::GlobalReport => "global_report",
            ActionName::ReportBan => "report_ban",
        }
    }
}

/// A normalized batch action submission.
///
/// `checkedposts` is an ordered set: duplicates are removed during
/// normalization, first occurrence wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionRequest {
    pub checkedposts: Vec<u64>,
    /// Only meaningful combined with `report_ban`.
    pub checkedreports: Vec<Uuid>,

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
    /// Milliseconds, as parsed from the form's duration field.
    pub ban_duration: Option<i64>,
    pub log_message: Option<String>,
    pub postpassword: Option<String>,
    pub sticky: Option<u16>,
}

impl ActionRequest {
    pub fn is_requested(&self, action: ActionName) -> bool {
        match action {
            ActionName::Delete => self.delete,
            ActionName::Spoiler => self.spoiler,
            ActionName::UnlinkFile => self.unlink_file,
            ActionName::Edit => self.edit,
            ActionName::Move => self.move_posts,
            ActionName::Report => self.report,
            ActionName::GlobalReport => self.global_report,
            ActionName::ReportBan => self.report_ban,
        }
    }

    /// The actions whose flag is set, in declaration order.
    pub fn requested(&self) -> impl Iterator<Item = ActionName> + '_ {
        ActionName::ALL
            .into_iter()
            .filter(|action| self.is_requested(*action))
    }
}

/// Who a request runs as, resolved by the session layer before the pipeline
/// sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorContext {
    /// Authenticated staff username, if any.
    pub user: Option<String>,
    /// Capability set already scoped to the board the request targets.
    pub permissions: PermissionSet,
    pub ip: ReporterIp,
}

impl ActorContext {
    pub fn anonymous(ip: ReporterIp) -> Self {
        Self {
            user: None,
            permissions: PermissionSet::empty(),
            ip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IpKind;

    fn ip() -> ReporterIp {
        ReporterIp {
            cloak: "xx".into(),
            raw: "198.51.100.1".into(),
            kind: IpKind::Ipv4,
        }
    }

    #[test]
    fn requested_follows_flags() {
        let request = ActionRequest {
            delete: true,
            report: true,
            ..Default::default()
        };
        let names: Vec<_> = request.requested().collect();
        assert_eq!(names, vec![ActionName::Delete, ActionName::Report]);
    }

    #[test]
    fn anonymous_actor_has_no_permissions() {
        let actor = ActorContext::anonymous(ip());
        assert!(actor.user.is_none());
        assert!(actor.permissions.is_empty());
    }

    #[test]
    fn move_flag_round_trips_as_move() {
        let request = ActionRequest {
            move_posts: true,
            ..Default::default()
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["move"], true);
    }
}
