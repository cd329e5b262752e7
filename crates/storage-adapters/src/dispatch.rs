//! # Reference dispatcher
//!
//! Executes an approved, filtered batch against the in-memory store. This is
//! the only component that mutates persistent state. Execution failures are
//! reported as `DispatchError`, never as validation messages.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use domains::actions::ActionName;
use domains::error::DispatchError;
use domains::models::{Ban, ModlogEntry, Post};
use domains::permissions::Permission;
use domains::ports::{ActionDispatcher, DispatchContext, DispatchOutcome};
use services::hashing::digest_post_password;
use services::reports::{append_report, plan_reports, REPORT_CAP};
use tracing::{info, warn};
use uuid::Uuid;

use crate::mem::MemStore;

fn is_self_service(action: ActionName) -> bool {
    matches!(
        action,
        ActionName::Delete | ActionName::Spoiler | ActionName::UnlinkFile
    )
}

pub struct MemDispatcher {
    store: Arc<MemStore>,
    post_password_secret: String,
}

impl MemDispatcher {
    pub fn new(store: Arc<MemStore>, post_password_secret: impl Into<String>) -> Self {
        Self {
            store,
            post_password_secret: post_password_secret.into(),
        }
    }

    /// Restrict self-service targets to posts whose stored digest matches the
    /// supplied password. Board managers skip the check.
    fn password_filter(&self, ctx: &DispatchContext, posts: &[Post]) -> Vec<Post> {
        if ctx.actor.permissions.has(Permission::ManageBoardGeneral) {
            return posts.to_vec();
        }
        let digest = ctx
            .request
            .postpassword
            .as_deref()
            .map(|password| digest_post_password(&self.post_password_secret, password));
        posts
            .iter()
            .filter(|post| digest.is_some() && post.password == digest)
            .cloned()
            .collect()
    }

    fn apply_reports(&self, ctx: &DispatchContext, posts: &[Post], messages: &mut Vec<String>) {
        let Some(plan) = plan_reports(&ctx.request, &ctx.actor.ip) else {
            return;
        };
        for post in posts {
            self.store.update_post(&post.board, post.post_id, |stored| {
                if plan.board_local {
                    append_report(&mut stored.reports, plan.report.clone(), REPORT_CAP);
                }
                if plan.global {
                    append_report(&mut stored.global_reports, plan.report.clone(), REPORT_CAP);
                }
            });
        }
        messages.push(format!("Reported {} posts", posts.len()));
    }

    /// Ban the reporters behind the checked reports, then dismiss those
    /// reports from the selected posts.
    fn apply_report_bans(&self, ctx: &DispatchContext, posts: &[Post], messages: &mut Vec<String>) {
        let checked = &ctx.request.checkedreports;
        let expires_at = ctx
            .request
            .ban_duration
            .map(|ms| Utc::now() + Duration::milliseconds(ms));
        let mut banned = 0usize;
        for post in posts {
            self.store.update_post(&post.board, post.post_id, |stored| {
                for list in [&mut stored.reports, &mut stored.global_reports] {
                    list.retain(|report| {
                        if !checked.contains(&report.id) {
                            return true;
                        }
                        self.store.insert_ban(Ban {
                            id: Uuid::now_v7(),
                            ip: report.ip.raw.clone(),
                            reason: ctx
                                .request
                                .ban_reason
                                .clone()
                                .unwrap_or_else(|| "Report abuse".to_string()),
                            board: Some(ctx.board.uri.clone()),
                            expires_at,
                            created_at: Utc::now(),
                        });
                        banned += 1;
                        false
                    });
                }
            });
        }
        messages.push(format!("Banned {banned} reporters"));
    }

    fn apply_spoiler(&self, posts: &[Post], messages: &mut Vec<String>) {
        for post in posts {
            self.store.update_post(&post.board, post.post_id, |stored| {
                for file in &mut stored.files {
                    file.spoiler = true;
                }
            });
        }
        messages.push(format!("Spoilered files in {} posts", posts.len()));
    }

    fn apply_unlink(&self, posts: &[Post], messages: &mut Vec<String>) {
        for post in posts {
            self.store.update_post(&post.board, post.post_id, |stored| {
                stored.files.clear();
            });
        }
        messages.push(format!("Unlinked files from {} posts", posts.len()));
    }

    fn apply_move(&self, ctx: &DispatchContext, posts: &[Post], messages: &mut Vec<String>) {
        let destination_board = ctx
            .destination_thread
            .as_ref()
            .map(|thread| thread.board.clone())
            .or_else(|| ctx.destination_board.as_ref().map(|board| board.uri.clone()))
            .unwrap_or_else(|| ctx.board.uri.clone());
        let destination_thread = ctx.destination_thread.as_ref().map(|thread| thread.post_id);

        let mut moved = 0usize;
        for post in posts {
            let mut batch = vec![post.post_id];
            if post.is_op() && destination_thread.is_none() {
                // Whole-thread move: replies follow their OP.
                batch.extend(self.store.reply_ids(&post.board, post.post_id));
            }
            for id in batch {
                let Some(mut taken) = self.store.remove_post(&post.board, id) else {
                    continue;
                };
                taken.board = destination_board.clone();
                if let Some(thread_id) = destination_thread {
                    taken.thread = Some(thread_id);
                } else if taken.post_id == post.post_id {
                    // Without a destination thread the selected post roots a
                    // new thread on the destination board.
                    taken.thread = None;
                } else {
                    taken.thread = Some(post.post_id);
                }
                self.store.insert_post(taken);
                moved += 1;
            }
        }
        messages.push(format!("Moved {moved} posts"));
    }

    fn apply_delete(&self, posts: &[Post], messages: &mut Vec<String>) {
        let mut deleted = 0usize;
        for post in posts {
            let mut batch = vec![post.post_id];
            if post.is_op() {
                batch.extend(self.store.reply_ids(&post.board, post.post_id));
            }
            for id in batch {
                if self.store.remove_post(&post.board, id).is_some() {
                    deleted += 1;
                }
            }
        }
        messages.push(format!("Deleted {deleted} posts"));
    }
}

#[async_trait]
impl ActionDispatcher for MemDispatcher {
    async fn execute(&self, ctx: DispatchContext) -> Result<DispatchOutcome, DispatchError> {
        let has = |action: ActionName| ctx.valid_actions.contains(&action);
        let posts = &ctx.posts;

        // Self-service actions act on the password-matched subset; everything
        // else acts on the full batch. When only self-service actions were
        // requested and nothing matched, the whole request failed.
        let self_service = self.password_filter(&ctx, posts);
        let only_self_service = !ctx.valid_actions.is_empty()
            && ctx.valid_actions.iter().copied().all(is_self_service);
        if only_self_service && self_service.is_empty() {
            return Err(DispatchError::PasswordMismatch);
        }

        // Destructive steps run last so reports and file edits see the posts
        // they were aimed at.
        let mut messages = Vec::new();
        if has(ActionName::Report) || has(ActionName::GlobalReport) {
            self.apply_reports(&ctx, posts, &mut messages);
        }
        if has(ActionName::ReportBan) {
            self.apply_report_bans(&ctx, posts, &mut messages);
        }
        if has(ActionName::Spoiler) {
            self.apply_spoiler(&self_service, &mut messages);
        }
        if has(ActionName::UnlinkFile) {
            self.apply_unlink(&self_service, &mut messages);
        }
        if has(ActionName::Move) {
            self.apply_move(&ctx, posts, &mut messages);
        }
        if has(ActionName::Delete) {
            self.apply_delete(&self_service, &mut messages);
        }
        if has(ActionName::Edit) {
            warn!("edit reached the dispatcher; the pipeline redirects it earlier");
        }

        if let Some(user) = ctx.actor.user.clone() {
            self.store.append_modlog(ModlogEntry {
                board: ctx.board.uri.clone(),
                actions: ctx
                    .valid_actions
                    .iter()
                    .map(|action| action.as_str().to_string())
                    .collect(),
                post_ids: posts.iter().map(|post| post.post_id).collect(),
                message: ctx.request.log_message.clone(),
                user: Some(user),
                date: Utc::now(),
            });
        }

        info!(board = %ctx.board.uri, ?messages, "batch action executed");
        Ok(DispatchOutcome {
            messages,
            redirect: format!("/{}/", ctx.board.uri),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::actions::{ActionRequest, ActorContext};
    use domains::models::{Board, IpKind, PostFile, Report, ReporterIp};
    use domains::permissions::PermissionSet;
    use domains::ports::PostStore;

    fn ip() -> ReporterIp {
        ReporterIp {
            cloak: "cloak".into(),
            raw: "198.51.100.7".into(),
            kind: IpKind::Ipv4,
        }
    }

    fn post(board: &str, post_id: u64, thread: Option<u64>) -> Post {
        Post {
            board: board.into(),
            post_id,
            thread,
            message: String::new(),
            date: Utc::now(),
            password: None,
            files: vec![PostFile {
                filename: "a.png".into(),
                original_filename: "cat.png".into(),
                spoiler: false,
            }],
            sticky: 0,
            reports: vec![],
            global_reports: vec![],
        }
    }

    fn seeded() -> (Arc<MemStore>, MemDispatcher) {
        let store = Arc::new(MemStore::new());
        store.insert_board(Board::new("b", "Random"));
        store.insert_post(post("b", 1, None));
        store.insert_post(post("b", 2, Some(1)));
        store.insert_post(post("b", 3, None));
        let dispatcher = MemDispatcher::new(store.clone(), "secret");
        (store, dispatcher)
    }

    fn ctx(
        store_posts: Vec<Post>,
        request: ActionRequest,
        valid_actions: Vec<ActionName>,
        actor: ActorContext,
    ) -> DispatchContext {
        DispatchContext {
            board: Board::new("b", "Random"),
            actor,
            request,
            valid_actions,
            posts: store_posts,
            destination_thread: None,
            destination_board: None,
        }
    }

    fn manager() -> ActorContext {
        ActorContext {
            user: Some("mod".into()),
            permissions: PermissionSet::empty().with(Permission::ManageBoardGeneral),
            ip: ip(),
        }
    }

    #[tokio::test]
    async fn delete_cascades_to_replies() {
        let (store, dispatcher) = seeded();
        let targets = vec![post("b", 1, None)];
        let outcome = dispatcher
            .execute(ctx(
                targets,
                ActionRequest {
                    checkedposts: vec![1],
                    delete: true,
                    ..Default::default()
                },
                vec![ActionName::Delete],
                manager(),
            ))
            .await
            .unwrap();
        assert_eq!(outcome.messages, vec!["Deleted 2 posts"]);
        let remaining = store.board_posts("b");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].post_id, 3);
    }

    #[tokio::test]
    async fn anon_delete_requires_matching_password() {
        let (store, dispatcher) = seeded();
        store.update_post("b", 3, |stored| {
            stored.password = Some(digest_post_password("secret", "hunter2"));
        });
        let targets = store.get_posts("b", &[3], true).await.unwrap();

        let wrong = dispatcher
            .execute(ctx(
                targets.clone(),
                ActionRequest {
                    checkedposts: vec![3],
                    delete: true,
                    postpassword: Some("wrong".into()),
                    ..Default::default()
                },
                vec![ActionName::Delete],
                ActorContext::anonymous(ip()),
            ))
            .await;
        assert!(matches!(wrong, Err(DispatchError::PasswordMismatch)));

        let right = dispatcher
            .execute(ctx(
                targets,
                ActionRequest {
                    checkedposts: vec![3],
                    delete: true,
                    postpassword: Some("hunter2".into()),
                    ..Default::default()
                },
                vec![ActionName::Delete],
                ActorContext::anonymous(ip()),
            ))
            .await
            .unwrap();
        assert_eq!(right.messages, vec!["Deleted 1 posts"]);
    }

    #[tokio::test]
    async fn spoiler_and_unlink_touch_files() {
        let (store, dispatcher) = seeded();
        let targets = store.get_posts("b", &[3], true).await.unwrap();
        dispatcher
            .execute(ctx(
                targets.clone(),
                ActionRequest {
                    checkedposts: vec![3],
                    spoiler: true,
                    ..Default::default()
                },
                vec![ActionName::Spoiler],
                manager(),
            ))
            .await
            .unwrap();
        assert!(store.board_posts("b").iter().any(|p| p.post_id == 3
            && p.files.iter().all(|f| f.spoiler)));

        dispatcher
            .execute(ctx(
                targets,
                ActionRequest {
                    checkedposts: vec![3],
                    unlink_file: true,
                    ..Default::default()
                },
                vec![ActionName::UnlinkFile],
                manager(),
            ))
            .await
            .unwrap();
        assert!(store
            .board_posts("b")
            .iter()
            .any(|p| p.post_id == 3 && p.files.is_empty()));
    }

    #[tokio::test]
    async fn reports_append_to_both_lists() {
        let (store, dispatcher) = seeded();
        let targets = store.get_posts("b", &[3], true).await.unwrap();
        dispatcher
            .execute(ctx(
                targets,
                ActionRequest {
                    checkedposts: vec![3],
                    report: true,
                    global_report: true,
                    report_reason: Some("off topic".into()),
                    ..Default::default()
                },
                vec![ActionName::Report, ActionName::GlobalReport],
                ActorContext::anonymous(ip()),
            ))
            .await
            .unwrap();
        let stored = store
            .board_posts("b")
            .into_iter()
            .find(|p| p.post_id == 3)
            .unwrap();
        assert_eq!(stored.reports.len(), 1);
        assert_eq!(stored.global_reports.len(), 1);
        assert_eq!(stored.reports[0].reason, "off topic");
    }

    #[tokio::test]
    async fn report_ban_bans_and_dismisses() {
        let (store, dispatcher) = seeded();
        let report = Report {
            id: Uuid::now_v7(),
            reason: "nonsense".into(),
            date: Utc::now(),
            ip: ip(),
        };
        let report_id = report.id;
        store.update_post("b", 3, |stored| stored.reports.push(report));
        let targets = store.get_posts("b", &[3], true).await.unwrap();

        let actor = ActorContext {
            user: Some("mod".into()),
            permissions: PermissionSet::empty().with(Permission::ManageBoardBans),
            ip: ip(),
        };
        dispatcher
            .execute(ctx(
                targets,
                ActionRequest {
                    checkedposts: vec![3],
                    checkedreports: vec![report_id],
                    report_ban: true,
                    ban_reason: Some("report abuse".into()),
                    ban_duration: Some(86_400_000),
                    ..Default::default()
                },
                vec![ActionName::ReportBan],
                actor,
            ))
            .await
            .unwrap();

        let bans = store.bans();
        assert_eq!(bans.len(), 1);
        assert_eq!(bans[0].ip, "198.51.100.7");
        assert!(bans[0].expires_at.is_some());
        let stored = store
            .board_posts("b")
            .into_iter()
            .find(|p| p.post_id == 3)
            .unwrap();
        assert!(stored.reports.is_empty());
    }

    #[tokio::test]
    async fn move_reparents_into_destination_thread() {
        let (store, dispatcher) = seeded();
        let targets = store.get_posts("b", &[2], true).await.unwrap();
        let mut context = ctx(
            targets,
            ActionRequest {
                checkedposts: vec![2],
                move_posts: true,
                move_to_thread: Some(3),
                ..Default::default()
            },
            vec![ActionName::Move],
            manager(),
        );
        context.destination_thread = Some(post("b", 3, None));
        dispatcher.execute(context).await.unwrap();

        let moved = store
            .board_posts("b")
            .into_iter()
            .find(|p| p.post_id == 2)
            .unwrap();
        assert_eq!(moved.thread, Some(3));
    }

    #[tokio::test]
    async fn staff_actions_land_in_the_modlog() {
        let (store, dispatcher) = seeded();
        let targets = store.get_posts("b", &[3], true).await.unwrap();
        dispatcher
            .execute(ctx(
                targets,
                ActionRequest {
                    checkedposts: vec![3],
                    delete: true,
                    log_message: Some("cleanup".into()),
                    ..Default::default()
                },
                vec![ActionName::Delete],
                manager(),
            ))
            .await
            .unwrap();
        let entries = store.modlog("b");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message.as_deref(), Some("cleanup"));
        assert_eq!(entries[0].actions, vec!["delete"]);
    }
}
