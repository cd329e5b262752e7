//! ironchan/crates/api-adapters/src/middleware.rs
//!
//! Request middleware. Session handling proper lives outside this crate; the
//! actor middleware only guarantees every request carries an
//! [`ActorContext`], building an anonymous one from the connection when the
//! session layer put nothing there.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use domains::actions::ActorContext;
use domains::models::{IpKind, ReporterIp};
use services::hashing::cloak_ip;

use crate::handlers::AppState;

fn client_ip(req: &Request) -> String {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "127.0.0.1".to_string())
}

/// Attach an anonymous [`ActorContext`] unless one is already present.
pub async fn attach_actor(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    if req.extensions().get::<ActorContext>().is_none() {
        let raw = client_ip(&req);
        let kind = if raw.contains(':') {
            IpKind::Ipv6
        } else {
            IpKind::Ipv4
        };
        let actor = ActorContext::anonymous(ReporterIp {
            cloak: cloak_ip(&state.ip_hash_secret, &raw),
            raw,
            kind,
        });
        req.extensions_mut().insert(actor);
    }
    next.run(req).await
}
