//! Sign-in gate.

use std::sync::Arc;

use async_trait::async_trait;

use crate::identity::IdentitySource;
use crate::notify::{Notice, Notifier};
use crate::pipeline::{Context, Handler, HandlerResult, Next};

/// Lets a run continue only when someone is signed in.
///
/// Without a principal the run is marked handled, the user is told that
/// sign-in is required, and `next` is never called. A denial is not a fault.
pub struct AuthHandler {
    identity: Arc<dyn IdentitySource>,
    notifier: Arc<dyn Notifier>,
}

impl AuthHandler {
    #[must_use]
    pub fn new(identity: Arc<dyn IdentitySource>, notifier: Arc<dyn Notifier>) -> Self {
        Self { identity, notifier }
    }
}

#[async_trait]
impl Handler for AuthHandler {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn handle(&self, ctx: &mut Context, next: Next<'_>) -> HandlerResult {
        if self.identity.current().is_some() {
            return next.run(ctx).await;
        }

        tracing::warn!(
            kind = %ctx.request_kind(),
            run_id = %ctx.run_id(),
            "denied: no signed-in user"
        );
        ctx.mark_handled();
        self.notifier
            .notify(Notice::warning(
                "Sign-in required",
                format!("{} requires a signed-in user", ctx.request_kind()),
            ))
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use fleetline_core::Principal;

    use super::*;
    use crate::identity::SessionIdentity;
    use crate::notify::MemoryNotifier;
    use crate::pipeline::Pipeline;

    fn pipeline(identity: Arc<SessionIdentity>, notifier: Arc<MemoryNotifier>) -> Pipeline {
        let mut pipeline = Pipeline::new();
        pipeline
            .push(AuthHandler::new(identity, notifier))
            .push_fn("inner", |ctx, next| {
                Box::pin(async move {
                    ctx.set_payload(true);
                    next.run(ctx).await
                })
            });
        pipeline
    }

    #[tokio::test]
    async fn anonymous_run_is_denied() {
        let notifier = Arc::new(MemoryNotifier::new());
        let pipeline = pipeline(Arc::new(SessionIdentity::anonymous()), notifier.clone());

        let mut ctx = Context::new("vehicle.delete");
        pipeline.execute(&mut ctx).await.unwrap();

        assert!(ctx.is_handled());
        assert!(!ctx.has_payload());
        assert!(ctx.failure().is_none());
        let notices = notifier.drain();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "vehicle.delete requires a signed-in user");
    }

    #[tokio::test]
    async fn signed_in_run_continues_without_side_effects() {
        let notifier = Arc::new(MemoryNotifier::new());
        let identity = Arc::new(SessionIdentity::signed_in(Principal::new("dana")));
        let pipeline = pipeline(identity, notifier.clone());

        let mut ctx = Context::new("vehicle.delete");
        pipeline.execute(&mut ctx).await.unwrap();

        assert!(!ctx.is_handled());
        assert_eq!(ctx.payload::<bool>(), Some(&true));
        assert!(notifier.is_empty());
    }

    #[tokio::test]
    async fn identity_is_checked_per_run() {
        let notifier = Arc::new(MemoryNotifier::new());
        let identity = Arc::new(SessionIdentity::anonymous());
        let pipeline = pipeline(identity.clone(), notifier);

        let mut denied = Context::new("route.list");
        pipeline.execute(&mut denied).await.unwrap();
        assert!(denied.is_handled());

        identity.sign_in(Principal::new("dana"));
        let mut allowed = Context::new("route.list");
        pipeline.execute(&mut allowed).await.unwrap();
        assert!(!allowed.is_handled());
    }
}
