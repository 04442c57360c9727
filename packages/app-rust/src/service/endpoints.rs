//! Terminal steps run after the pipeline's handlers.
//!
//! Endpoints read their input from the context payload and replace it with a
//! [`Reply`]. They never call `next`.

use std::any::{type_name, Any};
use std::sync::Arc;

use async_trait::async_trait;
use fleetline_core::{Entity, PageRequest, ValidationResult};
use tracing::debug;

use super::operation::CrudOp;
use crate::ai::{build_analysis_prompt, AiClient, AiError, FleetSummary};
use crate::pipeline::{Context, Handler, HandlerError, HandlerResult, Next};
use crate::storage::{FleetStore, Repository};

/// Output written by an endpoint. Distinguishes a result from an input left
/// in place by a run that never reached the endpoint.
#[derive(Debug)]
pub struct Reply<T>(pub T);

fn take_input<T: Any>(ctx: &mut Context) -> Result<T, HandlerError> {
    ctx.take_payload::<T>().ok_or_else(|| HandlerError::Payload {
        request_kind: ctx.request_kind().to_string(),
        expected: type_name::<T>(),
    })
}

fn ensure_valid<E: Entity>(entity: &E) -> HandlerResult {
    match entity.validate() {
        ValidationResult::Valid => Ok(()),
        ValidationResult::Invalid { errors } => Err(HandlerError::Validation { errors }),
    }
}

// ---------------------------------------------------------------------------
// CrudEndpoint
// ---------------------------------------------------------------------------

/// Runs one CRUD operation against a repository.
///
/// | op     | input payload | reply               |
/// |--------|---------------|---------------------|
/// | create | `E`           | `E` with its new id |
/// | read   | `u64`         | `Option<E>`         |
/// | list   | `PageRequest` | `Page<E>`           |
/// | update | `E`           | `E`                 |
/// | delete | `u64`         | `()`                |
/// | count  | none          | `u64`               |
pub struct CrudEndpoint<E: Entity> {
    repo: Arc<dyn Repository<E>>,
    op: CrudOp,
}

impl<E: Entity> CrudEndpoint<E> {
    #[must_use]
    pub fn new(repo: Arc<dyn Repository<E>>, op: CrudOp) -> Self {
        Self { repo, op }
    }
}

#[async_trait]
impl<E: Entity> Handler for CrudEndpoint<E> {
    fn name(&self) -> &'static str {
        self.op.verb()
    }

    async fn handle(&self, ctx: &mut Context, _next: Next<'_>) -> HandlerResult {
        match self.op {
            CrudOp::Create => {
                let entity: E = take_input(ctx)?;
                ensure_valid(&entity)?;
                let created = self.repo.create(entity).await?;
                debug!(kind = %E::KIND, id = created.id(), "created");
                ctx.set_payload(Reply(created));
            }
            CrudOp::Read => {
                let id: u64 = take_input(ctx)?;
                let found = self.repo.read(id).await?;
                ctx.set_payload(Reply(found));
            }
            CrudOp::List => {
                let request: PageRequest = take_input(ctx)?;
                let page = self.repo.read_page(request).await?;
                ctx.set_payload(Reply(page));
            }
            CrudOp::Update => {
                let entity: E = take_input(ctx)?;
                ensure_valid(&entity)?;
                let updated = self.repo.update(entity).await?;
                debug!(kind = %E::KIND, id = updated.id(), "updated");
                ctx.set_payload(Reply(updated));
            }
            CrudOp::Delete => {
                let id: u64 = take_input(ctx)?;
                self.repo.delete(id).await?;
                debug!(kind = %E::KIND, id, "deleted");
                ctx.set_payload(Reply(()));
            }
            CrudOp::Count => {
                let count = self.repo.count().await?;
                ctx.set_payload(Reply(count));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AnalyzeEndpoint
// ---------------------------------------------------------------------------

/// Answers a question about the fleet with the configured AI client.
/// Input: the question as a `String`. Reply: the generated text.
pub struct AnalyzeEndpoint {
    store: FleetStore,
    ai: Option<Arc<dyn AiClient>>,
}

impl AnalyzeEndpoint {
    #[must_use]
    pub fn new(store: FleetStore, ai: Option<Arc<dyn AiClient>>) -> Self {
        Self { store, ai }
    }
}

#[async_trait]
impl Handler for AnalyzeEndpoint {
    fn name(&self) -> &'static str {
        "analyze"
    }

    async fn handle(&self, ctx: &mut Context, _next: Next<'_>) -> HandlerResult {
        let question: String = take_input(ctx)?;
        let ai = self.ai.as_ref().ok_or(AiError::NotConfigured)?;

        let summary = FleetSummary::collect(&self.store).await?;
        let prompt = build_analysis_prompt(&summary, &question);
        let answer = ai.send_prompt(&prompt).await?;
        ctx.set_payload(Reply(answer));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use fleetline_core::{Page, Route};

    use super::*;
    use crate::pipeline::Pipeline;
    use crate::storage::StoreError;

    fn endpoint(store: &FleetStore, op: CrudOp) -> CrudEndpoint<Route> {
        CrudEndpoint::new(Arc::clone(store.routes()), op)
    }

    async fn run(store: &FleetStore, op: CrudOp, ctx: &mut Context) -> HandlerResult {
        Pipeline::new().execute_with(ctx, &endpoint(store, op)).await
    }

    fn route() -> Route {
        Route::new("North loop", "Depot A", "Harbour", 42.5, 55)
    }

    #[tokio::test]
    async fn create_then_read() {
        let store = FleetStore::in_memory();
        let mut ctx = Context::new("route.create").with_payload(route());
        run(&store, CrudOp::Create, &mut ctx).await.unwrap();
        let Reply(created) = ctx.take_payload::<Reply<Route>>().unwrap();
        assert_eq!(created.id, 1);

        let mut ctx = Context::new("route.read").with_payload(1_u64);
        run(&store, CrudOp::Read, &mut ctx).await.unwrap();
        let Reply(found) = ctx.take_payload::<Reply<Option<Route>>>().unwrap();
        assert_eq!(found.unwrap().name, "North loop");
    }

    #[tokio::test]
    async fn invalid_entity_is_not_stored() {
        let store = FleetStore::in_memory();
        let mut bad = route();
        bad.distance_km = 0.0;
        let mut ctx = Context::new("route.create").with_payload(bad);

        let err = run(&store, CrudOp::Create, &mut ctx).await.unwrap_err();
        assert!(matches!(err, HandlerError::Validation { ref errors } if errors.len() == 1));
        assert_eq!(store.routes().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn wrong_payload_type_is_reported() {
        let store = FleetStore::in_memory();
        let mut ctx = Context::new("route.read").with_payload("one".to_string());
        let err = run(&store, CrudOp::Read, &mut ctx).await.unwrap_err();
        match err {
            HandlerError::Payload {
                request_kind,
                expected,
            } => {
                assert_eq!(request_kind, "route.read");
                assert_eq!(expected, "u64");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn list_count_delete() {
        let store = FleetStore::in_memory();
        for _ in 0..3 {
            store.routes().create(route()).await.unwrap();
        }

        let mut ctx = Context::new("route.list").with_payload(PageRequest::new(1, 2));
        run(&store, CrudOp::List, &mut ctx).await.unwrap();
        let Reply(page) = ctx.take_payload::<Reply<Page<Route>>>().unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 3);

        let mut ctx = Context::new("route.delete").with_payload(2_u64);
        run(&store, CrudOp::Delete, &mut ctx).await.unwrap();

        let mut ctx = Context::new("route.count");
        run(&store, CrudOp::Count, &mut ctx).await.unwrap();
        assert_eq!(ctx.take_payload::<Reply<u64>>().unwrap().0, 2);

        let mut ctx = Context::new("route.delete").with_payload(2_u64);
        let err = run(&store, CrudOp::Delete, &mut ctx).await.unwrap_err();
        assert!(matches!(err, HandlerError::Store(StoreError::NotFound { id: 2, .. })));
    }

    struct EchoAi;

    #[async_trait]
    impl AiClient for EchoAi {
        async fn send_prompt(&self, prompt: &str) -> Result<String, AiError> {
            Ok(prompt.lines().last().unwrap_or_default().to_string())
        }
    }

    #[tokio::test]
    async fn analyze_sends_summary_prompt() {
        let store = FleetStore::in_memory();
        let endpoint = AnalyzeEndpoint::new(store, Some(Arc::new(EchoAi)));
        let mut ctx = Context::new("ai.analyze").with_payload("Any idle trucks?".to_string());
        Pipeline::new().execute_with(&mut ctx, &endpoint).await.unwrap();
        assert_eq!(
            ctx.take_payload::<Reply<String>>().unwrap().0,
            "Question: Any idle trucks?"
        );
    }

    #[tokio::test]
    async fn analyze_without_client_fails() {
        let endpoint = AnalyzeEndpoint::new(FleetStore::in_memory(), None);
        let mut ctx = Context::new("ai.analyze").with_payload("?".to_string());
        let err = Pipeline::new()
            .execute_with(&mut ctx, &endpoint)
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Ai(AiError::NotConfigured)));
    }
}
