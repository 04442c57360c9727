//! Entry point the shell calls for every user action.

use std::any::Any;
use std::sync::Arc;

use fleetline_core::{Page, PageRequest};
use tokio_util::sync::CancellationToken;

use super::endpoints::{AnalyzeEndpoint, CrudEndpoint, Reply};
use super::operation::{request_kind, CrudOp, Outcome, AI_ANALYZE};
use crate::ai::{AiClient, ChatCompletionClient};
use crate::config::{AppConfig, PagingConfig};
use crate::identity::IdentitySource;
use crate::notify::Notifier;
use crate::pipeline::{build_fleet_pipeline, Context, Handler, HandlerError, Pipeline};
use crate::storage::{FleetEntity, FleetStore, StoreHealth};

/// Runs fleet operations through a shared pipeline.
///
/// Each call builds a fresh [`Context`] named `<entity>.<verb>`, puts its
/// input in the payload, and executes the pipeline with the matching
/// endpoint as the innermost step.
///
/// Every method returns `Err` only for a fault that escaped the pipeline;
/// faults caught by a failure boundary come back as [`Outcome::Failed`].
#[derive(Clone)]
pub struct FleetService {
    pipeline: Arc<Pipeline>,
    store: FleetStore,
    ai: Option<Arc<dyn AiClient>>,
    paging: PagingConfig,
}

impl FleetService {
    #[must_use]
    pub fn new(pipeline: Arc<Pipeline>, store: FleetStore, paging: PagingConfig) -> Self {
        Self {
            pipeline,
            store,
            ai: None,
            paging,
        }
    }

    /// Wires the standard pipeline and, when configured, the AI client.
    ///
    /// # Errors
    ///
    /// Returns an error if the AI HTTP client cannot be built.
    pub fn from_config(
        config: &AppConfig,
        store: FleetStore,
        identity: Arc<dyn IdentitySource>,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        let pipeline = build_fleet_pipeline(&config.pipeline, identity, notifier);
        let mut service = Self::new(Arc::new(pipeline), store, config.paging.clone());
        if let Some(ai) = &config.ai {
            service = service.with_ai(Arc::new(ChatCompletionClient::new(ai.clone())?));
        }
        Ok(service)
    }

    #[must_use]
    pub fn with_ai(mut self, client: Arc<dyn AiClient>) -> Self {
        self.ai = Some(client);
        self
    }

    #[must_use]
    pub fn store(&self) -> &FleetStore {
        &self.store
    }

    #[must_use]
    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// # Errors
    ///
    /// Returns a fault that escaped the pipeline.
    pub async fn create<E: FleetEntity>(&self, entity: E) -> Result<Outcome<E>, HandlerError> {
        self.crud::<E, E, E>(CrudOp::Create, Some(entity)).await
    }

    /// `Completed(None)` when no entity has `id`.
    ///
    /// # Errors
    ///
    /// Returns a fault that escaped the pipeline.
    pub async fn read<E: FleetEntity>(&self, id: u64) -> Result<Outcome<Option<E>>, HandlerError> {
        self.crud::<E, Option<E>, u64>(CrudOp::Read, Some(id)).await
    }

    /// Lists page `page` (1-based). `size` defaults to the configured page
    /// size and is capped at the configured maximum.
    ///
    /// # Errors
    ///
    /// Returns a fault that escaped the pipeline.
    pub async fn list<E: FleetEntity>(
        &self,
        page: u32,
        size: Option<u32>,
    ) -> Result<Outcome<Page<E>>, HandlerError> {
        let request = PageRequest::new(page, size.unwrap_or(self.paging.default_page_size))
            .clamped(self.paging.max_page_size);
        self.crud::<E, Page<E>, PageRequest>(CrudOp::List, Some(request)).await
    }

    /// # Errors
    ///
    /// Returns a fault that escaped the pipeline.
    pub async fn update<E: FleetEntity>(&self, entity: E) -> Result<Outcome<E>, HandlerError> {
        self.crud::<E, E, E>(CrudOp::Update, Some(entity)).await
    }

    /// # Errors
    ///
    /// Returns a fault that escaped the pipeline.
    pub async fn delete<E: FleetEntity>(&self, id: u64) -> Result<Outcome<()>, HandlerError> {
        self.crud::<E, (), u64>(CrudOp::Delete, Some(id)).await
    }

    /// # Errors
    ///
    /// Returns a fault that escaped the pipeline.
    pub async fn count<E: FleetEntity>(&self) -> Result<Outcome<u64>, HandlerError> {
        self.crud::<E, u64, ()>(CrudOp::Count, None).await
    }

    /// Asks the AI client a question about the current fleet.
    ///
    /// # Errors
    ///
    /// Returns a fault that escaped the pipeline.
    pub async fn analyze(&self, question: &str) -> Result<Outcome<String>, HandlerError> {
        self.analyze_inner(question, None).await
    }

    /// Like [`analyze`](Self::analyze), but stops when `token` is cancelled.
    ///
    /// # Errors
    ///
    /// Returns a fault that escaped the pipeline.
    pub async fn analyze_cancellable(
        &self,
        question: &str,
        token: CancellationToken,
    ) -> Result<Outcome<String>, HandlerError> {
        self.analyze_inner(question, Some(token)).await
    }

    /// Store health, checked directly rather than through the pipeline.
    pub async fn health(&self) -> StoreHealth {
        self.store.health().await
    }

    async fn analyze_inner(
        &self,
        question: &str,
        token: Option<CancellationToken>,
    ) -> Result<Outcome<String>, HandlerError> {
        let mut ctx = Context::new(AI_ANALYZE).with_payload(question.to_string());
        if let Some(token) = token {
            ctx = ctx.with_cancellation(token);
        }
        let endpoint = AnalyzeEndpoint::new(self.store.clone(), self.ai.clone());
        self.run(ctx, &endpoint).await
    }

    async fn crud<E, T, I>(&self, op: CrudOp, input: Option<I>) -> Result<Outcome<T>, HandlerError>
    where
        E: FleetEntity,
        T: Any,
        I: Any + Send + Sync,
    {
        let mut ctx = Context::new(request_kind::<E>(op));
        if let Some(input) = input {
            ctx.set_payload(input);
        }
        let endpoint = CrudEndpoint::new(E::repository(&self.store), op);
        self.run(ctx, &endpoint).await
    }

    async fn run<T: Any>(
        &self,
        mut ctx: Context,
        endpoint: &dyn Handler,
    ) -> Result<Outcome<T>, HandlerError> {
        self.pipeline.execute_with(&mut ctx, endpoint).await?;

        if let Some(failure) = ctx.take_failure() {
            return Ok(Outcome::Failed(failure));
        }
        Ok(match ctx.take_payload::<Reply<T>>() {
            Some(Reply(value)) => Outcome::Completed(value),
            None => Outcome::ShortCircuited,
        })
    }
}

impl std::fmt::Debug for FleetService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FleetService")
            .field("pipeline", &self.pipeline)
            .field("ai", &self.ai.is_some())
            .field("paging", &self.paging)
            .finish_non_exhaustive()
    }
}
