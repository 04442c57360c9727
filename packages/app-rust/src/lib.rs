//! Fleetline application core: the handler pipeline every user action runs
//! through, the fleet store, AI-assisted analytics, and their wiring.

pub mod ai;
pub mod config;
pub mod identity;
pub mod notify;
pub mod pipeline;
pub mod service;
pub mod storage;
pub mod telemetry;

pub use config::AppConfig;
pub use identity::{IdentitySource, SessionIdentity};
pub use notify::{LogNotifier, MemoryNotifier, Notice, NoticeLevel, Notifier};
pub use pipeline::{Context, Handler, HandlerError, Next, Pipeline, PipelineBuilder};
pub use service::{FleetService, Outcome};
pub use storage::{FleetStore, Repository, StoreError};
