//! Runtime for real-time skill casting, cooldowns and companion agents.
//!
//! This crate wires the pure rules of `cast-core` to a shared, lock-guarded
//! world, a tokio-backed scheduler, an event bus and cooldown persistence.
//! Consumers embed [`Runtime`] and drive it through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`engine`] runs the cast state machine, cooldown registry and companion agents
//! - [`world`] keeps actors behind per-actor locks
//! - [`scheduler`] and [`clock`] provide cancellable timers and wall-clock time
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`workers`] keeps background tasks internal to the crate
//! - [`oracle`], [`capability`] and [`repository`] adapt content, rules and storage for the engine
pub mod api;
pub mod capability;
pub mod clock;
pub mod engine;
pub mod events;
pub mod oracle;
pub mod repository;
pub mod runtime;
pub mod scheduler;
pub mod world;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use capability::{OpenField, StandardDrain, StandardFormulas, ThreadRandom};
pub use clock::SessionClock;
pub use engine::{Capabilities, CompanionAgent, Engine, FlushReport};
pub use events::{BusNotifier, Event, EventBus, Topic};
pub use oracle::{CompanionOracleImpl, OracleManager, SkillOracleImpl};
pub use repository::{
    CooldownRepository, FileCooldownRepository, InMemoryCooldownRepo, RepositoryError,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use scheduler::{Scheduler, TaskHandle};
pub use workers::{CastMetrics, CastMetricsSnapshot};
pub use world::{Actor, CastPhase, World};
