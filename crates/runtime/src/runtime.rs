//! High-level runtime orchestrator.
//!
//! The runtime owns the shared engine and the background flush worker, and
//! exposes a builder-based API for wiring in content tables and capabilities.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use cast_core::{
    CastConfig, CombatFormulas, DrainResolver, Pathfinding, RandomSource, ResourceGate,
};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::clock::SessionClock;
use crate::engine::{Capabilities, Engine, FlushReport};
use crate::events::{BusNotifier, Event, EventBus, Topic};
use crate::oracle::OracleManager;
use crate::repository::{CooldownRepository, FileCooldownRepository};
use crate::scheduler::Scheduler;
use crate::workers::FlushWorker;

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub cast: CastConfig,
    pub event_buffer_size: usize,
    /// Directory for persisted cooldowns. `None` keeps cooldowns in memory only,
    /// unless a repository is injected through the builder.
    pub save_dir: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Platform data directory, falling back to `./save_data`.
    pub fn default_save_dir() -> PathBuf {
        directories::ProjectDirs::from("", "", "cast-shard")
            .map(|dirs| dirs.data_dir().join("cooldowns"))
            .unwrap_or_else(|| PathBuf::from("./save_data"))
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            cast: CastConfig::default(),
            event_buffer_size: 100,
            save_dir: None,
        }
    }
}

/// Main runtime that owns the engine and its background work.
///
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    engine: Arc<Engine>,
    shutdown: CancellationToken,
    flush_worker_handle: Option<JoinHandle<()>>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Saves every online player's cooldowns now.
    pub fn flush_cooldowns(&self) -> FlushReport {
        self.engine.flush_cooldowns()
    }

    /// Shutdown the runtime gracefully
    ///
    /// Stops the flush worker, terminates every companion and writes the
    /// final cooldown state. Every player is attempted even when some saves
    /// fail; the failures are reported afterwards.
    pub async fn shutdown(self) -> Result<()> {
        self.shutdown.cancel();
        if let Some(worker) = self.flush_worker_handle {
            worker.await.map_err(RuntimeError::WorkerJoin)?;
        }
        let terminated = self.engine.terminate_every_companion();
        let report = self.engine.flush_cooldowns();
        info!(terminated, saved = report.saved, "runtime stopped");
        if !report.is_complete() {
            return Err(RuntimeError::FlushIncomplete {
                failed: report.failed,
            });
        }
        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    oracles: Option<OracleManager>,
    capabilities: Capabilities,
    repository: Option<Arc<dyn CooldownRepository>>,
    clock: Option<SessionClock>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            oracles: None,
            capabilities: Capabilities::default(),
            repository: None,
            clock: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set required oracle manager
    pub fn oracles(mut self, oracles: OracleManager) -> Self {
        self.oracles = Some(oracles);
        self
    }

    pub fn formulas(mut self, formulas: impl CombatFormulas + 'static) -> Self {
        self.capabilities.formulas = Arc::new(formulas);
        self
    }

    pub fn drain(mut self, drain: impl DrainResolver + 'static) -> Self {
        self.capabilities.drain = Arc::new(drain);
        self
    }

    pub fn pathfinding(mut self, pathfinding: impl Pathfinding + 'static) -> Self {
        self.capabilities.pathfinding = Arc::new(pathfinding);
        self
    }

    pub fn resources(mut self, resources: impl ResourceGate + 'static) -> Self {
        self.capabilities.resources = Arc::new(resources);
        self
    }

    pub fn rng(mut self, rng: impl RandomSource + 'static) -> Self {
        self.capabilities.rng = Arc::new(rng);
        self
    }

    /// Use a specific cooldown repository instead of the configured save directory.
    pub fn repository(mut self, repository: Arc<dyn CooldownRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Pin the wall clock, mostly for tests.
    pub fn clock(mut self, clock: SessionClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the runtime
    ///
    /// Must run inside a tokio runtime; timers and the flush worker are
    /// spawned onto it.
    pub async fn build(self) -> Result<Runtime> {
        let oracles = self.oracles.ok_or(RuntimeError::MissingOracles)?;

        let repository = match (self.repository, &self.config.save_dir) {
            (Some(repository), _) => Some(repository),
            (None, Some(dir)) => {
                Some(Arc::new(FileCooldownRepository::new(dir)?) as Arc<dyn CooldownRepository>)
            }
            (None, None) => None,
        };

        let event_bus = Arc::new(EventBus::with_capacity(self.config.event_buffer_size));
        let notifier = Arc::new(BusNotifier::new(Arc::clone(&event_bus)));
        let flush_interval = Duration::from_millis(self.config.cast.cooldown_flush_interval_ms);

        let engine = Arc::new(Engine::new(
            Scheduler::current(),
            self.clock.unwrap_or_else(SessionClock::start),
            oracles,
            self.capabilities,
            notifier,
            self.config.cast,
            repository,
        ));

        let shutdown = CancellationToken::new();
        let flush_worker_handle = engine.repository.is_some().then(|| {
            let worker = FlushWorker::new(Arc::clone(&engine), flush_interval, shutdown.clone());
            tokio::spawn(async move {
                worker.run().await;
            })
        });

        let handle = RuntimeHandle::new(Arc::clone(&engine), event_bus);
        info!(
            persistent = flush_worker_handle.is_some(),
            "runtime started"
        );

        Ok(Runtime {
            handle,
            engine,
            shutdown,
            flush_worker_handle,
        })
    }
}
