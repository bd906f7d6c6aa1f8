//! The diagram service: generate, read, update, and export stored diagrams.
//!
//! Writes are serialized per diagram id. Two updates to the same diagram
//! never interleave, and the later one replaces whole collections written
//! by the earlier one. Nothing is merged. A per-id lock lives only while
//! some write on that id holds it.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use chrono::Utc;
use log::{debug, error, info, warn};
use serde_json::Value;

use blockdraft_core::model::{Diagram, DiagramId, DiagramUpdate};

use crate::{
    config::AppConfig,
    error::BlockdraftError,
    export::{self, ExportArtifact, ExportFormat},
    generator::DiagramGenerator,
    provider,
    reconciler::{ModelReplace, ModelSink, Reconciler},
    store::{DiagramStore, StoreError},
};

/// Stored-diagram operations over a [`DiagramStore`].
pub struct DiagramService {
    config: AppConfig,
    generator: DiagramGenerator,
    store: Arc<dyn DiagramStore>,
    locks: Mutex<HashMap<DiagramId, Arc<Mutex<()>>>>,
}

impl DiagramService {
    /// Creates a service whose generator consults the configured provider,
    /// if its API key is available.
    pub fn new(config: AppConfig, store: Arc<dyn DiagramStore>) -> Self {
        let mut generator = DiagramGenerator::new(config.layout().clone());
        if let Some(provider) = provider::from_config(config.provider()) {
            generator = generator.with_provider(provider);
        }
        info!(provider = generator.provider_id().unwrap_or("none"); "Diagram service ready");
        Self {
            config,
            generator,
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the generator.
    pub fn with_generator(mut self, generator: DiagramGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Generates and stores a diagram.
    ///
    /// # Errors
    ///
    /// Returns [`BlockdraftError::InputValidation`] when `description` is
    /// empty or whitespace, and [`BlockdraftError::Persistence`] when the
    /// diagram cannot be stored.
    pub fn generate(&self, description: &str) -> Result<Diagram, BlockdraftError> {
        self.generate_titled(description, None)
    }

    /// Like [`generate`](Self::generate), with an explicit title.
    pub fn generate_titled(
        &self,
        description: &str,
        title: Option<&str>,
    ) -> Result<Diagram, BlockdraftError> {
        if description.trim().is_empty() {
            return Err(BlockdraftError::InputValidation(
                "description must not be empty".to_string(),
            ));
        }

        let mut diagram = self.generator.generate(description);
        if let Some(title) = title.filter(|title| !title.trim().is_empty()) {
            diagram.set_title(title);
        }
        diagram.validate().map_err(|err| {
            error!(description, err:%; "Generated diagram failed validation");
            BlockdraftError::rejected_save(err)
        })?;
        self.store.insert(&diagram).map_err(|err| {
            error!(diagram_id:% = diagram.id(), err:%; "Failed to store generated diagram");
            BlockdraftError::Persistence(err)
        })?;

        info!(diagram_id:% = diagram.id(), title = diagram.title(); "Diagram stored");
        Ok(diagram)
    }

    /// Fetches a diagram.
    ///
    /// # Errors
    ///
    /// Returns [`BlockdraftError::NotFound`] for an unknown id.
    pub fn get(&self, id: DiagramId) -> Result<Diagram, BlockdraftError> {
        self.store.get(id)?.ok_or(BlockdraftError::NotFound(id))
    }

    /// Every stored diagram, newest first.
    pub fn list(&self) -> Result<Vec<Diagram>, BlockdraftError> {
        Ok(self.store.list()?)
    }

    /// Deletes a diagram.
    ///
    /// # Errors
    ///
    /// Returns [`BlockdraftError::NotFound`] for an unknown id.
    pub fn delete(&self, id: DiagramId) -> Result<(), BlockdraftError> {
        self.serialized(id, || {
            if !self.store.delete(id)? {
                return Err(BlockdraftError::NotFound(id));
            }
            info!(diagram_id:% = id; "Diagram deleted");
            Ok(())
        })
    }

    /// Applies an untrusted JSON update payload.
    ///
    /// Malformed collection entries are dropped, and a non-array collection
    /// leaves the stored one untouched.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn update(&self, id: DiagramId, payload: &Value) -> Result<Diagram, BlockdraftError> {
        self.apply(id, &DiagramUpdate::from_value(payload))
    }

    /// Applies a typed update, validates it, and saves it.
    ///
    /// # Errors
    ///
    /// Returns [`BlockdraftError::NotFound`] for an unknown id, and
    /// [`BlockdraftError::Persistence`] when the updated diagram fails
    /// validation or cannot be saved. The stored diagram is unchanged then.
    pub fn apply(&self, id: DiagramId, update: &DiagramUpdate) -> Result<Diagram, BlockdraftError> {
        self.mutate(id, |diagram| {
            diagram.apply_update(update).map_err(|err| {
                error!(diagram_id:% = id, err:%; "Update rejected by validation");
                BlockdraftError::rejected_save(err)
            })
        })
    }

    /// Binds every section-level connection of a stored diagram to blocks.
    ///
    /// Returns the saved diagram and the number of connections rebound.
    ///
    /// # Errors
    ///
    /// Same as [`apply`](Self::apply).
    pub fn rebase_connections(&self, id: DiagramId) -> Result<(Diagram, usize), BlockdraftError> {
        let mut rebound = 0;
        let diagram = self.mutate(id, |diagram| {
            rebound = diagram.rebase_connections();
            diagram.validate().map_err(BlockdraftError::rejected_save)
        })?;
        Ok((diagram, rebound))
    }

    /// Exports a stored diagram.
    ///
    /// # Errors
    ///
    /// Returns [`BlockdraftError::NotFound`] for an unknown id, and
    /// [`BlockdraftError::Export`] when the exporter fails.
    pub fn export(
        &self,
        id: DiagramId,
        format: ExportFormat,
    ) -> Result<ExportArtifact, BlockdraftError> {
        let diagram = self.get(id)?;
        let artifact = export::export(&diagram, format, &self.config)?;
        info!(
            diagram_id:% = id,
            format:% = format,
            bytes = artifact.bytes().len();
            "Diagram exported"
        );
        Ok(artifact)
    }

    /// Opens an editing session on a stored diagram. Every committed canvas
    /// change is written back through a [`ServiceSink`]; the returned
    /// [`FailedSaves`] counts the ones the store refused.
    ///
    /// # Errors
    ///
    /// Returns [`BlockdraftError::NotFound`] for an unknown id.
    pub fn open_canvas(
        self: &Arc<Self>,
        id: DiagramId,
    ) -> Result<(Reconciler, FailedSaves), BlockdraftError> {
        let diagram = self.get(id)?;
        let sink = ServiceSink::new(Arc::clone(self), id);
        let failures = sink.failed_saves();
        let mut reconciler =
            Reconciler::new(self.config.layout().clone()).with_sink(Box::new(sink));
        reconciler.render(&diagram);
        Ok((reconciler, failures))
    }

    fn mutate<F>(&self, id: DiagramId, change: F) -> Result<Diagram, BlockdraftError>
    where
        F: FnOnce(&mut Diagram) -> Result<(), BlockdraftError>,
    {
        self.serialized(id, || {
            let mut diagram = self.get(id)?;
            change(&mut diagram)?;
            diagram.touch(Utc::now());

            self.store.save(&diagram).map_err(|err| {
                error!(diagram_id:% = id, err:%; "Failed to save diagram");
                BlockdraftError::Persistence(err)
            })?;
            debug!(diagram_id:% = id; "Diagram saved");
            Ok(diagram)
        })
    }

    /// Runs `write` while holding the lock for `id`.
    fn serialized<T, F>(&self, id: DiagramId, write: F) -> Result<T, BlockdraftError>
    where
        F: FnOnce() -> Result<T, BlockdraftError>,
    {
        let lock = self.lock_for(id)?;
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            write()
        };
        self.release(id, lock);
        result
    }

    fn lock_for(&self, id: DiagramId) -> Result<Arc<Mutex<()>>, BlockdraftError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| StoreError::Unavailable("diagram lock table poisoned".to_string()))?;
        Ok(Arc::clone(locks.entry(id).or_default()))
    }

    /// Drops the table entry once no other writer holds or waits on it.
    fn release(&self, id: DiagramId, lock: Arc<Mutex<()>>) {
        drop(lock);
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks.get(&id).is_some_and(|held| Arc::strong_count(held) == 1) {
            locks.remove(&id);
        }
    }
}

/// Shared count of canvas commits a [`ServiceSink`] failed to persist.
#[derive(Debug, Clone, Default)]
pub struct FailedSaves(Arc<AtomicUsize>);

impl FailedSaves {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Forwards canvas commits to [`DiagramService::apply`].
///
/// Submission is fire-and-forget: failures are logged and counted in
/// [`FailedSaves`], and the canvas keeps its state.
pub struct ServiceSink {
    service: Arc<DiagramService>,
    id: DiagramId,
    failures: FailedSaves,
}

impl ServiceSink {
    pub fn new(service: Arc<DiagramService>, id: DiagramId) -> Self {
        Self {
            service,
            id,
            failures: FailedSaves::default(),
        }
    }

    pub fn failed_saves(&self) -> FailedSaves {
        self.failures.clone()
    }
}

impl ModelSink for ServiceSink {
    fn submit(&mut self, replace: &ModelReplace) {
        if let Err(err) = self.service.apply(self.id, &replace.clone().into()) {
            self.failures.record();
            warn!(
                diagram_id:% = self.id,
                failed = self.failures.count(),
                err:%;
                "Canvas change was not persisted"
            );
        }
    }
}
