// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The entity store facade
//!
//! [`EntityStore`] owns the registry of live entities, the snapshot that is
//! written to disk, and the save-cycle state. It is driven from a single
//! owning context: callers mutate entities through it and poll [`tick`]
//! from their main loop so timers fire and finished writes are collected.
//!
//! ```text
//! mutate ─► mark_dirty ─► prepare (capture) ─► execute (blocking pool)
//!                                                    │
//!        deferred deletes applied ◄── callback ◄─────┘
//! ```
//!
//! [`tick`]: EntityStore::tick

use crate::allocator::IdAllocator;
use crate::config::{SavePolicy, StoreConfig};
use crate::error::{LoadError, StoreError};
use crate::migration::{MigrationPipeline, VersionCheck};
use crate::snapshot::SaveData;
use crate::task::{Capture, SavePhase, SaveTask, WriteJob};
use crate::tracking::{Deletion, Tracking};
use crate::writer::{self, WriteError};
use keep_core::{Clock, Entity, EntityId, EntityRegistry, Section, SystemClock, KIND_KEY};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of the most recent successful load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// File the data came from; `None` when no file existed
    pub source: Option<PathBuf>,
    /// Whether the data was recovered from a leftover temp file
    pub from_temp: bool,
    pub stored_version: Option<u32>,
    pub loaded: usize,
    /// Entities that failed to restore; their stored data is kept verbatim
    pub failed: usize,
    pub migrated: usize,
    pub unrecognized_keys: usize,
    /// Copy of the original file taken before raw migrations changed it
    pub backup: Option<PathBuf>,
}

/// Point-in-time view of the store's bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatus {
    pub phase: SavePhase,
    pub dirty: usize,
    pub unsaved: usize,
    pub unsaved_deleted: usize,
    pub pending_delete: usize,
    pub save_requested: bool,
    pub saving_enabled: bool,
    pub consecutive_failures: u32,
    pub cycles_completed: u64,
    pub stored_entities: usize,
}

struct Source {
    path: PathBuf,
    text: String,
    from_temp: bool,
}

/// Persistent store for a registry of entities
pub struct EntityStore<R: EntityRegistry, C: Clock = SystemClock> {
    config: StoreConfig,
    registry: R,
    clock: C,
    migrations: MigrationPipeline,
    data: Arc<SaveData>,
    allocator: IdAllocator,
    tracking: Tracking,
    task: SaveTask,
    saving_enabled: bool,
    last_load: Option<LoadReport>,
}

impl<R: EntityRegistry> EntityStore<R, SystemClock> {
    pub fn new(config: StoreConfig, registry: R, migrations: MigrationPipeline) -> Self {
        Self::with_clock(config, registry, migrations, SystemClock)
    }

    /// Build a store from a TOML config file
    pub fn from_config_file(
        config_path: &Path,
        registry: R,
        migrations: MigrationPipeline,
    ) -> Result<Self, StoreError> {
        let config = StoreConfig::load(config_path)?;
        Ok(Self::new(config, registry, migrations))
    }
}

impl<R: EntityRegistry, C: Clock> EntityStore<R, C> {
    pub fn with_clock(
        config: StoreConfig,
        registry: R,
        migrations: MigrationPipeline,
        clock: C,
    ) -> Self {
        let data = Arc::new(SaveData::new(migrations.current_version()));
        let task = SaveTask::new(clock.now());
        Self {
            config,
            registry,
            clock,
            migrations,
            data,
            allocator: IdAllocator::new(),
            tracking: Tracking::new(),
            task,
            saving_enabled: true,
            last_load: None,
        }
    }

    /// Replace the allocator, e.g. to shrink the ID space
    pub fn with_allocator(mut self, allocator: IdAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Direct registry access; changes made here must be reported through
    /// [`mark_dirty`](Self::mark_dirty) and [`delete`](Self::delete)
    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    pub fn get(&self, id: EntityId) -> Option<&R::Entity> {
        self.registry.get(id)
    }

    /// The snapshot as last captured
    pub fn data(&self) -> &SaveData {
        &self.data
    }

    pub fn last_load_report(&self) -> Option<&LoadReport> {
        self.last_load.as_ref()
    }

    pub fn saving_enabled(&self) -> bool {
        self.saving_enabled
    }

    /// Re-enable saving after a failed load, once an operator has decided
    /// the in-memory state should overwrite the file
    pub fn enable_saving(&mut self) {
        if !self.saving_enabled {
            warn!(path = %self.config.path.display(), "saving re-enabled by operator");
        }
        self.saving_enabled = true;
    }

    pub fn status(&self) -> StoreStatus {
        StoreStatus {
            phase: self.task.phase(),
            dirty: self.tracking.dirty().len(),
            unsaved: self.tracking.unsaved().len(),
            unsaved_deleted: self.tracking.unsaved_deleted().len(),
            pending_delete: self.tracking.pending_delete().len(),
            save_requested: self.tracking.save_requested(),
            saving_enabled: self.saving_enabled,
            consecutive_failures: self.task.consecutive_failures(),
            cycles_completed: self.task.cycles_completed(),
            stored_entities: self.data.len(),
        }
    }

    pub fn tracking(&self) -> &Tracking {
        &self.tracking
    }

    pub fn phase(&self) -> SavePhase {
        self.task.phase()
    }

    /// Whether anything has not yet reached disk
    pub fn is_dirty(&self) -> bool {
        self.tracking.is_dirty(self.task.is_executing())
    }

    // -- ID lifecycle --

    /// Propose an ID with no surviving record anywhere
    ///
    /// The ID is not reserved until [`confirm_used`](Self::confirm_used).
    pub fn next_id(&self) -> Result<EntityId, StoreError> {
        self.allocator
            .next_id(|id| self.data.claims(id) || self.tracking.holds(id))
            .ok_or(StoreError::IdsExhausted)
    }

    pub fn confirm_used(&mut self, id: EntityId) {
        self.allocator.confirm_used(id);
    }

    /// Record that a loaded entity changed
    ///
    /// Does not schedule a save; call one of the `save*` methods for that.
    pub fn mark_dirty(&mut self, id: EntityId) {
        let loaded = self.registry.get(id).is_some();
        debug_assert!(loaded, "mark_dirty on unloaded entity {id}");
        if !loaded {
            warn!(%id, "mark_dirty on an entity that is not loaded, ignoring");
            return;
        }
        self.tracking.mark_dirty(id, self.task.is_executing());
    }

    /// Record that an entity was removed from the registry
    ///
    /// While a write is running the removal is deferred to its callback so
    /// the snapshot being written is never touched.
    pub fn delete(&mut self, id: EntityId) {
        match self.tracking.delete(id, self.task.is_executing()) {
            Deletion::Applied => {
                if self.data.contains(id) {
                    Arc::make_mut(&mut self.data).remove(id);
                }
            }
            Deletion::Deferred => debug!(%id, "deletion deferred until the running save completes"),
        }
    }

    /// Allocate an ID, build the entity and register it as dirty
    pub fn create(&mut self, build: impl FnOnce(EntityId) -> R::Entity) -> Result<EntityId, StoreError> {
        let id = self.next_id()?;
        let entity = build(id);
        debug_assert_eq!(entity.id(), id, "entity built with a foreign ID");
        self.registry.insert(entity);
        self.confirm_used(id);
        self.tracking.mark_dirty(id, self.task.is_executing());
        Ok(id)
    }

    /// Mutate a loaded entity and mark it dirty
    pub fn update<T>(&mut self, id: EntityId, f: impl FnOnce(&mut R::Entity) -> T) -> Option<T> {
        let out = f(self.registry.get_mut(id)?);
        self.tracking.mark_dirty(id, self.task.is_executing());
        Some(out)
    }

    /// Remove an entity from the registry and record the deletion
    pub fn remove(&mut self, id: EntityId) -> Option<R::Entity> {
        let entity = self.registry.remove(id)?;
        self.delete(id);
        Some(entity)
    }

    // -- Saving --

    /// Save according to the configured policy
    pub fn save(&mut self) {
        match self.config.save_policy {
            SavePolicy::Immediate => self.save_now(),
            SavePolicy::Deferred => self.save_delayed(),
        }
    }

    /// Start an asynchronous save cycle
    ///
    /// If one is already running, a follow-up cycle starts once it has
    /// completed. Must be called from within a Tokio runtime.
    pub fn save_now(&mut self) {
        if !self.check_saving("save_now") {
            return;
        }
        if self.task.is_executing() {
            self.tracking.request_save();
            self.task.request_rerun();
            return;
        }
        self.start_cycle();
    }

    /// Request a save after the configured delay
    ///
    /// Repeated requests coalesce into the first pending timer.
    pub fn save_delayed(&mut self) {
        if !self.check_saving("save_delayed") {
            return;
        }
        self.tracking.request_save();
        self.task.schedule_delayed(self.clock.now() + self.config.save_delay);
    }

    /// Save and return once the data is on disk
    ///
    /// A running cycle is completed first. The write itself runs on the
    /// blocking pool, so write retries do not stall the runtime. If the
    /// future is dropped early the cycle stays in flight and the next
    /// [`tick`](Self::tick) collects it. Intended for shutdown.
    pub async fn save_immediate(&mut self) -> Result<(), StoreError> {
        if !self.check_saving("save_immediate") {
            return Err(StoreError::SavingDisabled);
        }
        self.finish_in_flight(false).await;

        let capture = self.prepare();
        let job = self.write_job();
        self.task.launch(capture, job);
        match self.task.join().await {
            Some((capture, outcome)) => self.complete(capture, outcome).map_err(StoreError::from),
            None => Ok(()),
        }
    }

    /// Advance timers and collect finished writes
    ///
    /// Call regularly from the owning context.
    pub async fn tick(&mut self) {
        if self.task.is_finished() {
            self.finish_in_flight(true).await;
        }
        if !self.saving_enabled || self.task.is_executing() {
            return;
        }
        let now = self.clock.now();
        if self.task.timer_due(now) {
            self.start_cycle();
        } else if self.is_dirty() && self.task.autosave_due(now, self.config.autosave()) {
            debug!("autosave interval elapsed");
            self.start_cycle();
        }
    }

    /// Wait until no cycle is running, including follow-up cycles
    pub async fn wait_idle(&mut self) {
        while self.task.is_executing() {
            self.finish_in_flight(true).await;
        }
    }

    /// Flush and stop saving
    ///
    /// Returns an error if anything could not be written.
    pub async fn shutdown(&mut self) -> Result<(), StoreError> {
        info!(path = %self.config.path.display(), "shutting down entity store");
        self.wait_idle().await;
        if self.saving_enabled && self.is_dirty() {
            if let Err(e) = self.save_immediate().await {
                error!(error = %e, "final save failed");
            }
        }
        self.task.cancel_timers();

        if self.is_dirty() {
            let err = StoreError::DirtyAfterShutdown {
                dirty: self.tracking.dirty().len(),
                unsaved: self.tracking.unsaved().len(),
                unsaved_deleted: self.tracking.unsaved_deleted().len(),
            };
            error!(error = %err, "unsaved changes will be lost");
            return Err(err);
        }
        Ok(())
    }

    fn check_saving(&self, op: &str) -> bool {
        if !self.saving_enabled {
            warn!(op, "saving is disabled after a failed load, ignoring");
        }
        self.saving_enabled
    }

    /// Capture dirty entities into the snapshot
    fn prepare(&mut self) -> Capture {
        self.task.begin(self.clock.now());
        let captured = self.tracking.begin_capture();
        let data = Arc::make_mut(&mut self.data);
        data.set_version(self.migrations.current_version());

        let mut capture = Capture::default();
        for id in captured {
            let Some(entity) = self.registry.get(id) else {
                debug!(%id, "dirty entity no longer loaded, skipping");
                continue;
            };
            let mut node = Section::new();
            match entity.save(&mut node) {
                Ok(()) => {
                    node.set(KIND_KEY, entity.kind());
                    data.insert(id, node);
                    capture.saved.insert(id);
                }
                Err(e) => {
                    warn!(%id, error = %e, "entity failed to serialize, keeping its previous snapshot");
                    capture.failed.insert(id);
                }
            }
        }
        capture
    }

    fn write_job(&self) -> WriteJob {
        WriteJob {
            data: Arc::clone(&self.data),
            path: self.config.path.clone(),
            attempts: self.config.write_attempts,
            retry_delay: self.config.write_retry_delay,
        }
    }

    fn start_cycle(&mut self) {
        let capture = self.prepare();
        debug!(
            saved = capture.saved.len(),
            failed = capture.failed.len(),
            "save cycle started"
        );
        let job = self.write_job();
        self.task.launch(capture, job);
    }

    async fn finish_in_flight(&mut self, allow_rerun: bool) {
        let Some((capture, outcome)) = self.task.join().await else {
            return;
        };
        let succeeded = self.complete(capture, outcome).is_ok();
        if self.task.take_rerun() && allow_rerun && succeeded && self.saving_enabled {
            self.start_cycle();
        }
    }

    /// The callback phase; runs on the owning context once the write is done
    fn complete(&mut self, capture: Capture, outcome: Result<(), WriteError>) -> Result<(), WriteError> {
        let now = self.clock.now();
        match &outcome {
            Ok(()) => {
                self.tracking.flushed();
                self.task.record_success();
                debug!(saved = capture.saved.len(), "save cycle completed");
            }
            Err(e) => {
                self.tracking.flush_failed(capture.saved.iter().copied());
                let failures = self
                    .task
                    .record_failure(now + self.config.failure_retry_delay);
                if self.task.alert_due(now, self.config.failure_alert_interval) {
                    error!(
                        path = %self.config.path.display(),
                        failures,
                        unsaved = self.tracking.unsaved().len(),
                        error = %e,
                        "entity store cannot save, changes exist only in memory"
                    );
                } else {
                    warn!(failures, error = %e, "save cycle failed");
                }
            }
        }

        self.tracking.redirty(capture.failed);
        let pending = self.tracking.take_pending_deletes();
        if !pending.is_empty() {
            for id in pending {
                self.delete(id);
            }
            if self.saving_enabled {
                self.tracking.request_save();
                // A failed cycle already armed the retry timer
                if outcome.is_ok() {
                    self.task.schedule_delayed(now + self.config.save_delay);
                }
            }
        }
        outcome
    }

    // -- Loading --

    /// Replace all in-memory state with the contents of the store file
    ///
    /// Returns `false` if the file could not be loaded; saving is then
    /// disabled so the file is not overwritten with partial state.
    pub async fn reload(&mut self) -> bool {
        self.wait_idle().await;
        match self.load() {
            Ok(report) => {
                info!(
                    path = %self.config.path.display(),
                    loaded = report.loaded,
                    failed = report.failed,
                    migrated = report.migrated,
                    "entity store loaded"
                );
                self.last_load = Some(report);
                self.saving_enabled = true;
                true
            }
            Err(e) => {
                error!(error = %e, "entity store failed to load, saving disabled");
                self.saving_enabled = false;
                false
            }
        }
    }

    fn load(&mut self) -> Result<LoadReport, LoadError> {
        let current = self.migrations.current_version();
        let Some(source) = read_source(&self.config.path)? else {
            info!(path = %self.config.path.display(), "no store file, starting empty");
            self.reset(SaveData::new(current));
            return Ok(LoadReport::default());
        };

        let mut report = LoadReport {
            source: Some(source.path.clone()),
            from_temp: source.from_temp,
            ..LoadReport::default()
        };

        let migrated = self.migrations.apply_raw(&source.text);
        let text = match migrated {
            Some(migrated) => {
                let backup = writer::backup_copy(&source.path, self.clock.utc()).map_err(|e| {
                    LoadError::Backup {
                        path: source.path.clone(),
                        source: e,
                    }
                })?;
                info!(backup = %backup.display(), "raw migrations changed the file, original backed up");
                report.backup = Some(backup);
                migrated
            }
            None => source.text,
        };

        let (mut data, unrecognized) = SaveData::parse(&text).map_err(|e| LoadError::Parse {
            path: source.path.clone(),
            source: e,
        })?;
        for key in &unrecognized {
            warn!(key = %key.key, reason = key.reason, "preserving unrecognized top-level key");
        }
        report.unrecognized_keys = unrecognized.len();
        report.stored_version = Some(data.version());

        let full_resave = match self.migrations.check_version(data.version()) {
            VersionCheck::Current => false,
            VersionCheck::Upgrade { full_resave } => {
                info!(from = data.version(), to = current, full_resave, "upgrading store data");
                full_resave
            }
            VersionCheck::Downgrade => {
                return Err(LoadError::Downgrade {
                    path: source.path,
                    stored: data.version(),
                    current,
                })
            }
        };

        self.registry.clear();
        self.tracking = Tracking::new();
        let ids: Vec<EntityId> = data.ids().collect();
        for id in ids {
            self.allocator.confirm_used(id);
            let Some(stored) = data.get(id) else {
                continue;
            };
            let mut node = stored.clone();
            let applied = self.migrations.migrate_entity(id, &mut node);
            match self.registry.restore(id, &node) {
                Ok(()) => {
                    report.loaded += 1;
                    let migrated = !applied.is_empty();
                    if migrated {
                        debug!(%id, migrations = ?applied, "entity migrated");
                        report.migrated += 1;
                        data.insert(id, node);
                    }
                    if migrated || full_resave {
                        self.tracking.mark_dirty(id, false);
                    }
                }
                Err(e) => {
                    warn!(%id, error = %e, "entity failed to load, keeping its stored data");
                    report.failed += 1;
                }
            }
        }

        for id in data.reserved_ids() {
            self.allocator.confirm_used(id);
        }

        data.set_version(current);
        self.data = Arc::new(data);
        Ok(report)
    }

    fn reset(&mut self, data: SaveData) {
        self.registry.clear();
        self.tracking = Tracking::new();
        self.data = Arc::new(data);
    }
}

/// Read the store file, falling back to a leftover temp file
fn read_source(path: &Path) -> Result<Option<Source>, LoadError> {
    if let Some(text) = read_optional(path)? {
        return Ok(Some(Source {
            path: path.to_path_buf(),
            text,
            from_temp: false,
        }));
    }
    let tmp = writer::temp_path(path);
    let Some(text) = read_optional(&tmp)? else {
        return Ok(None);
    };
    warn!(path = %tmp.display(), "store file missing, recovering from temp file");
    Ok(Some(Source {
        path: tmp,
        text,
        from_temp: true,
    }))
}

fn read_optional(path: &Path) -> Result<Option<String>, LoadError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(LoadError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
