//! Debounced run coordination
//!
//! Every edit calls [`TransformCoordinator::request_run`], which re-arms a
//! single pending timer. When the quiet period passes without another
//! request, the current state is snapshotted into a [`TransformRequest`] and
//! executed on the blocking pool. The outcome is folded into one
//! [`ViewState`] update, then a [`RunFinished`] event is broadcast.
//!
//! An in-flight run is never cancelled. By default outcomes publish in
//! completion order, so a slow older run can overwrite a newer one; with
//! `discard_stale_outcomes` such outcomes are dropped instead.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use xform_engine_traits::{EngineKind, Parameter, ParameterSet, TransformEngine};

use crate::config::PipelineConfig;
use crate::document::TransformDocument;
use crate::error::{PipelineError, Result};
use crate::params::extract_parameter_names;
use crate::registry::EngineRegistry;
use crate::schema::SchemaValidator;
use crate::state::{FailureKind, RunFinished, TransformOutcome, TransformRequest, ViewState};

const FINISHED_CAPACITY: usize = 64;

/// Everything the user can edit between runs
#[derive(Debug)]
struct Editable {
    input_text: String,
    document: TransformDocument,
    parameters: ParameterSet,
    engine: EngineKind,
    schema_path: Option<PathBuf>,
}

struct Inner {
    registry: EngineRegistry,
    validator: SchemaValidator,
    config: PipelineConfig,
    runtime: Handle,
    editable: Mutex<Editable>,
    pending: Mutex<Option<JoinHandle<()>>>,
    next_sequence: AtomicU64,
    view_tx: watch::Sender<ViewState>,
    finished_tx: broadcast::Sender<RunFinished>,
}

/// Owns the editable inputs and drives debounced transform runs
pub struct TransformCoordinator {
    inner: Arc<Inner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TransformCoordinator {
    /// Create a coordinator on the current tokio runtime
    pub fn new(registry: EngineRegistry, config: PipelineConfig) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| PipelineError::Internal(format!("no tokio runtime available: {}", e)))?;
        Self::with_handle(registry, config, runtime)
    }

    /// Create a coordinator on the current tokio runtime, configured from
    /// `path` and the environment (see [`PipelineConfig::load`])
    pub fn from_config_file(registry: EngineRegistry, path: Option<&Path>) -> Result<Self> {
        let config = PipelineConfig::load(path)?;
        Self::new(registry, config)
    }

    /// Create a coordinator that schedules its work on `runtime`
    pub fn with_handle(registry: EngineRegistry, config: PipelineConfig, runtime: Handle) -> Result<Self> {
        registry.get(config.default_engine)?;

        let (view_tx, _) = watch::channel(ViewState::default());
        let (finished_tx, _) = broadcast::channel(FINISHED_CAPACITY);
        let editable = Editable {
            input_text: String::new(),
            document: TransformDocument::new(),
            parameters: ParameterSet::new(),
            engine: config.default_engine,
            schema_path: None,
        };

        Ok(Self {
            inner: Arc::new(Inner {
                registry,
                validator: SchemaValidator::new(),
                config,
                runtime,
                editable: Mutex::new(editable),
                pending: Mutex::new(None),
                next_sequence: AtomicU64::new(1),
                view_tx,
                finished_tx,
            }),
        })
    }

    /// (Re)arm the debounce timer. Returns immediately.
    pub fn request_run(&self) {
        let inner = Arc::clone(&self.inner);
        let delay = self.inner.config.quiet_period();

        let mut pending = lock(&self.inner.pending);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(self.inner.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            // No await past this point: the run is detached before the
            // timer can be aborted
            inner.fire();
        }));
        debug!(quiet_period_ms = self.inner.config.quiet_period_ms, "run requested");
    }

    // --- Observation ---

    /// Current published view
    pub fn view(&self) -> ViewState {
        self.inner.view_tx.borrow().clone()
    }

    /// Receiver that sees every published view
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.inner.view_tx.subscribe()
    }

    /// Receiver for run completion events
    pub fn subscribe_finished(&self) -> broadcast::Receiver<RunFinished> {
        self.inner.finished_tx.subscribe()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &EngineRegistry {
        &self.inner.registry
    }

    // --- Input document ---

    pub fn input_text(&self) -> String {
        lock(&self.inner.editable).input_text.clone()
    }

    pub fn set_input_text<S: Into<String>>(&self, text: S) {
        lock(&self.inner.editable).input_text = text.into();
        self.request_run();
    }

    // --- Transform document ---

    pub fn transform_text(&self) -> String {
        lock(&self.inner.editable).document.text().to_string()
    }

    pub fn set_transform_text<S: Into<String>>(&self, text: S) {
        lock(&self.inner.editable).document.set_text(text);
        self.request_run();
    }

    /// Snapshot of the transform document
    pub fn document(&self) -> TransformDocument {
        lock(&self.inner.editable).document.clone()
    }

    /// Load a transform from disk and seed the parameters it declares
    pub fn open_transform<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let document = TransformDocument::open(path.as_ref())?;
        let names = extract_parameter_names(document.text());
        info!(path = %path.as_ref().display(), params = names.len(), "opened transform");
        {
            let mut editable = lock(&self.inner.editable);
            editable.document = document;
            editable.parameters = ParameterSet::from_names(names);
        }
        self.request_run();
        Ok(())
    }

    /// Replace the transform with an empty, unsaved document
    pub fn new_transform(&self) {
        {
            let mut editable = lock(&self.inner.editable);
            editable.document = TransformDocument::new();
            editable.parameters.clear();
        }
        self.request_run();
    }

    /// Save to the document's path; `Ok(false)` when it has none yet
    pub fn save_transform(&self) -> Result<bool> {
        lock(&self.inner.editable).document.save()
    }

    pub fn save_transform_as<P: Into<PathBuf>>(&self, path: P) -> Result<()> {
        let mut editable = lock(&self.inner.editable);
        editable.document.set_path(path);
        editable.document.save()?;
        Ok(())
    }

    // --- Parameters ---

    pub fn parameters(&self) -> ParameterSet {
        lock(&self.inner.editable).parameters.clone()
    }

    pub fn add_parameter(&self, param: Parameter) {
        lock(&self.inner.editable).parameters.add(param);
        self.request_run();
    }

    pub fn remove_parameter(&self, index: usize) -> Option<Parameter> {
        let removed = lock(&self.inner.editable).parameters.remove(index);
        if removed.is_some() {
            self.request_run();
        }
        removed
    }

    pub fn rename_parameter<S: Into<String>>(&self, index: usize, name: S) -> bool {
        let changed = lock(&self.inner.editable).parameters.rename(index, name);
        if changed {
            self.request_run();
        }
        changed
    }

    pub fn set_parameter_value<S: Into<String>>(&self, index: usize, value: S) -> bool {
        let changed = lock(&self.inner.editable).parameters.set_value(index, value);
        if changed {
            self.request_run();
        }
        changed
    }

    // --- Engine and schema ---

    pub fn engine(&self) -> EngineKind {
        lock(&self.inner.editable).engine
    }

    /// Select the engine for the next run. In-flight runs are unaffected.
    pub fn set_engine(&self, engine: EngineKind) -> Result<()> {
        self.inner.registry.get(engine)?;
        lock(&self.inner.editable).engine = engine;
        self.request_run();
        Ok(())
    }

    pub fn schema_path(&self) -> Option<PathBuf> {
        lock(&self.inner.editable).schema_path.clone()
    }

    pub fn set_schema_path(&self, path: Option<PathBuf>) {
        lock(&self.inner.editable).schema_path = path;
        self.request_run();
    }
}

impl Drop for TransformCoordinator {
    fn drop(&mut self) {
        if let Some(pending) = lock(&self.inner.pending).take() {
            pending.abort();
        }
    }
}

impl Inner {
    /// Timer expiry: snapshot and hand the run to its own task
    fn fire(self: Arc<Self>) {
        let Some(request) = self.snapshot() else {
            debug!("transform is blank, nothing to run");
            return;
        };
        debug!(sequence = request.sequence, engine = %request.engine, "snapshot taken");

        let runtime = self.runtime.clone();
        runtime.spawn(self.execute(request));
    }

    /// Current state as a request; `None` for a blank transform, which
    /// does not consume a sequence number
    fn snapshot(&self) -> Option<TransformRequest> {
        let editable = lock(&self.editable);
        let mut request = TransformRequest {
            sequence: 0,
            input_text: editable.input_text.clone(),
            transform_text: editable.document.text().to_string(),
            parameters: editable.parameters.clone(),
            engine: editable.engine,
            schema_path: editable.schema_path.clone(),
        };
        if request.is_empty_transform() {
            return None;
        }
        request.sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
        Some(request)
    }

    async fn execute(self: Arc<Self>, request: TransformRequest) {
        let sequence = request.sequence;
        let engine_kind = request.engine;
        let started = Instant::now();
        info!(sequence, engine = %engine_kind, "transform started");

        let outcome = match self.registry.get(engine_kind) {
            Ok(engine) => {
                let validator = self.validator;
                let task = tokio::task::spawn_blocking(move || {
                    run_request(engine.as_ref(), &validator, &request)
                        .unwrap_or_else(TransformOutcome::from)
                });
                match task.await {
                    Ok(outcome) => outcome,
                    Err(join_err) => TransformOutcome::failure(
                        FailureKind::Internal,
                        format!("Transform task failed: {}", join_err),
                    ),
                }
            }
            Err(err) => TransformOutcome::from(err),
        };

        info!(
            sequence,
            engine = %engine_kind,
            succeeded = outcome.is_success(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "transform finished"
        );
        self.publish(sequence, engine_kind, outcome);
    }

    /// Single atomic view update, then the completion event
    fn publish(&self, sequence: u64, engine: EngineKind, outcome: TransformOutcome) {
        let discard_stale = self.config.discard_stale_outcomes;
        let published = self.view_tx.send_if_modified(|view| {
            if discard_stale && view.last_sequence.is_some_and(|last| sequence < last) {
                return false;
            }
            view.apply(sequence, &outcome);
            true
        });

        if !published {
            warn!(sequence, "dropping outcome older than the published view");
            return;
        }

        // No subscribers is fine
        let _ = self.finished_tx.send(RunFinished {
            sequence,
            engine,
            succeeded: outcome.is_success(),
            completed_at: Utc::now(),
        });
    }
}

/// Transform, then validate. Blocking.
fn run_request(
    engine: &dyn TransformEngine,
    validator: &SchemaValidator,
    request: &TransformRequest,
) -> Result<TransformOutcome> {
    let output = engine.transform(
        &request.input_text,
        &request.transform_text,
        &request.parameters,
    )?;
    let validation = validator.validate(&output, request.schema_path.as_deref())?;
    Ok(TransformOutcome::success(output, validation))
}
