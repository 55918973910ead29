//! Orchestration context and the public privileged operations

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use sealpatch_compiler::{DestinationProbe, LiveRootProbe, OperationCompiler};
use sealpatch_config::constants::KDK_DIRECTORY;
use sealpatch_config::Config;
use sealpatch_errors::{Error, ExecError, OpsError, PresetError, Result};
use sealpatch_events::{
    AppEvent, EventEmitter, EventLog, EventLogEntry, EventSender, GeneralEvent, InstallEvent,
};
use sealpatch_platform::{render_script, Platform};
use sealpatch_preset::{PresetExpander, PresetLoader};
use sealpatch_progress::ProgressEstimator;
use sealpatch_resolver::VolumeResolver;
use sealpatch_types::{InstallRequest, Operation, OperationOutcome, PresetDefinition};

use crate::state::OperationState;

/// Tracked lifecycle of the one operation allowed in flight.
struct Tracking {
    state: OperationState,
    operation: Option<String>,
    /// Bumped on begin and on cancel; a driver whose generation no
    /// longer matches has been detached and stops writing state.
    generation: u64,
}

impl Tracking {
    /// Advance the lifecycle on behalf of a driver. A detached driver
    /// (cancelled, superseded generation) advances nothing; a live
    /// driver asking for an edge the state machine does not admit is a
    /// lifecycle bug and raises.
    fn advance(&mut self, generation: u64, next: OperationState) -> Result<()> {
        if self.generation != generation {
            return Ok(());
        }
        if !self.state.can_transition_to(next) {
            return Err(OpsError::InvalidStateTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            }
            .into());
        }
        self.state = next;
        Ok(())
    }
}

/// Orchestration context: owns the platform handle, configuration, the
/// bounded operation log and the lifecycle lock.
///
/// All public operations resolve the volume fresh, compile a step
/// sequence, and dispatch it through exactly one elevation request.
pub struct OpsCtx {
    platform: Arc<Platform>,
    config: Config,
    tx: Option<EventSender>,
    log: Mutex<EventLog>,
    tracking: Mutex<Tracking>,
    compiler: OperationCompiler,
    probe: Box<dyn DestinationProbe>,
    progress: ProgressEstimator,
}

impl EventEmitter for OpsCtx {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl OpsCtx {
    /// Start building an orchestration context.
    #[must_use]
    pub fn builder() -> OpsCtxBuilder {
        OpsCtxBuilder::default()
    }

    /// Install bundles (and optionally merge a KDK) onto the volume.
    ///
    /// # Errors
    ///
    /// Precondition, resolution and elevation failures surface as
    /// errors; a script that ran and exited non-zero is reported as a
    /// failed [`OperationOutcome`] instead.
    pub async fn install(&self, request: InstallRequest) -> Result<OperationOutcome> {
        self.run(Operation::Install(request)).await
    }

    /// Merge a KDK tree into the volume without installing files.
    ///
    /// # Errors
    ///
    /// See [`install`](Self::install).
    pub async fn merge_kdk(&self, kdk: PathBuf, full_merge: bool) -> Result<OperationOutcome> {
        self.run(Operation::MergeKdk { kdk, full_merge }).await
    }

    /// Rebuild the kernel collections without resealing.
    ///
    /// # Errors
    ///
    /// See [`install`](Self::install).
    pub async fn rebuild_kernel_cache(&self) -> Result<OperationOutcome> {
        self.run(Operation::RebuildCache).await
    }

    /// Reseal the volume into a new boot snapshot.
    ///
    /// # Errors
    ///
    /// See [`install`](Self::install).
    pub async fn create_snapshot(&self) -> Result<OperationOutcome> {
        self.run(Operation::CreateSnapshot).await
    }

    /// Boot from the last sealed snapshot again, reverting patches.
    ///
    /// # Errors
    ///
    /// See [`install`](Self::install).
    pub async fn restore_last_snapshot(&self) -> Result<OperationOutcome> {
        self.run(Operation::RestoreSnapshot).await
    }

    /// Expand a preset and install the resulting request.
    ///
    /// # Errors
    ///
    /// Expansion precondition failures (`PresetRequiresKdk`, nothing
    /// resolved at all) surface before any privileged work starts.
    pub async fn install_preset(
        &self,
        preset: &PresetDefinition,
        selected_kdk: Option<&Path>,
    ) -> Result<OperationOutcome> {
        let expander = PresetExpander::new(self.config.presets.files_dir.clone(), self.tx.clone());
        let request = expander.expand(preset, selected_kdk)?;
        if request.files.is_empty() && request.merge_operations.is_empty() {
            return Err(PresetError::NothingExpanded {
                name: preset.name.clone(),
            }
            .into());
        }
        self.install(request).await
    }

    /// Load the preset definitions configured for this context.
    ///
    /// # Errors
    ///
    /// Returns an error when the definitions directory exists but is
    /// unreadable.
    pub async fn load_presets(&self) -> Result<Vec<PresetDefinition>> {
        PresetLoader::new(self.config.presets.definitions_dir.clone(), self.tx.clone())
            .load()
            .await
    }

    /// List installed KDK bundles. Zero matches is a normal result.
    ///
    /// # Errors
    ///
    /// Returns an error only when the KDK directory exists but cannot
    /// be read.
    pub async fn discover_kdks(&self) -> Result<Vec<PathBuf>> {
        sealpatch_platform::discover_kdks(Path::new(KDK_DIRECTORY)).await
    }

    /// Stop tracking the in-flight operation, if any.
    ///
    /// The dispatched script is not killable: it runs to completion
    /// behind the elevation boundary regardless. This only detaches
    /// client-side state so a new operation may eventually be started;
    /// the detached driver's result is discarded when it resolves.
    pub async fn cancel(&self) {
        let mut tracking = self.tracking.lock().await;
        if tracking.state == OperationState::Idle {
            return;
        }
        let operation = tracking.operation.take().unwrap_or_default();
        tracking.state = OperationState::Idle;
        tracking.generation += 1;
        drop(tracking);
        self.emit(AppEvent::General(GeneralEvent::OperationDetached {
            operation,
        }));
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> OperationState {
        self.tracking.lock().await.state
    }

    /// Detached copy of the bounded operation log.
    pub async fn log_snapshot(&self) -> Vec<EventLogEntry> {
        self.log.lock().await.snapshot()
    }

    async fn run(&self, operation: Operation) -> Result<OperationOutcome> {
        let name = operation.name();
        let generation = self.begin(name).await?;

        self.emit_logged(AppEvent::General(GeneralEvent::OperationStarted {
            operation: name.to_string(),
        }))
        .await;
        let progress = self.progress.start(name);

        match self.drive(&operation, generation).await {
            Ok(outcome) => {
                self.finish(generation, OperationState::Completed).await;
                self.emit_logged(AppEvent::General(GeneralEvent::OperationCompleted {
                    operation: name.to_string(),
                    success: true,
                }))
                .await;
                // The heartbeat holds 100% through its grace period on
                // its own time; don't keep the caller waiting.
                drop(tokio::spawn(progress.complete()));
                if outcome.requires_restart {
                    self.emit_logged(AppEvent::General(GeneralEvent::RestartRequired {
                        operation: name.to_string(),
                    }))
                    .await;
                }
                Ok(outcome)
            }
            // The script ran and exited non-zero: after a failed
            // multi-step sequence the on-volume state is undefined, so
            // this is reported as a failed outcome carrying the raw
            // diagnostic text, not bubbled as an error.
            Err(Error::Exec(ExecError::ScriptFailed { output })) => {
                self.finish(generation, OperationState::Failed).await;
                self.emit_logged(AppEvent::General(GeneralEvent::OperationCompleted {
                    operation: name.to_string(),
                    success: false,
                }))
                .await;
                let diagnostic = if output.is_empty() { None } else { Some(output) };
                Ok(OperationOutcome::failure(diagnostic))
            }
            Err(error) => {
                self.finish(generation, OperationState::Failed).await;
                self.emit_logged(AppEvent::General(GeneralEvent::OperationFailed {
                    operation: name.to_string(),
                    error: error.to_string(),
                }))
                .await;
                Err(error)
            }
        }
    }

    /// Resolve, compile, dispatch.
    async fn drive(&self, operation: &Operation, generation: u64) -> Result<OperationOutcome> {
        let resolver = VolumeResolver::new(self.platform.process(), self.tx.clone());
        let ctx = resolver.resolve().await?;

        self.transition(generation, OperationState::Compiling)
            .await?;
        let steps = self.compiler.compile(operation, &ctx, self.probe.as_ref())?;

        self.transition(generation, OperationState::Executing)
            .await?;
        let script = render_script(&steps);
        self.emit_logged(AppEvent::Install(InstallEvent::ScriptDispatched {
            steps: steps.len(),
        }))
        .await;
        let output = self.platform.privileged().run_script(&script).await?;

        if output.success {
            Ok(OperationOutcome::success(output.combined_output))
        } else {
            Err(ExecError::ScriptFailed {
                output: output.combined_output.unwrap_or_default(),
            }
            .into())
        }
    }

    async fn begin(&self, name: &str) -> Result<u64> {
        let mut tracking = self.tracking.lock().await;
        if tracking.state != OperationState::Idle {
            return Err(OpsError::OperationInProgress {
                current: tracking
                    .operation
                    .clone()
                    .unwrap_or_else(|| tracking.state.to_string()),
            }
            .into());
        }
        tracking.generation += 1;
        tracking.state = OperationState::Resolving;
        tracking.operation = Some(name.to_string());
        tracing::debug!(operation = name, id = %Uuid::new_v4(), "operation admitted");
        Ok(tracking.generation)
    }

    async fn transition(&self, generation: u64, next: OperationState) -> Result<()> {
        self.tracking.lock().await.advance(generation, next)
    }

    /// Record the terminal state, then return to `Idle` so the next
    /// operation can be admitted.
    async fn finish(&self, generation: u64, terminal: OperationState) {
        let mut tracking = self.tracking.lock().await;
        if tracking.generation != generation {
            return;
        }
        if tracking.state.can_transition_to(terminal) {
            tracking.state = terminal;
        }
        tracking.state = OperationState::Idle;
        tracking.operation = None;
    }

    /// Emit to subscribers and record in the bounded operation log.
    async fn emit_logged(&self, event: AppEvent) {
        self.log.lock().await.record(&event);
        self.emit(event);
    }
}

/// Builder for [`OpsCtx`] with production defaults filled in.
#[derive(Default)]
pub struct OpsCtxBuilder {
    platform: Option<Arc<Platform>>,
    config: Option<Config>,
    tx: Option<EventSender>,
    probe: Option<Box<dyn DestinationProbe>>,
    backup_dir: Option<PathBuf>,
}

impl OpsCtxBuilder {
    #[must_use]
    pub fn with_platform(mut self, platform: Arc<Platform>) -> Self {
        self.platform = Some(platform);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Override destination probing (tests).
    #[must_use]
    pub fn with_probe(mut self, probe: Box<dyn DestinationProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Override where existing destinations are backed up.
    #[must_use]
    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn build(self) -> OpsCtx {
        let config = self.config.unwrap_or_default();
        let tx = self.tx;
        let mut compiler = OperationCompiler::new(tx.clone());
        if let Some(dir) = self.backup_dir {
            compiler = compiler.with_backup_dir(dir);
        }
        OpsCtx {
            platform: self.platform.unwrap_or_else(|| Arc::new(Platform::current())),
            log: Mutex::new(EventLog::new(config.log.capacity)),
            tracking: Mutex::new(Tracking {
                state: OperationState::Idle,
                operation: None,
                generation: 0,
            }),
            compiler,
            probe: self.probe.unwrap_or_else(|| Box::new(LiveRootProbe)),
            progress: ProgressEstimator::new(config.progress.clone(), tx.clone()),
            config,
            tx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracking(state: OperationState, generation: u64) -> Tracking {
        Tracking {
            state,
            operation: Some("install".to_string()),
            generation,
        }
    }

    #[test]
    fn live_driver_on_an_inadmissible_edge_raises() {
        let mut tracking = tracking(OperationState::Resolving, 3);
        let err = tracking
            .advance(3, OperationState::Completed)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Ops(OpsError::InvalidStateTransition { .. })
        ));
        // The bad request must not have moved the state.
        assert_eq!(tracking.state, OperationState::Resolving);
    }

    #[test]
    fn detached_driver_advances_nothing() {
        let mut tracking = tracking(OperationState::Idle, 4);
        tracking.advance(3, OperationState::Compiling).unwrap();
        assert_eq!(tracking.state, OperationState::Idle);
    }

    #[test]
    fn live_driver_walks_the_admitted_edges() {
        let mut tracking = tracking(OperationState::Resolving, 1);
        tracking.advance(1, OperationState::Compiling).unwrap();
        tracking.advance(1, OperationState::Executing).unwrap();
        assert_eq!(tracking.state, OperationState::Executing);
    }
}
