//! End-to-end orchestration tests over fake host boundaries

use std::collections::HashMap;
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::ExitStatus;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use sealpatch_compiler::DestinationProbe;
use sealpatch_errors::{Error, OpsError};
use sealpatch_events::{channel, AppEvent, EventReceiver, GeneralEvent};
use sealpatch_ops::{OperationState, OpsCtx};
use sealpatch_platform::{
    CommandOutput, Platform, PlatformCommand, PrivilegedRunner, ProcessOperations, ScriptOutput,
};
use sealpatch_types::InstallRequest;

const SEALED_INFO: &str = r"<?xml version='1.0'?>
<dict>
    <key>APFSSnapshot</key>
    <true/>
    <key>DeviceIdentifier</key>
    <string>disk3s1s1</string>
</dict>
";

const LISTING: &str = r"/dev/disk3 (synthesized):
   #:                       TYPE NAME                    SIZE       IDENTIFIER
   0:      APFS Container Scheme -                      +494.4 GB   disk3
   1:                APFS Volume Macintosh HD            11.3 GB    disk3s1
   2:              APFS Snapshot com.apple.os.update    11.3 GB    disk3s1s1
";

/// Canned per-program responses for the unprivileged query side.
struct FakeProcess {
    responses: HashMap<String, (i32, String)>,
}

impl FakeProcess {
    fn sealed_host() -> Self {
        let entries = [
            ("diskutil info", 0, SEALED_INFO),
            ("diskutil list", 0, LISTING),
            ("mount", 0, "/dev/disk3s1s1 on / (apfs, sealed, read-only)\n"),
            ("sw_vers -productVersion", 0, "14.5\n"),
        ];
        let mut responses = HashMap::new();
        for (program, code, stdout) in entries {
            responses.insert(program.to_string(), (code, stdout.to_string()));
        }
        Self { responses }
    }
}

#[async_trait]
impl ProcessOperations for FakeProcess {
    async fn execute_command(&self, cmd: PlatformCommand) -> Result<CommandOutput, Error> {
        let key = if cmd.get_args().is_empty() {
            cmd.program().to_string()
        } else {
            format!("{} {}", cmd.program(), cmd.get_args()[0])
        };
        let (code, stdout) = self.responses.get(&key).cloned().unwrap_or((1, String::new()));
        Ok(CommandOutput {
            status: ExitStatus::from_raw(code << 8),
            stdout: stdout.into_bytes(),
            stderr: Vec::new(),
        })
    }
}

/// Records dispatched scripts; optionally blocks until released.
struct FakeRunner {
    scripts: Arc<Mutex<Vec<String>>>,
    exit_success: bool,
    output: Option<String>,
    gate: Option<Arc<Notify>>,
}

impl FakeRunner {
    fn succeeding(scripts: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            scripts,
            exit_success: true,
            output: Some("done\n".to_string()),
            gate: None,
        }
    }

    fn failing(scripts: Arc<Mutex<Vec<String>>>, output: &str) -> Self {
        Self {
            scripts,
            exit_success: false,
            output: Some(output.to_string()),
            gate: None,
        }
    }

    fn gated(scripts: Arc<Mutex<Vec<String>>>, gate: Arc<Notify>) -> Self {
        Self {
            scripts,
            exit_success: true,
            output: None,
            gate: Some(gate),
        }
    }
}

#[async_trait]
impl PrivilegedRunner for FakeRunner {
    async fn run_script(&self, script: &str) -> Result<ScriptOutput, Error> {
        self.scripts.lock().unwrap().push(script.to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(ScriptOutput {
            success: self.exit_success,
            combined_output: self.output.clone(),
        })
    }
}

/// Probe with a fixed answer; operations in these tests never inspect
/// the real filesystem.
struct ConstProbe(bool);

impl DestinationProbe for ConstProbe {
    fn exists(&self, _live_path: &Path) -> bool {
        self.0
    }
}

fn ctx_with(runner: FakeRunner, destination_exists: bool) -> (OpsCtx, EventReceiver) {
    let (tx, rx) = channel();
    let platform = Arc::new(Platform::new(
        Box::new(FakeProcess::sealed_host()),
        Box::new(runner),
    ));
    let ctx = OpsCtx::builder()
        .with_platform(platform)
        .with_event_sender(tx)
        .with_probe(Box::new(ConstProbe(destination_exists)))
        .with_backup_dir("/Users/op/Desktop/SealPatchBak")
        .build();
    (ctx, rx)
}

async fn wait_for(ctx: &OpsCtx, state: OperationState) {
    for _ in 0..200 {
        if ctx.state().await == state {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("operation never reached {state}");
}

#[tokio::test]
async fn rebuild_dispatches_one_script_and_reports_restart() {
    let scripts = Arc::new(Mutex::new(Vec::new()));
    let (ctx, _rx) = ctx_with(FakeRunner::succeeding(Arc::clone(&scripts)), false);

    let outcome = ctx.rebuild_kernel_cache().await.unwrap();
    assert!(outcome.succeeded);
    assert!(outcome.requires_restart);
    assert_eq!(ctx.state().await, OperationState::Idle);

    let scripts = scripts.lock().unwrap();
    assert_eq!(scripts.len(), 1);
    let script = &scripts[0];
    assert!(script.contains("mount -o nobrowse -t apfs /dev/disk3s1 /System/Volumes/Update/mnt1"));
    assert!(script.contains(
        "kmutil create --volume-root /System/Volumes/Update/mnt1 --update-all --allow-missing-kdk"
    ));
    assert!(!script.contains("bless"));
    assert!(script.trim_end().ends_with("umount /System/Volumes/Update/mnt1"));
}

#[tokio::test]
async fn install_renders_install_rebuild_seal_in_order() {
    let scripts = Arc::new(Mutex::new(Vec::new()));
    let (ctx, _rx) = ctx_with(FakeRunner::succeeding(Arc::clone(&scripts)), false);

    let request = InstallRequest {
        files: vec!["/tmp/Foo.kext".into()],
        ..InstallRequest::default()
    };
    let outcome = ctx.install(request).await.unwrap();
    assert!(outcome.succeeded);
    assert!(outcome.requires_restart);

    let scripts = scripts.lock().unwrap();
    let script = &scripts[0];
    let install_at = script
        .find("rsync -r -i -a /tmp/Foo.kext /System/Volumes/Update/mnt1/System/Library/Extensions/")
        .unwrap();
    let rebuild_at = script.find("kmutil create").unwrap();
    let seal_at = script
        .find("bless --mount /System/Volumes/Update/mnt1 --bootefi --create-snapshot")
        .unwrap();
    assert!(install_at < rebuild_at);
    assert!(rebuild_at < seal_at);
}

#[tokio::test]
async fn script_failure_yields_failed_outcome_and_releases_the_lock() {
    let scripts = Arc::new(Mutex::new(Vec::new()));
    let (ctx, _rx) = ctx_with(
        FakeRunner::failing(Arc::clone(&scripts), "kmutil: unsupported KDK\n"),
        false,
    );

    let outcome = ctx.rebuild_kernel_cache().await.unwrap();
    assert!(!outcome.succeeded);
    assert!(!outcome.requires_restart);
    assert!(outcome
        .diagnostic_output
        .as_deref()
        .unwrap()
        .contains("unsupported KDK"));

    // The failed operation must not leave the lifecycle wedged.
    assert_eq!(ctx.state().await, OperationState::Idle);
    let second = ctx.rebuild_kernel_cache().await.unwrap();
    assert!(!second.succeeded);
}

#[tokio::test]
async fn concurrent_operation_is_rejected_not_queued() {
    let scripts = Arc::new(Mutex::new(Vec::new()));
    let gate = Arc::new(Notify::new());
    let (ctx, _rx) = ctx_with(
        FakeRunner::gated(Arc::clone(&scripts), Arc::clone(&gate)),
        false,
    );
    let ctx = Arc::new(ctx);

    let running = {
        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move { ctx.rebuild_kernel_cache().await })
    };
    wait_for(&ctx, OperationState::Executing).await;

    let err = ctx.create_snapshot().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Ops(OpsError::OperationInProgress { .. })
    ));

    gate.notify_one();
    let outcome = running.await.unwrap().unwrap();
    assert!(outcome.succeeded);
    assert_eq!(scripts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn cancel_detaches_tracking_but_never_aborts_the_script() {
    let scripts = Arc::new(Mutex::new(Vec::new()));
    let gate = Arc::new(Notify::new());
    let (ctx, mut rx) = ctx_with(
        FakeRunner::gated(Arc::clone(&scripts), Arc::clone(&gate)),
        false,
    );
    let ctx = Arc::new(ctx);

    let running = {
        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move { ctx.rebuild_kernel_cache().await })
    };
    wait_for(&ctx, OperationState::Executing).await;

    ctx.cancel().await;
    assert_eq!(ctx.state().await, OperationState::Idle);

    // The script keeps running behind the boundary and still resolves.
    gate.notify_one();
    let outcome = running.await.unwrap().unwrap();
    assert!(outcome.succeeded);

    let mut detached = false;
    while let Ok(event) = rx.try_recv() {
        if matches!(
            event,
            AppEvent::General(GeneralEvent::OperationDetached { .. })
        ) {
            detached = true;
        }
    }
    assert!(detached);
}

#[tokio::test]
async fn empty_install_never_reaches_the_privileged_boundary() {
    let scripts = Arc::new(Mutex::new(Vec::new()));
    let (ctx, _rx) = ctx_with(FakeRunner::succeeding(Arc::clone(&scripts)), false);

    let err = ctx.install(InstallRequest::default()).await.unwrap_err();
    assert!(matches!(err, Error::Ops(OpsError::NothingToInstall)));
    assert!(scripts.lock().unwrap().is_empty());
    assert_eq!(ctx.state().await, OperationState::Idle);
}

#[tokio::test]
async fn operation_log_records_lifecycle_and_restart_hint() {
    let scripts = Arc::new(Mutex::new(Vec::new()));
    let (ctx, _rx) = ctx_with(FakeRunner::succeeding(Arc::clone(&scripts)), false);

    ctx.rebuild_kernel_cache().await.unwrap();

    let log = ctx.log_snapshot().await;
    let keys: Vec<&str> = log.iter().map(|entry| entry.key.as_str()).collect();
    assert!(keys.contains(&"operation_started"));
    assert!(keys.contains(&"script_dispatched"));
    assert!(keys.contains(&"operation_completed"));
    assert!(keys.contains(&"restart_required"));
}
