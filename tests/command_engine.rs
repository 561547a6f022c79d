// tests/command_engine.rs
//
// Drives the shell-based build engine with stand-in build commands.
#![cfg(unix)]

mod common;
use crate::common::builders::single_target;
use crate::common::{init_tracing, with_timeout};

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{sleep, timeout, Duration};

use livebuild::config::{BuildConfiguration, EngineSection};
use livebuild::engine::{BuildEngine, WatchEvent, WatchSubscription};
use livebuild::store::{ArtifactStore, DiskStore, MemoryStore};
use livebuild::watch::{run_build, BuildJob, CommandEngine};

const STATS: &str = r#"{"hash":"4f2a","time":17,"errors":[],"warnings":[],
"entrypoints":{"main":{"assets":["main.js"]}},
"assets":[{"name":"main.js","size":24,"emitted":true},{"name":"old.js","size":3,"emitted":false}]}"#;

/// A fake bundler: reads `src/index.js`, writes `dist/main.js` and prints
/// stats after a banner.
fn write_build_script(dir: &Path) {
    fs::create_dir_all(dir.join("src")).unwrap();
    fs::write(dir.join("src/index.js"), "console.log('v1')").unwrap();
    fs::write(dir.join("stats.json"), STATS).unwrap();
    fs::write(
        dir.join("build.sh"),
        "cat src/index.js > /dev/null\nmkdir -p dist\nprintf 'console.log(\"built\")' > dist/main.js\necho 'bundler v5'\ncat stats.json\n",
    )
    .unwrap();
}

fn job(dir: &Path, command: &str, config: BuildConfiguration, store: Arc<dyn ArtifactStore>) -> BuildJob {
    BuildJob {
        root: dir.canonicalize().unwrap(),
        command: command.to_string(),
        config,
        store,
    }
}

#[tokio::test]
async fn build_stats_are_parsed_from_stdout() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_build_script(dir.path());

    let job = job(dir.path(), "sh build.sh", single_target("dist"), Arc::new(DiskStore));
    let result = run_build(&job).await.unwrap();

    assert_eq!(result.hash, "4f2a");
    assert_eq!(result.time, 17);
    assert_eq!(result.first_entry_asset(), Some("main.js"));
    assert_eq!(result.emitted_assets().count(), 1);
}

#[tokio::test]
async fn memory_store_receives_emitted_assets() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_build_script(dir.path());

    let store = Arc::new(MemoryStore::new());
    let job = job(dir.path(), "sh build.sh", single_target("dist"), store.clone());
    run_build(&job).await.unwrap();

    let expected = job.root.join("dist").join("main.js");
    assert_eq!(store.read(&expected).unwrap(), b"console.log(\"built\")".to_vec());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn garbage_output_is_an_engine_failure_with_stderr_details() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();

    let job = job(
        dir.path(),
        "echo 'Cannot find module webpack-cli' >&2; exit 1",
        single_target("dist"),
        Arc::new(DiskStore),
    );
    let failure = run_build(&job).await.unwrap_err();

    assert!(failure.message.contains("did not print JSON stats"), "{}", failure.message);
    assert_eq!(
        failure.details.as_deref().map(str::trim),
        Some("Cannot find module webpack-cli")
    );
}

#[tokio::test]
async fn engine_sends_initial_build_after_subscribing() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_build_script(dir.path());

    let settings = EngineSection {
        command: "sh build.sh".to_string(),
        ..EngineSection::default()
    };
    let mut engine = CommandEngine::new(dir.path(), settings);
    let (tx, mut rx) = mpsc::channel::<WatchEvent>(4);

    let mut subscription = engine
        .start_watch(&single_target("dist"), Arc::new(DiskStore), tx)
        .unwrap();

    let event = with_timeout(rx.recv()).await.expect("engine sent nothing");
    match event {
        WatchEvent::BuildFinished(Ok(result)) => assert_eq!(result.hash, "4f2a"),
        other => panic!("unexpected event: {other:?}"),
    }

    subscription.close();
    assert!(subscription.is_closed());
}

/// Start a watch session in `dir` and wait for its initial build.
async fn watching(dir: &Path, debounce_ms: u64) -> (WatchSubscription, mpsc::Receiver<WatchEvent>) {
    let settings = EngineSection {
        command: "sh build.sh".to_string(),
        debounce_ms,
        ..EngineSection::default()
    };
    let mut engine = CommandEngine::new(dir, settings);
    let (tx, mut rx) = mpsc::channel::<WatchEvent>(16);
    let subscription = engine
        .start_watch(&single_target("dist"), Arc::new(DiskStore), tx)
        .unwrap();

    expect_build(&mut rx).await;
    (subscription, rx)
}

async fn expect_build(rx: &mut mpsc::Receiver<WatchEvent>) {
    match with_timeout(rx.recv()).await {
        Some(WatchEvent::BuildFinished(Ok(result))) => assert_eq!(result.hash, "4f2a"),
        other => panic!("expected a finished build, got {other:?}"),
    }
}

async fn expect_quiet(rx: &mut mpsc::Receiver<WatchEvent>, window: Duration) {
    if let Ok(event) = timeout(window, rx.recv()).await {
        panic!("unexpected rebuild: {event:?}");
    }
}

#[tokio::test]
async fn idle_session_does_not_rebuild() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_build_script(dir.path());

    // Each build reads `src/` and writes `dist/`; neither may start another.
    let (_subscription, mut rx) = watching(dir.path(), 50).await;
    expect_quiet(&mut rx, Duration::from_millis(1500)).await;
}

#[tokio::test]
async fn one_edit_rebuilds_once() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_build_script(dir.path());
    let (_subscription, mut rx) = watching(dir.path(), 50).await;
    sleep(Duration::from_millis(200)).await;

    fs::write(dir.path().join("src/index.js"), "console.log('v2')").unwrap();

    expect_build(&mut rx).await;
    expect_quiet(&mut rx, Duration::from_millis(1000)).await;
}

#[tokio::test]
async fn quick_edits_coalesce_into_one_rebuild() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_build_script(dir.path());
    let (_subscription, mut rx) = watching(dir.path(), 400).await;
    sleep(Duration::from_millis(200)).await;

    for n in 0..5 {
        fs::write(dir.path().join("src/index.js"), format!("console.log({n})")).unwrap();
        fs::write(dir.path().join(format!("src/extra{n}.js")), "1").unwrap();
    }

    expect_build(&mut rx).await;
    expect_quiet(&mut rx, Duration::from_millis(1000)).await;
}

#[tokio::test]
async fn output_writes_and_reads_do_not_rebuild() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_build_script(dir.path());
    let (_subscription, mut rx) = watching(dir.path(), 50).await;

    fs::create_dir_all(dir.path().join("dist/chunks")).unwrap();
    fs::write(dir.path().join("dist/chunks/1.js"), "chunk").unwrap();
    fs::write(dir.path().join("dist/main.js"), "rewritten").unwrap();
    let _ = fs::read(dir.path().join("src/index.js")).unwrap();
    let _ = fs::read_dir(dir.path().join("src")).unwrap().count();

    expect_quiet(&mut rx, Duration::from_millis(1000)).await;
}
