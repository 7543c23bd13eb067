use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::{FetchError, Repo};
use crate::event::{AppEvent, EventTx, ProgressUpdate};
use crate::log::LogSink;

/// Seam between the orchestrator and the GitHub API, so fetch runs can be
/// driven by a stub in tests.
pub trait ReadmeSource: Send + Sync {
    fn list_repos(&self) -> Result<Vec<Repo>, FetchError>;
    fn fetch_readme(&self, repo: &Repo) -> Result<String, FetchError>;
}

/// Final state of one fetch run, carried by the `FetchComplete` event.
#[derive(Debug, Clone, Default)]
pub struct FetchSnapshot {
    pub names: Vec<String>,
    pub docs: HashMap<String, String>,
    pub fetched: usize,
    pub failed: usize,
}

struct ArenaInner {
    snapshot: FetchSnapshot,
    closed: bool,
}

/// Shared result store for one run. Workers never see the map itself, only
/// the `record_*` calls; once closed (deadline or all workers done) further
/// records are dropped, so a straggler can never dirty the completion
/// snapshot.
struct ResultArena {
    total: usize,
    inner: Mutex<ArenaInner>,
}

impl ResultArena {
    fn new(total: usize) -> Self {
        Self {
            total,
            inner: Mutex::new(ArenaInner {
                snapshot: FetchSnapshot::default(),
                closed: false,
            }),
        }
    }

    fn record_found(&self, name: &str, content: String) -> Option<ProgressUpdate> {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return None;
        }
        inner.snapshot.docs.insert(name.to_string(), content);
        inner.snapshot.names.push(name.to_string());
        inner.snapshot.fetched += 1;
        Some(self.progress(&inner))
    }

    fn record_failed(&self) -> Option<ProgressUpdate> {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return None;
        }
        inner.snapshot.failed += 1;
        Some(self.progress(&inner))
    }

    fn progress(&self, inner: &ArenaInner) -> ProgressUpdate {
        ProgressUpdate {
            fetched: inner.snapshot.fetched,
            failed: inner.snapshot.failed,
            total: self.total,
        }
    }

    fn close(&self) -> FetchSnapshot {
        let mut inner = self.inner.lock().unwrap();
        inner.closed = true;
        std::mem::take(&mut inner.snapshot)
    }
}

/// Launch one fetch run on a background thread: list repositories, fan out
/// one worker per repo, emit a `FetchProgress` event per completed worker and
/// exactly one `FetchComplete` when every worker has returned or the deadline
/// elapses. A deadline expiry ships whatever subset finished; only a listing
/// or cache-directory failure aborts the run as `FetchFailed`.
pub fn spawn_fetch_run(
    source: Arc<dyn ReadmeSource>,
    readme_dir: PathBuf,
    deadline: Duration,
    tx: EventTx,
    log: LogSink,
) {
    std::thread::spawn(move || run_fetch(source, readme_dir, deadline, tx, log));
}

fn run_fetch(
    source: Arc<dyn ReadmeSource>,
    readme_dir: PathBuf,
    deadline: Duration,
    tx: EventTx,
    log: LogSink,
) {
    log.info("Starting to fetch GitHub READMEs.");

    let repos = match source.list_repos() {
        Ok(repos) => repos,
        Err(e) => {
            let msg = format!("Error listing repositories: {}", e);
            log.error(msg.clone());
            let _ = tx.send(AppEvent::FetchFailed(msg));
            return;
        }
    };

    if let Err(e) = std::fs::create_dir_all(&readme_dir) {
        let msg = format!("Failed to create directory '{}': {}", readme_dir.display(), e);
        log.error(msg.clone());
        let _ = tx.send(AppEvent::FetchFailed(msg));
        return;
    }

    let total = repos.len();
    let arena = Arc::new(ResultArena::new(total));
    let cancel = Arc::new(AtomicBool::new(false));
    let (done_tx, done_rx) = mpsc::channel::<()>();

    for repo in repos {
        let source = Arc::clone(&source);
        let arena = Arc::clone(&arena);
        let cancel = Arc::clone(&cancel);
        let readme_dir = readme_dir.clone();
        let tx = tx.clone();
        let log = log.clone();
        let done_tx = done_tx.clone();

        std::thread::spawn(move || {
            fetch_one(source.as_ref(), &repo, &readme_dir, &arena, &cancel, &tx, &log);
            let _ = done_tx.send(());
        });
    }
    drop(done_tx);

    // Join barrier with a hard deadline. Stragglers are cancelled and the
    // completion snapshot ships with whatever finished in time.
    let started = Instant::now();
    let mut done = 0;
    while done < total {
        match deadline.checked_sub(started.elapsed()) {
            Some(remaining) => match done_rx.recv_timeout(remaining) {
                Ok(()) => done += 1,
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => break,
        }
    }
    if done < total {
        cancel.store(true, Ordering::Relaxed);
        log.warn(format!(
            "Fetch deadline elapsed with {} of {} workers outstanding.",
            total - done,
            total
        ));
    }

    let snapshot = arena.close();
    log.info(format!(
        "Fetch run complete: {} fetched, {} failed.",
        snapshot.fetched, snapshot.failed
    ));
    let _ = tx.send(AppEvent::FetchComplete(snapshot));
}

fn fetch_one(
    source: &dyn ReadmeSource,
    repo: &Repo,
    readme_dir: &Path,
    arena: &ResultArena,
    cancel: &AtomicBool,
    tx: &EventTx,
    log: &LogSink,
) {
    if cancel.load(Ordering::Relaxed) {
        return;
    }
    let outcome = source.fetch_readme(repo);
    if cancel.load(Ordering::Relaxed) {
        return;
    }

    let progress = match outcome {
        Ok(content) => {
            // Persist before recording: content that failed to hit disk must
            // not end up in the aggregate map. The arena lock is never held
            // across this write.
            let path = readme_dir.join(format!("{}_README.md", repo.name));
            match std::fs::write(&path, &content) {
                Ok(()) => {
                    log.info(format!("Fetched README for repository: {}", repo.name));
                    arena.record_found(&repo.name, content)
                }
                Err(e) => {
                    log.error(format!(
                        "Error writing README for {} to file: {}",
                        repo.name, e
                    ));
                    arena.record_failed()
                }
            }
        }
        Err(FetchError::NotFound) => {
            log.info(format!("No README found for repository: {}", repo.name));
            arena.record_failed()
        }
        Err(e) => {
            log.error(format!("Error fetching README for {}: {}", repo.name, e));
            arena.record_failed()
        }
    };

    if let Some(update) = progress {
        let _ = tx.send(AppEvent::FetchProgress(update));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event;

    enum Behavior {
        Found(String),
        NotFound,
        Error,
        Slow(Duration),
    }

    struct StubSource {
        repos: Vec<Repo>,
        behaviors: HashMap<String, Behavior>,
        fail_listing: bool,
    }

    impl StubSource {
        fn new(behaviors: Vec<(String, Behavior)>) -> Self {
            let repos = behaviors
                .iter()
                .map(|(name, _)| Repo {
                    name: name.clone(),
                    full_name: format!("me/{}", name),
                })
                .collect();
            Self {
                repos,
                behaviors: behaviors.into_iter().collect(),
                fail_listing: false,
            }
        }
    }

    fn named(name: &str, behavior: Behavior) -> (String, Behavior) {
        (name.to_string(), behavior)
    }

    impl ReadmeSource for StubSource {
        fn list_repos(&self) -> Result<Vec<Repo>, FetchError> {
            if self.fail_listing {
                return Err(FetchError::Api("boom".to_string()));
            }
            Ok(self.repos.clone())
        }

        fn fetch_readme(&self, repo: &Repo) -> Result<String, FetchError> {
            match self.behaviors.get(&repo.name) {
                Some(Behavior::Found(content)) => Ok(content.clone()),
                Some(Behavior::NotFound) => Err(FetchError::NotFound),
                Some(Behavior::Error) => Err(FetchError::Api("boom".to_string())),
                Some(Behavior::Slow(delay)) => {
                    std::thread::sleep(*delay);
                    Ok("late readme".to_string())
                }
                None => Err(FetchError::NotFound),
            }
        }
    }

    fn run_to_completion(
        source: StubSource,
        dir: &Path,
        deadline: Duration,
        log: &LogSink,
    ) -> (Vec<ProgressUpdate>, FetchSnapshot) {
        let (tx, rx) = event::channel();
        spawn_fetch_run(
            Arc::new(source),
            dir.to_path_buf(),
            deadline,
            tx,
            log.clone(),
        );

        let mut progress = Vec::new();
        loop {
            match rx.recv_timeout(Duration::from_secs(5)).expect("event") {
                AppEvent::FetchProgress(u) => progress.push(u),
                AppEvent::FetchComplete(snap) => return (progress, snap),
                AppEvent::FetchFailed(msg) => panic!("unexpected failure: {}", msg),
                AppEvent::Generation(_) | AppEvent::Tick => {}
            }
        }
    }

    #[test]
    fn test_mixed_outcomes_single_complete() {
        let mut behaviors = Vec::new();
        for i in 0..35 {
            behaviors.push((format!("found{}", i), Behavior::Found(format!("# readme {}", i))));
        }
        for i in 0..10 {
            behaviors.push((format!("missing{}", i), Behavior::NotFound));
        }
        for i in 0..5 {
            behaviors.push((format!("broken{}", i), Behavior::Error));
        }

        let dir = tempfile::tempdir().unwrap();
        let log = LogSink::unmirrored();
        let (progress, snap) =
            run_to_completion(StubSource::new(behaviors), dir.path(), Duration::from_secs(10), &log);

        assert_eq!(snap.fetched, 35);
        assert_eq!(snap.failed, 15);
        assert_eq!(snap.names.len(), snap.fetched);
        for name in &snap.names {
            assert!(!snap.docs[name].is_empty());
        }
        assert_eq!(progress.len(), 50);
        // Every repo left a trace line.
        let entries = log.entries();
        let item_lines = entries
            .iter()
            .filter(|e| {
                e.message.contains("found")
                    || e.message.contains("missing")
                    || e.message.contains("broken")
            })
            .count();
        assert!(item_lines >= 50);
    }

    #[test]
    fn test_zero_repos_completes_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let log = LogSink::unmirrored();
        let (progress, snap) =
            run_to_completion(StubSource::new(Vec::new()), dir.path(), Duration::from_secs(1), &log);
        assert!(progress.is_empty());
        assert_eq!(snap.fetched, 0);
        assert_eq!(snap.failed, 0);
        assert!(snap.names.is_empty());
    }

    #[test]
    fn test_found_readmes_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let log = LogSink::unmirrored();
        let source = StubSource::new(vec![named("proj1", Behavior::Found("# hello".to_string()))]);
        let (_, snap) = run_to_completion(source, dir.path(), Duration::from_secs(5), &log);
        assert_eq!(snap.names, vec!["proj1"]);
        let on_disk = std::fs::read_to_string(dir.path().join("proj1_README.md")).unwrap();
        assert_eq!(on_disk, "# hello");
    }

    #[test]
    fn test_deadline_ships_partial_results() {
        let source = StubSource::new(vec![
            named("fast1", Behavior::Found("a".to_string())),
            named("fast2", Behavior::Found("b".to_string())),
            named("slow1", Behavior::Slow(Duration::from_secs(2))),
            named("slow2", Behavior::Slow(Duration::from_secs(2))),
            named("slow3", Behavior::Slow(Duration::from_secs(2))),
        ]);
        let dir = tempfile::tempdir().unwrap();
        let log = LogSink::unmirrored();
        let started = Instant::now();
        let (_, snap) =
            run_to_completion(source, dir.path(), Duration::from_millis(300), &log);

        // Partial success, not an error: the fast items made it, the slow
        // ones were cancelled without a file write or map insert.
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(snap.fetched, 2);
        assert!(snap.names.contains(&"fast1".to_string()));
        assert!(!dir.path().join("slow1_README.md").exists());
        assert!(!dir.path().join("slow2_README.md").exists());
        assert!(!dir.path().join("slow3_README.md").exists());
    }

    #[test]
    fn test_listing_failure_aborts_run() {
        let mut source = StubSource::new(vec![named("proj1", Behavior::Found("x".to_string()))]);
        source.fail_listing = true;

        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = event::channel();
        spawn_fetch_run(
            Arc::new(source),
            dir.path().to_path_buf(),
            Duration::from_secs(1),
            tx,
            LogSink::unmirrored(),
        );

        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            AppEvent::FetchFailed(msg) => assert!(msg.contains("Error listing repositories")),
            other => panic!("expected FetchFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_arena_rejects_records_after_close() {
        let arena = ResultArena::new(2);
        assert!(arena.record_found("a", "x".to_string()).is_some());
        let snap = arena.close();
        assert_eq!(snap.fetched, 1);
        assert!(arena.record_found("b", "y".to_string()).is_none());
        assert!(arena.record_failed().is_none());
        // A second close yields the emptied snapshot, not stale data.
        assert_eq!(arena.close().fetched, 0);
    }
}
