//! Debounced change notifications for a single source file.
//!
//! Wraps `notify-debouncer-mini` to produce debounced filesystem events and
//! feeds them into a `crossbeam-channel`. The parent directory is watched
//! (non-recursively) rather than the file itself, because editors often save
//! by writing a temporary file and renaming it over the original, which
//! would otherwise drop the watch.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use notify_debouncer_mini::notify::RecursiveMode;
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use signal_hook::flag;

// ---------------------------------------------------------------------------
// File event types
// ---------------------------------------------------------------------------

/// A classified change of the watched file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    /// The file was written, created or renamed into place.
    Changed(PathBuf),
    /// The file no longer exists.
    Removed(PathBuf),
}

impl FileEvent {
    pub fn path(&self) -> &Path {
        match self {
            FileEvent::Changed(p) | FileEvent::Removed(p) => p,
        }
    }
}

/// `notify-debouncer-mini` does not say what happened, so probe the disk.
fn classify(path: &Path) -> FileEvent {
    if path.exists() {
        FileEvent::Changed(path.to_path_buf())
    } else {
        FileEvent::Removed(path.to_path_buf())
    }
}

/// Whether an event path in the watched directory refers to the target.
pub fn is_target(event_path: &Path, file_name: &OsString) -> bool {
    event_path.file_name() == Some(file_name.as_os_str())
}

// ---------------------------------------------------------------------------
// Watcher
// ---------------------------------------------------------------------------

/// Keeps the debouncer alive; dropping it stops the notifications.
pub struct FileWatcher {
    _debouncer: notify_debouncer_mini::Debouncer<notify_debouncer_mini::notify::RecommendedWatcher>,
}

impl FileWatcher {
    /// Start watching `file` with the given debounce window in milliseconds.
    ///
    /// Returns the watcher (which must be kept alive) and a receiver for
    /// batches of events. Events for other files in the same directory are
    /// dropped before being sent.
    pub fn new(file: &Path, debounce_ms: u64) -> Result<(Self, Receiver<Vec<FileEvent>>)> {
        let (tx, rx): (Sender<Vec<FileEvent>>, Receiver<Vec<FileEvent>>) =
            crossbeam_channel::unbounded();

        let file_name = file
            .file_name()
            .map(|n| n.to_os_string())
            .with_context(|| format!("{} does not name a file", file.display()))?;
        let dir = match file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut debouncer = new_debouncer(
            Duration::from_millis(debounce_ms),
            move |res: DebounceEventResult| match res {
                Ok(events) => {
                    let batch: Vec<FileEvent> = events
                        .iter()
                        .filter(|ev| is_target(&ev.path, &file_name))
                        .map(|ev| classify(&ev.path))
                        .collect();
                    if !batch.is_empty() {
                        let _ = tx.send(batch);
                    }
                }
                Err(e) => tracing::warn!(error = %e, "file watch error"),
            },
        )
        .context("creating debounced file watcher")?;

        debouncer
            .watcher()
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("starting watch on {}", dir.display()))?;

        Ok((FileWatcher { _debouncer: debouncer }, rx))
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Register SIGINT and SIGTERM handlers that set the returned flag.
pub fn register_signal_handler() -> Result<Arc<AtomicBool>> {
    let shutdown = Arc::new(AtomicBool::new(false));
    flag::register(signal_hook::consts::SIGINT, Arc::clone(&shutdown))
        .context("registering SIGINT handler")?;
    flag::register(signal_hook::consts::SIGTERM, Arc::clone(&shutdown))
        .context("registering SIGTERM handler")?;
    Ok(shutdown)
}

/// Receive batches of [`FileEvent`] and hand each non-empty batch to
/// `handler`.
///
/// The loop exits when `shutdown` is set or when the channel is
/// disconnected (watcher dropped).
pub fn run_event_loop<F>(rx: &Receiver<Vec<FileEvent>>, shutdown: &Arc<AtomicBool>, mut handler: F)
where
    F: FnMut(&[FileEvent]),
{
    // Short timeout so the shutdown flag is checked periodically.
    let poll_timeout = Duration::from_millis(200);

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match rx.recv_timeout(poll_timeout) {
            Ok(events) => {
                if !events.is_empty() {
                    handler(&events);
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => continue,
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn signal_handler_starts_unset() {
        let shutdown = register_signal_handler().unwrap();
        assert!(!shutdown.load(Ordering::Relaxed));
    }

    #[test]
    fn target_matching_uses_file_name() {
        let name = OsString::from("app.ts");
        assert!(is_target(Path::new("/tmp/x/app.ts"), &name));
        assert!(!is_target(Path::new("/tmp/x/app.ts.swp"), &name));
        assert!(!is_target(Path::new("/tmp/x"), &name));
    }

    #[test]
    fn classify_probes_the_disk() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("a.ts");
        fs::write(&present, "").unwrap();
        assert_eq!(classify(&present), FileEvent::Changed(present.clone()));

        let missing = dir.path().join("gone.ts");
        assert_eq!(classify(&missing), FileEvent::Removed(missing.clone()));
        assert_eq!(classify(&missing).path(), missing.as_path());
    }

    #[test]
    fn event_loop_processes_events_until_shutdown() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));

        let events = vec![FileEvent::Changed(PathBuf::from("a.ts"))];
        tx.send(events.clone()).unwrap();
        tx.send(vec![]).unwrap();

        let shutdown_clone = Arc::clone(&shutdown);
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            shutdown_clone.store(true, Ordering::Relaxed);
        });

        let mut received = Vec::new();
        run_event_loop(&rx, &shutdown, |batch| received.extend_from_slice(batch));
        assert_eq!(received, events);
    }

    #[test]
    fn event_loop_exits_on_shutdown() {
        let (_tx, rx) = crossbeam_channel::unbounded::<Vec<FileEvent>>();
        let shutdown = Arc::new(AtomicBool::new(true));

        let mut called = false;
        run_event_loop(&rx, &shutdown, |_| called = true);
        assert!(!called);
    }

    #[test]
    fn event_loop_exits_on_disconnect() {
        let (tx, rx) = crossbeam_channel::unbounded::<Vec<FileEvent>>();
        let shutdown = Arc::new(AtomicBool::new(false));
        drop(tx);

        let mut called = false;
        run_event_loop(&rx, &shutdown, |_| called = true);
        assert!(!called);
    }

    #[test]
    fn watcher_reports_writes_to_the_target_only() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("main.ts");
        fs::write(&target, "class A {}\n").unwrap();

        let (watcher, rx) = FileWatcher::new(&target, 100).unwrap();
        fs::write(dir.path().join("other.ts"), "class B {}\n").unwrap();
        fs::write(&target, "class A {}\nclass C {}\n").unwrap();

        let batch = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("should receive an event for the target");
        assert!(
            batch
                .iter()
                .all(|e| e.path().file_name() == target.file_name()),
            "only the target should be reported, got: {batch:?}"
        );
        drop(watcher);
    }

    #[test]
    fn watcher_rejects_path_without_file_name() {
        assert!(FileWatcher::new(Path::new("/"), 100).is_err());
    }
}
