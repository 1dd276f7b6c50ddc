use anyhow::Result;
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::{debug, error, info};

/// Reload notifications fanned out to watch loops
#[derive(Debug, Clone)]
pub enum ReloadEvent {
    PresetsChanged(PathBuf),
}

/// File watching configuration
#[derive(Debug, Clone, serde::Deserialize)]
pub struct HotReloadConfig {
    /// Enable automatic file watching
    pub auto_reload: bool,
    /// Debounce duration to avoid rapid reloads
    pub debounce_ms: u64,
}

impl Default for HotReloadConfig {
    fn default() -> Self {
        Self {
            auto_reload: true,
            debounce_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HotReloadStats {
    pub events_seen: u64,
    pub reloads_fired: u64,
}

/// Watches the preset file and broadcasts debounced change events
pub struct HotReloadManager {
    config: HotReloadConfig,
    path: PathBuf,
    watcher: Option<RecommendedWatcher>,
    event_sender: broadcast::Sender<ReloadEvent>,
    events_seen: Arc<AtomicU64>,
    reloads_fired: Arc<AtomicU64>,
}

impl HotReloadManager {
    pub fn new(path: impl Into<PathBuf>, config: HotReloadConfig) -> Self {
        let (sender, _) = broadcast::channel(100);

        Self {
            config,
            path: path.into(),
            watcher: None,
            event_sender: sender,
            events_seen: Arc::new(AtomicU64::new(0)),
            reloads_fired: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Subscribe before or after `start`; events are fanned out to
    /// every live receiver
    pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.event_sender.subscribe()
    }

    pub fn stats(&self) -> HotReloadStats {
        HotReloadStats {
            events_seen: self.events_seen.load(Ordering::SeqCst),
            reloads_fired: self.reloads_fired.load(Ordering::SeqCst),
        }
    }

    /// Start watching the preset file
    pub fn start(&mut self) -> Result<()> {
        if !self.config.auto_reload {
            info!("🔥 Hot reload disabled by configuration");
            return Ok(());
        }

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| match result {
                Ok(event) => {
                    if tx.send(event).is_err() {
                        debug!("File watch channel closed");
                    }
                }
                Err(e) => error!("File watch error: {}", e),
            },
            NotifyConfig::default().with_poll_interval(Duration::from_millis(100)),
        )?;

        // Editors often replace the file, so watch the parent directory
        // when watching the file itself fails
        if watcher.watch(&self.path, RecursiveMode::NonRecursive).is_err() {
            if let Some(parent) = self.path.parent() {
                watcher.watch(parent, RecursiveMode::NonRecursive)?;
                info!("👀 Watching directory: {:?}", parent);
            }
        } else {
            info!("👀 Watching file: {:?}", self.path);
        }
        self.watcher = Some(watcher);

        let event_sender = self.event_sender.clone();
        let debounce = Duration::from_millis(self.config.debounce_ms);
        let watched = self.path.clone();
        let events_seen = Arc::clone(&self.events_seen);
        let reloads_fired = Arc::clone(&self.reloads_fired);

        tokio::spawn(async move {
            let mut last_fired: Option<Instant> = None;

            while let Some(event) = rx.recv().await {
                events_seen.fetch_add(1, Ordering::SeqCst);

                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    continue;
                }

                let Some(path) = event
                    .paths
                    .into_iter()
                    .find(|path| concerns_watched_file(path, &watched))
                else {
                    continue;
                };

                let now = Instant::now();
                if !should_fire(last_fired, now, debounce) {
                    debug!("🔍 Change debounced: {:?}", path);
                    continue;
                }
                last_fired = Some(now);

                info!("📁 Preset file changed: {:?}", path);
                reloads_fired.fetch_add(1, Ordering::SeqCst);
                let _ = event_sender.send(ReloadEvent::PresetsChanged(path));
            }
            debug!("File watcher task finished");
        });

        info!("🔥 Hot reload started ({}ms debounce)", self.config.debounce_ms);
        Ok(())
    }

    /// Drop the OS watches; subscribed receivers see no further events
    pub fn stop(&mut self) {
        if self.watcher.take().is_some() {
            info!("⏹️  Hot reload stopped");
        }
    }
}

/// Exact path match, or same file name for editors that write a
/// replacement file into the watched directory
fn concerns_watched_file(candidate: &std::path::Path, watched: &std::path::Path) -> bool {
    candidate == watched
        || (watched.file_name().is_some() && candidate.file_name() == watched.file_name())
}

fn should_fire(last: Option<Instant>, now: Instant, debounce: Duration) -> bool {
    match last {
        Some(last) => now.duration_since(last) >= debounce,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::time::timeout;
    #[allow(unused_imports)]
    use tokio_test;

    #[test]
    fn test_debounce_window() {
        let start = Instant::now();
        let debounce = Duration::from_millis(500);

        assert!(should_fire(None, start, debounce));
        assert!(!should_fire(
            Some(start),
            start + Duration::from_millis(100),
            debounce
        ));
        assert!(should_fire(
            Some(start),
            start + Duration::from_millis(600),
            debounce
        ));
    }

    #[test]
    fn test_path_matching() {
        let watched = PathBuf::from("/tmp/motionlab/presets.toml");
        assert!(concerns_watched_file(&watched, &watched));
        assert!(concerns_watched_file(
            &PathBuf::from("/somewhere/else/presets.toml"),
            &watched
        ));
        assert!(!concerns_watched_file(
            &PathBuf::from("/tmp/motionlab/other.toml"),
            &watched
        ));
    }

    #[tokio::test]
    async fn test_change_event_fires() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets.toml");
        std::fs::write(&path, "[[preset]]\ntag = \"First\"\n").unwrap();

        let mut manager = HotReloadManager::new(&path, HotReloadConfig::default());
        let mut events = manager.subscribe();
        manager.start().unwrap();

        // Give the watcher a moment to attach before changing the file
        tokio::time::sleep(Duration::from_millis(300)).await;
        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "# edited").unwrap();
        file.sync_all().unwrap();
        drop(file);

        let event = timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("no reload event within timeout")
            .expect("reload channel closed");
        let ReloadEvent::PresetsChanged(changed) = event;
        assert_eq!(changed.file_name(), path.file_name());
        assert!(manager.stats().reloads_fired >= 1);

        manager.stop();
    }

    #[tokio::test]
    async fn test_disabled_manager_never_watches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets.toml");
        std::fs::write(&path, "").unwrap();

        let config = HotReloadConfig {
            auto_reload: false,
            debounce_ms: 500,
        };
        let mut manager = HotReloadManager::new(&path, config);
        let mut events = manager.subscribe();
        manager.start().unwrap();

        std::fs::write(&path, "[[preset]]\ntag = \"First\"\n").unwrap();
        let result = timeout(Duration::from_millis(700), events.recv()).await;
        assert!(result.is_err(), "disabled manager produced an event");
    }
}
