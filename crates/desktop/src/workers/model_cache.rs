use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use framesight_core::detection::infrastructure::model_resolver;
use framesight_core::pipeline::cancel::CancelToken;
use framesight_core::shared::constants::{DETECT_MODEL_NAME, DETECT_MODEL_URL};

/// Shared model cache that resolves the detection model in the background at
/// startup. Workers grab the pre-resolved path or wait for the in-progress
/// resolution.
pub struct ModelCache {
    detect: Arc<ModelSlot>,
}

struct ModelSlot {
    result: Mutex<Option<Result<PathBuf, String>>>,
    ready: Condvar,
    progress: Arc<Mutex<(u64, u64)>>,
}

impl ModelCache {
    /// Create a new `ModelCache` and begin resolving the model in the
    /// background.
    pub fn new() -> Arc<Self> {
        let cache = Arc::new(Self {
            detect: Arc::new(ModelSlot::new()),
        });

        let detect_slot = cache.detect.clone();
        thread::spawn(move || {
            detect_slot.resolve(DETECT_MODEL_NAME, DETECT_MODEL_URL);
        });

        cache
    }

    /// Wait for the detection model path. Calls `on_progress(downloaded,
    /// total)` while a download is in progress. Returns early if `cancel` is
    /// set.
    pub fn wait_for_model(
        &self,
        on_progress: &dyn Fn(u64, u64),
        cancel: &CancelToken,
    ) -> Result<PathBuf, String> {
        self.detect.wait(on_progress, cancel)
    }
}

impl ModelSlot {
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            ready: Condvar::new(),
            progress: Arc::new(Mutex::new((0, 0))),
        }
    }

    fn resolve(&self, name: &str, url: &str) {
        let progress_mutex = self.progress.clone();
        let result = model_resolver::resolve(
            name,
            url,
            None,
            Some(Box::new(move |downloaded, total| {
                *progress_mutex.lock().unwrap() = (downloaded, total);
            })),
        );
        *self.result.lock().unwrap() = Some(result.map_err(|e| e.to_string()));
        self.ready.notify_all();
    }

    fn wait(
        &self,
        on_progress: &dyn Fn(u64, u64),
        cancel: &CancelToken,
    ) -> Result<PathBuf, String> {
        let mut guard = self.result.lock().unwrap();
        loop {
            if cancel.is_cancelled() {
                return Err("Cancelled".into());
            }
            if let Some(ref result) = *guard {
                return result.clone();
            }
            // Forward download progress while waiting
            if let Ok(progress) = self.progress.try_lock() {
                let (dl, total) = *progress;
                if total > 0 {
                    on_progress(dl, total);
                }
            }
            let (new_guard, _) = self
                .ready
                .wait_timeout(guard, Duration::from_millis(100))
                .unwrap();
            guard = new_guard;
        }
    }
}
