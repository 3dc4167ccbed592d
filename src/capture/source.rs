//! Thread-safe frame source with serialized capture

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Mutex;
use std::thread::{self, ThreadId};

use image::GrayImage;

use super::backend::{CaptureBackend, XcapBackend};
use super::region::CaptureRegion;
use crate::error::{AgentError, AgentResult};

type BackendFactory = Box<dyn Fn() -> AgentResult<Box<dyn CaptureBackend>> + Send + Sync>;

/// Grabs grayscale snapshots of a fixed region on demand.
///
/// Capture handles are opened lazily, one per calling thread, and kept in an
/// arena keyed by thread id. All captures run under the arena lock, so no
/// two frame grabs ever overlap in time regardless of which threads request
/// them. Handles are thread-confined; only the lock is shared.
pub struct FrameSource {
    region: CaptureRegion,
    handles: Mutex<HashMap<ThreadId, Box<dyn CaptureBackend>>>,
    factory: BackendFactory,
}

impl FrameSource {
    /// A source backed by the primary display.
    pub fn new(region: CaptureRegion) -> Self {
        Self::with_backend_factory(region, || {
            Ok(Box::new(XcapBackend::open()?) as Box<dyn CaptureBackend>)
        })
    }

    /// A source with a custom acquisition backend.
    pub fn with_backend_factory<F>(region: CaptureRegion, factory: F) -> Self
    where
        F: Fn() -> AgentResult<Box<dyn CaptureBackend>> + Send + Sync + 'static,
    {
        Self {
            region,
            handles: Mutex::new(HashMap::new()),
            factory: Box::new(factory),
        }
    }

    pub fn region(&self) -> &CaptureRegion {
        &self.region
    }

    /// Capture one frame of the region. Never returns a partial frame.
    pub fn grab(&self) -> AgentResult<GrayImage> {
        let mut handles = self.lock_handles()?;

        let backend = match handles.entry(thread::current().id()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert((self.factory)()?),
        };

        backend.capture(&self.region)
    }

    /// Release the calling thread's capture handle. Idempotent; a no-op on
    /// threads that never captured.
    pub fn cleanup(&self) {
        if let Ok(mut handles) = self.handles.lock() {
            handles.remove(&thread::current().id());
        }
    }

    /// Release every held capture handle. The decision loop calls this when
    /// a run ends, since its captures land on varying worker threads.
    pub fn release_all(&self) {
        if let Ok(mut handles) = self.handles.lock() {
            handles.clear();
        }
    }

    fn lock_handles(
        &self,
    ) -> AgentResult<std::sync::MutexGuard<'_, HashMap<ThreadId, Box<dyn CaptureBackend>>>> {
        self.handles
            .lock()
            .map_err(|_| AgentError::CaptureUnavailable {
                description: "capture arena lock poisoned".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    fn test_region() -> CaptureRegion {
        CaptureRegion::new(0, 0, 16, 16)
    }

    /// Stub backend that flags any two captures overlapping in time.
    struct InstrumentedBackend {
        in_flight: Arc<AtomicUsize>,
        overlapped: Arc<AtomicBool>,
    }

    impl CaptureBackend for InstrumentedBackend {
        fn capture(&mut self, region: &CaptureRegion) -> AgentResult<GrayImage> {
            if self.in_flight.fetch_add(1, Ordering::SeqCst) != 0 {
                self.overlapped.store(true, Ordering::SeqCst);
            }
            thread::sleep(Duration::from_millis(2));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(GrayImage::new(region.width, region.height))
        }
    }

    #[test]
    fn test_concurrent_grabs_never_overlap() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let overlapped = Arc::new(AtomicBool::new(false));

        let source = {
            let in_flight = Arc::clone(&in_flight);
            let overlapped = Arc::clone(&overlapped);
            Arc::new(FrameSource::with_backend_factory(test_region(), move || {
                Ok(Box::new(InstrumentedBackend {
                    in_flight: Arc::clone(&in_flight),
                    overlapped: Arc::clone(&overlapped),
                }) as Box<dyn CaptureBackend>)
            }))
        };

        let mut workers = Vec::new();
        for _ in 0..4 {
            let source = Arc::clone(&source);
            workers.push(thread::spawn(move || {
                for _ in 0..10 {
                    source.grab().expect("grab failed");
                }
            }));
        }
        for worker in workers {
            worker.join().expect("worker panicked");
        }

        assert!(
            !overlapped.load(Ordering::SeqCst),
            "captures overlapped in time"
        );
    }

    #[test]
    fn test_one_handle_per_thread() {
        let opened = Arc::new(AtomicUsize::new(0));

        let source = {
            let opened = Arc::clone(&opened);
            Arc::new(FrameSource::with_backend_factory(test_region(), move || {
                let in_flight = Arc::new(AtomicUsize::new(0));
                let overlapped = Arc::new(AtomicBool::new(false));
                opened.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(InstrumentedBackend {
                    in_flight,
                    overlapped,
                }) as Box<dyn CaptureBackend>)
            }))
        };

        // Repeated grabs on one thread reuse the same handle
        source.grab().unwrap();
        source.grab().unwrap();
        assert_eq!(opened.load(Ordering::SeqCst), 1);

        // A second thread opens its own handle
        {
            let source = Arc::clone(&source);
            thread::spawn(move || source.grab().unwrap())
                .join()
                .unwrap();
        }
        assert_eq!(opened.load(Ordering::SeqCst), 2);

        // After cleanup the calling thread re-opens on the next grab
        source.cleanup();
        source.cleanup(); // idempotent
        source.grab().unwrap();
        assert_eq!(opened.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_release_all_drops_every_handle() {
        let opened = Arc::new(AtomicUsize::new(0));

        let source = {
            let opened = Arc::clone(&opened);
            FrameSource::with_backend_factory(test_region(), move || {
                opened.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(InstrumentedBackend {
                    in_flight: Arc::new(AtomicUsize::new(0)),
                    overlapped: Arc::new(AtomicBool::new(false)),
                }) as Box<dyn CaptureBackend>)
            })
        };

        source.grab().unwrap();
        source.release_all();
        source.grab().unwrap();
        assert_eq!(opened.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_factory_error_propagates() {
        let source = FrameSource::with_backend_factory(test_region(), || {
            Err(AgentError::CaptureUnavailable {
                description: "no display".to_string(),
            })
        });

        assert!(matches!(
            source.grab(),
            Err(AgentError::CaptureUnavailable { .. })
        ));
    }
}
