//! Athan playback.
//!
//! This module provides:
//!
//! - Class-keyed asset lookup (`athan.mp3`, `athanFajr.mp3`)
//! - A rodio backend that owns the output device
//! - `PlaybackController`, which caches one handle per sound class
//! - Graceful degradation when audio is unavailable
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  PlaybackController  │ ← fire(class, reason)
//! └──────────┬───────────┘
//!            │ HandleSlot per class
//!            ▼
//! ┌──────────────────────┐     ┌──────────────────┐
//! │    AudioBackend      │────▶│   SoundAssets    │
//! │ (rodio/silent/mock)  │     │  (sounds dir)    │
//! └──────────────────────┘     └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use athan::daemon::TriggerReason;
//! use athan::sound::{PlaybackController, RodioBackend, SoundAssets};
//! use athan::types::SoundClass;
//!
//! let backend = RodioBackend::new(SoundAssets::new("/usr/share/athan"));
//! let controller = PlaybackController::new(Arc::new(backend));
//! let outcome = controller.fire(SoundClass::Fajr, TriggerReason::ManualButton);
//! println!("{:?}", outcome);
//! controller.release_all();
//! ```

mod controller;
mod error;
mod player;
mod source;

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::debug;

pub use controller::{HandleSlot, PlaybackController, PlaybackOutcome};
pub use error::SoundError;
pub use player::{try_create_backend, RodioBackend};
pub use source::SoundAssets;

use crate::types::SoundClass;

/// Produces playable handles for a sound class.
pub trait AudioBackend: Send + Sync {
    /// Loads the recording for `class`.
    ///
    /// # Errors
    ///
    /// Returns an error if the device or the asset is unavailable.
    fn load(&self, class: SoundClass) -> Result<Box<dyn PlaybackHandle>, SoundError>;
}

/// A loaded recording. Dropping it releases the underlying resources.
pub trait PlaybackHandle: Send {
    /// Starts playback from the beginning. Non-blocking.
    ///
    /// # Errors
    ///
    /// Returns `StartFailed` if the recording cannot be played.
    fn start(&mut self) -> Result<(), SoundError>;

    /// Rewinds to the beginning and plays again. Non-blocking.
    ///
    /// # Errors
    ///
    /// Returns `ReplayFailed` if the cached recording is no longer usable.
    fn replay(&mut self) -> Result<(), SoundError>;
}

// ============================================================================
// SilentBackend
// ============================================================================

/// Backend used with `--no-sound`: every playback succeeds without output.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentBackend;

impl AudioBackend for SilentBackend {
    fn load(&self, class: SoundClass) -> Result<Box<dyn PlaybackHandle>, SoundError> {
        Ok(Box::new(SilentHandle { class }))
    }
}

struct SilentHandle {
    class: SoundClass,
}

impl PlaybackHandle for SilentHandle {
    fn start(&mut self) -> Result<(), SoundError> {
        debug!("Sound playback disabled, skipping {} athan", self.class);
        Ok(())
    }

    fn replay(&mut self) -> Result<(), SoundError> {
        self.start()
    }
}

// ============================================================================
// MockAudioBackend
// ============================================================================

#[derive(Debug, Default)]
struct MockState {
    load_calls: Mutex<Vec<SoundClass>>,
    starts: AtomicUsize,
    replays: AtomicUsize,
    releases: AtomicUsize,
    live: AtomicUsize,
    fail_load: AtomicBool,
    fail_start: AtomicBool,
    fail_replay: AtomicBool,
    load_delay_ms: AtomicU64,
}

/// Mock audio backend for testing.
#[derive(Debug, Default)]
pub struct MockAudioBackend {
    state: Arc<MockState>,
}

impl MockAudioBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_load(&self, fail: bool) {
        self.state.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_start(&self, fail: bool) {
        self.state.fail_start.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_replay(&self, fail: bool) {
        self.state.fail_replay.store(fail, Ordering::SeqCst);
    }

    pub fn set_load_delay_ms(&self, delay_ms: u64) {
        self.state.load_delay_ms.store(delay_ms, Ordering::SeqCst);
    }

    #[must_use]
    pub fn load_calls(&self) -> Vec<SoundClass> {
        self.state.load_calls.lock().unwrap().clone()
    }

    #[must_use]
    pub fn start_count(&self) -> usize {
        self.state.starts.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn replay_count(&self) -> usize {
        self.state.replays.load(Ordering::SeqCst)
    }

    /// Number of handles dropped so far.
    #[must_use]
    pub fn release_count(&self) -> usize {
        self.state.releases.load(Ordering::SeqCst)
    }

    /// Number of handles currently alive.
    #[must_use]
    pub fn live_handles(&self) -> usize {
        self.state.live.load(Ordering::SeqCst)
    }
}

impl AudioBackend for MockAudioBackend {
    fn load(&self, class: SoundClass) -> Result<Box<dyn PlaybackHandle>, SoundError> {
        let delay = self.state.load_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }
        self.state.load_calls.lock().unwrap().push(class);
        if self.state.fail_load.load(Ordering::SeqCst) {
            return Err(SoundError::AssetNotFound(class.asset_file_name().to_string()));
        }
        self.state.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockHandle {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockHandle {
    state: Arc<MockState>,
}

impl PlaybackHandle for MockHandle {
    fn start(&mut self) -> Result<(), SoundError> {
        if self.state.fail_start.load(Ordering::SeqCst) {
            return Err(SoundError::StartFailed("Mock failure".to_string()));
        }
        self.state.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn replay(&mut self) -> Result<(), SoundError> {
        if self.state.fail_replay.load(Ordering::SeqCst) {
            return Err(SoundError::ReplayFailed("Mock failure".to_string()));
        }
        self.state.replays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.state.releases.fetch_add(1, Ordering::SeqCst);
        self.state.live.fetch_sub(1, Ordering::SeqCst);
    }
}
