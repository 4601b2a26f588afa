//! Per-class athan playback with cached handles.
//!
//! Each sound class owns one slot that is either `Unloaded` or holds a
//! playable handle. The first trigger of a class loads and starts it; later
//! triggers rewind the cached handle. A handle that fails to replay is
//! released and loaded again once. Playback for a class is serialized by the
//! slot's lock, so two triggers never race on the same handle.

use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{AudioBackend, PlaybackHandle};
use crate::daemon::TriggerReason;
use crate::types::SoundClass;

/// Result of one playback request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum PlaybackOutcome {
    /// A fresh handle was loaded and started
    Started,
    /// The cached handle was rewound and played again
    Replayed,
    /// No sound this time; carries the error text for display
    Failed(String),
}

impl PlaybackOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, PlaybackOutcome::Failed(_))
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            PlaybackOutcome::Failed(message) => Some(message),
            _ => None,
        }
    }
}

// ============================================================================
// HandleSlot
// ============================================================================

/// Cache state for one sound class.
#[derive(Default)]
pub enum HandleSlot {
    #[default]
    Unloaded,
    Loaded(Box<dyn PlaybackHandle>),
}

impl HandleSlot {
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, HandleSlot::Loaded(_))
    }

    /// Plays `class`, moving the slot to its next state.
    fn fire(&mut self, backend: &dyn AudioBackend, class: SoundClass) -> PlaybackOutcome {
        let replayed = match self {
            HandleSlot::Loaded(handle) => Some(handle.replay()),
            HandleSlot::Unloaded => None,
        };
        match replayed {
            Some(Ok(())) => return PlaybackOutcome::Replayed,
            Some(Err(e)) => {
                warn!("Cached {} athan could not replay ({}), reloading", class, e);
                self.release();
            }
            None => {}
        }

        let mut handle = match backend.load(class) {
            Ok(handle) => handle,
            Err(e) => return PlaybackOutcome::Failed(e.to_string()),
        };
        match handle.start() {
            Ok(()) => {
                *self = HandleSlot::Loaded(handle);
                PlaybackOutcome::Started
            }
            // `handle` is dropped here, so a failed start leaves nothing cached.
            Err(e) => PlaybackOutcome::Failed(e.to_string()),
        }
    }

    /// Drops any cached handle. Returns true if one was held.
    fn release(&mut self) -> bool {
        matches!(mem::take(self), HandleSlot::Loaded(_))
    }
}

impl std::fmt::Debug for HandleSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandleSlot::Unloaded => f.write_str("Unloaded"),
            HandleSlot::Loaded(_) => f.write_str("Loaded"),
        }
    }
}

// ============================================================================
// PlaybackController
// ============================================================================

/// Plays the athan for a sound class, caching one handle per class.
///
/// `fire` blocks while loading; call it from a blocking context.
pub struct PlaybackController {
    backend: Arc<dyn AudioBackend>,
    slots: [Mutex<HandleSlot>; 2],
    attempts: AtomicU64,
}

impl PlaybackController {
    #[must_use]
    pub fn new(backend: Arc<dyn AudioBackend>) -> Self {
        Self {
            backend,
            slots: [Mutex::new(HandleSlot::Unloaded), Mutex::new(HandleSlot::Unloaded)],
            attempts: AtomicU64::new(0),
        }
    }

    /// Plays the athan for `class`.
    ///
    /// Never returns an error: failures come back as `PlaybackOutcome::Failed`
    /// with the class's slot left `Unloaded`.
    pub fn fire(&self, class: SoundClass, reason: TriggerReason) -> PlaybackOutcome {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Playback attempt {} for {} athan ({})", attempt, class, reason);

        let outcome = self.lock_slot(class).fire(self.backend.as_ref(), class);

        match &outcome {
            PlaybackOutcome::Started => info!("{} athan started ({})", class, reason),
            PlaybackOutcome::Replayed => info!("{} athan replayed ({})", class, reason),
            PlaybackOutcome::Failed(e) => {
                warn!("{} athan playback failed ({}): {}", class, reason, e)
            }
        }
        outcome
    }

    /// Returns true if a handle for `class` is cached.
    #[must_use]
    pub fn is_loaded(&self, class: SoundClass) -> bool {
        self.lock_slot(class).is_loaded()
    }

    /// Number of playback requests so far.
    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Releases every cached handle. Safe to call more than once.
    pub fn release_all(&self) {
        for class in SoundClass::ALL {
            if self.lock_slot(class).release() {
                debug!("Released {} athan handle", class);
            }
        }
    }

    fn lock_slot(&self, class: SoundClass) -> MutexGuard<'_, HandleSlot> {
        self.slots[class.slot()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("attempts", &self.attempts())
            .finish_non_exhaustive()
    }
}
