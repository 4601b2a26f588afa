//! Athan playback using rodio.
//!
//! `OutputStream` is not `Send`, so it lives on a dedicated audio thread for
//! the lifetime of the backend; only its `OutputStreamHandle` crosses
//! threads. The device is opened lazily on the first load and retried on the
//! next load if that fails.

use std::io::Cursor;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use super::error::SoundError;
use super::source::SoundAssets;
use super::{AudioBackend, PlaybackHandle};
use crate::types::SoundClass;

/// A live connection to the default output device.
struct AudioOutput {
    handle: OutputStreamHandle,
    /// Dropping this ends the audio thread, which drops the stream.
    _keepalive: Sender<()>,
}

impl AudioOutput {
    fn open() -> Result<Self, SoundError> {
        let (handle_tx, handle_rx) = mpsc::channel();
        let (keepalive_tx, keepalive_rx) = mpsc::channel::<()>();

        thread::Builder::new()
            .name("athan-audio".to_string())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    if handle_tx.send(Ok(handle)).is_err() {
                        return;
                    }
                    // Blocks until every sender is gone.
                    let _ = keepalive_rx.recv();
                    drop(stream);
                    debug!("Audio output stream closed");
                }
                Err(e) => {
                    let _ = handle_tx.send(Err(e.to_string()));
                }
            })
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        let handle = handle_rx
            .recv()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?
            .map_err(SoundError::DeviceNotAvailable)?;

        debug!("Audio output stream initialized");
        Ok(Self {
            handle,
            _keepalive: keepalive_tx,
        })
    }
}

/// Loads athan recordings from disk and plays them on the default device.
pub struct RodioBackend {
    assets: SoundAssets,
    output: Mutex<Option<AudioOutput>>,
}

impl RodioBackend {
    #[must_use]
    pub fn new(assets: SoundAssets) -> Self {
        Self {
            assets,
            output: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn assets(&self) -> &SoundAssets {
        &self.assets
    }

    fn stream_handle(&self) -> Result<OutputStreamHandle, SoundError> {
        let mut output = self.output.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(output) = output.as_ref() {
            return Ok(output.handle.clone());
        }
        let opened = AudioOutput::open()?;
        let handle = opened.handle.clone();
        *output = Some(opened);
        Ok(handle)
    }
}

impl AudioBackend for RodioBackend {
    fn load(&self, class: SoundClass) -> Result<Box<dyn PlaybackHandle>, SoundError> {
        let bytes: Arc<[u8]> = self.assets.read(class)?.into();
        // Reject undecodable files before a handle exists.
        decode(&bytes)?;
        let stream_handle = self.stream_handle()?;
        debug!("Loaded {} athan ({} bytes)", class, bytes.len());
        Ok(Box::new(RodioHandle {
            class,
            bytes,
            stream_handle,
            sink: None,
        }))
    }
}

impl std::fmt::Debug for RodioBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let open = self
            .output
            .lock()
            .map(|output| output.is_some())
            .unwrap_or(false);
        f.debug_struct("RodioBackend")
            .field("assets", &self.assets)
            .field("device_open", &open)
            .finish()
    }
}

fn decode(bytes: &Arc<[u8]>) -> Result<Decoder<Cursor<Arc<[u8]>>>, SoundError> {
    Decoder::new(Cursor::new(Arc::clone(bytes))).map_err(|e| SoundError::DecodeError(e.to_string()))
}

/// A cached recording bound to one sink.
///
/// Dropping the handle drops the sink, which stops playback.
struct RodioHandle {
    class: SoundClass,
    bytes: Arc<[u8]>,
    stream_handle: OutputStreamHandle,
    sink: Option<Sink>,
}

impl RodioHandle {
    fn play_from_start(&mut self) -> Result<(), String> {
        let source = decode(&self.bytes).map_err(|e| e.to_string())?;
        let sink = Sink::try_new(&self.stream_handle).map_err(|e| e.to_string())?;
        sink.append(source);
        sink.play();
        // Replacing the previous sink stops whatever it was playing.
        self.sink = Some(sink);
        Ok(())
    }
}

impl PlaybackHandle for RodioHandle {
    fn start(&mut self) -> Result<(), SoundError> {
        self.play_from_start().map_err(SoundError::StartFailed)?;
        debug!("{} athan playback started", self.class);
        Ok(())
    }

    fn replay(&mut self) -> Result<(), SoundError> {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.play_from_start().map_err(SoundError::ReplayFailed)?;
        debug!("{} athan rewound and replaying", self.class);
        Ok(())
    }
}

impl Drop for RodioHandle {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        debug!("{} athan handle released", self.class);
    }
}

/// Creates a rodio backend, or `None` when sound is turned off.
#[must_use]
pub fn try_create_backend(assets: SoundAssets, disabled: bool) -> Option<RodioBackend> {
    if disabled {
        debug!("Sound playback disabled, using silent backend");
        return None;
    }
    if !assets.check() {
        warn!(
            "Athan recordings missing from {}; playback will fail until they are added",
            assets.dir().display()
        );
    }
    Some(RodioBackend::new(assets))
}
