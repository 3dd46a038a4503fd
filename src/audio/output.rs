use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::thread::JoinHandle;
use std::time::Duration;

use super::sink::decode_source;
use super::thread::spawn_device_thread;
use super::types::{DeviceCmd, OutputError, OutputEvent, OutputHandle, PositionHandle};

/// The audio device as the playback session sees it.
///
/// One live handle at a time, created per load and always disposed before
/// the next one. Completion notifications arrive out of band (see
/// [`RodioOutput::start`]) and must be fed back into the session on the
/// control thread.
pub trait AudioOutput {
    fn load(&mut self, path: &Path) -> Result<OutputHandle, OutputError>;
    fn play(&mut self, handle: OutputHandle);
    fn pause(&mut self, handle: OutputHandle);
    fn seek(&mut self, handle: OutputHandle, position: Duration);
    fn set_volume(&mut self, handle: OutputHandle, volume: f32);
    /// Elapsed playback time of the handle; `Disposed` when the handle is
    /// not the device's live one.
    fn position(&self, handle: OutputHandle) -> Result<Duration, OutputError>;
    fn dispose(&mut self, handle: OutputHandle);
}

/// Production output backed by a dedicated `rodio` device thread.
pub struct RodioOutput {
    tx: Sender<DeviceCmd>,
    position: PositionHandle,
    next_id: u64,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl RodioOutput {
    /// Spawn the device thread and hand back the output plus the receiver
    /// for its completion events.
    pub fn start() -> Result<(Self, Receiver<OutputEvent>), OutputError> {
        let (tx, rx) = mpsc::channel::<DeviceCmd>();
        let (event_tx, event_rx) = mpsc::channel::<OutputEvent>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), OutputError>>(1);
        let position: PositionHandle = PositionHandle::default();

        let join = spawn_device_thread(rx, event_tx, position.clone(), ready_tx);

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(OutputError::DeviceUnavailable(
                    "device thread exited during startup".to_string(),
                ));
            }
        }

        Ok((
            Self {
                tx,
                position,
                next_id: 0,
                join: Mutex::new(Some(join)),
            },
            event_rx,
        ))
    }

    /// Fade out any playing audio and wait for the device thread to finish.
    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.tx.send(DeviceCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl AudioOutput for RodioOutput {
    fn load(&mut self, path: &Path) -> Result<OutputHandle, OutputError> {
        // Decode on the control thread so the caller gets the error
        // synchronously; the decoded source ships to the device thread.
        let source = decode_source(path)?;
        self.next_id += 1;
        let id = self.next_id;
        self.tx
            .send(DeviceCmd::Load {
                id,
                path: path.to_path_buf(),
                source,
            })
            .map_err(|_| OutputError::DeviceUnavailable("device thread is gone".to_string()))?;
        Ok(OutputHandle(id))
    }

    fn play(&mut self, handle: OutputHandle) {
        let _ = self.tx.send(DeviceCmd::Play(handle.0));
    }

    fn pause(&mut self, handle: OutputHandle) {
        let _ = self.tx.send(DeviceCmd::Pause(handle.0));
    }

    fn seek(&mut self, handle: OutputHandle, position: Duration) {
        let _ = self.tx.send(DeviceCmd::Seek {
            id: handle.0,
            position,
        });
    }

    fn set_volume(&mut self, handle: OutputHandle, volume: f32) {
        let _ = self.tx.send(DeviceCmd::SetVolume {
            id: handle.0,
            volume,
        });
    }

    fn position(&self, handle: OutputHandle) -> Result<Duration, OutputError> {
        let Ok(info) = self.position.lock() else {
            return Err(OutputError::Disposed);
        };
        if !info.live || info.id != handle.0 {
            return Err(OutputError::Disposed);
        }
        Ok(info.accumulated + info.started_at.map_or(Duration::ZERO, |st| st.elapsed()))
    }

    fn dispose(&mut self, handle: OutputHandle) {
        let _ = self.tx.send(DeviceCmd::Dispose(handle.0));
    }
}
