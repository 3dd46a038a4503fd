use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::warn;
use rodio::{OutputStreamBuilder, Sink};

use super::sink::{create_sink, create_sink_at};
use super::types::{DeviceCmd, OutputError, OutputEvent, OutputHandle, PositionHandle};

/// The one live sink, together with its elapsed-time accounting.
struct LiveSink {
    id: u64,
    sink: Sink,
    path: std::path::PathBuf,
    paused: bool,
    accumulated: Duration,
    started_at: Option<Instant>,
    finished: bool,
}

/// Mirror the live sink's timing into the shared position info.
fn publish(position: &PositionHandle, live: Option<&LiveSink>) {
    if let Ok(mut info) = position.lock() {
        match live {
            Some(s) => {
                info.id = s.id;
                info.live = true;
                info.accumulated = s.accumulated;
                info.started_at = s.started_at;
            }
            None => {
                info.live = false;
                info.started_at = None;
            }
        }
    }
}

pub(super) fn spawn_device_thread(
    rx: Receiver<DeviceCmd>,
    event_tx: Sender<OutputEvent>,
    position: PositionHandle,
    ready_tx: SyncSender<Result<(), OutputError>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                let _ = ready_tx.send(Err(OutputError::DeviceUnavailable(e.to_string())));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in
        // debugging, but noisy for a TUI app.
        let mut stream = stream;
        stream.log_on_drop(false);
        let _ = ready_tx.send(Ok(()));

        let mut live: Option<LiveSink> = None;

        loop {
            match rx.recv_timeout(Duration::from_millis(200)) {
                Ok(cmd) => match cmd {
                    DeviceCmd::Load { id, path, source } => {
                        // The session releases its old handle before loading a
                        // new one, so a live sink here is a leftover to stop.
                        if let Some(old) = live.take() {
                            old.sink.stop();
                        }
                        let sink = create_sink(&stream, source);
                        live = Some(LiveSink {
                            id,
                            sink,
                            path,
                            paused: true,
                            accumulated: Duration::ZERO,
                            started_at: None,
                            finished: false,
                        });
                        publish(&position, live.as_ref());
                    }

                    DeviceCmd::Play(id) => {
                        if let Some(s) = live.as_mut().filter(|s| s.id == id) {
                            s.sink.play();
                            if s.paused {
                                s.paused = false;
                                s.started_at = Some(Instant::now());
                            }
                            publish(&position, Some(&*s));
                        }
                    }

                    DeviceCmd::Pause(id) => {
                        if let Some(s) = live.as_mut().filter(|s| s.id == id) {
                            s.sink.pause();
                            if !s.paused {
                                if let Some(st) = s.started_at.take() {
                                    s.accumulated += st.elapsed();
                                }
                                s.paused = true;
                            }
                            publish(&position, Some(&*s));
                        }
                    }

                    DeviceCmd::Seek { id, position: target } => {
                        if let Some(s) = live.as_mut().filter(|s| s.id == id) {
                            // Build the replacement sink first and only swap on
                            // success, so a vanished file does not kill audio.
                            match create_sink_at(&stream, &s.path, target) {
                                Ok(new_sink) => {
                                    new_sink.set_volume(s.sink.volume());
                                    s.sink.stop();
                                    if !s.paused {
                                        new_sink.play();
                                        s.started_at = Some(Instant::now());
                                    } else {
                                        s.started_at = None;
                                    }
                                    s.sink = new_sink;
                                    s.accumulated = target;
                                    s.finished = false;
                                    publish(&position, Some(&*s));
                                }
                                Err(e) => {
                                    warn!("seek failed: {e}");
                                }
                            }
                        }
                    }

                    DeviceCmd::SetVolume { id, volume } => {
                        if let Some(s) = live.as_ref().filter(|s| s.id == id) {
                            s.sink.set_volume(volume.clamp(0.0, 1.0));
                        }
                    }

                    DeviceCmd::Dispose(id) => {
                        if live.as_ref().is_some_and(|s| s.id == id) {
                            if let Some(s) = live.take() {
                                s.sink.stop();
                            }
                            publish(&position, None);
                        }
                    }

                    DeviceCmd::Quit { fade_out_ms } => {
                        if let Some(s) = live.take() {
                            if !s.paused {
                                fade_out_sink(&s.sink, fade_out_ms);
                            }
                            s.sink.stop();
                        }
                        publish(&position, None);
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => {
                    // Periodic check for natural end of track. The sink entry
                    // stays around until the session disposes the handle, so
                    // the event fires at most once per load.
                    if let Some(s) = live.as_mut() {
                        if !s.paused && !s.finished && s.sink.empty() {
                            s.finished = true;
                            if let Some(st) = s.started_at.take() {
                                s.accumulated += st.elapsed();
                            }
                            publish(&position, Some(&*s));
                            if event_tx.send(OutputEvent::Finished(OutputHandle(s.id))).is_err() {
                                break;
                            }
                        }
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

fn fade_out_sink(sink: &Sink, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    let start = sink.volume();
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(start * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
