use {
    crate::{buffer::AudioBuffer, error::AudioError},
    libpulse_binding::{
        callbacks::ListResult,
        context::{Context, FlagSet, State},
        def::BufferAttr,
        mainloop::standard::{IterateResult, Mainloop},
        operation::State as OperationState,
        sample::{Format, Spec},
        stream::Direction,
    },
    libpulse_simple_binding::Simple,
    std::{
        cell::RefCell,
        rc::Rc,
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
            mpsc,
        },
        thread::JoinHandle,
    },
};

/// Hard ceiling on a single recording, in seconds.
pub const MAX_CLIP_SECS: usize = 30;

// samples per read, per channel (100ms at 16kHz)
const READ_CHUNK_FRAMES: usize = 1600;

// number of mainloop iterations to wait for the server during enumeration
const MAX_MAINLOOP_ITERATIONS: usize = 100;

// capture source with description
#[derive(Clone, Debug)]
pub struct CaptureDevice {
    pub name: String,
    pub description: String,
}

// capture configuration
#[derive(Clone, Debug)]
pub struct CaptureConfig {
    pub device_name: Option<String>,
    pub sample_rate: usize,
    pub channels: usize,
    pub max_duration_secs: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_name: None,
            sample_rate: 16000,
            channels: 1,
            max_duration_secs: 20,
        }
    }
}

/// Microphone capture into a bounded sample buffer.
///
/// `start` begins writing device frames into an accumulator sized for
/// `max_duration_secs` (capped at [`MAX_CLIP_SECS`]); the recording ends
/// when `stop` is called or the accumulator fills, whichever comes first.
/// `stop` is the only point where the captured buffer becomes visible.
pub struct AudioCapture {
    config: CaptureConfig,
    active: Option<ActiveRecording>,
}

struct ActiveRecording {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<Vec<i16>>,
}

impl AudioCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            active: None,
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Begin recording from the configured device.
    ///
    /// Device connection failures are reported synchronously; once this
    /// returns `Ok`, the capture thread owns the stream until `stop`.
    pub fn start(&mut self) -> Result<(), AudioError> {
        if self.active.is_some() {
            return Err(AudioError::Stream(
                "recording already in progress".to_string(),
            ));
        }

        let config = self.config.clone();
        let channels = config.channels.max(1);
        let spec = Spec {
            format: Format::S16NE,
            channels: channels as u8,
            rate: config.sample_rate as u32,
        };
        if !spec.is_valid() {
            return Err(AudioError::Stream(format!(
                "invalid capture spec: {} Hz, {} channels",
                config.sample_rate, channels
            )));
        }

        let capacity = config.max_duration_secs.min(MAX_CLIP_SECS) * config.sample_rate * channels;
        let chunk_bytes = READ_CHUNK_FRAMES * channels * 2;
        let buffer_attr = BufferAttr {
            maxlength: chunk_bytes as u32 * 16,
            tlength: u32::MAX,
            prebuf: u32::MAX,
            minreq: u32::MAX,
            fragsize: chunk_bytes as u32,
        };

        let stop = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), AudioError>>();

        let handle = std::thread::spawn({
            let stop = Arc::clone(&stop);
            move || {
                let pulse = match Simple::new(
                    None,
                    "audio",
                    Direction::Record,
                    config.device_name.as_deref(),
                    "capture",
                    &spec,
                    None,
                    Some(&buffer_attr),
                ) {
                    Ok(pulse) => {
                        let _ = ready_tx.send(Ok(()));
                        pulse
                    }
                    Err(error) => {
                        let _ = ready_tx.send(Err(AudioError::Device(format!(
                            "failed to open capture device: {error}"
                        ))));
                        return Vec::new();
                    }
                };

                let mut samples: Vec<i16> = Vec::with_capacity(capacity);
                let mut chunk = vec![0u8; chunk_bytes];
                while !stop.load(Ordering::Acquire) && samples.len() < capacity {
                    match pulse.read(&mut chunk) {
                        Ok(()) => {
                            for pair in chunk.chunks_exact(2) {
                                samples.push(i16::from_ne_bytes([pair[0], pair[1]]));
                            }
                        }
                        Err(error) => {
                            log::warn!("capture read error, stopping: {error}");
                            break;
                        }
                    }
                }
                if samples.len() >= capacity {
                    log::warn!("capture buffer full, recording stopped early");
                }
                samples.truncate(capacity);
                samples
            }
        });

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.active = Some(ActiveRecording { stop, handle });
                Ok(())
            }
            Ok(Err(error)) => {
                let _ = handle.join();
                Err(error)
            }
            Err(_) => {
                let _ = handle.join();
                Err(AudioError::Channel(
                    "capture thread exited before reporting readiness".to_string(),
                ))
            }
        }
    }

    /// Stop recording and return the captured buffer.
    ///
    /// Without an active recording this is a no-op returning an empty buffer.
    pub fn stop(&mut self) -> AudioBuffer {
        let channels = self.config.channels.max(1);
        let Some(active) = self.active.take() else {
            return AudioBuffer::empty(self.config.sample_rate, channels);
        };

        active.stop.store(true, Ordering::Release);
        let samples = match active.handle.join() {
            Ok(samples) => samples,
            Err(_) => {
                log::error!("capture thread panicked");
                Vec::new()
            }
        };

        let samples = samples.iter().map(|&s| f32::from(s) / 32768.0).collect();
        AudioBuffer::new(samples, self.config.sample_rate, channels)
    }

    /// List capture sources known to the sound server (monitors excluded).
    pub async fn list_devices() -> Result<Vec<CaptureDevice>, AudioError> {
        let join = tokio::task::spawn_blocking(|| {
            let mut mainloop = Mainloop::new()
                .ok_or_else(|| AudioError::Device("failed to create mainloop".to_string()))?;
            let mut context = Context::new(&mainloop, "audio")
                .ok_or_else(|| AudioError::Device("failed to create context".to_string()))?;
            context.connect(None, FlagSet::NOFLAGS, None).map_err(|error| {
                AudioError::Device(format!("failed to connect to sound server: {error}"))
            })?;

            let mut iterations = MAX_MAINLOOP_ITERATIONS;
            loop {
                match mainloop.iterate(true) {
                    IterateResult::Quit(_) | IterateResult::Err(_) => {
                        return Err(AudioError::Device(
                            "mainloop error while connecting".to_string(),
                        ));
                    }
                    IterateResult::Success(_) => {}
                }
                match context.get_state() {
                    State::Ready => break,
                    State::Failed | State::Terminated => {
                        return Err(AudioError::Device(
                            "sound server connection failed".to_string(),
                        ));
                    }
                    _ => {}
                }
                iterations -= 1;
                if iterations == 0 {
                    return Err(AudioError::Device(
                        "timed out waiting for sound server".to_string(),
                    ));
                }
            }

            let devices = Rc::new(RefCell::new(Vec::<CaptureDevice>::new()));
            let collected = Rc::clone(&devices);
            let op = context.introspect().get_source_info_list(move |result| {
                if let ListResult::Item(info) = result {
                    if info.monitor_of_sink.is_none() {
                        if let (Some(name), Some(description)) = (&info.name, &info.description) {
                            collected.borrow_mut().push(CaptureDevice {
                                name: name.to_string(),
                                description: description.to_string(),
                            });
                        }
                    }
                }
            });
            loop {
                match mainloop.iterate(true) {
                    IterateResult::Quit(_) | IterateResult::Err(_) => {
                        return Err(AudioError::Device(
                            "mainloop error while listing devices".to_string(),
                        ));
                    }
                    IterateResult::Success(_) => {}
                }
                match op.get_state() {
                    OperationState::Done => break,
                    OperationState::Cancelled => {
                        return Err(AudioError::Device(
                            "device enumeration cancelled".to_string(),
                        ));
                    }
                    OperationState::Running => {}
                }
            }
            let result = devices.borrow().clone();
            Ok(result)
        });

        join.await.map_err(|error| {
            AudioError::Channel(format!("device enumeration task failed: {error}"))
        })?
    }

    /// Pick a capture device, preferring names containing `preferred`.
    pub fn pick_device<'d>(
        devices: &'d [CaptureDevice],
        preferred: Option<&str>,
    ) -> Option<&'d CaptureDevice> {
        if let Some(want) = preferred {
            let want = want.to_ascii_lowercase();
            if let Some(device) = devices
                .iter()
                .find(|device| device.name.to_ascii_lowercase().contains(&want))
            {
                return Some(device);
            }
        }
        devices.first()
    }
}
