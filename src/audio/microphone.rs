use crate::error::{DeviceError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::backend::{AudioBackend, AudioBackendConfig, AudioFrame};

/// Microphone capture backend over the host's default input device.
///
/// cpal streams are not `Send`, so the stream lives on a dedicated worker
/// thread; samples flow through a shared buffer that the worker drains
/// into timed frames.
pub struct MicrophoneBackend {
    config: AudioBackendConfig,
    capturing: Arc<AtomicBool>,
    worker: Option<std::thread::JoinHandle<()>>,
}

impl MicrophoneBackend {
    pub fn new(config: AudioBackendConfig) -> Self {
        Self {
            config,
            capturing: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }
}

#[async_trait::async_trait]
impl AudioBackend for MicrophoneBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        let (tx, rx) = mpsc::channel(64);
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();

        let capturing = Arc::clone(&self.capturing);
        capturing.store(true, Ordering::SeqCst);

        let target_rate = self.config.sample_rate;
        let frame_ms = self.config.buffer_duration_ms;

        let worker = std::thread::spawn(move || {
            run_capture(target_rate, frame_ms, capturing, tx, ready_tx);
        });

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.worker = Some(worker);
                info!("Microphone capture started");
                Ok(rx)
            }
            Ok(Err(cause)) => {
                self.capturing.store(false, Ordering::SeqCst);
                let _ = worker.join();
                Err(cause.into())
            }
            Err(_) => {
                self.capturing.store(false, Ordering::SeqCst);
                let _ = worker.join();
                Err(DeviceError::Unavailable.into())
            }
        }
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing.store(false, Ordering::SeqCst);

        if let Some(worker) = self.worker.take() {
            let joined = tokio::task::spawn_blocking(move || worker.join()).await;
            if !matches!(joined, Ok(Ok(()))) {
                error!("Microphone worker did not shut down cleanly");
            }
        }

        info!("Microphone released");
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "microphone"
    }
}

/// Acquire the input device and pump frames until `capturing` clears.
///
/// The acquisition outcome is reported once through `ready_tx`; the stream
/// is dropped (releasing the device) before the thread exits.
fn run_capture(
    target_rate: u32,
    frame_ms: u64,
    capturing: Arc<AtomicBool>,
    tx: mpsc::Sender<AudioFrame>,
    ready_tx: std::sync::mpsc::Sender<std::result::Result<(), DeviceError>>,
) {
    let host = cpal::default_host();

    let Some(device) = host.default_input_device() else {
        warn!("No input device found");
        let _ = ready_tx.send(Err(DeviceError::Unavailable));
        return;
    };

    let supported = match device.default_input_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("No supported input config: {}", e);
            let _ = ready_tx.send(Err(DeviceError::Unsupported));
            return;
        }
    };

    let stream_config = supported.config();
    let native_rate = stream_config.sample_rate;
    let native_channels = stream_config.channels as usize;

    // Integer decimation toward the target rate; the frames report the
    // rate actually produced.
    let factor = (native_rate / target_rate).max(1) as usize;
    let actual_rate = native_rate / factor as u32;

    info!(
        "Input device: native {}Hz {}ch, producing {}Hz mono",
        native_rate, native_channels, actual_rate
    );

    let buffer: Arc<Mutex<Vec<i16>>> = Arc::new(Mutex::new(Vec::new()));
    let callback_buffer = Arc::clone(&buffer);

    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => device.build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let mut buf = callback_buffer.lock().unwrap();
                for (i, chunk) in data.chunks(native_channels).enumerate() {
                    if i % factor == 0 {
                        let mono = chunk.iter().sum::<f32>() / native_channels as f32;
                        buf.push((mono.clamp(-1.0, 1.0) * i16::MAX as f32) as i16);
                    }
                }
            },
            |err| error!("Input stream error: {}", err),
            None,
        ),
        cpal::SampleFormat::I16 => device.build_input_stream(
            &stream_config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let mut buf = callback_buffer.lock().unwrap();
                for (i, chunk) in data.chunks(native_channels).enumerate() {
                    if i % factor == 0 {
                        let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                        buf.push((sum / native_channels as i32) as i16);
                    }
                }
            },
            |err| error!("Input stream error: {}", err),
            None,
        ),
        other => {
            warn!("Unsupported sample format: {:?}", other);
            let _ = ready_tx.send(Err(DeviceError::Unsupported));
            return;
        }
    };

    let stream = match stream {
        Ok(s) => s,
        Err(e) => {
            let cause = match &e {
                cpal::BuildStreamError::DeviceNotAvailable => DeviceError::Unavailable,
                cpal::BuildStreamError::StreamConfigNotSupported => DeviceError::Unsupported,
                other if other.to_string().to_lowercase().contains("denied") => {
                    DeviceError::PermissionDenied
                }
                _ => DeviceError::Unavailable,
            };
            warn!("Failed to open input stream: {}", e);
            let _ = ready_tx.send(Err(cause));
            return;
        }
    };

    if let Err(e) = stream.play() {
        warn!("Failed to start input stream: {}", e);
        let _ = ready_tx.send(Err(DeviceError::Unavailable));
        return;
    }

    let _ = ready_tx.send(Ok(()));

    let mut samples_sent: u64 = 0;

    while capturing.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(frame_ms));

        let samples: Vec<i16> = {
            let mut buf = buffer.lock().unwrap();
            buf.drain(..).collect()
        };

        if samples.is_empty() {
            continue;
        }

        let timestamp_ms = samples_sent * 1000 / actual_rate as u64;
        samples_sent += samples.len() as u64;

        let frame = AudioFrame {
            samples,
            sample_rate: actual_rate,
            channels: 1,
            timestamp_ms,
        };

        if tx.blocking_send(frame).is_err() {
            break;
        }
    }

    // Dropping the stream releases the device.
    drop(stream);
}
