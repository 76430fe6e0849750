use std::path::PathBuf;

use chrono::Local;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::input::{normalize, AxisThresholds, DeviceRegistry, ThresholdError};
use crate::session::export::{ExportError, ExportReceipt};
use crate::session::Session;

/// Configuration for the sampling loop.
///
/// Lower intervals capture motion at a higher rate at the cost of larger
/// exports; the default matches typical human-input sampling.
#[derive(Clone, Debug)]
pub struct RecorderSettings {
    /// Polling period in milliseconds. One poll+normalize cycle runs per
    /// tick; the period must exceed the worst-case cycle duration.
    pub sample_interval_ms: u64,

    /// Deadzone magnitudes applied during normalization.
    pub thresholds: AxisThresholds,

    /// Directory the exported JSON lands in.
    pub output_dir: PathBuf,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            sample_interval_ms: 100,
            thresholds: AxisThresholds::default(),
            output_dir: PathBuf::from("."),
        }
    }
}

// Recorder errors
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("Invalid thresholds: {0}")]
    Threshold(#[from] ThresholdError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Recorder task failed: {0}")]
    TaskJoin(String),

    #[error("Session finished without an export receipt")]
    ReceiptMissing,
}

/// Handle for the timer-driven sampling task.
///
/// Spawning starts recording immediately; [`RecorderHandle::stop`] ends the
/// session and triggers the export. Stopping the timer is the sole
/// cancellation mechanism, no in-flight operation needs interrupting.
pub struct RecorderHandle {
    stop_sender: watch::Sender<bool>,
    task: JoinHandle<Result<ExportReceipt, RecorderError>>,
}

impl RecorderHandle {
    /// Validates settings and spawns the sampling loop as a tokio task.
    ///
    /// Malformed thresholds fail here, at initialization, never per tick.
    pub fn spawn(
        settings: RecorderSettings,
        registry: DeviceRegistry,
    ) -> Result<Self, RecorderError> {
        info!("Spawning recorder with settings: {:?}", settings);
        settings.thresholds.validate()?;

        let (stop_sender, stop_receiver) = watch::channel(false);
        let task = tokio::spawn(run_recorder_loop(settings, registry, stop_receiver));
        info!("Recorder task started");

        Ok(Self { stop_sender, task })
    }

    /// Stops sampling, exports the session, and returns the receipt.
    pub async fn stop(self) -> Result<ExportReceipt, RecorderError> {
        debug!("Requesting recorder stop");
        let _ = self.stop_sender.send(true);
        self.task
            .await
            .map_err(|e| RecorderError::TaskJoin(e.to_string()))?
    }
}

// One poll+normalize cycle per interval tick until the stop flag flips,
// then export. Single task; nothing here runs concurrently with itself.
async fn run_recorder_loop(
    settings: RecorderSettings,
    mut registry: DeviceRegistry,
    mut stop_receiver: watch::Receiver<bool>,
) -> Result<ExportReceipt, RecorderError> {
    let mut session = Session::create().start();

    let mut interval_timer = tokio::time::interval(tokio::time::Duration::from_millis(
        settings.sample_interval_ms,
    ));

    // Stats for periodic logging
    let mut ticks: u64 = 0;
    let mut empty_ticks: u64 = 0;
    let mut last_stats_time = Local::now();
    let stats_interval = chrono::Duration::seconds(30);

    info!(
        "Entering sampling loop with {} ms interval",
        settings.sample_interval_ms
    );
    loop {
        tokio::select! {
            _ = interval_timer.tick() => {
                registry.poll();

                // No connected device: the tick produces no sample
                match registry.primary() {
                    Some(device) => {
                        let sample = normalize(device, &settings.thresholds);
                        session.record(sample);
                    }
                    None => {
                        empty_ticks += 1;
                        debug!("No connected device, tick skipped");
                    }
                }
                ticks += 1;

                let now = Local::now();
                if now - last_stats_time > stats_interval {
                    info!(
                        "Recorder stats: {} ticks, {} samples buffered, {} empty ticks",
                        ticks,
                        session.sample_count(),
                        empty_ticks
                    );
                    last_stats_time = now;
                }
            }
            changed = stop_receiver.changed() => {
                if changed.is_err() || *stop_receiver.borrow() {
                    break;
                }
            }
        }
    }

    info!(
        "Stop requested after {} ticks, exporting {} samples",
        ticks,
        session.sample_count()
    );

    let exported = match session.export(&settings.output_dir).await {
        Ok(exported) => exported,
        Err(e) => {
            error!("Export failed: {}", e);
            return Err(e.into());
        }
    };

    exported
        .receipt()
        .cloned()
        .ok_or(RecorderError::ReceiptMissing)
}
