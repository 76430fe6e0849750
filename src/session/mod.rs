//! Recording session lifecycle and sample persistence
//!
//! A session moves through three explicit states:
//!
//! ```text
//! Idle ──start()──► Recording ──export()──► Exported
//!                   (append-only buffer)    (receipt: path + count)
//! ```
//!
//! [`recorder`] owns the timer-driven sampling loop that feeds the session;
//! [`export`] serializes the buffered samples as a JSON array in append
//! order.

pub mod export;
pub mod recorder;

use statum::{machine, state};
use tracing::{debug, info};

use crate::input::MotionSample;
use export::{ExportError, ExportReceipt};
use std::path::Path;

#[state]
#[derive(Debug, Clone)]
pub enum SessionState {
    Idle,
    Recording,
    Exported(ExportReceipt),
}

#[machine]
#[derive(Debug)]
pub struct Session<S: SessionState> {
    // Samples in append order = chronological order
    samples: Vec<MotionSample>,
}

impl Session<Idle> {
    pub fn create() -> Self {
        Self::new(Vec::new())
    }

    pub fn start(self) -> Session<Recording> {
        info!("Session started, recording motion samples");
        self.transition()
    }
}

impl Session<Recording> {
    /// Appends one sample. Ownership of the sample passes to the session.
    pub fn record(&mut self, sample: MotionSample) {
        debug!("Recorded sample #{}", self.samples.len() + 1);
        self.samples.push(sample);
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Writes the buffered samples and finishes the session.
    pub async fn export(self, output_dir: &Path) -> Result<Session<Exported>, ExportError> {
        let receipt = export::write_samples(&self.samples, output_dir).await?;
        info!(
            "Session exported: {} samples to {}",
            receipt.samples,
            receipt.path.display()
        );
        Ok(self.transition_with(receipt))
    }
}

impl Session<Exported> {
    pub fn receipt(&self) -> Option<&ExportReceipt> {
        self.get_state_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ButtonSample, Vec3};

    fn sample(x: f32) -> MotionSample {
        MotionSample {
            timestamp: "2026-08-25T12:00:00.000Z".into(),
            pan: Vec3 { x, y: 0.0, z: 0.0 },
            roll: Vec3::default(),
            buttons: vec![ButtonSample {
                index: 0,
                pressed: false,
            }],
        }
    }

    #[test]
    fn test_session_buffers_samples_in_order() {
        let mut session = Session::create().start();
        session.record(sample(0.1));
        session.record(sample(0.2));
        session.record(sample(0.3));

        assert_eq!(session.sample_count(), 3);
    }

    #[tokio::test]
    async fn test_export_transitions_with_receipt() {
        let dir = std::env::temp_dir().join("motiontrace-session-test");
        let mut session = Session::create().start();
        session.record(sample(0.5));

        let exported = session.export(&dir).await.unwrap();
        let receipt = exported.receipt().unwrap();
        assert_eq!(receipt.samples, 1);
        assert!(receipt.path.starts_with(&dir));

        let _ = std::fs::remove_file(&receipt.path);
    }
}
