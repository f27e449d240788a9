//! Test double per codec e failure log

use crate::compressor::failure_log::FailureLog;
use crate::error::{CompressError, Result};
use crate::image_processor::ImageCodec;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// Codec that records every call and fails for selected inputs
#[derive(Default)]
pub struct RecordingCodec {
    pub calls: Mutex<Vec<(PathBuf, PathBuf, u8)>>,
    fail_on: HashSet<PathBuf>,
    delay: Option<Duration>,
}

impl RecordingCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on<I: IntoIterator<Item = PathBuf>>(inputs: I) -> Self {
        Self {
            fail_on: inputs.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(PathBuf, PathBuf, u8)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ImageCodec for RecordingCodec {
    fn open_and_save(&self, input: &Path, output: &Path, quality: u8) -> Result<()> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.calls
            .lock()
            .unwrap()
            .push((input.to_path_buf(), output.to_path_buf(), quality));

        if self.fail_on.contains(input) {
            return Err(CompressError::UnsupportedFormat(format!("cannot decode {}", input.display())));
        }
        Ok(())
    }
}

/// Failure log that keeps every entry in memory
#[derive(Default)]
pub struct RecordingFailureLog {
    pub entries: Mutex<Vec<(PathBuf, String)>>,
}

impl RecordingFailureLog {
    pub fn entries(&self) -> Vec<(PathBuf, String)> {
        self.entries.lock().unwrap().clone()
    }
}

impl FailureLog for RecordingFailureLog {
    fn record(&self, path: &Path, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((path.to_path_buf(), message.to_string()));
    }
}

/// `count` fake input paths spread over a few source folders
pub fn fake_inputs(count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| PathBuf::from(format!("/src/{}/img_{:03}.jpg", i % 3, i)))
        .collect()
}
