//! # Compression Worker Module
//!
//! Esegue un `BatchRun` su un singolo worker in background, separato dal
//! thread del chiamante, e inoltra gli eventi di progresso su un canale.
//!
//! ## Modello:
//! - Un solo thread per run (`tokio::task::spawn_blocking`), file elaborati
//!   in sequenza
//! - Eventi su `mpsc::unbounded_channel`, consumabili uno alla volta o come
//!   `futures::Stream`
//! - Cancellazione cooperativa via `broadcast`, controllata tra un file e
//!   l'altro
//! - Se il chiamante smette di ascoltare o droppa l'handle il run prosegue
//!   fino alla fine

use crate::compressor::batch_compressor::BatchRun;
use crate::error::{CompressError, Result};
use crate::progress::{BatchReport, ProgressEvent};
use futures::Stream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::debug;

/// Clears the shared running flag when the worker exits, panics included
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Spawns compression runs on a background worker
pub struct CompressionWorker;

impl CompressionWorker {
    /// Start `run` in the background
    pub fn spawn(run: BatchRun) -> CompressionHandle {
        Self::spawn_tracked(run, Arc::new(AtomicBool::new(true)))
    }

    /// Start `run`, clearing `running` once the worker exits.
    /// The caller is expected to have set the flag already.
    pub fn spawn_tracked(run: BatchRun, running: Arc<AtomicBool>) -> CompressionHandle {
        let (stop_sender, stop_receiver) = broadcast::channel(1);
        let (event_sender, events) = mpsc::unbounded_channel();
        let total = run.total();
        let run = run.with_cancellation(stop_receiver);
        let guard = RunningGuard(Arc::clone(&running));

        let task = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            let mut final_report = BatchReport::default();

            for event in run {
                if let ProgressEvent::Done(ref report) = event {
                    final_report = report.clone();
                }
                if event_sender.send(event).is_err() {
                    debug!("Progress receiver dropped, continuing without progress updates");
                }
            }

            final_report
        });

        CompressionHandle {
            events,
            stop_sender,
            task,
            total,
            running,
        }
    }
}

/// Caller-side end of a background compression run
pub struct CompressionHandle {
    events: mpsc::UnboundedReceiver<ProgressEvent>,
    stop_sender: broadcast::Sender<()>,
    task: JoinHandle<BatchReport>,
    total: usize,
    running: Arc<AtomicBool>,
}

impl CompressionHandle {
    /// Number of inputs in this run
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Next progress event; `None` once the run is over and drained
    pub async fn next_event(&mut self) -> Option<ProgressEvent> {
        self.events.recv().await
    }

    /// Progress events as a stream, ending after `ProgressEvent::Done`
    pub fn events(&mut self) -> impl Stream<Item = ProgressEvent> + '_ {
        futures::stream::unfold(&mut self.events, |events| async move {
            events.recv().await.map(|event| (event, events))
        })
    }

    /// Ask the worker to stop before the next file
    pub fn cancel(&self) {
        debug!("Requesting compression cancellation");
        let _ = self.stop_sender.send(());
    }

    /// A cloneable sender that cancels this run, for use from other tasks
    pub fn stop_sender(&self) -> broadcast::Sender<()> {
        self.stop_sender.clone()
    }

    /// Wait for the worker and return the final report
    pub async fn join(self) -> Result<BatchReport> {
        self.task
            .await
            .map_err(|e| CompressError::Worker(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressor::batch_compressor::BatchCompressor;
    use crate::compressor::test_mocks::{fake_inputs, RecordingCodec, RecordingFailureLog};
    use crate::config::Config;
    use futures::StreamExt;
    use std::path::Path;
    use std::time::Duration;

    fn compressor(codec: RecordingCodec) -> (BatchCompressor, Arc<RecordingCodec>) {
        let codec = Arc::new(codec);
        let compressor =
            BatchCompressor::with_collaborators(codec.clone(), Arc::new(RecordingFailureLog::default()));
        (compressor, codec)
    }

    #[tokio::test]
    async fn test_events_delivered_in_order() {
        let (compressor, _) = compressor(RecordingCodec::new());
        let run = compressor.compress(fake_inputs(21), Path::new("/out"), &Config::default());
        let mut handle = CompressionWorker::spawn(run);
        assert_eq!(handle.total(), 21);

        let mut percents = Vec::new();
        let mut done = None;
        while let Some(event) = handle.next_event().await {
            match event {
                ProgressEvent::Batch(p) => percents.push(p.percent),
                ProgressEvent::Done(report) => done = Some(report),
            }
        }

        assert_eq!(percents, vec![47, 95, 100]);
        let done = done.expect("done event");
        assert_eq!(done.processed(), 21);

        let report = tokio_test::assert_ok!(handle.join().await);
        assert_eq!(report.outputs, done.outputs);
    }

    #[tokio::test]
    async fn test_events_as_stream() {
        let (compressor, _) = compressor(RecordingCodec::new());
        let run = compressor.compress(fake_inputs(10), Path::new("/out"), &Config::default());
        let mut handle = CompressionWorker::spawn(run);

        let events: Vec<_> = handle.events().collect().await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ProgressEvent::Batch(p) if p.percent == 100));
        assert!(matches!(events[1], ProgressEvent::Done(_)));

        handle.join().await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_stops_before_next_file() {
        let (compressor, codec) = compressor(RecordingCodec::with_delay(Duration::from_millis(5)));
        let run = compressor.compress(fake_inputs(200), Path::new("/out"), &Config::default());
        let mut handle = CompressionWorker::spawn(run);

        match handle.next_event().await {
            Some(ProgressEvent::Batch(p)) => assert_eq!(p.completed, 10),
            other => panic!("unexpected event {:?}", other),
        }
        handle.cancel();

        let report = handle.join().await.unwrap();
        assert!(report.cancelled);
        assert!(report.processed() < 200);
        assert_eq!(codec.calls().len(), report.processed());
    }

    #[tokio::test]
    async fn test_running_flag_cleared_on_exit() {
        let (compressor, _) = compressor(RecordingCodec::new());
        let running = Arc::new(AtomicBool::new(true));
        let run = compressor.compress(fake_inputs(3), Path::new("/out"), &Config::default());
        let handle = CompressionWorker::spawn_tracked(run, Arc::clone(&running));
        assert_eq!(handle.total(), 3);

        handle.join().await.unwrap();
        assert!(!running.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_dropped_handle_runs_to_completion() {
        let (compressor, codec) = compressor(RecordingCodec::new());
        let running = Arc::new(AtomicBool::new(true));
        let run = compressor.compress(fake_inputs(30), Path::new("/out"), &Config::default());
        drop(CompressionWorker::spawn_tracked(run, Arc::clone(&running)));

        for _ in 0..200 {
            if !running.load(Ordering::SeqCst) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!running.load(Ordering::SeqCst));
        assert_eq!(codec.calls().len(), 30);
    }
}
