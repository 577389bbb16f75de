//! Typed input from the terminal
//!
//! Reads stdin line by line on a dedicated thread and forwards every
//! non-empty line as typed text.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::InputEvent;

/// Line-based stdin reader feeding the assistant
pub struct ConsoleListener {
    input_tx: mpsc::Sender<InputEvent>,
    running: Arc<AtomicBool>,
}

impl ConsoleListener {
    pub fn new(input_tx: mpsc::Sender<InputEvent>) -> Self {
        Self {
            input_tx,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawn the reader thread
    ///
    /// The thread exits at end of input, when the receiving side is gone, or
    /// on the first line read after `stop()`.
    pub fn start(&self) -> Result<(), InputError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(InputError::AlreadyRunning);
        }

        let input_tx = self.input_tx.clone();
        let running = Arc::clone(&self.running);

        thread::Builder::new()
            .name("console-input".to_string())
            .spawn(move || {
                info!("console input thread started");

                let stdin = std::io::stdin();
                if let Err(e) = read_lines(stdin.lock(), &input_tx, &running) {
                    error!(%e, "console input error");
                }

                running.store(false, Ordering::SeqCst);
                info!("console input thread stopped");
            })
            .map_err(|e| InputError::ThreadSpawn(e.to_string()))?;

        Ok(())
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Errors that can occur in the console listener
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("console listener is already running")]
    AlreadyRunning,

    #[error("failed to spawn listener thread: {0}")]
    ThreadSpawn(String),

    #[error("failed to read input: {0}")]
    Read(#[from] std::io::Error),
}

/// Forward lines until EOF, shutdown or a closed channel
fn read_lines<R: BufRead>(
    reader: R,
    input_tx: &mpsc::Sender<InputEvent>,
    running: &AtomicBool,
) -> Result<(), InputError> {
    for line in reader.lines() {
        let line = line?;
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        debug!(text, "typed input");
        if input_tx
            .blocking_send(InputEvent::Typed(text.to_string()))
            .is_err()
        {
            warn!("failed to forward typed input - channel closed?");
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_listener_creation() {
        let (tx, _rx) = mpsc::channel(8);
        let listener = ConsoleListener::new(tx);
        assert!(!listener.is_running());
    }

    #[test]
    fn test_lines_are_forwarded_as_typed_text() {
        let (tx, mut rx) = mpsc::channel(8);
        let running = AtomicBool::new(true);
        let input = Cursor::new("activate\n\n   \nwhat is rust\n");

        read_lines(input, &tx, &running).unwrap();

        assert_eq!(rx.try_recv().unwrap(), InputEvent::Typed("activate".into()));
        assert_eq!(
            rx.try_recv().unwrap(),
            InputEvent::Typed("what is rust".into())
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_stopped_reader_forwards_nothing() {
        let (tx, mut rx) = mpsc::channel(8);
        let running = AtomicBool::new(false);

        read_lines(Cursor::new("activate\n"), &tx, &running).unwrap();
        assert!(rx.try_recv().is_err());
    }
}
