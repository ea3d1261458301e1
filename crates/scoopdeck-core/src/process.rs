//! Child process execution for Scoop commands.

use crate::{LineSplitter, Result, ScoopError};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

/// Size of the read buffer for each output stream.
const READ_CHUNK_SIZE: usize = 4096;

/// Lossy UTF-8 decoder for a byte stream read in arbitrary pieces.
///
/// A multi-byte character split across two reads is held back until the
/// rest of it arrives, so only genuinely invalid bytes become U+FFFD.
#[derive(Debug, Default)]
struct Utf8Decoder {
    carry: Vec<u8>,
}

impl Utf8Decoder {
    fn decode(&mut self, bytes: &[u8]) -> String {
        self.carry.extend_from_slice(bytes);
        let complete = self.carry.len() - incomplete_tail_len(&self.carry);
        let text = String::from_utf8_lossy(&self.carry[..complete]).into_owned();
        self.carry.drain(..complete);
        text
    }

    /// Decode whatever is still held back once the stream has ended.
    fn finish(&mut self) -> String {
        let text = String::from_utf8_lossy(&self.carry).into_owned();
        self.carry.clear();
        text
    }
}

/// Length of a truncated multi-byte sequence at the end of `bytes`, or 0.
fn incomplete_tail_len(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let byte = bytes[bytes.len() - back];
        if byte & 0xC0 == 0x80 {
            continue;
        }
        let needed = match byte {
            0xF0..=0xF7 => 4,
            0xE0..=0xEF => 3,
            0xC0..=0xDF => 2,
            _ => 1,
        };
        return if needed > back { back } else { 0 };
    }
    0
}

/// Output observed from a running command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// A chunk of standard output, as received.
    Stdout(String),
    /// A chunk of standard error, as received.
    Stderr(String),
    /// The process has exited. Always the last event, delivered once.
    Exited { exit_code: Option<i32> },
}

/// Terminal result of one command run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code, `None` if the process was killed by a signal or never started.
    pub exit_code: Option<i32>,
}

impl CommandOutcome {
    /// Exit code `0` is the only success.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// A spawned command, observed as a sequence of [`ProcessEvent`]s.
pub struct CommandHandle {
    events: mpsc::Receiver<ProcessEvent>,
}

impl CommandHandle {
    /// Next output chunk or the exit event; `None` once the exit was delivered.
    pub async fn next_event(&mut self) -> Option<ProcessEvent> {
        self.events.recv().await
    }
}

/// Spawns commands through a fixed interpreter.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    interpreter: PathBuf,
}

impl CommandRunner {
    /// Create a runner that launches every command as `interpreter args...`.
    pub fn new(interpreter: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }

    /// Spawn the interpreter with `args` and start streaming its output.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(&self, args: &[String]) -> Result<CommandHandle> {
        let mut cmd = tokio::process::Command::new(&self.interpreter);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        info!(target: "scoopdeck::process", "Spawning {:?} {:?}", self.interpreter, args);

        let mut child = cmd.spawn().map_err(|e| {
            error!(target: "scoopdeck::process", "Failed to spawn {:?}: {}", self.interpreter, e);
            ScoopError::ProcessSpawnFailed(format!("{:?}: {}", self.interpreter, e))
        })?;

        let (mut stdout, mut stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(stdout), Some(stderr)) => (stdout, stderr),
            _ => {
                return Err(ScoopError::ProcessSpawnFailed(
                    "child output streams were not captured".to_string(),
                ));
            }
        };

        let (tx, rx) = mpsc::channel(64);

        tokio::spawn(async move {
            let mut out_buf = [0u8; READ_CHUNK_SIZE];
            let mut err_buf = [0u8; READ_CHUNK_SIZE];
            let mut out_text = Utf8Decoder::default();
            let mut err_text = Utf8Decoder::default();
            let mut stdout_open = true;
            let mut stderr_open = true;

            while stdout_open || stderr_open {
                tokio::select! {
                    read = stdout.read(&mut out_buf), if stdout_open => match read {
                        Ok(0) => stdout_open = false,
                        Ok(n) => {
                            let chunk = out_text.decode(&out_buf[..n]);
                            trace!(target: "scoopdeck::process", "stdout ({} bytes): {:?}", n, chunk);
                            if !chunk.is_empty() {
                                let _ = tx.send(ProcessEvent::Stdout(chunk)).await;
                            }
                        }
                        Err(e) => {
                            warn!(target: "scoopdeck::process", "stdout read error: {}", e);
                            stdout_open = false;
                        }
                    },
                    read = stderr.read(&mut err_buf), if stderr_open => match read {
                        Ok(0) => stderr_open = false,
                        Ok(n) => {
                            let chunk = err_text.decode(&err_buf[..n]);
                            if !chunk.is_empty() {
                                let _ = tx.send(ProcessEvent::Stderr(chunk)).await;
                            }
                        }
                        Err(e) => {
                            warn!(target: "scoopdeck::process", "stderr read error: {}", e);
                            stderr_open = false;
                        }
                    },
                }
            }

            let rest = out_text.finish();
            if !rest.is_empty() {
                let _ = tx.send(ProcessEvent::Stdout(rest)).await;
            }
            let rest = err_text.finish();
            if !rest.is_empty() {
                let _ = tx.send(ProcessEvent::Stderr(rest)).await;
            }

            let exit_code = match child.wait().await {
                Ok(status) => status.code(),
                Err(e) => {
                    error!(target: "scoopdeck::process", "Failed to wait for child process: {}", e);
                    None
                }
            };
            info!(target: "scoopdeck::process", "Child process exited with code {:?}", exit_code);
            let _ = tx.send(ProcessEvent::Exited { exit_code }).await;
        });

        Ok(CommandHandle { events: rx })
    }

    /// Run a command to completion.
    ///
    /// Every stdout and stderr chunk is passed to `on_console` in receipt
    /// order. When `on_line` is given, stdout chunks also go through a
    /// [`LineSplitter`] and each released line is passed to it. A spawn
    /// failure is reported on `on_console` and yields a failed outcome.
    pub async fn run(
        &self,
        args: &[String],
        mut on_line: Option<&mut (dyn FnMut(&str) + Send)>,
        on_console: &mut (dyn FnMut(&str) + Send),
    ) -> CommandOutcome {
        let mut handle = match self.spawn(args) {
            Ok(handle) => handle,
            Err(e) => {
                on_console(&format!("{}\n", e));
                return CommandOutcome { exit_code: None };
            }
        };

        let mut splitter = LineSplitter::new();
        while let Some(event) = handle.next_event().await {
            match event {
                ProcessEvent::Stdout(chunk) => {
                    on_console(&chunk);
                    if let Some(on_line) = on_line.as_deref_mut() {
                        for line in splitter.feed(&chunk) {
                            on_line(&line);
                        }
                    }
                }
                ProcessEvent::Stderr(chunk) => {
                    on_console(&chunk);
                    warn!(target: "scoopdeck::process", "stderr: {}", chunk.trim_end());
                }
                ProcessEvent::Exited { exit_code } => {
                    if !splitter.pending().is_empty() {
                        debug!(
                            target: "scoopdeck::process",
                            "Discarding unterminated output: {:?}",
                            splitter.pending()
                        );
                    }
                    return CommandOutcome { exit_code };
                }
            }
        }

        // the reader task ended without reporting an exit
        CommandOutcome { exit_code: None }
    }
}
