use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// The transport between the form and the application that performs the copy.
/// Outbound payloads are fire-and-forget; inbound messages are polled.
pub trait HostChannel {
    fn send(&mut self, payload: &str) -> Result<()>;
    /// `Ok(None)` when nothing is waiting. An error means the host will never answer again;
    /// messages it sent before closing are still returned first.
    fn try_recv(&mut self) -> Result<Option<String>>;
}

/// Runs the host as a child process speaking one JSON document per line.
pub struct ProcessChannel {
    child: Child,
    stdin: ChildStdin,
    inbound: Receiver<String>,
}

impl ProcessChannel {
    pub fn spawn(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| anyhow!("host command is empty"))?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("start host command: {}", command.join(" ")))?;

        let stdin = child.stdin.take().context("host stdin unavailable")?;
        let stdout = child.stdout.take().context("host stdout unavailable")?;

        let (tx, inbound) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Reading from host failed: {}", e);
                        break;
                    }
                }
            }
            debug!("Host output closed");
        });

        info!("Started host: {}", command.join(" "));
        Ok(Self {
            child,
            stdin,
            inbound,
        })
    }
}

impl HostChannel for ProcessChannel {
    fn send(&mut self, payload: &str) -> Result<()> {
        self.stdin
            .write_all(payload.as_bytes())
            .context("write request to host")?;
        self.stdin.write_all(b"\n").context("write newline to host")?;
        self.stdin.flush().context("flush host stdin")?;
        Ok(())
    }

    fn try_recv(&mut self) -> Result<Option<String>> {
        match self.inbound.try_recv() {
            Ok(line) => Ok(Some(line)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(anyhow!("host closed its output")),
        }
    }
}

impl Drop for ProcessChannel {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            debug!("Host already stopped: {}", e);
        }
        let _ = self.child.wait();
    }
}
