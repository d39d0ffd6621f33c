// src/sync/executor.rs

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use super::{MirrorCommand, SyncError};

pub type SyncFuture<'a> = Pin<Box<dyn Future<Output = Result<(), SyncError>> + Send + 'a>>;

/// Trait abstracting how one destination is brought in line with the source.
///
/// The returned future resolves only once the mirror has finished; there is
/// no timeout and no cancellation.
pub trait SyncExecutor: Send {
    fn sync<'a>(&'a mut self, source: &'a Path, destination: &'a Path) -> SyncFuture<'a>;
}

/// Production executor that runs the configured mirror command (rsync by
/// default) as a child process and reports its exit status.
#[derive(Debug, Clone, Default)]
pub struct RsyncExecutor {
    command: MirrorCommand,
}

impl RsyncExecutor {
    pub fn new(command: MirrorCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &MirrorCommand {
        &self.command
    }
}

impl SyncExecutor for RsyncExecutor {
    fn sync<'a>(&'a mut self, source: &'a Path, destination: &'a Path) -> SyncFuture<'a> {
        Box::pin(async move {
            let program = self.command.program.clone();
            debug!(
                cmd = %self.command.display(source, destination),
                "starting mirror process"
            );

            let mut cmd = Command::new(&program);
            cmd.args(self.command.argv(source, destination))
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);

            let mut child = cmd.spawn().map_err(|source| SyncError::Spawn {
                program: program.clone(),
                source,
            })?;

            // Both pipes must be drained or a chatty transfer stalls.
            let label = destination.display().to_string();
            let forwarders = [
                child
                    .stdout
                    .take()
                    .map(|out| tokio::spawn(forward_lines(out, label.clone(), false))),
                child
                    .stderr
                    .take()
                    .map(|err| tokio::spawn(forward_lines(err, label.clone(), true))),
            ];

            let status = child.wait().await.map_err(|source| SyncError::Wait {
                program: program.clone(),
                source,
            })?;

            // Finish logging the child's output before reporting the outcome.
            for forwarder in forwarders.into_iter().flatten() {
                let _ = forwarder.await;
            }

            debug!(
                destination = %destination.display(),
                exit_code = ?status.code(),
                success = status.success(),
                "mirror process exited"
            );

            if status.success() {
                Ok(())
            } else {
                Err(SyncError::Exited {
                    program,
                    code: status.code(),
                })
            }
        })
    }
}

/// Log the child's output line by line: stdout at debug, stderr at warn.
async fn forward_lines<R>(stream: R, destination: String, is_stderr: bool)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if is_stderr {
            warn!(%destination, "mirror: {}", line);
        } else {
            debug!(%destination, "mirror: {}", line);
        }
    }
}
