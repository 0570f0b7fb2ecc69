// SPDX-License-Identifier: MIT

//! Transport listener (§4.5): accepts client connections and dispatches
//! `Content-Length`-framed JSON-RPC requests read off them. POSIX binds a
//! Unix domain socket; Windows serves a named pipe. Both drain in-flight
//! connection handlers on cancellation, bounded to `DRAIN_TIMEOUT`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clankers_core::Clock;
use clankers_wire::{read_message, write_message, JsonRpcRequest};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::dispatcher::Dispatcher;
use crate::error::LifecycleError;

const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[cfg(unix)]
pub async fn run<C: Clock + 'static>(
    socket_path: &Path,
    dispatcher: Arc<Dispatcher<C>>,
    cancel: CancellationToken,
) -> Result<(), LifecycleError> {
    use tokio::net::UnixListener;

    if socket_path.exists() {
        std::fs::remove_file(socket_path)?;
    }
    let listener = UnixListener::bind(socket_path)
        .map_err(|e| LifecycleError::BindFailed(socket_path.to_path_buf(), e))?;

    let mut handlers = JoinSet::new();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, _addr)) => {
                    let dispatcher = Arc::clone(&dispatcher);
                    let (reader, writer) = stream.into_split();
                    handlers.spawn(async move {
                        if let Err(e) = handle_connection(reader, writer, dispatcher).await {
                            debug!("connection ended: {e}");
                        }
                    });
                }
                Err(e) => error!("accept error: {e}"),
            },
        }
    }
    drain(&mut handlers).await;
    Ok(())
}

#[cfg(windows)]
pub async fn run<C: Clock + 'static>(
    pipe_path: &Path,
    dispatcher: Arc<Dispatcher<C>>,
    cancel: CancellationToken,
) -> Result<(), LifecycleError> {
    use tokio::net::windows::named_pipe::ServerOptions;

    let pipe_name = pipe_path.to_string_lossy().into_owned();
    let mut server = ServerOptions::new()
        .first_pipe_instance(true)
        .create(&pipe_name)
        .map_err(|e| LifecycleError::BindFailed(pipe_path.to_path_buf(), e))?;

    let mut handlers = JoinSet::new();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            connected = server.connect() => match connected {
                Ok(()) => {
                    let next = match ServerOptions::new().create(&pipe_name) {
                        Ok(next) => next,
                        Err(e) => {
                            error!("failed to create next pipe instance: {e}");
                            break;
                        }
                    };
                    let connected_server = std::mem::replace(&mut server, next);
                    let dispatcher = Arc::clone(&dispatcher);
                    let (reader, writer) = tokio::io::split(connected_server);
                    handlers.spawn(async move {
                        if let Err(e) = handle_connection(reader, writer, dispatcher).await {
                            debug!("connection ended: {e}");
                        }
                    });
                }
                Err(e) => error!("pipe connect error: {e}"),
            },
        }
    }
    drain(&mut handlers).await;
    Ok(())
}

async fn drain(handlers: &mut JoinSet<()>) {
    let _ = tokio::time::timeout(DRAIN_TIMEOUT, async {
        while handlers.join_next().await.is_some() {}
    })
    .await;
    handlers.abort_all();
}

/// Serves one connection: requests on it are handled in receipt order until
/// the peer disconnects (§5's single-connection ordering guarantee).
async fn handle_connection<R, W, C>(
    mut reader: R,
    mut writer: W,
    dispatcher: Arc<Dispatcher<C>>,
) -> Result<(), clankers_wire::ProtocolError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    C: Clock,
{
    loop {
        let Some(body) = read_message(&mut reader).await? else {
            return Ok(());
        };
        let request: JsonRpcRequest = match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(e) => {
                warn!("malformed request frame: {e}");
                continue;
            }
        };
        if let Some(response) = dispatcher.dispatch(request) {
            let bytes = serde_json::to_vec(&response)
                .map_err(|e| {
                    clankers_wire::ProtocolError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
                })?;
            write_message(&mut writer, &bytes).await?;
        }
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
