//! Unix domain socket server for IPC
//!
//! Provides request-response communication and push notifications of core
//! events to subscribed clients.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::events::CoreEvent;
use crate::pipeline::AssistantRequest;

use super::protocol::{encode_frame, Notification, Request, Response, MAX_FRAME_LEN};

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    shared: Arc<Shared>,
    shutdown_tx: broadcast::Sender<()>,
}

/// What every client handler needs
struct Shared {
    request_tx: mpsc::Sender<AssistantRequest>,
    event_tx: broadcast::Sender<CoreEvent>,
}

impl Server {
    /// Bind the socket, replacing a stale one
    pub fn new(
        socket_path: &Path,
        request_tx: mpsc::Sender<AssistantRequest>,
        event_tx: broadcast::Sender<CoreEvent>,
    ) -> Result<Self> {
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        // Owner-only access
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: Some(listener),
            shared: Arc::new(Shared {
                request_tx,
                event_tx,
            }),
            shutdown_tx,
        })
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref().context("server not initialized")?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let shared = Arc::clone(&self.shared);
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, shared) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection
    ///
    /// Frames are written by a dedicated task so that responses and pushed
    /// notifications never interleave mid-frame.
    async fn handle_client(stream: UnixStream, shared: Arc<Shared>) -> Result<()> {
        let (mut reader, writer) = stream.into_split();
        let (out_tx, out_rx) = mpsc::channel::<Vec<u8>>(64);
        let writer_task = tokio::spawn(write_frames(writer, out_rx));
        let mut forwarder: Option<JoinHandle<()>> = None;

        let result = async {
            while let Some(body) = read_frame(&mut reader).await? {
                let response = match serde_json::from_slice::<Request>(&body) {
                    Ok(request) => {
                        debug!(?request, "received request");
                        if matches!(request, Request::Subscribe) && forwarder.is_none() {
                            debug!("client subscribed to notifications");
                            forwarder = Some(tokio::spawn(forward_events(
                                shared.event_tx.subscribe(),
                                out_tx.clone(),
                            )));
                        }
                        Self::process_request(request, &shared).await
                    }
                    Err(e) => {
                        warn!(%e, "malformed request");
                        Response::error("bad_request", e.to_string())
                    }
                };

                out_tx
                    .send(encode_frame(&response)?)
                    .await
                    .context("client writer closed")?;
            }
            Ok::<(), anyhow::Error>(())
        }
        .await;

        if let Some(forwarder) = forwarder {
            forwarder.abort();
        }
        drop(out_tx);
        let _ = writer_task.await;

        debug!("client disconnected");
        result
    }

    /// Process a request and return a response
    async fn process_request(request: Request, shared: &Shared) -> Response {
        match request {
            Request::Ping => Response::Pong,

            Request::Subscribe => Response::Subscribed,

            Request::GetStatus => {
                let (respond_to, status_rx) = oneshot::channel();
                if shared
                    .request_tx
                    .send(AssistantRequest::Status(respond_to))
                    .await
                    .is_err()
                {
                    return Response::error("unavailable", "assistant is not running");
                }
                match status_rx.await {
                    Ok(status) => Response::Status(status),
                    Err(_) => Response::error("unavailable", "assistant dropped the request"),
                }
            }

            other => match other.into_assistant_request() {
                Some(request) => match shared.request_tx.send(request).await {
                    Ok(()) => Response::Accepted,
                    Err(_) => Response::error("unavailable", "assistant is not running"),
                },
                None => Response::error("unsupported", "request not handled"),
            },
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}

/// Read one length-prefixed frame; `None` on clean disconnect
async fn read_frame(reader: &mut OwnedReadHalf) -> Result<Option<Vec<u8>>> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        warn!(len, "message too large, disconnecting");
        return Ok(None);
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(body))
}

async fn write_frames(mut writer: OwnedWriteHalf, mut frames: mpsc::Receiver<Vec<u8>>) {
    while let Some(frame) = frames.recv().await {
        if let Err(e) = writer.write_all(&frame).await {
            debug!(?e, "client write failed");
            break;
        }
    }
}

/// Push every core event to one subscribed client
async fn forward_events(mut events: broadcast::Receiver<CoreEvent>, out_tx: mpsc::Sender<Vec<u8>>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                let frame = match encode_frame(&Notification::Event(event)) {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!(%e, "failed to encode notification");
                        continue;
                    }
                };
                if out_tx.send(frame).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "subscriber lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
