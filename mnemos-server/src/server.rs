use crate::router;
use crate::services::Services;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use mnemos_core::ipc::{self, MnemosResponse};
use mnemos_core::MnemosError;
use std::path::Path;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast;
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};

pub async fn run_unix_server(
    socket_path: &str,
    services: Services,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), MnemosError> {
    if Path::new(socket_path).exists() {
        std::fs::remove_file(socket_path)?;
    }

    let listener = UnixListener::bind(socket_path)?;
    tracing::info!("IPC Server listening on {}", socket_path);

    loop {
        tokio::select! {
            res = listener.accept() => {
                let (stream, _) = res?;
                let services = services.clone();
                tokio::spawn(serve_connection(stream, services));
            }
            _ = shutdown.recv() => {
                tracing::info!("Shutting down IPC server...");
                break;
            }
        }
    }

    if Path::new(socket_path).exists() {
        std::fs::remove_file(socket_path)?;
    }

    Ok(())
}

/// Serve request/response frames on one connection until the peer hangs up.
pub async fn serve_connection(stream: UnixStream, services: Services) {
    let (read, write) = stream.into_split();
    // 4-byte little-endian length prefix + MessagePack payload
    let le_codec = || LengthDelimitedCodec::builder().little_endian().new_codec();
    let mut framed_read = FramedRead::new(read, le_codec());
    let mut framed_write = FramedWrite::new(write, le_codec());

    while let Some(frame) = framed_read.next().await {
        let bytes_mut = match frame {
            Ok(b) => b,
            Err(e) => {
                tracing::error!("Frame error: {}", e);
                break;
            }
        };

        let response = match ipc::decode_request(&bytes_mut) {
            Ok(request) => router::handle_request(request, &services).await,
            Err(e) => MnemosResponse::err(e.to_string()),
        };

        match ipc::encode_response(&response) {
            Ok(resp_bytes) => {
                if let Err(e) = framed_write.send(Bytes::from(resp_bytes)).await {
                    tracing::error!("Failed to send response: {}", e);
                    break;
                }
            }
            Err(e) => {
                tracing::error!("Failed to serialize response: {}", e);
                break;
            }
        }
    }
}
