//! Newline-delimited JSON-RPC over stdin/stdout. One message per line in each
//! direction; logs must go to stderr.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::handlers;
use super::jsonrpc::{JsonRpcRequest, JsonRpcResponse};
use crate::tools::router::Dispatcher;

/// Serve until the reader hits EOF.
pub async fn serve<R, W>(dispatcher: Arc<Dispatcher>, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) if request.is_notification() => {
                handlers::handle_request(&dispatcher, &request).await;
                continue;
            }
            Ok(request) => handlers::handle_request(&dispatcher, &request).await,
            Err(e) => {
                tracing::warn!(error = %e, "unparseable stdio message");
                JsonRpcResponse::parse_error(e).to_value()
            }
        };

        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        writer.write_all(&encoded).await?;
        writer.flush().await?;
    }
    Ok(())
}

pub async fn serve_stdio(dispatcher: Arc<Dispatcher>) -> std::io::Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    serve(dispatcher, stdin, tokio::io::stdout()).await
}
