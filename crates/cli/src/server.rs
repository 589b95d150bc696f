//! Line-delimited JSON serve loop: one [`ToolCall`] per input line, one
//! [`ToolResult`] per output line. Logs go to stderr so stdout stays a
//! clean protocol stream.

use proto::{ToolCall, ToolResult};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tools::ToolRegistry;
use tracing::{debug, warn};

/// Runs the request loop until the input stream ends.
pub async fn serve<R, W>(registry: &ToolRegistry, reader: R, mut writer: W) -> std::io::Result<()>
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
        let result = match serde_json::from_str::<ToolCall>(line) {
            Ok(call) => {
                debug!(tool = %call.name, call_id = %call.id, "Dispatching request");
                registry.execute(&call.id, &call.name, call.arguments).await
            }
            Err(e) => {
                warn!("Rejected malformed request line: {e}");
                ToolResult::error("", "", format!("Error parsing request: {e}"))
            }
        };
        let payload = serde_json::to_string(&result).map_err(std::io::Error::other)?;
        writer.write_all(payload.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}
