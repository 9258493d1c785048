use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};

/// A decoded JSON-RPC message from the language server
#[derive(Debug, Clone, PartialEq)]
pub struct LspMessage {
    pub id: Option<Value>,
    pub method: Option<String>,
    pub params: Option<Value>,
    pub result: Option<Value>,
    pub error: Option<Value>,
}

impl LspMessage {
    /// A response to one of our requests: has an id and no method
    pub fn is_response(&self) -> bool {
        self.id.is_some() && self.method.is_none()
    }

    /// A request from the server that expects a reply
    pub fn is_server_request(&self) -> bool {
        self.id.is_some() && self.method.is_some()
    }
}

/// Read one `Content-Length` framed message body
pub async fn read_lsp_message<R: tokio::io::AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
) -> Result<String> {
    let mut headers = HashMap::new();
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            return Err(anyhow::anyhow!("Connection closed by language server"));
        }

        if line.trim().is_empty() {
            break;
        }

        if let Some((key, value)) = line.trim().split_once(':') {
            headers.insert(key.trim().to_lowercase(), value.trim().to_string());
        }
    }

    let content_length: usize = headers
        .get("content-length")
        .ok_or_else(|| anyhow::anyhow!("Missing Content-Length header"))?
        .parse()?;

    let mut buffer = vec![0; content_length];
    reader.read_exact(&mut buffer).await?;

    Ok(String::from_utf8(buffer)?)
}

/// Write one message body with its `Content-Length` header
pub async fn write_lsp_message<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    content: &str,
) -> Result<()> {
    let message = format!("Content-Length: {}\r\n\r\n{}", content.len(), content);
    writer.write_all(message.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

pub fn parse_lsp_message(content: &str) -> Result<LspMessage> {
    let json: Value = serde_json::from_str(content)?;

    Ok(LspMessage {
        id: json.get("id").filter(|id| !id.is_null()).cloned(),
        method: json
            .get("method")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        params: json.get("params").cloned(),
        result: json.get("result").cloned(),
        error: json.get("error").cloned(),
    })
}
