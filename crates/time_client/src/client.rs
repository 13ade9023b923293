use std::collections::HashMap;
use std::process::Stdio;
use std::sync::{
    Arc, Mutex, MutexGuard,
    atomic::{AtomicU64, Ordering},
};
use std::time::Duration;

use serde_json::{Value, json};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    process::{Child, Command},
    sync::oneshot,
    task::JoinHandle,
};

use crate::core::{
    error::{ClientError, ClientResult},
    models::{
        JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, ListToolsResult, ToolCallResult,
    },
};

/// How long a request may stay unanswered before it is failed.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Protocol revision sent during the `initialize` handshake.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

type PendingTable = Arc<Mutex<HashMap<u64, oneshot::Sender<JsonRpcResponse>>>>;

fn lock(pending: &PendingTable) -> MutexGuard<'_, HashMap<u64, oneshot::Sender<JsonRpcResponse>>> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Minimal MCP client speaking newline-delimited JSON-RPC 2.0 to a spawned
/// server process.
///
/// Responses are correlated to requests purely by identifier; arrival order
/// is irrelevant. Every pending entry is removed exactly once, by the
/// matching response or by the fixed timeout, whichever comes first.
pub struct ToolClient {
    next_id: AtomicU64,
    pending: PendingTable,
    writer: tokio::sync::Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
    reader_task: JoinHandle<()>,
    stderr_task: Option<JoinHandle<()>>,
    child: Option<Child>,
}

impl ToolClient {
    /// Spawn `command args...` with piped stdio and perform the `initialize`
    /// handshake before returning.
    pub async fn connect(command: &str, args: &[String]) -> ClientResult<ToolClient> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(ClientError::Spawn)?;

        let stdin = take_pipe(child.stdin.take(), "stdin")?;
        let stdout = take_pipe(child.stdout.take(), "stdout")?;
        let stderr = take_pipe(child.stderr.take(), "stderr")?;

        // Server diagnostics arrive on stderr; pass them through as log lines.
        let stderr_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if !line.is_empty() {
                    tracing::debug!("server log: {line}");
                }
            }
        });

        let mut client = Self::from_transport(stdout, stdin);
        client.child = Some(child);
        client.stderr_task = Some(stderr_task);
        client.initialize().await?;

        Ok(client)
    }

    /// Build a client over arbitrary async streams. No process is spawned
    /// and no handshake is performed.
    pub fn from_transport<R, W>(reader: R, writer: W) -> ToolClient
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let pending: PendingTable = Arc::new(Mutex::new(HashMap::new()));
        let reader_task = tokio::spawn(read_loop(reader, Arc::clone(&pending)));

        ToolClient {
            next_id: AtomicU64::new(1),
            pending,
            writer: tokio::sync::Mutex::new(Box::new(writer)),
            reader_task,
            stderr_task: None,
            child: None,
        }
    }

    async fn initialize(&self) -> ClientResult<()> {
        let response = self
            .request(
                "initialize",
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            )
            .await?;
        if let Some(error) = response.error {
            return Err(error.into());
        }

        self.notify("notifications/initialized", Value::Null).await
    }

    /// Send one request and wait for the matching response or the timeout,
    /// whichever occurs first.
    pub async fn request(&self, method: &str, params: Value) -> ClientResult<JsonRpcResponse> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        lock(&self.pending).insert(id, tx);

        let request = JsonRpcRequest::new(id, method, params);
        let line = match serde_json::to_string(&request) {
            Ok(line) => line,
            Err(err) => {
                lock(&self.pending).remove(&id);
                return Err(err.into());
            }
        };
        if let Err(err) = self.write_line(&line).await {
            lock(&self.pending).remove(&id);
            return Err(err);
        }

        match tokio::time::timeout(REQUEST_TIMEOUT, rx).await {
            Ok(Ok(response)) => Ok(response),
            // Reader dropped the entry without sending a response.
            Ok(Err(_)) => {
                lock(&self.pending).remove(&id);
                Err(ClientError::ConnectionClosed { id })
            }
            Err(_) => {
                lock(&self.pending).remove(&id);
                Err(ClientError::Timeout {
                    id,
                    method: method.to_string(),
                    timeout_secs: REQUEST_TIMEOUT.as_secs(),
                })
            }
        }
    }

    /// Send a notification; no response is expected.
    pub async fn notify(&self, method: &str, params: Value) -> ClientResult<()> {
        let notification = JsonRpcNotification::new(method, params);
        self.write_line(&serde_json::to_string(&notification)?).await
    }

    /// Invoke a named tool with the given argument mapping.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ClientResult<ToolCallResult> {
        let response = self
            .request("tools/call", json!({"name": name, "arguments": arguments}))
            .await?;
        into_result(response)
    }

    /// Fetch the advertised tool catalog.
    pub async fn list_tools(&self) -> ClientResult<ListToolsResult> {
        let response = self.request("tools/list", json!({})).await?;
        into_result(response)
    }

    /// Kill the server process and stop the reader tasks. In-flight requests
    /// are not drained.
    pub async fn close(mut self) {
        self.reader_task.abort();
        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }
        if let Some(mut child) = self.child.take() {
            let _ = child.kill().await;
        }
    }

    async fn write_line(&self, line: &str) -> ClientResult<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        lock(&self.pending).len()
    }
}

fn take_pipe<T>(pipe: Option<T>, name: &str) -> ClientResult<T> {
    pipe.ok_or_else(|| {
        ClientError::Spawn(std::io::Error::other(format!(
            "child {name} was not captured"
        )))
    })
}

fn into_result<T: serde::de::DeserializeOwned>(response: JsonRpcResponse) -> ClientResult<T> {
    if let Some(error) = response.error {
        return Err(error.into());
    }
    let result = response.result.ok_or_else(|| {
        ClientError::MalformedResponse("response carries neither result nor error".to_string())
    })?;
    serde_json::from_value(result).map_err(|err| ClientError::MalformedResponse(err.to_string()))
}

/// Split the server's output on newlines and resolve pending requests by id.
///
/// Unparseable lines are logged and dropped; messages without an id (server
/// notifications) are ignored.
async fn read_loop<R>(reader: R, pending: PendingTable)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let response: JsonRpcResponse = match serde_json::from_str(line) {
                    Ok(response) => response,
                    Err(err) => {
                        tracing::warn!("Failed to parse response line: {err}");
                        continue;
                    }
                };

                let Some(id) = response.id else {
                    tracing::debug!("Ignoring message without id");
                    continue;
                };

                match lock(&pending).remove(&id) {
                    // Send can only fail if the requester already gave up.
                    Some(tx) => {
                        let _ = tx.send(response);
                    }
                    None => tracing::debug!("No pending request for response id {id}"),
                }
            }
            Ok(None) => break,
            Err(err) => {
                tracing::warn!("Error reading from server: {err}");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, duplex};

    use super::*;

    fn transport_pair() -> (ToolClient, DuplexStream) {
        let (client_io, server_io) = duplex(4096);
        let (read_half, write_half) = tokio::io::split(client_io);
        (ToolClient::from_transport(read_half, write_half), server_io)
    }

    async fn respond(writer: &mut (impl AsyncWriteExt + Unpin), value: Value) {
        let mut line = value.to_string();
        line.push('\n');
        writer.write_all(line.as_bytes()).await.unwrap();
    }

    #[tokio::test]
    async fn test_identifiers_start_at_one_and_increment() {
        let (client, server_io) = transport_pair();

        // Echo server: answer each request immediately with its own id.
        tokio::spawn(async move {
            let (server_read, mut server_write) = tokio::io::split(server_io);
            let mut lines = BufReader::new(server_read).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let request: Value = serde_json::from_str(&line).unwrap();
                let id = request["id"].as_u64().unwrap();
                respond(&mut server_write, json!({"jsonrpc": "2.0", "id": id, "result": {}}))
                    .await;
            }
        });

        let first = client.request("ping", json!({})).await.unwrap();
        let second = client.request("ping", json!({})).await.unwrap();

        assert_eq!(first.id, Some(1));
        assert_eq!(second.id, Some(2));
    }

    #[tokio::test]
    async fn test_out_of_order_responses_resolve_by_id() {
        let (client, server_io) = transport_pair();

        // Read both requests, then answer them in reverse arrival order.
        tokio::spawn(async move {
            let (server_read, mut server_write) = tokio::io::split(server_io);
            let mut lines = BufReader::new(server_read).lines();
            let first: Value =
                serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
            let second: Value =
                serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();

            for request in [second, first] {
                let id = request["id"].as_u64().unwrap();
                let method = request["method"].as_str().unwrap().to_string();
                respond(
                    &mut server_write,
                    json!({"jsonrpc": "2.0", "id": id, "result": {"echo": method}}),
                )
                .await;
            }
        });

        let (alpha, beta) = tokio::join!(
            client.request("alpha", json!({})),
            client.request("beta", json!({}))
        );

        assert_eq!(alpha.unwrap().result.unwrap()["echo"], "alpha");
        assert_eq!(beta.unwrap().result.unwrap()["echo"], "beta");
        assert_eq!(client.pending_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_times_out_and_clears_pending_entry() {
        let (client, server_io) = transport_pair();

        // Server that reads the request and never answers.
        tokio::spawn(async move {
            let (server_read, _server_write) = tokio::io::split(server_io);
            let mut lines = BufReader::new(server_read).lines();
            while let Ok(Some(_)) = lines.next_line().await {}
        });

        let error = client.request("tools/list", json!({})).await.unwrap_err();

        assert!(matches!(error, ClientError::Timeout { id: 1, .. }));
        assert_eq!(client.pending_len(), 0);
    }

    #[tokio::test]
    async fn test_malformed_response_lines_are_skipped() {
        let (client, server_io) = transport_pair();

        tokio::spawn(async move {
            let (server_read, mut server_write) = tokio::io::split(server_io);
            let mut lines = BufReader::new(server_read).lines();
            let request: Value =
                serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
            let id = request["id"].as_u64().unwrap();

            server_write.write_all(b"this is not json\n").await.unwrap();
            respond(
                &mut server_write,
                json!({"jsonrpc": "2.0", "id": id, "result": {"ok": true}}),
            )
            .await;
        });

        let response = client.request("ping", json!({})).await.unwrap();
        assert_eq!(response.result.unwrap()["ok"], true);
    }

    #[tokio::test]
    async fn test_messages_without_id_are_ignored() {
        let (client, server_io) = transport_pair();

        tokio::spawn(async move {
            let (server_read, mut server_write) = tokio::io::split(server_io);
            let mut lines = BufReader::new(server_read).lines();
            let request: Value =
                serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
            let id = request["id"].as_u64().unwrap();

            respond(
                &mut server_write,
                json!({"jsonrpc": "2.0", "method": "notifications/message", "params": {}}),
            )
            .await;
            respond(
                &mut server_write,
                json!({"jsonrpc": "2.0", "id": id, "result": {}}),
            )
            .await;
        });

        let response = client.request("ping", json!({})).await.unwrap();
        assert!(response.result.is_some());
    }

    #[tokio::test]
    async fn test_error_response_surfaces_code_and_message() {
        let (client, server_io) = transport_pair();

        tokio::spawn(async move {
            let (server_read, mut server_write) = tokio::io::split(server_io);
            let mut lines = BufReader::new(server_read).lines();
            let request: Value =
                serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
            let id = request["id"].as_u64().unwrap();

            respond(
                &mut server_write,
                json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": {"code": -32601, "message": "Method not found: bogus"}
                }),
            )
            .await;
        });

        let error = client.call_tool("bogus", json!({})).await.unwrap_err();
        assert!(matches!(error, ClientError::Rpc { code: -32601, .. }));
    }

    #[tokio::test]
    async fn test_call_tool_parses_content_envelope() {
        let (client, server_io) = transport_pair();

        tokio::spawn(async move {
            let (server_read, mut server_write) = tokio::io::split(server_io);
            let mut lines = BufReader::new(server_read).lines();
            let request: Value =
                serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
            let id = request["id"].as_u64().unwrap();

            assert_eq!(request["method"], "tools/call");
            assert_eq!(request["params"]["name"], "get_timezone_offset");

            respond(
                &mut server_write,
                json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": {
                        "content": [
                            {"type": "text", "text": "Timezone UTC offset: +0 hours from UTC"}
                        ],
                        "isError": false
                    }
                }),
            )
            .await;
        });

        let result = client
            .call_tool("get_timezone_offset", json!({"timezone": "UTC"}))
            .await
            .unwrap();

        assert!(!result.is_error);
        assert_eq!(result.text(), Some("Timezone UTC offset: +0 hours from UTC"));
    }
}
