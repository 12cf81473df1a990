//! End-to-end tests that talk to the server over JSON-RPC, the way an editor
//! does.

use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::time::timeout;
use tower_lsp::Server;

const URI: &str = "file:///workspace/booking.lu";
const WAIT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct TestClient {
    reader: BufReader<DuplexStream>,
    writer: DuplexStream,
}

impl TestClient {
    /// Start a server on in-memory pipes and complete the initialize handshake.
    async fn start() -> (Self, Value) {
        let (client_write, server_read) = tokio::io::duplex(64 * 1024);
        let (server_write, client_read) = tokio::io::duplex(64 * 1024);

        let (service, socket) = lusp::create_service();
        tokio::spawn(Server::new(server_read, server_write, socket).serve(service));

        let mut client = Self {
            reader: BufReader::new(client_read),
            writer: client_write,
        };
        client
            .send(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": { "processId": null, "capabilities": {} },
            }))
            .await;
        let response = client.read_until(|m| m["id"] == 1).await;
        client
            .send(json!({ "jsonrpc": "2.0", "method": "initialized", "params": {} }))
            .await;
        (client, response)
    }

    async fn send(&mut self, message: Value) {
        let body = message.to_string();
        let framed = format!("Content-Length: {}\r\n\r\n{}", body.len(), body);
        self.writer.write_all(framed.as_bytes()).await.unwrap();
        self.writer.flush().await.unwrap();
    }

    async fn request(&mut self, id: i64, method: &str, params: Value) -> Value {
        self.send(json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }))
            .await;
        self.read_until(|m| m["id"] == id).await
    }

    async fn notify(&mut self, method: &str, params: Value) {
        self.send(json!({ "jsonrpc": "2.0", "method": method, "params": params }))
            .await;
    }

    /// Read one framed message from the server.
    async fn read(&mut self) -> Value {
        timeout(WAIT, async {
            let mut length = None;
            loop {
                let mut header = String::new();
                self.reader.read_line(&mut header).await.unwrap();
                let header = header.trim_end();
                if header.is_empty() {
                    break;
                }
                if let Some(value) = header.strip_prefix("Content-Length:") {
                    length = Some(value.trim().parse::<usize>().unwrap());
                }
            }

            let mut body = vec![0; length.expect("message without Content-Length")];
            self.reader.read_exact(&mut body).await.unwrap();
            serde_json::from_slice(&body).unwrap()
        })
        .await
        .expect("timed out waiting for the server")
    }

    /// Skip messages until one matches.
    async fn read_until(&mut self, matches: impl Fn(&Value) -> bool) -> Value {
        loop {
            let message = self.read().await;
            if matches(&message) {
                return message;
            }
        }
    }

    /// Open the test document and wait for its first diagnostics.
    async fn open(&mut self, text: &str) -> Value {
        self.notify(
            "textDocument/didOpen",
            json!({
                "textDocument": { "uri": URI, "languageId": "lu", "version": 1, "text": text },
            }),
        )
        .await;
        self.read_until(is_diagnostics).await
    }
}

fn is_diagnostics(message: &Value) -> bool {
    message["method"] == "textDocument/publishDiagnostics" && message["params"]["uri"] == URI
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn initialize_advertises_capabilities() {
    let (_client, response) = TestClient::start().await;
    let capabilities = &response["result"]["capabilities"];

    assert_eq!(capabilities["textDocumentSync"], 1);
    assert_eq!(
        capabilities["completionProvider"]["triggerCharacters"],
        json!(["@", " ", "{", ":", "["])
    );
    assert_eq!(capabilities["completionProvider"]["resolveProvider"], false);
    assert_eq!(
        capabilities["documentOnTypeFormattingProvider"]["firstTriggerCharacter"],
        "\n"
    );
    assert_eq!(response["result"]["serverInfo"]["name"], "lusp");
}

#[tokio::test]
async fn opened_document_is_validated_and_close_clears_diagnostics() {
    let (mut client, _) = TestClient::start().await;
    let published = client.open("> colors\n@ list =\n").await;
    assert_eq!(published["params"]["version"], 1);
    let diagnostics = published["params"]["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["range"]["start"]["line"], 1);

    client
        .notify(
            "textDocument/didClose",
            json!({ "textDocument": { "uri": URI } }),
        )
        .await;
    let cleared = client.read_until(is_diagnostics).await;
    assert_eq!(cleared["params"]["diagnostics"], json!([]));
    assert!(cleared["params"].get("version").map_or(true, Value::is_null));
}

#[tokio::test]
async fn labeling_request_answers_null_and_sends_edits() {
    let (mut client, _) = TestClient::start().await;
    client.open("# Book\n- book a {time=5pm} flight\n").await;

    client
        .send(json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "labelingExperienceRequest",
            "params": { "uri": URI, "position": { "lineNumber": 2, "column": 1 } },
        }))
        .await;

    // The response and the notification may arrive in either order.
    let mut response = None;
    let mut notification = None;
    while response.is_none() || notification.is_none() {
        let message = client.read().await;
        if message["id"] == 2 {
            response = Some(message);
        } else if message["method"] == "addUnlabelUtterance" {
            notification = Some(message);
        }
    }

    let response = response.unwrap();
    assert!(response.get("error").is_none());
    assert_eq!(response["result"], Value::Null);

    let notification = notification.unwrap();
    let edits = &notification["params"]["edits"];
    assert_eq!(edits.as_array().unwrap().len(), 2);
    assert_eq!(edits[0]["newText"], "- book a 5pm flight\n");
    assert_eq!(edits[1]["newText"], "\n- book a 5pm flight");
}

#[tokio::test]
async fn unknown_documents_get_null_results() {
    let (mut client, _) = TestClient::start().await;
    let position = json!({
        "textDocument": { "uri": "file:///workspace/missing.lu" },
        "position": { "line": 0, "character": 0 },
    });

    let completion = client
        .request(2, "textDocument/completion", position.clone())
        .await;
    assert!(completion.get("error").is_none());
    assert_eq!(completion["result"], Value::Null);

    let mut formatting = position;
    formatting["ch"] = json!("\n");
    formatting["options"] = json!({ "tabSize": 4, "insertSpaces": true });
    let formatted = client
        .request(3, "textDocument/onTypeFormatting", formatting)
        .await;
    assert!(formatted.get("error").is_none());
    assert_eq!(formatted["result"], Value::Null);
}

#[tokio::test]
async fn open_document_answers_completion_and_formatting() {
    let (mut client, _) = TestClient::start().await;
    client.open("# Greeting\n- hi\n").await;

    let completion = client
        .request(
            2,
            "textDocument/completion",
            json!({
                "textDocument": { "uri": URI },
                "position": { "line": 2, "character": 0 },
            }),
        )
        .await;
    assert_eq!(completion["result"]["isIncomplete"], false);

    let formatted = client
        .request(
            3,
            "textDocument/onTypeFormatting",
            json!({
                "textDocument": { "uri": URI },
                "position": { "line": 2, "character": 0 },
                "ch": "\n",
                "options": { "tabSize": 4, "insertSpaces": true },
            }),
        )
        .await;
    assert_eq!(
        formatted["result"],
        json!([{
            "range": {
                "start": { "line": 2, "character": 0 },
                "end": { "line": 2, "character": 0 },
            },
            "newText": "- ",
        }])
    );
}
