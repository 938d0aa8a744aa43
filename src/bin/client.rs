use serde_json::{json, Value};
use std::io::{self, Write};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, ChildStdout, Command};

type Reader = BufReader<ChildStdout>;
type Writer = ChildStdin;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    println!("=======================================================");
    println!("  Contract Analyst MCP Server - Test Client");
    println!("=======================================================\n");

    // The server binary sits next to this one in the target directory
    let server_bin = std::env::current_exe()?
        .parent()
        .map(|dir| dir.join("contract-analyst-server"))
        .ok_or_else(|| eyre::eyre!("cannot locate server binary"))?;

    println!("Spawning server: {}", server_bin.display());

    let mut child = Command::new(&server_bin)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()?;

    let writer = child
        .stdin
        .take()
        .ok_or_else(|| eyre::eyre!("server stdin not captured"))?;
    let reader = BufReader::new(
        child
            .stdout
            .take()
            .ok_or_else(|| eyre::eyre!("server stdout not captured"))?,
    );

    println!("✓ Server started\n");

    let mut client = TestClient::new(reader, writer);
    client.initialize().await?;

    loop {
        println!("\n-------------------------------------------------------");
        println!(" Available Commands:");
        println!(" 1. analyze_verified_contract   - Fetch verified source");
        println!(" 2. analyze_unverified_contract - Decompile bytecode");
        println!(" 3. tools/list                  - List available tools");
        println!(" 4. exit                        - Stop server and quit");
        println!("-------------------------------------------------------");
        print!("\nEnter command number (1-4): ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let choice = input.trim();

        match choice {
            "1" => {
                client.analyze("analyze_verified_contract").await?;
            }
            "2" => {
                client.analyze("analyze_unverified_contract").await?;
            }
            "3" => {
                client.list_tools().await?;
            }
            "4" => {
                println!("\nGoodbye!");
                break;
            }
            _ => println!("Invalid choice. Please enter 1-4."),
        }
    }

    child.kill().await.ok();
    Ok(())
}

struct TestClient {
    reader: Reader,
    writer: Writer,
    request_id: i64,
}

impl TestClient {
    fn new(reader: Reader, writer: Writer) -> Self {
        TestClient {
            reader,
            writer,
            request_id: 1,
        }
    }

    async fn send_request(&mut self, method: &str, params: Value) -> eyre::Result<Value> {
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": self.request_id
        });
        self.request_id += 1;

        let request_json = serde_json::to_string(&request)?;
        self.writer.write_all(request_json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        let mut line = String::new();
        self.reader.read_line(&mut line).await?;
        Ok(serde_json::from_str(&line)?)
    }

    async fn initialize(&mut self) -> eyre::Result<()> {
        let response = self.send_request("initialize", json!({})).await?;

        if let Some(name) = response.pointer("/result/serverInfo/name") {
            println!("Connected to {}", name);
        }

        // Complete the handshake; the server expects no reply to this
        let notification = json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        });
        self.writer
            .write_all(serde_json::to_string(&notification)?.as_bytes())
            .await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        Ok(())
    }

    async fn analyze(&mut self, tool_name: &str) -> eyre::Result<()> {
        print!("Enter contract address: ");
        io::stdout().flush()?;

        let mut address = String::new();
        io::stdin().read_line(&mut address)?;
        let address = address.trim();

        let response = self
            .send_request(
                "tools/call",
                json!({
                    "name": tool_name,
                    "arguments": { "address": address }
                }),
            )
            .await?;

        print_tool_response(&response);
        Ok(())
    }

    async fn list_tools(&mut self) -> eyre::Result<()> {
        let response = self.send_request("tools/list", json!({})).await?;

        if let Some(tools) = response.pointer("/result/tools").and_then(|v| v.as_array()) {
            for tool in tools {
                println!(
                    "\n• {}\n  {}",
                    tool["name"].as_str().unwrap_or("?"),
                    tool["description"].as_str().unwrap_or("")
                );
            }
        } else {
            println!("\n{}", response);
        }

        Ok(())
    }
}

fn print_tool_response(response: &Value) {
    if let Some(items) = response.pointer("/result/content").and_then(|v| v.as_array()) {
        for item in items {
            if let Some(text) = item.get("text").and_then(|v| v.as_str()) {
                println!("\n{}", text);
            }
        }
    } else if let Some(error) = response.get("error") {
        println!("\nServer error: {}", error);
    } else {
        println!("\n{}", response);
    }
}
