//! Minimal mock SMTP server for exercising the real transport in tests.
//!
//! Speaks just enough of the protocol for an authenticating submission
//! client: greeting, EHLO with an AUTH capability, AUTH PLAIN, the envelope
//! commands, and DATA. Accepts any number of sequential connections and
//! records every accepted message. A single response override lets tests
//! inject RCPT failures.

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    sync::Mutex,
    task::JoinHandle,
};

/// One message accepted by the mock server.
#[derive(Debug, Clone, Default)]
pub struct ReceivedMail {
    pub mail_from: String,
    pub rcpt_to: Vec<String>,
    pub data: String,
}

pub struct MockSmtpServer {
    addr: SocketAddr,
    connections: Arc<AtomicUsize>,
    messages: Arc<Mutex<Vec<ReceivedMail>>>,
    accept_task: JoinHandle<()>,
}

impl MockSmtpServer {
    /// Start a server that accepts everything.
    pub async fn start() -> Self {
        Self::start_with_rcpt_response(250, "OK").await
    }

    /// Start a server that answers every `RCPT TO` with the given response.
    pub async fn start_with_rcpt_response(code: u16, message: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("local addr");

        let connections = Arc::new(AtomicUsize::new(0));
        let messages = Arc::new(Mutex::new(Vec::new()));
        let rcpt_response = format!("{code} {message}\r\n");

        let accept_task = {
            let connections = Arc::clone(&connections);
            let messages = Arc::clone(&messages);
            tokio::spawn(async move {
                loop {
                    let Ok((stream, _)) = listener.accept().await else {
                        break;
                    };
                    connections.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(handle_session(
                        stream,
                        rcpt_response.clone(),
                        Arc::clone(&messages),
                    ));
                }
            })
        };

        Self {
            addr,
            connections,
            messages,
            accept_task,
        }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Number of transport sessions the server has accepted.
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Messages accepted so far.
    pub async fn messages(&self) -> Vec<ReceivedMail> {
        self.messages.lock().await.clone()
    }
}

impl Drop for MockSmtpServer {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

async fn handle_session(
    stream: TcpStream,
    rcpt_response: String,
    messages: Arc<Mutex<Vec<ReceivedMail>>>,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    if write_half.write_all(b"220 mock ready\r\n").await.is_err() {
        return;
    }

    let mut current = ReceivedMail::default();

    while let Ok(Some(line)) = lines.next_line().await {
        let command = line.to_uppercase();

        let response: &[u8] = if command.starts_with("EHLO") || command.starts_with("HELO") {
            b"250-mock.local\r\n250 AUTH PLAIN LOGIN\r\n"
        } else if command.starts_with("AUTH") {
            b"235 Authentication succeeded\r\n"
        } else if command.starts_with("MAIL FROM:") {
            current.mail_from = address_of(&line);
            b"250 OK\r\n"
        } else if command.starts_with("RCPT TO:") {
            current.rcpt_to.push(address_of(&line));
            rcpt_response.as_bytes()
        } else if command == "DATA" {
            if write_half
                .write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n")
                .await
                .is_err()
            {
                return;
            }
            let mut data = String::new();
            while let Ok(Some(data_line)) = lines.next_line().await {
                if data_line == "." {
                    break;
                }
                data.push_str(&data_line);
                data.push_str("\r\n");
            }
            current.data = data;
            messages.lock().await.push(std::mem::take(&mut current));
            b"250 OK: queued\r\n"
        } else if command == "QUIT" {
            let _ = write_half.write_all(b"221 Bye\r\n").await;
            return;
        } else {
            b"250 OK\r\n"
        };

        if write_half.write_all(response).await.is_err() {
            return;
        }
    }
}

/// Extract the bracketed address from `MAIL FROM:<addr>` / `RCPT TO:<addr>`.
fn address_of(line: &str) -> String {
    line.split_once(':')
        .map_or("", |(_, rest)| rest)
        .trim()
        .trim_matches(['<', '>'])
        .to_string()
}
