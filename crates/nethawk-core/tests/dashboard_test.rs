#![allow(clippy::unwrap_used)]
// Dashboard lifecycle tests against an in-process Socket.IO backend and a
// wiremock HTTP backend.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::tungstenite::Message;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nethawk_core::{
    Command, CommandResult, ConnectionState, CoreError, Dashboard, DashboardConfig,
    NewMailProfile, PanelKind, ScanType,
};

const WAIT: Duration = Duration::from_secs(5);

// ── Fake push backend ───────────────────────────────────────────────

enum Frame {
    Text(String),
    Close,
}

struct FakeBackend {
    url: Url,
    /// Frames the dashboard sent, namespace join excluded.
    received: mpsc::UnboundedReceiver<String>,
    send: mpsc::UnboundedSender<Frame>,
}

impl FakeBackend {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
        let (in_tx, received) = mpsc::unbounded_channel();
        let (send, out_rx) = mpsc::unbounded_channel();
        let out_rx = Arc::new(Mutex::new(out_rx));

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let in_tx = in_tx.clone();
                let out_rx = Arc::clone(&out_rx);
                tokio::spawn(async move {
                    // Plain HTTP requests fail the upgrade and are dropped.
                    let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
                        return;
                    };
                    let mut out_rx = out_rx.lock().await;
                    let (mut write, mut read) = ws.split();
                    let open = r#"0{"sid":"fake","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#;
                    write.send(Message::Text(open.into())).await.unwrap();
                    loop {
                        tokio::select! {
                            msg = read.next() => match msg {
                                Some(Ok(Message::Text(text))) => {
                                    if text.as_str() == "40" {
                                        let ack = r#"40{"sid":"ns"}"#;
                                        let _ = write.send(Message::Text(ack.into())).await;
                                    } else {
                                        let _ = in_tx.send(text.as_str().to_owned());
                                    }
                                }
                                Some(Ok(_)) => {}
                                _ => break,
                            },
                            frame = out_rx.recv() => match frame {
                                Some(Frame::Text(text)) => {
                                    let _ = write.send(Message::Text(text.into())).await;
                                }
                                Some(Frame::Close) | None => {
                                    let _ = write.send(Message::Close(None)).await;
                                    break;
                                }
                            },
                        }
                    }
                });
            }
        });

        Self {
            url,
            received,
            send,
        }
    }

    fn push(&self, name: &str, payload: Value) {
        let frame = format!("42{}", json!([name, payload]));
        self.send.send(Frame::Text(frame)).unwrap();
    }

    fn drop_link(&self) {
        self.send.send(Frame::Close).unwrap();
    }

    /// Next event the dashboard emitted, as `(name, payload)`.
    async fn next_event(&mut self) -> (String, Value) {
        loop {
            let frame = tokio::time::timeout(WAIT, self.received.recv())
                .await
                .unwrap()
                .unwrap();
            let Some(body) = frame.strip_prefix("42") else {
                continue;
            };
            let Value::Array(mut items) = serde_json::from_str(body).unwrap() else {
                panic!("event frame is not an array: {frame}");
            };
            let payload = if items.len() > 1 {
                items.remove(1)
            } else {
                Value::Null
            };
            let name = items.remove(0).as_str().unwrap().to_owned();
            return (name, payload);
        }
    }
}

fn config(url: Url) -> DashboardConfig {
    let mut config = DashboardConfig::new(url);
    config.timeout = Duration::from_secs(2);
    config
}

async fn connected(backend: &FakeBackend) -> Dashboard {
    let dashboard = Dashboard::new(config(backend.url.clone()));
    dashboard.connect().await.unwrap();
    dashboard
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn commands_before_connect_are_refused() {
    let dashboard = Dashboard::new(config(Url::parse("http://127.0.0.1:9").unwrap()));

    let result = dashboard.execute(Command::StopPortScan).await;
    assert!(matches!(result, Err(CoreError::NotConnected)));
}

#[tokio::test]
async fn connect_joins_the_push_channel() {
    let backend = FakeBackend::start().await;
    let dashboard = connected(&backend).await;

    assert_eq!(*dashboard.connection_state().borrow(), ConnectionState::Connected);

    dashboard.disconnect().await;
    assert_eq!(
        *dashboard.connection_state().borrow(),
        ConnectionState::Disconnected
    );
}

#[tokio::test]
async fn unreachable_backend_fails_to_connect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
    drop(listener);

    let mut cfg = config(url);
    cfg.timeout = Duration::from_millis(300);
    let dashboard = Dashboard::new(cfg);

    let result = dashboard.connect().await;
    assert!(matches!(result, Err(CoreError::ConnectionFailed { .. })));
    assert_eq!(*dashboard.connection_state().borrow(), ConnectionState::Failed);
}

// ── Port scan round trip ────────────────────────────────────────────

#[tokio::test]
async fn port_scan_round_trip() {
    let mut backend = FakeBackend::start().await;
    let dashboard = connected(&backend).await;
    let _ports_handler = dashboard.subscribe(PanelKind::Ports);

    let result = dashboard
        .execute(Command::StartPortScan {
            host: "192.168.1.1".into(),
            ports: vec![443, 22, 80, 22],
            scan_type: ScanType::TcpConnect,
        })
        .await
        .unwrap();
    assert!(matches!(result, CommandResult::Emitted("start_port_scan")));

    let (name, payload) = backend.next_event().await;
    assert_eq!(name, "start_port_scan");
    assert_eq!(
        payload,
        json!({"host": "192.168.1.1", "ports": "22,80,443", "scanType": "tcp-connect"})
    );

    backend.push("scan_update", json!({"status": "open_port", "port": 22}));
    backend.push("scan_update", json!({"status": "port_status", "port": 80, "state": "closed"}));
    backend.push("scan_update", json!({"status": "open_port", "port": 443}));
    backend.push("scan_update", json!({"status": "complete", "message": "Scan completed"}));

    let mut ports = dashboard.ports();
    let state = tokio::time::timeout(WAIT, ports.wait_for(|s| !s.scanning))
        .await
        .unwrap()
        .unwrap()
        .clone();
    let numbers: Vec<u16> = state.ports.iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![22, 80, 443]);
    assert_eq!(state.open_count(), 2);

    dashboard.disconnect().await;
    assert!(dashboard.ports().borrow().ports.is_empty());
}

#[tokio::test]
async fn invalid_scan_target_emits_nothing() {
    let backend = FakeBackend::start().await;
    let dashboard = connected(&backend).await;

    let result = dashboard
        .execute(Command::StartPortScan {
            host: "not a host".into(),
            ports: vec![22],
            scan_type: ScanType::TcpConnect,
        })
        .await;
    assert!(matches!(result, Err(CoreError::ValidationFailed { .. })));
    assert!(!dashboard.ports().borrow().scanning);
}

#[tokio::test]
async fn second_start_while_running_is_refused() {
    let mut backend = FakeBackend::start().await;
    let dashboard = connected(&backend).await;

    dashboard.execute(Command::StartBandwidth).await.unwrap();
    let again = dashboard.execute(Command::StartBandwidth).await;
    assert!(matches!(
        again,
        Err(CoreError::AlreadyActive {
            panel: PanelKind::Bandwidth
        })
    ));

    dashboard
        .execute(Command::StartPortScan {
            host: "10.0.0.1".into(),
            ports: vec![22],
            scan_type: ScanType::TcpConnect,
        })
        .await
        .unwrap();
    let again = dashboard
        .execute(Command::StartPortScan {
            host: "10.0.0.2".into(),
            ports: vec![443],
            scan_type: ScanType::TcpConnect,
        })
        .await;
    assert!(matches!(
        again,
        Err(CoreError::AlreadyActive {
            panel: PanelKind::Ports
        })
    ));
    dashboard.execute(Command::StopBandwidth).await.unwrap();

    // Exactly one start per panel reached the backend.
    let names = [
        backend.next_event().await.0,
        backend.next_event().await.0,
        backend.next_event().await.0,
    ];
    assert_eq!(
        names,
        ["start_bandwidth_monitor", "start_port_scan", "stop_bandwidth_monitor"]
    );
    assert_eq!(
        dashboard.ports().borrow().target.as_deref(),
        Some("10.0.0.1")
    );
}

// ── Subscription gating ─────────────────────────────────────────────

#[tokio::test]
async fn events_for_detached_panels_are_dropped() {
    let mut backend = FakeBackend::start().await;
    let dashboard = connected(&backend).await;
    let _bandwidth_handler = dashboard.subscribe(PanelKind::Bandwidth);

    dashboard
        .execute(Command::StartPortScan {
            host: "10.0.0.1".into(),
            ports: vec![22],
            scan_type: ScanType::TcpConnect,
        })
        .await
        .unwrap();
    dashboard.execute(Command::StartBandwidth).await.unwrap();
    let _ = backend.next_event().await;
    let _ = backend.next_event().await;

    backend.push("scan_update", json!({"status": "open_port", "port": 22}));
    backend.push(
        "bandwidth_update",
        json!({"timestamp": "12:00:00", "upload": 12.5, "download": 80.0, "ping": 9.0}),
    );

    // The bandwidth sample arrives after the port event, so once it is
    // applied the port event has been handled.
    let mut bandwidth = dashboard.bandwidth();
    tokio::time::timeout(WAIT, bandwidth.wait_for(|s| !s.samples.is_empty()))
        .await
        .unwrap()
        .unwrap();
    assert!(dashboard.ports().borrow().ports.is_empty());
}

// ── Transport loss ──────────────────────────────────────────────────

#[tokio::test]
async fn losing_the_link_ends_running_scans() {
    let mut backend = FakeBackend::start().await;
    let dashboard = connected(&backend).await;
    let _ports_handler = dashboard.subscribe(PanelKind::Ports);
    let mut notifications = dashboard.notifications();

    dashboard
        .execute(Command::StartPortScan {
            host: "10.0.0.1".into(),
            ports: vec![22, 80],
            scan_type: ScanType::TcpSyn,
        })
        .await
        .unwrap();
    let _ = backend.next_event().await;

    backend.drop_link();

    let lost = tokio::time::timeout(WAIT, async {
        loop {
            let n = notifications.recv().await.unwrap();
            if n.title == "Lost connection to backend" {
                return n;
            }
        }
    })
    .await
    .unwrap();
    assert!(!lost.message.is_empty());
    assert!(!dashboard.ports().borrow().scanning);

    dashboard.disconnect().await;
}

// ── HTTP-only mode ──────────────────────────────────────────────────

async fn http_backend() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ftp/connections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "1", "name": "Production Server", "host": "ftp.example.com",
            "port": 21, "username": "admin", "protocol": "FTP"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/mail/connections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    server
}

fn http_only(server: &MockServer) -> Dashboard {
    let mut cfg = config(Url::parse(&server.uri()).unwrap());
    cfg.push_enabled = false;
    Dashboard::new(cfg)
}

#[tokio::test]
async fn connect_loads_profiles() {
    let server = http_backend().await;
    let dashboard = http_only(&server);
    dashboard.connect().await.unwrap();

    let ftp = dashboard.ftp();
    assert_eq!(ftp.borrow().profiles.len(), 1);
    assert!(dashboard.mail().borrow().profiles.is_empty());
}

#[tokio::test]
async fn push_commands_need_the_push_channel() {
    let server = http_backend().await;
    let dashboard = http_only(&server);
    dashboard.connect().await.unwrap();

    let result = dashboard.execute(Command::StartBandwidth).await;
    assert!(matches!(result, Err(CoreError::NotConnected)));
}

#[tokio::test]
async fn added_mail_profile_appears_in_panel() {
    let server = http_backend().await;
    Mock::given(method("POST"))
        .and(path("/api/mail/add_connection"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Connection added",
            "connection": {
                "id": "m-1", "name": "Work",
                "imap_host": "imap.example.com", "imap_port": 993,
                "smtp_host": "smtp.example.com", "smtp_port": 587,
                "username": "ops@example.com"
            }
        })))
        .mount(&server)
        .await;

    let dashboard = http_only(&server);
    dashboard.connect().await.unwrap();

    let result = dashboard
        .execute(Command::AddMailProfile(NewMailProfile {
            name: "Work".into(),
            imap_host: "imap.example.com".into(),
            imap_port: 993,
            smtp_host: "smtp.example.com".into(),
            smtp_port: 587,
            username: "ops@example.com".into(),
            password: "s3cret".to_owned().into(),
        }))
        .await
        .unwrap();

    let CommandResult::MailProfile(profile) = result else {
        panic!("expected the created profile");
    };
    assert_eq!(profile.id, "m-1");
    assert!(dashboard.mail().borrow().profiles.contains_key(&"m-1".to_owned()));
}

#[tokio::test]
async fn failed_profile_list_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ftp/connections"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/mail/connections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let dashboard = http_only(&server);
    dashboard.connect().await.unwrap();

    let result = dashboard.execute(Command::RefreshProfiles).await;
    assert!(result.is_err());
    assert!(dashboard.ftp().borrow().profiles.is_empty());
}
