#![cfg(not(target_arch = "wasm32"))]

use std::rc::Rc;
use std::sync::Arc;

use file_upload_widget::{
    AcquiredFile, HeadlessHost, HttpTransport, UploadOutcome, UploadSettings, UploadWidget, WidgetConfig,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Reads one HTTP/1.1 request, honouring either Content-Length or chunked encoding.
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf).to_string();
        let Some(header_end) = text.find("\r\n\r\n") else {
            continue;
        };
        let head = text[..header_end].to_ascii_lowercase();
        let body_len = buf.len() - (header_end + 4);

        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok());

        match content_length {
            Some(expected) if body_len >= expected => break,
            None if head.contains("transfer-encoding: chunked") && text.ends_with("\r\n0\r\n\r\n") => break,
            _ => {}
        }
    }

    String::from_utf8_lossy(&buf).to_string()
}

async fn serve_once(listener: TcpListener, status_line: &'static str, body: &'static str) -> String {
    let (mut socket, _) = listener.accept().await.unwrap();
    let request = read_request(&mut socket).await;
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );
    socket.write_all(response.as_bytes()).await.unwrap();
    socket.shutdown().await.unwrap();
    request
}

fn transport_for(listener: &TcpListener) -> HttpTransport {
    let origin = format!("http://{}", listener.local_addr().unwrap());
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpTransport::with_client(client, Some(&origin)).unwrap()
}

#[tokio::test]
async fn uploads_multipart_body_with_extra_fields_and_headers() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let transport = transport_for(&listener);
    let server = tokio::spawn(serve_once(listener, "201 Created", r#"{"url":"https://example.com/f"}"#));

    let host = Rc::new(HeadlessHost::new());
    let config = WidgetConfig::new()
        .with_target_path("/upload")
        .with_allowed_extensions(["pdf"])
        .with_param("folder", "docs")
        .with_header("X-Token", "abc")
        .unwrap();
    let widget = UploadWidget::new(config, host.clone(), transport)
        .unwrap()
        .with_settings(Arc::new(UploadSettings {
            max_file_size: 1_000,
            base_url: "/myServer".to_string(),
        }));
    widget.bind();
    widget.handle_click().unwrap();
    let token = widget.pending_token().unwrap();

    let file = AcquiredFile::new("report.pdf", b"%PDF-1.7 hello".to_vec()).with_content_type("application/pdf");
    let outcome = widget.handle_files_selected(&token, vec![file]).await.unwrap();

    assert_eq!(
        outcome,
        UploadOutcome::Uploaded {
            status: 201,
            opened_url: Some("https://example.com/f".to_string()),
        }
    );
    assert_eq!(host.opened()[0].url, "https://example.com/f");
    assert!(host.forms().is_empty());

    let request = server.await.unwrap();
    let lowered = request.to_ascii_lowercase();
    assert!(request.starts_with("POST /myServer/upload HTTP/1.1"), "{}", request);
    assert!(lowered.contains("content-type: multipart/form-data; boundary="));
    assert!(lowered.contains("x-token: abc"));
    assert!(request.contains(r#"name="file"; filename="report.pdf""#));
    assert!(request.contains("%PDF-1.7 hello"));
    assert!(request.contains(r#"name="folder""#));
    assert!(request.contains("docs"));
}

#[tokio::test]
async fn conflict_from_server_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let transport = transport_for(&listener);
    let server = tokio::spawn(serve_once(
        listener,
        "409 Conflict",
        r#"{"errors":["name required","size too large"]}"#,
    ));

    let host = Rc::new(HeadlessHost::new());
    let widget = UploadWidget::new(WidgetConfig::new().with_target_path("/upload"), host.clone(), transport)
        .unwrap()
        .with_settings(Arc::new(UploadSettings {
            max_file_size: 1_000,
            base_url: String::new(),
        }));
    widget.bind();
    widget.handle_click().unwrap();
    let token = widget.pending_token().unwrap();

    let result = widget
        .handle_files_selected(&token, vec![AcquiredFile::new("notes.txt", b"hi".to_vec())])
        .await;

    assert!(result.is_err());
    assert_eq!(host.errors(), vec!["name required\nsize too large\n".to_string()]);
    server.await.unwrap();
}
