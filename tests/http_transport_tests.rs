use std::time::Duration;
use hfinfer::transport::{HttpTransport, Transport, TransportError};
use hfinfer::Credential;
use reqwest::Url;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Read one HTTP/1.1 request: head up to the blank line, then
/// `content-length` bytes of body
async fn read_request(stream: &mut TcpStream) -> (String, String)
{   let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop
    {   let n = stream.read(&mut chunk).await.unwrap();
        if n == 0
        {   break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n")
        {   let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
            let length = head
              .lines()
              .find_map(|l| l.strip_prefix("content-length:"))
              .map(|v| v.trim().parse::<usize>().unwrap())
              .unwrap_or(0);
            if buf.len() >= pos + 4 + length
            {   break;
            }
        }
    }
    let text = String::from_utf8(buf).unwrap();
    let (head, body) = text.split_once("\r\n\r\n").unwrap();
    (head.to_string(), body.to_string())
}

#[tokio::test]
async fn posts_json_with_trimmed_bearer_token()
{   let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
      let (mut stream, _) = listener.accept().await.unwrap();
      let request = read_request(&mut stream).await;
      let reply = r#"[{"generated_text":"Dhokla"}]"#;
      let response = format!(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
         content-length: {}\r\nconnection: close\r\n\r\n{}",
        reply.len(),
        reply
      );
      stream.write_all(response.as_bytes()).await.unwrap();
      stream.shutdown().await.unwrap();
      request
    });

    let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
    let endpoint = Url::parse(
      &format!("http://{}/models/acme/chat", addr)
    ).unwrap();
    let body = serde_json::json!({
      "inputs": "What does Gujarat eat?",
      "parameters": { "max_length": 20, "temperature": 0.5, "do_sample": true }
    });
    let response = transport
      .post_json(&endpoint, &Credential::new("  hf_local_token \n"), &body)
      .await
      .unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, r#"[{"generated_text":"Dhokla"}]"#);

    let (head, sent) = server.await.unwrap();
    assert!(head.starts_with("POST /models/acme/chat HTTP/1.1\r\n"));
    let head = head.to_lowercase();
    assert!(head.contains("authorization: bearer hf_local_token\r\n"));
    assert!(head.contains("content-type: application/json"));
    let sent: serde_json::Value = serde_json::from_str(&sent).unwrap();
    assert_eq!(sent, body);
}

#[tokio::test]
async fn stalled_server_maps_to_timeout()
{   let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
      let (stream, _) = listener.accept().await.unwrap();
      tokio::time::sleep(Duration::from_secs(10)).await;
      drop(stream);
    });

    let transport = HttpTransport::new(Duration::from_millis(300)).unwrap();
    let endpoint = Url::parse(&format!("http://{}/models/slow", addr))
      .unwrap();
    let result = transport
      .post_json(
        &endpoint,
        &Credential::new("hf_local_token"),
        &serde_json::json!({ "inputs": "hi" })
      )
      .await;
    assert_eq!(result, Err(TransportError::Timeout));
}

#[tokio::test]
async fn refused_connection_is_network_error()
{   let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
    let endpoint = Url::parse(&format!("http://{}/models/gone", addr))
      .unwrap();
    let result = transport
      .post_json(
        &endpoint,
        &Credential::new("hf_local_token"),
        &serde_json::json!({ "inputs": "hi" })
      )
      .await;
    match result
    {   Err(TransportError::Network(msg)) => {
          assert!(!msg.contains("hf_local_token"));
        }
      , other => panic!("expected network error, got {:?}", other)
    }
}
