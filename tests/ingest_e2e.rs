//! End-to-end capture tests against a live listener.

use std::collections::HashSet;
use std::time::Duration;

use capture_gateway::ingest::{QueueReference, StoredObject};

mod common;

use common::{client, start_gateway, BUCKET, QUEUE_URL};

#[tokio::test]
async fn test_capture_with_correlation_header() {
    let gw = start_gateway(Duration::from_secs(5)).await;

    let res = client()
        .post(gw.url("/webhooks/github?delivery=7"))
        .header("Fly-Request-Id", "abc123")
        .header("Content-Type", "application/json")
        .body(r#"{"x":1}"#)
        .send()
        .await
        .expect("gateway unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "done");

    let stored = gw.store.get(BUCKET, "abc123").expect("object for abc123");
    let object = StoredObject::from_json(&stored).unwrap();
    assert_eq!(object.decode_body().unwrap(), br#"{"x":1}"#);
    assert_eq!(object.uri, "/webhooks/github?delivery=7");
    assert_eq!(object.headers["Fly-Request-Id"], vec!["abc123".to_string()]);
    assert_eq!(object.headers["Content-Type"], vec!["application/json".to_string()]);

    let messages = gw.queue.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].queue_url, QUEUE_URL);
    let body: serde_json::Value = serde_json::from_str(&messages[0].body).unwrap();
    assert_eq!(body, serde_json::json!({ "bucket": BUCKET, "key": "abc123" }));

    gw.shutdown.trigger();
    assert!(gw.handle.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_store_failure_returns_500_without_publish() {
    let gw = start_gateway(Duration::from_secs(5)).await;
    gw.store.fail_writes(true);

    let res = client()
        .post(gw.url("/"))
        .header("Fly-Request-Id", "abc123")
        .body(r#"{"x":1}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    assert_eq!(res.text().await.unwrap(), "server error");
    assert_eq!(gw.store.attempts(), 1);
    assert_eq!(gw.queue.attempts(), 0);
    assert!(gw.queue.messages().is_empty());

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_publish_failure_returns_500_and_keeps_object() {
    let gw = start_gateway(Duration::from_secs(5)).await;
    gw.queue.fail_sends(true);

    let res = client()
        .post(gw.url("/"))
        .header("Fly-Request-Id", "abc123")
        .body(r#"{"x":1}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    assert_eq!(res.text().await.unwrap(), "server error");
    assert!(gw.store.get(BUCKET, "abc123").is_some());
    assert_eq!(gw.queue.attempts(), 1);

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_up_ignores_collaborator_health() {
    let gw = start_gateway(Duration::from_secs(5)).await;
    gw.store.fail_writes(true);
    gw.queue.fail_sends(true);

    for _ in 0..3 {
        let res = client().get(gw.url("/up")).send().await.unwrap();
        assert_eq!(res.status(), 200);
        assert_eq!(res.text().await.unwrap(), "up");
    }

    assert_eq!(gw.store.attempts(), 0);
    assert_eq!(gw.queue.attempts(), 0);

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_generated_ids_are_distinct_and_linked() {
    let gw = start_gateway(Duration::from_secs(5)).await;
    let client = client();

    for _ in 0..2 {
        let res = client.put(gw.url("/items")).body("same body").send().await.unwrap();
        assert_eq!(res.status(), 200);
    }

    let keys: Vec<String> = gw
        .queue
        .messages()
        .iter()
        .map(|m| QueueReference::from_message(&m.body).unwrap().key)
        .collect();
    assert_eq!(keys.len(), 2);
    assert_ne!(keys[0], keys[1]);
    for key in &keys {
        assert!(gw.store.get(BUCKET, key).is_some(), "no object for {key}");
    }

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_binary_body_is_byte_exact() {
    let gw = start_gateway(Duration::from_secs(5)).await;
    let payload: Vec<u8> = (0..4096u32).map(|i| (i * 31 % 256) as u8).collect();

    let res = client()
        .post(gw.url("/upload"))
        .header("Fly-Request-Id", "binary-1")
        .header("Content-Type", "application/octet-stream")
        .body(payload.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let object = StoredObject::from_json(&gw.store.get(BUCKET, "binary-1").unwrap()).unwrap();
    assert_eq!(object.decode_body().unwrap(), payload);

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    let gw = start_gateway(Duration::from_secs(5)).await;
    gw.store.set_delay(Duration::from_millis(20));
    let client = client();

    let mut tasks = Vec::new();
    for i in 0..20 {
        let client = client.clone();
        let url = gw.url(&format!("/batch/{i}"));
        tasks.push(tokio::spawn(async move {
            client
                .post(url)
                .header("Fly-Request-Id", format!("req-{i}"))
                .body(format!("payload {i}"))
                .send()
                .await
                .unwrap()
                .status()
        }));
    }

    for task in tasks {
        assert_eq!(task.await.unwrap(), 200);
    }

    assert_eq!(gw.store.len(), 20);
    let keys: HashSet<String> = gw
        .queue
        .messages()
        .iter()
        .map(|m| QueueReference::from_message(&m.body).unwrap().key)
        .collect();
    assert_eq!(keys.len(), 20);
    for i in 0..20 {
        let object = StoredObject::from_json(&gw.store.get(BUCKET, &format!("req-{i}")).unwrap()).unwrap();
        assert_eq!(object.decode_body().unwrap(), format!("payload {i}").into_bytes());
    }

    gw.shutdown.trigger();
}
