use futures::future::join_all;
use pagecast_e2e::{init_tracing, RelayHandle};
use pagecast_relay::RelayConfig;
use serde_json::json;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(3);

fn click(id: &str) -> serde_json::Value {
    json!({
        "elementType": "button",
        "actionType": "click",
        "generatedCode": format!("driver.findElement(By.id(\"{}\")).click();", id),
    })
}

/// Every live viewer receives the posted object, fields intact, plus a
/// relay-assigned timestamp.
#[tokio::test]
async fn viewers_receive_stamped_record() {
    init_tracing();
    let relay = RelayHandle::spawn_default().await.unwrap();
    let mut a = relay.connect_viewer().await.unwrap();
    let mut b = relay.connect_viewer().await.unwrap();

    let sent = json!({
        "actionType": "sendKeys",
        "value": "hello",
        "nested": {"list": [1, 2, 3], "flag": true},
    });
    let echoed = relay.post_action(&sent).await.unwrap();

    for viewer in [&mut a, &mut b] {
        let got = viewer.next_record(WAIT).await.unwrap();
        assert_eq!(got, echoed);

        let ts = got["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok(), "not RFC 3339: {}", ts);
        // 2024-05-01T12:34:56.789Z
        assert_eq!(ts.len(), 24);
        assert!(ts.ends_with('Z'));

        let mut without_ts = got.clone();
        without_ts.as_object_mut().unwrap().remove("timestamp");
        assert_eq!(without_ts, sent);
    }
}

#[tokio::test]
async fn producer_timestamp_is_preserved() {
    let relay = RelayHandle::spawn_default().await.unwrap();
    let mut viewer = relay.connect_viewer().await.unwrap();

    let mut action = click("go");
    action["timestamp"] = json!("2020-01-01T00:00:00.000Z");
    relay.post_action(&action).await.unwrap();

    let got = viewer.next_record(WAIT).await.unwrap();
    assert_eq!(got["timestamp"], "2020-01-01T00:00:00.000Z");
}

#[tokio::test]
async fn ingest_with_no_viewers_succeeds() {
    let relay = RelayHandle::spawn_default().await.unwrap();
    let echoed = relay.post_action(&click("lonely")).await.unwrap();
    assert_eq!(echoed["actionType"], "click");
    assert!(echoed["timestamp"].is_string());
}

#[tokio::test]
async fn late_joiner_gets_no_history() {
    let relay = RelayHandle::spawn_default().await.unwrap();
    let mut early = relay.connect_viewer().await.unwrap();

    relay.post_action(&click("first")).await.unwrap();
    early.next_record(WAIT).await.unwrap();

    let mut late = relay.connect_viewer().await.unwrap();
    late.expect_silence(Duration::from_millis(300)).await.unwrap();

    relay.post_action(&click("second")).await.unwrap();
    let got = late.next_record(WAIT).await.unwrap();
    assert!(got["generatedCode"].as_str().unwrap().contains("second"));
}

#[tokio::test]
async fn all_viewers_see_the_same_order() {
    let relay = RelayHandle::spawn_default().await.unwrap();
    let mut viewers = Vec::new();
    for _ in 0..4 {
        viewers.push(relay.connect_viewer().await.unwrap());
    }

    let ids: Vec<String> = (0..20).map(|i| format!("el{}", i)).collect();
    for id in &ids {
        relay.post_action(&click(id)).await.unwrap();
    }

    for viewer in &mut viewers {
        let mut seen = Vec::new();
        for _ in 0..ids.len() {
            let got = viewer.next_record(WAIT).await.unwrap();
            seen.push(got["generatedCode"].as_str().unwrap().to_string());
        }
        let expected: Vec<String> = ids
            .iter()
            .map(|id| format!("driver.findElement(By.id(\"{}\")).click();", id))
            .collect();
        assert_eq!(seen, expected);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ingest_keeps_one_order_for_all_viewers() {
    let relay = RelayHandle::spawn_default().await.unwrap();
    let mut viewers = Vec::new();
    for _ in 0..3 {
        viewers.push(relay.connect_viewer().await.unwrap());
    }

    let actions: Vec<_> = (0..20).map(|i| click(&format!("c{}", i))).collect();
    let posts = actions.iter().map(|a| relay.post_action(a));
    for result in join_all(posts).await {
        result.unwrap();
    }

    let mut orders = Vec::new();
    for viewer in &mut viewers {
        let mut seen = Vec::new();
        for _ in 0..actions.len() {
            let got = viewer.next_record(WAIT).await.unwrap();
            seen.push(got["generatedCode"].as_str().unwrap().to_string());
        }
        orders.push(seen);
    }

    let mut sorted = orders[0].clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), actions.len());
    for order in &orders[1..] {
        assert_eq!(order, &orders[0]);
    }
}

#[tokio::test]
async fn closed_viewer_does_not_block_others() {
    let relay = RelayHandle::spawn_default().await.unwrap();
    let gone = relay.connect_viewer().await.unwrap();
    let abandoned = relay.connect_viewer().await.unwrap();
    let mut alive = relay.connect_viewer().await.unwrap();

    gone.close().await.unwrap();
    abandoned.abandon();

    for i in 0..5 {
        relay.post_action(&click(&format!("b{}", i))).await.unwrap();
    }
    for i in 0..5 {
        let got = alive.next_record(WAIT).await.unwrap();
        assert!(got["generatedCode"].as_str().unwrap().contains(&format!("\"b{}\"", i)));
    }

    relay.wait_for_connections(1).await.unwrap();
}

#[tokio::test]
async fn viewer_messages_are_ignored() {
    let relay = RelayHandle::spawn_default().await.unwrap();
    let mut chatty = relay.connect_viewer().await.unwrap();
    let mut quiet = relay.connect_viewer().await.unwrap();

    chatty.send_text("hello relay").await.unwrap();
    quiet.expect_silence(Duration::from_millis(200)).await.unwrap();
    chatty.expect_silence(Duration::from_millis(50)).await.unwrap();
    assert_eq!(relay.connections().await.unwrap(), 2);
}

#[tokio::test]
async fn malformed_ingest_is_rejected_without_broadcast() {
    let relay = RelayHandle::spawn_default().await.unwrap();
    let mut viewer = relay.connect_viewer().await.unwrap();

    let resp = relay.post_raw("{not json").await.unwrap();
    assert!(resp.status().is_client_error());
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    let resp = relay.post_raw("[\"click\"]").await.unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    viewer.expect_silence(Duration::from_millis(300)).await.unwrap();
}

#[tokio::test]
async fn shutdown_closes_viewers() {
    let relay = RelayHandle::spawn(RelayConfig::default()).await.unwrap();
    let mut viewer = relay.connect_viewer().await.unwrap();

    relay.stop().await.unwrap();
    assert!(viewer.next_record(WAIT).await.is_err());
}
