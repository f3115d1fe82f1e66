//! End-to-end bridge tests
//!
//! Drive a real client connection against the bridge with a mock debugging
//! target behind it: hello announcement, tab enumeration, attach, the
//! normalized navigation event, detach, and the protocol error replies.

mod common;

use common::{MockTarget, TabSpec};
use devtools_bridge::protocol::packet::{read_packet, write_packet};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};

async fn start_bridge(target_url: String) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(devtools_bridge::server::serve(listener, target_url));
    addr
}

fn page_and_background() -> Vec<TabSpec> {
    vec![
        TabSpec {
            id: "tab-a",
            kind: "page",
            title: "Tab A",
            url: "http://old.example/",
            debuggable: true,
        },
        TabSpec {
            id: "bg-1",
            kind: "background_page",
            title: "Background",
            url: "http://bg.example/",
            debuggable: false,
        },
    ]
}

/// Connect and consume the hello announcement.
async fn connect(addr: std::net::SocketAddr) -> TcpStream {
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let hello = read_packet(&mut stream).await.unwrap().unwrap();
    assert_eq!(hello["from"], "root");

    stream
}

async fn list_tabs(stream: &mut TcpStream) -> Value {
    write_packet(stream, &json!({"to": "root", "type": "listTabs"}))
        .await
        .unwrap();
    read_packet(stream).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_hello_announces_no_capabilities() {
    let target = MockTarget::start(page_and_background()).await;
    let addr = start_bridge(target.base_url().to_string()).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    let hello = read_packet(&mut stream).await.unwrap().unwrap();

    assert_eq!(hello["from"], "root");
    assert_eq!(hello["applicationType"], "browser");
    let traits = hello["traits"].as_object().unwrap();
    assert_eq!(traits.len(), 8);
    assert!(traits.values().all(|flag| flag == false));
}

#[tokio::test]
async fn test_list_tabs_filters_and_selects() {
    let target = MockTarget::start(page_and_background()).await;
    let addr = start_bridge(target.base_url().to_string()).await;
    let mut stream = connect(addr).await;

    let reply = list_tabs(&mut stream).await;

    assert_eq!(reply["from"], "root");
    let tabs = reply["tabs"].as_array().unwrap();
    assert_eq!(tabs.len(), 1);
    assert_eq!(tabs[0]["title"], "Tab A");
    assert_eq!(tabs[0]["url"], "http://old.example/");
    assert!(tabs[0]["actor"].as_str().unwrap().starts_with("tab"));
    assert!(tabs[0]["consoleActor"].as_str().unwrap().starts_with("console"));
    assert_eq!(reply["selected"], 0);
}

#[tokio::test]
async fn test_list_tabs_twice_reuses_actor() {
    let target = MockTarget::start(page_and_background()).await;
    let addr = start_bridge(target.base_url().to_string()).await;
    let mut stream = connect(addr).await;

    let first = list_tabs(&mut stream).await;
    let second = list_tabs(&mut stream).await;

    assert_eq!(first["tabs"][0]["actor"], second["tabs"][0]["actor"]);
}

#[tokio::test]
async fn test_selected_absent_without_page_tab() {
    let target = MockTarget::start(vec![TabSpec {
        id: "wv-1",
        kind: "webview",
        title: "Embedded",
        url: "http://wv.example/",
        debuggable: true,
    }])
    .await;
    let addr = start_bridge(target.base_url().to_string()).await;
    let mut stream = connect(addr).await;

    let reply = list_tabs(&mut stream).await;

    assert_eq!(reply["tabs"].as_array().unwrap().len(), 1);
    assert!(reply.get("selected").is_none());
}

#[tokio::test]
async fn test_attach_navigation_detach() {
    let target = MockTarget::start(page_and_background()).await;
    let addr = start_bridge(target.base_url().to_string()).await;
    let mut stream = connect(addr).await;

    let reply = list_tabs(&mut stream).await;
    let actor = reply["tabs"][0]["actor"].as_str().unwrap().to_string();

    write_packet(&mut stream, &json!({"to": actor, "type": "attach"}))
        .await
        .unwrap();

    // The attach reply and the pushed navigation events race onto the
    // client connection; collect until all three arrived.
    let mut navigated = Vec::new();
    let mut attach_replied = false;
    while navigated.len() < 2 || !attach_replied {
        let packet = read_packet(&mut stream).await.unwrap().unwrap();
        if packet["type"] == "tabNavigated" {
            navigated.push(packet);
        } else if packet["from"] == actor.as_str() {
            attach_replied = true;
        }
    }

    // One two-phase event for the top-level transition; the subordinate
    // frame's notifications produced nothing.
    assert_eq!(navigated[0]["state"], "start");
    assert_eq!(navigated[0]["url"], "http://old.example/");
    assert_eq!(navigated[0]["nativeConsoleAPI"], true);
    assert_eq!(navigated[1]["state"], "stop");
    assert_eq!(navigated[1]["url"], "http://new.example/");

    // Every event precedes the detach reply on the wire, so anything that
    // slipped through the top-level filter would surface here.
    write_packet(&mut stream, &json!({"to": actor, "type": "detach"}))
        .await
        .unwrap();
    loop {
        let packet = read_packet(&mut stream).await.unwrap().unwrap();
        if packet["type"] == "tabNavigated" {
            panic!("unexpected extra navigation event: {}", packet);
        }
        if packet["from"] == actor.as_str() {
            break;
        }
    }
}

#[tokio::test]
async fn test_console_actor_constructed_on_first_access() {
    let target = MockTarget::start(page_and_background()).await;
    let addr = start_bridge(target.base_url().to_string()).await;
    let mut stream = connect(addr).await;

    let reply = list_tabs(&mut stream).await;
    let console = reply["tabs"][0]["consoleActor"].as_str().unwrap().to_string();

    write_packet(&mut stream, &json!({"to": console, "type": "getCachedMessages"}))
        .await
        .unwrap();
    let reply = read_packet(&mut stream).await.unwrap().unwrap();

    assert_eq!(reply["from"], console.as_str());
    assert_eq!(reply["messages"], json!([]));
}

#[tokio::test]
async fn test_unknown_actor_reply() {
    let target = MockTarget::start(page_and_background()).await;
    let addr = start_bridge(target.base_url().to_string()).await;
    let mut stream = connect(addr).await;

    write_packet(&mut stream, &json!({"to": "tab99", "type": "attach"}))
        .await
        .unwrap();
    let reply = read_packet(&mut stream).await.unwrap().unwrap();

    assert_eq!(reply["from"], "tab99");
    assert_eq!(reply["error"], "noSuchActor");
}

#[tokio::test]
async fn test_unknown_packet_type_reply() {
    let target = MockTarget::start(page_and_background()).await;
    let addr = start_bridge(target.base_url().to_string()).await;
    let mut stream = connect(addr).await;

    write_packet(&mut stream, &json!({"to": "root", "type": "requestTypes"}))
        .await
        .unwrap();
    let reply = read_packet(&mut stream).await.unwrap().unwrap();

    assert_eq!(reply["from"], "root");
    assert_eq!(reply["error"], "unrecognizedPacketType");
}

#[tokio::test]
async fn test_list_tabs_with_unreachable_target() {
    // Bind then drop a listener so the discovery port is known to refuse.
    let dead = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = dead.local_addr().unwrap();
    drop(dead);

    let addr = start_bridge(format!("http://{}", dead_addr)).await;
    let mut stream = connect(addr).await;

    write_packet(&mut stream, &json!({"to": "root", "type": "listTabs"}))
        .await
        .unwrap();
    let reply = read_packet(&mut stream).await.unwrap().unwrap();

    assert_eq!(reply["from"], "root");
    assert_eq!(reply["error"], "unavailable");
}
