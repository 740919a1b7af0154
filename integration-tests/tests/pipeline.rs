use integration_tests::harness::access_log::AccessLog;
use logtop_core::aggregation::{AggregationLoop, Lifecycle};
use logtop_core::cli::run::pump_lines;
use logtop_core::tail::{TailOptions, Tailer};
use logtop_core::topk::Item;
use pretty_assertions::assert_eq;
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

fn tail_options() -> TailOptions {
    TailOptions {
        poll_interval: Duration::from_millis(10),
        from_end: false,
    }
}

fn next_non_empty(rx: &mpsc::Receiver<Vec<Item>>) -> Vec<Item> {
    loop {
        let items = rx.recv_timeout(WAIT).expect("no flush arrived");
        if !items.is_empty() {
            return items;
        }
    }
}

#[test]
fn tailed_requests_are_ranked_by_section() {
    let log = AccessLog::create();
    let tailer = Tailer::with_options(log.path(), tail_options());
    let aggregation = Arc::new(AggregationLoop::new(Duration::from_millis(300), 3).unwrap());

    let (tx, flushes) = mpsc::channel();
    aggregation
        .start(move |items| {
            let _ = tx.send(items);
        })
        .unwrap();

    let lines = tailer.start().unwrap();
    let pump = {
        let aggregation = aggregation.clone();
        thread::spawn(move || pump_lines(lines, &aggregation))
    };

    let mut content = String::new();
    for path in ["/api/user", "/api/order", "/blog", "/cart/1", "/docs/", "/api/user?id=2"] {
        content.push_str(&format!(
            "127.0.0.1 - - [09/May/2018:16:00:39 +0000] \"GET {path} HTTP/1.0\" 200 12\n"
        ));
    }
    content.push_str("not an access log line\n");
    log.append(&content);

    assert_eq!(
        next_non_empty(&flushes),
        vec![Item::new("/api", 3), Item::new("/blog", 1), Item::new("/cart", 1)]
    );

    tailer.stop().unwrap();
    let stats = pump.join().unwrap();
    tailer.wait().unwrap();

    assert_eq!(stats.lines, 7);
    assert_eq!(stats.skipped, 1);

    aggregation.stop().unwrap();
    aggregation.wait().unwrap();
    assert_eq!(aggregation.stats().observed, 6);
}

#[test]
fn windows_do_not_share_observations() {
    let log = AccessLog::create();
    let tailer = Tailer::with_options(log.path(), tail_options());
    let aggregation = Arc::new(AggregationLoop::new(Duration::from_millis(200), 5).unwrap());

    let (tx, flushes) = mpsc::channel();
    aggregation
        .start(move |items| {
            let _ = tx.send(items);
        })
        .unwrap();

    let lines = tailer.start().unwrap();
    let pump = {
        let aggregation = aggregation.clone();
        thread::spawn(move || pump_lines(lines, &aggregation))
    };

    log.request("GET", "/first", 200);
    assert_eq!(next_non_empty(&flushes), vec![Item::new("/first", 1)]);

    log.request("POST", "/second/form", 201);
    assert_eq!(next_non_empty(&flushes), vec![Item::new("/second", 1)]);

    tailer.stop().unwrap();
    pump.join().unwrap();
    tailer.wait().unwrap();

    aggregation.stop().unwrap();
    aggregation.wait().unwrap();
}

#[test]
fn shutdown_drops_late_observations() {
    let aggregation = AggregationLoop::new(Duration::from_millis(50), 3).unwrap();
    aggregation.start(|_| {}).unwrap();

    aggregation.stop().unwrap();
    aggregation.observe("x");

    aggregation.wait().unwrap();
    assert_eq!(aggregation.state(), Lifecycle::Stopped);
    assert_eq!(aggregation.stats().dropped, 1);
}
