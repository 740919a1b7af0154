use integration_tests::harness::tracing::LogCapture;
use logtop_core::aggregation::AggregationLoop;
use std::time::Duration;
use tracing::Level;

#[test]
fn aggregation_loop_logs_its_lifecycle() {
    let capture = LogCapture::install();

    let aggregation = AggregationLoop::new(Duration::from_millis(20), 3).unwrap();
    aggregation.start(|_| {}).unwrap();
    std::thread::sleep(Duration::from_millis(60));

    aggregation.stop().unwrap();
    aggregation.observe("/late");
    aggregation.wait().unwrap();

    assert!(capture.contains("aggregation loop started"));
    assert!(capture.contains("flushing sections"));
    assert!(capture.contains("aggregation loop not running, observation dropped"));
    assert!(capture.contains("exiting aggregation loop"));

    let lines = capture.lines();
    assert!(lines.iter().all(|l| l.module.starts_with("logtop_core")));
    assert!(
        lines
            .iter()
            .any(|l| l.level == Level::INFO && l.message == "exiting aggregation loop")
    );
}
