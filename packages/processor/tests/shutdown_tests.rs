//! Shutdown signal handling.
//!
//! Lives in its own test binary: it signals the whole test process.

use std::time::Duration;

use processor_core::server::shutdown_signal;

#[cfg(unix)]
#[tokio::test]
async fn sigterm_triggers_shutdown() {
    let shutdown = tokio::spawn(shutdown_signal());

    // Let the handlers register before signalling
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!shutdown.is_finished());

    let status = std::process::Command::new("kill")
        .args(["-TERM", &std::process::id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    tokio::time::timeout(Duration::from_secs(5), shutdown)
        .await
        .expect("shutdown did not resolve after SIGTERM")
        .unwrap();
}
