use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use tempfile::NamedTempFile;
use tokio::time::timeout;

/// Find a port with nothing listening on it
fn get_unused_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Run the node to completion and return its exit code
async fn run_node(config_path: &std::path::Path) -> i32 {
    let child = tokio::process::Command::new(env!("CARGO_BIN_EXE_traj_generator"))
        .env("TRAJGEN_CONFIG", config_path)
        .env("RUST_LOG", "error")
        .kill_on_drop(true)
        .output();

    let output = timeout(Duration::from_secs(10), child)
        .await
        .expect("node did not exit in time")
        .expect("failed to run node");
    output.status.code().expect("node killed by signal")
}

#[tokio::test]
async fn test_unreachable_gateway_exits_with_unavailable_code() {
    let config = write_config(&format!(
        r#"
[bridge]
url = "http://127.0.0.1:{}"
availability_poll_interval_ms = 20

[orchestrator]
service_poll_interval_ms = 20
service_wait_timeout_ms = 200
"#,
        get_unused_port()
    ));

    assert_eq!(run_node(config.path()).await, 2);
}

#[tokio::test]
async fn test_invalid_config_exits_with_one() {
    let config = write_config(
        r#"
[bridge]
url = "ftp://gateway"
"#,
    );

    assert_eq!(run_node(config.path()).await, 1);
}

#[tokio::test]
async fn test_malformed_config_exits_with_one() {
    let config = write_config("[orchestrator]\nresult_timeout_ms = \"later\"\n");

    assert_eq!(run_node(config.path()).await, 1);
}
