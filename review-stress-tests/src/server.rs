use std::net::{SocketAddr, TcpStream};
use std::path::PathBuf;
use std::process::{Child, Command};
use std::time::{Duration, Instant};

/// A `review-server` child process; killed on drop.
pub struct ServerProcess {
    child: Child,
    pub addr: SocketAddr,
}

impl Drop for ServerProcess {
    fn drop(&mut self) {
        self.child.kill().ok();
    }
}

/// Reserve `count` free TCP ports by binding to port 0 for each, then
/// releasing them all at once.  Holding all listeners alive until the ports
/// are collected prevents the same port from being issued twice.
pub fn pick_free_ports(count: usize) -> Vec<u16> {
    let listeners: Vec<std::net::TcpListener> = (0..count)
        .filter_map(|_| std::net::TcpListener::bind("127.0.0.1:0").ok())
        .collect();
    let ports = listeners
        .iter()
        .filter_map(|l| l.local_addr().ok())
        .map(|a| a.port())
        .collect();
    drop(listeners);
    ports
}

/// Return the path to the `review-server` binary that sits alongside this
/// executable in `target/debug/` (or `target/debug/deps/` when run as a test).
fn server_binary_path() -> Result<PathBuf, String> {
    let mut path = std::env::current_exe()
        .map_err(|e| format!("Cannot determine own executable path: {e}"))?;
    path.pop();
    if path.file_name().map(|n| n == "deps").unwrap_or(false) {
        path.pop();
    }
    path.push("review-server");
    Ok(path)
}

const READY_TIMEOUT: Duration = Duration::from_secs(30);

impl ServerProcess {
    /// Build the `review-server` binary, spawn it on a free port and wait until it
    /// accepts connections.
    ///
    /// Returns `Err` if the build fails, the process cannot be spawned, or the
    /// readiness deadline elapses.  The caller maps this to exit code 3.
    pub fn build_and_spawn() -> Result<Self, String> {
        let status = Command::new("cargo")
            .args(["build", "-p", "review-server"])
            .status()
            .map_err(|e| format!("Failed to invoke cargo build: {e}"))?;
        if !status.success() {
            return Err(format!("cargo build -p review-server failed: {status}"));
        }

        let port = pick_free_ports(1)
            .first()
            .copied()
            .ok_or_else(|| "No free port available".to_string())?;
        let addr: SocketAddr = ([127, 0, 0, 1], port).into();

        let child = Command::new(server_binary_path()?)
            .args(["--address", &addr.to_string()])
            .env("RUST_LOG", "review_server=warn")
            .spawn()
            .map_err(|e| format!("Failed to spawn review-server: {e}"))?;
        // If the poll fails, `server` drops here and kills the process.
        let server = ServerProcess { child, addr };

        poll_until_ready(addr, Instant::now() + READY_TIMEOUT)
            .map_err(|e| format!("Server not ready within timeout: {e}"))?;
        Ok(server)
    }
}

/// Poll `addr` with a TCP connect attempt until the connection succeeds
/// or `deadline` is reached.  axum accepts as soon as it binds, so a successful
/// connect means HTTP requests will be answered.
fn poll_until_ready(addr: SocketAddr, deadline: Instant) -> Result<(), String> {
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(format!("timed out waiting for {addr}"));
        }
        let probe = Duration::min(remaining, Duration::from_millis(200));
        if TcpStream::connect_timeout(&addr, probe).is_ok() {
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}
