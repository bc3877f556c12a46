// crates/rehash/src/tunnel.rs

use std::net::TcpListener;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use rehash_core::config::SshParams;
use tokio::process::{Child, Command};

const PROBE_ATTEMPTS: u32 = 40;
const PROBE_INTERVAL: Duration = Duration::from_millis(250);

/// A forwarded SSH port to the remote database. The `ssh` child process is
/// killed on drop, so the tunnel's lifetime brackets exactly the queries
/// issued inside its scope.
pub struct SshTunnel {
    child: Child,
    local_port: u16,
}

impl SshTunnel {
    /// Spawns `ssh -N -L` against the bastion and waits until the local
    /// forward accepts connections.
    pub async fn open(params: &SshParams) -> Result<Self> {
        let local_port = reserve_local_port()?;

        let mut child = Command::new("ssh")
            .args(forward_args(params, local_port))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .context("failed to spawn ssh for the tunnel")?;

        for _ in 0..PROBE_ATTEMPTS {
            if let Some(status) = child.try_wait()? {
                bail!("ssh tunnel exited during setup with {status}");
            }
            if tokio::net::TcpStream::connect(("127.0.0.1", local_port))
                .await
                .is_ok()
            {
                tracing::info!("ssh tunnel up on 127.0.0.1:{local_port}");
                return Ok(Self { child, local_port });
            }
            tokio::time::sleep(PROBE_INTERVAL).await;
        }

        child.start_kill().ok();
        bail!(
            "ssh tunnel to {}:{} did not come up",
            params.host,
            params.port
        )
    }

    pub fn local_port(&self) -> u16 {
        self.local_port
    }
}

impl Drop for SshTunnel {
    fn drop(&mut self) {
        if let Err(err) = self.child.start_kill() {
            tracing::warn!("failed to stop ssh tunnel: {err}");
        }
    }
}

/// Binds port 0 to let the OS pick a free port, then releases it for ssh.
fn reserve_local_port() -> Result<u16> {
    let listener =
        TcpListener::bind(("127.0.0.1", 0)).context("no free local port for the tunnel")?;
    Ok(listener.local_addr()?.port())
}

fn forward_args(params: &SshParams, local_port: u16) -> Vec<String> {
    vec![
        "-N".to_string(),
        "-L".to_string(),
        format!(
            "127.0.0.1:{}:{}:{}",
            local_port, params.remote_host, params.remote_port
        ),
        "-i".to_string(),
        params.private_key.display().to_string(),
        "-p".to_string(),
        params.port.to_string(),
        "-o".to_string(),
        "BatchMode=yes".to_string(),
        "-o".to_string(),
        "ExitOnForwardFailure=yes".to_string(),
        format!("{}@{}", params.username, params.host),
    ]
}
