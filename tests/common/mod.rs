use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

pub struct TestServer {
    pub base_url: String,
    child: Child,
}

/// True when the environment (or .env) points at a PostgreSQL instance
pub fn database_configured() -> bool {
    let _ = dotenvy::dotenv();
    std::env::var("DATABASE_URL").is_ok() || std::env::var("POSTGRES_HOST").is_ok()
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_users-api"));
        cmd.env("USERS_API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server can see DATABASE_URL / POSTGRES_* from .env
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Start a server against the configured database, or `None` when there is none
pub async fn start_server() -> Result<Option<TestServer>> {
    if !database_configured() {
        eprintln!("skipping: no DATABASE_URL or POSTGRES_HOST configured");
        return Ok(None);
    }
    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(Some(server))
}

fn check_digit(digits: &[u32]) -> u32 {
    let n = digits.len() as u32;
    let sum: u32 = digits.iter().enumerate().map(|(i, d)| d * (n + 1 - i as u32)).sum();
    let r = 11 - (sum % 11);
    if r >= 10 {
        0
    } else {
        r
    }
}

/// A fresh, checksum-valid CPF derived from a random UUID
pub fn random_cpf() -> String {
    let seed = uuid::Uuid::new_v4().as_u128();
    let mut digits: Vec<u32> = (0..9).map(|i| ((seed >> (i * 4)) % 10) as u32).collect();
    // Avoid the all-same-digit case
    digits[0] = (digits[8] + 1) % 10;
    digits.push(check_digit(&digits));
    digits.push(check_digit(&digits));
    digits.iter().map(|d| char::from_digit(*d, 10).unwrap_or('0')).collect()
}
