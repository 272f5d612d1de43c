use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<Option<TestServer>> = OnceLock::new();
static COUNTER: AtomicU32 = AtomicU32::new(0);

pub struct TestServer {
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        let child = Command::new("target/debug/nhatro-api")
            .env("PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        Ok(Self { base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

/// Returns the shared test server, or `None` when no database is configured
/// so suites can skip instead of failing.
pub async fn ensure_server() -> Result<Option<&'static TestServer>> {
    if std::env::var("DATABASE_URL").is_err() && !std::path::Path::new(".env").exists() {
        eprintln!("DATABASE_URL not set; skipping integration tests");
        return Ok(None);
    }

    let server = SERVER.get_or_init(|| TestServer::spawn().ok());
    let Some(server) = server else {
        anyhow::bail!("failed to spawn server binary; run `cargo build` first");
    };
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(Some(server))
}

/// Email unique across test runs and within one run.
pub fn unique_email(prefix: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}@test.local", prefix, now, n)
}

/// Registers a tenant or landlord portal account, returning (token, body).
pub async fn register(
    base_url: &str,
    portal: &str,
    email: &str,
    full_name: &str,
) -> Result<(String, Value)> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/api/auth/{}/register", base_url, portal))
        .json(&json!({
            "email": email,
            "password": "secret-123",
            "full_name": full_name,
        }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "register {} failed: {}",
        portal,
        res.status()
    );
    let body: Value = res.json().await?;
    let token = body["token"].as_str().context("missing token")?.to_string();
    Ok((token, body))
}

pub async fn login(base_url: &str, portal: &str, email: &str, password: &str) -> Result<String> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/api/auth/{}/login", base_url, portal))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
    let body: Value = res.json().await?;
    body["token"]
        .as_str()
        .map(str::to_string)
        .context("missing token")
}

const ADMIN_EMAIL: &str = "admin@test.local";
const ADMIN_PASSWORD: &str = "admin-secret-123";

/// Seeds the bootstrap admin through the CLI binary (ignoring the conflict
/// when it already exists from an earlier run) and logs in.
pub async fn admin_token(base_url: &str) -> Result<String> {
    let _ = Command::new("target/debug/create_admin")
        .args([
            "--email",
            ADMIN_EMAIL,
            "--password",
            ADMIN_PASSWORD,
            "--full-name",
            "Test Admin",
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    login(base_url, "admin", ADMIN_EMAIL, ADMIN_PASSWORD).await
}

/// Creates a pending rental post as the given landlord and returns its id.
pub async fn create_post(base_url: &str, landlord_token: &str) -> Result<String> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/api/rental-posts", base_url))
        .bearer_auth(landlord_token)
        .json(&json!({
            "title": "Phòng trọ trung tâm",
            "description": "Phòng sạch sẽ, thoáng mát",
            "price": "3500000",
            "area": "25",
            "address_detail": "12 Ngõ Huyện",
            "province_code": "01",
            "ward_code": "00025",
        }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "create post failed: {}",
        res.status()
    );
    let body: Value = res.json().await?;
    body["post"]["id"]
        .as_str()
        .map(str::to_string)
        .context("missing post id")
}

/// Approves a post through the admin moderation endpoint.
pub async fn approve_post(base_url: &str, admin_token: &str, post_id: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let res = client
        .put(format!("{}/api/rental-posts/approve", base_url))
        .bearer_auth(admin_token)
        .json(&json!({ "id": post_id }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "approve failed: {}", res.status());
    Ok(())
}
