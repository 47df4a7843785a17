use axum::{
    extract::Multipart,
    routing::{get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use reqwest::{multipart, Client, StatusCode};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

// Mock backends outlive every per-test runtime, so each gets its own thread.
static BACKEND: Lazy<String> = Lazy::new(|| serve_backend(backend_router));
static FAILING_BACKEND: Lazy<String> = Lazy::new(|| serve_backend(failing_backend_router));

fn serve_backend(router: fn() -> Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock backend");
    listener.set_nonblocking(true).expect("nonblocking listener");
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("mock backend runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, router()).await.unwrap();
        });
    });

    format!("http://{addr}")
}

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn backend_router() -> Router {
    Router::new()
        .route(
            "/api/dashboard/",
            get(|| async {
                Json(json!({
                    "traffic": {
                        "address": "Main St",
                        "congestion_rate": 64.5,
                        "flow_speed": 22,
                        "delay_time": 7,
                        "has_incident": true,
                        "incident_count": 1,
                        "status_code": "HEAVY",
                        "status_color": "#e67e22",
                        "analysis": "Rush hour build-up",
                        "recommendation": "Leave after 6pm",
                        "alternative_routes": []
                    },
                    "energy": null,
                    "waste": {
                        "avg_fill_level": 81.0,
                        "critical_count": 2,
                        "warning_count": 0,
                        "warning_locations": []
                    },
                    "reports": { "pending_count": 1, "total_count": 9, "recent": [] }
                }))
            }),
        )
        .route(
            "/api/reports/",
            get(|| async {
                Json(json!([
                    { "issue_type": "traffic", "status": "pending", "location": "Main St",
                      "description": "Signal out", "reporter_name": "Binh",
                      "created_at": "2026-01-05T14:30:00Z" },
                    { "issue_type": "waste", "status": "resolved", "location": "Oak Ave",
                      "description": "Overflowing bin", "reporter_name": "Chi",
                      "created_at": "2026-01-04T09:00:00Z", "updated_at": "2026-01-06T08:00:00Z" }
                ]))
            })
            .post(create_report),
        )
        .route(
            "/api/check-traffic/",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "hasIncident": false,
                    "incidentCount": 0,
                    "statusColor": "#2ecc71",
                    "statusCode": "CLEAR",
                    "address": body["location"],
                    "congestionRate": "12.346",
                    "flowSpeed": 48,
                    "delayTime": 0,
                    "analysis": "Free flow",
                    "recommendation": "Go ahead",
                    "alternativeRoutes": ["Ring Rd"]
                }))
            }),
        )
        .route(
            "/api/subscribe/",
            post(|Json(body): Json<Value>| async move {
                if body["email"] == json!("taken@x.com") {
                    Json(json!({ "success": false, "message": "Already subscribed" }))
                } else {
                    Json(json!({ "success": true }))
                }
            }),
        )
}

fn failing_backend_router() -> Router {
    Router::new()
        .route(
            "/api/reports/",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database down") }).post(
                |mut multipart: Multipart| async move {
                    while let Some(field) = multipart.next_field().await.unwrap() {
                        let _ = field.bytes().await.unwrap();
                    }
                    Json(json!({ "success": false, "message": "Invalid issue type" }))
                },
            ),
        )
        .route(
            "/api/check-traffic/",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream timeout") }),
        )
}

async fn create_report(mut multipart: Multipart) -> Json<Value> {
    let mut names = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        names.push(field.name().unwrap_or_default().to_string());
        let _ = field.bytes().await.unwrap();
    }

    if names.iter().any(|name| name == "image") && names.iter().any(|name| name == "reporter_name") {
        Json(json!({ "success": true, "id": 12 }))
    } else {
        Json(json!({ "success": false, "message": "missing fields" }))
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_session_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("city_dashboard_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/login")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server(backend: &str) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_city_dashboard"))
        .env("PORT", port.to_string())
        .env("API_BASE_URL", backend)
        .env("SESSION_PATH", unique_session_path())
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server(BACKEND.as_str()).await);
    #[cfg(unix)]
    cleanup::register(server.child.id());
    *guard = Some(Arc::clone(&server));
    server
}

async fn page(client: &Client, url: String) -> String {
    let response = client.get(url).send().await.unwrap();
    assert!(response.status().is_success());
    response.text().await.unwrap()
}

#[tokio::test]
async fn http_dashboard_renders_backend_sections() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let html = page(&client, format!("{}/", server.base_url)).await;
    assert!(html.contains("📍 Main St"));
    assert!(html.contains("HEAVY"));
    assert!(html.contains("64.50%"));
    assert!(html.contains("🚨 2 Critical"));
    assert!(html.contains("9 Total"));
    assert!(html.contains("No data yet"));
    assert!(!html.contains("Failed to load data"));
}

#[tokio::test]
async fn http_reports_filter_by_status() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let html = page(&client, format!("{}/reports?status=resolved", server.base_url)).await;
    assert!(html.contains("📍 Oak Ave"));
    assert!(!html.contains("📍 Main St"));
    assert!(html.contains("1 of 2 reports resolved"));
    assert!(html.contains("Updated: 06 Jan 2026, 08:00"));

    let html = page(&client, format!("{}/reports?q=SIGNAL", server.base_url)).await;
    assert!(html.contains("📍 Main St"));
    assert!(!html.contains("📍 Oak Ave"));

    let html = page(&client, format!("{}/reports?status=rejected", server.base_url)).await;
    assert!(html.contains("No reports found matching your filters."));
}

#[tokio::test]
async fn http_traffic_check_renders_result() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/traffic", server.base_url))
        .form(&[("location", "Le Loi")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let html = response.text().await.unwrap();
    assert!(html.contains("📍 Le Loi"));
    assert!(html.contains("12.35%"));
    assert!(html.contains("<li>Ring Rd</li>"));

    let html = client
        .post(format!("{}/traffic", server.base_url))
        .form(&[("location", "   ")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Please enter a location!"));
}

#[tokio::test]
async fn http_subscribe_reports_outcome() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let html = client
        .post(format!("{}/subscribe", server.base_url))
        .form(&[("email", "a@b.com")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("You will receive traffic alerts at a@b.com"));

    let html = client
        .post(format!("{}/subscribe", server.base_url))
        .form(&[("email", "taken@x.com")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Failed to subscribe. Please try again."));
}

#[tokio::test]
async fn http_report_submission_forwards_multipart() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let form = multipart::Form::new()
        .text("reporter_name", "Dung")
        .text("issue_type", "energy")
        .text("description", "Street light flickering")
        .text("location", "Pier 3")
        .part(
            "image",
            multipart::Part::bytes(vec![0xff, 0xd8, 0xff])
                .file_name("light.jpg")
                .mime_str("image/jpeg")
                .unwrap(),
        );

    let html = client
        .post(format!("{}/report", server.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Report submitted successfully!"));
}

#[tokio::test]
async fn http_local_login_round_trip() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let html = client
        .post(format!("{}/register", server.base_url))
        .form(&[("name", "Lan"), ("email", "lan@x.com"), ("password", "p")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Registration successful! Please log in."));

    let response = client
        .post(format!("{}/login", server.base_url))
        .form(&[("email", "lan@x.com"), ("password", "wrong")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.text().await.unwrap().contains("Invalid login credentials"));

    let html = client
        .post(format!("{}/login", server.base_url))
        .form(&[("email", "lan@x.com"), ("password", "p")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Hello, Lan"));

    let html = client
        .post(format!("{}/logout", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("authGuest"));
    assert!(!html.contains("Hello, Lan"));
}

#[tokio::test]
async fn http_backend_failures_render_error_states() {
    let _guard = TEST_LOCK.lock().await;
    let server = spawn_server(FAILING_BACKEND.as_str()).await;
    let client = Client::new();

    let html = page(&client, format!("{}/reports?status=pending", server.base_url)).await;
    assert!(html.contains("Unable to load analysis."));
    assert!(html.contains("Unable to load reports. Please try again."));
    assert!(!html.contains("reports resolved"));

    let html = client
        .post(format!("{}/traffic", server.base_url))
        .form(&[("location", "Le Loi")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Unable to check traffic conditions. Please try again."));
    assert!(html.contains(r#"value="Le Loi""#));

    let form = multipart::Form::new()
        .text("reporter_name", "Dung")
        .text("issue_type", "energy")
        .text("description", "Street light flickering")
        .text("location", "Pier 3");
    let html = client
        .post(format!("{}/report", server.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Failed to submit report. Please try again."));
    assert!(html.contains(r#"data-type="error""#));
    assert!(html.contains(r#"value="Dung""#));
    assert!(html.contains(r#"value="Pier 3""#));
    assert!(html.contains("Street light flickering</textarea>"));
    assert!(html.contains(r#"<option value="energy" selected>"#));
}
