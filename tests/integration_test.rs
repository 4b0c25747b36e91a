use glyph_ocr::classifiers::FeedForwardClassifier;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::io::Cursor;
use std::net::TcpStream;
use std::process::{Child, Command};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

// Use atomic counter to give each test a unique port
static PORT_COUNTER: AtomicU16 = AtomicU16::new(9400);

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct BoundingBox {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Candidate {
    character: char,
    confidence: f32,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct GlyphResult {
    candidates: Vec<Candidate>,
    bounding_box: BoundingBox,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct OcrResponse {
    text: String,
    glyphs: Vec<GlyphResult>,
    unrecognized: usize,
    preset: String,
    processing_time_ms: u64,
    warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct InfoResponse {
    version: String,
    classifier: String,
    charset: String,
    feature_length: usize,
    confidence_threshold: f32,
    presets: Vec<String>,
    default_preset: String,
    max_file_size_bytes: usize,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ErrorResponse {
    error: String,
    code: String,
}

struct TestServer {
    child: Child,
    port: u16,
    // Held so the weights file outlives the server process
    _model: NamedTempFile,
}

impl TestServer {
    fn start() -> Self {
        let port = PORT_COUNTER.fetch_add(1, Ordering::SeqCst);

        // Every class scores 0.5 with zero weights, so each glyph reads as 'A'
        let model = NamedTempFile::new().expect("Failed to create model file");
        serde_json::to_writer(
            model.as_file(),
            &FeedForwardClassifier::zeros(321, 16).weights(),
        )
        .expect("Failed to write model");

        let child = Command::new(env!("CARGO_BIN_EXE_glyph-ocr-server"))
            .args(["--host", "127.0.0.1", "--port", &port.to_string()])
            .arg("--model")
            .arg(model.path())
            .spawn()
            .expect("Failed to start server");

        // Wait for server to be ready
        let deadline = Instant::now() + Duration::from_secs(10);
        while TcpStream::connect(("127.0.0.1", port)).is_err() {
            assert!(Instant::now() < deadline, "Server did not start in time");
            std::thread::sleep(Duration::from_millis(50));
        }

        Self {
            child,
            port,
            _model: model,
        }
    }

    fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}

/// White page with a black rectangle per `(min_x, min_y, max_x, max_y)`, inclusive
fn page_png(width: u32, height: u32, strokes: &[(u32, u32, u32, u32)]) -> Vec<u8> {
    let img = GrayImage::from_fn(width, height, |x, y| {
        let inked = strokes
            .iter()
            .any(|&(x0, y0, x1, y1)| (x0..=x1).contains(&x) && (y0..=y1).contains(&y));
        if inked {
            Luma([0])
        } else {
            Luma([255])
        }
    });

    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("Failed to encode PNG");
    bytes
}

async fn post_ocr(
    client: &reqwest::Client,
    base_url: &str,
    png: Vec<u8>,
    preset: Option<&str>,
) -> reqwest::Response {
    let part = Part::bytes(png)
        .file_name("page.png")
        .mime_str("image/png")
        .unwrap();

    let mut form = Form::new().part("file", part);
    if let Some(preset) = preset {
        form = form.text("preset", preset.to_string());
    }

    client
        .post(format!("{}/ocr", base_url))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request")
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::start();
    let client = reqwest::Client::new();

    let response: HealthResponse = client
        .get(format!("{}/health", server.base_url()))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(response.status, "ok");
    assert!(!response.version.is_empty());
}

#[tokio::test]
async fn test_info_endpoint() {
    let server = TestServer::start();
    let client = reqwest::Client::new();

    let response: InfoResponse = client
        .get(format!("{}/info", server.base_url()))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(response.classifier, "ffnn");
    assert_eq!(response.charset.chars().count(), 36);
    assert_eq!(response.feature_length, 321);
    assert!((response.confidence_threshold - 0.1).abs() < f32::EPSILON);
    assert_eq!(
        response.presets,
        vec!["none", "minimal", "default", "aggressive"]
    );
    assert_eq!(response.default_preset, "default");
    assert!(response.max_file_size_bytes > 0);
}

#[tokio::test]
async fn test_ocr_single_stroke() {
    let server = TestServer::start();
    let client = reqwest::Client::new();

    let png = page_png(40, 60, &[(16, 10, 23, 49)]);
    let response: OcrResponse = post_ocr(&client, &server.base_url(), png, Some("none"))
        .await
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(response.text, "A");
    assert_eq!(response.preset, "none");
    assert_eq!(response.unrecognized, 0);
    assert_eq!(response.glyphs.len(), 1);

    let glyph = &response.glyphs[0];
    assert_eq!(glyph.candidates.len(), 36);
    assert_eq!(glyph.candidates[0].character, 'A');
    assert_eq!(glyph.bounding_box.x, 16);
    assert_eq!(glyph.bounding_box.y, 10);
    assert_eq!(glyph.bounding_box.width, 8);
    assert_eq!(glyph.bounding_box.height, 40);
}

#[tokio::test]
async fn test_ocr_glyphs_ordered_left_to_right() {
    let server = TestServer::start();
    let client = reqwest::Client::new();

    let png = page_png(120, 60, &[(70, 12, 77, 47), (20, 10, 27, 49)]);
    let response: OcrResponse = post_ocr(&client, &server.base_url(), png, None)
        .await
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(response.preset, "default");
    assert_eq!(response.text, "AA");
    let xs: Vec<u32> = response.glyphs.iter().map(|g| g.bounding_box.x).collect();
    assert_eq!(xs, vec![20, 70]);
}

#[tokio::test]
async fn test_ocr_blank_page() {
    let server = TestServer::start();
    let client = reqwest::Client::new();

    let png = page_png(40, 60, &[]);
    let response: OcrResponse = post_ocr(&client, &server.base_url(), png, None)
        .await
        .json()
        .await
        .expect("Failed to parse response");

    assert!(response.text.is_empty());
    assert!(response.glyphs.is_empty());
    assert!(!response.warnings.is_empty());
}

#[tokio::test]
async fn test_ocr_unknown_preset() {
    let server = TestServer::start();
    let client = reqwest::Client::new();

    let png = page_png(40, 60, &[(16, 10, 23, 49)]);
    let response = post_ocr(&client, &server.base_url(), png, Some("fancy")).await;

    assert_eq!(response.status(), 400);
    let error: ErrorResponse = response.json().await.expect("Failed to parse response");
    assert_eq!(error.code, "INVALID_REQUEST");
}

#[tokio::test]
async fn test_ocr_missing_file() {
    let server = TestServer::start();
    let client = reqwest::Client::new();

    let form = Form::new().text("preset", "none");
    let response = client
        .post(format!("{}/ocr", server.base_url()))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let error: ErrorResponse = response.json().await.expect("Failed to parse response");
    assert_eq!(error.code, "MISSING_FILE");
}
