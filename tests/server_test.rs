#![cfg(feature = "server")]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use encoding_rs::SHIFT_JIS;
use http_body_util::BodyExt;
use shipment_times::server::{router, AppState};
use shipment_times::ShipmentConfig;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "shipment-times-boundary";

fn app(temp_dir: &TempDir, max_upload_bytes: usize) -> axum::Router {
    let config = ShipmentConfig {
        output_path: temp_dir.path().to_str().unwrap().to_string(),
        target_os: "mac".to_string(),
        ..ShipmentConfig::default()
    };
    router(AppState::new(config), max_upload_bytes)
}

fn multipart_request(field: &str, payload: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"orders.csv\"\r\nContent-Type: text/csv\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn export() -> Vec<u8> {
    let text = "注文ID,注文日時,氏(配送先),名(配送先),配送業者ID,伝票番号,メッセージテンプレートID,郵便番号(配送先),都道府県(配送先),住所(配送先),住所2(配送先),電話番号(配送先),備考,商品コード,商品名,バリエーション,数量\n\
A001,2019-03-01 10:00,山田,太郎,1,,,100-0001,東京都,千代田区1-1,,03,,W,Widget,,3\n\
--- 同上 ---,2019-03-01 10:00,,,,,,,,,,,,G,Gadget,,2\n\
A002,2019-03-02 11:00,佐藤,花子,1,,,530-0001,大阪府,北区2-2,,06,,B,Bolt,,1\n";
    SHIFT_JIS.encode(text).0.into_owned()
}

fn dated_dirs(temp_dir: &TempDir) -> Vec<std::path::PathBuf> {
    std::fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.is_dir())
        .collect()
}

#[tokio::test]
async fn test_index_serves_upload_form() {
    let temp_dir = TempDir::new().unwrap();
    let response = app(&temp_dir, 1024 * 1024)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("name=\"uploadfile\""));
    assert!(html.contains("action=\"/upload\""));
}

#[tokio::test]
async fn test_upload_writes_outputs_and_redirects() {
    let temp_dir = TempDir::new().unwrap();
    let response = app(&temp_dir, 1024 * 1024)
        .oneshot(multipart_request("uploadfile", &export()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let dirs = dated_dirs(&temp_dir);
    assert_eq!(dirs.len(), 1);
    let name = dirs[0].file_name().unwrap().to_str().unwrap().to_string();
    assert_eq!(name.len(), 8);
    assert!(name.chars().all(|c| c.is_ascii_digit()));

    let label = std::fs::read_to_string(dirs[0].join("clickpost.csv")).unwrap();
    assert!(label.contains("花子佐藤"));
    let other = std::fs::read_to_string(dirs[0].join("other.csv")).unwrap();
    assert!(other.contains(" Widget 3個/ Gadget 2個/"));
    assert!(dirs[0].join("summary.csv").exists());
}

#[tokio::test]
async fn test_upload_without_file_field_is_bad_request() {
    let temp_dir = TempDir::new().unwrap();
    let response = app(&temp_dir, 1024 * 1024)
        .oneshot(multipart_request("something_else", &export()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(dated_dirs(&temp_dir).is_empty());
}

#[tokio::test]
async fn test_broken_export_is_server_error() {
    let temp_dir = TempDir::new().unwrap();
    let response = app(&temp_dir, 1024 * 1024)
        .oneshot(multipart_request("uploadfile", b"only,three,fields\nx,y,z\n"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"Internal Server Error");
    assert!(dated_dirs(&temp_dir).is_empty());
}
