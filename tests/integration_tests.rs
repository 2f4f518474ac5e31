use httpmock::prelude::*;
use star_render::{LocalStorage, RenderEngine, RenderPipeline, Settings};
use std::fs;
use tempfile::TempDir;

const PRODUCT_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Widget &amp; Co</title></head>
<body>
  <div class="card">
    <div class="star-rating">
      <span style="width: 0%"></span>
      <strong class="rating">4.5</strong>
    </div>
  </div>
  <div class="star-rating"><span></span><strong class="rating">N/A</strong></div>
</body>
</html>
"#;

fn settings(inputs: Vec<String>, output_dir: &str) -> Settings {
    Settings {
        inputs,
        output_dir: output_dir.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_end_to_end_directory_render() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let output_path = output_dir.path().to_str().unwrap().to_string();

    fs::create_dir_all(input_dir.path().join("products")).unwrap();
    fs::write(input_dir.path().join("products/widget.html"), PRODUCT_PAGE).unwrap();
    fs::write(input_dir.path().join("index.htm"), "<p>no ratings here</p>").unwrap();
    fs::write(input_dir.path().join("style.css"), ".star-rating{}").unwrap();

    let mut config = settings(
        vec![input_dir.path().to_str().unwrap().to_string()],
        &output_path,
    );
    config.report_formats = vec!["json".to_string(), "csv".to_string()];

    let pipeline =
        RenderPipeline::new(LocalStorage::new(""), LocalStorage::new(&output_path), config).unwrap();
    let engine = RenderEngine::new(pipeline);
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.documents, 2);
    assert_eq!(summary.widgets_applied, 1);
    assert_eq!(summary.widgets_skipped, 1);

    let rendered = fs::read_to_string(output_dir.path().join("products/widget.html")).unwrap();
    assert!(rendered.contains(r#"<span style="width: 90.00%;"></span>"#));
    assert!(rendered.contains(r#"<div class="star-rating"><span></span><strong class="rating">N/A</strong></div>"#));
    assert!(rendered.starts_with("<!DOCTYPE html>\n<html>\n<head><title>Widget &amp; Co</title></head>"));

    let untouched = fs::read_to_string(output_dir.path().join("index.htm")).unwrap();
    assert_eq!(untouched, "<p>no ratings here</p>");
    assert!(!output_dir.path().join("style.css").exists());

    let report: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(output_dir.path().join("render-report.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(report["widgets_applied"], 1);
    assert_eq!(report["scale"], 5.0);

    let csv = fs::read_to_string(output_dir.path().join("render-report.csv")).unwrap();
    assert_eq!(csv.lines().count(), 3);
}

#[tokio::test]
async fn test_in_place_rewrite_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let page = dir.path().join("page.html");
    fs::write(&page, PRODUCT_PAGE).unwrap();

    let mut config = settings(vec![page.to_str().unwrap().to_string()], "unused");
    config.in_place = true;

    for _ in 0..2 {
        let pipeline = RenderPipeline::new(
            LocalStorage::new(""),
            LocalStorage::new("unused"),
            config.clone(),
        )
        .unwrap();
        let summary = RenderEngine::new(pipeline).run().await.unwrap();
        assert_eq!(summary.outputs, vec![page.to_str().unwrap().to_string()]);
    }

    let rendered = fs::read_to_string(&page).unwrap();
    assert_eq!(rendered.matches("width: 90.00%;").count(), 1);
    assert!(!std::path::Path::new("unused").exists());
}

#[tokio::test]
async fn test_end_to_end_url_source() {
    let output_dir = TempDir::new().unwrap();
    let output_path = output_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let page_mock = server.mock(|when, then| {
        when.method(GET).path("/products/7.html");
        then.status(200)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(r#"<div class="star-rating"><span></span><strong class="rating">3.7</strong></div>"#);
    });

    let config = settings(vec![server.url("/products/7.html")], &output_path);
    let pipeline =
        RenderPipeline::new(LocalStorage::new(""), LocalStorage::new(&output_path), config).unwrap();
    let summary = RenderEngine::new(pipeline).run().await.unwrap();

    page_mock.assert();
    assert_eq!(summary.widgets_applied, 1);

    let rendered = fs::read_to_string(output_dir.path().join("7.html")).unwrap();
    assert_eq!(
        rendered,
        r#"<div class="star-rating"><span style="width: 74.00%;"></span><strong class="rating">3.7</strong></div>"#
    );
}

#[tokio::test]
async fn test_url_source_failure_aborts_run() {
    let output_dir = TempDir::new().unwrap();
    let output_path = output_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let failing = server.mock(|when, then| {
        when.method(GET).path("/down");
        then.status(503);
    });

    let config = settings(vec![server.url("/down")], &output_path);
    let pipeline =
        RenderPipeline::new(LocalStorage::new(""), LocalStorage::new(&output_path), config).unwrap();
    let err = RenderEngine::new(pipeline).run().await.unwrap_err();

    failing.assert();
    assert!(matches!(
        err,
        star_render::RenderError::HttpStatusError { status: 503, .. }
    ));
    assert!(err.recovery_suggestion().contains("retry"));
}

#[tokio::test]
async fn test_missing_input_is_a_source_error() {
    let output_dir = TempDir::new().unwrap();
    let missing = output_dir.path().join("does-not-exist.html");

    let config = settings(
        vec![missing.to_str().unwrap().to_string()],
        output_dir.path().to_str().unwrap(),
    );
    let pipeline = RenderPipeline::new(
        LocalStorage::new(""),
        LocalStorage::new(output_dir.path()),
        config,
    )
    .unwrap();
    let err = RenderEngine::new(pipeline).run().await.unwrap_err();
    assert!(matches!(err, star_render::RenderError::SourceError { .. }));
}

#[cfg(unix)]
#[tokio::test]
async fn test_directory_with_symlink_cycle_reads_each_page_once() {
    let root = TempDir::new().unwrap();
    let site = root.path().join("a");
    fs::create_dir_all(&site).unwrap();
    fs::write(site.join("p.html"), PRODUCT_PAGE).unwrap();
    std::os::unix::fs::symlink("..", site.join("loop")).unwrap();

    let mut config = settings(vec![site.to_str().unwrap().to_string()], "unused");
    config.dry_run = true;

    let pipeline =
        RenderPipeline::new(LocalStorage::new(""), LocalStorage::new("unused"), config).unwrap();
    let summary = RenderEngine::new(pipeline).run().await.unwrap();

    assert_eq!(summary.documents, 1);
    assert_eq!(summary.widgets_applied, 1);
    assert!(summary.outputs.is_empty());
}

#[tokio::test]
async fn test_in_place_keeps_non_utf8_bytes() {
    let dir = TempDir::new().unwrap();
    let page = dir.path().join("latin1.html");
    let mut source = b"<p>Caf\xe9 cr\xe8me</p>".to_vec();
    source.extend_from_slice(
        br#"<div class="star-rating"><span style="width: 30%"></span><strong class="rating">4</strong></div>"#,
    );
    source.extend_from_slice(b"<p>\xa9 2024</p>");
    fs::write(&page, &source).unwrap();

    let mut config = settings(vec![page.to_str().unwrap().to_string()], "unused");
    config.in_place = true;
    let pipeline =
        RenderPipeline::new(LocalStorage::new(""), LocalStorage::new("unused"), config).unwrap();
    let summary = RenderEngine::new(pipeline).run().await.unwrap();
    assert_eq!(summary.widgets_applied, 1);

    let mut expected = b"<p>Caf\xe9 cr\xe8me</p>".to_vec();
    expected.extend_from_slice(
        br#"<div class="star-rating"><span style="width: 80.00%;"></span><strong class="rating">4</strong></div>"#,
    );
    expected.extend_from_slice(b"<p>\xa9 2024</p>");
    assert_eq!(fs::read(&page).unwrap(), expected);
}

#[tokio::test]
async fn test_negative_rating_keeps_existing_width_on_disk() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let output_path = output_dir.path().to_str().unwrap().to_string();
    let page = r#"<div class="star-rating"><span style="width: 30%"></span><strong class="rating">-1</strong></div>"#;
    fs::write(input_dir.path().join("neg.html"), page).unwrap();

    let mut config = settings(
        vec![input_dir.path().join("neg.html").to_str().unwrap().to_string()],
        &output_path,
    );
    config.report_formats = vec!["csv".to_string()];
    let pipeline =
        RenderPipeline::new(LocalStorage::new(""), LocalStorage::new(&output_path), config).unwrap();
    let summary = RenderEngine::new(pipeline).run().await.unwrap();

    assert_eq!(summary.widgets_skipped, 1);
    assert_eq!(fs::read_to_string(output_dir.path().join("neg.html")).unwrap(), page);
    let csv = fs::read_to_string(output_dir.path().join("render-report.csv")).unwrap();
    assert!(csv.contains("neg.html,0,skipped,,,negative_width,-1"));
}
