use crate::adapters::http;
use crate::adapters::storage::collect_documents;
use crate::config::settings::{Settings, STDIN_INPUT};
use crate::core::renderer::RatingRenderer;
use crate::core::report::RenderReport;
use crate::domain::model::{
    DocumentOrigin, LoadSummary, RenderResult, RenderedDocument, SourceDocument, WidgetOutcome,
};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::html::Document;
use crate::utils::error::{RenderError, Result};
use reqwest::Client;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use zip::write::{SimpleFileOptions, ZipWriter};

/// Reads documents from `sources`, renders their rating widgets and writes
/// the results to `target`.
pub struct RenderPipeline<S: Storage, C: ConfigProvider> {
    sources: S,
    target: S,
    config: C,
    renderer: RatingRenderer,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> RenderPipeline<S, C> {
    pub fn new(sources: S, target: S, config: C) -> Result<Self> {
        let renderer = RatingRenderer::new(config.render_options()?);
        let client = http::build_client(config.timeout_seconds())?;
        Ok(Self {
            sources,
            target,
            config,
            renderer,
            client,
        })
    }

    async fn read_path(&self, path: &Path, relative: PathBuf) -> Result<SourceDocument> {
        let bytes = self.sources.read_file(&path.to_string_lossy()).await?;
        Ok(SourceDocument {
            name: relative.to_string_lossy().into_owned(),
            origin: DocumentOrigin::File {
                path: path.to_path_buf(),
                relative,
            },
            html: bytes,
        })
    }

    async fn extract_input(&self, input: &str) -> Result<Vec<SourceDocument>> {
        if input == STDIN_INPUT {
            let mut html = Vec::new();
            tokio::io::stdin().read_to_end(&mut html).await?;
            return Ok(vec![SourceDocument {
                name: "stdin".to_string(),
                origin: DocumentOrigin::Stdin,
                html,
            }]);
        }

        if Settings::is_url(input) {
            let html = http::fetch_page(&self.client, input).await?;
            return Ok(vec![SourceDocument {
                name: url_output_name(input),
                origin: DocumentOrigin::Url {
                    url: input.to_string(),
                },
                html,
            }]);
        }

        let path = Path::new(input);
        if path.is_dir() {
            let mut documents = Vec::new();
            for file in collect_documents(path, self.config.extensions())? {
                let relative = file.strip_prefix(path).unwrap_or(&file).to_path_buf();
                documents.push(self.read_path(&file, relative).await?);
            }
            if documents.is_empty() {
                tracing::warn!("No documents with extensions {:?} under {}", self.config.extensions(), input);
            }
            return Ok(documents);
        }

        if path.is_file() {
            let relative = PathBuf::from(path.file_name().unwrap_or(path.as_os_str()));
            return Ok(vec![self.read_path(path, relative).await?]);
        }

        Err(RenderError::SourceError {
            source_name: input.to_string(),
            message: "not a file, directory or http(s) URL".to_string(),
        })
    }

    fn bundle(&self, files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, data) in files {
            zip.start_file(name.as_str(), SimpleFileOptions::default())?;
            zip.write_all(data)?;
        }
        Ok(zip.finish()?.into_inner())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for RenderPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<SourceDocument>> {
        let mut documents = Vec::new();
        for input in self.config.inputs() {
            tracing::debug!("Reading input: {}", input);
            documents.extend(self.extract_input(input).await?);
        }
        Ok(documents)
    }

    async fn transform(&self, documents: Vec<SourceDocument>) -> Result<RenderResult> {
        let mut result = RenderResult::default();

        for source in documents {
            let mut document = Document::parse_bytes(&source.html);
            let summary = self.renderer.initialize(&mut document);

            for (index, outcome) in summary.widgets.iter().enumerate() {
                if let WidgetOutcome::Skipped { reason, text } = outcome {
                    tracing::debug!(
                        "{}: widget {} skipped ({}, text {:?})",
                        source.name,
                        index,
                        reason.as_str(),
                        text
                    );
                }
            }
            tracing::debug!(
                "{}: {} widgets filled, {} skipped",
                source.name,
                summary.applied(),
                summary.skipped()
            );

            result.documents.push(RenderedDocument {
                html: document.to_bytes(),
                name: source.name,
                origin: source.origin,
                summary,
            });
        }

        Ok(result)
    }

    async fn load(&self, result: RenderResult) -> Result<LoadSummary> {
        let mut summary = LoadSummary {
            documents: result.documents.len(),
            widgets_applied: result.widgets_applied(),
            widgets_skipped: result.widgets_skipped(),
            outputs: Vec::new(),
        };

        if self.config.dry_run() {
            tracing::info!("🔍 Dry run: nothing written");
            return Ok(summary);
        }

        let scale = self.renderer.options().scale;
        let report = RenderReport::new(&result, scale);
        let report_files = report.render_formats(self.config.report_formats())?;

        let mut pages: Vec<(String, Vec<u8>)> = Vec::new();
        let mut used_names = HashSet::new();

        for document in &result.documents {
            match &document.origin {
                DocumentOrigin::Stdin => {
                    let mut stdout = tokio::io::stdout();
                    stdout.write_all(&document.html).await?;
                    stdout.flush().await?;
                    summary.outputs.push(STDIN_INPUT.to_string());
                }
                DocumentOrigin::File { path, .. } if self.config.in_place() => {
                    let path = path.to_string_lossy();
                    self.sources.write_file(&path, &document.html).await?;
                    summary.outputs.push(path.into_owned());
                }
                origin => {
                    let name = match origin {
                        DocumentOrigin::File { relative, .. } => relative.to_string_lossy().into_owned(),
                        _ => document.name.clone(),
                    };
                    let name = unique_name(&mut used_names, name);
                    pages.push((name, document.html.clone()));
                }
            }
        }

        let mut outputs: Vec<(String, Vec<u8>)> = pages;
        outputs.extend(
            report_files
                .into_iter()
                .map(|(name, data)| (name.to_string(), data)),
        );

        match self.config.archive() {
            Some(archive) => {
                tracing::debug!("Creating archive with {} files", outputs.len());
                let zip_data = self.bundle(&outputs)?;
                self.target.write_file(archive, &zip_data).await?;
                summary.outputs.push(output_path(self.config.output_dir(), archive));
            }
            None => {
                for (name, data) in &outputs {
                    self.target.write_file(name, data).await?;
                    summary.outputs.push(output_path(self.config.output_dir(), name));
                }
            }
        }

        Ok(summary)
    }
}

fn output_path(dir: &str, name: &str) -> String {
    Path::new(dir).join(name).to_string_lossy().into_owned()
}

/// Output file name for a fetched page: the last path segment, or
/// `index.html` when the URL ends in '/'.
pub fn url_output_name(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|segment| !segment.is_empty())
        .unwrap_or_else(|| "index.html".to_string())
}

/// Appends `-2`, `-3`, ... before the extension until `name` is unused.
fn unique_name(used: &mut HashSet<String>, name: String) -> String {
    if used.insert(name.clone()) {
        return name;
    }
    let path = Path::new(&name);
    let stem = path.with_extension("").to_string_lossy().into_owned();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 2;
    loop {
        let candidate = format!("{}-{}{}", stem, n, ext);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                RenderError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn document(name: &str, rating: &str) -> SourceDocument {
        SourceDocument {
            name: name.to_string(),
            origin: DocumentOrigin::Url {
                url: format!("http://shop.test/{}", name),
            },
            html: format!(
                r#"<div class="star-rating"><span></span><strong class="rating">{}</strong></div>"#,
                rating
            )
            .into_bytes(),
        }
    }

    fn pipeline(settings: Settings) -> (RenderPipeline<MockStorage, Settings>, MockStorage) {
        let target = MockStorage::default();
        let pipeline = RenderPipeline::new(MockStorage::default(), target.clone(), settings).unwrap();
        (pipeline, target)
    }

    #[tokio::test]
    async fn test_transform_renders_each_document() {
        let (pipeline, _) = pipeline(Settings::default());
        let result = pipeline
            .transform(vec![document("a.html", "4"), document("b.html", "N/A")])
            .await
            .unwrap();

        assert_eq!(result.widgets_applied(), 1);
        assert_eq!(result.widgets_skipped(), 1);
        let first = String::from_utf8_lossy(&result.documents[0].html);
        let second = String::from_utf8_lossy(&result.documents[1].html);
        assert!(first.contains(r#"style="width: 80.00%;""#));
        assert!(!second.contains("style="));
    }

    #[tokio::test]
    async fn test_load_writes_pages_and_reports() {
        let settings = Settings {
            report_formats: vec!["json".to_string()],
            ..Default::default()
        };
        let (pipeline, target) = pipeline(settings);
        let result = pipeline
            .transform(vec![document("item.html", "3.7"), document("item.html", "5")])
            .await
            .unwrap();
        let summary = pipeline.load(result).await.unwrap();

        assert_eq!(summary.outputs.len(), 3);
        let first = String::from_utf8(target.get_file("item.html").await.unwrap()).unwrap();
        assert!(first.contains("width: 74.00%;"));
        let second = String::from_utf8(target.get_file("item-2.html").await.unwrap()).unwrap();
        assert!(second.contains("width: 100.00%;"));
        assert!(target.get_file("render-report.json").await.is_some());
    }

    #[tokio::test]
    async fn test_load_bundles_archive() {
        let settings = Settings {
            report_formats: vec!["csv".to_string()],
            archive: Some("ratings.zip".to_string()),
            ..Default::default()
        };
        let (pipeline, target) = pipeline(settings);
        let result = pipeline.transform(vec![document("p.html", "1")]).await.unwrap();
        pipeline.load(result).await.unwrap();

        assert!(target.get_file("p.html").await.is_none());
        let zip_data = target.get_file("ratings.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"p.html".to_string()));
        assert!(names.contains(&"render-report.csv".to_string()));

        let mut page = String::new();
        std::io::Read::read_to_string(&mut archive.by_name("p.html").unwrap(), &mut page).unwrap();
        assert!(page.contains("width: 20.00%;"));
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let settings = Settings {
            dry_run: true,
            report_formats: vec!["json".to_string()],
            ..Default::default()
        };
        let (pipeline, target) = pipeline(settings);
        let result = pipeline.transform(vec![document("p.html", "2")]).await.unwrap();
        let summary = pipeline.load(result).await.unwrap();

        assert_eq!(summary.widgets_applied, 1);
        assert!(summary.outputs.is_empty());
        assert!(target.files.lock().await.is_empty());
    }

    #[test]
    fn test_url_output_name() {
        assert_eq!(url_output_name("https://shop.test/products/42.html"), "42.html");
        assert_eq!(url_output_name("https://shop.test/products/"), "index.html");
        assert_eq!(url_output_name("https://shop.test"), "index.html");
    }

    #[test]
    fn test_unique_name() {
        let mut used = HashSet::new();
        assert_eq!(unique_name(&mut used, "a.html".to_string()), "a.html");
        assert_eq!(unique_name(&mut used, "a.html".to_string()), "a-2.html");
        assert_eq!(unique_name(&mut used, "a.html".to_string()), "a-3.html");
        assert_eq!(unique_name(&mut used, "dir/b".to_string()), "dir/b");
        assert_eq!(unique_name(&mut used, "dir/b".to_string()), "dir/b-2");
    }
}
