use crate::core::roster;
use crate::core::{ConfigProvider, Pipeline, ProgressSink, Storage};
use crate::domain::model::{
    download_file_name, BackgroundAsset, Certificate, GenerationOutput, Roster,
};
use crate::utils::error::{CertError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

/// Backend used while developing against a locally served frontend.
pub const LOCAL_BASE: &str = "http://localhost:5051";
/// Backend used for any non-loopback deployment.
pub const PRODUCTION_BASE: &str = "https://certificate-backend-production.up.railway.app";

const GENERATE_PATH: &str = "/generate-certificate";

/// Pick the backend base from the host the frontend is served on. Loopback
/// style hosts get the development backend, everything else production. This
/// runs once per render run, not per record.
pub fn resolve_backend_base(serving_host: &str) -> &'static str {
    if serving_host.contains("localhost") || serving_host.contains("127.0.0.1") {
        LOCAL_BASE
    } else {
        PRODUCTION_BASE
    }
}

#[derive(Serialize)]
struct RunSummary {
    generated_at: String,
    total: usize,
    files: Vec<String>,
}

pub struct CertificatePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> CertificatePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }

    fn backend_base(&self) -> String {
        match self.config.endpoint_override() {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => resolve_backend_base(self.config.serving_host()).to_string(),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CertificatePipeline<S, C> {
    async fn gather(&self) -> Result<(Roster, BackgroundAsset)> {
        let roster_path = self.config.roster_path();
        if !roster_path.to_lowercase().ends_with(".csv") {
            return Err(CertError::FileTypeError {
                message: "Please upload a CSV file".to_string(),
            });
        }

        tracing::debug!("Reading roster from: {}", roster_path);
        let text = tokio::fs::read_to_string(roster_path).await?;
        let parsed = roster::parse(&text)?;
        tracing::debug!("Parsed {} roster records", parsed.len());

        let background_path = self.config.background_path();
        let content_type = mime_guess::from_path(background_path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(CertError::FileTypeError {
                message: "Please upload an image file".to_string(),
            });
        }

        tracing::debug!("Reading background image from: {}", background_path);
        let bytes = tokio::fs::read(background_path).await?;
        let file_name = Path::new(background_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("background")
            .to_string();

        let background =
            BackgroundAsset::new(file_name, content_type, bytes)?.with_preview(background_path);

        Ok((parsed, background))
    }

    async fn render(
        &self,
        roster: &Roster,
        background: Option<&BackgroundAsset>,
        on_progress: ProgressSink<'_>,
    ) -> Result<GenerationOutput> {
        // 前置條件不滿足時直接拒絕，不發出任何請求
        if roster.is_empty() {
            return Err(CertError::EmptyRosterError);
        }
        let background = background.ok_or(CertError::MissingAssetError)?;

        // 每次執行只解析一次後端位址
        let url = format!("{}{}", self.backend_base(), GENERATE_PATH);
        let total = roster.len();
        tracing::debug!("Rendering {} certificates via {}", total, url);

        let mut certificates = Vec::with_capacity(total);

        for (index, record) in roster.iter().enumerate() {
            // The full asset is re-sent with every request; no server-side
            // caching is assumed.
            let image = Part::bytes(background.bytes.clone())
                .file_name(background.file_name.clone())
                .mime_str(&background.content_type)?;
            let form = Form::new()
                .text("name", record.student_name.clone())
                .text("course", record.course_name.clone())
                .text("date", record.date.clone())
                .part("bgImage", image);

            let response = self
                .client
                .post(&url)
                .multipart(form)
                .send()
                .await
                .map_err(|e| {
                    tracing::error!("Request for {} failed: {}", record.student_name, e);
                    CertError::GenerationRequestError {
                        student: record.student_name.clone(),
                    }
                })?;

            if !response.status().is_success() {
                tracing::error!(
                    "Backend returned {} for {}",
                    response.status(),
                    record.student_name
                );
                return Err(CertError::GenerationRequestError {
                    student: record.student_name.clone(),
                });
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|_| CertError::GenerationRequestError {
                    student: record.student_name.clone(),
                })?;

            certificates.push(Certificate {
                student_name: record.student_name.clone(),
                file_name: download_file_name(&record.student_name),
                bytes: bytes.to_vec(),
            });

            on_progress(((index + 1) as f64 / total as f64) * 100.0);
        }

        Ok(GenerationOutput { certificates })
    }

    async fn deliver(&self, roster: &Roster, output: &GenerationOutput) -> Result<String> {
        for certificate in &output.certificates {
            tracing::debug!(
                "Writing {} ({} bytes)",
                certificate.file_name,
                certificate.bytes.len()
            );
            self.storage
                .write_file(&certificate.file_name, &certificate.bytes)
                .await?;
        }

        // manifest.csv — 逐列對應 roster 與輸出
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["student", "course", "date", "file", "bytes"])?;
        for (record, certificate) in roster.iter().zip(&output.certificates) {
            let size = certificate.bytes.len().to_string();
            // student 欄取自產生當下擷取的名稱
            writer.write_record([
                certificate.student_name.as_str(),
                record.course_name.as_str(),
                record.date.as_str(),
                certificate.file_name.as_str(),
                size.as_str(),
            ])?;
        }
        let manifest = writer.into_inner().map_err(|e| e.into_error())?;
        self.storage.write_file("manifest.csv", &manifest).await?;

        let summary = RunSummary {
            generated_at: chrono::Utc::now().to_rfc3339(),
            total: output.len(),
            files: output.file_names(),
        };
        let summary_json = serde_json::to_string_pretty(&summary)?;
        self.storage
            .write_file("run.json", summary_json.as_bytes())
            .await?;

        if self.config.bundle_enabled() {
            tracing::debug!("Bundling {} certificates", output.len());
            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for certificate in &output.certificates {
                    zip.start_file::<_, ()>(
                        certificate.file_name.as_str(),
                        FileOptions::default(),
                    )?;
                    zip.write_all(&certificate.bytes)?;
                }
                let cursor = zip.finish()?;
                cursor.into_inner()
            };
            self.storage
                .write_file("certificates.zip", &zip_data)
                .await?;
        }

        Ok(self.config.output_path().to_string())
    }
}
