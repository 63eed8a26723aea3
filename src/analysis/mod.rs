mod mock;

use async_trait::async_trait;
use log::info;
use std::path::Path;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::{ HaggleError, Result };
use crate::models::{ AnalysisResult, Category, ScreenshotUpload };

pub use mock::MockAnalyzer;

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[async_trait]
pub trait ConversationAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        upload: &ScreenshotUpload,
        category: Option<Category>
    ) -> Result<AnalysisResult>;
}

pub fn validate_upload(upload: &ScreenshotUpload, category: Option<Category>) -> Result<Category> {
    if upload.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(
            HaggleError::InvalidInput(
                format!("'{}' is larger than 10MB, please upload a smaller image", upload.file_name)
            )
        );
    }
    if !upload.mime_type.starts_with("image/") {
        return Err(
            HaggleError::InvalidInput(
                format!("'{}' is not an image ({})", upload.file_name, upload.mime_type)
            )
        );
    }
    category.ok_or_else(||
        HaggleError::InvalidInput("select a category before analyzing a conversation".to_string())
    )
}

fn mime_for_extension(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

pub async fn read_upload<P: AsRef<Path>>(path: P) -> Result<ScreenshotUpload> {
    let path = path.as_ref();
    let metadata = tokio::fs
        ::metadata(path).await
        .map_err(|e| HaggleError::InvalidInput(format!("Failed to read '{}': {}", path.display(), e)))?;
    if metadata.len() > (MAX_UPLOAD_BYTES as u64) {
        return Err(
            HaggleError::InvalidInput(
                format!("'{}' is {} bytes; screenshots are limited to 10 MB", path.display(), metadata.len())
            )
        );
    }
    let bytes = tokio::fs
        ::read(path).await
        .map_err(|e| HaggleError::InvalidInput(format!("Failed to read '{}': {}", path.display(), e)))?;
    let mime_type = path
        .extension()
        .and_then(|e| e.to_str())
        .map(mime_for_extension)
        .unwrap_or("application/octet-stream");

    Ok(ScreenshotUpload {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        mime_type: mime_type.to_string(),
        bytes,
    })
}

pub fn create_analyzer(config: &AppConfig) -> Arc<dyn ConversationAnalyzer> {
    info!("Conversation analysis uses canned results (delay {:?})", config.analysis_delay);
    Arc::new(MockAnalyzer::new(config.analysis_delay))
}
