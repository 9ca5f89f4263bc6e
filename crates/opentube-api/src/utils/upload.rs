//! Common utilities for the video upload handler

use axum::extract::Multipart;
use opentube_core::models::Visibility;
use opentube_core::AppError;

/// Fields extracted from the upload multipart form.
#[derive(Debug)]
pub struct UploadForm {
    pub data: Vec<u8>,
    pub filename: String,
    pub content_type: String,
    pub title: Option<String>,
    pub description: String,
    pub visibility: Visibility,
}

/// Extract the file and its accompanying metadata fields from a multipart form.
/// Only one field named "file" is accepted; multiple file fields are rejected.
pub async fn extract_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut visibility: Option<Visibility> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "file" => {
                if file_data.is_some() {
                    return Err(AppError::Validation(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                filename = field.file_name().map(|s: &str| s.to_string());
                content_type = field.content_type().map(|s: &str| s.to_string());

                let data = field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read file data: {}", e))
                })?;

                file_data = Some(data.to_vec());
            }
            "title" => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read title field: {}", e))
                })?;
                if !text.trim().is_empty() {
                    title = Some(text);
                }
            }
            "description" => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read description field: {}", e))
                })?;
                description = Some(text);
            }
            "visibility" => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read visibility field: {}", e))
                })?;
                visibility = Some(text.parse().map_err(AppError::Validation)?);
            }
            _ => {}
        }
    }

    let file_data = file_data.ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    Ok(UploadForm {
        data: file_data,
        filename: filename.unwrap_or_else(|| "unknown".to_string()),
        content_type: content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
        title,
        description: description.unwrap_or_default(),
        visibility: visibility.unwrap_or_default(),
    })
}

/// Validate file size
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

/// Sanitize filename to prevent path traversal and invalid characters.
/// Returns an error if the filename contains path traversal attempts.
pub fn sanitize_filename(filename: &str) -> Result<String, AppError> {
    const MAX_FILENAME_LENGTH: usize = 255;

    let path = std::path::Path::new(filename);
    if path
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(AppError::Validation(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    let filename_only = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    if filename_only.contains("..") {
        return Err(AppError::Validation(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim().is_empty() || sanitized.len() < 3 {
        return Ok("file".to_string());
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_filename_rejects_path_traversal() {
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename("foo/../bar").is_err());
        assert!(sanitize_filename("....").is_err());
    }

    #[test]
    fn sanitize_filename_accepts_valid_names() {
        assert_eq!(sanitize_filename("clip.mp4").unwrap(), "clip.mp4");
        assert_eq!(sanitize_filename("my-video_1.mov").unwrap(), "my-video_1.mov");
    }

    #[test]
    fn sanitize_filename_replaces_invalid_characters() {
        assert_eq!(sanitize_filename("my video!.mp4").unwrap(), "my_video_.mp4");
    }

    #[test]
    fn validate_file_size_enforces_ceiling() {
        assert!(validate_file_size(100, 200).is_ok());
        assert!(validate_file_size(200, 200).is_ok());
        let err = validate_file_size(201, 200).unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }
}
