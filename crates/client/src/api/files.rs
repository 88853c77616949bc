//! File endpoints: batch upload, list, delete-by-local-name, download.
//!
//! All four require an authenticated session; attachments are scoped by
//! (student, category, optional entity).

use reqwest::multipart;

use matric_core::files::{FileCategory, UploadedFile};
use matric_core::types::EntityId;

use crate::error::ClientError;

use super::ApiClient;

/// A locally validated file waiting in the pending buffer.
#[derive(Debug, Clone)]
pub struct PendingFile {
    /// Client-generated name addressing the file within the dialog.
    pub local_name: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ApiClient {
    /// POST /api/files -- upload a batch for one (category, entity) scope.
    pub async fn upload_files(
        &self,
        category: FileCategory,
        entity_id: Option<EntityId>,
        files: &[PendingFile],
    ) -> Result<Vec<UploadedFile>, ClientError> {
        let session = self.require_session()?;

        let mut body = multipart::Form::new()
            .text("Category", category.code().to_string())
            .text("StudentId", session.student_id.to_string());
        if let Some(entity) = entity_id {
            body = body.text("EntityId", entity.to_string());
        }
        for file in files {
            let part = multipart::Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)
                .map_err(ClientError::from_reqwest)?;
            body = body.part("Files", part);
        }

        let builder = self.authed(self.http.post(self.url("/api/files")).multipart(body))?;
        let response = self.send(builder).await?;
        let uploaded: Vec<UploadedFile> = Self::parse_response(response).await?;
        tracing::info!(
            category = category.code(),
            count = uploaded.len(),
            "Files uploaded",
        );
        Ok(uploaded)
    }

    /// GET /api/files -- list attachments for a (category, entity) scope.
    pub async fn list_files(
        &self,
        category: FileCategory,
        entity_id: Option<EntityId>,
    ) -> Result<Vec<UploadedFile>, ClientError> {
        let mut query = vec![("category", category.code().to_string())];
        if let Some(entity) = entity_id {
            query.push(("entityId", entity.to_string()));
        }
        let builder = self.authed(self.http.get(self.url("/api/files")).query(&query))?;
        let response = self.send(builder).await?;
        Self::parse_response(response).await
    }

    /// DELETE /api/files/{local_name}
    pub async fn delete_file(&self, local_name: &str) -> Result<(), ClientError> {
        let builder =
            self.authed(self.http.delete(self.url(&format!("/api/files/{local_name}"))))?;
        self.send(builder).await?;
        Ok(())
    }

    /// GET /api/files/download -- fetch an attachment's raw bytes by
    /// storage path.
    pub async fn download_file(&self, path: &str) -> Result<Vec<u8>, ClientError> {
        let builder = self.authed(
            self.http
                .get(self.url("/api/files/download"))
                .query(&[("path", path)]),
        )?;
        let response = self.send(builder).await?;
        let bytes = response.bytes().await.map_err(ClientError::from_reqwest)?;
        Ok(bytes.to_vec())
    }
}
