//! File-manager dialog state.
//!
//! Shows the attachments persisted for one (category, optional entity)
//! scope and buffers new files locally until an explicit save. Rejections
//! are per-file; a failed upload leaves the buffer intact for retry; a
//! failed delete leaves the listed set unchanged.

use matric_core::files::{check_file, FileCategory, FileRejection, UploadedFile};
use matric_core::types::EntityId;

use crate::api::files::PendingFile;
use crate::api::ApiClient;
use crate::error::ClientError;

/// State behind the attachment dialog.
#[derive(Debug)]
pub struct FileManager {
    category: FileCategory,
    entity_id: Option<EntityId>,
    existing: Vec<UploadedFile>,
    pending: Vec<PendingFile>,
}

impl FileManager {
    /// Open the dialog: fetch the current attachment list for the scope.
    pub async fn open(
        client: &ApiClient,
        category: FileCategory,
        entity_id: Option<EntityId>,
    ) -> Result<Self, ClientError> {
        let existing = client.list_files(category, entity_id).await?;
        Ok(Self {
            category,
            entity_id,
            existing,
            pending: Vec::new(),
        })
    }

    /// Dialog state without a server round-trip (drafts, tests).
    pub fn detached(category: FileCategory, entity_id: Option<EntityId>) -> Self {
        Self {
            category,
            entity_id,
            existing: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn category(&self) -> FileCategory {
        self.category
    }

    /// Attachments already persisted server-side.
    pub fn existing(&self) -> &[UploadedFile] {
        &self.existing
    }

    /// Locally queued files awaiting save.
    pub fn pending(&self) -> &[PendingFile] {
        &self.pending
    }

    /// Queue one file after the client-side size/type checks. A rejected
    /// file never affects the rest of the batch.
    pub fn add(
        &mut self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<&PendingFile, FileRejection> {
        check_file(file_name, bytes.len() as u64, content_type)?;
        let local_name = format!("{}-{file_name}", uuid::Uuid::new_v4());
        self.pending.push(PendingFile {
            local_name,
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        });
        Ok(self.pending.last().expect("just pushed"))
    }

    /// Drop one queued file by its local name. Returns whether anything
    /// was removed.
    pub fn discard(&mut self, local_name: &str) -> bool {
        let before = self.pending.len();
        self.pending.retain(|f| f.local_name != local_name);
        self.pending.len() != before
    }

    /// Upload the pending buffer as one multipart batch. The buffer is
    /// drained only on success, so a failed upload can simply be retried.
    /// Returns how many files were persisted.
    pub async fn save(&mut self, client: &ApiClient) -> Result<usize, ClientError> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        let uploaded = client
            .upload_files(self.category, self.entity_id, &self.pending)
            .await?;
        let count = self.pending.len();
        self.pending.clear();
        self.existing.extend(uploaded);
        Ok(count)
    }

    /// Delete a persisted attachment by its server local name. The listed
    /// set is unchanged if the call fails.
    pub async fn remove(
        &mut self,
        client: &ApiClient,
        local_name: &str,
    ) -> Result<(), ClientError> {
        client.delete_file(local_name).await?;
        self.existing.retain(|f| f.local_name != local_name);
        Ok(())
    }

    /// Fetch a persisted attachment's bytes.
    pub async fn download(
        &self,
        client: &ApiClient,
        file: &UploadedFile,
    ) -> Result<Vec<u8>, ClientError> {
        client.download_file(&file.path).await
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use matric_core::files::MAX_FILE_SIZE_BYTES;

    use super::*;

    #[test]
    fn add_queues_validated_files() {
        let mut manager = FileManager::detached(FileCategory::Personal, None);
        manager
            .add("passport.pdf", "application/pdf", vec![1, 2, 3])
            .unwrap();
        manager.add("photo.png", "image/png", vec![4, 5]).unwrap();
        assert_eq!(manager.pending().len(), 2);
        assert_eq!(manager.pending()[0].file_name, "passport.pdf");
    }

    #[test]
    fn rejection_leaves_the_rest_of_the_batch() {
        let mut manager = FileManager::detached(FileCategory::Undergraduate, Some(12));
        manager
            .add("transcript.pdf", "application/pdf", vec![0; 16])
            .unwrap();

        let oversized = vec![0; (MAX_FILE_SIZE_BYTES + 1) as usize];
        assert_matches!(
            manager.add("scan.pdf", "application/pdf", oversized),
            Err(FileRejection::TooLarge { .. })
        );
        assert_matches!(
            manager.add("cv.docx", "application/msword", vec![0; 16]),
            Err(FileRejection::DisallowedType { .. })
        );

        assert_eq!(manager.pending().len(), 1);
    }

    #[test]
    fn local_names_are_unique_per_queued_file() {
        let mut manager = FileManager::detached(FileCategory::English, None);
        manager.add("ielts.pdf", "application/pdf", vec![1]).unwrap();
        manager.add("ielts.pdf", "application/pdf", vec![2]).unwrap();
        let names: Vec<&str> = manager
            .pending()
            .iter()
            .map(|f| f.local_name.as_str())
            .collect();
        assert_ne!(names[0], names[1]);
    }

    #[test]
    fn discard_removes_only_the_named_file() {
        let mut manager = FileManager::detached(FileCategory::Personal, None);
        manager.add("a.pdf", "application/pdf", vec![1]).unwrap();
        let local_name = manager.pending()[0].local_name.clone();
        manager.add("b.pdf", "application/pdf", vec![2]).unwrap();

        assert!(manager.discard(&local_name));
        assert!(!manager.discard(&local_name));
        assert_eq!(manager.pending().len(), 1);
        assert_eq!(manager.pending()[0].file_name, "b.pdf");
    }
}
