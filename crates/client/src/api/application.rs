//! Submission, detail, and update of the application aggregate.
//!
//! The submission wire is multipart form data: the flattened field pairs
//! from `matric_core::form::wire` plus one file part per attachment,
//! named after the owning section. There is no idempotency key and no
//! partial retry; a failed POST leaves the form populated so the user can
//! try the whole submission again.

use reqwest::multipart;
use serde::Deserialize;

use matric_core::application::Application;
use matric_core::form::{wire, AdmissionForm};
use matric_core::types::EntityId;

use crate::error::ClientError;

use super::ApiClient;

/// One attachment riding along with a submission, tied to the form path
/// of its owning section (e.g. `EducationDetails.Undergraduates[0]`).
#[derive(Debug, Clone)]
pub struct SectionFile {
    pub section: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Server acknowledgement of a submission.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    pub id: EntityId,
}

impl ApiClient {
    fn multipart_body(
        fields: Vec<(String, String)>,
        files: &[SectionFile],
    ) -> Result<multipart::Form, ClientError> {
        let mut form = multipart::Form::new();
        for (name, value) in fields {
            form = form.text(name, value);
        }
        for file in files {
            let part = multipart::Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)
                .map_err(ClientError::from_reqwest)?;
            form = form.part(format!("{}.Files", file.section), part);
        }
        Ok(form)
    }

    /// POST /api/admissions -- submit a new application.
    ///
    /// Resets the form on success; a failure leaves it populated for
    /// retry.
    pub async fn submit_application(
        &self,
        form: &mut AdmissionForm,
        files: &[SectionFile],
    ) -> Result<SubmitReceipt, ClientError> {
        let body = Self::multipart_body(wire::flatten(form), files)?;
        let response = self
            .send(self.http.post(self.url("/api/admissions")).multipart(body))
            .await?;
        let receipt: SubmitReceipt = Self::parse_response(response).await?;
        form.reset();
        tracing::info!(application_id = receipt.id, "Application submitted");
        Ok(receipt)
    }

    /// GET /api/admissions/{id} -- authenticated detail fetch for the
    /// view/edit page.
    pub async fn application_detail(&self, id: EntityId) -> Result<Application, ClientError> {
        let builder = self.authed(self.http.get(self.url(&format!("/api/admissions/{id}"))))?;
        let response = self.send(builder).await?;
        Self::parse_response(response).await
    }

    /// PUT /api/admissions/{id} -- authenticated edit.
    ///
    /// On success the form's current values become its new baseline; on
    /// failure it stays dirty for retry.
    pub async fn update_application(
        &self,
        id: EntityId,
        form: &mut AdmissionForm,
        files: &[SectionFile],
    ) -> Result<(), ClientError> {
        let body = Self::multipart_body(wire::flatten(form), files)?;
        let builder = self.authed(
            self.http
                .put(self.url(&format!("/api/admissions/{id}")))
                .multipart(body),
        )?;
        self.send(builder).await?;
        form.commit();
        tracing::info!(application_id = id, "Application updated");
        Ok(())
    }
}
