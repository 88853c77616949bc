//! OTP login flow.
//!
//! The candidate requests a one-time code (by phone number, national id,
//! or profile code, delivered over SMS/Email/Zalo), then exchanges the
//! profile code + 6-digit code for a bearer token and identity claims.

use serde::{Deserialize, Serialize};

use matric_core::error::CoreError;
use matric_core::types::EntityId;

use crate::error::ClientError;
use crate::session::Session;

use super::ApiClient;

/// How the candidate identifies themselves when requesting an OTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OtpMethod {
    Phone,
    NationalId,
    ProfileCode,
}

/// Delivery channel for the OTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OtpChannel {
    Sms,
    Email,
    Zalo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendOtpRequest<'a> {
    method: OtpMethod,
    channel: OtpChannel,
    receiver: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    profile_code: &'a str,
    code: &'a str,
}

/// Token plus identity claims returned on a successful login.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub student_id: EntityId,
    pub full_name: String,
    pub profile_code: String,
}

impl ApiClient {
    /// POST /api/auth/otp -- ask the backend to send a one-time code.
    pub async fn send_otp(
        &self,
        method: OtpMethod,
        channel: OtpChannel,
        receiver: &str,
    ) -> Result<(), ClientError> {
        let body = SendOtpRequest {
            method,
            channel,
            receiver,
        };
        self.send(self.http.post(self.url("/api/auth/otp")).json(&body))
            .await?;
        tracing::info!(?method, ?channel, "OTP requested");
        Ok(())
    }

    /// POST /api/auth/login -- exchange profile code + 6-digit OTP for a
    /// bearer token. The session is persisted on success.
    pub async fn login(&self, profile_code: &str, code: &str) -> Result<Session, ClientError> {
        let code = code.trim();
        if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ClientError::Core(CoreError::Validation(
                "OTP code must be exactly 6 digits".into(),
            )));
        }

        let body = LoginRequest { profile_code, code };
        let response = self
            .send(self.http.post(self.url("/api/auth/login")).json(&body))
            .await?;
        let login: LoginResponse = Self::parse_response(response).await?;

        let session = Session {
            token: login.token,
            student_id: login.student_id,
            full_name: login.full_name,
            profile_code: login.profile_code,
        };
        self.store().save(&session)?;
        tracing::info!(student_id = session.student_id, "Logged in");
        Ok(session)
    }

    /// Drop the stored session.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.store().clear()
    }
}
