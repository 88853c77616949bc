//! Reference-data lookups: programs, languages, countries, the two-level
//! province/ward hierarchy, and the boolean uniqueness checks.

use serde::Deserialize;

use matric_core::types::EntityId;

use crate::error::ClientError;

use super::ApiClient;

/// A program currently open for applications.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: EntityId,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub code: String,
    pub name: String,
}

/// First administrative level.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Province {
    pub code: String,
    pub name: String,
}

/// Second administrative level, listed under one province.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ward {
    pub id: String,
    pub name: String,
    pub province_code: String,
}

/// Ward detail recovers both display names for the view page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardDetail {
    pub id: String,
    pub name: String,
    pub province_code: String,
    pub province_name: String,
}

impl ApiClient {
    /// GET /api/lookup/programs -- programs open for applications.
    pub async fn active_programs(&self) -> Result<Vec<Program>, ClientError> {
        self.get_json("/api/lookup/programs").await
    }

    /// GET /api/lookup/languages
    pub async fn languages(&self) -> Result<Vec<Language>, ClientError> {
        self.get_json("/api/lookup/languages").await
    }

    /// GET /api/lookup/countries
    pub async fn countries(&self) -> Result<Vec<Country>, ClientError> {
        self.get_json("/api/lookup/countries").await
    }

    /// GET /api/lookup/provinces
    pub async fn provinces(&self) -> Result<Vec<Province>, ClientError> {
        self.get_json("/api/lookup/provinces").await
    }

    /// GET /api/lookup/provinces/{code}/wards
    pub async fn wards(&self, province_code: &str) -> Result<Vec<Ward>, ClientError> {
        self.get_json(&format!("/api/lookup/provinces/{province_code}/wards"))
            .await
    }

    /// GET /api/lookup/wards/{id}
    pub async fn ward(&self, id: &str) -> Result<WardDetail, ClientError> {
        self.get_json(&format!("/api/lookup/wards/{id}")).await
    }

    /// Fetch both ward details concurrently; the view page waits for both
    /// names before it renders.
    pub async fn resolve_addresses(
        &self,
        correspondence_ward: &str,
        permanent_ward: &str,
    ) -> Result<(WardDetail, WardDetail), ClientError> {
        tokio::try_join!(self.ward(correspondence_ward), self.ward(permanent_ward))
    }

    /// GET /api/validation/passport-exists -- boolean uniqueness check.
    pub async fn passport_exists(&self, value: &str) -> Result<bool, ClientError> {
        let response = self
            .send(
                self.http
                    .get(self.url("/api/validation/passport-exists"))
                    .query(&[("value", value)]),
            )
            .await?;
        Self::parse_response(response).await
    }

    /// GET /api/validation/mobile-exists -- boolean uniqueness check.
    pub async fn mobile_exists(&self, value: &str) -> Result<bool, ClientError> {
        let response = self
            .send(
                self.http
                    .get(self.url("/api/validation/mobile-exists"))
                    .query(&[("value", value)]),
            )
            .await?;
        Self::parse_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ward_detail_parses_both_names() {
        let detail: WardDetail = serde_json::from_str(
            r#"{
                "id": "20308",
                "name": "Hai Chau",
                "provinceCode": "48",
                "provinceName": "Da Nang"
            }"#,
        )
        .unwrap();
        assert_eq!(detail.name, "Hai Chau");
        assert_eq!(detail.province_name, "Da Nang");
    }
}
