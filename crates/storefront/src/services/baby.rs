//! Baby profiles and vaccination records.

use babynest_core::{
    ApiResponse, Baby, BabyId, BabyInput, Gender, VaccineDateUpdate, VaccineId,
};
use tracing::instrument;

use super::Acknowledgement;
use crate::api::{ApiClient, ApiRequest, MultipartForm};
use crate::error::ApiError;

impl From<BabyInput> for MultipartForm {
    fn from(input: BabyInput) -> Self {
        Self::new()
            .text("name", input.name)
            .text("dob", input.dob.format("%Y-%m-%d").to_string())
            .text_opt("gender", input.gender.map(Gender::as_str))
            .file_opt("image", input.image)
            .file_opt("birth_certificate", input.birth_certificate)
    }
}

#[derive(Debug, Clone)]
pub struct BabyService {
    api: ApiClient,
}

impl BabyService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self))]
    pub async fn get_babies(&self) -> Result<ApiResponse<Vec<Baby>>, ApiError> {
        self.api.send(ApiRequest::get("/babies").auth()).await
    }

    #[instrument(skip(self), fields(baby_id = %id))]
    pub async fn get_baby(&self, id: BabyId) -> Result<ApiResponse<Baby>, ApiError> {
        self.api
            .send(ApiRequest::get("/babies").segment(id).auth())
            .await
    }

    #[instrument(skip(self, form))]
    pub async fn create_baby(
        &self,
        form: impl Into<MultipartForm> + Send,
    ) -> Result<ApiResponse<Baby>, ApiError> {
        self.api
            .send(ApiRequest::post("/babies").auth().multipart(form.into()))
            .await
    }

    /// Update a profile.
    ///
    /// The API only parses multipart bodies on POST, so the request is always
    /// sent as POST with `_method=PUT`, replacing whatever `_method` the form
    /// already carried.
    #[instrument(skip(self, form), fields(baby_id = %id))]
    pub async fn update_baby(
        &self,
        id: BabyId,
        form: impl Into<MultipartForm> + Send,
    ) -> Result<ApiResponse<Baby>, ApiError> {
        let mut form = form.into();
        form.set_text("_method", "PUT");

        self.api
            .send(ApiRequest::post("/babies").segment(id).auth().multipart(form))
            .await
    }

    #[instrument(skip(self), fields(baby_id = %id))]
    pub async fn delete_baby(&self, id: BabyId) -> Result<Acknowledgement, ApiError> {
        self.api
            .send(ApiRequest::delete("/babies").segment(id).auth())
            .await
    }

    #[instrument(skip(self), fields(baby_id = %baby, vaccine_id = %vaccine))]
    pub async fn update_vaccine_date(
        &self,
        baby: BabyId,
        vaccine: VaccineId,
        update: VaccineDateUpdate,
    ) -> Result<Acknowledgement, ApiError> {
        self.api
            .send(
                ApiRequest::put("/babies")
                    .segment(baby)
                    .segment("vaccines")
                    .segment(vaccine)
                    .auth()
                    .json(&update)?,
            )
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use babynest_core::FileUpload;
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::api::{HttpMethod, Part, RequestBody};
    use crate::testing::{MockTransport, api_config};

    fn input() -> BabyInput {
        BabyInput {
            name: "Ayan".to_string(),
            dob: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            gender: Some(Gender::Male),
            image: Some(FileUpload::new("ayan.jpg", "image/jpeg", vec![0xFF, 0xD8])),
            birth_certificate: None,
        }
    }

    #[test]
    fn test_baby_form_fields() {
        let form = MultipartForm::from(input());
        assert_eq!(form.text_values("dob"), vec!["2025-01-10"]);
        assert_eq!(form.text_values("gender"), vec!["male"]);
        assert!(form.has_files());
        assert!(!form.parts().iter().any(|p| p.name() == "birth_certificate"));
    }

    #[tokio::test]
    async fn test_update_baby_overrides_method() {
        let transport = MockTransport::ok(json!({"success": true}));
        let service = BabyService::new(ApiClient::with_transport(&api_config(), transport.clone()));

        let form = MultipartForm::from(input()).text("_method", "PATCH");
        service.update_baby(BabyId::new(7), form).await.unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url.path(), "/api/v1/babies/7");

        let RequestBody::Multipart(sent) = &request.body else {
            panic!("expected multipart body");
        };
        assert_eq!(sent.text_values("_method"), vec!["PUT"]);
        assert_eq!(sent.text_values("name"), vec!["Ayan"]);
        assert!(
            sent.parts()
                .iter()
                .any(|p| matches!(p, Part::File { name, .. } if name == "image"))
        );
    }

    #[tokio::test]
    async fn test_vaccine_date_body() {
        let transport = MockTransport::ok(json!({}));
        let service = BabyService::new(ApiClient::with_transport(&api_config(), transport.clone()));

        service
            .update_vaccine_date(
                BabyId::new(7),
                VaccineId::new(3),
                VaccineDateUpdate {
                    given_date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
                },
            )
            .await
            .unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.url.path(), "/api/v1/babies/7/vaccines/3");
        assert_eq!(request.body, RequestBody::Json(json!({"given_date": "2025-03-02"})));
    }
}
