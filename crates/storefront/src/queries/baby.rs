//! Baby profiles and vaccination tracking.

use babynest_core::{ApiResponse, Baby, BabyId, VaccineDateUpdate, VaccineId};

use super::{StoreQueries, resource};
use crate::api::MultipartForm;
use crate::error::ApiError;
use crate::query::{Query, QueryKey};
use crate::services::Acknowledgement;

const BABY_DEPENDENTS: &[&str] = &[resource::BABIES, resource::BABY];

impl StoreQueries {
    #[must_use]
    pub fn babies(&self) -> Query<Vec<Baby>> {
        self.read(
            QueryKey::new(resource::BABIES),
            &self.services.baby,
            |service| async move { Ok(service.get_babies().await?.into_data()) },
        )
    }

    #[must_use]
    pub fn baby(&self, id: BabyId) -> Query<Option<Baby>> {
        let key = QueryKey::new(resource::BABY).param("id", id);
        self.read(key, &self.services.baby, move |service| async move {
            Ok(service.get_baby(id).await?.data)
        })
    }

    /// # Errors
    ///
    /// Returns the adapter error; nothing is invalidated on failure.
    pub async fn create_baby(
        &self,
        form: impl Into<MultipartForm> + Send,
    ) -> Result<ApiResponse<Baby>, ApiError> {
        let body = self.services.baby.create_baby(form).await?;
        self.invalidate(BABY_DEPENDENTS).await;
        Ok(body)
    }

    /// # Errors
    ///
    /// Returns the adapter error; nothing is invalidated on failure.
    pub async fn update_baby(
        &self,
        id: BabyId,
        form: impl Into<MultipartForm> + Send,
    ) -> Result<ApiResponse<Baby>, ApiError> {
        let body = self.services.baby.update_baby(id, form).await?;
        self.invalidate(BABY_DEPENDENTS).await;
        Ok(body)
    }

    /// # Errors
    ///
    /// Returns the adapter error; nothing is invalidated on failure.
    pub async fn delete_baby(&self, id: BabyId) -> Result<Acknowledgement, ApiError> {
        let body = self.services.baby.delete_baby(id).await?;
        self.invalidate(BABY_DEPENDENTS).await;
        Ok(body)
    }

    /// Record when a vaccine was given.
    ///
    /// # Errors
    ///
    /// Returns the adapter error; nothing is invalidated on failure.
    pub async fn update_vaccine_date(
        &self,
        baby: BabyId,
        vaccine: VaccineId,
        update: VaccineDateUpdate,
    ) -> Result<Acknowledgement, ApiError> {
        let body = self
            .services
            .baby
            .update_vaccine_date(baby, vaccine, update)
            .await?;
        self.invalidate(BABY_DEPENDENTS).await;
        Ok(body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::testing::{MockTransport, store_queries};

    #[tokio::test(start_paused = true)]
    async fn test_vaccine_update_invalidates_every_baby_key() {
        let transport = MockTransport::ok(json!({
            "data": {"id": 7, "name": "Ayan", "dob": "2025-01-10", "vaccines": []}
        }));
        let queries = store_queries(transport.clone());
        let ayan = queries.baby(BabyId::new(7));
        let other = queries.baby(BabyId::new(8));

        ayan.fetch().await;
        other.fetch().await;

        queries
            .update_vaccine_date(
                BabyId::new(7),
                VaccineId::new(1),
                VaccineDateUpdate {
                    given_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
                },
            )
            .await
            .unwrap();

        assert!(ayan.snapshot().await.is_stale);
        assert!(other.snapshot().await.is_stale);
        let snapshot = ayan.snapshot().await;
        assert_eq!(
            Option::as_ref(&snapshot.data).map(|baby| baby.name.as_str()),
            Some("Ayan")
        );
    }
}
