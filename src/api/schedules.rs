use crate::api::ApiClient;
use crate::domain::sentiment::{Cadence, NewSchedule, Schedule};
use crate::utils::error::{ClientError, Result};
use crate::utils::validation::validate_non_empty_string;
use reqwest::Method;
use serde_json::Value;

impl NewSchedule {
    /// Client-side checks before the request goes out.
    pub fn check(&self) -> Result<()> {
        validate_non_empty_string("email", &self.email)?;
        if self.cadence == Cadence::Custom && self.custom_date.is_none() {
            return Err(ClientError::ValidationError {
                message: "Please select a date for custom schedule".to_string(),
            });
        }
        Ok(())
    }
}

impl ApiClient {
    pub async fn create_schedule(&self, schedule: &NewSchedule) -> Result<Value> {
        schedule.check()?;

        // Date and time only travel with custom cadences.
        let payload = if schedule.cadence == Cadence::Custom {
            schedule.clone()
        } else {
            NewSchedule {
                custom_date: None,
                custom_time: None,
                ..schedule.clone()
            }
        };

        self.call(
            Method::POST,
            "/schedules",
            &[],
            Some(serde_json::to_value(&payload)?),
        )
        .await
        .inspect_err(|e| tracing::error!("Create schedule error: {}", e))
    }

    pub async fn schedules(&self) -> Result<Vec<Schedule>> {
        let envelope = self.call(Method::GET, "/schedules", &[], None).await?;
        match envelope.get("schedules") {
            Some(list) => Ok(serde_json::from_value(list.clone())?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn delete_schedule(&self, id: &str) -> Result<()> {
        self.call(Method::DELETE, &format!("/schedules/{}", id), &[], None)
            .await
            .inspect_err(|e| tracing::error!("Delete schedule error: {}", e))?;
        Ok(())
    }

    pub async fn toggle_schedule(&self, id: &str) -> Result<Value> {
        self.call(Method::PATCH, &format!("/schedules/{}/toggle", id), &[], None)
            .await
            .inspect_err(|e| tracing::error!("Toggle schedule error: {}", e))
    }
}
