// Plant endpoints: list, create (provisioning), join by sharing code.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{Empty, RestClient};
use crate::error::Error;

/// A plant record as the backend returns it.
///
/// `location` is a JSON-string-encoded `{ display_name, lat, lon }` object;
/// the core crate parses it into a typed location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantRecord {
    pub uuid: String,
    pub nickname: String,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub birth: Option<NaiveDate>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Credential returned by `plant/create`: the token the user types into
/// the device firmware, and the uuid the device will publish under.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCredential {
    pub token: String,
    pub uuid: String,
}

impl RestClient {
    /// Fetch the signed-in user's plants.
    ///
    /// The backend returns `null` or an empty body when the user has no
    /// plants; both normalize to an empty list.
    pub async fn get_plants(&self) -> Result<Vec<PlantRecord>, Error> {
        let plants: Option<Vec<PlantRecord>> =
            self.post_authed("user/get-plants", &Empty {}).await?;
        Ok(plants.unwrap_or_default())
    }

    /// Create a plant record and mint a device credential.
    pub async fn create_plant(
        &self,
        nickname: &str,
        birth_date: NaiveDate,
        location: &str,
        species: &str,
    ) -> Result<DeviceCredential, Error> {
        self.post_authed(
            "plant/create",
            &json!({
                "nickname": nickname,
                "birthDate": birth_date,
                "location": location,
                "species": species,
            }),
        )
        .await
    }

    /// Join a shared plant via its sharing code.
    pub async fn join_plant(&self, code: &str) -> Result<(), Error> {
        // The success body carries no data we need; ignore it.
        let _: serde_json::Value = self
            .post_authed("plants/join", &json!({ "code": code }))
            .await?;
        Ok(())
    }
}
