// ── Pairing flow ──
//
// Bounded step sequence for adding a plant: either provisioning a new
// device (collect form data, create the backend record, wait for the
// device to come online) or joining an existing plant by sharing code.
// Validation failures keep the current step and surface an inline
// message; only a successful gate advances.

use chrono::{NaiveDate, Utc};
use tracing::debug;

use leaflink_api::RestClient;
use leaflink_api::rest::DeviceCredential;

use crate::error::CoreError;
use crate::model::GeoLocation;

/// Where the user is in the pairing sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairingStep {
    /// Pick between creating a new device and joining by code.
    #[default]
    ChoosingMode,
    Nickname,
    Location,
    Species,
    /// Backend record exists; waiting for the device's first status
    /// message.
    AwaitingDevice,
    Done,
    ShareCode,
    ShareDone,
}

/// The pairing state machine.
///
/// Pure state plus the backend calls that gate two of its transitions.
/// The caller owns session handling for the AwaitingDevice step: open a
/// status session for [`credential`](Self::credential)'s uuid, call
/// [`device_online`](Self::device_online) when it signals, and tear the
/// session down on exit from the step.
#[derive(Debug, Default)]
pub struct PairingFlow {
    step: PairingStep,
    nickname: String,
    birth: Option<NaiveDate>,
    location: Option<GeoLocation>,
    species: String,
    credential: Option<DeviceCredential>,
    creating: bool,
    online_seen: bool,
    error: Option<String>,
}

impl PairingFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> PairingStep {
        self.step
    }

    /// The inline validation/backend error for the current step, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The minted device credential, available from AwaitingDevice on.
    pub fn credential(&self) -> Option<&DeviceCredential> {
        self.credential.as_ref()
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn species(&self) -> &str {
        &self.species
    }

    // ── Mode choice ──────────────────────────────────────────────────

    pub fn choose_create(&mut self) {
        if self.step == PairingStep::ChoosingMode {
            self.step = PairingStep::Nickname;
        }
    }

    pub fn choose_share(&mut self) {
        if self.step == PairingStep::ChoosingMode {
            self.step = PairingStep::ShareCode;
        }
    }

    /// Step backward one screen. No-op at the entry step and past the
    /// point of no return (the backend record already exists).
    pub fn back(&mut self) {
        self.error = None;
        self.step = match self.step {
            PairingStep::Nickname | PairingStep::ShareCode => PairingStep::ChoosingMode,
            PairingStep::Location => PairingStep::Nickname,
            PairingStep::Species => PairingStep::Location,
            step => step,
        };
    }

    // ── Create branch ────────────────────────────────────────────────

    /// Nickname screen gate: non-empty name, birth date not in the
    /// future.
    pub fn submit_nickname(
        &mut self,
        nickname: &str,
        birth: NaiveDate,
    ) -> Result<(), CoreError> {
        self.expect_step(PairingStep::Nickname)?;

        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(self.reject("nickname must not be empty"));
        }
        if birth > Utc::now().date_naive() {
            return Err(self.reject("birth date cannot be in the future"));
        }

        self.nickname = nickname.to_string();
        self.birth = Some(birth);
        self.advance(PairingStep::Location);
        Ok(())
    }

    /// Location screen gate: a geocoded location must be chosen.
    pub fn submit_location(&mut self, location: GeoLocation) -> Result<(), CoreError> {
        self.expect_step(PairingStep::Location)?;

        if location.display_name.trim().is_empty() {
            return Err(self.reject("location must not be empty"));
        }

        self.location = Some(location);
        self.advance(PairingStep::Species);
        Ok(())
    }

    /// Species screen gate: non-empty species and no creation already in
    /// flight. On success the backend record is created and the flow
    /// holds the minted device credential.
    pub async fn submit_species(
        &mut self,
        species: &str,
        rest: &RestClient,
    ) -> Result<(), CoreError> {
        self.expect_step(PairingStep::Species)?;

        let species = species.trim();
        if species.is_empty() {
            return Err(self.reject("species must not be empty"));
        }
        if self.creating {
            return Err(self.reject("creation already in progress"));
        }

        let (birth, location) = match (self.birth, &self.location) {
            (Some(birth), Some(location)) => (birth, location),
            _ => {
                return Err(CoreError::Internal(
                    "species step reached without form data".into(),
                ));
            }
        };
        let location_json = serde_json::to_string(location)
            .map_err(|e| CoreError::Internal(format!("location encoding failed: {e}")))?;

        self.creating = true;
        let result = rest
            .create_plant(&self.nickname, birth, &location_json, species)
            .await;
        self.creating = false;

        match result {
            Ok(credential) => {
                debug!(uuid = %credential.uuid, "plant record created");
                self.species = species.to_string();
                self.credential = Some(credential);
                self.advance(PairingStep::AwaitingDevice);
                Ok(())
            }
            Err(e) => {
                let err = CoreError::from(e);
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Record the device's first status signal. Returns `true` exactly
    /// once, on the transition to Done; later signals are no-ops.
    pub fn device_online(&mut self) -> bool {
        if self.step == PairingStep::AwaitingDevice && !self.online_seen {
            self.online_seen = true;
            self.advance(PairingStep::Done);
            return true;
        }
        false
    }

    /// Manual escape hatch: finish without waiting for the device.
    pub fn skip_wait(&mut self) {
        if self.step == PairingStep::AwaitingDevice {
            self.advance(PairingStep::Done);
        }
    }

    // ── Share branch ─────────────────────────────────────────────────

    /// Join an existing plant by its sharing code.
    pub async fn submit_share_code(
        &mut self,
        code: &str,
        rest: &RestClient,
    ) -> Result<(), CoreError> {
        self.expect_step(PairingStep::ShareCode)?;

        let code = code.trim();
        if code.is_empty() {
            return Err(self.reject("sharing code must not be empty"));
        }

        match rest.join_plant(code).await {
            Ok(()) => {
                self.advance(PairingStep::ShareDone);
                Ok(())
            }
            Err(e) => {
                let err = CoreError::from(e);
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    fn advance(&mut self, step: PairingStep) {
        self.error = None;
        self.step = step;
    }

    fn reject(&mut self, message: &str) -> CoreError {
        self.error = Some(message.to_string());
        CoreError::ValidationFailed {
            message: message.to_string(),
        }
    }

    fn expect_step(&self, expected: PairingStep) -> Result<(), CoreError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(CoreError::Rejected {
                message: format!("not at the {expected:?} step"),
            })
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn berlin() -> GeoLocation {
        GeoLocation {
            display_name: "Berlin".into(),
            lat: "52.5".into(),
            lon: "13.4".into(),
        }
    }

    fn yesterday() -> NaiveDate {
        Utc::now().date_naive() - chrono::Days::new(1)
    }

    #[test]
    fn starts_at_mode_choice() {
        let flow = PairingFlow::new();
        assert_eq!(flow.step(), PairingStep::ChoosingMode);
        assert_eq!(flow.error(), None);
    }

    #[test]
    fn empty_nickname_keeps_the_step() {
        let mut flow = PairingFlow::new();
        flow.choose_create();

        let err = flow.submit_nickname("   ", yesterday()).unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert_eq!(flow.step(), PairingStep::Nickname);
        assert!(flow.error().is_some());
    }

    #[test]
    fn future_birth_date_is_rejected() {
        let mut flow = PairingFlow::new();
        flow.choose_create();

        let tomorrow = Utc::now().date_naive() + chrono::Days::new(1);
        assert!(flow.submit_nickname("Mr. Leafy", tomorrow).is_err());
        assert_eq!(flow.step(), PairingStep::Nickname);
    }

    #[test]
    fn valid_form_advances_and_clears_errors() {
        let mut flow = PairingFlow::new();
        flow.choose_create();

        flow.submit_nickname("", yesterday()).unwrap_err();
        flow.submit_nickname("Mr. Leafy", yesterday()).unwrap();
        assert_eq!(flow.step(), PairingStep::Location);
        assert_eq!(flow.error(), None);

        flow.submit_location(berlin()).unwrap();
        assert_eq!(flow.step(), PairingStep::Species);
    }

    #[test]
    fn back_walks_the_create_branch() {
        let mut flow = PairingFlow::new();
        flow.choose_create();
        flow.submit_nickname("Mr. Leafy", yesterday()).unwrap();
        flow.submit_location(berlin()).unwrap();

        flow.back();
        assert_eq!(flow.step(), PairingStep::Location);
        flow.back();
        assert_eq!(flow.step(), PairingStep::Nickname);
        flow.back();
        assert_eq!(flow.step(), PairingStep::ChoosingMode);
        flow.back();
        assert_eq!(flow.step(), PairingStep::ChoosingMode);
    }

    #[test]
    fn online_signal_transitions_exactly_once() {
        let mut flow = PairingFlow::new();
        flow.step = PairingStep::AwaitingDevice;

        assert!(flow.device_online());
        assert_eq!(flow.step(), PairingStep::Done);
        // A second status message changes nothing.
        assert!(!flow.device_online());
        assert_eq!(flow.step(), PairingStep::Done);
    }

    #[test]
    fn skip_wait_finishes_without_a_signal() {
        let mut flow = PairingFlow::new();
        flow.step = PairingStep::AwaitingDevice;

        flow.skip_wait();
        assert_eq!(flow.step(), PairingStep::Done);
        // The latch still guards against a late status message.
        assert!(!flow.device_online());
    }

    #[test]
    fn wrong_step_submissions_are_rejected() {
        let mut flow = PairingFlow::new();
        let err = flow.submit_location(berlin()).unwrap_err();
        assert!(matches!(err, CoreError::Rejected { .. }));
    }
}
