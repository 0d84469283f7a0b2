//! Rules for ZX303 tracker records.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::ports::{PartyAdministrator, ValidateRequest, Validator, ValidatorError};
use crate::domain::validation::existence_reason;
use crate::domain::{Action, Claims, IgnoredReasons, ReasonInvalid, ReasonKind, Zx303};

const BOTH_OR_NEITHER: &str = "must both be blank or set";

/// Validates trackers before they are created or updated.
///
/// Owner and assignee references are resolved under the caller's claims.
pub struct Zx303Validator<P> {
    parties: Arc<P>,
    ignored: IgnoredReasons,
}

impl<P> Zx303Validator<P> {
    /// Build a validator that resolves party references through `parties`.
    pub fn new(parties: Arc<P>) -> Self {
        Self {
            parties,
            ignored: IgnoredReasons::default()
                .ignore(Action::Create, "id", [ReasonKind::Blank])
                .ignore(Action::UpdateAllowedFields, "id", [ReasonKind::Blank]),
        }
    }
}

fn blank_fields(device: &Zx303) -> Vec<ReasonInvalid> {
    [
        ("id", &device.id),
        ("imei", &device.imei),
        ("simCountryCode", &device.sim_country_code),
        ("simNumber", &device.sim_number),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, value)| ReasonInvalid::blank(field, value.as_str()))
    .collect()
}

fn session_state_reasons(device: &Zx303) -> Vec<ReasonInvalid> {
    let mut reasons = Vec::new();
    if device.logged_in {
        reasons.push(ReasonInvalid::new(
            "loggedIn",
            ReasonKind::MustNotBeSet,
            "cannot be true on creation",
            true,
        ));
    }
    for (field, timestamp) in [
        ("logInTimestamp", device.log_in_timestamp),
        ("logOutTimestamp", device.log_out_timestamp),
        ("lastHeartbeatTimestamp", device.last_heartbeat_timestamp),
    ] {
        if timestamp != 0 {
            reasons.push(ReasonInvalid::new(
                field,
                ReasonKind::MustNotBeSet,
                "should be 0 on creation",
                timestamp,
            ));
        }
    }
    reasons
}

impl<P: PartyAdministrator> Zx303Validator<P> {
    async fn owner_reasons(&self, claims: &Claims, device: &Zx303) -> Vec<ReasonInvalid> {
        let mut reasons = Vec::new();
        if device.owner_party_type.is_none() {
            reasons.push(ReasonInvalid::blank("ownerPartyType", Value::Null));
        }
        match device.owner_party_type {
            _ if device.owner_id.trim().is_empty() => {
                reasons.push(ReasonInvalid::blank("ownerId", device.owner_id.as_str()));
            }
            None => {}
            Some(party_type) => {
                let lookup = self
                    .parties
                    .retrieve_party(claims.clone(), party_type, device.owner_id.clone())
                    .await;
                reasons.extend(existence_reason("ownerId", "owner", &device.owner_id, lookup));
            }
        }
        reasons
    }

    async fn assigned_reasons(&self, claims: &Claims, device: &Zx303) -> Vec<ReasonInvalid> {
        match (device.assigned_party_type, device.assigned_id.trim().is_empty()) {
            (None, true) => Vec::new(),
            (Some(party_type), false) => {
                let lookup = self
                    .parties
                    .retrieve_party(claims.clone(), party_type, device.assigned_id.clone())
                    .await;
                existence_reason("assignedId", "assigned", &device.assigned_id, lookup)
                    .into_iter()
                    .collect()
            }
            _ => vec![
                ReasonInvalid::new(
                    "assignedPartyType",
                    ReasonKind::Invalid,
                    BOTH_OR_NEITHER,
                    device
                        .assigned_party_type
                        .map_or(Value::Null, |party_type| Value::from(party_type.as_str())),
                ),
                ReasonInvalid::new(
                    "assignedId",
                    ReasonKind::Invalid,
                    BOTH_OR_NEITHER,
                    device.assigned_id.as_str(),
                ),
            ],
        }
    }
}

#[async_trait]
impl<P: PartyAdministrator> Validator<Zx303> for Zx303Validator<P> {
    async fn validate(
        &self,
        request: ValidateRequest<Zx303>,
    ) -> Result<Vec<ReasonInvalid>, ValidatorError> {
        let ValidateRequest {
            claims,
            entity: device,
            action,
        } = request;
        claims
            .validate()
            .map_err(|err| ValidatorError::request_invalid(err.to_string()))?;

        let mut reasons = blank_fields(&device);
        if action == Action::Create {
            reasons.extend(session_state_reasons(&device));
        }
        reasons.extend(self.owner_reasons(&claims, &device).await);
        reasons.extend(self.assigned_reasons(&claims, &device).await);

        Ok(self.ignored.filter(action, reasons))
    }
}
