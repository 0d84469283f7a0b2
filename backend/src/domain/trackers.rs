//! Tracking devices and the readings they report.

use serde::{Deserialize, Serialize};

use super::claims::PartyType;
use super::entity::{Entity, IndexSpec};
use super::identifier::Identifier;

mod zx303_administrator;
mod zx303_validator;

pub use self::zx303_administrator::Zx303Administrator;
pub use self::zx303_validator::Zx303Validator;

/// A ZX303 GPS tracker.
///
/// Owned by one party and optionally assigned to another. Session state
/// (`loggedIn` and the timestamps) is maintained by the device gateway and
/// must be unset when the device is first registered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Zx303 {
    /// Record id.
    pub id: String,
    /// Device IMEI, unique across devices.
    pub imei: String,
    /// SIM country dialling code.
    pub sim_country_code: String,
    /// SIM number.
    pub sim_number: String,
    /// Type of the owning party.
    pub owner_party_type: Option<PartyType>,
    /// Id of the owning party.
    pub owner_id: String,
    /// Type of the party the device is assigned to, if any.
    pub assigned_party_type: Option<PartyType>,
    /// Id of the party the device is assigned to, blank if unassigned.
    pub assigned_id: String,
    /// Whether the device holds an open session.
    pub logged_in: bool,
    /// Last login, unix seconds.
    pub log_in_timestamp: i64,
    /// Last logout, unix seconds.
    pub log_out_timestamp: i64,
    /// Last heartbeat, unix seconds.
    pub last_heartbeat_timestamp: i64,
}

impl Zx303 {
    /// Unique indexes for the collection.
    pub fn unique_indexes() -> Vec<IndexSpec> {
        vec![IndexSpec::unique(["imei"])]
    }
}

impl Entity for Zx303 {
    const COLLECTION: &'static str = "zx303";
    const NAME: &'static str = "zx303";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn is_valid_identifier(identifier: &Identifier) -> bool {
        matches!(
            identifier,
            Identifier::Id { .. } | Identifier::DeviceImei { .. }
        )
    }
}

/// Device family a reading came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceType {
    /// ZX303 tracker.
    #[default]
    #[serde(rename = "ZX303")]
    Zx303,
}

/// One GPS fix reported by a device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Reading {
    /// Record id.
    pub id: String,
    /// Reporting device family.
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    /// Id of the reporting device.
    pub device_id: String,
    /// Type of the party owning the device when the fix was taken.
    pub owner_party_type: Option<PartyType>,
    /// Id of that owner.
    pub owner_id: String,
    /// Type of the party the device was assigned to, if any.
    pub assigned_party_type: Option<PartyType>,
    /// Id of that assignee, blank if unassigned.
    pub assigned_id: String,
    /// Fix time, unix seconds.
    pub timestamp: i64,
    /// Degrees north.
    pub latitude: f64,
    /// Degrees east.
    pub longitude: f64,
    /// Ground speed, km/h.
    pub speed: f64,
    /// Course over ground, degrees.
    pub heading: f64,
    /// Satellites used for the fix.
    pub satellites: u32,
}

impl Entity for Reading {
    const COLLECTION: &'static str = "reading";
    const NAME: &'static str = "reading";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn is_valid_identifier(identifier: &Identifier) -> bool {
        matches!(identifier, Identifier::Id { .. })
    }
}
