//! Association data model and plugin input decoding.
//!
//! An association is a declarative desired-state job registered against this
//! node. The refresh plugin never creates associations; it only re-evaluates
//! the ones the service already knows about.

pub mod selector;
pub mod service;

use serde::{Deserialize, Serialize};
use steward_common::{AssociationId, AssociationStatus, Error, InstanceId, Result};

/// One registered association bound to this node.
///
/// Constructed fresh per refresh request from the service listing; `content`
/// is populated lazily by the detail-load step, and `run_now` is written by
/// the selector and read by the schedule manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceAssociation {
    pub association_id: AssociationId,
    pub name: String,
    pub instance_id: InstanceId,
    /// Desired-state document, loaded lazily from the service or cache.
    #[serde(default)]
    pub content: Option<String>,
    /// Selection flag consumed by the schedule refresh.
    #[serde(default)]
    pub run_now: bool,
    #[serde(default)]
    pub status: AssociationStatus,
}

impl InstanceAssociation {
    pub fn new(
        association_id: impl Into<AssociationId>,
        name: impl Into<String>,
        instance_id: impl Into<InstanceId>,
    ) -> Self {
        Self {
            association_id: association_id.into(),
            name: name.into(),
            instance_id: instance_id.into(),
            content: None,
            run_now: false,
            status: AssociationStatus::default(),
        }
    }
}

/// One set of refresh parameters executed by the plugin.
///
/// Wire shape (per the framework's document schema):
/// `{ "ID": "...", "AssociationIds": ["...", ...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshRequest {
    #[serde(rename = "ID", default)]
    pub id: String,

    #[serde(rename = "AssociationIds", default)]
    pub association_ids: Vec<String>,
}

impl RefreshRequest {
    /// Decode a raw property-set value into a typed request.
    ///
    /// Unknown fields are ignored; a shape mismatch is an input error that
    /// fails the batch element.
    pub fn from_raw(raw: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(raw.clone())
            .map_err(|err| Error::InvalidInput(format!("{}; error {}", raw, err)))
    }
}

/// Normalize the document's `Properties` payload into a list of property
/// sets.
///
/// Some document schemas carry a single object, others a list; the plugin
/// always iterates, so a lone object becomes a one-element batch.
pub fn load_properties_as_list(properties: &serde_json::Value) -> Vec<serde_json::Value> {
    match properties {
        serde_json::Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}
