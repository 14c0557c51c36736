//! Collaborator traits for association listing, loading, and status updates.
//!
//! The refresh plugin consumes these seams; the agent host wires real
//! implementations (metadata endpoint, remote association service, on-disk
//! cache). `Static*` implementations back tests and the local harness.

use crate::association::InstanceAssociation;
use std::collections::HashMap;
use std::sync::Mutex;
use steward_common::{
    AssociationErrorCode, AssociationId, AssociationStatus, Error, InstanceId, Result,
};

/// Resolves the identity of the node this agent runs on.
pub trait IdentityResolver {
    fn instance_id(&self) -> Result<InstanceId>;
}

/// A per-association status report sent back to the service.
#[derive(Debug, Clone)]
pub struct AssociationStatusUpdate {
    pub association_id: AssociationId,
    pub name: String,
    pub instance_id: InstanceId,
    pub status: AssociationStatus,
    pub error_code: AssociationErrorCode,
    /// ISO-8601 UTC, see [`steward_common::to_iso8601_utc`].
    pub timestamp: String,
    pub message: String,
}

/// Authoritative source of associations bound to an instance.
pub trait AssociationService {
    /// List every association currently bound to `instance_id`.
    ///
    /// An empty list is a valid answer; only a service failure is an error.
    fn list_associations(&self, instance_id: &InstanceId) -> Result<Vec<InstanceAssociation>>;

    /// Populate `content` for one association from cache or service.
    fn load_association_detail(&self, assoc: &mut InstanceAssociation) -> Result<()>;

    /// Report a per-association status change. Best-effort; the service
    /// owns retry and durability.
    fn update_association_status(&self, update: AssociationStatusUpdate);
}

/// On-disk association cache hook.
pub trait AssociationCache {
    /// Give the cache a chance to refresh or invalidate its copy before
    /// detail loading. The return value is not consumed by the plugin.
    fn validate(&self, assoc: &InstanceAssociation);
}

/// Cache that does nothing (cacheless deployments and tests).
#[derive(Debug, Default)]
pub struct NoopCache;

impl AssociationCache for NoopCache {
    fn validate(&self, _assoc: &InstanceAssociation) {}
}

/// Cache double that records which associations were validated.
#[derive(Debug, Default)]
pub struct RecordingCache {
    validated: Mutex<Vec<AssociationId>>,
}

impl RecordingCache {
    pub fn validated_ids(&self) -> Vec<AssociationId> {
        self.validated.lock().expect("cache mutex").clone()
    }
}

impl AssociationCache for RecordingCache {
    fn validate(&self, assoc: &InstanceAssociation) {
        self.validated
            .lock()
            .expect("cache mutex")
            .push(assoc.association_id.clone());
    }
}

/// Identity resolver with a fixed answer.
#[derive(Debug, Default)]
pub struct StaticIdentityResolver {
    instance_id: Option<InstanceId>,
}

impl StaticIdentityResolver {
    pub fn new(instance_id: impl Into<InstanceId>) -> Self {
        Self {
            instance_id: Some(instance_id.into()),
        }
    }

    /// A resolver that always fails, for exercising the fatal path.
    pub fn unresolvable() -> Self {
        Self { instance_id: None }
    }
}

impl IdentityResolver for StaticIdentityResolver {
    fn instance_id(&self) -> Result<InstanceId> {
        self.instance_id
            .clone()
            .ok_or_else(|| Error::IdentityResolution("no instance identity available".into()))
    }
}

/// In-memory association service backing tests and the local harness.
///
/// Holds a fixed listing plus per-association content; specific failures can
/// be injected to drive the plugin's fatal paths.
#[derive(Debug, Default)]
pub struct StaticAssociationService {
    associations: Vec<InstanceAssociation>,
    content: HashMap<AssociationId, String>,
    list_error: Option<String>,
    load_error_for: Option<AssociationId>,
    status_updates: Mutex<Vec<AssociationStatusUpdate>>,
}

impl StaticAssociationService {
    pub fn new(associations: Vec<InstanceAssociation>) -> Self {
        let content = associations
            .iter()
            .map(|a| {
                (
                    a.association_id.clone(),
                    format!("{{\"name\":\"{}\"}}", a.name),
                )
            })
            .collect();
        Self {
            associations,
            content,
            ..Self::default()
        }
    }

    /// Replace the content document served for one association.
    pub fn with_content(mut self, id: impl Into<AssociationId>, content: impl Into<String>) -> Self {
        self.content.insert(id.into(), content.into());
        self
    }

    /// Make `list_associations` fail.
    pub fn with_list_error(mut self, message: impl Into<String>) -> Self {
        self.list_error = Some(message.into());
        self
    }

    /// Make detail loading fail for one association.
    pub fn with_load_error_for(mut self, id: impl Into<AssociationId>) -> Self {
        self.load_error_for = Some(id.into());
        self
    }

    /// Status updates received so far, oldest first.
    pub fn status_updates(&self) -> Vec<AssociationStatusUpdate> {
        self.status_updates.lock().expect("status mutex").clone()
    }
}

impl AssociationService for StaticAssociationService {
    fn list_associations(&self, instance_id: &InstanceId) -> Result<Vec<InstanceAssociation>> {
        if let Some(message) = &self.list_error {
            return Err(Error::ListAssociations(message.clone()));
        }
        Ok(self
            .associations
            .iter()
            .filter(|a| &a.instance_id == instance_id)
            .cloned()
            .collect())
    }

    fn load_association_detail(&self, assoc: &mut InstanceAssociation) -> Result<()> {
        if self.load_error_for.as_ref() == Some(&assoc.association_id) {
            return Err(Error::Service("association content unavailable".into()));
        }
        match self.content.get(&assoc.association_id) {
            Some(content) => {
                assoc.content = Some(content.clone());
                Ok(())
            }
            None => Err(Error::Service("association content not found".into())),
        }
    }

    fn update_association_status(&self, update: AssociationStatusUpdate) {
        self.status_updates
            .lock()
            .expect("status mutex")
            .push(update);
    }
}
