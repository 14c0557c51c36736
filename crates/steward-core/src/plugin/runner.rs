//! Per-request refresh orchestration.
//!
//! One batch element flows through here: working-directory setup, identity
//! resolution, association listing, cache reconciliation, detail loading,
//! run-now selection, schedule refresh, and the execution signal. Every step
//! up to selection is a potential abort point that fails the whole element;
//! a detail-load failure additionally reports the failing association to the
//! status collaborator before aborting.

use crate::association::selector::{apply_run_now, is_select_all};
use crate::association::service::AssociationStatusUpdate;
use crate::association::RefreshRequest;
use crate::config::PluginConfig;
use crate::plugin::gate::ExecutionGate;
use crate::plugin::output::{ExecutionOutput, OutputManager};
use crate::plugin::Collaborators;
use chrono::Utc;
use std::path::Path;
use steward_common::{
    to_iso8601_utc, AssociationErrorCode, AssociationStatus, Error,
};
use tracing::{debug, warn};

/// Decode one raw property set and run it through the full pipeline,
/// including the output finalization (files, truncation, upload).
pub(crate) fn run_raw_input(
    config: &PluginConfig,
    collaborators: &Collaborators<'_>,
    raw: &serde_json::Value,
    orchestration_dir: &Path,
    gate: &dyn ExecutionGate,
    output_bucket: &str,
    output_prefix: &str,
) -> ExecutionOutput {
    let request = match RefreshRequest::from_raw(raw) {
        Ok(request) => request,
        Err(err) => {
            let mut out = ExecutionOutput::default();
            out.mark_as_failed(&err);
            return out;
        }
    };
    debug!(?request, "plugin input");

    let mut out = run_commands(collaborators, &request, orchestration_dir);

    OutputManager::new(config, collaborators.uploader).finalize(
        &mut out,
        gate,
        &request.id,
        output_bucket,
        output_prefix,
    );

    if let Ok(response) = serde_json::to_string(&out) {
        debug!(%response, "returning response");
    }
    out
}

/// Execute one refresh request. The returned output has exit code 0 unless
/// a fatal step marked it failed; the terminal status is assigned later by
/// the output pipeline.
fn run_commands(
    collaborators: &Collaborators<'_>,
    request: &RefreshRequest,
    orchestration_dir: &Path,
) -> ExecutionOutput {
    let mut out = ExecutionOutput::default();

    // No working-dir hint means a process temp dir. It is intentionally
    // retained after the run; uploads and debugging read it, and cleanup is
    // the host's call.
    out.uses_temp_dir = orchestration_dir.as_os_str().is_empty();
    let base = if out.uses_temp_dir {
        match tempfile::Builder::new().prefix("steward-refresh").tempdir() {
            Ok(dir) => {
                let path = dir.keep();
                warn!(path = %path.display(), "created retained temp working directory");
                out.temp_dir = Some(path.clone());
                path
            }
            Err(err) => {
                out.mark_as_failed(&Error::Io(err));
                return out;
            }
        }
    } else {
        orchestration_dir.to_path_buf()
    };

    out.working_dir = base.join(&request.id);
    debug!(working_dir = %out.working_dir.display(), "resolved working directory");
    if let Err(err) = std::fs::create_dir_all(&out.working_dir) {
        out.mark_as_failed(&Error::WorkspaceCreation {
            path: out.working_dir.display().to_string(),
            message: err.to_string(),
        });
        return out;
    }

    let instance_id = match collaborators.identity.instance_id() {
        Ok(id) => id,
        Err(err) => {
            out.mark_as_failed(&err);
            return out;
        }
    };

    let mut associations = match collaborators.service.list_associations(&instance_id) {
        Ok(associations) => associations,
        Err(err) => {
            out.mark_as_failed(&err);
            return out;
        }
    };

    // Let the cache refresh or invalidate stale entries before loading.
    for assoc in &associations {
        collaborators.cache.validate(assoc);
    }

    // Fail fast on the first load failure: the failing association gets a
    // status report, the rest of the batch element is abandoned, and
    // selection never runs.
    for assoc in associations.iter_mut() {
        if let Err(err) = collaborators.service.load_association_detail(assoc) {
            let wrapped = Error::LoadAssociation {
                association_id: assoc.association_id.to_string(),
                message: err.to_string(),
            };
            collaborators
                .service
                .update_association_status(AssociationStatusUpdate {
                    association_id: assoc.association_id.clone(),
                    name: assoc.name.clone(),
                    instance_id: assoc.instance_id.clone(),
                    status: AssociationStatus::Failed,
                    error_code: AssociationErrorCode::ListAssociationError,
                    timestamp: to_iso8601_utc(Utc::now()),
                    message: wrapped.to_string(),
                });
            out.mark_as_failed(&wrapped);
            return out;
        }
    }

    apply_run_now(&mut associations, &request.association_ids);

    collaborators.schedule.refresh(&mut associations);

    if is_select_all(&request.association_ids) {
        out.append_info("All associations have been requested to execute immediately");
    } else {
        out.append_info(format!(
            "Associations {:?} have been requested to execute immediately",
            request.association_ids
        ));
    }

    collaborators.signal.execute_associations();

    out
}
