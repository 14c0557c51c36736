//! The association refresh plugin.
//!
//! Top-level batch executor: decodes the document's property sets, checks
//! the execution gate between batch elements, delegates each element to the
//! command runner, aggregates the result, and persists it exactly once.

pub mod gate;
pub mod output;
pub mod runner;

pub use gate::{AtomicGate, ExecutionGate};
pub use output::ExecutionOutput;

use crate::association::load_properties_as_list;
use crate::association::service::{AssociationCache, AssociationService, IdentityResolver};
use crate::config::PluginConfig;
use crate::persist::ResultPersister;
use crate::schedule::{ExecutionSignal, ScheduleManager};
use crate::upload::OutputUploader;
use chrono::Utc;
use std::path::PathBuf;
use steward_common::{truncate_output, PluginResult, ResultStatus};
use tracing::info;

/// Plugin name as registered with the agent framework.
pub const PLUGIN_NAME: &str = "steward:refreshAssociation";

/// Cap applied to the aggregate result's stdout copy, no suffix.
const MAX_AGGREGATE_STDOUT: usize = 24_000;

/// Cap applied to the aggregate result's stderr copy, no suffix.
const MAX_AGGREGATE_STDERR: usize = 8_000;

/// External collaborators consumed by the plugin.
///
/// The plugin owns none of this state; the agent host wires real
/// implementations and the table is borrowed for the duration of one
/// `execute` call.
pub struct Collaborators<'a> {
    pub identity: &'a dyn IdentityResolver,
    pub service: &'a dyn AssociationService,
    pub cache: &'a dyn AssociationCache,
    pub schedule: &'a dyn ScheduleManager,
    pub signal: &'a dyn ExecutionSignal,
    pub uploader: &'a dyn OutputUploader,
    pub persister: &'a dyn ResultPersister,
}

/// Per-invocation configuration handed down by the framework.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// Identifier the persisted result is filed under.
    pub plugin_id: String,
    /// Base working directory; empty means "use a temp dir".
    pub orchestration_dir: PathBuf,
    /// Output bucket name; empty disables remote upload.
    pub output_bucket: String,
    /// Key prefix inside the output bucket.
    pub output_prefix: String,
}

/// The refresh plugin executor.
pub struct RefreshPlugin<'a> {
    config: PluginConfig,
    collaborators: Collaborators<'a>,
}

impl<'a> RefreshPlugin<'a> {
    pub fn new(config: PluginConfig, collaborators: Collaborators<'a>) -> Self {
        Self {
            config,
            collaborators,
        }
    }

    /// Run the plugin over the document's `Properties` payload.
    ///
    /// Batch elements run strictly in order, with the gate checked only at
    /// element boundaries: reboot pending stops silently, shutdown fails
    /// the result, cancellation cancels it. The result is persisted exactly
    /// once, at whichever exit is taken.
    ///
    /// The aggregate result carries only the **first** element's output;
    /// later elements are computed for their side effects but not folded
    /// in. This is an inherited single-command result contract, kept for
    /// compatibility with existing document consumers.
    pub fn execute(
        &self,
        context: &ExecutionContext,
        properties: &serde_json::Value,
        gate: &dyn ExecutionGate,
    ) -> PluginResult {
        info!(plugin = PLUGIN_NAME, plugin_id = %context.plugin_id, "plugin started");
        let mut res = PluginResult {
            start_date_time: Some(Utc::now()),
            ..PluginResult::default()
        };

        let batches = load_properties_as_list(properties);
        let mut outputs: Vec<ExecutionOutput> = Vec::with_capacity(batches.len());

        for raw in &batches {
            if gate.is_reboot_pending() {
                info!(
                    plugin = PLUGIN_NAME,
                    "stopping execution due to an external reboot request"
                );
                res.end_date_time = Some(Utc::now());
                self.collaborators.persister.persist(&context.plugin_id, &res);
                return res;
            }

            if gate.is_shutdown_requested() {
                res.exit_code = 1;
                res.status = ResultStatus::Failed;
                res.end_date_time = Some(Utc::now());
                self.collaborators.persister.persist(&context.plugin_id, &res);
                return res;
            }

            if gate.is_cancelled() {
                res.exit_code = 1;
                res.status = ResultStatus::Cancelled;
                res.end_date_time = Some(Utc::now());
                self.collaborators.persister.persist(&context.plugin_id, &res);
                return res;
            }

            outputs.push(runner::run_raw_input(
                &self.config,
                &self.collaborators,
                raw,
                &context.orchestration_dir,
                gate,
                &context.output_bucket,
                &context.output_prefix,
            ));
        }

        if let Some(first) = outputs.first() {
            res.exit_code = first.exit_code;
            res.status = first.status;
            res.output = first.to_string();
            res.standard_output = truncate_output(&first.stdout, "", MAX_AGGREGATE_STDOUT);
            res.standard_error = truncate_output(&first.stderr, "", MAX_AGGREGATE_STDERR);
        }

        res.end_date_time = Some(Utc::now());
        self.collaborators.persister.persist(&context.plugin_id, &res);
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::association::service::{
        RecordingCache, StaticAssociationService, StaticIdentityResolver,
    };
    use crate::association::InstanceAssociation;
    use crate::persist::MemoryPersister;
    use crate::schedule::{CountingSignal, InMemoryScheduleManager};
    use crate::upload::NoopUploader;
    use serde_json::json;
    use tempfile::tempdir;

    struct Harness {
        identity: StaticIdentityResolver,
        service: StaticAssociationService,
        cache: RecordingCache,
        schedule: InMemoryScheduleManager,
        signal: CountingSignal,
        uploader: NoopUploader,
        persister: MemoryPersister,
    }

    impl Harness {
        fn new(ids: &[&str]) -> Self {
            let associations = ids
                .iter()
                .map(|id| InstanceAssociation::new(*id, format!("name-{}", id), "i-1234"))
                .collect();
            Self {
                identity: StaticIdentityResolver::new("i-1234"),
                service: StaticAssociationService::new(associations),
                cache: RecordingCache::default(),
                schedule: InMemoryScheduleManager::default(),
                signal: CountingSignal::default(),
                uploader: NoopUploader,
                persister: MemoryPersister::default(),
            }
        }

        fn plugin(&self) -> RefreshPlugin<'_> {
            RefreshPlugin::new(
                PluginConfig::default(),
                Collaborators {
                    identity: &self.identity,
                    service: &self.service,
                    cache: &self.cache,
                    schedule: &self.schedule,
                    signal: &self.signal,
                    uploader: &self.uploader,
                    persister: &self.persister,
                },
            )
        }
    }

    fn context(dir: &std::path::Path) -> ExecutionContext {
        ExecutionContext {
            plugin_id: "refresh-plugin".into(),
            orchestration_dir: dir.to_path_buf(),
            output_bucket: String::new(),
            output_prefix: String::new(),
        }
    }

    #[test]
    fn single_element_success_becomes_the_result() {
        let harness = Harness::new(&["a1", "a2"]);
        let dir = tempdir().expect("tempdir");

        let res = harness.plugin().execute(
            &context(dir.path()),
            &json!([{"ID": "req-1", "AssociationIds": ["a1"]}]),
            &AtomicGate::new(),
        );

        assert_eq!(res.exit_code, 0);
        assert_eq!(res.status, ResultStatus::Success);
        assert!(res.output.contains("a1"));
        assert!(res.start_date_time.is_some());
        assert!(res.end_date_time.is_some());
        assert_eq!(harness.persister.persist_count(), 1);
    }

    #[test]
    fn aggregate_result_comes_from_first_element_only() {
        let harness = Harness::new(&["a1"]);
        let dir = tempdir().expect("tempdir");

        // First element is fine, second is malformed and fails. Both run,
        // but only the first shapes the aggregate.
        let res = harness.plugin().execute(
            &context(dir.path()),
            &json!([
                {"ID": "req-1", "AssociationIds": [""]},
                {"ID": "req-2", "AssociationIds": 13}
            ]),
            &AtomicGate::new(),
        );

        assert_eq!(res.exit_code, 0);
        assert_eq!(res.status, ResultStatus::Success);
        // Both elements executed: one refresh for the first, none for the
        // malformed second.
        assert_eq!(harness.schedule.refresh_sets().len(), 1);
        assert_eq!(harness.persister.persist_count(), 1);
    }

    #[test]
    fn shutdown_before_any_element_fails_and_persists_once() {
        let harness = Harness::new(&["a1"]);
        let dir = tempdir().expect("tempdir");
        let gate = AtomicGate::new();
        gate.request_shutdown();

        let res = harness.plugin().execute(
            &context(dir.path()),
            &json!([{"ID": "req-1", "AssociationIds": []}]),
            &gate,
        );

        assert_eq!(res.exit_code, 1);
        assert_eq!(res.status, ResultStatus::Failed);
        assert_eq!(harness.persister.persist_count(), 1);
        assert_eq!(harness.signal.fired(), 0);
    }

    #[test]
    fn cancellation_before_any_element_cancels() {
        let harness = Harness::new(&["a1"]);
        let dir = tempdir().expect("tempdir");
        let gate = AtomicGate::new();
        gate.request_cancel();

        let res = harness.plugin().execute(
            &context(dir.path()),
            &json!([{"ID": "req-1", "AssociationIds": []}]),
            &gate,
        );

        assert_eq!(res.exit_code, 1);
        assert_eq!(res.status, ResultStatus::Cancelled);
        assert_eq!(harness.persister.persist_count(), 1);
    }

    #[test]
    fn reboot_pending_stops_silently() {
        let harness = Harness::new(&["a1"]);
        let dir = tempdir().expect("tempdir");
        let gate = AtomicGate::new();
        gate.set_reboot_pending();

        let res = harness.plugin().execute(
            &context(dir.path()),
            &json!([{"ID": "req-1", "AssociationIds": []}]),
            &gate,
        );

        // No failure is marked; the default (in-progress) result stands.
        assert_eq!(res.exit_code, 0);
        assert_eq!(res.status, ResultStatus::InProgress);
        assert_eq!(harness.persister.persist_count(), 1);
        assert_eq!(harness.signal.fired(), 0);
    }

    #[test]
    fn empty_batch_persists_default_result() {
        let harness = Harness::new(&["a1"]);
        let dir = tempdir().expect("tempdir");

        let res = harness
            .plugin()
            .execute(&context(dir.path()), &json!([]), &AtomicGate::new());

        assert_eq!(res.status, ResultStatus::InProgress);
        assert!(res.output.is_empty());
        assert_eq!(harness.persister.persist_count(), 1);
    }

    #[test]
    fn lone_property_object_is_treated_as_one_element() {
        let harness = Harness::new(&["a1"]);
        let dir = tempdir().expect("tempdir");

        let res = harness.plugin().execute(
            &context(dir.path()),
            &json!({"ID": "req-1", "AssociationIds": ["a1"]}),
            &AtomicGate::new(),
        );

        assert_eq!(res.status, ResultStatus::Success);
        assert_eq!(harness.schedule.refresh_sets().len(), 1);
    }
}
