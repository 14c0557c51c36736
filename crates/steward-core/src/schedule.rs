//! Scheduler hand-off seams.
//!
//! The refresh plugin does not own the scheduler; it hands over the annotated
//! association set and fires the execution signal. The scheduler's timer and
//! cron representation live with the agent host.

use crate::association::InstanceAssociation;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use steward_common::{AssociationId, AssociationStatus};

/// Rebuilds the schedule from an annotated association set.
pub trait ScheduleManager {
    /// Replace the scheduler's view of this node's associations.
    ///
    /// The set is handed over `&mut`: the scheduler reads the `run_now`
    /// flags the selector just wrote and may update lifecycle status in
    /// place before returning control.
    fn refresh(&self, associations: &mut [InstanceAssociation]);
}

/// Kicks the scheduler to execute whatever is currently due.
pub trait ExecutionSignal {
    /// Fire-and-forget; the plugin does not wait for triggered associations
    /// to complete.
    fn execute_associations(&self);
}

/// Schedule manager that keeps the due list in memory.
///
/// Backs tests and the local harness; the agent host replaces it with the
/// real cron-backed scheduler.
#[derive(Debug, Default)]
pub struct InMemoryScheduleManager {
    due: Mutex<Vec<AssociationId>>,
    refresh_sets: Mutex<Vec<Vec<AssociationId>>>,
}

impl InMemoryScheduleManager {
    /// Associations currently marked due, in listing order.
    pub fn due_ids(&self) -> Vec<AssociationId> {
        self.due.lock().expect("schedule mutex").clone()
    }

    /// The full association set seen by each refresh call.
    pub fn refresh_sets(&self) -> Vec<Vec<AssociationId>> {
        self.refresh_sets.lock().expect("schedule mutex").clone()
    }
}

impl ScheduleManager for InMemoryScheduleManager {
    fn refresh(&self, associations: &mut [InstanceAssociation]) {
        let mut due = self.due.lock().expect("schedule mutex");
        due.clear();
        for assoc in associations.iter_mut() {
            if assoc.run_now {
                assoc.status = AssociationStatus::InProgress;
                due.push(assoc.association_id.clone());
            }
        }
        self.refresh_sets
            .lock()
            .expect("schedule mutex")
            .push(associations.iter().map(|a| a.association_id.clone()).collect());
    }
}

/// Signal double that counts invocations.
#[derive(Debug, Default)]
pub struct CountingSignal {
    fired: AtomicUsize,
}

impl CountingSignal {
    pub fn fired(&self) -> usize {
        self.fired.load(Ordering::SeqCst)
    }
}

impl ExecutionSignal for CountingSignal {
    fn execute_associations(&self) {
        self.fired.fetch_add(1, Ordering::SeqCst);
    }
}
