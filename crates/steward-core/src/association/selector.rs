//! Run-now selection policy.
//!
//! Given the full set of known associations and the requested ID list from
//! the document, decides which associations get the `run_now` flag. The
//! schedule refresh later rebuilds its due list from exactly these flags, so
//! the policy must leave every association in a definite state.

use crate::association::InstanceAssociation;

/// Returns true when the requested ID list is the "select all" sentinel.
///
/// An empty list, or a list containing exactly one empty string, means the
/// operator asked for every association to run immediately.
pub fn is_select_all(requested_ids: &[String]) -> bool {
    requested_ids.is_empty() || (requested_ids.len() == 1 && requested_ids[0].is_empty())
}

/// Mark associations for immediate execution.
///
/// With the sentinel every association is marked; otherwise `run_now` is set
/// exactly on associations whose ID appears in `requested_ids` (set
/// semantics: order and duplicates are irrelevant). Associations not matched
/// keep `run_now = false`.
pub fn apply_run_now(associations: &mut [InstanceAssociation], requested_ids: &[String]) {
    let select_all = is_select_all(requested_ids);
    for assoc in associations.iter_mut() {
        if select_all {
            assoc.run_now = true;
            continue;
        }
        // IDs are unique, so the first match settles the flag.
        for id in requested_ids {
            if assoc.association_id.as_str() == id {
                assoc.run_now = true;
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_associations(ids: &[&str]) -> Vec<InstanceAssociation> {
        ids.iter()
            .map(|id| InstanceAssociation::new(*id, format!("assoc-{}", id), "i-1234"))
            .collect()
    }

    #[test]
    fn empty_list_selects_all() {
        let mut assocs = make_associations(&["a1", "a2", "a3"]);
        apply_run_now(&mut assocs, &[]);
        assert!(assocs.iter().all(|a| a.run_now));
    }

    #[test]
    fn single_empty_string_selects_all() {
        let mut assocs = make_associations(&["a1", "a2"]);
        apply_run_now(&mut assocs, &[String::new()]);
        assert!(assocs.iter().all(|a| a.run_now));
    }

    #[test]
    fn two_empty_strings_are_not_the_sentinel() {
        let mut assocs = make_associations(&["a1"]);
        apply_run_now(&mut assocs, &[String::new(), String::new()]);
        assert!(!assocs[0].run_now);
    }

    #[test]
    fn explicit_ids_select_exact_matches_only() {
        let mut assocs = make_associations(&["a1", "a2", "a3"]);
        apply_run_now(&mut assocs, &["a1".into(), "a3".into()]);
        assert!(assocs[0].run_now);
        assert!(!assocs[1].run_now);
        assert!(assocs[2].run_now);
    }

    #[test]
    fn matching_is_order_independent() {
        let mut forward = make_associations(&["a1", "a2", "a3"]);
        let mut reverse = make_associations(&["a1", "a2", "a3"]);
        apply_run_now(&mut forward, &["a1".into(), "a3".into()]);
        apply_run_now(&mut reverse, &["a3".into(), "a1".into()]);
        let flags = |assocs: &[InstanceAssociation]| {
            assocs.iter().map(|a| a.run_now).collect::<Vec<_>>()
        };
        assert_eq!(flags(&forward), flags(&reverse));
    }

    #[test]
    fn duplicate_ids_have_no_extra_effect() {
        let mut assocs = make_associations(&["a1", "a2"]);
        apply_run_now(&mut assocs, &["a1".into(), "a1".into(), "a1".into()]);
        assert!(assocs[0].run_now);
        assert!(!assocs[1].run_now);
    }

    #[test]
    fn unknown_ids_select_nothing() {
        let mut assocs = make_associations(&["a1", "a2"]);
        apply_run_now(&mut assocs, &["zzz".into()]);
        assert!(assocs.iter().all(|a| !a.run_now));
    }

    #[test]
    fn selection_is_idempotent() {
        let mut assocs = make_associations(&["a1", "a2"]);
        apply_run_now(&mut assocs, &["a1".into()]);
        apply_run_now(&mut assocs, &["a1".into()]);
        assert!(assocs[0].run_now);
        assert!(!assocs[1].run_now);
    }
}
