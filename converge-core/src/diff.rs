//! Symmetric-difference engine for diffable collections.
//!
//! A [`DiffResult`] splits the symmetric difference of prior vs desired into
//! the elements to remove (present only in prior) and the elements to add
//! (present only in desired). Computed by set identity, never by position,
//! so the result is deterministic regardless of input ordering.

use std::collections::BTreeSet;

use crate::types::{RoleArn, Tag};

/// Outcome of diffing a prior collection against a desired one.
///
/// Invariant: `to_remove` and `to_add` are disjoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResult<T> {
    /// Elements present in prior but absent from desired.
    pub to_remove: BTreeSet<T>,
    /// Elements present in desired but absent from prior.
    pub to_add: BTreeSet<T>,
}

impl<T> DiffResult<T> {
    /// True when prior and desired were set-equal — the corresponding sync
    /// step must issue no remote call at all.
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }
}

/// Compute the symmetric difference of two collections by set identity.
pub fn diff<T: Ord + Clone>(prior: &[T], desired: &[T]) -> DiffResult<T> {
    let prior: BTreeSet<T> = prior.iter().cloned().collect();
    let desired: BTreeSet<T> = desired.iter().cloned().collect();
    DiffResult {
        to_remove: prior.difference(&desired).cloned().collect(),
        to_add: desired.difference(&prior).cloned().collect(),
    }
}

/// Tag diff — keyed equality on key+value, so a value change appears as
/// remove-old plus add-new for the same key.
pub fn tag_diff(prior: &[Tag], desired: &[Tag]) -> DiffResult<Tag> {
    diff(prior, desired)
}

/// Role-attachment diff — keyed equality on the full identifier string.
pub fn role_diff(prior: &[RoleArn], desired: &[RoleArn]) -> DiffResult<RoleArn> {
    diff(prior, desired)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> Vec<Tag> {
        pairs.iter().map(|(k, v)| Tag::new(*k, *v)).collect()
    }

    #[test]
    fn equal_sets_yield_empty_diff() {
        let prior = tags(&[("env", "prod"), ("team", "data")]);
        let desired = tags(&[("team", "data"), ("env", "prod")]);
        let result = tag_diff(&prior, &desired);
        assert!(result.is_empty());
    }

    #[test]
    fn value_change_is_remove_plus_add() {
        let prior = tags(&[("env", "staging")]);
        let desired = tags(&[("env", "prod")]);
        let result = tag_diff(&prior, &desired);
        assert_eq!(result.to_remove, [Tag::new("env", "staging")].into());
        assert_eq!(result.to_add, [Tag::new("env", "prod")].into());
    }

    #[rstest]
    #[case(&[], &[])]
    #[case(&[("a", "1")], &[("a", "1"), ("b", "2")])]
    #[case(&[("a", "1"), ("b", "2")], &[("b", "3")])]
    #[case(&[("x", "1"), ("y", "1")], &[("y", "2"), ("x", "1"), ("z", "9")])]
    fn diff_sets_are_always_disjoint(
        #[case] prior: &[(&str, &str)],
        #[case] desired: &[(&str, &str)],
    ) {
        let result = tag_diff(&tags(prior), &tags(desired));
        assert!(
            result.to_remove.is_disjoint(&result.to_add),
            "overlap between {:?} and {:?}",
            result.to_remove,
            result.to_add,
        );
    }

    #[test]
    fn diff_ignores_input_ordering_and_duplicates() {
        let prior = tags(&[("b", "2"), ("a", "1"), ("a", "1")]);
        let shuffled = tags(&[("a", "1"), ("b", "2")]);
        assert_eq!(tag_diff(&prior, &shuffled), tag_diff(&shuffled, &prior));
        assert!(tag_diff(&prior, &shuffled).is_empty());
    }

    #[test]
    fn role_diff_uses_full_string_identity() {
        let prior = vec![RoleArn::from("arn:aws:iam::123:role/etl")];
        let desired = vec![
            RoleArn::from("arn:aws:iam::123:role/etl-v2"),
            RoleArn::from("arn:aws:iam::123:role/etl"),
        ];
        let result = role_diff(&prior, &desired);
        assert!(result.to_remove.is_empty());
        assert_eq!(
            result.to_add,
            [RoleArn::from("arn:aws:iam::123:role/etl-v2")].into()
        );
    }
}
