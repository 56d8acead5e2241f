//! Reconciler - Watermark diff between source and applied state
//!
//! The pending set is computed against a watermark, not by set
//! difference: "has the migration with the greatest identity been
//! applied" stands in for "has everything before it been applied". This
//! assumes migrations run strictly in ascending identity order with a
//! single writer. A file whose identity is below the current watermark
//! but was never applied (a retroactively added or backfilled file) is
//! skipped forever. That is the documented behavior of this strategy;
//! replacing it with a set difference would change semantics for
//! backfilled migrations and must not be done silently.

use super::definitions::MigrationRecord;

/// Source migrations that have not yet been applied, per the watermark
/// strategy: all of `source` when `applied` is empty, otherwise the
/// elements of `source` with identity strictly greater than the largest
/// applied identity.
pub fn pending_after_watermark(
    source: &[MigrationRecord],
    applied: &[MigrationRecord],
) -> Vec<MigrationRecord> {
    let Some(watermark) = applied.iter().map(|m| m.id).max() else {
        return source.to_vec();
    };
    source.iter().filter(|m| m.id > watermark).cloned().collect()
}

/// Revert ordering: everything applied, most recent identity first.
/// No watermark is involved — applied records are all pending for
/// revert by definition.
pub fn newest_first(mut applied: Vec<MigrationRecord>) -> Vec<MigrationRecord> {
    applied.sort_by(|a, b| b.id.cmp(&a.id));
    applied
}

/// Truncate a work list to at most `step` entries. Non-positive `step`
/// (canonically -1) means no limit.
pub fn limit_steps(mut list: Vec<MigrationRecord>, step: i32) -> Vec<MigrationRecord> {
    if step > 0 && (step as usize) < list.len() {
        list.truncate(step as usize);
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(ids: &[i64]) -> Vec<MigrationRecord> {
        ids.iter()
            .map(|&id| MigrationRecord::new(id, format!("m{}", id)))
            .collect()
    }

    #[test]
    fn empty_applied_means_everything_pending() {
        let source = records(&[1000, 2000, 3000]);
        assert_eq!(pending_after_watermark(&source, &[]), source);
    }

    #[test]
    fn pending_is_strictly_above_watermark() {
        let source = records(&[1000, 2000, 3000]);
        let applied = records(&[1000, 2000]);
        assert_eq!(
            pending_after_watermark(&source, &applied),
            records(&[3000])
        );
    }

    #[test]
    fn watermark_is_max_not_last_element() {
        let source = records(&[1000, 2000, 3000]);
        // Unsorted applied list: the watermark is still 2000.
        let applied = records(&[2000, 1000]);
        assert_eq!(
            pending_after_watermark(&source, &applied),
            records(&[3000])
        );
    }

    #[test]
    fn pre_watermark_files_are_skipped() {
        // 500 was never applied but sits below the watermark of 1000.
        // The watermark strategy skips it forever.
        let source = records(&[500, 1000, 2000]);
        let applied = records(&[1000]);
        assert_eq!(
            pending_after_watermark(&source, &applied),
            records(&[2000])
        );
    }

    #[test]
    fn everything_applied_means_nothing_pending() {
        let source = records(&[1000, 2000]);
        let applied = records(&[1000, 2000]);
        assert!(pending_after_watermark(&source, &applied).is_empty());
    }

    #[test]
    fn newest_first_sorts_descending() {
        let applied = records(&[1000, 3000, 2000]);
        assert_eq!(newest_first(applied), records(&[3000, 2000, 1000]));
    }

    #[test]
    fn step_limit_truncates_in_order() {
        let pending = records(&[1000, 2000, 3000, 4000, 5000]);
        assert_eq!(limit_steps(pending.clone(), 2), records(&[1000, 2000]));
        assert_eq!(limit_steps(pending.clone(), -1), pending);
        assert_eq!(limit_steps(pending.clone(), 0), pending);
        assert_eq!(limit_steps(pending.clone(), 10), pending);
    }
}
