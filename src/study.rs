use std::collections::HashSet;

use crate::store::data::{StudyEntry, StudyKind};

/// Which study kinds already have an entry on `day`. Checking a kind off
/// inserts an entry, unchecking deletes the day's entries for it; either way
/// the authoritative set is this, re-derived from a fresh read.
pub fn completed_on(entries: &[StudyEntry], day: time::Date) -> HashSet<StudyKind> {
    entries
        .iter()
        .filter(|entry| entry.completed_at.date() == day)
        .map(|entry| entry.study_kind)
        .collect()
}

/// UTC range covering one calendar day, for the store's day-scoped filters.
pub fn day_bounds(day: time::Date) -> (time::OffsetDateTime, time::OffsetDateTime) {
    let start = day.midnight().assume_utc();
    let end = start + time::Duration::days(1) - time::Duration::nanoseconds(1);
    (start, end)
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::*;

    fn entry(kind: StudyKind, at: time::OffsetDateTime) -> StudyEntry {
        StudyEntry {
            study_kind: kind,
            completed_at: at,
        }
    }

    #[test]
    fn other_days_do_not_count() {
        let entries = [
            entry(StudyKind::Theory, datetime!(2024-03-01 08:00 UTC)),
            entry(StudyKind::Live, datetime!(2024-02-29 23:59 UTC)),
            entry(StudyKind::Theory, datetime!(2024-03-02 00:00 UTC)),
        ];

        let done = completed_on(&entries, date!(2024 - 03 - 01));
        assert_eq!(done, HashSet::from([StudyKind::Theory]));
    }

    #[test]
    fn duplicate_entries_collapse() {
        let entries = [
            entry(StudyKind::Hymns, datetime!(2024-03-01 08:00 UTC)),
            entry(StudyKind::Hymns, datetime!(2024-03-01 09:00 UTC)),
        ];

        let done = completed_on(&entries, date!(2024 - 03 - 01));
        assert_eq!(done.len(), 1);
    }

    #[test]
    fn day_bounds_cover_the_whole_day() {
        let (start, end) = day_bounds(date!(2024 - 03 - 01));
        assert_eq!(start, datetime!(2024-03-01 00:00 UTC));
        assert!(end < datetime!(2024-03-02 00:00 UTC));
        assert!(end > datetime!(2024-03-01 23:59:59 UTC));
    }
}
