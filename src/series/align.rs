//! Multi-source alignment with gap-filling.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::{CombinedRecord, NationalRecord, RegionalRecord};

/// Merge both normalized feeds onto the canonical date axis.
///
/// For each date in `range`, the first source record carrying that date is
/// selected; later duplicates are silently dropped (declared policy, not an
/// accident). Dates with no record in a source get `None` for that source,
/// so the output always has exactly one record per input date, in input
/// order, regardless of source coverage.
pub fn align(
    range: &[NaiveDate],
    national: &[NationalRecord],
    regional: &[RegionalRecord],
) -> Vec<CombinedRecord> {
    // Index each source by date up front. `or_insert`-style first-wins keeps
    // the observable behavior identical to a linear first-match scan.
    let national_by_date = index_first_by_date(national, |r| r.date);
    let regional_by_date = index_first_by_date(regional, |r| r.date);

    range
        .iter()
        .map(|&date| CombinedRecord {
            date,
            national: national_by_date.get(&date).map(|&r| r.clone()),
            regional: regional_by_date.get(&date).map(|&r| r.clone()),
        })
        .collect()
}

fn index_first_by_date<T, F>(records: &[T], date_of: F) -> HashMap<NaiveDate, &T>
where
    F: Fn(&T) -> NaiveDate,
{
    let mut map = HashMap::with_capacity(records.len());
    for record in records {
        map.entry(date_of(record)).or_insert(record);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::date_range;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn national(date: NaiveDate, new_confirmed: i64) -> NationalRecord {
        NationalRecord {
            date,
            new_confirmed,
            new_deaths: None,
            confirmed: None,
            deaths: None,
        }
    }

    fn regional(date: NaiveDate, new_cases: f64) -> RegionalRecord {
        RegionalRecord {
            date,
            new_cases: Some(new_cases),
            ..RegionalRecord::default()
        }
    }

    #[test]
    fn output_dates_equal_input_range_exactly() {
        let range = date_range(ymd(2021, 1, 1), ymd(2021, 1, 10));
        let national = vec![national(ymd(2021, 1, 3), 100)];
        let regional = vec![regional(ymd(2021, 1, 7), 20.0)];

        let combined = align(&range, &national, &regional);

        let dates: Vec<NaiveDate> = combined.iter().map(|r| r.date).collect();
        assert_eq!(dates, range);
    }

    #[test]
    fn gaps_hold_absent_records_not_faults() {
        // Regional feed covers days 1, 3, 5 of a 5-day range.
        let range = date_range(ymd(2021, 1, 1), ymd(2021, 1, 5));
        let regional = vec![
            regional(ymd(2021, 1, 1), 5.0),
            regional(ymd(2021, 1, 3), 7.0),
            regional(ymd(2021, 1, 5), 9.0),
        ];

        let combined = align(&range, &[], &regional);

        assert_eq!(combined.len(), 5);
        assert_eq!(combined[0].regional_new_cases(), Some(5.0));
        assert_eq!(combined[1].regional_new_cases(), None);
        assert_eq!(combined[2].regional_new_cases(), Some(7.0));
        assert_eq!(combined[3].regional_new_cases(), None);
        assert_eq!(combined[4].regional_new_cases(), Some(9.0));
    }

    #[test]
    fn duplicate_source_dates_first_wins() {
        let range = vec![ymd(2021, 1, 1)];
        let regional = vec![regional(ymd(2021, 1, 1), 5.0), regional(ymd(2021, 1, 1), 9.0)];

        // Deterministic across repeated runs.
        for _ in 0..3 {
            let combined = align(&range, &[], &regional);
            assert_eq!(combined.len(), 1);
            assert_eq!(combined[0].regional_new_cases(), Some(5.0));
        }
    }

    #[test]
    fn both_sources_land_on_the_same_date() {
        let range = vec![ymd(2021, 1, 2)];
        let combined = align(
            &range,
            &[national(ymd(2021, 1, 2), 1234)],
            &[regional(ymd(2021, 1, 2), 56.0)],
        );

        assert_eq!(combined[0].national_new_confirmed(), Some(1234.0));
        assert_eq!(combined[0].regional_new_cases(), Some(56.0));
    }

    #[test]
    fn empty_range_yields_empty_output() {
        let combined = align(&[], &[national(ymd(2021, 1, 1), 1)], &[]);
        assert!(combined.is_empty());
    }

    #[test]
    fn source_records_outside_the_range_are_ignored() {
        let range = date_range(ymd(2021, 6, 1), ymd(2021, 6, 3));
        let national = vec![national(ymd(2021, 5, 31), 10), national(ymd(2021, 6, 4), 20)];

        let combined = align(&range, &national, &[]);
        assert!(combined.iter().all(|r| r.national.is_none()));
    }
}
