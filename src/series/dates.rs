//! Canonical calendar axis generation.

use chrono::NaiveDate;

/// Generate the ordered sequence of calendar dates for `[start, end]`.
///
/// Inclusive of both endpoints, strictly ascending, one entry per day.
/// `start > end` yields an empty sequence. The examined logic was ambiguous
/// about the starting boundary; this implementation fixes it as inclusive.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }

    let count = (end - start).num_days() as usize + 1;
    let mut out = Vec::with_capacity(count);
    let mut d = start;
    while d <= end {
        out.push(d);
        match d.succ_opt() {
            Some(next) => d = next,
            None => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn inclusive_of_both_endpoints() {
        let range = date_range(ymd(2021, 1, 1), ymd(2021, 1, 5));
        assert_eq!(range.len(), 5);
        assert_eq!(range[0], ymd(2021, 1, 1));
        assert_eq!(range[4], ymd(2021, 1, 5));
    }

    #[test]
    fn length_matches_inclusive_day_count() {
        let start = ymd(2020, 12, 15);
        let end = ymd(2021, 2, 20);
        let range = date_range(start, end);
        assert_eq!(range.len() as i64, (end - start).num_days() + 1);
        assert_eq!(range.first().copied(), Some(start));
        assert_eq!(range.last().copied(), Some(end));
    }

    #[test]
    fn strictly_ascending_one_per_day() {
        let range = date_range(ymd(2021, 2, 26), ymd(2021, 3, 3));
        for pair in range.windows(2) {
            assert_eq!((pair[1] - pair[0]).num_days(), 1);
        }
    }

    #[test]
    fn crosses_month_boundary() {
        let range = date_range(ymd(2021, 1, 30), ymd(2021, 2, 2));
        let expected = vec![
            ymd(2021, 1, 30),
            ymd(2021, 1, 31),
            ymd(2021, 2, 1),
            ymd(2021, 2, 2),
        ];
        assert_eq!(range, expected);
    }

    #[test]
    fn single_day_window() {
        let d = ymd(2021, 7, 4);
        assert_eq!(date_range(d, d), vec![d]);
    }

    #[test]
    fn start_after_end_is_empty() {
        assert!(date_range(ymd(2021, 1, 2), ymd(2021, 1, 1)).is_empty());
    }
}
