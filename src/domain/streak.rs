/// Streak calculation for diary entries
///
/// A streak is the number of consecutive calendar days with an entry,
/// measured backward from the most recent entry. It feeds the
/// `STREAK_AT_LEAST` badge rule.

use chrono::NaiveDate;

/// Count consecutive days starting from the first (most recent) date
///
/// `sorted_desc` must be ordered newest first. Counting stops at the first
/// gap; a repeated date does not break the run. An empty slice yields 0 and a
/// single date yields 1.
pub fn consecutive_days(sorted_desc: &[NaiveDate]) -> u32 {
    let Some(first) = sorted_desc.first() else {
        return 0;
    };

    let mut streak = 1;
    let mut previous = *first;

    for date in sorted_desc.iter().skip(1) {
        if *date == previous {
            continue;
        }
        match previous.pred_opt() {
            Some(expected) if expected == *date => {
                streak += 1;
                previous = *date;
            }
            _ => break,
        }
    }

    streak
}
