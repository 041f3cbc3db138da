/// Analytics over stored entries
///
/// This module provides the badge engine, which turns aggregate entry
/// statistics into badge grants, and the monthly analyzer, which condenses a
/// month of entries into a `MonthlySummary`.

pub mod badges;
pub mod monthly;

pub use badges::BadgeEngine;
pub use monthly::MonthlyAnalyzer;

/// Count occurrences, most frequent first; ties keep first-appearance order
pub(crate) fn rank_by_frequency<T, I>(items: I) -> Vec<(T, usize)>
where
    T: PartialEq,
    I: IntoIterator<Item = T>,
{
    let mut counts: Vec<(T, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(seen, _)| *seen == item) {
            Some((_, count)) => *count += 1,
            None => counts.push((item, 1)),
        }
    }
    // Stable sort keeps first-appearance order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
