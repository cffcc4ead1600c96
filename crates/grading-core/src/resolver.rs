//! GPA resolution: map a numeric score onto a scale table.

use crate::types::ScaleTable;

/// Label returned when no threshold in the table is at or below the score.
pub const NOT_AVAILABLE: &str = "N/A";

impl ScaleTable {
    /// Return the label of the highest threshold `<= score`.
    ///
    /// The table must be sorted by `min` descending. Thresholds are
    /// inclusive lower bounds, so a score equal to a threshold earns that
    /// threshold's label. Returns [`NOT_AVAILABLE`] when the score is below
    /// every threshold or the table is empty.
    pub fn resolve(&self, score: i32) -> &str {
        debug_assert!(
            self.is_sorted_descending(),
            "scale table must be sorted by min descending"
        );

        let entries = self.entries();
        // Entries before the partition point all have min > score.
        let idx = entries.partition_point(|entry| entry.min > score);
        entries
            .get(idx)
            .map(|entry| entry.gpa.as_str())
            .unwrap_or(NOT_AVAILABLE)
    }
}

/// Free-function form of [`ScaleTable::resolve`].
pub fn resolve(score: i32, table: &ScaleTable) -> &str {
    table.resolve(score)
}
