const GRADE_SCALE: [f64; 11] = [
    0.93, 0.90, 0.87, 0.83, 0.80, 0.77, 0.73, 0.70, 0.67, 0.63, 0.60,
];
const LETTER_GRADE: [&str; 12] = [
    "A", "A-", "B+", "B", "B-", "C+", "C", "C-", "D+", "D", "D-", "F",
];

/// Maps an uptime fraction (0.0..=1.0) to a school-style letter grade.
///
/// A negative fraction means the backend has no completed builds to grade
/// yet, so no letter is returned.
pub fn letter_grade(uptime: f64) -> Option<&'static str> {
    if uptime < 0.0 || uptime.is_nan() {
        return None;
    }

    let index = GRADE_SCALE
        .iter()
        .position(|&threshold| uptime >= threshold)
        .unwrap_or(LETTER_GRADE.len() - 1);

    Some(LETTER_GRADE[index])
}
