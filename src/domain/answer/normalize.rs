/// Canonical form of a question used as the exact-cache key component
///
/// Lower-cases, collapses whitespace runs to one space and drops any run of
/// trailing `?`, `!` or `.` (with interleaved whitespace). Idempotent.
pub fn normalize_question(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");

    collapsed
        .trim_end_matches(|c: char| matches!(c, '?' | '!' | '.') || c.is_whitespace())
        .to_string()
}
