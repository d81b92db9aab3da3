/// Percentage of typed characters that match the passage, rounded.
///
/// Defined as 100 before anything has been typed.
pub fn accuracy(correct_count: usize, typed_len: usize) -> u32 {
    if typed_len == 0 {
        return 100;
    }
    ((correct_count as f64 / typed_len as f64) * 100.0).round() as u32
}

/// Words per minute over `elapsed_ms`.
///
/// Words are counted by splitting on single spaces, so an empty input is one
/// (empty) word. Zero elapsed time yields 0.
pub fn wpm(elapsed_ms: u64, typed: &str) -> u32 {
    let word_count = typed.split(' ').count();
    let minutes = elapsed_ms as f64 / 60_000.0;
    if minutes > 0.0 {
        (word_count as f64 / minutes).round() as u32
    } else {
        0
    }
}

/// Elapsed seconds rounded to one decimal place.
pub fn elapsed_seconds(elapsed_ms: u64) -> f64 {
    (elapsed_ms as f64 / 100.0).round() / 10.0
}

/// Whole seconds left on a countdown, rounded up.
pub fn remaining_seconds(duration_secs: u64, elapsed_ms: u64) -> u64 {
    let remaining_ms = duration_secs.saturating_mul(1000).saturating_sub(elapsed_ms);
    remaining_ms.div_ceil(1000)
}
