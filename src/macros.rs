/// Evaluates `$expr`, which works through `$bytes` bytes, and returns its value. How long it took
/// and the byte rate go out as a debug event on the timing target.
#[macro_export]
macro_rules! log_rate {
    ($label:literal, $bytes:expr, $expr:expr) => {{
        let start = std::time::Instant::now();
        let ret = $expr;
        let duration = start.elapsed();
        let bytes: u64 = $bytes;
        let bytes_per_sec = match duration.as_secs_f64() {
            secs if secs > 0.0 => bytes as f64 / secs,
            _ => f64::INFINITY,
        };
        tracing::debug!(
            target: "sparseness_probe::timing",
            duration = ?duration,
            bytes,
            bytes_per_sec,
            $label
        );
        ret
    }};
}

#[cfg(test)]
mod tests {
    use test_log::test;

    #[test]
    fn passes_value_through() {
        let mut evaluated = 0;
        let value = crate::log_rate!("counting", 3, {
            evaluated += 1;
            evaluated * 7
        });
        assert_eq!(value, 7);
        assert_eq!(evaluated, 1);
    }
}
