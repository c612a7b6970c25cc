const UNITS: [(u64, &str); 4] = [
    (86_400, "day"),
    (3_600, "hour"),
    (60, "minute"),
    (1, "second"),
];

/// Renders seconds as whole days, hours, minutes and seconds, e.g.
/// `1 day 2 hours 5 seconds`. Zero units are left out; a duration under one
/// second renders as `0 seconds`.
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 1.0 {
        return "0 seconds".to_string();
    }

    let mut remaining = seconds.floor() as u64;
    let mut parts = Vec::with_capacity(UNITS.len());
    for (size, label) in UNITS {
        let value = remaining / size;
        remaining %= size;
        if value > 0 {
            let plural = if value == 1 { "" } else { "s" };
            parts.push(format!("{value} {label}{plural}"));
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::format_duration;

    #[test]
    fn zero_and_sub_second_render_zero_seconds() {
        assert_eq!(format_duration(0.0), "0 seconds");
        assert_eq!(format_duration(0.99), "0 seconds");
        assert_eq!(format_duration(-3.0), "0 seconds");
        assert_eq!(format_duration(f64::NAN), "0 seconds");
    }

    #[test]
    fn omits_zero_units_and_truncates_fractions() {
        assert_eq!(format_duration(300.0), "5 minutes");
        assert_eq!(format_duration(3_661.7), "1 hour 1 minute 1 second");
        assert_eq!(format_duration(86_400.0 + 7_200.0 + 5.0), "1 day 2 hours 5 seconds");
        assert_eq!(format_duration(172_800.0), "2 days");
    }
}
