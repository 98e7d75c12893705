// ── `adb devices` output parsing ──

/// States that do not count as a usable connection.
const UNUSABLE_STATES: &[&str] = &["offline", "unauthorized"];

/// Count connected devices in `adb devices` output.
///
/// Skips the `List of devices attached` header, daemon notices (`* ...`),
/// blank lines, and entries whose state is offline or unauthorized.
pub fn count_connected(output: &str) -> usize {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("List of devices") && !line.starts_with('*'))
        .filter(|line| {
            let mut fields = line.split_whitespace();
            let _serial = fields.next();
            fields
                .next()
                .is_some_and(|state| !UNUSABLE_STATES.contains(&state))
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_ready_devices() {
        let output = "List of devices attached\n\
                      emulator-5554\tdevice\n\
                      192.168.1.20:5555\tdevice\n\n";
        assert_eq!(count_connected(output), 2);
    }

    #[test]
    fn excludes_offline_and_unauthorized() {
        let output = "List of devices attached\n\
                      R58M1234\tunauthorized\n\
                      localhost:58526\toffline\n\
                      10.0.0.5:5555\tdevice\n";
        assert_eq!(count_connected(output), 1);
    }

    #[test]
    fn ignores_daemon_notices() {
        let output = "* daemon not running; starting now at tcp:5037\n\
                      * daemon started successfully\n\
                      List of devices attached\n";
        assert_eq!(count_connected(output), 0);
    }

    #[test]
    fn empty_output_is_zero() {
        assert_eq!(count_connected(""), 0);
    }
}
