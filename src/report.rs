//! Plain-text rendering of path statistics.

use crate::kinematics::Path;

const MS_TO_KMH: f64 = 3.6;

/// Render the multi-line summary shown alongside a loaded track.
///
/// Distance switches to kilometers above 10 000 m; speeds are reported in
/// km/h from the stored m/s values; total time is truncated whole seconds.
pub fn summary(path: &Path) -> String {
    let distance = if path.total_distance_m > 10_000.0 {
        format!("Distance - total: {:.2} km", path.total_distance_m / 1000.0)
    } else {
        format!("Distance - total: {:.2} m", path.total_distance_m)
    };

    [
        distance,
        format!("Time - total: {} hr:mins:secs", format_hms(path.total_time_s)),
        format!("Speed - overall: {:.2} km/h", path.average_speed * MS_TO_KMH),
        format!("Speed - maximum: {:.2} km/h", path.max_speed * MS_TO_KMH),
    ]
    .join("\n")
}

/// `H:MM:SS` with an unpadded hour field and truncated whole seconds.
fn format_hms(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as i64
    } else {
        0
    };
    format!(
        "{}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(total_distance_m: f64, total_time_s: f64, avg: f64, max: f64) -> Path {
        Path {
            total_distance_m,
            total_time_s,
            average_speed: avg,
            max_speed: max,
        }
    }

    #[test]
    fn test_distance_switches_to_km_above_10000_m() {
        let text = summary(&path(15_000.0, 3600.0, 1.0, 2.0));
        assert!(text.contains("Distance - total: 15.00 km"), "{text}");
    }

    #[test]
    fn test_distance_stays_in_meters_at_or_below_10000_m() {
        let text = summary(&path(9_000.0, 3600.0, 1.0, 2.0));
        assert!(text.contains("Distance - total: 9000.00 m"), "{text}");
    }

    #[test]
    fn test_speeds_render_in_kmh() {
        // 2.5 m/s average and 10 m/s maximum.
        let text = summary(&path(9_000.0, 3600.0, 2.5, 10.0));
        assert!(text.contains("Speed - overall: 9.00 km/h"), "{text}");
        assert!(text.contains("Speed - maximum: 36.00 km/h"), "{text}");
    }

    #[test]
    fn test_time_formats_as_hms() {
        assert_eq!(format_hms(3661.0), "1:01:01");
        assert_eq!(format_hms(59.0), "0:00:59");
        assert_eq!(format_hms(59.9), "0:00:59");
        assert_eq!(format_hms(36_000.0), "10:00:00");
        assert_eq!(format_hms(0.0), "0:00:00");
        assert_eq!(format_hms(f64::NAN), "0:00:00");
    }

    #[test]
    fn test_full_report_layout() {
        let text = summary(&path(3000.0, 10_800.0, 3000.0 / 10_800.0, 1000.0 / 3600.0));
        assert_eq!(
            text,
            "Distance - total: 3000.00 m\n\
             Time - total: 3:00:00 hr:mins:secs\n\
             Speed - overall: 1.00 km/h\n\
             Speed - maximum: 1.00 km/h"
        );
    }
}
