//! Fixed scoring thresholds.

/// Check-ins scoring below this are flagged for lecturer review.
pub const ANOMALY_THRESHOLD: f64 = 0.8;

/// A running attendance rate below this alerts the lecturer.
pub const LOW_ATTENDANCE_THRESHOLD: f64 = 0.70;

/// Score assigned to methods that do not go through the verifier.
pub const FULL_CONFIDENCE: f64 = 1.0;

pub fn is_anomalous(confidence: f64) -> bool {
    confidence < ANOMALY_THRESHOLD
}

/// `attended / total_students`, or `None` when there are no students.
pub fn attendance_rate(attended: i64, total_students: i64) -> Option<f64> {
    if total_students <= 0 {
        return None;
    }
    Some(attended as f64 / total_students as f64)
}

pub fn is_low_attendance(rate: f64) -> bool {
    rate < LOW_ATTENDANCE_THRESHOLD
}

pub fn is_valid_confidence(confidence: f64) -> bool {
    (0.0..=1.0).contains(&confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anomaly_boundary() {
        assert!(is_anomalous(0.79));
        assert!(is_anomalous(0.55));
        assert!(!is_anomalous(0.8));
        assert!(!is_anomalous(FULL_CONFIDENCE));
    }

    #[test]
    fn test_low_attendance_boundary() {
        assert!(is_low_attendance(attendance_rate(6, 10).unwrap()));
        assert!(!is_low_attendance(attendance_rate(7, 10).unwrap()));
        assert_eq!(attendance_rate(3, 0), None);
    }

    #[test]
    fn test_confidence_range() {
        assert!(is_valid_confidence(0.0));
        assert!(is_valid_confidence(1.0));
        assert!(!is_valid_confidence(1.01));
        assert!(!is_valid_confidence(-0.1));
        assert!(!is_valid_confidence(f64::NAN));
    }
}
