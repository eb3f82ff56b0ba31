//! Maps `Box<dyn Error>` from the bus trait boundary to a typed `ArmError`.
//!
//! The traits in `robo_traits` use `Box<dyn Error + Send + Sync>` for maximum
//! flexibility; this module converts those to our typed error enum, with an
//! optional feature-gated path for `robo_hardware::HwError` downcasting.

use crate::error::ArmError;

/// Map a trait-boundary error to a typed `ArmError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_bus_error(e: &(dyn std::error::Error + 'static)) -> ArmError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<robo_hardware::error::HwError>() {
            return match hw {
                robo_hardware::error::HwError::Timeout => ArmError::Timeout,
                other => ArmError::Bus(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        ArmError::Timeout
    } else {
        ArmError::Bus(s)
    }
}

#[cfg(test)]
mod tests {
    use super::map_bus_error;
    use crate::error::ArmError;

    #[test]
    fn string_timeouts_map_to_timeout() {
        let e: Box<dyn std::error::Error + Send + Sync> = "servo 3 read Timeout".into();
        assert_eq!(map_bus_error(&*e), ArmError::Timeout);
    }

    #[test]
    fn other_strings_map_to_bus() {
        let e: Box<dyn std::error::Error + Send + Sync> = "checksum mismatch".into();
        assert_eq!(map_bus_error(&*e), ArmError::Bus("checksum mismatch".into()));
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn hw_errors_are_downcast() {
        use robo_hardware::error::HwError;
        let e: Box<dyn std::error::Error + Send + Sync> = Box::new(HwError::Timeout);
        assert_eq!(map_bus_error(&*e), ArmError::Timeout);
        let e: Box<dyn std::error::Error + Send + Sync> = Box::new(HwError::NoSuchChannel(9));
        assert!(matches!(map_bus_error(&*e), ArmError::Bus(_)));
    }
}
