//! Physical formula library shared by the node catalogue.

use crate::error::{NodeError, NodeResult};
use fn_core::numeric::{Real, ensure_finite};

/// Specific heat used by [`delta_temperature`] when none is given (kJ/(kg·K), water).
pub const SPECIFIC_HEAT_WATER: Real = 4.18;

/// Fixed ambient temperature that passive losses pull toward.
pub const AMBIENT_TEMPERATURE: Real = 20.0;

/// Default exposed surface area for [`heat_loss`].
pub const DEFAULT_SURFACE_AREA: Real = 100.0;

/// Default conductivity for [`heat_loss`].
pub const DEFAULT_CONDUCTIVITY: Real = 0.0005;

/// Ensure a value is finite, returning NodeError if not.
pub fn check_finite(value: Real, what: &'static str) -> NodeResult<Real> {
    ensure_finite(value, what).map_err(|_| NodeError::NonFinite { what, value })
}

/// Temperature rise from adding `power` to a stream moving at `rate`.
///
/// `dT = (power / specific_heat) / rate`
pub fn delta_temperature_with(power: Real, rate: Real, specific_heat: Real) -> NodeResult<Real> {
    if rate == 0.0 {
        return Err(NodeError::DivideByZero {
            what: "delta_temperature rate",
        });
    }
    if specific_heat == 0.0 {
        return Err(NodeError::DivideByZero {
            what: "delta_temperature specific heat",
        });
    }
    check_finite((power / specific_heat) / rate, "delta_temperature")
}

/// [`delta_temperature_with`] using water's specific heat.
pub fn delta_temperature(power: Real, rate: Real) -> NodeResult<Real> {
    delta_temperature_with(power, rate, SPECIFIC_HEAT_WATER)
}

/// Passive loss toward [`AMBIENT_TEMPERATURE`].
///
/// `loss = surface_area * conductivity * (temperature - 20)`
pub fn heat_loss_with(temperature: Real, surface_area: Real, conductivity: Real) -> Real {
    surface_area * conductivity * (temperature - AMBIENT_TEMPERATURE)
}

/// [`heat_loss_with`] using the default surface area and conductivity.
pub fn heat_loss(temperature: Real) -> Real {
    heat_loss_with(temperature, DEFAULT_SURFACE_AREA, DEFAULT_CONDUCTIVITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn delta_temperature_reference_value() {
        let dt = delta_temperature(100.0, 1.0).unwrap();
        assert!((dt - 23.923444976076556).abs() < 1e-12);
    }

    #[test]
    fn delta_temperature_zero_rate_is_error() {
        assert_eq!(
            delta_temperature(100.0, 0.0),
            Err(NodeError::DivideByZero {
                what: "delta_temperature rate"
            })
        );
    }

    #[test]
    fn heat_loss_reference_value() {
        assert!((heat_loss(100.0) - 4.0).abs() < 1e-12);
        assert_eq!(heat_loss(AMBIENT_TEMPERATURE), 0.0);
        assert!(heat_loss(0.0) < 0.0);
    }

    #[test]
    fn test_check_finite() {
        assert!(check_finite(1.0, "test").is_ok());
        assert!(check_finite(f64::INFINITY, "test").is_err());
        assert!(check_finite(f64::NAN, "test").is_err());
    }

    proptest! {
        #[test]
        fn delta_temperature_linear_in_power(p in -1e4..1e4f64, k in -10.0..10.0f64, r in 0.01..100.0f64) {
            let base = delta_temperature(p, r).unwrap();
            let scaled = delta_temperature(k * p, r).unwrap();
            prop_assert!((scaled - k * base).abs() <= 1e-9 * (1.0 + scaled.abs()));
        }

        #[test]
        fn delta_temperature_decreases_with_rate(p in 0.1..1e4f64, r1 in 0.01..100.0f64, extra in 0.01..100.0f64) {
            let r2 = r1 + extra;
            prop_assert!(delta_temperature(p, r1).unwrap() > delta_temperature(p, r2).unwrap());
        }
    }
}
