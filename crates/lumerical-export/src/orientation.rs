//! Port orientation to simulation port injection
//!
//! Simulation ports launch a wave normal to the waveguide they sample. The
//! FDTD mesh is axis aligned, so each port orientation is snapped to the
//! nearest cardinal direction using 90° bins centred on 0, 90, 180 and 270.
//! Bins are half open: an angle exactly on 45, 135, 225 or 315 belongs to the
//! bin that starts there.

use std::fmt;

use pic_layout::geometry::wrap_angle;
use pic_layout::Port;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionAxis {
    X,
    Y,
}

impl fmt::Display for InjectionAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjectionAxis::X => f.write_str("x-axis"),
            InjectionAxis::Y => f.write_str("y-axis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => f.write_str("Forward"),
            Direction::Backward => f.write_str("Backward"),
        }
    }
}

/// How a simulation port is set up: injection axis and sense, and its
/// transverse span along x and y (m).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortInjection {
    pub axis: InjectionAxis,
    pub direction: Direction,
    pub dx: f64,
    pub dy: f64,
}

/// Classify an orientation in degrees. `None` if the angle is not finite.
pub fn classify(angle: f64, port_width: f64) -> Option<PortInjection> {
    if !angle.is_finite() {
        return None;
    }
    let deg = wrap_angle(angle);

    let (axis, direction) = if deg < 45.0 || deg >= 315.0 {
        (InjectionAxis::X, Direction::Backward)
    } else if deg < 135.0 {
        (InjectionAxis::Y, Direction::Backward)
    } else if deg < 225.0 {
        (InjectionAxis::X, Direction::Forward)
    } else {
        (InjectionAxis::Y, Direction::Forward)
    };

    let (dx, dy) = match axis {
        InjectionAxis::X => (0.0, port_width),
        InjectionAxis::Y => (port_width, 0.0),
    };

    Some(PortInjection {
        axis,
        direction,
        dx,
        dy,
    })
}

/// Classify `port`, failing with the port name and angle if it has none.
pub fn port_injection(port: &Port, port_width: f64) -> Result<PortInjection, ConfigError> {
    classify(port.orientation, port_width).ok_or_else(|| ConfigError::InvalidOrientation {
        port: port.name.clone(),
        orientation: port.orientation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const W: f64 = 3e-6;

    fn expect(axis: InjectionAxis, direction: Direction) -> PortInjection {
        let (dx, dy) = match axis {
            InjectionAxis::X => (0.0, W),
            InjectionAxis::Y => (W, 0.0),
        };
        PortInjection {
            axis,
            direction,
            dx,
            dy,
        }
    }

    #[test]
    fn test_concrete_angles() {
        assert_eq!(classify(10.0, W), Some(expect(InjectionAxis::X, Direction::Backward)));
        assert_eq!(classify(100.0, W), Some(expect(InjectionAxis::Y, Direction::Backward)));
        assert_eq!(classify(190.0, W), Some(expect(InjectionAxis::X, Direction::Forward)));
        assert_eq!(classify(280.0, W), Some(expect(InjectionAxis::Y, Direction::Forward)));
        assert_eq!(classify(350.0, W), classify(10.0, W));
    }

    #[test]
    fn test_concrete_spans() {
        let east = classify(10.0, W).unwrap();
        assert_eq!((east.dx, east.dy), (0.0, W));
        let north = classify(100.0, W).unwrap();
        assert_eq!((north.dx, north.dy), (W, 0.0));
    }

    #[test]
    fn test_cardinal_centres() {
        assert_eq!(classify(0.0, W), Some(expect(InjectionAxis::X, Direction::Backward)));
        assert_eq!(classify(90.0, W), Some(expect(InjectionAxis::Y, Direction::Backward)));
        assert_eq!(classify(180.0, W), Some(expect(InjectionAxis::X, Direction::Forward)));
        assert_eq!(classify(270.0, W), Some(expect(InjectionAxis::Y, Direction::Forward)));
        assert_eq!(classify(360.0, W), classify(0.0, W));
    }

    #[test]
    fn test_bin_boundaries() {
        let eps = 1e-9;
        for boundary in [45.0, 135.0, 225.0, 315.0] {
            let below = classify(boundary - eps, W).unwrap();
            let at = classify(boundary, W).unwrap();
            assert_ne!(below, at, "no change at {boundary}");
            assert_eq!(classify(boundary + eps, W), Some(at));
        }
        assert_eq!(classify(45.0, W), Some(expect(InjectionAxis::Y, Direction::Backward)));
        assert_eq!(classify(315.0, W), Some(expect(InjectionAxis::X, Direction::Backward)));
        assert_eq!(
            classify(315.0 - eps, W),
            Some(expect(InjectionAxis::Y, Direction::Forward))
        );
    }

    #[test]
    fn test_periodic_in_360() {
        for step in 0..720 {
            let theta = step as f64 * 0.5;
            let base = classify(theta, W);
            for k in [-3.0, -2.0, -1.0, 1.0, 2.0, 5.0] {
                assert_eq!(classify(theta + 360.0 * k, W), base, "theta {theta}, k {k}");
            }
        }
    }

    #[test]
    fn test_non_finite_orientation() {
        assert_eq!(classify(f64::NAN, W), None);
        assert_eq!(classify(f64::INFINITY, W), None);

        let port = Port::new("o1", (0.0, 0.0), f64::NAN, 0.5);
        let err = port_injection(&port, W).unwrap_err();
        assert!(err.to_string().contains("o1"));
        assert!(matches!(err, ConfigError::InvalidOrientation { .. }));
    }
}
