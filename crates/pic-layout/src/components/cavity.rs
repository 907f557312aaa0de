//! Resonant cavity: a coupler closed by two mirrors

use std::sync::Arc;

use crate::component::Component;
use crate::components::coupler::{coupler, CouplerParams};
use crate::error::LayoutResult;

/// Connect the `W0` port of `mirror` to both `W1` and `E1` of a coupler.
///
/// ```text
///   ml (mirror left)              mr (mirror right)
///    |                               |
///    |W0 - W1__             __E1 - W0|
///    |         \           /         |
///               \         /
///             ---=========---
///          W0    length      E0
/// ```
pub fn cavity(mirror: Arc<Component>, coupler_params: &CouplerParams) -> LayoutResult<Component> {
    let coupler = Arc::new(coupler(coupler_params)?);
    // fail early with a useful message if the mirror has no W0
    mirror.port("W0")?;

    let mut c = Component::new(format!("cavity_{}_{}", mirror.name, coupler.name));
    let cr = c.add_ref(coupler.clone());
    let ml = c.add_ref(mirror.clone());
    let mr = c.add_ref(mirror.clone());

    let w1 = c.reference(cr).port("W1")?;
    let e1 = c.reference(cr).port("E1")?;
    c.reference_mut(ml).connect("W0", &w1, 0.0)?;
    c.reference_mut(mr).connect("W0", &e1, 0.0)?;

    c.add_port_from("W0", cr, "W0")?;
    c.add_port_from("E0", cr, "E0")?;

    c.set_setting("mirror", mirror.name.clone());
    c.set_setting("coupler", coupler.name.clone());
    c.set_setting("length", coupler_params.length);
    c.set_setting("gap", coupler_params.gap);
    c.set_setting("wg_width", coupler_params.wg_width);
    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::dbr::{dbr, DbrParams};

    fn default_cavity() -> Component {
        let mirror = Arc::new(dbr(&DbrParams::default()).unwrap());
        let params = CouplerParams {
            length: 0.1,
            gap: 0.2,
            wg_width: 0.5,
            ..Default::default()
        };
        cavity(mirror, &params).unwrap()
    }

    #[test]
    fn test_cavity_exposes_coupler_bus_ports() {
        let c = default_cavity();
        assert_eq!(c.port_names(), vec!["W0", "E0"]);
        let w0 = c.port("W0").unwrap();
        assert_eq!(w0.orientation, 180.0);
        assert_eq!(c.references().len(), 3);
    }

    #[test]
    fn test_mirrors_face_coupler() {
        let c = default_cavity();
        let coupler_w1 = c.references()[0].port("W1").unwrap();
        let mirror_w0 = c.references()[1].port("W0").unwrap();
        assert!((mirror_w0.midpoint - coupler_w1.midpoint).norm() < 1e-9);
        // antiparallel
        let diff = (mirror_w0.orientation - coupler_w1.orientation).rem_euclid(360.0);
        assert!((diff - 180.0).abs() < 1e-9);

        // the right mirror extends east of the coupler
        let coupler_e1 = c.references()[0].port("E1").unwrap();
        let mirror_e0 = c.references()[2].port("E0").unwrap();
        assert!(mirror_e0.x() > coupler_e1.x());
    }
}
