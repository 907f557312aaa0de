//! Components and placed references
//!
//! A [`Component`] owns polygons and ports on its own layers and may place
//! other components through [`ComponentReference`]s. Referenced components
//! are shared behind an [`Arc`]; placing or connecting a reference never
//! touches the shared original.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use nalgebra::Point2;
use serde_json::Value;

use crate::error::{LayoutError, LayoutResult};
use crate::geometry::{BBox, Placement, Polygon};
use crate::layers::Layer;
use crate::port::Port;

/// Stable handle to a reference inside its parent component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefId(usize);

#[derive(Debug, Clone)]
pub struct Component {
    pub name: String,
    polygons: Vec<Polygon>,
    ports: Vec<Port>,
    references: Vec<ComponentReference>,
    settings: BTreeMap<String, Value>,
    simulation_settings: Option<BTreeMap<String, Value>>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            polygons: Vec::new(),
            ports: Vec::new(),
            references: Vec::new(),
            settings: BTreeMap::new(),
            simulation_settings: None,
        }
    }

    pub fn add_polygon(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
    }

    /// Add a port. Port names are unique within a component.
    pub fn add_port(&mut self, port: Port) -> LayoutResult<()> {
        if self.ports.iter().any(|p| p.name == port.name) {
            return Err(LayoutError::DuplicatePort {
                component: self.name.clone(),
                port: port.name,
            });
        }
        self.ports.push(port);
        Ok(())
    }

    /// Expose a reference's port on this component under `name`.
    pub fn add_port_from(&mut self, name: &str, reference: RefId, port: &str) -> LayoutResult<()> {
        let port = self.reference(reference).port(port)?.renamed(name);
        self.add_port(port)
    }

    /// Place `component` at the origin and return a handle to the new reference.
    pub fn add_ref(&mut self, component: Arc<Component>) -> RefId {
        self.references.push(ComponentReference::new(component));
        RefId(self.references.len() - 1)
    }

    pub fn reference(&self, id: RefId) -> &ComponentReference {
        &self.references[id.0]
    }

    pub fn reference_mut(&mut self, id: RefId) -> &mut ComponentReference {
        &mut self.references[id.0]
    }

    pub fn references(&self) -> &[ComponentReference] {
        &self.references
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Ports in insertion order.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn port(&self, name: &str) -> LayoutResult<&Port> {
        self.ports
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| LayoutError::PortNotFound {
                component: self.name.clone(),
                port: name.to_string(),
                available: self.port_names(),
            })
    }

    pub fn port_names(&self) -> Vec<String> {
        self.ports.iter().map(|p| p.name.clone()).collect()
    }

    /// Record a generator parameter. Settings feed the component name and the
    /// settings file written next to simulation results.
    pub fn set_setting(&mut self, key: &str, value: impl Into<Value>) {
        self.settings.insert(key.to_string(), value.into());
    }

    /// Generator settings, including the component name.
    pub fn settings(&self) -> BTreeMap<String, Value> {
        let mut settings = self.settings.clone();
        settings.insert("name".to_string(), Value::from(self.name.clone()));
        settings
    }

    /// Simulation-setting overrides carried by this component.
    pub fn simulation_settings(&self) -> Option<&BTreeMap<String, Value>> {
        self.simulation_settings.as_ref()
    }

    pub fn set_simulation_settings(&mut self, overrides: BTreeMap<String, Value>) {
        self.simulation_settings = Some(overrides);
    }

    /// Every layer used by this component or anything it references.
    pub fn layers(&self) -> BTreeSet<Layer> {
        let mut layers: BTreeSet<Layer> = self.polygons.iter().map(|p| p.layer).collect();
        for reference in &self.references {
            layers.extend(reference.component().layers());
        }
        layers
    }

    /// Remove polygons on `layers` here and in every referenced component.
    ///
    /// Shared children are cloned on write so other parents are unaffected.
    pub fn remove_layers(&mut self, layers: &[Layer]) {
        if layers.is_empty() {
            return;
        }
        self.polygons.retain(|p| !layers.contains(&p.layer));
        for reference in &mut self.references {
            if reference.component.layers().iter().any(|l| layers.contains(l)) {
                Arc::make_mut(&mut reference.component).remove_layers(layers);
            }
        }
    }

    /// All polygons in this component's frame, references resolved.
    pub fn flatten(&self) -> Vec<Polygon> {
        let mut out = Vec::new();
        self.collect_polygons(&Placement::identity(), &mut out);
        out
    }

    fn collect_polygons(&self, placement: &Placement, out: &mut Vec<Polygon>) {
        out.extend(self.polygons.iter().map(|p| p.transformed(placement)));
        for reference in &self.references {
            let nested = reference.placement.then(placement);
            reference.component.collect_polygons(&nested, out);
        }
    }

    pub fn bbox(&self) -> Option<BBox> {
        self.flatten()
            .iter()
            .filter_map(Polygon::bbox)
            .reduce(|a, b| a.union(&b))
    }

    /// `[x, y, orientation, width]` per port, in port order.
    pub fn ports_array(&self) -> Vec<[f64; 4]> {
        self.ports
            .iter()
            .map(|p| [p.x(), p.y(), p.orientation, p.width])
            .collect()
    }
}

/// A placed instance of a shared component
#[derive(Debug, Clone)]
pub struct ComponentReference {
    component: Arc<Component>,
    pub placement: Placement,
}

impl ComponentReference {
    pub fn new(component: Arc<Component>) -> Self {
        Self {
            component,
            placement: Placement::identity(),
        }
    }

    pub fn component(&self) -> &Component {
        &self.component
    }

    /// Ports of the referenced component, placed into the parent frame.
    pub fn ports(&self) -> Vec<Port> {
        self.component
            .ports()
            .iter()
            .map(|p| p.transformed(&self.placement))
            .collect()
    }

    pub fn port(&self, name: &str) -> LayoutResult<Port> {
        self.component
            .port(name)
            .map(|p| p.transformed(&self.placement))
    }

    pub fn translate(&mut self, dx: f64, dy: f64) -> &mut Self {
        self.placement.translate(dx, dy);
        self
    }

    pub fn rotate(&mut self, angle: f64, center: Point2<f64>) -> &mut Self {
        self.placement.rotate(angle, &center);
        self
    }

    /// Move this reference so that its port `port` faces `destination`.
    ///
    /// The reference is rotated about the port so the two orientations are
    /// antiparallel, translated so the midpoints coincide, and then pushed
    /// back by `overlap` µm along the destination orientation.
    pub fn connect(&mut self, port: &str, destination: &Port, overlap: f64) -> LayoutResult<&mut Self> {
        let current = self.port(port)?;
        let angle = 180.0 + destination.orientation - current.orientation;
        self.placement.rotate(angle, &current.midpoint);

        let current = self.port(port)?;
        let delta = destination.midpoint - current.midpoint;
        self.placement.translate(delta.x, delta.y);

        let back = destination.direction() * -overlap;
        self.placement.translate(back.x, back.y);
        Ok(self)
    }
}

/// Component name from a generator name and its parameters,
/// e.g. `waveguide_L10_W0p5`.
pub fn component_name(prefix: &str, params: &[(&str, f64)]) -> String {
    let mut name = prefix.to_string();
    for (key, value) in params {
        name.push('_');
        name.push_str(key);
        name.push_str(&clean_value(*value));
    }
    name
}

/// Number formatted for use inside a cell name: `0.5` → `0p5`, `-1` → `m1`.
pub fn clean_value(value: f64) -> String {
    format!("{}", value).replace('.', "p").replace('-', "m")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{WG, WGCLAD};
    use pretty_assertions::assert_eq;

    fn straight(name: &str, length: f64) -> Component {
        let mut c = Component::new(name);
        c.add_polygon(Polygon::rect(WG, (0.0, -0.25), (length, 0.25)));
        c.add_polygon(Polygon::rect(WGCLAD, (0.0, -3.0), (length, 3.0)));
        c.add_port(Port::new("W0", (0.0, 0.0), 180.0, 0.5)).unwrap();
        c.add_port(Port::new("E0", (length, 0.0), 0.0, 0.5)).unwrap();
        c
    }

    #[test]
    fn test_duplicate_port_rejected() {
        let mut c = straight("wg", 10.0);
        let err = c.add_port(Port::new("W0", (1.0, 0.0), 180.0, 0.5)).unwrap_err();
        assert!(matches!(err, LayoutError::DuplicatePort { .. }));
    }

    #[test]
    fn test_missing_port_lists_available() {
        let c = straight("wg", 10.0);
        let err = c.port("N0").unwrap_err().to_string();
        assert!(err.contains("N0"));
        assert!(err.contains("W0"));
    }

    #[test]
    fn test_connect_chains_references() {
        let wg = Arc::new(straight("wg", 10.0));
        let mut top = Component::new("top");
        let a = top.add_ref(wg.clone());
        let b = top.add_ref(wg.clone());

        let dest = top.reference(a).port("E0").unwrap();
        top.reference_mut(b).connect("W0", &dest, 0.0).unwrap();

        let e0 = top.reference(b).port("E0").unwrap();
        assert!((e0.x() - 20.0).abs() < 1e-9);
        assert!(e0.y().abs() < 1e-9);
        assert!((e0.orientation - 0.0).abs() < 1e-9);

        // the shared original is untouched
        assert_eq!(wg.port("E0").unwrap().midpoint, Point2::new(10.0, 0.0));
    }

    #[test]
    fn test_connect_rotates_to_face_destination() {
        let wg = Arc::new(straight("wg", 10.0));
        let mut top = Component::new("top");
        let r = top.add_ref(wg);

        let dest = Port::new("up", (5.0, 5.0), 90.0, 0.5);
        top.reference_mut(r).connect("W0", &dest, 0.0).unwrap();

        let w0 = top.reference(r).port("W0").unwrap();
        assert!((w0.x() - 5.0).abs() < 1e-9);
        assert!((w0.y() - 5.0).abs() < 1e-9);
        assert!((w0.orientation - 270.0).abs() < 1e-9);

        let e0 = top.reference(r).port("E0").unwrap();
        assert!((e0.y() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_connect_with_overlap() {
        let wg = Arc::new(straight("wg", 10.0));
        let mut top = Component::new("top");
        let r = top.add_ref(wg);
        let dest = Port::new("east", (0.0, 0.0), 0.0, 0.5);
        top.reference_mut(r).connect("W0", &dest, 1.0).unwrap();
        let w0 = top.reference(r).port("W0").unwrap();
        assert!((w0.x() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_layers_and_remove_layers() {
        let wg = Arc::new(straight("wg", 10.0));
        let mut top = Component::new("top");
        top.add_ref(wg.clone());
        assert_eq!(top.layers(), BTreeSet::from([WG, WGCLAD]));

        top.remove_layers(&[WGCLAD]);
        assert_eq!(top.layers(), BTreeSet::from([WG]));
        // other holders of the child still see the cladding
        assert_eq!(wg.layers(), BTreeSet::from([WG, WGCLAD]));
    }

    #[test]
    fn test_flatten_and_bbox() {
        let wg = Arc::new(straight("wg", 10.0));
        let mut top = Component::new("top");
        let r = top.add_ref(wg);
        top.reference_mut(r).translate(5.0, 1.0);
        top.remove_layers(&[WGCLAD]);

        let flat = top.flatten();
        assert_eq!(flat.len(), 1);
        let bbox = top.bbox().unwrap();
        assert!((bbox.min.x - 5.0).abs() < 1e-12);
        assert!((bbox.max.x - 15.0).abs() < 1e-12);
        assert!((bbox.min.y - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_component_name() {
        assert_eq!(component_name("waveguide", &[("L", 10.0), ("W", 0.5)]), "waveguide_L10_W0p5");
        assert_eq!(clean_value(-1.25), "m1p25");
    }
}
