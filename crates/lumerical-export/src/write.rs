//! S-parameters of a component with Lumerical FDTD
//!
//! Results are stored next to each other under a path derived from the
//! component name and its layer stack:
//!
//! - `<path>.json`: normalised results
//! - `<path>.yml`: settings the results were computed with
//! - `<path>.dat`: sweep export, loadable in INTERCONNECT
//! - `<path>.fsp`: the simulation project
//! - `<path>.gds`: geometry handed to the simulator
//!
//! An existing `.json` is returned as is unless an overwrite is requested.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use pic_layout::{extend_ports, write_gds, Component, Port};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::ExportError;
use crate::layer_stack::resolve_layer_stack;
use crate::material::MaterialLibrary;
use crate::orientation::{port_injection, PortInjection};
use crate::results::SParameterResults;
use crate::session::{FdtdOptions, FdtdSession, Region};
use crate::settings::{CleanedSettings, SettingsOverrides, SimulationSettings};
use crate::sidewall::{extrude_sidewalls, DEFAULT_DZ};
use crate::LengthUnit;

pub const SWEEP_NAME: &str = "s-parameter sweep";

const RUN_FALSE_HINT: &str = "run is off: the simulation is only drawn. \
Pass --run to simulate, or write the script with --script and open it in Lumerical FDTD to debug";

#[derive(Debug, Clone, PartialEq)]
pub struct WriteOptions {
    /// Run the sweep. Otherwise only set up the simulation.
    pub run: bool,
    /// Simulate even when results already exist.
    pub overwrite: bool,
    pub dirpath: PathBuf,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            run: true,
            overwrite: false,
            dirpath: PathBuf::from("sparameters"),
        }
    }
}

/// Settings file written next to the results.
#[derive(Debug, Serialize)]
struct SimulationRecord<'a> {
    simulation_settings: CleanedSettings,
    component: BTreeMap<String, Value>,
    version: &'a str,
}

/// `.dat` path for `component`: `<dirpath>/<name>_<material><nm>...`, with one
/// material/thickness pair per simulated layer.
pub fn sparameters_path(component: &Component, dirpath: &Path, settings: &SimulationSettings) -> PathBuf {
    let present = component.layers();
    let mut name = component.name.clone();
    for (layer, nm) in &settings.layer2nm {
        if !present.contains(layer) {
            continue;
        }
        if let Some(material) = settings.layer2material.get(layer) {
            name.push_str(&format!("_{}{}", material, pic_layout::component::clean_value(*nm)));
        }
    }
    dirpath.join(format!("{}.dat", name))
}

/// Simulation region spanning the port midpoints, padded by half the port
/// extension. Vertically centred on z = 0 and tall enough for the thickest
/// layer plus `zmargin` on both sides.
fn simulation_region(ports: &[Port], settings: &SimulationSettings) -> Region {
    let um = LengthUnit::Micrometer;
    let pe = um.to_meters(settings.port_extension_um) / 2.0;
    let xs = ports.iter().map(|p| um.to_meters(p.x()));
    let ys = ports.iter().map(|p| um.to_meters(p.y()));
    let max_nm = settings.layer2nm.values().copied().fold(0.0, f64::max);
    Region {
        x_min: xs.clone().fold(f64::INFINITY, f64::min) - pe,
        x_max: xs.fold(f64::NEG_INFINITY, f64::max) + pe,
        y_min: ys.clone().fold(f64::INFINITY, f64::min) - pe,
        y_max: ys.fold(f64::NEG_INFINITY, f64::max) + pe,
        z: 0.0,
        z_span: 2.0 * settings.zmargin + LengthUnit::Nanometer.to_meters(max_nm),
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ExportError + '_ {
    move |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Compute the S-parameters of `component`.
///
/// Settings are the defaults, then the component's simulation settings,
/// then `overrides`. Returns the results when `options.run` is set (from the
/// cache when present), `None` when the simulation was only drawn.
pub fn write_sparameters(
    component: &Component,
    session: &mut dyn FdtdSession,
    options: &WriteOptions,
    overrides: &SettingsOverrides,
) -> Result<Option<SParameterResults>, ExportError> {
    let component_overrides = component
        .simulation_settings()
        .map(|s| SettingsOverrides::from(s.clone()));
    let settings = SimulationSettings::resolve(component_overrides.as_ref(), overrides)?;

    let mut component = component.clone();
    component.remove_layers(&settings.remove_layers);

    let filepath = sparameters_path(&component, &options.dirpath, &settings);
    let filepath_json = filepath.with_extension("json");
    let filepath_yml = filepath.with_extension("yml");
    let filepath_fsp = filepath.with_extension("fsp");
    let filepath_gds = filepath.with_extension("gds");

    if options.run && filepath_json.exists() && !options.overwrite {
        info!("loading cached results from {:?}", filepath_json);
        return SParameterResults::load(&filepath_json).map(Some);
    }

    let ports = component.ports().to_vec();
    if ports.is_empty() {
        return Err(ExportError::NoPorts(component.name.clone()));
    }
    let injections: Vec<PortInjection> = ports
        .iter()
        .map(|port| port_injection(port, settings.port_width))
        .collect::<Result<_, _>>()?;

    let materials = MaterialLibrary::default();
    let background = materials.get(&settings.background_material)?.lumerical_name.clone();
    let layers = component.layers();
    let stack = resolve_layer_stack(&settings, &layers, &materials)?;

    if !options.run {
        warn!("{}", RUN_FALSE_HINT);
    }

    fs::create_dir_all(&options.dirpath).map_err(io_error(&options.dirpath))?;
    let extended = extend_ports(&component, settings.port_extension_um)?;
    write_gds(&extended, &filepath_gds)?;

    let region = simulation_region(&ports, &settings);

    session.new_project()?;
    session.add_rect("clad", &region, 1.5)?;
    session.set_named("clad", "material", background.into())?;
    session.add_fdtd(&region, &FdtdOptions::with_mesh_accuracy(settings.mesh_accuracy))?;

    for extrusion in &stack {
        let group = extrusion.group_name();
        session.gds_import(&filepath_gds, &extended.name, extrusion.layer)?;
        session.set_named(
            &group,
            "z span",
            LengthUnit::Nanometer.to_meters(extrusion.thickness_nm).into(),
        )?;
        session.set_named(&group, "material", extrusion.material.as_str().into())?;
        session.set_named(&group, "script", "selectall;\nset('material',%material%);".into())?;
        extrude_sidewalls(session, &group, extrusion.sidewall_angle, DEFAULT_DZ)?;
    }

    let um = LengthUnit::Micrometer;
    for (i, (port, injection)) in ports.iter().zip(&injections).enumerate() {
        session.add_port()?;
        let p = format!("FDTD::ports::port {}", i + 1);
        session.set_named(&p, "x", um.to_meters(port.x()).into())?;
        session.set_named(&p, "y", um.to_meters(port.y()).into())?;
        session.set_named(&p, "z span", settings.port_height.into())?;
        session.set_named(&p, "direction", injection.direction.to_string().into())?;
        session.set_named(&p, "injection axis", injection.axis.to_string().into())?;
        session.set_named(&p, "y span", injection.dy.into())?;
        session.set_named(&p, "x span", injection.dx.into())?;
        session.set_named(&p, "name", port.name.as_str().into())?;
    }

    session.set_global_source("wavelength start", settings.wavelength_start.into())?;
    session.set_global_source("wavelength stop", settings.wavelength_stop.into())?;
    session.set_named(
        "FDTD::ports",
        "monitor frequency points",
        settings.wavelength_points.into(),
    )?;

    if !options.run {
        return Ok(None);
    }

    session.save(&filepath_fsp)?;
    let raw = session.run_sparameter_sweep(SWEEP_NAME, &filepath)?;
    info!("wrote sparameters to {:?}", filepath);

    let results = SParameterResults::from_raw(&raw);
    results.save(&filepath_json)?;

    let record = SimulationRecord {
        simulation_settings: settings.clean(&layers),
        component: component.settings(),
        version: crate::VERSION,
    };
    fs::write(&filepath_yml, serde_yaml::to_string(&record)?).map_err(io_error(&filepath_yml))?;
    info!("wrote {:?} and {:?}", filepath_json, filepath_yml);

    Ok(Some(results))
}
