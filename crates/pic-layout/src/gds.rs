//! GDSII export
//!
//! A component is written as a single flattened cell of the same name on a
//! 1 nm database grid with 1 µm user units.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::component::Component;
use crate::geometry::Polygon;
use crate::layers::Layer;

/// Database unit in µm
const DB_UNIT_UM: f64 = 1e-3;

#[derive(Error, Debug)]
pub enum GdsError {
    #[error(transparent)]
    Gds(#[from] gds21::GdsError),

    #[error("layer {0} does not fit a GDSII layer/datatype pair")]
    LayerOutOfRange(Layer),

    #[error("coordinate {0} µm does not fit the database grid")]
    CoordinateOverflow(f64),
}

/// Build the GDSII library holding `component` flattened into one cell.
pub fn to_gds_library(component: &Component) -> Result<gds21::GdsLibrary, GdsError> {
    let mut lib = gds21::GdsLibrary::new("library".to_string());
    lib.units = gds21::GdsUnits::new(DB_UNIT_UM, DB_UNIT_UM * 1e-6);

    let mut strukt = gds21::GdsStruct::new(component.name.clone());
    for polygon in component.flatten() {
        if polygon.points.len() < 3 {
            warn!(
                "skipping polygon on layer {} in {} with {} points",
                polygon.layer,
                component.name,
                polygon.points.len()
            );
            continue;
        }
        strukt.elems.push(export_polygon(&polygon)?.into());
    }
    lib.structs.push(strukt);
    Ok(lib)
}

/// Write `component` to a GDSII file at `path`.
pub fn write_gds(component: &Component, path: &Path) -> Result<(), GdsError> {
    to_gds_library(component)?.save(path)?;
    debug!("wrote {:?}", path);
    Ok(())
}

fn export_polygon(polygon: &Polygon) -> Result<gds21::GdsBoundary, GdsError> {
    let out_of_range = || GdsError::LayerOutOfRange(polygon.layer);
    let layer = i16::try_from(polygon.layer.layer).map_err(|_| out_of_range())?;
    let datatype = i16::try_from(polygon.layer.datatype).map_err(|_| out_of_range())?;

    // GDSII boundaries repeat the first point to close
    let xy = polygon
        .points
        .iter()
        .chain(polygon.points.first())
        .map(|p| Ok(gds21::GdsPoint::new(to_db(p.x)?, to_db(p.y)?)))
        .collect::<Result<Vec<_>, GdsError>>()?;

    Ok(gds21::GdsBoundary {
        layer,
        datatype,
        xy,
        ..Default::default()
    })
}

fn to_db(um: f64) -> Result<i32, GdsError> {
    let scaled = (um / DB_UNIT_UM).round();
    if scaled.is_finite() && scaled >= i32::MIN as f64 && scaled <= i32::MAX as f64 {
        Ok(scaled as i32)
    } else {
        Err(GdsError::CoordinateOverflow(um))
    }
}
