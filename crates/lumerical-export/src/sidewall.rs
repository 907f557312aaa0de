//! Sidewall angle extrusion
//!
//! Lumerical imports GDS polygons with vertical walls. A slanted wall is
//! approximated by slicing each polygon into `dz` thick slabs, each scaled
//! about the polygon centroid.

use minijinja::{context, Environment};
use tracing::debug;

use crate::error::SessionError;
use crate::session::{quote, FdtdSession};

/// Slab thickness (m)
pub const DEFAULT_DZ: f64 = 10e-9;

/// Angles this close to 90° are treated as vertical.
const VERTICAL_TOLERANCE: f64 = 1e-3;

const EXTRUDE_KERNEL: &str = r#"group = {{ group }};
num_polys = getnamednumber(group + "::poly");
for(i=1:num_polys) {
    setnamed(group + "::poly", "name", "poly" + num2str(i), 1);
}
for(i=1:num_polys) {
    select(group + "::poly" + num2str(i));
    dz = {{ dz }};
    sidewall_angle = {{ sidewall_angle }};
    V = get("vertices");
    z1 = get("z min");
    z2 = get("z max");
    num_vertices = length(V)/2;
    num_steps = round((z2-z1)/dz);
    if(num_steps < 2) { num_steps = 2; }
    tempVx = pinch(V,2,1);
    tempVy = pinch(V,2,2);
    x0 = sum(tempVx)/num_vertices;
    y0 = sum(tempVy)/num_vertices;
    r0 = sum(sqrt((tempVx-x0)^2 + (tempVy-y0)^2))/num_vertices;
    for(j=1:num_steps) {
        scale_factor = (r0 + (j-1/2)*(z2-z1)/num_steps/tan(sidewall_angle*pi/180))/r0;
        tempVx = (pinch(V,2,1)-x0)*scale_factor + x0;
        tempVy = (pinch(V,2,2)-y0)*scale_factor + y0;
        tempV = V;
        tempV(1:num_vertices,1) = tempVx;
        tempV(1:num_vertices,2) = tempVy;
        if(j > 1) { copy(0,0,0); }
        set("z min", z2-j*(z2-z1)/num_steps);
        set("z max", z2-(j-1)*(z2-z1)/num_steps);
        set("vertices", tempV);
    }
}"#;

/// Whether `sidewall_angle` (degrees) needs slicing at all.
pub fn needs_extrusion(sidewall_angle: f64) -> bool {
    90.0 - sidewall_angle >= VERTICAL_TOLERANCE
}

pub fn extrusion_script(group: &str, sidewall_angle: f64, dz: f64) -> Result<String, SessionError> {
    let mut env = Environment::new();
    env.add_template("extrude", EXTRUDE_KERNEL)?;
    let script = env.get_template("extrude")?.render(context! {
        group => quote(group),
        dz => format!("{:e}", dz),
        sidewall_angle => sidewall_angle,
    })?;
    Ok(script)
}

/// Slant the walls of every polygon in the imported group `group`.
/// Returns `false` when the walls are vertical and nothing was done.
pub fn extrude_sidewalls(
    session: &mut dyn FdtdSession,
    group: &str,
    sidewall_angle: f64,
    dz: f64,
) -> Result<bool, SessionError> {
    if !needs_extrusion(sidewall_angle) {
        return Ok(false);
    }
    debug!("extruding {} with sidewall angle {}", group, sidewall_angle);
    session.eval(&extrusion_script(group, sidewall_angle, dz)?)?;
    Ok(true)
}
