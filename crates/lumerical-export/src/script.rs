//! Lumerical script (`.lsf`) session
//!
//! [`ScriptSession`] turns every [`FdtdSession`] call into a line of
//! Lumerical script. The script can be written out and opened in the GUI, or
//! handed to a solver executable running in batch mode, in which case the
//! exported sweep file is read back.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use minijinja::{context, Environment};
use pic_layout::Layer;
use tracing::{error, info};

use crate::error::SessionError;
use crate::session::{quote, FdtdOptions, FdtdSession, RawSParameters, Region, ScriptValue, SessionResult};
use crate::sweep_file::read_sweep_file;

const HEADER_TEMPLATE: &str = r#"# Lumerical FDTD script - auto-generated by pic-to-lumerical {{ version }}
# Generated: {{ timestamp }}
{%- if title %}
# {{ title }}
{%- endif %}
"#;

/// Solver executable and the arguments placed before the script path
#[derive(Debug, Clone, PartialEq)]
pub struct SolverCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl SolverCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec!["-nw".to_string(), "-run".to_string()],
        }
    }
}

impl Default for SolverCommand {
    fn default() -> Self {
        Self::new("fdtd-solutions")
    }
}

#[derive(Debug, Default)]
pub struct ScriptSession {
    title: Option<String>,
    lines: Vec<String>,
    solver: Option<SolverCommand>,
}

impl ScriptSession {
    /// A session that only records script.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session that runs sweeps with `solver`.
    pub fn with_solver(solver: SolverCommand) -> Self {
        Self {
            solver: Some(solver),
            ..Default::default()
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn set(&mut self, property: &str, value: impl Into<ScriptValue>) {
        self.push(format!("set({}, {});", quote(property), value.into()));
    }

    fn set_region(&mut self, region: &Region) {
        self.set("x min", region.x_min);
        self.set("x max", region.x_max);
        self.set("y min", region.y_min);
        self.set("y max", region.y_max);
        self.set("z", region.z);
        self.set("z span", region.z_span);
    }

    /// The full script: header followed by every recorded line.
    pub fn render(&self) -> Result<String, SessionError> {
        let mut env = Environment::new();
        env.add_template("header", HEADER_TEMPLATE)?;
        let header = env.get_template("header")?.render(context! {
            version => crate::VERSION,
            timestamp => chrono::Utc::now().to_rfc3339(),
            title => self.title.as_deref(),
        })?;

        let mut script = header;
        if !script.ends_with('\n') {
            script.push('\n');
        }
        for line in &self.lines {
            script.push_str(line);
            script.push('\n');
        }
        Ok(script)
    }

    pub fn write_script(&self, path: &Path) -> Result<(), SessionError> {
        let script = self.render()?;
        fs::write(path, script).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("wrote script to {:?}", path);
        Ok(())
    }

    fn run_solver(&self, solver: &SolverCommand, script_path: &Path) -> Result<(), SessionError> {
        info!("running {} {:?}", solver.program, script_path);
        let status = Command::new(&solver.program)
            .args(&solver.args)
            .arg(script_path)
            .status()
            .map_err(|source| {
                error!(
                    "could not launch `{}`; install Lumerical FDTD or point --solver / LUMERICAL_FDTD at its executable",
                    solver.program
                );
                SessionError::Launch {
                    program: solver.program.clone(),
                    source,
                }
            })?;

        if !status.success() {
            return Err(SessionError::Solver {
                program: solver.program.clone(),
                status,
            });
        }
        Ok(())
    }
}

impl FdtdSession for ScriptSession {
    fn new_project(&mut self) -> SessionResult<()> {
        self.push("newproject;");
        self.push("selectall;");
        self.push("deleteall;");
        Ok(())
    }

    fn add_rect(&mut self, name: &str, region: &Region, index: f64) -> SessionResult<()> {
        self.push("addrect;");
        self.set("name", name);
        self.set_region(region);
        self.set("index", index);
        Ok(())
    }

    fn add_fdtd(&mut self, region: &Region, options: &FdtdOptions) -> SessionResult<()> {
        self.push("addfdtd;");
        self.set("dimension", options.dimension.as_str());
        self.set_region(region);
        self.set("simulation time", options.simulation_time);
        self.set("mesh accuracy", options.mesh_accuracy);
        self.set("use early shutoff", options.use_early_shutoff);
        self.set("auto shutoff min", options.auto_shutoff_min);
        Ok(())
    }

    fn gds_import(&mut self, gdspath: &Path, cell: &str, layer: Layer) -> SessionResult<()> {
        self.push(format!(
            "gdsimport({}, {}, {});",
            quote(&gdspath.to_string_lossy()),
            quote(cell),
            quote(&format!("{}:{}", layer.layer, layer.datatype))
        ));
        Ok(())
    }

    fn set_named(&mut self, name: &str, property: &str, value: ScriptValue) -> SessionResult<()> {
        self.push(format!("setnamed({}, {}, {});", quote(name), quote(property), value));
        Ok(())
    }

    fn add_port(&mut self) -> SessionResult<()> {
        self.push("addport;");
        Ok(())
    }

    fn set_global_source(&mut self, property: &str, value: ScriptValue) -> SessionResult<()> {
        self.push(format!("setglobalsource({}, {});", quote(property), value));
        Ok(())
    }

    fn eval(&mut self, script: &str) -> SessionResult<()> {
        for line in script.lines().map(str::trim_end).filter(|l| !l.trim().is_empty()) {
            self.push(line);
        }
        Ok(())
    }

    fn save(&mut self, path: &Path) -> SessionResult<()> {
        self.push(format!("save({});", quote(&path.to_string_lossy())));
        Ok(())
    }

    fn run_sparameter_sweep(&mut self, sweep: &str, export_path: &Path) -> SessionResult<RawSParameters> {
        let sweep_name = quote(sweep);
        self.push(format!("deletesweep({});", sweep_name));
        self.push("addsweep(3);");
        self.push(format!("setsweep({}, \"Excite all ports\", 0);", sweep_name));
        self.push(format!("setsweep({}, \"auto symmetry\", 1);", sweep_name));
        self.push(format!("runsweep({});", sweep_name));
        self.push(format!(
            "exportsweep({}, {});",
            sweep_name,
            quote(&export_path.to_string_lossy())
        ));

        let Some(solver) = self.solver.clone() else {
            return Err(SessionError::Unavailable(
                "no solver executable configured, pass --solver or set LUMERICAL_FDTD".to_string(),
            ));
        };

        let script_path: PathBuf = export_path.with_extension("lsf");
        let mut batch = ScriptSession {
            title: self.title.clone(),
            lines: self.lines.clone(),
            solver: None,
        };
        batch.push("exit(2);");
        batch.write_script(&script_path)?;

        self.run_solver(&solver, &script_path)?;
        read_sweep_file(export_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pic_layout::layers::WG;

    fn region() -> Region {
        Region {
            x_min: -1e-6,
            x_max: 1e-6,
            y_min: -2e-6,
            y_max: 2e-6,
            z: 0.0,
            z_span: 2.22e-6,
        }
    }

    #[test]
    fn test_render_records_calls_in_order() {
        let mut s = ScriptSession::new();
        s.set_title("waveguide_L10_W0p5");
        s.new_project().unwrap();
        s.add_rect("clad", &region(), 1.5).unwrap();
        s.set_named("clad", "material", "SiO2 (Glass) - Palik".into()).unwrap();
        s.gds_import(Path::new("out/wg.gds"), "wg", WG).unwrap();
        s.add_port().unwrap();
        s.set_global_source("wavelength start", 1.2e-6.into()).unwrap();

        let script = s.render().unwrap();
        assert!(script.starts_with("# Lumerical FDTD script"));
        assert!(script.contains("# waveguide_L10_W0p5\n"));

        let body: Vec<&str> = script.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(body[0], "newproject;");
        assert_eq!(body[3], "addrect;");
        assert_eq!(body[4], "set(\"name\", \"clad\");");
        assert_eq!(body[5], "set(\"x min\", -1e-6);");
        assert!(body.contains(&"setnamed(\"clad\", \"material\", \"SiO2 (Glass) - Palik\");"));
        assert!(body.contains(&"gdsimport(\"out/wg.gds\", \"wg\", \"1:0\");"));
        assert!(body.contains(&"setglobalsource(\"wavelength start\", 1.2e-6);"));
    }

    #[test]
    fn test_fdtd_region_options() {
        let mut s = ScriptSession::new();
        s.add_fdtd(&region(), &FdtdOptions::with_mesh_accuracy(3)).unwrap();
        let lines = s.lines();
        assert_eq!(lines[0], "addfdtd;");
        assert!(lines.contains(&"set(\"dimension\", \"3D\");".to_string()));
        assert!(lines.contains(&"set(\"mesh accuracy\", 3);".to_string()));
        assert!(lines.contains(&"set(\"simulation time\", 5e-12);".to_string()));
        assert!(lines.contains(&"set(\"use early shutoff\", 1);".to_string()));
    }

    #[test]
    fn test_sweep_without_solver_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = ScriptSession::new();
        let err = s
            .run_sparameter_sweep("s-parameter sweep", &dir.path().join("wg.dat"))
            .unwrap_err();
        assert!(matches!(err, SessionError::Unavailable(_)));
        assert!(s.lines().contains(&"runsweep(\"s-parameter sweep\");".to_string()));
    }

    #[test]
    fn test_sweep_launch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = ScriptSession::with_solver(SolverCommand::new("definitely-not-a-lumerical-binary"));
        let err = s
            .run_sparameter_sweep("s-parameter sweep", &dir.path().join("wg.dat"))
            .unwrap_err();
        assert!(matches!(err, SessionError::Launch { .. }));
        let script = fs::read_to_string(dir.path().join("wg.lsf")).unwrap();
        assert!(script.trim_end().ends_with("exit(2);"));
    }

    #[cfg(unix)]
    #[test]
    fn test_sweep_reads_exported_file() {
        let dir = tempfile::tempdir().unwrap();
        let dat = dir.path().join("wg.dat");
        fs::write(
            &dat,
            "[\"o1\",\"LEFT\"]\n[\"o2\",\"RIGHT\"]\n\
             (\"o2\",\"mode 1\",1,\"o1\",1,\"transmission\")\n(1,3)\n1.934e14 0.5 0.25\n",
        )
        .unwrap();

        let mut solver = SolverCommand::new("true");
        solver.args.clear();
        let mut s = ScriptSession::with_solver(solver);
        let raw = s.run_sparameter_sweep("s-parameter sweep", &dat).unwrap();
        assert_eq!(raw.parameters.keys().collect::<Vec<_>>(), vec!["S21"]);
        assert!((raw.parameters["S21"][0].norm() - 0.5).abs() < 1e-12);
    }
}
