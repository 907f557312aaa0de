//! pic-to-lumerical: CLI tool for computing component S-parameters with Lumerical FDTD

use anyhow::{Context, Result};
use clap::Parser;
use lumerical_export::{write_sparameters, ScriptSession, SettingsOverrides, SolverCommand, WriteOptions};
use pic_layout::{component_factory, COMPONENT_NAMES};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "pic-to-lumerical")]
#[command(about = "Compute S-parameters of photonic components with Lumerical FDTD")]
#[command(version)]
struct Args {
    /// Component to simulate (see --list)
    #[arg(short, long, default_value = "waveguide")]
    component: String,

    /// Directory for results
    #[arg(short, long, default_value = "sparameters")]
    dirpath: PathBuf,

    /// Run the simulation. Without it the simulation is only set up
    #[arg(long)]
    run: bool,

    /// Simulate even if results already exist
    #[arg(long)]
    overwrite: bool,

    /// Lumerical FDTD executable, run in batch mode
    #[arg(long, env = "LUMERICAL_FDTD")]
    solver: Option<String>,

    /// YAML or JSON file of setting overrides
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Setting override, e.g. --set port_width=2e-6 (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// Write the generated Lumerical script here
    #[arg(long)]
    script: Option<PathBuf>,

    /// List available components and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    if args.list {
        for name in COMPONENT_NAMES {
            println!("{}", name);
        }
        return Ok(());
    }

    let component = component_factory(&args.component)
        .with_context(|| format!("Failed to build component: {}", args.component))?;

    // Overrides: settings file, then --set flags
    let mut overrides = match &args.settings {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings file: {:?}", path))?;
            SettingsOverrides::from_yaml_str(&text)
                .with_context(|| format!("Failed to parse settings file: {:?}", path))?
        }
        None => SettingsOverrides::new(),
    };
    for assignment in &args.set {
        overrides.apply_assignment(assignment)?;
    }

    let mut session = match &args.solver {
        Some(program) if args.run => ScriptSession::with_solver(SolverCommand::new(program.as_str())),
        _ => ScriptSession::new(),
    };
    session.set_title(component.name.clone());

    let options = WriteOptions {
        run: args.run,
        overwrite: args.overwrite,
        dirpath: args.dirpath.clone(),
    };
    let results = write_sparameters(&component, &mut session, &options, &overrides)
        .with_context(|| format!("S-parameter export failed for {}", component.name));

    // Keep the script for debugging even when the run failed
    let script_path = args
        .script
        .clone()
        .or_else(|| (!args.run).then(|| args.dirpath.join(format!("{}.lsf", component.name))));
    if let Some(path) = script_path {
        if !session.lines().is_empty() {
            session
                .write_script(&path)
                .with_context(|| format!("Failed to write script: {:?}", path))?;
        }
    }

    if let Some(results) = results? {
        println!("{}", serde_json::to_string_pretty(&results)?);
        info!("{} S-parameters for {}", results.keys().len(), component.name);
    }

    Ok(())
}
