//! Formscape CLI - turn formulas into meshes and plots from the command line

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use formscape_core::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "formscape")]
#[command(about = "Turn formulas into meshes and plots", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in formulas and their parameters
    List,

    /// Check a formula and show the variables it uses
    Check {
        /// Formula text, starting with `=`
        formula: String,
    },

    /// Evaluate a formula once
    Eval {
        /// Formula text, starting with `=`
        formula: String,

        /// Variable binding (repeatable)
        #[arg(short, long = "var", value_name = "KEY=VALUE", value_parser = parse_assignment)]
        vars: Vec<(String, f64)>,
    },

    /// Generate a mesh and write it as OBJ
    Mesh {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (.obj)
        #[arg(short, long)]
        output: PathBuf,

        /// Laplacian smoothing passes (implicit surfaces)
        #[arg(long)]
        smooth: Option<u32>,

        /// Marching cubes resolution (implicit surfaces)
        #[arg(short, long)]
        resolution: Option<u32>,

        /// Lattice segments, or height-field grid size
        #[arg(long)]
        segments: Option<u32>,

        /// Lattice rings
        #[arg(long)]
        rings: Option<u32>,

        /// Keep marching cubes vertices unmerged
        #[arg(long)]
        no_unify: bool,

        /// Replace generator normals with area-weighted vertex normals
        #[arg(long)]
        recompute_normals: bool,
    },

    /// Sample a 2D polyline and write it as CSV
    Plot {
        #[command(flatten)]
        source: SourceArgs,

        /// Number of segments in the polyline
        #[arg(short, long)]
        resolution: Option<u32>,

        /// Output file (.csv); stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Where the field and its parameters come from
#[derive(clap::Args)]
struct SourceArgs {
    /// Registry name, or a user formula starting with `=`
    #[arg(short, long)]
    formula: Option<String>,

    /// Parameter value (repeatable), overriding the preset
    #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    params: Vec<(String, f64)>,

    /// JSON preset with formula, parameters and generation settings
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Randomize unlocked parameters with this seed before applying --param
    #[arg(long, value_name = "SEED")]
    randomize: Option<u64>,

    /// Parameter left alone by --randomize (repeatable)
    #[arg(long, value_name = "KEY")]
    lock: Vec<String>,
}

fn parse_assignment(s: &str) -> std::result::Result<(String, f64), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for '{key}': {e}"))?;
    Ok((key.trim().to_string(), value))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List => run_list(),
        Commands::Check { formula } => run_check(&formula),
        Commands::Eval { formula, vars } => run_eval(&formula, vars),
        Commands::Mesh {
            source,
            output,
            smooth,
            resolution,
            segments,
            rings,
            no_unify,
            recompute_normals,
        } => {
            let mut registry = Registry::builtin();
            let (field, params, preset) = resolve_source(&source, &mut registry)?;
            let mut options = preset.map(|p| p.mesh).unwrap_or_default();
            if let Some(n) = smooth {
                options.smoothing_iterations = n;
            }
            options.resolution = resolution.or(options.resolution);
            options.segments = segments.or(options.segments);
            options.rings = rings.or(options.rings);
            if no_unify {
                options.unify = false;
            }
            if recompute_normals {
                options.recompute_normals = true;
            }
            run_mesh(field, &params, &options, &output)
        }
        Commands::Plot {
            source,
            resolution,
            output,
        } => {
            let mut registry = Registry::builtin();
            let (field, params, preset) = resolve_source(&source, &mut registry)?;
            let resolution = resolution
                .or(preset.and_then(|p| p.plot_resolution))
                .unwrap_or(formscape_core::plot::DEFAULT_PLOT_RESOLUTION);
            run_plot(field, &params, resolution, output.as_deref())
        }
    }
}

fn run_list() -> Result<()> {
    let registry = Registry::builtin();
    for (name, field) in registry.iter() {
        let descriptor = field.descriptor();
        let dimensions: Vec<String> = descriptor.dimensions.iter().map(ToString::to_string).collect();
        println!("{name} - {} [{}]", descriptor.name, dimensions.join(", "));
        println!("    {}", descriptor.description);
        for p in &descriptor.parameters {
            let default = p.default.map_or_else(|| "-".to_string(), |d| d.to_string());
            println!(
                "    {:<12} {:>8} .. {:<8} default {:<6} {}",
                p.key, p.min, p.max, default, p.description
            );
        }
    }
    Ok(())
}

fn run_check(formula: &str) -> Result<()> {
    if !validate(formula) {
        bail!("Invalid formula");
    }
    // Grammar-valid formulas can still fail to parse (e.g. `=1 +`)
    Expression::parse(formula)?;

    println!("Valid formula");
    let variables = extract_variables(formula);
    if variables.is_empty() {
        println!("No variables");
    } else {
        println!("Variables: {}", variables.join(", "));
    }
    Ok(())
}

fn run_eval(formula: &str, vars: Vec<(String, f64)>) -> Result<()> {
    let params: Params = vars.into_iter().collect();
    let value = evaluate(formula, &params)?;
    println!("{value}");
    Ok(())
}

/// Field and complete parameter map selected by the source arguments
///
/// A user formula, from `--formula` or the preset, is registered as `custom`
/// so it resolves like a built-in. Preset values are checked against the
/// ranges of the field actually used.
fn resolve_source<'r>(
    source: &SourceArgs,
    registry: &'r mut Registry,
) -> Result<(&'r ScalarField, Params, Option<Preset>)> {
    let preset = source
        .preset
        .as_ref()
        .map(|path| {
            Preset::load(path).with_context(|| format!("Failed to load preset {}", path.display()))
        })
        .transpose()?;

    let formula = match (&source.formula, &preset) {
        (Some(f), _) => f.clone(),
        (None, Some(p)) => p.formula.clone(),
        (None, None) => bail!("No formula given; pass --formula or --preset"),
    };

    let name = if formula.trim_start().starts_with('=') {
        let field = UserExpression::new("Custom", "Command-line formula", &formula, None)?;
        registry.register("custom", field);
        "custom"
    } else {
        formula.as_str()
    };
    let field = registry.resolve(name)?;

    let mut params = field.descriptor().default_params();
    if let Some(p) = &preset {
        p.check_params(field)?;
        params.extend_from(&p.params);
    }
    if let Some(seed) = source.randomize {
        let locked: HashSet<String> = source.lock.iter().cloned().collect();
        let mut rng = StdRng::seed_from_u64(seed);
        randomize(field.descriptor(), &mut params, &locked, &mut rng);
    }
    for (key, value) in &source.params {
        params.set(key.clone(), *value);
    }

    tracing::info!(formula = %formula, field = field.name(), "resolved formula");
    Ok((field, params, preset))
}

fn run_mesh(field: &ScalarField, params: &Params, options: &MeshOptions, output: &Path) -> Result<()> {
    println!("Generating mesh for {}...", field.name());
    let mesh = generate_mesh(field, params, options)?;

    println!(
        "Generated mesh: {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    mesh.export(output)?;
    println!("Exported to: {}", output.display());
    Ok(())
}

fn run_plot(field: &ScalarField, params: &Params, resolution: u32, output: Option<&Path>) -> Result<()> {
    let line = generate_polyline(field, params, resolution)?;

    match output {
        Some(path) => {
            line.export(path)?;
            eprintln!("Wrote {} points to {}", line.len(), path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            formscape_core::export::write_csv(&line, &mut out)?;
            out.flush()?;
        }
    }
    Ok(())
}
