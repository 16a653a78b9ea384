use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use log::debug;
use odoo_manifest::MANIFEST_NAMES;
use std::fs;
use std::path::{Path, PathBuf};

pub mod scripts;

use crate::config::{AssetBundles, MigrateConfig};
use crate::tools::Tools;
use crate::ui::{Spinner, icons};
use scripts::MigrateContext;

/// Major versions a module can be migrated between, oldest first.
pub const AVAILABLE_VERSIONS: &[&str] = &["14.0", "15.0"];
const LATEST_VERSION: &str = "15.0";

/// Arguments for a migration run
#[derive(Args, Debug, Clone)]
pub struct MigrateArgs {
    /// Directory containing the modules to migrate
    #[arg(long, value_name = "DIR", default_value = ".", value_hint = clap::ValueHint::DirPath)]
    pub directory: PathBuf,

    /// Version the modules are currently written for
    #[arg(short = 'i', long = "init-version-name", value_name = "VERSION")]
    pub init_version_name: String,

    /// Version to migrate the modules to
    #[arg(
        short = 't',
        long = "target-version-name",
        value_name = "VERSION",
        default_value = LATEST_VERSION
    )]
    pub target_version_name: String,

    /// Only migrate these modules (comma separated). All modules by default.
    #[arg(short = 'm', long, value_delimiter = ',', value_name = "MODULES")]
    pub modules: Vec<String>,

    /// TOML file with extra settings (e.g. `extra_asset_bundles`)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// One hop between consecutive major versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStep {
    pub init_version_name: String,
    pub target_version_name: String,
}

/// The consecutive version hops leading from `init` to `target`.
pub fn migration_steps(init: &str, target: &str) -> Result<Vec<MigrationStep>> {
    let position = |name: &str| {
        AVAILABLE_VERSIONS
            .iter()
            .position(|v| *v == name)
            .with_context(|| {
                format!(
                    "Unknown version `{name}` (available: {})",
                    AVAILABLE_VERSIONS.join(", ")
                )
            })
    };
    let from = position(init)?;
    let to = position(target)?;
    if from >= to {
        bail!("Target version {target} must be newer than {init}");
    }

    Ok(AVAILABLE_VERSIONS[from..=to]
        .windows(2)
        .map(|pair| MigrationStep {
            init_version_name: pair[0].to_string(),
            target_version_name: pair[1].to_string(),
        })
        .collect())
}

/// A module directory and its manifest.
#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub path: PathBuf,
    pub manifest_path: PathBuf,
}

/// Direct subdirectories of `directory` that hold a manifest, sorted by
/// name. A non-empty `only` restricts the result to those modules, each of
/// which must exist.
pub fn discover_modules(directory: &Path, only: &[String]) -> Result<Vec<Module>> {
    let entries = fs::read_dir(directory)
        .with_context(|| format!("Failed to read directory {}", directory.display()))?;

    let mut modules = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let Some(manifest_path) = MANIFEST_NAMES
            .iter()
            .map(|name| path.join(name))
            .find(|candidate| candidate.is_file())
        else {
            continue;
        };
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if !only.is_empty() && !only.contains(&name) {
            continue;
        }
        modules.push(Module {
            name,
            path,
            manifest_path,
        });
    }
    modules.sort_by(|a, b| a.name.cmp(&b.name));

    for requested in only {
        if !modules.iter().any(|m| &m.name == requested) {
            bail!(
                "Module `{requested}` not found in {}",
                directory.display()
            );
        }
    }
    Ok(modules)
}

/// Execute a migration run
pub fn execute(args: MigrateArgs) -> Result<()> {
    let steps = migration_steps(&args.init_version_name, &args.target_version_name)?;
    let config = match &args.config {
        Some(path) => MigrateConfig::load(path)?,
        None => MigrateConfig::default(),
    };
    let asset_bundles = AssetBundles::from_config(&config);

    let directory = fs::canonicalize(&args.directory)
        .with_context(|| format!("Directory {} not found", args.directory.display()))?;
    let modules = discover_modules(&directory, &args.modules)?;
    if modules.is_empty() {
        eprintln!("No modules found in {}", directory.display());
        return Ok(());
    }

    eprintln!(
        "Migrating {} module(s) from {} to {}",
        modules.len(),
        args.init_version_name,
        args.target_version_name
    );
    run_scripts(&modules, &steps, &asset_bundles)
}

/// Run every script on every module. A failing module does not stop the
/// others; files it already rewrote stay rewritten.
fn run_scripts(
    modules: &[Module],
    steps: &[MigrationStep],
    asset_bundles: &AssetBundles,
) -> Result<()> {
    let mut has_errors = false;

    for module in modules {
        let spinner = Spinner::start(format!("{}: Migrating", module.name));
        let tools = Tools::new();
        let ctx = MigrateContext {
            module_path: &module.path,
            module_name: &module.name,
            manifest_path: &module.manifest_path,
            migration_steps: steps,
            tools: &tools,
            asset_bundles,
        };

        match migrate_module(&ctx, &spinner) {
            Ok(()) if tools.writes() > 0 => {
                spinner.success(module.name.green().bold().to_string());
            }
            Ok(()) => {
                spinner.finish();
                eprintln!("{} {} (unchanged)", icons::skipped(), module.name);
            }
            Err(e) => {
                spinner.error(format!("{}: {e:#}", module.name));
                has_errors = true;
            }
        }
    }

    if has_errors {
        bail!("Migration failed with errors");
    }
    Ok(())
}

fn migrate_module(ctx: &MigrateContext, spinner: &Spinner) -> Result<()> {
    let scripts = ctx
        .migration_steps
        .iter()
        .flat_map(scripts::for_step)
        .chain(scripts::always());

    for script in scripts {
        spinner.set_message(format!("{}: {}", ctx.module_name, script.name()));
        debug!("Running {} on {}", script.name(), ctx.module_name);
        script
            .apply(ctx)
            .with_context(|| format!("{} failed", script.name()))?;
    }
    Ok(())
}
