use anyhow::Result;
use std::path::Path;

pub mod assets_definition;
pub mod bump_version;
pub mod template_expressions;

use super::MigrationStep;
use crate::config::AssetBundles;
use crate::tools::Tools;
use assets_definition::ReformatAssetsDefinition;
use bump_version::BumpVersion;
use template_expressions::MigrateTemplateExpressions;

/// Context passed to every script while migrating one module
pub struct MigrateContext<'a> {
    /// Absolute path to the module directory
    pub module_path: &'a Path,
    pub module_name: &'a str,
    pub manifest_path: &'a Path,
    /// Every hop of the run, even when the script belongs to only one of them
    pub migration_steps: &'a [MigrationStep],
    pub tools: &'a Tools,
    pub asset_bundles: &'a AssetBundles,
}

pub trait MigrationScript {
    fn name(&self) -> &'static str;
    fn apply(&self, ctx: &MigrateContext) -> Result<()>;
}

/// Scripts for one version hop, in the order they run.
pub fn for_step(step: &MigrationStep) -> Vec<Box<dyn MigrationScript>> {
    match (step.init_version_name.as_str(), step.target_version_name.as_str()) {
        ("14.0", "15.0") => vec![
            Box::new(ReformatAssetsDefinition),
            Box::new(MigrateTemplateExpressions),
        ],
        _ => Vec::new(),
    }
}

/// Scripts that run once per module after every hop.
pub fn always() -> Vec<Box<dyn MigrationScript>> {
    vec![Box::new(BumpVersion)]
}
