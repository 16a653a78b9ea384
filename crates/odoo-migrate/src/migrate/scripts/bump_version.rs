use anyhow::{Context, Result};

use super::{MigrateContext, MigrationScript};

/// The manifest `version` entry, capturing the quote used around the key.
const VERSION_ENTRY: &str = r#"(?P<lq>'|")version(?P<rq>'|").*('|").*('|")"#;

/// Set the manifest version to `<target>.1.0.0`.
pub struct BumpVersion;

impl MigrationScript for BumpVersion {
    fn name(&self) -> &'static str {
        "bump-version"
    }

    fn apply(&self, ctx: &MigrateContext) -> Result<()> {
        let target = &ctx
            .migration_steps
            .last()
            .context("No migration step to take the target version from")?
            .target_version_name;
        let version = format!("{target}.1.0.0");
        let replacement = format!("${{lq}}version${{rq}}: ${{lq}}{version}${{rq}}");

        ctx.tools.replace_in_file(
            ctx.manifest_path,
            &[(VERSION_ENTRY, replacement.as_str())],
            &format!("Bump version to {version}"),
        )?;
        Ok(())
    }
}
