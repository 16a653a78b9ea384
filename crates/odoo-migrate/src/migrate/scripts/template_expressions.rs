use anyhow::Result;
use log::info;
use regex::Regex;

use super::{MigrateContext, MigrationScript};
use crate::file_walker;

/// `${expr}` and `${expr | safe}`; group 1 is the expression.
const INTERPOLATION: &str = r"\$\{\s*([^}|]*?)\s*(?:\|\s*safe\s*)?\}";

/// Output directives merged into `t-out`.
const OUTPUT_DIRECTIVES: &[&str] = &["t-raw", "t-esc"];

/// Rewrite legacy QWeb syntax in every view of the module: `${...}`
/// interpolation becomes `{{ ... }}`, `t-raw` and `t-esc` become `t-out`.
/// Works on raw text, so it also applies outside well-formed XML.
pub struct MigrateTemplateExpressions;

impl MigrationScript for MigrateTemplateExpressions {
    fn name(&self) -> &'static str {
        "migrate-template-expressions"
    }

    fn apply(&self, ctx: &MigrateContext) -> Result<()> {
        let interpolation = Regex::new(INTERPOLATION)?;

        for path in file_walker::collect_files_with_extension(ctx.module_path, "xml")? {
            let content = ctx.tools.read_content(&path)?;
            let display = path.strip_prefix(ctx.module_path).unwrap_or(&path).display();

            let expressions: Vec<&str> = interpolation
                .find_iter(&content)
                .map(|m| m.as_str())
                .collect();
            if !expressions.is_empty() {
                info!("{display}: converting {expressions:?}");
                ctx.tools.replace_in_file(
                    &path,
                    &[(INTERPOLATION, "{{ ${1} }}")],
                    "Convert ${...} to {{ ... }}",
                )?;
            }

            for directive in OUTPUT_DIRECTIVES {
                let count = content.matches(directive).count();
                if count == 0 {
                    continue;
                }
                info!("{display}: replacing {count} {directive}");
                let pattern = regex::escape(directive);
                ctx.tools.replace_in_file(
                    &path,
                    &[(pattern.as_str(), "t-out")],
                    &format!("Replace {directive} with t-out"),
                )?;
            }
        }
        Ok(())
    }
}
