use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Templates that define the asset bundles shipped with Odoo 14.0.
pub const DEFAULT_ASSET_BUNDLES: &[&str] = &[
    "mass_mailing.assets_backend",
    "mass_mailing.assets_mail_themes",
    "mass_mailing.assets_mail_themes_edition",
    "mrp.assets_common",
    "point_of_sale.assets",
    "point_of_sale.pos_assets_backend",
    "snailmail.report_assets_snailmail",
    "stock.assets_stock_print_report",
    "survey.survey_assets",
    "survey.survey_user_input_session_assets",
    "web.assets_backend",
    "web.assets_backend_prod_only",
    "web.assets_common",
    "web.assets_common_lazy",
    "web.assets_common_minimal_js",
    "web.assets_frontend",
    "web.assets_frontend_lazy",
    "web.assets_frontend_minimal_js",
    "web.assets_qweb",
    "web.assets_tests",
    "web.pdf_js_lib",
    "web.qunit_mobile_suite_tests",
    "web.qunit_suite_tests",
    "web.report_assets_common",
    "web.report_assets_pdf",
    "web.tests_assets",
    "website.assets_frontend",
    "website.assets_editor",
    "website.assets_frontend_editor",
    "website.assets_wysiwyg",
    "website_slides.slide_embed_assets",
    "website.test_bundle",
    "web_editor.assets_summernote",
    "web_editor.assets_wysiwyg",
    "web_enterprise.assets_backend",
    "web_enterprise.assets_common",
    "web_enterprise._assets_backend_helpers",
];

/// Optional `--config` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigrateConfig {
    /// Bundle template ids recognized in addition to the built-in ones.
    pub extra_asset_bundles: Vec<String>,
}

impl MigrateConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }
}

/// Template ids whose inheriting views declare bundle assets.
#[derive(Debug, Clone)]
pub struct AssetBundles {
    ids: BTreeSet<String>,
}

impl Default for AssetBundles {
    fn default() -> Self {
        Self {
            ids: DEFAULT_ASSET_BUNDLES.iter().map(|id| id.to_string()).collect(),
        }
    }
}

impl AssetBundles {
    pub fn from_config(config: &MigrateConfig) -> Self {
        let mut bundles = Self::default();
        bundles.ids.extend(config.extra_asset_bundles.iter().cloned());
        bundles
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_bundles_extend_defaults() -> Result<()> {
        let config: MigrateConfig =
            toml::from_str(r#"extra_asset_bundles = ["my_theme.assets_frontend"]"#)?;
        let bundles = AssetBundles::from_config(&config);
        assert!(bundles.contains("my_theme.assets_frontend"));
        assert!(bundles.contains("web.assets_backend"));
        assert!(!bundles.contains("web.layout"));
        Ok(())
    }

    #[test]
    fn test_unknown_config_key_rejected() {
        assert!(toml::from_str::<MigrateConfig>("asset_bundles = []").is_err());
    }

    #[test]
    fn test_empty_config() -> Result<()> {
        let config: MigrateConfig = toml::from_str("")?;
        assert!(config.extra_asset_bundles.is_empty());
        Ok(())
    }
}
