//! Move asset declarations out of inherited bundle templates and into the
//! manifest's `assets` mapping.
//!
//! Before 15.0 a module added files to a bundle with a view like
//!
//! ```xml
//! <template id="assets_backend" inherit_id="web.assets_backend">
//!   <xpath expr="." position="inside">
//!     <script type="text/javascript" src="/my_module/static/src/js/widget.js"/>
//!   </xpath>
//! </template>
//! ```
//!
//! From 15.0 on the same file is listed under `assets` in the manifest.

use anyhow::{Context, Result};
use log::{debug, info};
use odoo_manifest::{Assets, patch_manifest};
use odoo_xml::{Document, Element};

use super::{MigrateContext, MigrationScript};
use crate::config::AssetBundles;

/// Bundle that legacy `qweb` manifest entries belong to.
const QWEB_BUNDLE: &str = "web.assets_qweb";

pub struct ReformatAssetsDefinition;

impl MigrationScript for ReformatAssetsDefinition {
    fn name(&self) -> &'static str {
        "reformat-assets-definition"
    }

    fn apply(&self, ctx: &MigrateContext) -> Result<()> {
        let manifest = ctx.tools.manifest_dict(ctx.manifest_path)?;
        let declared_data = manifest.data_files();
        let mut data = declared_data.clone();
        let mut assets = Assets::default();

        for file_path in declared_data.iter().filter(|p| p.ends_with(".xml")) {
            let path = ctx.module_path.join(file_path);
            let source = ctx.tools.read_content(&path)?;
            let mut document = Document::parse(&source)
                .with_context(|| format!("Failed to parse {}", path.display()))?;

            let removed =
                extract_bundle_assets(document.root_mut(), ctx.asset_bundles, &mut assets);
            if removed > 0 && !document.root().has_element_children() {
                info!("Removing {file_path}, it only declared assets");
                ctx.tools.remove_file(&path)?;
                data.retain(|p| p != file_path);
                continue;
            }

            let rewritten = document.to_xml_string();
            if rewritten != source {
                ctx.tools.write_content(&path, &rewritten)?;
            }
        }

        let qweb = manifest.string_list("qweb");
        for file in &qweb {
            assets.push(QWEB_BUNDLE, file.as_str());
        }
        let assets = assets.rooted_at(ctx.module_name);

        let source = ctx.tools.read_content(ctx.manifest_path)?;
        let drop_qweb = manifest.contains_key("qweb");
        let patched = patch_manifest(&source, &assets, Some(data.as_slice()), drop_qweb)
            .with_context(|| format!("Failed to update {}", ctx.manifest_path.display()))?;
        if patched != source {
            ctx.tools.write_content(ctx.manifest_path, &patched)?;
        }
        Ok(())
    }
}

/// Value of the attribute naming the asset file, `src` before `href`.
fn asset_reference(leaf: &Element) -> Option<String> {
    ["src", "href"]
        .into_iter()
        .filter_map(|name| leaf.attribute(name))
        .find(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Collect the asset files declared by bundle-inheriting views under `root`
/// and delete what becomes empty: each asset element, then its `xpath`,
/// then the view itself. Asset elements with element children are left in
/// place and not collected. Returns the number of removed elements.
fn extract_bundle_assets(
    root: &mut Element,
    bundles: &AssetBundles,
    assets: &mut Assets,
) -> usize {
    let mut removed = 0;
    let removed_views = root.retain_elements(|view| {
        let Some(bundle) = view
            .attribute("inherit_id")
            .filter(|id| bundles.contains(id))
            .map(str::to_owned)
        else {
            return true;
        };

        let removed_xpaths = view.retain_elements(|xpath| {
            if xpath.name() != "xpath" || xpath.attribute("expr").is_none() {
                return true;
            }
            let removed_leaves = xpath.retain_elements(|leaf| {
                if leaf.has_element_children() {
                    return true;
                }
                let Some(path) = asset_reference(leaf) else {
                    return true;
                };
                debug!("Moving {path} to {bundle}");
                assets.push(&bundle, path);
                false
            });
            removed += removed_leaves;
            xpath.has_element_children()
        });
        removed += removed_xpaths;
        view.has_element_children()
    });
    removed + removed_views
}
