use std::cell::Cell;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use odoo_manifest::ManifestDict;
use regex::Regex;

/// File helpers shared by every migration script.
///
/// All writes go through here so the run loop can tell whether a module was
/// touched.
#[derive(Debug, Default)]
pub struct Tools {
    writes: Cell<usize>,
}

impl Tools {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files written or removed so far.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn read_content(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }

    pub fn manifest_dict(&self, path: &Path) -> Result<ManifestDict> {
        let source = self.read_content(path)?;
        ManifestDict::parse(&source)
            .with_context(|| format!("Failed to read manifest {}", path.display()))
    }

    pub fn write_content(&self, path: &Path, content: &str) -> Result<()> {
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        self.writes.set(self.writes.get() + 1);
        debug!("Wrote {}", path.display());
        Ok(())
    }

    pub fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
        self.writes.set(self.writes.get() + 1);
        debug!("Removed {}", path.display());
        Ok(())
    }

    /// Apply regex replacements in order and write the file back if anything
    /// changed. Replacements use `regex` syntax (`${name}` for named groups).
    pub fn replace_in_file(
        &self,
        path: &Path,
        replacements: &[(&str, &str)],
        description: &str,
    ) -> Result<bool> {
        let original = self.read_content(path)?;
        let mut content = original.clone();
        for (pattern, replacement) in replacements {
            let re = Regex::new(pattern).with_context(|| format!("Invalid pattern `{pattern}`"))?;
            content = re.replace_all(&content, *replacement).into_owned();
        }

        if content == original {
            return Ok(false);
        }
        self.write_content(path, &content)?;
        info!("{description}: {}", path.display());
        Ok(true)
    }
}
