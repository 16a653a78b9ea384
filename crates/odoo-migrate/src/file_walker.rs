use anyhow::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Walk `root` and process files with the given extension with a callback
///
/// - Always recursive traversal
/// - Skips hidden entries
/// - Respects git ignore patterns
pub fn walk_files_with_extension<F>(root: &Path, extension: &str, mut processor: F) -> Result<usize>
where
    F: FnMut(&Path) -> Result<()>,
{
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_exclude(true)
        .git_global(false)
        .parents(false);

    let mut found_files = 0;
    for result in builder.build() {
        let entry = result?;
        let path = entry.path();
        if entry.file_type().is_some_and(|ft| ft.is_file())
            && path.extension().is_some_and(|ext| ext == extension)
        {
            processor(path)?;
            found_files += 1;
        }
    }
    Ok(found_files)
}

/// Collect matching file paths, sorted for deterministic processing.
pub fn collect_files_with_extension(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk_files_with_extension(root, extension, |path| {
        files.push(path.to_path_buf());
        Ok(())
    })?;
    files.sort();
    Ok(files)
}
