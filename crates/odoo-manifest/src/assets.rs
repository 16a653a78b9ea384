use crate::ManifestValue;

/// Asset files per bundle, both kept in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assets {
    bundles: Vec<(String, Vec<ManifestValue>)>,
}

impl Assets {
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Append a file path to `bundle`, creating the bundle on first use.
    pub fn push(&mut self, bundle: &str, path: impl Into<String>) {
        self.push_value(bundle, ManifestValue::Str(path.into()));
    }

    /// Append a raw entry (a path or a directive tuple) to `bundle`. An entry
    /// the bundle already lists is not added twice.
    pub fn push_value(&mut self, bundle: &str, entry: ManifestValue) {
        match self.bundles.iter_mut().find(|(name, _)| name == bundle) {
            Some((_, entries)) if entries.contains(&entry) => {}
            Some((_, entries)) => entries.push(entry),
            None => self.bundles.push((bundle.to_owned(), vec![entry])),
        }
    }

    pub fn bundles(&self) -> impl Iterator<Item = (&str, &[ManifestValue])> {
        self.bundles
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.as_slice()))
    }

    pub fn bundle_names(&self) -> impl Iterator<Item = &str> {
        self.bundles.iter().map(|(name, _)| name.as_str())
    }

    /// Plain file paths declared for `bundle`.
    pub fn files(&self, bundle: &str) -> Vec<&str> {
        self.bundles
            .iter()
            .find(|(name, _)| name == bundle)
            .map(|(_, entries)| entries.iter().filter_map(ManifestValue::as_str).collect())
            .unwrap_or_default()
    }

    /// Root every plain path at `/<module_name>/` unless it already names the module.
    pub fn rooted_at(self, module_name: &str) -> Self {
        let bundles = self
            .bundles
            .into_iter()
            .map(|(bundle, entries)| {
                let entries = entries
                    .into_iter()
                    .map(|entry| match entry {
                        ManifestValue::Str(path) => {
                            ManifestValue::Str(root_path(&path, module_name))
                        }
                        other => other,
                    })
                    .collect();
                (bundle, entries)
            })
            .collect();
        Self { bundles }
    }

    pub fn to_value(&self) -> ManifestValue {
        ManifestValue::Dict(
            self.bundles
                .iter()
                .map(|(bundle, entries)| (bundle.clone(), ManifestValue::List(entries.clone())))
                .collect(),
        )
    }
}

fn root_path(path: &str, module_name: &str) -> String {
    let relative = path.trim_start_matches('/');
    let names_module = relative
        .strip_prefix(module_name)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));
    if names_module {
        path.to_owned()
    } else {
        format!("/{module_name}/{relative}")
    }
}
