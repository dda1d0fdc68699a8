//! Load `.qindexer.toml` from a directory (CLI only). Library callers build [`Settings`] themselves.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::Settings;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    db_path: Option<String>,
    enable_async_indexing: Option<bool>,
    index_all_workspaces: Option<bool>,
    batch_size: Option<usize>,
    index_name_postfix: Option<String>,
    queue_name: Option<String>,
    #[serde(default)]
    bulk: BulkSection,
}

#[derive(Debug, Default, Deserialize)]
struct BulkSection {
    elements: Option<usize>,
    octets: Option<usize>,
}

impl SettingsFile {
    /// Database path from the file, if set.
    pub fn db_path(&self) -> Option<PathBuf> {
        self.settings.db_path.as_ref().map(PathBuf::from)
    }
}

/// Load the settings file from `dir` if present. Returns None if missing or unreadable.
pub fn load_settings_file(dir: &Path) -> Option<SettingsFile> {
    let path = dir.join(PackagePaths::get().settings_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    toml::from_str(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

/// Overwrite settings field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $settings:expr, $file_field:ident => $($settings_field:ident).+) => {
        if let Some(ref v) = $section.$file_field {
            $settings.$($settings_field).+ = v.clone();
        }
    };
}

/// Apply file values to `settings` (only fields present in the file). Call before applying CLI flags.
pub fn apply_file_to_settings(file: &SettingsFile, settings: &mut Settings) {
    let s = &file.settings;
    apply_file_opt!(s, settings, enable_async_indexing => enable_async_indexing);
    apply_file_opt!(s, settings, index_all_workspaces => index_all_workspaces);
    apply_file_opt!(s, settings, batch_size => queue_batch_size);
    apply_file_opt!(s, settings, index_name_postfix => index_name_postfix);
    apply_file_opt!(s, settings, queue_name => queue_name);
    apply_file_opt!(s.bulk, settings, elements => bulk.elements);
    apply_file_opt!(s.bulk, settings, octets => bulk.octets);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_partial_file() {
        let file: SettingsFile = toml::from_str(
            r#"
            [settings]
            batch_size = 25
            index_all_workspaces = true

            [settings.bulk]
            octets = 1024
            "#,
        )
        .unwrap();
        let mut settings = Settings::default();
        apply_file_to_settings(&file, &mut settings);
        assert_eq!(settings.queue_batch_size, 25);
        assert!(settings.index_all_workspaces);
        assert!(settings.enable_async_indexing);
        assert_eq!(settings.bulk.octets, 1024);
        assert_eq!(settings.bulk.elements, Settings::default().bulk.elements);
        assert_eq!(file.db_path(), None);
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        let file: SettingsFile = toml::from_str("").unwrap();
        let mut settings = Settings::default();
        apply_file_to_settings(&file, &mut settings);
        assert_eq!(settings, Settings::default());
    }
}
