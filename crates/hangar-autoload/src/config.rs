//! Auto-loader configuration

use std::path::Path;

/// Auto-loader configuration.
#[derive(Debug, Clone)]
pub struct AutoloadConfig {
    /// File extensions recognized as module archives (matched
    /// case-insensitively, without the leading dot).
    pub archive_extensions: Vec<String>,
    /// Capacity of the change-event channel between the watcher callback
    /// and the event loop.
    pub event_capacity: usize,
}

impl Default for AutoloadConfig {
    fn default() -> Self {
        Self {
            archive_extensions: vec!["jar".to_string()],
            event_capacity: 1024,
        }
    }
}

impl AutoloadConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an archive extension (without the leading dot).
    pub fn with_extension(mut self, ext: &str) -> Self {
        self.archive_extensions.push(ext.to_string());
        self
    }

    /// Replace the archive extension set.
    pub fn with_extensions(mut self, exts: Vec<String>) -> Self {
        self.archive_extensions = exts;
        self
    }

    /// Set the change-event channel capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Check whether a path names a module archive.
    ///
    /// Directories, extension-less files, and unknown extensions are not
    /// archives; the loader ignores them entirely.
    pub fn is_archive(&self, path: &Path) -> bool {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(e) => e,
            None => return false,
        };
        self.archive_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_config_default() {
        let config = AutoloadConfig::default();
        assert_eq!(config.archive_extensions, vec!["jar".to_string()]);
        assert_eq!(config.event_capacity, 1024);
    }

    #[test]
    fn test_is_archive() {
        let config = AutoloadConfig::default();

        assert!(config.is_archive(Path::new("/deploy/feature.jar")));
        assert!(config.is_archive(Path::new("/deploy/FEATURE.JAR")));

        assert!(!config.is_archive(Path::new("/deploy/notes.txt")));
        assert!(!config.is_archive(Path::new("/deploy/feature.jar.part")));
        assert!(!config.is_archive(Path::new("/deploy/no_extension")));
    }

    #[test]
    fn test_with_extension_extends_the_set() {
        let config = AutoloadConfig::new().with_extension("war");

        assert!(config.is_archive(Path::new("app.war")));
        assert!(config.is_archive(Path::new("app.jar")));
        assert!(!config.is_archive(Path::new("app.zip")));
    }

    #[test]
    fn test_with_extensions_replaces_the_set() {
        let config = AutoloadConfig::new().with_extensions(vec!["so".to_string()]);

        assert!(config.is_archive(Path::new("mod.so")));
        assert!(!config.is_archive(Path::new("mod.jar")));
    }
}
