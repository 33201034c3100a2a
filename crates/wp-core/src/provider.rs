//! Script providers: where change scripts come from.

use crate::error::{CoreError, CoreResult};
use crate::script::{Script, ScriptOptions};
use std::path::{Path, PathBuf};

/// Source of change scripts.
///
/// Providers are asked for scripts on every engine operation and must
/// return fresh [`Script`] values each time.
pub trait ScriptProvider {
    /// Discover scripts
    fn get_scripts(&self) -> CoreResult<Vec<Script>>;
}

impl<F> ScriptProvider for F
where
    F: Fn() -> CoreResult<Vec<Script>>,
{
    fn get_scripts(&self) -> CoreResult<Vec<Script>> {
        self()
    }
}

/// Provider over a fixed, in-memory set of scripts
#[derive(Debug, Clone, Default)]
pub struct StaticScriptProvider {
    scripts: Vec<(String, String, ScriptOptions)>,
}

impl StaticScriptProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a script with default options
    pub fn with_script(self, name: impl Into<String>, contents: impl Into<String>) -> Self {
        self.with_script_options(name, contents, ScriptOptions::default())
    }

    /// Add a script with explicit options
    pub fn with_script_options(
        mut self,
        name: impl Into<String>,
        contents: impl Into<String>,
        options: ScriptOptions,
    ) -> Self {
        self.scripts.push((name.into(), contents.into(), options));
        self
    }
}

impl ScriptProvider for StaticScriptProvider {
    fn get_scripts(&self) -> CoreResult<Vec<Script>> {
        self.scripts
            .iter()
            .map(|(name, contents, options)| {
                Script::new(name.clone(), contents.clone()).map(|s| s.with_options(*options))
            })
            .collect()
    }
}

/// Provider that discovers script files in a directory
#[derive(Debug, Clone)]
pub struct FileSystemScriptProvider {
    root: PathBuf,
    recursive: bool,
    extension: Option<String>,
    options: ScriptOptions,
}

impl FileSystemScriptProvider {
    /// Discover `*.sql` files directly inside `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            recursive: false,
            extension: Some("sql".to_string()),
            options: ScriptOptions::default(),
        }
    }

    /// Also descend into subdirectories
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Only pick up files with this extension (`None` accepts every file)
    pub fn extension(mut self, extension: Option<String>) -> Self {
        self.extension = extension;
        self
    }

    /// Options applied to every discovered script
    pub fn options(mut self, options: ScriptOptions) -> Self {
        self.options = options;
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        match &self.extension {
            Some(ext) => path
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case(ext.as_str())),
            None => true,
        }
    }

    fn collect(&self, dir: &Path, files: &mut Vec<PathBuf>) -> CoreResult<()> {
        let entries = std::fs::read_dir(dir).map_err(|e| CoreError::ScriptDirectory {
            path: dir.display().to_string(),
            source: e,
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| CoreError::ScriptDirectory {
                path: dir.display().to_string(),
                source: e,
            })?;
            let path = entry.path();

            if path.is_dir() {
                if self.recursive {
                    self.collect(&path, files)?;
                }
            } else if self.accepts(&path) {
                files.push(path);
            }
        }
        Ok(())
    }
}

impl ScriptProvider for FileSystemScriptProvider {
    fn get_scripts(&self) -> CoreResult<Vec<Script>> {
        let mut files = Vec::new();
        self.collect(&self.root, &mut files)?;
        files.sort();

        log::debug!(
            "Discovered {} script file(s) in {}",
            files.len(),
            self.root.display()
        );

        files
            .iter()
            .map(|path| Script::from_file(&self.root, path).map(|s| s.with_options(self.options)))
            .collect()
    }
}

#[cfg(test)]
#[path = "provider_test.rs"]
mod tests;
