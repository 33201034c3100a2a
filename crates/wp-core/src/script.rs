//! Change scripts and their execution options.
//!
//! A [`Script`] is a named source of SQL text. Content is produced lazily by
//! the script's provider the first time it is asked for and cached for the
//! lifetime of the script, so providers are invoked at most once.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// How often a script is allowed to run against a target store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunPolicy {
    /// Apply at most once (default)
    #[default]
    RunOnce,
    /// Apply on every upgrade
    RunAlways,
    /// Apply whenever the content differs from the last applied content
    RunIfChanged,
}

impl RunPolicy {
    /// Tag stored in the journal's `script_type` column
    pub fn as_tag(&self) -> &'static str {
        match self {
            RunPolicy::RunOnce => "RunOnce",
            RunPolicy::RunAlways => "RunAlways",
            RunPolicy::RunIfChanged => "RunIfChanged",
        }
    }

    /// Parse a journal tag back into a policy
    pub fn from_tag(tag: &str) -> CoreResult<Self> {
        match tag {
            "RunOnce" => Ok(RunPolicy::RunOnce),
            "RunAlways" => Ok(RunPolicy::RunAlways),
            "RunIfChanged" => Ok(RunPolicy::RunIfChanged),
            other => Err(CoreError::UnknownRunPolicy {
                tag: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for RunPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for RunPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

/// Execution options attached to a script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScriptOptions {
    /// Run policy
    #[serde(default)]
    pub run_policy: RunPolicy,

    /// Primary sort key; lower groups run first
    #[serde(default)]
    pub run_group_order: i32,
}

impl ScriptOptions {
    /// Create options with the given policy and run group
    pub fn new(run_policy: RunPolicy, run_group_order: i32) -> Self {
        Self {
            run_policy,
            run_group_order,
        }
    }
}

type TextProvider = Box<dyn Fn() -> std::io::Result<String>>;
type StreamProvider = Box<dyn Fn() -> std::io::Result<Box<dyn Read>>>;

enum ContentSource {
    Text(String),
    Provider(TextProvider),
    Stream(StreamProvider),
}

/// A named unit of change to apply to the target store
pub struct Script {
    name: String,
    source: ContentSource,
    options: ScriptOptions,
    contents: OnceCell<String>,
}

impl Script {
    /// Create a script from in-memory text
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> CoreResult<Self> {
        Self::build(name.into(), ContentSource::Text(contents.into()))
    }

    /// Create a script whose text is produced by `provider` on first use
    pub fn lazy<F>(name: impl Into<String>, provider: F) -> CoreResult<Self>
    where
        F: Fn() -> std::io::Result<String> + 'static,
    {
        Self::build(name.into(), ContentSource::Provider(Box::new(provider)))
    }

    /// Create a script backed by a byte stream opened on demand.
    ///
    /// The stream is decoded as UTF-8; a leading byte-order mark is dropped.
    pub fn from_stream<F, R>(name: impl Into<String>, open: F) -> CoreResult<Self>
    where
        F: Fn() -> std::io::Result<R> + 'static,
        R: Read + 'static,
    {
        let open: StreamProvider = Box::new(move || open().map(|r| Box::new(r) as Box<dyn Read>));
        Self::build(name.into(), ContentSource::Stream(open))
    }

    /// Create a script from a file below `base`.
    ///
    /// The script name is the path relative to `base` with directory
    /// separators replaced by `.`, e.g. `sub/001_init.sql` becomes
    /// `sub.001_init.sql`.
    pub fn from_file(base: &Path, path: &Path) -> CoreResult<Self> {
        let relative = path
            .strip_prefix(base)
            .map_err(|_| CoreError::PathOutsideBase {
                base: base.display().to_string(),
                path: path.display().to_string(),
            })?;

        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(".");

        let owned = path.to_path_buf();
        Self::from_stream(name, move || std::fs::File::open(&owned))
    }

    fn build(name: String, source: ContentSource) -> CoreResult<Self> {
        if name.is_empty() {
            return Err(CoreError::EmptyScriptName);
        }
        Ok(Self {
            name,
            source,
            options: ScriptOptions::default(),
            contents: OnceCell::new(),
        })
    }

    /// Replace the execution options
    pub fn with_options(mut self, options: ScriptOptions) -> Self {
        self.options = options;
        self
    }

    /// Script name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execution options
    pub fn options(&self) -> ScriptOptions {
        self.options
    }

    /// Raw (unprocessed) text of the script, loaded once and cached
    pub fn contents(&self) -> CoreResult<&str> {
        if let Some(cached) = self.contents.get() {
            return Ok(cached);
        }
        let loaded = self.load()?;
        Ok(self.contents.get_or_init(|| loaded))
    }

    fn load(&self) -> CoreResult<String> {
        match &self.source {
            ContentSource::Text(text) => Ok(text.clone()),
            ContentSource::Provider(provider) => provider().map_err(|e| self.content_error(e)),
            ContentSource::Stream(open) => {
                let mut bytes = Vec::new();
                open()
                    .and_then(|mut reader| reader.read_to_end(&mut bytes))
                    .map_err(|e| self.content_error(e))?;
                decode_utf8(&self.name, bytes)
            }
        }
    }

    fn content_error(&self, source: std::io::Error) -> CoreError {
        CoreError::ScriptContent {
            name: self.name.clone(),
            source,
        }
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Script")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

fn decode_utf8(name: &str, mut bytes: Vec<u8>) -> CoreResult<String> {
    if bytes.starts_with(UTF8_BOM) {
        bytes.drain(..UTF8_BOM.len());
    }
    String::from_utf8(bytes).map_err(|e| CoreError::ScriptEncoding {
        name: name.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
#[path = "script_test.rs"]
mod tests;
