use crate::{CYCLE_NEXT, CYCLE_NEXT_LUA, Error, Result};
use std::{borrow::Cow, fs, path::PathBuf};

/// A named script body to run atomically inside the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    name: Cow<'static, str>,
    body: Cow<'static, str>,
}

impl Script {
    /// A script compiled into the binary.
    pub const fn bundled(name: &'static str, body: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            body: Cow::Borrowed(body),
        }
    }

    /// A script supplied at runtime.
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            body: Cow::Owned(body.into()),
        }
    }

    /// The bundled cycle-advance script.
    pub const fn cycle_next() -> Self {
        Self::bundled(CYCLE_NEXT, CYCLE_NEXT_LUA)
    }

    /// Looks up `config.name` among the bundled scripts, falling back to
    /// reading `config.fallback_path`.
    ///
    /// # Errors
    /// - [`Error::ScriptNotFound`] if the name is unknown and no fallback path
    ///   is configured
    /// - [`Error::ScriptLoad`] if reading the fallback file fails
    pub fn resolve(config: &ScriptConfig) -> Result<Self> {
        if let Some(script) = Self::find_bundled(&config.name) {
            return Ok(script);
        }

        let Some(path) = &config.fallback_path else {
            return Err(Error::ScriptNotFound {
                name: config.name.clone(),
            });
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(name = %config.name, path = %path.display(), "loading script from file");

        let body = fs::read_to_string(path).map_err(|source| Error::ScriptLoad {
            name: config.name.clone(),
            path: path.clone(),
            source,
        })?;
        Ok(Self::new(config.name.clone(), body))
    }

    fn find_bundled(name: &str) -> Option<Self> {
        match name {
            CYCLE_NEXT => Some(Self::cycle_next()),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Where to find a script: a logical name, and a file to read when the name
/// is not bundled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptConfig {
    pub name: String,
    pub fallback_path: Option<PathBuf>,
}

impl ScriptConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fallback_path: None,
        }
    }

    /// Configuration of the bundled cycle-advance script.
    pub fn cycle() -> Self {
        Self::new(CYCLE_NEXT)
    }

    pub fn with_fallback_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.fallback_path = Some(path.into());
        self
    }
}
