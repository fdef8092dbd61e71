//! Resource stores the bridge extracts scripts and support files from

use crate::error::{Error, Result};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::PathBuf;

/// Looks up a named resource inside an origin
pub trait ResourceStore {
    /// Open `locator` from `origin` as a byte stream
    fn open(&self, origin: &str, locator: &str) -> Result<Box<dyn Read + '_>>;
}

/// Resources compiled into the test binary
///
/// ```
/// use scriptbridge_rs::EmbeddedStore;
///
/// const MATH: &[u8] = b"print('1 tests, 1 assertions, 0 failures, 0 errors')";
///
/// let store = EmbeddedStore::new().resource("assets", "tests/math.js", MATH);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EmbeddedStore {
    resources: HashMap<(String, String), Cow<'static, [u8]>>,
}

impl EmbeddedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a static resource, typically from `include_bytes!`
    pub fn resource(mut self, origin: &str, locator: &str, bytes: &'static [u8]) -> Self {
        self.insert(origin, locator, Cow::Borrowed(bytes));
        self
    }

    /// Register an owned resource
    pub fn insert(&mut self, origin: &str, locator: &str, bytes: impl Into<Cow<'static, [u8]>>) {
        self.resources
            .insert((origin.to_string(), normalize_locator(locator)), bytes.into());
    }
}

impl ResourceStore for EmbeddedStore {
    fn open(&self, origin: &str, locator: &str) -> Result<Box<dyn Read + '_>> {
        let key = (origin.to_string(), normalize_locator(locator));
        match self.resources.get(&key) {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.as_ref()))),
            None => Err(Error::extraction(
                locator,
                format!("not found in origin '{}'", origin),
            )),
        }
    }
}

/// Resources read from directories on disk, one directory per origin
#[derive(Debug, Clone, Default)]
pub struct DirStore {
    origins: HashMap<String, PathBuf>,
}

impl DirStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map an origin name to a directory
    pub fn origin(mut self, name: &str, dir: impl Into<PathBuf>) -> Self {
        self.origins.insert(name.to_string(), dir.into());
        self
    }
}

impl ResourceStore for DirStore {
    fn open(&self, origin: &str, locator: &str) -> Result<Box<dyn Read + '_>> {
        let root = self
            .origins
            .get(origin)
            .ok_or_else(|| Error::extraction(locator, format!("unknown origin '{}'", origin)))?;
        let path = root.join(normalize_locator(locator));
        let file = File::open(&path).map_err(|e| {
            Error::extraction(
                locator,
                format!("cannot open '{}' in origin '{}': {}", path.display(), origin, e),
            )
        })?;
        Ok(Box::new(file))
    }
}

/// Locators use `/` separators; a leading `./` or `/` is ignored
fn normalize_locator(locator: &str) -> String {
    let unified = locator.trim().replace('\\', "/");
    unified
        .trim_start_matches("./")
        .trim_start_matches('/')
        .to_string()
}
