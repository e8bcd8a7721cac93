//! Supported-language catalog
//!
//! Explicit cached state for the backend's runtime list: populated once
//! at startup from `GET /runtimes`, refreshable on demand, and
//! constructible from fixed data in tests. Lookups accept both primary
//! language names and backend aliases.

use std::collections::HashSet;

use piston_types::Runtime;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::Result;
use crate::piston::PistonClient;

/// File extensions for attachment naming. Languages not listed fall
/// back to `txt`.
const EXTENSIONS: &[(&str, &str)] = &[
    ("bash", "sh"),
    ("c", "c"),
    ("c++", "cpp"),
    ("csharp", "cs"),
    ("elixir", "ex"),
    ("go", "go"),
    ("haskell", "hs"),
    ("java", "java"),
    ("javascript", "js"),
    ("kotlin", "kt"),
    ("lua", "lua"),
    ("perl", "pl"),
    ("php", "php"),
    ("python", "py"),
    ("ruby", "rb"),
    ("rust", "rs"),
    ("scala", "scala"),
    ("swift", "swift"),
    ("typescript", "ts"),
    ("zig", "zig"),
];

/// File extension for a language, falling back to `txt`.
pub fn extension(language: &str) -> &'static str {
    EXTENSIONS
        .iter()
        .find(|(lang, _)| *lang == language)
        .map_or("txt", |(_, ext)| *ext)
}

#[derive(Debug, Default)]
struct CatalogState {
    languages: HashSet<String>,
    aliases: HashSet<String>,
}

fn build_state(runtimes: &[Runtime]) -> CatalogState {
    let mut state = CatalogState::default();
    for runtime in runtimes {
        state.languages.insert(runtime.language.clone());
        for alias in &runtime.aliases {
            state.aliases.insert(alias.clone());
        }
    }
    state
}

/// Cached view of the backend's supported runtimes.
#[derive(Debug, Default)]
pub struct LanguageCatalog {
    inner: RwLock<CatalogState>,
}

impl LanguageCatalog {
    /// An empty catalog; rejects every language until populated.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from a fixed runtime list (tests, fixtures).
    pub fn from_runtimes(runtimes: &[Runtime]) -> Self {
        Self {
            inner: RwLock::new(build_state(runtimes)),
        }
    }

    /// Re-fetch the runtime list from the backend and swap it in.
    pub async fn refresh(&self, client: &PistonClient) -> Result<()> {
        let runtimes = client.runtimes().await?;
        info!(count = runtimes.len(), "Loaded runtime list from backend");
        *self.inner.write().await = build_state(&runtimes);
        Ok(())
    }

    /// True if `language` names a supported runtime or alias.
    pub async fn supports(&self, language: &str) -> bool {
        let state = self.inner.read().await;
        state.languages.contains(language) || state.aliases.contains(language)
    }
}
