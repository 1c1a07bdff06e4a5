// =============================================================================
// Watchlist Store — persisted set of tracked symbols
// =============================================================================
//
// The watchlist is a small ordered list of symbols, loaded once at startup
// and rewritten on every mutation. Persistence is injected through
// `WatchlistBackend` so the store itself stays free of ambient state; the
// production backend is a JSON file written with the same atomic tmp + rename
// pattern the rest of the engine uses for its on-disk state.
//
// Symbols are normalised to uppercase on the way in. Adding a duplicate or
// removing an absent symbol is a no-op, not an error.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::RwLock;
use tracing::info;

/// Load/save seam for the watchlist. Implementations must tolerate being
/// called before any watchlist has ever been saved.
pub trait WatchlistBackend: Send + Sync {
    fn load(&self) -> Result<Vec<String>>;
    fn save(&self, symbols: &[String]) -> Result<()>;
}

// -----------------------------------------------------------------------------
// JSON file backend
// -----------------------------------------------------------------------------

/// Stores the watchlist as a JSON string array on disk.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WatchlistBackend for JsonFileBackend {
    /// A missing file is a fresh install, not an error.
    fn load(&self) -> Result<Vec<String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to read watchlist from {}", self.path.display())
                })
            }
        };

        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse watchlist from {}", self.path.display()))
    }

    /// Atomic write: write to a temporary sibling file, then rename.
    fn save(&self, symbols: &[String]) -> Result<()> {
        let content =
            serde_json::to_string_pretty(symbols).context("failed to serialise watchlist")?;

        let tmp_path = self.path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp watchlist to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("failed to rename tmp watchlist to {}", self.path.display()))?;

        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Store
// -----------------------------------------------------------------------------

/// In-memory watchlist with write-through persistence.
pub struct WatchlistStore {
    symbols: RwLock<Vec<String>>,
    backend: Box<dyn WatchlistBackend>,
}

impl WatchlistStore {
    /// Load the persisted watchlist through `backend`.
    pub fn open(backend: Box<dyn WatchlistBackend>) -> Result<Self> {
        let symbols = backend.load()?;
        info!(count = symbols.len(), "watchlist loaded");
        Ok(Self {
            symbols: RwLock::new(symbols),
            backend,
        })
    }

    /// Convenience constructor for the on-disk JSON backend.
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(Box::new(JsonFileBackend::new(path.as_ref())))
    }

    /// Current symbols, in insertion order.
    pub fn symbols(&self) -> Vec<String> {
        self.symbols.read().clone()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        let symbol = symbol.trim().to_uppercase();
        self.symbols.read().iter().any(|s| *s == symbol)
    }

    /// Append `symbol` (uppercased) and persist. Returns `Ok(false)` without
    /// writing when the symbol is already present.
    ///
    /// # Errors
    /// Empty or whitespace-only input is rejected; persistence failures
    /// propagate and leave the in-memory list unchanged.
    pub fn add(&self, symbol: &str) -> Result<bool> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            anyhow::bail!("watchlist symbol must not be empty");
        }

        let mut symbols = self.symbols.write();
        if symbols.iter().any(|s| *s == symbol) {
            return Ok(false);
        }

        let mut updated = symbols.clone();
        updated.push(symbol.clone());
        self.backend.save(&updated)?;

        *symbols = updated;
        info!(symbol = %symbol, count = symbols.len(), "watchlist symbol added");
        Ok(true)
    }

    /// Remove `symbol` and persist. Returns `Ok(false)` without writing when
    /// the symbol is not present.
    pub fn remove(&self, symbol: &str) -> Result<bool> {
        let symbol = symbol.trim().to_uppercase();

        let mut symbols = self.symbols.write();
        if !symbols.iter().any(|s| *s == symbol) {
            return Ok(false);
        }

        let updated: Vec<String> = symbols.iter().filter(|s| **s != symbol).cloned().collect();
        self.backend.save(&updated)?;

        *symbols = updated;
        info!(symbol = %symbol, count = symbols.len(), "watchlist symbol removed");
        Ok(true)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Backend that records every save, for asserting write-through behavior.
    #[derive(Default)]
    struct MemoryBackend {
        initial: Vec<String>,
        saves: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl WatchlistBackend for MemoryBackend {
        fn load(&self) -> Result<Vec<String>> {
            Ok(self.initial.clone())
        }

        fn save(&self, symbols: &[String]) -> Result<()> {
            self.saves.lock().push(symbols.to_vec());
            Ok(())
        }
    }

    fn store_with(initial: &[&str]) -> (WatchlistStore, Arc<Mutex<Vec<Vec<String>>>>) {
        let saves = Arc::new(Mutex::new(Vec::new()));
        let backend = MemoryBackend {
            initial: initial.iter().map(|s| s.to_string()).collect(),
            saves: Arc::clone(&saves),
        };
        let store = WatchlistStore::open(Box::new(backend)).unwrap();
        (store, saves)
    }

    #[test]
    fn starts_from_persisted_symbols() {
        let (store, _) = store_with(&["AAPL", "MSFT"]);
        assert_eq!(store.symbols(), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn add_uppercases_and_appends() {
        let (store, saves) = store_with(&["AAPL"]);
        assert!(store.add("tsla").unwrap());
        assert_eq!(store.symbols(), vec!["AAPL", "TSLA"]);
        assert_eq!(saves.lock().as_slice(), &[vec!["AAPL".to_string(), "TSLA".to_string()]]);
    }

    #[test]
    fn duplicate_add_is_a_silent_no_op() {
        let (store, saves) = store_with(&["AAPL"]);
        assert!(!store.add("aapl").unwrap());
        assert_eq!(store.symbols(), vec!["AAPL"]);
        assert!(saves.lock().is_empty());
    }

    #[test]
    fn empty_symbol_is_rejected() {
        let (store, saves) = store_with(&[]);
        assert!(store.add("   ").is_err());
        assert!(saves.lock().is_empty());
    }

    #[test]
    fn remove_persists_the_shrunken_list() {
        let (store, saves) = store_with(&["AAPL", "MSFT", "TSLA"]);
        assert!(store.remove("msft").unwrap());
        assert_eq!(store.symbols(), vec!["AAPL", "TSLA"]);
        assert_eq!(saves.lock().len(), 1);
    }

    #[test]
    fn removing_an_absent_symbol_is_a_no_op() {
        let (store, saves) = store_with(&["AAPL"]);
        assert!(!store.remove("NVDA").unwrap());
        assert_eq!(store.symbols(), vec!["AAPL"]);
        assert!(saves.lock().is_empty());
    }

    #[test]
    fn failed_save_leaves_memory_untouched() {
        struct FailingBackend;
        impl WatchlistBackend for FailingBackend {
            fn load(&self) -> Result<Vec<String>> {
                Ok(vec!["AAPL".to_string()])
            }
            fn save(&self, _symbols: &[String]) -> Result<()> {
                anyhow::bail!("disk full")
            }
        }

        let store = WatchlistStore::open(Box::new(FailingBackend)).unwrap();
        assert!(store.add("TSLA").is_err());
        assert_eq!(store.symbols(), vec!["AAPL"]);
    }

    #[test]
    fn contains_matches_case_insensitively() {
        let (store, _) = store_with(&["AAPL"]);
        assert!(store.contains("aapl"));
        assert!(!store.contains("TSLA"));
    }
}
