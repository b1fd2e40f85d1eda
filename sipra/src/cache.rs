//! Cache de chargement par chemin
//!
//! Chaque chemin est chargé au plus une fois par cache, y compris en cas
//! d'échec: l'erreur est conservée et rejouée. Aucune invalidation, le
//! fichier source est supposé statique pour la durée du processus.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing::debug;

use crate::error::LoadError;
use crate::loader;
use crate::types::FeatureCollection;

type Entry = Arc<OnceLock<Result<Arc<FeatureCollection>, LoadError>>>;

/// Cache write-once / read-many des collections chargées
#[derive(Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<PathBuf, Entry>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retourne la collection du chemin, en la chargeant au premier appel
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<FeatureCollection>, LoadError> {
        self.get_or_load_with(path, loader::load)
    }

    /// Variante avec fonction de chargement explicite
    ///
    /// `load` n'est appelé qu'une fois par chemin, même sous appels concurrents.
    pub fn get_or_load_with<F>(
        &self,
        path: &Path,
        load: F,
    ) -> Result<Arc<FeatureCollection>, LoadError>
    where
        F: FnOnce(&Path) -> Result<FeatureCollection, LoadError>,
    {
        let key = cache_key(path);
        let entry = {
            let mut entries = self
                .entries
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            Arc::clone(entries.entry(key).or_default())
        };

        // Le verrou global est relâché: un chargement lent ne bloque pas les autres chemins
        entry
            .get_or_init(|| {
                debug!(path = %path.display(), "Loading dataset (cache miss)");
                load(path).map(Arc::new)
            })
            .clone()
    }

    /// Vrai si le chemin a déjà été chargé (avec succès ou non)
    pub fn contains(&self, path: &Path) -> bool {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries
            .get(&cache_key(path))
            .is_some_and(|entry| entry.get().is_some())
    }
}

/// Clé canonique si le fichier existe, chemin brut sinon
fn cache_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

static GLOBAL: OnceLock<DatasetCache> = OnceLock::new();

/// Cache global du processus
pub fn global() -> &'static DatasetCache {
    GLOBAL.get_or_init(DatasetCache::new)
}

/// Charge via le cache global du processus
pub fn load_cached(path: &Path) -> Result<Arc<FeatureCollection>, LoadError> {
    global().get_or_load(path)
}
