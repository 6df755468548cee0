//! Schema store and render cache
//!
//! The store owns imported schemas by id together with the assets each
//! import recorded. Compiled documents are cached by
//! [`cache_key`](crate::compiler::cache_key); re-importing a schema drops
//! every cached document for that id. The cache holds at most
//! [`DEFAULT_CACHE_CAPACITY`] documents unless configured otherwise, evicting
//! the oldest entry first.
//!
//! Writes take `&mut self`. Callers that share a store across threads wrap
//! it in their own lock.

use crate::assets::{AssetResolver, AssetStore, Layered};
use crate::compiler::{cache_key, CompiledDocument, Compiler};
use crate::ir::TemplateSchema;
use crate::{Error, FillRequest, Import, Result};
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Cached renders kept by [`SchemaStore::new`]
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
struct StoredSchema {
    schema: TemplateSchema,
    assets: AssetStore,
}

#[derive(Debug, Clone)]
struct CachedRender {
    schema_id: String,
    document: CompiledDocument,
}

#[derive(Debug, Clone)]
pub struct SchemaStore {
    schemas: BTreeMap<String, StoredSchema>,
    /// Assets every schema can reference (fonts, shared decorations)
    shared: AssetStore,
    cache: HashMap<String, CachedRender>,
    /// Cache keys, oldest first
    cache_order: VecDeque<String>,
    cache_capacity: usize,
}

impl Default for SchemaStore {
    fn default() -> Self {
        Self {
            schemas: BTreeMap::new(),
            shared: AssetStore::new(),
            cache: HashMap::new(),
            cache_order: VecDeque::new(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl SchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shared_assets(shared: AssetStore) -> Self {
        Self {
            shared,
            ..Self::default()
        }
    }

    /// Limit the render cache to `capacity` documents; `0` disables caching.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self.evict_to(capacity);
        self
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }

    /// Store an import, replacing any schema with the same id.
    ///
    /// Returns the replaced schema, if there was one.
    pub fn import(&mut self, import: Import) -> Option<TemplateSchema> {
        let id = import.schema.id().to_string();
        let dropped = self.invalidate(&id);
        let previous = self.schemas.insert(
            id.clone(),
            StoredSchema {
                schema: import.schema,
                assets: import.assets,
            },
        );
        match &previous {
            Some(_) => log::info!("replaced schema '{}' ({} cached renders dropped)", id, dropped),
            None => log::info!("stored schema '{}'", id),
        }
        previous.map(|p| p.schema)
    }

    pub fn get(&self, id: &str) -> Option<&TemplateSchema> {
        self.schemas.get(id).map(|s| &s.schema)
    }

    pub fn assets(&self, id: &str) -> Option<&AssetStore> {
        self.schemas.get(id).map(|s| &s.assets)
    }

    pub fn remove(&mut self, id: &str) -> Option<TemplateSchema> {
        self.invalidate(id);
        self.schemas.remove(id).map(|s| s.schema)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Drop every cached render of schema `id`; returns how many were dropped.
    pub fn invalidate(&mut self, id: &str) -> usize {
        let before = self.cache.len();
        self.cache.retain(|_, c| c.schema_id != id);
        let cache = &self.cache;
        self.cache_order.retain(|key| cache.contains_key(key));
        before - self.cache.len()
    }

    /// Number of cached renders across all schemas
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Compile schema `id` for `request`, reusing a cached render when the
    /// same (schema, variant, tokens, submission) was compiled before.
    ///
    /// Only successful compilations are cached. The cache does not key on the
    /// compiler configuration; call [`SchemaStore::clear_cache`] after
    /// changing it.
    pub fn fill(&mut self, id: &str, request: &FillRequest, compiler: &Compiler) -> Result<CompiledDocument> {
        let key = cache_key(id, request)?;
        if let Some(hit) = self.cache.get(&key) {
            log::debug!("render cache hit for '{}'", id);
            return Ok(hit.document.clone());
        }

        let stored = self.schemas.get(id).ok_or_else(|| Error::UnknownSchema(id.to_string()))?;
        let assets = Layered {
            primary: &stored.assets as &dyn AssetResolver,
            fallback: &self.shared,
        };
        let document = compiler.compile(&stored.schema, request, &assets)?;
        if self.cache_capacity > 0 {
            self.evict_to(self.cache_capacity - 1);
            self.cache_order.push_back(key.clone());
            self.cache.insert(
                key,
                CachedRender {
                    schema_id: id.to_string(),
                    document: document.clone(),
                },
            );
        }
        Ok(document)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.cache_order.clear();
    }

    /// Drop the oldest renders until at most `len` remain.
    fn evict_to(&mut self, len: usize) {
        while self.cache.len() > len {
            let Some(oldest) = self.cache_order.pop_front() else {
                break;
            };
            if let Some(evicted) = self.cache.remove(&oldest) {
                log::debug!("evicted cached render of '{}'", evicted.schema_id);
            }
        }
    }
}
