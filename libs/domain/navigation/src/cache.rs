// [libs/domain/navigation/src/cache.rs]
//! Navigation Cache (C4, spec §4.4). Process-wide, keyed by `tree_id`, 24h TTL, serving
//! fully-resolved trees so downstream consumers never join against the reference store or
//! command registry themselves.

use chrono::{DateTime, Duration, Utc};
use fleetmesh_domain_models::{NavigationEdge, NavigationNode, NavigationTree};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::instrument;

pub const CACHE_TTL_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("tree {0} not found while loading from the store")]
    TreeNotFound(String),
    #[error("tree {0} not present in cache and no loader was able to supply it: {1}")]
    LoadFailed(String, String),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    tree: NavigationTree,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn fresh(tree: NavigationTree) -> Self {
        Self {
            tree,
            expires_at: Utc::now() + Duration::hours(CACHE_TTL_HOURS),
        }
    }

    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Loads a full tree from the backing store on a cache miss (implemented by
/// `fleetmesh-infra-db`'s navigation repository).
#[async_trait::async_trait]
pub trait TreeLoader: Send + Sync {
    async fn load_tree(&self, tree_id: &str) -> Result<NavigationTree, String>;
}

/// Explicitly constructed and owned by the server's composition root; never a module-level
/// global (§9 redesign flag). Per-tree access serializes through a dedicated mutex so
/// concurrent writers to different trees never contend, and readers never observe a
/// partially-applied incremental patch.
pub struct NavigationCache {
    slots: RwLock<HashMap<String, Arc<Mutex<Option<CacheEntry>>>>>,
}

impl Default for NavigationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationCache {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }

    async fn slot_for(&self, tree_id: &str) -> Arc<Mutex<Option<CacheEntry>>> {
        if let Some(slot) = self.slots.read().await.get(tree_id) {
            return slot.clone();
        }
        let mut write_guard = self.slots.write().await;
        write_guard
            .entry(tree_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone()
    }

    /// Returns the resolved tree, loading it through `loader` on a miss or TTL expiry
    /// (read-your-writes is guaranteed because `saveNode`/`saveEdge` call [`Self::invalidate`]
    /// atomically with their write, per §4.3).
    #[instrument(skip(self, loader))]
    pub async fn get_or_load(
        &self,
        tree_id: &str,
        loader: &dyn TreeLoader,
    ) -> Result<NavigationTree, CacheError> {
        let slot = self.slot_for(tree_id).await;
        let mut guard = slot.lock().await;

        if let Some(entry) = guard.as_ref() {
            if !entry.is_expired() {
                return Ok(entry.tree.clone());
            }
        }

        let tree = loader
            .load_tree(tree_id)
            .await
            .map_err(|e| CacheError::LoadFailed(tree_id.to_string(), e))?;
        *guard = Some(CacheEntry::fresh(tree.clone()));
        Ok(tree)
    }

    /// Invalidation path (a): any write to a tree's nodes/edges clears its entry outright.
    #[instrument(skip(self))]
    pub async fn invalidate(&self, tree_id: &str) {
        let slot = self.slot_for(tree_id).await;
        *slot.lock().await = None;
    }

    /// Invalidation path (c): manual flush of the whole cache, used at shutdown.
    pub async fn flush_all(&self) {
        self.slots.write().await.clear();
    }

    /// Invalidation path (b): incremental patch of a single node, no full rebuild.
    pub async fn update_node(&self, tree_id: &str, node: NavigationNode) -> Result<(), CacheError> {
        let slot = self.slot_for(tree_id).await;
        let mut guard = slot.lock().await;
        let Some(entry) = guard.as_mut() else {
            return Err(CacheError::TreeNotFound(tree_id.to_string()));
        };
        if let Some(existing) = entry.tree.nodes.iter_mut().find(|n| n.node_id == node.node_id) {
            *existing = node;
        } else {
            entry.tree.nodes.push(node);
        }
        Ok(())
    }

    /// Incremental patch of a single edge, no full rebuild.
    pub async fn update_edge(&self, tree_id: &str, edge: NavigationEdge) -> Result<(), CacheError> {
        let slot = self.slot_for(tree_id).await;
        let mut guard = slot.lock().await;
        let Some(entry) = guard.as_mut() else {
            return Err(CacheError::TreeNotFound(tree_id.to_string()));
        };
        if let Some(existing) = entry.tree.edges.iter_mut().find(|e| e.edge_id == edge.edge_id) {
            *existing = edge;
        } else {
            entry.tree.edges.push(edge);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetmesh_domain_models::{NodeType, PassCondition};

    struct StaticLoader(NavigationTree);

    #[async_trait::async_trait]
    impl TreeLoader for StaticLoader {
        async fn load_tree(&self, _tree_id: &str) -> Result<NavigationTree, String> {
            Ok(self.0.clone())
        }
    }

    fn sample_tree() -> NavigationTree {
        NavigationTree {
            tree_id: "t1".into(),
            name: "main".into(),
            userinterface_id: "ui1".into(),
            device_model: "host_vnc".into(),
            root_node_id: "home".into(),
            nodes: vec![NavigationNode {
                node_id: "home".into(),
                label: "Home".into(),
                node_type: NodeType::Entry,
                position: (0.0, 0.0),
                verifications: vec![],
                screenshot_url: None,
                subtree_ref: None,
                verification_pass_condition: PassCondition::All,
                style: Default::default(),
                data: Default::default(),
            }],
            edges: vec![],
            parent_link: None,
        }
    }

    #[tokio::test]
    async fn miss_loads_from_store_and_then_hits() {
        let cache = NavigationCache::new();
        let loader = StaticLoader(sample_tree());
        let tree = cache.get_or_load("t1", &loader).await.unwrap();
        assert_eq!(tree.tree_id, "t1");
    }

    /// Read-your-writes (§8 invariant 2): after `update_node`, the next read reflects it
    /// without a full reload.
    #[tokio::test]
    async fn update_node_is_visible_on_next_read() {
        let cache = NavigationCache::new();
        let loader = StaticLoader(sample_tree());
        cache.get_or_load("t1", &loader).await.unwrap();

        let mut patched = sample_tree().nodes.remove(0);
        patched.label = "Home (patched)".into();
        cache.update_node("t1", patched).await.unwrap();

        let tree = cache.get_or_load("t1", &loader).await.unwrap();
        assert_eq!(tree.node("home").unwrap().label, "Home (patched)");
    }

    #[tokio::test]
    async fn invalidate_forces_a_reload() {
        let cache = NavigationCache::new();
        let loader = StaticLoader(sample_tree());
        cache.get_or_load("t1", &loader).await.unwrap();
        cache.invalidate("t1").await;
        // A second load after invalidation must not error and must re-run the loader.
        let tree = cache.get_or_load("t1", &loader).await.unwrap();
        assert_eq!(tree.tree_id, "t1");
    }
}
