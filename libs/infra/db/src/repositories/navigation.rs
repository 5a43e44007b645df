// [libs/infra/db/src/repositories/navigation.rs]
//! Navigation Graph Store (C3, §4.3) persistence: trees, nodes, edges, and the parent-node sync
//! rule that propagates a parent node's syncable fields into every child subtree's duplicate.

use crate::errors::DbError;
use crate::DbClient;
use async_trait::async_trait;
use fleetmesh_domain_models::{
    ActionSet, NavigationEdge, NavigationNode, NavigationTree, NodeType, PassCondition,
};
use fleetmesh_domain_navigation::{propagate_parent_update, TreeLoader};
use libsql::{params, Row};
use tracing::{info, instrument, warn};

pub struct NavigationRepository {
    client: DbClient,
}

impl NavigationRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, tree))]
    pub async fn create_tree(&self, tree: &NavigationTree) -> Result<(), DbError> {
        let conn = self.client.connection()?;
        let (parent_tree_id, parent_node_id) = tree
            .parent_link
            .as_ref()
            .map(|(t, n)| (Some(t.clone()), Some(n.clone())))
            .unwrap_or((None, None));

        conn.execute(
            r#"
            INSERT INTO navigation_trees (tree_id, name, userinterface_id, device_model, root_node_id, parent_tree_id, parent_node_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(tree_id) DO UPDATE SET
                name = excluded.name,
                userinterface_id = excluded.userinterface_id,
                device_model = excluded.device_model,
                root_node_id = excluded.root_node_id,
                parent_tree_id = excluded.parent_tree_id,
                parent_node_id = excluded.parent_node_id
            "#,
            params![
                tree.tree_id.clone(),
                tree.name.clone(),
                tree.userinterface_id.clone(),
                tree.device_model.clone(),
                tree.root_node_id.clone(),
                parent_tree_id,
                parent_node_id,
            ],
        )
        .await?;

        for node in &tree.nodes {
            self.save_node_inner(&conn_owned(&self.client)?, &tree.tree_id, node).await?;
        }
        for edge in &tree.edges {
            self.save_edge_inner(&conn_owned(&self.client)?, &tree.tree_id, edge).await?;
        }
        Ok(())
    }

    /// Persists `node` and, if it is referenced as a parent node by any subtree, propagates its
    /// syncable fields into each duplicate (§4.3 parent-node sync, single-hop).
    #[instrument(skip(self, node), fields(tree_id, node_id = %node.node_id))]
    pub async fn save_node(&self, tree_id: &str, node: &NavigationNode) -> Result<(), DbError> {
        let conn = self.client.connection()?;
        self.save_node_inner(&conn, tree_id, node).await?;

        let duplicates = self.find_child_duplicates(&conn, tree_id, &node.node_id).await?;
        for (dup_tree_id, mut duplicate) in duplicates {
            propagate_parent_update(node, &mut duplicate);
            self.save_node_inner(&conn, &dup_tree_id, &duplicate).await?;
            info!(dup_tree_id, "propagated parent-node update to subtree duplicate");
        }
        Ok(())
    }

    async fn save_node_inner(&self, conn: &libsql::Connection, tree_id: &str, node: &NavigationNode) -> Result<(), DbError> {
        let verifications_json = serde_json::to_string(&node.verifications).map_err(|e| DbError::MappingError(e.to_string()))?;
        let style_json = serde_json::to_string(&node.style).map_err(|e| DbError::MappingError(e.to_string()))?;
        let data_json = serde_json::to_string(&node.data).map_err(|e| DbError::MappingError(e.to_string()))?;

        conn.execute(
            r#"
            INSERT INTO navigation_nodes (tree_id, node_id, label, node_type, position_x, position_y, verifications, screenshot_url, subtree_ref, verification_pass_condition, style, data)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(tree_id, node_id) DO UPDATE SET
                label = excluded.label,
                node_type = excluded.node_type,
                position_x = excluded.position_x,
                position_y = excluded.position_y,
                verifications = excluded.verifications,
                screenshot_url = excluded.screenshot_url,
                subtree_ref = excluded.subtree_ref,
                verification_pass_condition = excluded.verification_pass_condition,
                style = excluded.style,
                data = excluded.data
            "#,
            params![
                tree_id,
                node.node_id.clone(),
                node.label.clone(),
                node_type_str(node.node_type),
                node.position.0,
                node.position.1,
                verifications_json,
                node.screenshot_url.clone(),
                node.subtree_ref.clone(),
                pass_condition_str(node.verification_pass_condition),
                style_json,
                data_json,
            ],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, edge), fields(tree_id, edge_id = %edge.edge_id))]
    pub async fn save_edge(&self, tree_id: &str, edge: &NavigationEdge) -> Result<(), DbError> {
        let conn = self.client.connection()?;
        self.save_edge_inner(&conn, tree_id, edge).await
    }

    async fn save_edge_inner(&self, conn: &libsql::Connection, tree_id: &str, edge: &NavigationEdge) -> Result<(), DbError> {
        let action_sets_json = serde_json::to_string(&edge.action_sets).map_err(|e| DbError::MappingError(e.to_string()))?;

        conn.execute(
            r#"
            INSERT INTO navigation_edges (tree_id, edge_id, source_node_id, target_node_id, action_sets, default_action_set_id, final_wait_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(tree_id, edge_id) DO UPDATE SET
                source_node_id = excluded.source_node_id,
                target_node_id = excluded.target_node_id,
                action_sets = excluded.action_sets,
                default_action_set_id = excluded.default_action_set_id,
                final_wait_ms = excluded.final_wait_ms
            "#,
            params![
                tree_id,
                edge.edge_id.clone(),
                edge.source_node_id.clone(),
                edge.target_node_id.clone(),
                action_sets_json,
                edge.default_action_set_id.clone(),
                edge.final_wait_ms as i64,
            ],
        )
        .await?;
        Ok(())
    }

    /// Trees whose `parent_tree_id = tree_id AND parent_node_id = node_id`, each with its
    /// current duplicate node row.
    async fn find_child_duplicates(
        &self,
        conn: &libsql::Connection,
        tree_id: &str,
        node_id: &str,
    ) -> Result<Vec<(String, NavigationNode)>, DbError> {
        let mut rows = conn
            .query(
                "SELECT tree_id FROM navigation_trees WHERE parent_tree_id = ?1 AND parent_node_id = ?2",
                params![tree_id, node_id],
            )
            .await?;

        let mut child_tree_ids = Vec::new();
        while let Some(row) = rows.next().await? {
            child_tree_ids.push(row.get::<String>(0)?);
        }

        let mut out = Vec::new();
        for child_tree_id in child_tree_ids {
            match self.load_node(conn, &child_tree_id, node_id).await {
                Ok(node) => out.push((child_tree_id, node)),
                Err(DbError::NodeNotFound { .. }) => {
                    warn!(child_tree_id, node_id, "subtree has a parent link but no matching duplicate node");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }

    async fn load_node(&self, conn: &libsql::Connection, tree_id: &str, node_id: &str) -> Result<NavigationNode, DbError> {
        let mut rows = conn
            .query(
                "SELECT node_id, label, node_type, position_x, position_y, verifications, screenshot_url, subtree_ref, verification_pass_condition, style, data
                 FROM navigation_nodes WHERE tree_id = ?1 AND node_id = ?2",
                params![tree_id, node_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => map_node_row(row),
            None => Err(DbError::NodeNotFound { tree_id: tree_id.to_string(), node_id: node_id.to_string() }),
        }
    }

    /// Resolves a `userinterface_id` to its tree_id for `getTreeByUserInterfaceId` (§6). The
    /// root tree for an interface is the one with no `parent_tree_id`.
    #[instrument(skip(self))]
    pub async fn find_tree_id_by_userinterface(&self, userinterface_id: &str) -> Result<String, DbError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                "SELECT tree_id FROM navigation_trees WHERE userinterface_id = ?1 AND parent_tree_id IS NULL",
                params![userinterface_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(row.get(0)?),
            None => Err(DbError::TreeNotFound(userinterface_id.to_string())),
        }
    }

    #[instrument(skip(self))]
    pub async fn load_full_tree(&self, tree_id: &str) -> Result<NavigationTree, DbError> {
        let conn = self.client.connection()?;

        let mut tree_rows = conn
            .query(
                "SELECT tree_id, name, userinterface_id, device_model, root_node_id, parent_tree_id, parent_node_id
                 FROM navigation_trees WHERE tree_id = ?1",
                params![tree_id],
            )
            .await?;
        let tree_row = tree_rows.next().await?.ok_or_else(|| DbError::TreeNotFound(tree_id.to_string()))?;

        let parent_tree_id: Option<String> = tree_row.get(5)?;
        let parent_node_id: Option<String> = tree_row.get(6)?;

        let mut node_rows = conn
            .query(
                "SELECT node_id, label, node_type, position_x, position_y, verifications, screenshot_url, subtree_ref, verification_pass_condition, style, data
                 FROM navigation_nodes WHERE tree_id = ?1",
                params![tree_id],
            )
            .await?;
        let mut nodes = Vec::new();
        while let Some(row) = node_rows.next().await? {
            nodes.push(map_node_row(row)?);
        }

        let mut edge_rows = conn
            .query(
                "SELECT tree_id, edge_id, source_node_id, target_node_id, action_sets, default_action_set_id, final_wait_ms
                 FROM navigation_edges WHERE tree_id = ?1",
                params![tree_id],
            )
            .await?;
        let mut edges = Vec::new();
        while let Some(row) = edge_rows.next().await? {
            edges.push(map_edge_row(row)?);
        }

        Ok(NavigationTree {
            tree_id: tree_row.get(0)?,
            name: tree_row.get(1)?,
            userinterface_id: tree_row.get(2)?,
            device_model: tree_row.get(3)?,
            root_node_id: tree_row.get(4)?,
            nodes,
            edges,
            parent_link: parent_tree_id.zip(parent_node_id),
        })
    }
}

/// A second pooled connection for the sequential per-node/edge inserts issued by
/// [`NavigationRepository::create_tree`]; libSQL connections are cheap handles onto a shared
/// driver, not OS sockets, so this is not a new physical link.
fn conn_owned(client: &DbClient) -> Result<libsql::Connection, DbError> {
    client.connection()
}

#[async_trait]
impl TreeLoader for NavigationRepository {
    async fn load_tree(&self, tree_id: &str) -> Result<NavigationTree, String> {
        self.load_full_tree(tree_id).await.map_err(|e| e.to_string())
    }
}

fn node_type_str(t: NodeType) -> &'static str {
    match t {
        NodeType::Entry => "entry",
        NodeType::Screen => "screen",
        NodeType::Menu => "menu",
        NodeType::Action => "action",
        NodeType::SubtreeRoot => "subtree_root",
    }
}

fn pass_condition_str(p: PassCondition) -> &'static str {
    match p {
        PassCondition::All => "all",
        PassCondition::Any => "any",
    }
}

fn map_node_row(row: Row) -> Result<NavigationNode, DbError> {
    let node_type_raw: String = row.get(2)?;
    let node_type = match node_type_raw.as_str() {
        "entry" => NodeType::Entry,
        "screen" => NodeType::Screen,
        "menu" => NodeType::Menu,
        "action" => NodeType::Action,
        "subtree_root" => NodeType::SubtreeRoot,
        other => return Err(DbError::MappingError(format!("unknown node_type '{other}'"))),
    };

    let pass_condition_raw: String = row.get(8)?;
    let verification_pass_condition = match pass_condition_raw.as_str() {
        "all" => PassCondition::All,
        "any" => PassCondition::Any,
        other => return Err(DbError::MappingError(format!("unknown pass_condition '{other}'"))),
    };

    let verifications_json: String = row.get(5)?;
    let style_json: String = row.get(9)?;
    let data_json: String = row.get(10)?;

    Ok(NavigationNode {
        node_id: row.get(0)?,
        label: row.get(1)?,
        node_type,
        position: (row.get(3)?, row.get(4)?),
        verifications: serde_json::from_str(&verifications_json).map_err(|e| DbError::MappingError(e.to_string()))?,
        screenshot_url: row.get(6)?,
        subtree_ref: row.get(7)?,
        verification_pass_condition,
        style: serde_json::from_str(&style_json).map_err(|e| DbError::MappingError(e.to_string()))?,
        data: serde_json::from_str(&data_json).map_err(|e| DbError::MappingError(e.to_string()))?,
    })
}

fn map_edge_row(row: Row) -> Result<NavigationEdge, DbError> {
    let action_sets_json: String = row.get(4)?;
    let action_sets: Vec<ActionSet> =
        serde_json::from_str(&action_sets_json).map_err(|e| DbError::MappingError(e.to_string()))?;

    Ok(NavigationEdge {
        tree_id: row.get(0)?,
        edge_id: row.get(1)?,
        source_node_id: row.get(2)?,
        target_node_id: row.get(3)?,
        action_sets,
        default_action_set_id: row.get(5)?,
        final_wait_ms: row.get::<i64>(6)? as u64,
    })
}
