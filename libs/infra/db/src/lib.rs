// [libs/infra/db/src/lib.rs]
//! Persistence layer: libSQL connection management, idempotent schema migration, and a
//! repository per aggregate (Reference Store, Command Registry, Navigation Graph Store, Lock
//! Manager).

pub mod client;
pub mod errors;
pub mod repositories;
pub mod schema;

pub use client::DbClient;
pub use errors::DbError;
pub use repositories::{
    CaptureRepository, CommandRepository, LeaseRepository, NavigationRepository, ReferenceRepository, ZapEventRepository,
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use fleetmesh_domain_models::{
        Area, NavigationNode, NavigationTree, NodeType, PassCondition, Reference, ReferenceType,
    };

    async fn memory_client() -> DbClient {
        DbClient::connect("file::memory:?cache=shared", None).await.unwrap()
    }

    fn node(node_id: &str, label: &str) -> NavigationNode {
        NavigationNode {
            node_id: node_id.into(),
            label: label.into(),
            node_type: NodeType::Screen,
            position: (0.0, 0.0),
            verifications: vec![],
            screenshot_url: None,
            subtree_ref: None,
            verification_pass_condition: PassCondition::All,
            style: Default::default(),
            data: Default::default(),
        }
    }

    #[tokio::test]
    async fn reference_roundtrips_through_upsert_and_get() {
        let repo = ReferenceRepository::new(memory_client().await);
        let reference = Reference {
            team: "acme".into(),
            interface_name: "settings".into(),
            name: "logo".into(),
            reference_type: ReferenceType::Image,
            area: Area { x: 0.0, y: 0.0, w: 10.0, h: 10.0 },
            image_url: "s3://logo.png".into(),
            text: None,
            language: None,
            modified: false,
        };
        repo.upsert(&reference).await.unwrap();
        let fetched = repo.get("acme", "settings", "logo").await.unwrap();
        assert_eq!(fetched.image_url, "s3://logo.png");
    }

    #[tokio::test]
    async fn navigation_tree_roundtrips_with_nodes_and_edges() {
        let repo = NavigationRepository::new(memory_client().await);
        let tree = NavigationTree {
            tree_id: "t1".into(),
            name: "main".into(),
            userinterface_id: "ui1".into(),
            device_model: "host_vnc".into(),
            root_node_id: "home".into(),
            nodes: vec![node("home", "Home")],
            edges: vec![],
            parent_link: None,
        };
        repo.create_tree(&tree).await.unwrap();

        let loaded = repo.load_full_tree("t1").await.unwrap();
        assert_eq!(loaded.nodes.len(), 1);
        assert_eq!(loaded.node("home").unwrap().label, "Home");
    }

    /// Mirrors §4.3: updating a parent node propagates label/type to a child subtree's
    /// duplicate, leaving the duplicate's own position untouched.
    #[tokio::test]
    async fn saving_a_parent_node_propagates_to_subtree_duplicate() {
        let client = memory_client().await;
        let repo = NavigationRepository::new(client);

        let mut parent_tree = NavigationTree {
            tree_id: "parent".into(),
            name: "parent".into(),
            userinterface_id: "ui1".into(),
            device_model: "host_vnc".into(),
            root_node_id: "settings".into(),
            nodes: vec![node("settings", "Settings")],
            edges: vec![],
            parent_link: None,
        };
        repo.create_tree(&parent_tree).await.unwrap();

        let mut duplicate = node("settings", "Settings");
        duplicate.position = (42.0, 42.0);
        let child_tree = NavigationTree {
            tree_id: "child".into(),
            name: "child".into(),
            userinterface_id: "ui1".into(),
            device_model: "host_vnc".into(),
            root_node_id: "settings".into(),
            nodes: vec![duplicate],
            edges: vec![],
            parent_link: Some(("parent".into(), "settings".into())),
        };
        repo.create_tree(&child_tree).await.unwrap();

        parent_tree.nodes[0].label = "Settings (v2)".into();
        repo.save_node("parent", &parent_tree.nodes[0]).await.unwrap();

        let reloaded_child = repo.load_full_tree("child").await.unwrap();
        let duplicate_node = reloaded_child.node("settings").unwrap();
        assert_eq!(duplicate_node.label, "Settings (v2)");
        assert_eq!(duplicate_node.position, (42.0, 42.0));
    }

    #[tokio::test]
    async fn take_control_fails_fast_on_a_locked_device() {
        let repo = LeaseRepository::new(memory_client().await);
        let expires_at = Utc::now() + Duration::seconds(30);

        repo.take_control("host1", "dev1", "session-a", "alice", None, expires_at)
            .await
            .unwrap();

        let err = repo
            .take_control("host1", "dev1", "session-b", "bob", None, expires_at)
            .await
            .unwrap_err();

        match err {
            DbError::DeviceLocked { held_by_user_id, .. } => assert_eq!(held_by_user_id, "alice"),
            other => panic!("expected DeviceLocked, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn take_control_succeeds_again_after_release() {
        let repo = LeaseRepository::new(memory_client().await);
        let expires_at = Utc::now() + Duration::seconds(30);

        repo.take_control("host1", "dev1", "session-a", "alice", None, expires_at)
            .await
            .unwrap();
        repo.release_control("host1", "dev1", "session-a").await.unwrap();

        let lease = repo
            .take_control("host1", "dev1", "session-b", "bob", None, expires_at)
            .await
            .unwrap();
        assert_eq!(lease.user_id, "bob");
    }

    #[tokio::test]
    async fn take_control_succeeds_once_the_prior_lease_has_expired() {
        let repo = LeaseRepository::new(memory_client().await);
        let already_expired = Utc::now() - Duration::seconds(1);

        repo.take_control("host1", "dev1", "session-a", "alice", None, already_expired)
            .await
            .unwrap();

        let lease = repo
            .take_control("host1", "dev1", "session-b", "bob", None, Utc::now() + Duration::seconds(30))
            .await
            .unwrap();
        assert_eq!(lease.user_id, "bob");
    }
}
