/// Integration tests for spawning and authority requests across a cluster
/// of sessions sharing one world network

use tether_client::{
    shared::{EntityUuid, PeerId},
    AttachEvent, AuthorityChangeEvent, MaterializeEvent,
};
use tether_test::{
    assert_authority, assert_authority_synced, assert_has_authority, assert_owned_locally,
    TestCluster, SCENE_ROOT,
};

fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

/// Host spawns an object it owns itself
#[test]
fn host_spawns_own_object() {
    init_logger();
    let mut cluster = TestCluster::new("host", "h");
    cluster.connect("u", "p1");
    cluster.settle();

    cluster.spawn("h", "crate", "host");
    cluster.settle();

    for peer in ["h", "p1"] {
        assert!(cluster
            .session(peer)
            .has_network_object(&EntityUuid::from("crate")));
        assert_authority!(cluster, peer, "crate", "h");
    }
    assert_owned_locally!(cluster, "h", "crate", true);
    assert_has_authority!(cluster, "h", "crate", true);
    assert_owned_locally!(cluster, "p1", "crate", false);
    assert_has_authority!(cluster, "p1", "crate", false);
}

/// Host spawns an object on behalf of another user: the spawning peer keeps
/// authority, only the owner's peer carries the owned tag
#[test]
fn host_spawns_object_for_other_user() {
    init_logger();
    let mut cluster = TestCluster::new("host", "h");
    cluster.connect("u", "p1");
    cluster.connect("v", "p2");
    cluster.settle();

    cluster.spawn("h", "crate", "u");
    cluster.settle();

    assert_authority_synced!(cluster, "crate");
    assert_authority!(cluster, "p1", "crate", "h");
    assert_owned_locally!(cluster, "p1", "crate", true);
    assert_has_authority!(cluster, "p1", "crate", false);
    assert_owned_locally!(cluster, "h", "crate", false);
    assert_has_authority!(cluster, "h", "crate", true);
    assert_owned_locally!(cluster, "p2", "crate", false);
    assert_has_authority!(cluster, "p2", "crate", false);

    let record = cluster
        .session("p2")
        .ownership_record(&EntityUuid::from("crate"))
        .unwrap();
    assert_eq!(record.owner_peer(), &PeerId::from("h"));
}

/// A non-owner's request is committed by the owner's peer alone
#[test]
fn owner_commits_authority_request() {
    init_logger();
    let mut cluster = TestCluster::new("host", "h");
    cluster.connect("u", "p1");
    cluster.connect("v", "p2");
    cluster.settle();
    cluster.spawn("p1", "crate", "u");
    cluster.settle();

    cluster.request_authority("p2", "crate");
    cluster.settle();

    let transfers = cluster.transfers_of("crate");
    assert_eq!(transfers.len(), 1, "only the owner's peer commits");
    assert_eq!(transfers[0].sender, PeerId::from("p1"));

    assert_authority_synced!(cluster, "crate");
    assert_authority!(cluster, "h", "crate", "p2");
    for peer in ["h", "p1", "p2"] {
        let record = cluster
            .session(peer)
            .ownership_record(&EntityUuid::from("crate"))
            .unwrap();
        assert_eq!(record.requesting_peer_id(), None);
        assert_eq!(record.authority_peer_id(), Some(&PeerId::from("p2")));
    }
    assert_has_authority!(cluster, "p2", "crate", true);
    assert_has_authority!(cluster, "p1", "crate", false);
    assert_owned_locally!(cluster, "p1", "crate", true);
    assert_owned_locally!(cluster, "p2", "crate", false);
}

/// Every peer of the owning user commits the same request, which converges
#[test]
fn duplicate_commits_from_owner_peers_converge() {
    init_logger();
    let mut cluster = TestCluster::new("host", "h");
    cluster.connect("u", "p1");
    cluster.connect("u", "p2");
    cluster.connect("v", "p3");
    cluster.settle();
    cluster.spawn("p1", "crate", "u");
    cluster.settle();

    cluster.request_authority("p3", "crate");
    cluster.settle();

    assert!(!cluster.transfers_of("crate").is_empty());
    assert_authority_synced!(cluster, "crate");
    assert_authority!(cluster, "p3", "crate", "p3");
    assert_has_authority!(cluster, "p3", "crate", true);
}

/// Network ids follow UUID order within an owner peer, whatever the spawn order
#[test]
fn network_ids_follow_uuid_order() {
    init_logger();
    let mut cluster = TestCluster::new("host", "h");
    cluster.connect("u", "p1");
    cluster.settle();

    cluster.spawn("h", "entity 2", "host");
    cluster.settle();
    cluster.spawn("h", "entity", "host");
    cluster.settle();

    for peer in ["h", "p1"] {
        let session = cluster.session(peer);
        assert_eq!(session.network_id(&EntityUuid::from("entity")), Some(0));
        assert_eq!(session.network_id(&EntityUuid::from("entity 2")), Some(1));
        assert_eq!(
            session
                .network_object(&EntityUuid::from("entity 2"))
                .and_then(|object| object.network_id()),
            Some(1)
        );
        assert_eq!(
            session.entity_for_network_id(&PeerId::from("h"), 0),
            Some(&EntityUuid::from("entity"))
        );
    }

    cluster.destroy("h", "entity");
    cluster.settle();
    let object = cluster
        .session("p1")
        .network_object(&EntityUuid::from("entity 2"))
        .unwrap();
    assert_eq!(object.network_id(), Some(0), "ids shift down after a removal");
}

#[test]
fn children_attach_once_parent_materializes() {
    init_logger();
    let mut cluster = TestCluster::new("host", "h");
    cluster.connect("u", "p1");
    cluster.settle();

    cluster.session_mut("h").spawn_entity(
        EntityUuid::from("wheel"),
        EntityUuid::from("cart"),
        "host".into(),
        None,
    );
    cluster.settle();
    let wheel = cluster
        .session("p1")
        .network_object(&EntityUuid::from("wheel"))
        .unwrap();
    assert_eq!(wheel.parent(), None, "parent does not exist yet");

    cluster.spawn("h", "cart", "host");
    cluster.settle();

    for peer in ["h", "p1"] {
        let session = cluster.session(peer);
        let wheel = session.network_object(&EntityUuid::from("wheel")).unwrap();
        let cart = session.network_object(&EntityUuid::from("cart")).unwrap();
        assert_eq!(wheel.parent(), Some(&EntityUuid::from("cart")));
        assert_eq!(cart.parent(), Some(&EntityUuid::from(SCENE_ROOT)));
    }

    cluster.destroy("h", "cart");
    cluster.settle();
    let session = cluster.session("p1");
    assert!(!session.has_network_object(&EntityUuid::from("cart")));
    let wheel = session.network_object(&EntityUuid::from("wheel")).unwrap();
    assert_eq!(wheel.parent(), None);
}

#[test]
fn destroy_removes_object_everywhere() {
    init_logger();
    let mut cluster = TestCluster::new("host", "h");
    cluster.connect("u", "p1");
    cluster.settle();
    cluster.spawn("p1", "crate", "u");
    cluster.settle();

    cluster.destroy("h", "crate");
    cluster.settle();

    for session in cluster.sessions() {
        assert!(!session.has_network_object(&EntityUuid::from("crate")));
        assert!(session.ownership_record(&EntityUuid::from("crate")).is_none());
        assert_eq!(session.network_objects().len(), 0);
    }
}

#[test]
fn events_report_materialize_attach_and_authority_changes() {
    init_logger();
    let mut cluster = TestCluster::new("host", "h");
    cluster.connect("u", "p1");
    cluster.connect("v", "p2");
    cluster.settle();
    cluster.spawn("p1", "crate", "u");
    cluster.settle();
    cluster.request_authority("p2", "crate");
    cluster.settle();

    let mut events = cluster.session_mut("p2").take_events();
    assert!(!events.is_empty());

    let materialized: Vec<EntityUuid> = events.read::<MaterializeEvent>().collect();
    assert_eq!(materialized, vec![EntityUuid::from("crate")]);

    let attached: Vec<(EntityUuid, EntityUuid)> = events.read::<AttachEvent>().collect();
    assert_eq!(
        attached,
        vec![(EntityUuid::from("crate"), EntityUuid::from(SCENE_ROOT))]
    );

    let changes: Vec<(EntityUuid, PeerId)> = events.read::<AuthorityChangeEvent>().collect();
    assert_eq!(changes, vec![(EntityUuid::from("crate"), PeerId::from("p2"))]);

    assert!(cluster.session_mut("p2").take_events().is_empty());
}
