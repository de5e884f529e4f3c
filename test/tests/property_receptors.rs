/// PROPERTY-BASED TESTS: receptor invariants
///
/// Uses proptest to drive the core receptors with random action sequences.
///
/// Key invariants:
/// 1. Spawn, transfer and destroy are idempotent under replay
/// 2. An entity's owner never changes while its record exists
/// 3. A transfer naming the wrong owner never moves authority
/// 4. Network ids depend only on the set of entities, not on spawn order

use proptest::prelude::*;
use tether_shared::{
    core_dispatcher, Action, ActionRecord, EntityUuid, OwnershipRecord, PeerId, ReplicatedState,
    UserId,
};

fn entity_strategy() -> impl Strategy<Value = EntityUuid> {
    prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(EntityUuid::from)
}

fn user_strategy() -> impl Strategy<Value = UserId> {
    prop::sample::select(vec!["u1", "u2", "u3"]).prop_map(UserId::from)
}

fn peer_strategy() -> impl Strategy<Value = PeerId> {
    prop::sample::select(vec!["p1", "p2", "p3", "p4"]).prop_map(PeerId::from)
}

fn entity_action_strategy() -> impl Strategy<Value = ActionRecord> {
    let action = prop_oneof![
        (entity_strategy(), user_strategy(), prop::option::of(peer_strategy())).prop_map(
            |(entity, owner, authority)| Action::SpawnEntity {
                entity,
                parent: EntityUuid::from("root"),
                owner,
                authority,
            }
        ),
        (entity_strategy(), peer_strategy()).prop_map(|(entity, new_authority)| {
            Action::RequestAuthority {
                entity,
                new_authority,
            }
        }),
        (entity_strategy(), user_strategy(), peer_strategy()).prop_map(
            |(entity, owner, new_authority)| Action::TransferAuthority {
                entity,
                owner,
                new_authority,
            }
        ),
        entity_strategy().prop_map(|entity| Action::DestroyEntity { entity }),
    ];
    (peer_strategy(), action).prop_map(|(sender, action)| ActionRecord::new(sender, action))
}

fn snapshot(state: &ReplicatedState) -> Vec<(OwnershipRecord, Option<u32>)> {
    let table = state.ownership();
    let mut records: Vec<_> = table
        .iter()
        .map(|record| (record.clone(), table.network_id(record.entity())))
        .collect();
    records.sort_by(|a, b| a.0.entity().cmp(b.0.entity()));
    records
}

proptest! {
    /// Replaying any action right after itself changes nothing
    #[test]
    fn prop_entity_actions_are_idempotent(
        records in prop::collection::vec(entity_action_strategy(), 1..40),
    ) {
        let dispatcher = core_dispatcher();
        let mut once = ReplicatedState::new();
        let mut twice = ReplicatedState::new();

        for record in &records {
            dispatcher.apply(&mut once, record);
            dispatcher.apply(&mut twice, record);
            dispatcher.apply(&mut twice, record);
            prop_assert_eq!(snapshot(&once), snapshot(&twice));
        }
    }

    /// Once spawned, an entity keeps its owner until it is destroyed
    #[test]
    fn prop_owner_never_changes_after_spawn(
        records in prop::collection::vec(entity_action_strategy(), 1..60),
    ) {
        let dispatcher = core_dispatcher();
        let mut state = ReplicatedState::new();

        for record in &records {
            let before = record
                .action
                .entity()
                .and_then(|entity| state.ownership().get(entity))
                .map(|existing| existing.owner_id().clone());
            dispatcher.apply(&mut state, record);

            let entity = record.action.entity().unwrap();
            let after = state.ownership().get(entity).map(|r| r.owner_id().clone());
            if let (Some(before), Some(after)) = (before, after) {
                prop_assert_eq!(before, after);
            }
        }
    }

    /// A transfer whose owner does not match leaves the authority untouched
    #[test]
    fn prop_mismatched_transfer_never_moves_authority(
        owner in user_strategy(),
        claimed in user_strategy(),
        spawner in peer_strategy(),
        target in peer_strategy(),
    ) {
        prop_assume!(owner != claimed);

        let dispatcher = core_dispatcher();
        let mut state = ReplicatedState::new();
        let entity = EntityUuid::from("a");
        dispatcher.apply(&mut state, &ActionRecord::new(spawner.clone(), Action::SpawnEntity {
            entity: entity.clone(),
            parent: EntityUuid::from("root"),
            owner,
            authority: None,
        }));
        dispatcher.apply(&mut state, &ActionRecord::new(target.clone(), Action::TransferAuthority {
            entity: entity.clone(),
            owner: claimed,
            new_authority: target,
        }));

        let record = state.ownership().get(&entity).unwrap();
        prop_assert_eq!(record.authority(), &spawner);
    }

    /// Two replicas spawning the same entities in different orders agree on every id
    #[test]
    fn prop_network_ids_ignore_spawn_order(
        names in prop::collection::btree_set("[a-z]{1,6}( [0-9])?", 1..12),
        seed in any::<u64>(),
    ) {
        let dispatcher = core_dispatcher();
        let spawn = |name: &String| ActionRecord::new(PeerId::from("p1"), Action::SpawnEntity {
            entity: EntityUuid::from(name.as_str()),
            parent: EntityUuid::from("root"),
            owner: UserId::from("u1"),
            authority: None,
        });

        let ordered: Vec<String> = names.iter().cloned().collect();
        let mut shuffled = ordered.clone();
        let len = shuffled.len();
        for i in 0..len {
            let j = (seed.wrapping_mul(i as u64 + 1) % len as u64) as usize;
            shuffled.swap(i, j);
        }

        let mut forward = ReplicatedState::new();
        let mut scrambled = ReplicatedState::new();
        for name in &ordered {
            dispatcher.apply(&mut forward, &spawn(name));
        }
        for name in &shuffled {
            dispatcher.apply(&mut scrambled, &spawn(name));
        }

        for (expected, name) in ordered.iter().enumerate() {
            let entity = EntityUuid::from(name.as_str());
            prop_assert_eq!(forward.ownership().network_id(&entity), Some(expected as u32));
            prop_assert_eq!(scrambled.ownership().network_id(&entity), Some(expected as u32));
        }
    }
}
