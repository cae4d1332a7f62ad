//! Companion agent lifecycle, targeting and termination races.

mod common;

use cast_core::{ActorId, CompanionState, Notification, PartyId};
use cast_runtime::{Actor, RuntimeHandle, Topic};

use common::{LIFE_CUBIC, STORM_CUBIC, advance_ms};

const OWNER: ActorId = ActorId(1);
const WOLF: ActorId = ActorId(2);

fn hp(handle: &RuntimeHandle, actor: ActorId) -> u32 {
    handle.view(actor).expect("actor exists").vitals.hp
}

fn move_to(handle: &RuntimeHandle, actor: ActorId, x: i32) {
    handle.with_actor(actor, |a| a.position.x = x);
}

#[tokio::test(start_paused = true)]
async fn companion_waits_for_a_target_then_casts_once() {
    let runtime = common::runtime().await;
    let handle = runtime.handle();
    handle.spawn_actor(Actor::player(1).targeting(WOLF));
    handle.spawn_actor(Actor::monster(2).at(5_000, 0, 0).with_hp(1_000, 1_000));

    let id = handle.spawn_companion(OWNER, STORM_CUBIC).unwrap();
    let agent = handle.companion(id).unwrap();
    assert_eq!(agent.state(), CompanionState::Spawned);
    assert_eq!(handle.engage(OWNER), 1);
    assert_eq!(agent.state(), CompanionState::Active);

    // Ticks at 2s, 4s and 6s find the wolf out of reach.
    advance_ms(6_001).await;
    assert_eq!(agent.ticks(), 3);
    assert_eq!(agent.casts(), 0);
    assert_eq!(hp(&handle, WOLF), 1_000);

    move_to(&handle, WOLF, 300);
    advance_ms(2_000).await;
    assert_eq!(agent.ticks(), 4);
    assert_eq!(agent.casts(), 1);
    assert_eq!(hp(&handle, WOLF), 990);
}

#[tokio::test(start_paused = true)]
async fn lifetime_expiry_wins_over_a_coinciding_tick() {
    let runtime = common::runtime().await;
    let handle = runtime.handle();
    handle.spawn_actor(Actor::player(1).targeting(WOLF));
    handle.spawn_actor(Actor::monster(2).at(300, 0, 0).with_hp(1_000, 1_000));
    let mut companion_events = handle.subscribe(Topic::Companion);

    let id = handle.spawn_companion(OWNER, STORM_CUBIC).unwrap();
    let agent = handle.companion(id).unwrap();
    handle.engage(OWNER);

    // Period 2s, lifetime 10s: casts at 2, 4, 6 and 8 seconds only.
    advance_ms(12_001).await;
    assert_eq!(agent.casts(), 4);
    assert_eq!(hp(&handle, WOLF), 960);
    assert_eq!(agent.state(), CompanionState::Terminated);
    assert!(!agent.has_periodic_timer());
    assert!(!agent.has_lifetime_timer());
    assert!(handle.companion(id).is_none());
    assert!(handle.companions_of(OWNER).is_empty());

    let mut changes = 0;
    let mut casts = 0;
    while let Ok(event) = companion_events.try_recv() {
        match event.notification {
            Notification::CompanionsChanged { owner } => {
                assert_eq!(owner, OWNER);
                changes += 1;
            }
            Notification::CompanionCast { companion, .. } => {
                assert_eq!(companion, id);
                casts += 1;
            }
            other => panic!("unexpected companion event {other:?}"),
        }
    }
    // One change for the spawn, exactly one for the termination.
    assert_eq!(changes, 2);
    assert_eq!(casts, 4);
}

#[tokio::test(start_paused = true)]
async fn logout_cancels_both_timers_and_stops_ticking() {
    let runtime = common::runtime().await;
    let handle = runtime.handle();
    handle.spawn_actor(Actor::player(1).with_hp(50, 100));

    let id = handle.spawn_companion(OWNER, LIFE_CUBIC).unwrap();
    let stale = handle.companion(id).unwrap();
    assert_eq!(stale.state(), CompanionState::Active);

    advance_ms(2_001).await;
    assert_eq!(stale.ticks(), 1);

    handle.logout(OWNER).unwrap();
    assert_eq!(stale.state(), CompanionState::Terminated);
    assert!(!stale.has_periodic_timer());
    assert!(!stale.has_lifetime_timer());
    assert!(handle.companion(id).is_none());
    assert!(handle.view(OWNER).is_none());

    advance_ms(20_000).await;
    assert_eq!(stale.ticks(), 1);
}

#[tokio::test(start_paused = true)]
async fn supportive_targeting_follows_the_most_wounded_member_in_range() {
    let runtime = common::runtime().await;
    let handle = runtime.handle();
    let party = PartyId(7);
    handle.spawn_actor(Actor::player(1).in_party(party));
    handle.spawn_actor(Actor::player(2).in_party(party).at(100, 0, 0).with_hp(60, 100));
    handle.spawn_actor(Actor::player(3).in_party(party).at(200, 0, 0).with_hp(40, 100));

    handle.spawn_companion(OWNER, LIFE_CUBIC).unwrap();

    advance_ms(2_001).await;
    assert_eq!(hp(&handle, ActorId(3)), 50);
    assert_eq!(hp(&handle, ActorId(2)), 60);

    move_to(&handle, ActorId(3), 5_000);
    advance_ms(2_000).await;
    assert_eq!(hp(&handle, ActorId(2)), 70);
    assert_eq!(hp(&handle, ActorId(3)), 50);
}

#[tokio::test(start_paused = true)]
async fn stance_bound_companion_sleeps_and_wakes() {
    let runtime = common::runtime().await;
    let handle = runtime.handle();
    handle.spawn_actor(Actor::player(1).targeting(WOLF));
    handle.spawn_actor(Actor::monster(2).at(300, 0, 0).with_hp(1_000, 1_000));

    let id = handle.spawn_companion(OWNER, STORM_CUBIC).unwrap();
    let agent = handle.companion(id).unwrap();
    handle.engage(OWNER);
    advance_ms(2_001).await;
    assert_eq!(agent.casts(), 1);

    handle.disengage(OWNER);
    advance_ms(2_000).await;
    assert_eq!(agent.state(), CompanionState::Dormant);
    assert!(!agent.has_periodic_timer());
    assert!(agent.has_lifetime_timer());

    advance_ms(2_000).await;
    assert_eq!(agent.ticks(), 2);

    assert_eq!(handle.engage(OWNER), 1);
    advance_ms(2_001).await;
    assert_eq!(agent.state(), CompanionState::Active);
    assert_eq!(agent.casts(), 2);
}

#[tokio::test(start_paused = true)]
async fn owner_death_terminates_every_companion_once() {
    let runtime = common::runtime().await;
    let handle = runtime.handle();
    handle.spawn_actor(Actor::player(1).with_hp(50, 100));

    let storm = handle.spawn_companion(OWNER, STORM_CUBIC).unwrap();
    let life = handle.spawn_companion(OWNER, LIFE_CUBIC).unwrap();
    let mut companion_events = handle.subscribe(Topic::Companion);

    assert_eq!(handle.owner_died(OWNER).unwrap(), 2);
    assert_eq!(handle.owner_died(OWNER).unwrap(), 0);
    assert!(handle.companion(storm).is_none());
    assert!(handle.companion(life).is_none());

    let mut changes = 0;
    while let Ok(event) = companion_events.try_recv() {
        if matches!(event.notification, Notification::CompanionsChanged { .. }) {
            changes += 1;
        }
    }
    assert_eq!(changes, 2);

    // A dead owner cannot summon again.
    assert!(handle.spawn_companion(OWNER, LIFE_CUBIC).is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn logout_racing_a_spawn_never_leaves_a_live_companion() {
    let runtime = common::runtime().await;
    let handle = runtime.handle();

    for _ in 0..200 {
        handle.spawn_actor(Actor::player(1));
        let (spawned, logged_out) = std::thread::scope(|scope| {
            let spawner = scope.spawn(|| handle.spawn_companion(OWNER, STORM_CUBIC));
            let leaver = scope.spawn(|| handle.logout(OWNER));
            (spawner.join().unwrap(), leaver.join().unwrap())
        });

        logged_out.unwrap();
        assert!(handle.view(OWNER).is_none());
        if let Ok(id) = spawned {
            assert!(handle.companion(id).is_none(), "{id} outlived its owner");
        }
    }
}
