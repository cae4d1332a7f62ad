//! Scripted encounter: one caster, a wounded party member, two cubics and a
//! pack of monsters, played out in real time against the runtime.

use std::time::Duration;

use anyhow::Result;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use cast_core::{
    ActorId, CastOptions, CompanionKindId, GameError, PartyId, SkillRef, Targetable, Vitals,
};
use cast_runtime::{Actor, RuntimeHandle, Topic};

const CASTER: ActorId = ActorId(1);
const HEALER_TARGET: ActorId = ActorId(2);
const PARTY: PartyId = PartyId(1);

const WIND_STRIKE: SkillRef = SkillRef::new(1177, 2);
const ICE_BOLT: SkillRef = SkillRef::new(1184, 1);
const LIFE_DRAIN: SkillRef = SkillRef::new(1090, 1);
const HEAL: SkillRef = SkillRef::new(1011, 1);
const ARCANE_SHIELD: SkillRef = SkillRef::new(1200, 1);

const STORM_CUBIC: CompanionKindId = CompanionKindId(1);
const LIFE_CUBIC: CompanionKindId = CompanionKindId(3);

/// Damage rotation, tried in order each step.
const ROTATION: [SkillRef; 3] = [ICE_BOLT, WIND_STRIKE, LIFE_DRAIN];

pub struct Encounter {
    handle: RuntimeHandle,
    duration: Duration,
}

impl Encounter {
    pub fn new(handle: RuntimeHandle, duration: Duration) -> Self {
        Self { handle, duration }
    }

    pub async fn run(self) -> Result<()> {
        let printers = self.spawn_event_printers();
        let result = self.play().await;
        for printer in printers {
            printer.abort();
        }
        result
    }

    async fn play(&self) -> Result<()> {
        let handle = &self.handle;

        let restored = handle.login(
            Actor::player(1)
                .with_vitals(Vitals::full(600, 400))
                .in_party(PARTY)
                .with_skill(WIND_STRIKE)
                .with_skill(ICE_BOLT)
                .with_skill(LIFE_DRAIN)
                .with_skill(HEAL)
                .with_skill(ARCANE_SHIELD),
        )?;
        info!(restored, "caster logged in");

        handle.spawn_actor(
            Actor::player(2)
                .at(120, 40, 0)
                .in_party(PARTY)
                .with_hp(140, 420),
        );
        let monsters = [
            Actor::monster(100).at(320, 0, 0).with_hp(260, 260),
            Actor::monster(101).at(360, 90, 0).with_hp(320, 320),
            Actor::monster(102).at(280, -120, 0).with_hp(300, 300),
        ];
        let mut pack: Vec<ActorId> = monsters.iter().map(|m| m.id).collect();
        for monster in monsters {
            handle.spawn_actor(monster);
        }

        handle.spawn_companion(CASTER, STORM_CUBIC)?;
        handle.spawn_companion(CASTER, LIFE_CUBIC)?;
        self.try_cast(ARCANE_SHIELD, CastOptions::default());

        let deadline = Instant::now() + self.duration;
        let mut step = tokio::time::interval(Duration::from_millis(500));
        step.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while Instant::now() < deadline {
            step.tick().await;

            pack.retain(|id| handle.view(*id).is_some_and(|view| !view.is_dead()));
            let Some(&target) = pack.first() else {
                info!("pack cleared");
                break;
            };
            let retargeted = handle
                .with_actor(CASTER, |caster| {
                    let changed = caster.target != Some(target);
                    caster.target = Some(target);
                    changed
                })
                .unwrap_or(false);
            if retargeted {
                info!(%target, "caster engages");
                handle.engage(CASTER);
            }

            let wounded = handle
                .view(HEALER_TARGET)
                .is_some_and(|view| view.vitals.hp * 2 < view.vitals.max_hp);
            if wounded && self.try_cast(HEAL, CastOptions::at(HEALER_TARGET)) {
                continue;
            }
            for skill in ROTATION {
                if self.try_cast(skill, CastOptions::at(target)) {
                    break;
                }
            }
        }

        handle.disengage(CASTER);
        let metrics = handle.metrics();
        info!(metrics = %serde_json::to_string(&metrics)?, "encounter finished");
        handle.logout(CASTER)?;
        Ok(())
    }

    /// True when the request started or queued a cast.
    fn try_cast(&self, skill: SkillRef, options: CastOptions) -> bool {
        match self.handle.request_cast(CASTER, skill.id, options) {
            Ok(outcome) => {
                debug!(%skill, ?outcome, "cast accepted");
                true
            }
            Err(err) => {
                debug!(%skill, code = err.error_code(), "cast rejected");
                false
            }
        }
    }

    /// One task per topic writing every event as a JSON line.
    fn spawn_event_printers(&self) -> Vec<JoinHandle<()>> {
        self.handle
            .subscribe_multiple(&Topic::ALL)
            .into_iter()
            .map(|(topic, mut rx)| {
                tokio::spawn(async move {
                    loop {
                        match rx.recv().await {
                            Ok(event) => match serde_json::to_string(&event) {
                                Ok(json) => info!(target: "shard::events", %topic, "{json}"),
                                Err(err) => warn!(%topic, error = %err, "event not encodable"),
                            },
                            Err(RecvError::Lagged(skipped)) => {
                                warn!(%topic, skipped, "event printer lagged");
                            }
                            Err(RecvError::Closed) => break,
                        }
                    }
                })
            })
            .collect()
    }
}
