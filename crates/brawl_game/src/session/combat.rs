//! Hit resolution, damage, defeat and respawn

use super::{absorb, Session, TimerAction};
use crate::actor::{yaw_rotation, Actor};
use crate::events::GameEvent;
use crate::prop::PropState;
use brawl_combat::{check_thrown, resolve_melee, AttackKind, Target};
use brawl_core::{EntityId, EntityRef, TimerId};
use brawl_physics::{BodyMode, RigidBodyHandle};

impl Session {
    /// Resolve every swing raised this tick. NPCs only ever hit the player
    /// and the player only ever hits NPCs.
    pub(super) fn resolve_intents(&mut self) {
        for intent in std::mem::take(&mut self.intents) {
            let Some(attacker) = self.actors.get(intent.attacker) else {
                continue;
            };
            if attacker.is_defeated() {
                continue;
            }
            let attacker_is_player = attacker.is_player();
            let targets = self.targets(|a| a.is_player() != attacker_is_player);

            for hit in resolve_melee(&intent, &targets, &self.config.combat) {
                self.apply_damage(intent.attacker, hit.target, intent.kind, hit.damage);
            }
        }
    }

    /// Check every prop with an open throw window against the NPCs
    pub(super) fn check_thrown_props(&mut self) {
        let in_flight: Vec<(EntityId, EntityId, f32, TimerId, RigidBodyHandle)> = self
            .props
            .iter()
            .filter_map(|(id, p)| match p.state {
                PropState::Thrown {
                    thrower,
                    damage,
                    window,
                } => Some((id, thrower, damage, window, p.body)),
                _ => None,
            })
            .collect();

        for (object, thrower, damage, window, body) in in_flight {
            let (Ok(position), Ok(velocity)) = (
                self.physics.body_position(body),
                self.physics.linear_velocity(body),
            ) else {
                continue;
            };
            let targets = self.targets(|a| !a.is_player() && a.id != thrower);
            let Some(target) = check_thrown(position, velocity, &targets, &self.config.combat)
            else {
                continue;
            };

            // One hit per throw
            self.timers.cancel(window);
            if let Some(prop) = self.props.get_mut(object) {
                prop.state = PropState::Free;
            }
            self.apply_damage(thrower, target, AttackKind::ThrownHit, damage);
        }
    }

    /// Snapshot of the actors passing `filter` as resolver targets
    fn targets(&self, filter: impl Fn(&Actor) -> bool) -> Vec<Target> {
        self.actors
            .iter()
            .filter(|(_, a)| filter(a))
            .filter_map(|(id, a)| {
                let position = self.physics.body_position(a.body).ok()?;
                Some(Target {
                    id,
                    position,
                    targetable: !a.is_defeated(),
                })
            })
            .collect()
    }

    /// Take health from `target` and credit `attacker` with what was dealt
    pub(super) fn apply_damage(
        &mut self,
        attacker: EntityId,
        target: EntityId,
        kind: AttackKind,
        amount: f32,
    ) {
        let Some(victim) = self.actors.get_mut(target) else {
            return;
        };
        let outcome = victim.vitals.apply_damage(amount);
        if outcome.dealt <= 0.0 {
            return;
        }
        let health = victim.vitals.health();
        log::debug!(
            "{} took {:.0} from a {:?}, {:.0} left",
            victim.name,
            outcome.dealt,
            kind,
            health
        );

        self.events.push(GameEvent::Hit {
            attacker,
            target,
            kind,
            damage: outcome.dealt,
        });
        self.events.push(GameEvent::HealthChanged {
            actor: target,
            health,
        });

        if let Some(credited) = self.actors.get_mut(attacker) {
            credited.vitals.add_score(outcome.dealt.round() as u32);
            self.events.push(GameEvent::ScoreChanged {
                actor: attacker,
                score: credited.vitals.score(),
            });
        }

        if outcome.defeated {
            self.defeat(target);
        }
    }

    /// Set an actor's health directly (clamped to `[0, 100]`). Reaching zero
    /// defeats the actor. Defeated actors are left alone until they respawn.
    pub fn set_health(&mut self, id: EntityId, health: f32) -> bool {
        let Some(actor) = self.actors.get_mut(id) else {
            return false;
        };
        if actor.is_defeated() {
            return false;
        }
        actor.vitals.set_health(health);
        let health = actor.vitals.health();
        let defeated = actor.vitals.is_defeated();
        self.events.push(GameEvent::HealthChanged { actor: id, health });
        if defeated {
            self.defeat(id);
        }
        true
    }

    pub fn set_score(&mut self, id: EntityId, score: u32) -> bool {
        let Some(actor) = self.actors.get_mut(id) else {
            return false;
        };
        actor.vitals.set_score(score);
        self.events.push(GameEvent::ScoreChanged { actor: id, score });
        true
    }

    /// Take an actor out: drop its prop, cancel its timers, hide it and make
    /// its body inert. NPCs come back after the respawn delay; the player
    /// ends the session.
    fn defeat(&mut self, id: EntityId) {
        if self.actors.get(id).map_or(true, |a| a.is_defeated()) {
            return;
        }
        self.release_held(id);
        self.timers.cancel_owner(EntityRef::actor(id));
        self.intents.retain(|intent| intent.attacker != id);

        let Some(actor) = self.actors.get_mut(id) else {
            return;
        };
        actor.defeat();
        let body = actor.body;
        let is_player = actor.is_player();
        let score = actor.vitals.score();
        let name = actor.name.clone();

        absorb(self.physics.set_body_mode(body, BodyMode::Kinematic), "defeat");
        absorb(self.physics.set_body_sensor(body, true), "defeat");
        self.events.push(GameEvent::ActorDefeated {
            actor: id,
            is_player,
        });

        if is_player {
            log::info!("{} was defeated", name);
            if !self.game_over {
                self.game_over = true;
                log::info!("Game over, final score {}", score);
                self.events.push(GameEvent::GameOver { score });
            }
        } else {
            let delay = self.config.npc.respawn_delay;
            self.timers.schedule(
                self.time + delay as f64,
                EntityRef::actor(id),
                TimerAction::Respawn,
            );
            log::info!("{} was defeated, back in {:.1}s", name, delay);
        }
    }

    /// Bring a defeated NPC back at full health at the next spawn point
    pub(super) fn respawn(&mut self, id: EntityId) {
        if !self.actors.get(id).is_some_and(|a| a.is_defeated()) {
            return;
        }
        let Some(position) = self.take_spawn_point() else {
            log::warn!("No spawn point for {}", id);
            return;
        };

        let now = self.time;
        let Some(actor) = self.actors.get_mut(id) else {
            return;
        };
        actor.revive();
        if let Some(brain) = actor.brain.as_mut() {
            brain.reset(&self.config.npc, now, &mut self.rng);
        }
        let body = actor.body;
        absorb(self.physics.set_body_mode(body, BodyMode::Dynamic), "respawn");
        absorb(self.physics.set_body_sensor(body, false), "respawn");
        absorb(self.physics.teleport(body, position), "respawn");
        actor
            .visual
            .set_transform(position, yaw_rotation(actor.yaw));

        log::info!("{} respawned at {:?}", actor.name, position);
        let health = actor.vitals.health();
        self.events.push(GameEvent::NpcRespawned { actor: id, position });
        self.events.push(GameEvent::HealthChanged { actor: id, health });
    }
}

#[cfg(test)]
mod tests {
    use crate::actor::ActionState;
    use crate::config::GameConfig;
    use crate::events::GameEvent;
    use crate::headless::HeadlessScene;
    use crate::session::Session;
    use glam::Vec3;

    const DT: f32 = 1.0 / 60.0;

    fn duel() -> Session {
        let mut config = GameConfig::default().without_objects();
        config.npc.population_cap = 1;
        config.npc.spawn_points = vec![Vec3::new(0.0, 1.0, -6.0)];
        config.npc.follow_range = 2.0;
        let mut s = Session::new(config, Box::new(HeadlessScene::new())).unwrap();
        s.spawn_npcs().unwrap();
        s
    }

    #[test]
    fn test_set_health_to_zero_defeats() {
        let mut s = duel();
        let npc = s.npc_ids()[0];
        assert!(s.set_health(npc, 0.0));
        assert_eq!(s.actor(npc).unwrap().state(), ActionState::Defeated);
        assert!(!s.set_health(npc, 50.0));
        assert_eq!(s.actor(npc).unwrap().health(), 0.0);

        let events = s.drain_events();
        assert!(events.contains(&GameEvent::ActorDefeated {
            actor: npc,
            is_player: false
        }));
        assert!(!s.is_game_over());
    }

    #[test]
    fn test_set_health_clamps() {
        let mut s = duel();
        let player = s.player_id().unwrap();
        s.set_health(player, 250.0);
        assert_eq!(s.actor(player).unwrap().health(), 100.0);
        s.set_health(player, -4.0);
        assert_eq!(s.actor(player).unwrap().health(), 0.0);
        assert!(s.is_game_over());
    }

    #[test]
    fn test_score_is_set_and_reported() {
        let mut s = duel();
        let player = s.player_id().unwrap();
        assert!(s.set_score(player, 42));
        assert_eq!(s.actor(player).unwrap().score(), 42);
        assert_eq!(
            s.drain_events(),
            vec![GameEvent::ScoreChanged {
                actor: player,
                score: 42
            }]
        );
    }

    #[test]
    fn test_kick_scores_damage() {
        let mut s = duel();
        let player = s.player_id().unwrap();
        let npc = s.npc_ids()[0];
        s.place_actor(npc, Vec3::new(0.0, 0.95, -1.2), 0.0);
        s.tick(DT).unwrap();

        assert!(s.kick(player));
        s.tick(DT).unwrap();
        assert_eq!(s.actor(npc).unwrap().health(), 80.0);
        assert_eq!(s.actor(player).unwrap().score(), 20);
    }
}
