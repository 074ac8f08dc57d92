//! NPC behavior: one decision per live NPC per tick

use super::{absorb, Session};
use crate::actor::{yaw_of, yaw_rotation};
use brawl_ai::{NpcContext, NpcDecision};
use brawl_core::EntityId;
use glam::Vec3;

impl Session {
    pub(super) fn update_npcs(&mut self) {
        let player = if self.game_over {
            None
        } else {
            self.player()
                .filter(|p| !p.is_defeated())
                .and_then(|p| self.physics.body_position(p.body).ok())
        };

        // Positions at the start of the phase; every NPC steers off the
        // same snapshot
        let live: Vec<(EntityId, Vec3)> = self
            .actors
            .iter()
            .filter(|(_, a)| a.brain.is_some() && !a.is_defeated())
            .filter_map(|(id, a)| self.physics.body_position(a.body).ok().map(|p| (id, p)))
            .collect();

        for &(id, position) in &live {
            let neighbors: Vec<Vec3> = live
                .iter()
                .filter(|(other, _)| *other != id)
                .map(|(_, p)| *p)
                .collect();
            let ctx = NpcContext {
                now: self.time,
                position,
                player,
                neighbors: &neighbors,
            };

            let Some(brain) = self.actors.get_mut(id).and_then(|a| a.brain.as_mut()) else {
                continue;
            };
            let decision = brain.think(&ctx, &self.config.npc, &mut self.rng);
            self.apply_npc_decision(id, position, decision);
        }
    }

    fn apply_npc_decision(&mut self, id: EntityId, position: Vec3, decision: NpcDecision) {
        let Some(actor) = self.actors.get_mut(id) else {
            return;
        };
        let body = actor.body;
        let mut velocity = self.physics.linear_velocity(body).unwrap_or(Vec3::ZERO);

        let mut attack = None;
        match decision {
            NpcDecision::Idle => {
                velocity.x = 0.0;
                velocity.z = 0.0;
                actor.set_locomotion(false);
            }
            NpcDecision::Pursue {
                direction, speed, ..
            } => {
                if direction != Vec3::ZERO {
                    actor.yaw = yaw_of(direction);
                }
                velocity.x = direction.x * speed;
                velocity.z = direction.z * speed;
                actor.set_locomotion(true);
            }
            NpcDecision::Engage {
                facing,
                attack: kind,
            } => {
                if facing != Vec3::ZERO {
                    actor.yaw = yaw_of(facing);
                }
                velocity.x = 0.0;
                velocity.z = 0.0;
                actor.set_locomotion(false);
                attack = kind;
            }
        }

        // Anti-sink
        let min_height = self.config.npc.min_height;
        if position.y < min_height {
            absorb(
                self.physics
                    .set_body_position(body, Vec3::new(position.x, min_height, position.z)),
                "npc height clamp",
            );
            velocity.y = velocity.y.max(0.0);
        }

        absorb(self.physics.set_linear_velocity(body, velocity), "npc move");
        absorb(
            self.physics.set_body_rotation(body, yaw_rotation(actor.yaw)),
            "npc turn",
        );

        if let Some(kind) = attack {
            if !self.start_attack(id, kind) {
                // The brain already booked the attack; undo it
                if let Some(brain) = self.actors.get_mut(id).and_then(|a| a.brain.as_mut()) {
                    brain.end_attack();
                }
            }
        }
    }
}
