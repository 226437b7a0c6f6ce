//! Stable snapshot hashing for deterministic verification.
//! This module exists to keep hashing concerns separate from simulation control code.
//! It does not own narration or scheduling.

use std::hash::Hasher;

use super::*;
use crate::state::ResourcePool;
use xxhash_rust::xxh3::Xxh3;

impl Simulation {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u64(self.world.turn);
        hasher.write_u64(self.scheduler.ticks());
        hasher.write_u64(self.world.actors.len() as u64);
        for actor in self.world.actors.values() {
            hasher.write_u8(actor.kind as u8);
            match actor.pos {
                Some(pos) => {
                    hasher.write_i32(pos.y);
                    hasher.write_i32(pos.x);
                }
                None => hasher.write_u8(0xff),
            }
            hasher.write_u32(actor.energy.as_ref().map_or(0, |ledger| ledger.energy()));
            write_pool(&mut hasher, actor.health.as_ref());
            write_pool(&mut hasher, actor.mana.as_ref());
            if let Some(brain) = &actor.brain {
                hasher.write_u8(brain.phase as u8);
                hasher.write_u8(u8::from(brain.target.is_some()));
            }
        }
        hasher.finish()
    }
}

fn write_pool(hasher: &mut Xxh3, pool: Option<&ResourcePool>) {
    if let Some(pool) = pool {
        hasher.write_i32(pool.current);
        hasher.write_i32(pool.max);
    }
}
