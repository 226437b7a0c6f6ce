//! Cooldown- and mana-gated spell choice for the current turn.

use tracing::trace;

use super::{SelectedSpell, cooldown_elapsed};
use crate::behavior::BehaviorProfile;
use crate::content::{SpellCatalog, SpellEffect};
use crate::state::Actor;

/// Picks the known spell with the lowest priority number that is listed by the profile,
/// affordable, and off cooldown. Heals are only considered while the caster is wounded.
///
/// At equal priority the last qualifying spell in the actor's known-spell order wins.
pub fn select_spell(
    actor: &Actor,
    profile: &BehaviorProfile,
    spells: &SpellCatalog,
    turn: u64,
) -> Option<SelectedSpell> {
    if actor.known_spells.is_empty() || !profile.has_spell_priorities() {
        return None;
    }
    let brain = actor.brain.as_ref()?;
    let mana = actor.mana_available();
    let wounded = actor.health.as_ref().is_some_and(|hp| !hp.is_full());

    let mut best: Option<(u32, SelectedSpell)> = None;
    for id in &actor.known_spells {
        let Some(priority) = profile.spell_priority(id) else {
            continue;
        };
        let Some(def) = spells.get(id) else {
            trace!(spell = %id, "spell missing from catalog");
            continue;
        };
        if def.mana_cost > mana {
            continue;
        }
        if matches!(def.effect, SpellEffect::Heal { .. }) && !wounded {
            continue;
        }
        if !cooldown_elapsed(brain.last_spell_cast.get(id).copied(), turn, def.cooldown) {
            continue;
        }
        if best.as_ref().is_none_or(|(lowest, _)| priority <= *lowest) {
            let selected = SelectedSpell {
                id: def.id.clone(),
                mana_cost: def.mana_cost,
                range: def.range,
                effect: def.effect.clone(),
            };
            best = Some((priority, selected));
        }
    }
    best.map(|(_, spell)| spell)
}
