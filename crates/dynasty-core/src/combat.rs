//! Combat: standard attacks, skills, deaths and legacy transfer.
//!
//! # Standard attacks
//!
//! [`SimulationContext::perform_standard_attack`] registers a repeating
//! action on the attacker with the attacker's resolved attack interval as
//! its period. It stays valid while the attacker is alive, in Attack mode,
//! still targeting a living target on an orthogonally adjacent tile. Each
//! swing deals the resolved attack damage, less the target's defense
//! reduction when the target is defending, and grants both participants
//! skill points equal to the undiminished damage.
//!
//! # Skills
//!
//! [`SimulationContext::initiate_skill`] registers a one-shot action whose
//! delay is the skill's resolved activation time, discounted by the
//! caster's run of consecutive standard attacks. On completion the skill's
//! effects are realized, the attack run resets, and the caster enters
//! cooldown for the resolved cooldown time.
//!
//! # Death
//!
//! A kill cancels the victim's action and schedules corpse removal after
//! the grace delay. A non-lineal victim's whole legacy goes to the killer
//! and it leaves the leaderboard. A lineal victim pays half its lineage's
//! legacy (rounded down) to the killer; the lineage keeps the rest and
//! schedules a successor.

use std::sync::Arc;

use dynasty_agents::SkillEffect;
use dynasty_types::{Activity, CharacterId, CombatMode, LegacyEntryType, LegacyHolder, LineageId};
use tracing::{debug, info};

use crate::actions::{KernelCheck, KernelEffect, KernelScheduler};
use crate::context::{KernelState, SimulationContext, duration_ms};
use crate::error::KernelError;
use crate::events::KernelEvent;
use crate::scheduler::ActionSpec;

impl SimulationContext {
    /// Start repeated standard attacks from `attacker` on `target`.
    ///
    /// Returns `false` without scheduling when either side is dead, the
    /// attacker is cooling down or not in Attack mode, or the two are not
    /// adjacent. Replaces the attacker's current action.
    ///
    /// # Errors
    ///
    /// Unknown character or an attribute resolution failure.
    pub fn perform_standard_attack(
        &mut self,
        attacker: CharacterId,
        target: CharacterId,
    ) -> Result<bool, KernelError> {
        if attacker == target {
            return Ok(false);
        }
        let striker = self.state.character(attacker)?;
        let victim = self.state.character(target)?;
        let ready = striker.is_alive()
            && victim.is_alive()
            && !striker.combat.cooling_down
            && striker.combat.mode == CombatMode::Attack
            && striker.position.is_adjacent(victim.position);
        if !ready {
            return Ok(false);
        }
        let interval_ms = duration_ms(striker.attack_interval_ms()?).max(1);

        self.state.character_mut(attacker)?.combat.target = Some(target);
        self.scheduler.schedule(
            ActionSpec::once(interval_ms, KernelEffect::StandardAttack { attacker, target })
                .repeating()
                .valid_while(KernelCheck::AttackEngaged { attacker, target })
                .owned_by(attacker),
        )?;
        self.state.set_activity(attacker, Activity::Attacking);
        debug!(%attacker, %target, interval_ms, "standard attack engaged");
        Ok(true)
    }

    /// Point `attacker` at `target` without starting an action, for
    /// targeted skills cast from range.
    ///
    /// Returns `false` when either side is dead or they are the same.
    ///
    /// # Errors
    ///
    /// Unknown character.
    pub fn select_target(
        &mut self,
        attacker: CharacterId,
        target: CharacterId,
    ) -> Result<bool, KernelError> {
        let living = self.state.character(target)?.is_alive();
        let striker = self.state.character_mut(attacker)?;
        if attacker == target || !living || !striker.is_alive() {
            return Ok(false);
        }
        striker.combat.target = Some(target);
        Ok(true)
    }

    /// Begin channelling `skill`.
    ///
    /// Returns `false` without scheduling when the caster is dead or
    /// cooling down. Replaces the caster's current action.
    ///
    /// # Errors
    ///
    /// Unknown character, a skill the caster's class does not define, or an
    /// attribute resolution failure.
    pub fn initiate_skill(&mut self, caster: CharacterId, skill: &str) -> Result<bool, KernelError> {
        let character = self.state.character(caster)?;
        let affinity = character.class.affinity(skill)?;
        if !character.is_alive() || character.combat.cooling_down {
            return Ok(false);
        }
        let activation = character.get_affect(&affinity.activation)?;
        let activation_ms = duration_ms(
            self.state
                .combat
                .discounted_activation(activation, character.combat.consecutive_attacks),
        );
        let name = affinity.name.clone();

        self.scheduler.schedule(
            ActionSpec::once(
                activation_ms,
                KernelEffect::CastSkill {
                    caster,
                    skill: name.clone(),
                },
            )
            .valid_while(KernelCheck::Alive { actor: caster })
            .owned_by(caster),
        )?;
        self.state.set_activity(caster, Activity::Casting);
        debug!(%caster, skill = name, activation_ms, "skill activation started");
        Ok(true)
    }
}

impl KernelState {
    /// One swing of a standard attack.
    pub(crate) fn standard_attack(
        &mut self,
        scheduler: &mut KernelScheduler,
        attacker: CharacterId,
        target: CharacterId,
    ) -> Result<(), KernelError> {
        let damage = self.character(attacker)?.attack_damage()?.max(0.0);
        let defender = self.character(target)?;
        let reduced = if defender.combat.mode == CombatMode::Defend {
            damage * defender.defense_damage_reduction()?
        } else {
            0.0
        };
        let dealt = (damage - reduced).max(0.0);

        let striker = self.character_mut(attacker)?;
        striker.grant_skill_points(damage);
        striker.combat.consecutive_attacks = striker.combat.consecutive_attacks.saturating_add(1);

        let defender = self.character_mut(target)?;
        defender.grant_skill_points(damage);
        let killed = defender.take_damage(dealt);
        let remaining_health = defender.combat.current_health;

        self.events.push(KernelEvent::Hit {
            attacker,
            target,
            damage,
            reduced,
            remaining_health,
        });
        debug!(%attacker, %target, damage, reduced, remaining_health, "standard attack hit");

        if killed {
            self.handle_death(scheduler, target, attacker)?;
        }
        Ok(())
    }

    /// Realize a skill whose activation completed, then start its cooldown.
    pub(crate) fn cast_skill(
        &mut self,
        scheduler: &mut KernelScheduler,
        caster: CharacterId,
        skill: &str,
    ) -> Result<(), KernelError> {
        let character = self.character(caster)?;
        if !character.is_alive() {
            return Ok(());
        }
        let class = Arc::clone(&character.class);
        let affinity = class.affinity(skill)?;

        for effect in &affinity.effects {
            self.realize(scheduler, caster, effect)?;
        }

        let character = self.character_mut(caster)?;
        character.combat.consecutive_attacks = 0;
        let cooldown_ms = duration_ms(character.get_affect(&affinity.cooldown)?);
        self.events.push(KernelEvent::SkillCast {
            caster,
            skill: affinity.name.clone(),
        });
        info!(%caster, skill = affinity.name, cooldown_ms, "skill cast");

        if cooldown_ms > 0 {
            self.character_mut(caster)?.combat.cooling_down = true;
            self.set_activity(caster, Activity::Recovering);
            scheduler.schedule(ActionSpec::once(
                cooldown_ms,
                KernelEffect::EndCooldown { actor: caster },
            ))?;
        }
        Ok(())
    }

    fn realize(
        &mut self,
        scheduler: &mut KernelScheduler,
        caster: CharacterId,
        effect: &SkillEffect,
    ) -> Result<(), KernelError> {
        let character = self.character(caster)?;
        let origin = character.position;
        match effect {
            SkillEffect::Strike { damage, range } => {
                let amount = character.get_affect(damage)?;
                let reach = character.get_affect(range)?;
                let Some(target) = character.combat.target else {
                    return Ok(());
                };
                let in_reach = self.characters.get(&target).is_some_and(|victim| {
                    victim.is_alive() && f64::from(origin.chebyshev(victim.position)) <= reach
                });
                if in_reach {
                    self.skill_damage(scheduler, caster, target, amount)?;
                }
            }
            SkillEffect::Burst { damage, radius } => {
                let amount = character.get_affect(damage)?;
                let reach = character.get_affect(radius)?;
                let caught: Vec<CharacterId> = self
                    .characters
                    .values()
                    .filter(|victim| {
                        victim.id != caster
                            && victim.is_alive()
                            && f64::from(origin.chebyshev(victim.position)) <= reach
                    })
                    .map(|victim| victim.id)
                    .collect();
                for target in caught {
                    self.skill_damage(scheduler, caster, target, amount)?;
                }
            }
            SkillEffect::Mend { amount } => {
                let amount = character.get_affect(amount)?;
                let restored = self.character_mut(caster)?.heal(amount)?;
                if restored > 0.0 {
                    self.events.push(KernelEvent::Healed {
                        character: caster,
                        amount: restored,
                    });
                }
            }
        }
        Ok(())
    }

    fn skill_damage(
        &mut self,
        scheduler: &mut KernelScheduler,
        caster: CharacterId,
        target: CharacterId,
        amount: f64,
    ) -> Result<(), KernelError> {
        let victim = self.character_mut(target)?;
        if !victim.is_alive() {
            return Ok(());
        }
        let damage = amount.max(0.0);
        let killed = victim.take_damage(damage);
        let remaining_health = victim.combat.current_health;
        self.events.push(KernelEvent::Hit {
            attacker: caster,
            target,
            damage,
            reduced: 0.0,
            remaining_health,
        });
        if killed {
            self.handle_death(scheduler, target, caster)?;
        }
        Ok(())
    }

    // -- Death -------------------------------------------------------------

    fn handle_death(
        &mut self,
        scheduler: &mut KernelScheduler,
        victim: CharacterId,
        killer: CharacterId,
    ) -> Result<(), KernelError> {
        scheduler.cancel_owned(victim);
        let corpse = self.character(victim)?;
        let lineage = corpse.lineage();
        info!(%victim, name = corpse.name, %killer, "character died");
        self.events.push(KernelEvent::Died {
            character: victim,
            killer: Some(killer),
        });
        scheduler.schedule(ActionSpec::once(
            self.combat.corpse_grace_ms,
            KernelEffect::RemoveCorpse { actor: victim },
        ))?;

        match lineage {
            Some(lineage) => self.lineal_death(scheduler, victim, lineage, killer),
            None => self.beast_death(victim, killer),
        }
    }

    fn beast_death(&mut self, victim: CharacterId, killer: CharacterId) -> Result<(), KernelError> {
        let amount = core::mem::take(&mut self.character_mut(victim)?.combat.legacy);
        self.registry.remove(victim);
        if amount == 0 {
            return Ok(());
        }
        let to = self.character(killer)?.legacy_holder();
        let tick = self.clock.tick();
        self.ledger.record_bounty(tick, victim, to, amount)?;
        self.credit_killer(killer, amount)?;
        self.events.push(KernelEvent::LegacyTransferred {
            from: LegacyHolder::Character(victim),
            to,
            amount,
            entry_type: LegacyEntryType::Bounty,
        });
        info!(%victim, %killer, amount, "bounty transferred");
        Ok(())
    }

    fn lineal_death(
        &mut self,
        scheduler: &mut KernelScheduler,
        victim: CharacterId,
        lineage_id: LineageId,
        killer: CharacterId,
    ) -> Result<(), KernelError> {
        self.registry.remove(victim);
        let lineage = self.lineages.get_mut(lineage_id)?;
        lineage.mark_holder_dead();
        let amount = lineage.tribute();
        if amount > 0 {
            lineage.debit(amount)?;
            let to = self.character(killer)?.legacy_holder();
            let tick = self.clock.tick();
            self.ledger
                .record_tribute(tick, lineage_id, victim, to, amount)?;
            self.credit_killer(killer, amount)?;
            self.events.push(KernelEvent::LegacyTransferred {
                from: LegacyHolder::Lineage(lineage_id),
                to,
                amount,
                entry_type: LegacyEntryType::Tribute,
            });
            info!(%victim, lineage = %lineage_id, %killer, amount, "tribute transferred");
        }
        self.rerank_lineage(lineage_id);
        self.schedule_successor(scheduler, lineage_id)?;
        Ok(())
    }

    /// Add `amount` to whoever holds `killer`'s legacy and re-rank.
    fn credit_killer(&mut self, killer: CharacterId, amount: u64) -> Result<(), KernelError> {
        let character = self.character_mut(killer)?;
        if let Some(lineage) = character.lineage() {
            self.lineages.get_mut(lineage)?.credit(amount)?;
            self.rerank_lineage(lineage);
            return Ok(());
        }
        character.combat.legacy = character
            .combat
            .legacy
            .checked_add(amount)
            .ok_or(KernelError::LegacyOverflow(killer))?;
        let legacy = character.combat.legacy;
        self.registry.update_legacy(killer, legacy);
        Ok(())
    }

    /// Schedule a lineage's next holder and announce it.
    pub(crate) fn schedule_successor(
        &mut self,
        scheduler: &mut KernelScheduler,
        lineage_id: LineageId,
    ) -> Result<bool, KernelError> {
        let delay_ms = self.lineage_config.spawn_delay_ms;
        let scheduled = self
            .lineages
            .spawn_successor(lineage_id, scheduler, delay_ms)?;
        if scheduled {
            let skill_points = self
                .lineages
                .get(lineage_id)
                .map_or(0, |lineage| lineage.pending_skill_points());
            self.events.push(KernelEvent::SuccessorScheduled {
                lineage: lineage_id,
                delay_ms,
                skill_points,
            });
        }
        Ok(scheduled)
    }
}
