//! What standing in a field does to the creature standing in it.
//!
//! Characters (the player and NPCs) are hurt per body part and resisted by
//! worn protection; monsters collect a single pending damage total that is
//! applied once after every field on their tile has had its say.

use crate::field::FieldKind;
use crate::rng::SimRng;
use crate::simulation::constants::*;
use crate::simulation::effects::FieldEvent;
use crate::world::creature::{
    BodyPart, Character, Creature, DamageKind, EffectKind, Monster, MonsterFlag, Trait,
};
use crate::world::item::Material;
use crate::world::{Point, World};

/// Apply every field on the creature's tile to the creature at `index`.
/// Dead creatures are skipped; a creature that dies part way stops
/// reacting to the rest of the tile.
pub fn creature_in_field(
    world: &mut World,
    rng: &mut SimRng,
    index: usize,
    events: &mut Vec<FieldEvent>,
) {
    let Some(creature) = world.creatures.get(index) else {
        return;
    };
    if creature.dead || world.field_count(creature.pos) == 0 {
        return;
    }
    let pos = creature.pos;
    let mut exposure = Exposure {
        world,
        rng,
        events,
        index,
        pos,
    };
    match exposure.creature().as_character().cloned() {
        Some(character) => exposure.character(&character),
        None => {
            if let Some(monster) = exposure.creature().as_monster().cloned() {
                exposure.monster(&monster);
            }
        }
    }
}

struct Exposure<'a> {
    world: &'a mut World,
    rng: &'a mut SimRng,
    events: &'a mut Vec<FieldEvent>,
    index: usize,
    pos: Point,
}

impl Exposure<'_> {
    fn creature(&mut self) -> &mut Creature {
        &mut self.world.creatures[self.index]
    }

    fn is_dead(&self) -> bool {
        self.world.creatures[self.index].dead
    }

    /// Message for the player's own log.
    fn tell(&mut self, text: &str) {
        if self.world.creatures[self.index].is_player() {
            self.events.push(FieldEvent::Message(text.to_string()));
        }
    }

    fn remove(&mut self, kind: FieldKind) {
        self.world.remove_field(self.pos, kind);
    }

    /// Shrink a sticky field by one, removing it at the bottom tier.
    fn wear_down(&mut self, kind: FieldKind, density: i32) {
        if density == 1 {
            self.remove(kind);
        } else if let Some(entry) = self.world.get_field_mut(self.pos, kind) {
            entry.intensify(-1);
        }
    }

    fn kinds_here(&self) -> Vec<(FieldKind, i32)> {
        self.world
            .field_at(self.pos)
            .map(|f| f.iter().map(|e| (e.kind(), e.density())).collect())
            .unwrap_or_default()
    }

    /// A random walkable square within rift range, or None after the
    /// allotted attempts.
    fn rift_destination(&mut self) -> Option<Point> {
        for _ in 0..FATIGUE_TELEPORT_TRIES {
            let dx = self.rng.range(-FATIGUE_TELEPORT_RANGE, FATIGUE_TELEPORT_RANGE);
            let dy = self.rng.range(-FATIGUE_TELEPORT_RANGE, FATIGUE_TELEPORT_RANGE);
            let q = self.pos.offset(dx, dy);
            if q != self.pos && self.world.move_cost(q) > 0 {
                return Some(q);
            }
        }
        None
    }

    fn env(&mut self, kind: EffectKind, part: BodyPart, strength: i32, duration: i32) -> bool {
        let creature = &mut self.world.creatures[self.index];
        creature.add_env_effect(self.rng, kind, part, strength, duration)
    }

    // === Characters ===

    fn character(&mut self, ch: &Character) {
        let vehicle = self.world.tile(self.pos).and_then(|t| t.vehicle.as_ref());
        let has_vehicle = vehicle.is_some();
        let inside = ch.in_vehicle && vehicle.is_some_and(|v| v.covered);

        for (kind, density) in self.kinds_here() {
            if self.is_dead() {
                break;
            }
            if !self.world.has_field(self.pos, kind) {
                continue;
            }
            match kind {
                FieldKind::Web => {
                    let walker = ch.has_trait(Trait::WebWalker);
                    if !ch.in_vehicle && !walker {
                        self.creature().add_effect_intensity(EffectKind::Webbed, 1, density);
                    }
                    if ch.in_vehicle || !walker {
                        self.remove(kind);
                    }
                }
                FieldKind::Acid if !has_vehicle => self.acid_on_character(density),
                FieldKind::Sap if !ch.in_vehicle => {
                    self.tell("The sap sticks to you!");
                    self.creature().add_effect(EffectKind::Sap, density * 2);
                    self.wear_down(kind, density);
                }
                FieldKind::Sludge => {
                    self.tell("The sludge is thick and sticky. You struggle to pull free.");
                    self.creature().mod_moves(-300 * density);
                    self.remove(kind);
                }
                FieldKind::Fire if !ch.is_heat_immune() => {
                    let adjusted = density
                        - if inside {
                            2
                        } else if ch.in_vehicle {
                            1
                        } else {
                            0
                        };
                    self.burn_character(ch, adjusted);
                }
                FieldKind::Smoke if !inside => {
                    let (strength, duration) = match density {
                        3 => (4, 15),
                        2 => (2, 7),
                        _ => (1, 2),
                    };
                    self.env(EffectKind::Smoke, BodyPart::Mouth, strength, duration);
                }
                FieldKind::TearGas => {
                    if (density > 1 || !self.rng.one_in(3)) && (!inside || self.rng.one_in(3)) {
                        self.env(EffectKind::TearGas, BodyPart::Mouth, 5, 20);
                    }
                    if density > 1 && (!inside || self.rng.one_in(3)) {
                        self.env(EffectKind::Blind, BodyPart::Eyes, density * 2, 10);
                    }
                }
                FieldKind::RelaxGas => {
                    if (density > 1 || !self.rng.one_in(3)) && (!inside || self.rng.one_in(3)) {
                        self.env(EffectKind::RelaxGas, BodyPart::Mouth, density * 2, 3);
                    }
                }
                FieldKind::FungalHaze => {
                    if !ch.has_trait(Trait::FungalImmune) && (!inside || self.rng.one_in(4)) {
                        self.env(EffectKind::Fungus, BodyPart::Mouth, 4, 100);
                        self.env(EffectKind::Fungus, BodyPart::Eyes, 4, 100);
                    }
                }
                FieldKind::Dazzling => {
                    if density > 1 || self.rng.one_in(5) {
                        self.env(EffectKind::Blind, BodyPart::Eyes, 10, 10);
                    } else {
                        self.env(EffectKind::Blind, BodyPart::Eyes, 2, 2);
                    }
                }
                FieldKind::ToxicGas if !inside => {
                    let inhaled = match density {
                        3 => self.env(EffectKind::BadPoison, BodyPart::Mouth, 5, 30),
                        2 => self.env(EffectKind::Poison, BodyPart::Mouth, 5, 30),
                        _ => self.env(EffectKind::Poison, BodyPart::Mouth, 2, 20),
                    };
                    if inhaled {
                        let name = kind.def().variant(density).name;
                        self.tell(&format!("You feel sick from inhaling the {}", name));
                    }
                }
                FieldKind::NukeGas => {
                    let dose = self.rng.range(density, density * (density + 1));
                    if let Some(c) = self.creature().as_character_mut() {
                        c.radiation += dose;
                    }
                    if density == 3 {
                        self.tell("This radioactive gas burns!");
                        let burn = self.rng.range(1, 3);
                        self.creature().hurt_all(burn);
                    }
                }
                FieldKind::FlameBurst if !inside => {
                    if ch.is_heat_immune() {
                        self.tell("These flames do not burn you.");
                    } else {
                        self.tell("You're torched by flames!");
                        let legs = self.rng.range(2, 6);
                        let torso = self.rng.range(4, 9);
                        let creature = self.creature();
                        creature.deal_damage(BodyPart::LegL, DamageKind::Heat, legs);
                        creature.deal_damage(BodyPart::LegR, DamageKind::Heat, legs);
                        creature.deal_damage(BodyPart::Torso, DamageKind::Heat, torso);
                        creature.check_dead_state();
                    }
                }
                FieldKind::Electricity => {
                    if ch.has_trait(Trait::ElectricImmune) {
                        self.tell("The electric cloud doesn't affect you.");
                    } else {
                        self.tell("You're electrocuted!");
                        let shock = self.rng.range(1, density);
                        self.creature().hurt_all(shock);
                        if self.rng.one_in(8 - density) && !self.rng.one_in(30 - ch.strength) {
                            self.tell("You're paralyzed!");
                            let lost = self.rng.range(density * 150, density * 200);
                            self.creature().mod_moves(-lost);
                        }
                        self.creature().check_dead_state();
                    }
                }
                FieldKind::Fatigue => {
                    if self.rng.range(0, 2) < density && ch.is_player && self.rift_teleport_character(density) {
                        break;
                    }
                }
                FieldKind::ShockVent | FieldKind::AcidVent => self.remove(kind),
                FieldKind::Bees if !ch.underwater => self.bee_stings(density),
                FieldKind::Incendiary => {
                    if ch.has_trait(Trait::Fireproof) || density == 1 {
                        let burn = self.rng.range(1, 3);
                        self.creature().hurt_all(burn);
                    } else {
                        self.tell("The incendiary burns you!");
                        self.creature().add_effect(EffectKind::OnFire, 8);
                        let burn = self.rng.range(2, 6);
                        self.creature().hurt_all(burn);
                    }
                    self.creature().check_dead_state();
                }
                _ => {}
            }
        }
    }

    fn acid_on_character(&mut self, density: i32) {
        let ((feet_lo, feet_hi), (legs_lo, legs_hi)) = match density {
            3 => ((4, 10), (2, 8)),
            2 => ((2, 5), (1, 4)),
            _ => ((1, 3), (0, 2)),
        };
        self.tell("The acid burns your legs and feet!");
        for part in [BodyPart::FootL, BodyPart::FootR] {
            let damage = self.rng.range(feet_lo, feet_hi);
            self.creature().deal_damage(part, DamageKind::Acid, damage);
        }
        for part in [BodyPart::LegL, BodyPart::LegR] {
            let damage = self.rng.range(legs_lo, legs_hi);
            self.creature().deal_damage(part, DamageKind::Acid, damage);
        }
        self.creature().check_dead_state();
    }

    /// Burns climb the body as the fire grows: feet and legs first, then
    /// the torso, then hands and arms.
    fn burn_character(&mut self, ch: &Character, adjusted: i32) {
        if adjusted <= 0 {
            return;
        }
        let mut parts: Vec<BodyPart> = Vec::new();
        let (lo, hi) = match adjusted {
            1 => {
                self.tell("You burn your legs and feet!");
                (1, 6)
            }
            2 => {
                self.tell("You're burning up!");
                (2, 9)
            }
            _ => {
                self.tell("You're set ablaze!");
                (4, 12)
            }
        };
        if adjusted >= 3 {
            parts.extend([BodyPart::HandL, BodyPart::HandR, BodyPart::ArmL, BodyPart::ArmR]);
            self.creature().add_effect(EffectKind::OnFire, 5);
        }
        if adjusted >= 2 {
            parts.push(BodyPart::Torso);
        }
        parts.extend([BodyPart::FootL, BodyPart::FootR, BodyPart::LegL, BodyPart::LegR]);
        if ch.on_ground {
            parts = BodyPart::ALL.to_vec();
        }
        for part in parts {
            let damage = self.rng.range(lo, hi);
            self.creature().deal_damage(part, DamageKind::Heat, damage);
        }
        self.creature().check_dead_state();
    }

    /// Returns whether the character was moved off this tile.
    fn rift_teleport_character(&mut self, density: i32) -> bool {
        self.tell("You're violently teleported!");
        self.creature().hurt_all(density);
        self.creature().check_dead_state();
        let Some(q) = self.rift_destination() else {
            return false;
        };
        if self.world.creature_at(q).is_some() {
            return false;
        }
        self.creature().pos = q;
        true
    }

    fn bee_stings(&mut self, density: i32) {
        let mut stings = 0;
        for _ in 0..BEE_STING_ROLLS {
            if self.rng.one_in(4) && self.env(EffectKind::Stung, BodyPart::Torso, density, 90) {
                stings += 1;
            }
        }
        let text = match stings {
            0 => return,
            1 => "The bees sting you!",
            2..=3 => "The bees sting you several times!",
            4..=5 => "The bees sting you many times!",
            _ => "The bees sting you all over your body!",
        };
        self.tell(text);
    }

    // === Monsters ===

    fn monster(&mut self, m: &Monster) {
        if m.has_flag(MonsterFlag::Digs) {
            return;
        }
        let breathes = !m.has_flag(MonsterFlag::NoBreathe);
        let living = m.made_of_any(&[Material::Flesh, Material::Veggy]);
        let veggy = m.made_of(Material::Veggy);
        let mut dam = 0;

        for (kind, density) in self.kinds_here() {
            if self.is_dead() {
                break;
            }
            if !self.world.has_field(self.pos, kind) {
                continue;
            }
            match kind {
                FieldKind::Web if !m.has_flag(MonsterFlag::WebWalk) => {
                    self.creature().add_effect_intensity(EffectKind::Webbed, 1, density);
                    self.remove(kind);
                }
                FieldKind::Acid if !m.has_flag(MonsterFlag::Flies) => {
                    let damage = if density == 3 {
                        self.rng.range(4, 10) + self.rng.range(2, 8)
                    } else {
                        self.rng.range(density, density * 4)
                    };
                    let creature = self.creature();
                    creature.deal_damage(BodyPart::Torso, DamageKind::Acid, damage);
                    creature.check_dead_state();
                }
                FieldKind::Sap => {
                    self.creature().mod_moves(-5 * density);
                    self.wear_down(kind, density);
                }
                FieldKind::Sludge
                    if !m.has_flag(MonsterFlag::Flies) && !m.has_flag(MonsterFlag::SludgeProof) =>
                {
                    self.creature().mod_moves(-300 * density);
                    self.remove(kind);
                }
                FieldKind::Fire => {
                    dam += heat_vulnerability(m, 20, 20);
                    if m.has_flag(MonsterFlag::Flies) {
                        dam -= 15;
                    }
                    match density {
                        1 => dam += self.rng.range(2, 6),
                        2 => {
                            dam += self.rng.range(6, 12);
                            if !m.has_flag(MonsterFlag::Flies) {
                                self.ignite_monster(m, 20, (3, 8));
                            }
                        }
                        _ => {
                            dam += self.rng.range(10, 20);
                            if !m.has_flag(MonsterFlag::Flies) || self.rng.one_in(3) {
                                self.ignite_monster(m, 40, (8, 12));
                            }
                        }
                    }
                }
                FieldKind::Smoke if breathes => {
                    if density == 3 {
                        let lost = self.rng.range(10, 20);
                        self.creature().mod_moves(-lost);
                    }
                    if veggy {
                        let lost = self.rng.range(1, density * 12);
                        self.creature().mod_moves(-lost);
                    }
                }
                FieldKind::TearGas if living && breathes => {
                    match density {
                        3 => {
                            let stun = self.rng.range(10, 20);
                            self.creature().add_effect(EffectKind::Stunned, stun);
                            dam += self.rng.range(4, 10);
                        }
                        2 => {
                            let stun = self.rng.range(5, 10);
                            self.creature().add_effect(EffectKind::Stunned, stun);
                            dam += self.rng.range(2, 5);
                        }
                        _ => {
                            let stun = self.rng.range(1, 5);
                            self.creature().add_effect(EffectKind::Stunned, stun);
                        }
                    }
                    if veggy {
                        let lost = self.rng.range(density * 5, density * 12);
                        self.creature().mod_moves(-lost);
                        dam += density * self.rng.range(8, 14);
                    }
                    if m.has_flag(MonsterFlag::Sees) {
                        self.creature().add_effect(EffectKind::Blind, density * 8);
                    }
                }
                FieldKind::RelaxGas if living && breathes => {
                    let stun = self.rng.range(density * 4, density * 8);
                    self.creature().add_effect(EffectKind::Stunned, stun);
                }
                FieldKind::Dazzling if m.has_flag(MonsterFlag::Sees) => {
                    self.creature().add_effect(EffectKind::Blind, density * 12);
                    let stun = density * self.rng.range(5, 12);
                    self.creature().add_effect(EffectKind::Stunned, stun);
                }
                FieldKind::ToxicGas if breathes => {
                    dam += density;
                    self.creature().mod_moves(-density);
                }
                FieldKind::NukeGas if breathes => {
                    let (moves, damage) = match density {
                        3 => (self.rng.range(60, 120), self.rng.range(30, 50)),
                        2 => (self.rng.range(20, 50), self.rng.range(10, 25)),
                        _ => (self.rng.range(0, 15), self.rng.range(0, 12)),
                    };
                    self.creature().mod_moves(-moves);
                    dam += damage;
                    if veggy {
                        let lost = self.rng.range(density * 5, density * 12);
                        self.creature().mod_moves(-lost);
                        dam *= density;
                    }
                }
                FieldKind::FlameBurst => {
                    dam += heat_vulnerability(m, 50, 25);
                    dam += self.rng.range(0, 8);
                    self.creature().mod_moves(-20);
                }
                FieldKind::Electricity => {
                    dam += self.rng.range(1, density);
                    if self.rng.one_in(8 - density) {
                        self.creature().mod_moves(-150 * density);
                    }
                }
                FieldKind::Fatigue => {
                    if self.rng.range(0, 2) < density {
                        dam += density;
                        self.rift_teleport_monster();
                        break;
                    }
                }
                FieldKind::Incendiary => {
                    dam += heat_vulnerability(m, 20, 5);
                    match density {
                        1 => dam += self.rng.range(2, 6),
                        2 => {
                            dam += self.rng.range(6, 12);
                            self.ignite_monster(m, 20, (8, 12));
                        }
                        _ => {
                            dam += self.rng.range(10, 20);
                            self.ignite_monster(m, 40, (12, 16));
                        }
                    }
                }
                _ => {}
            }
        }

        if dam > 0 {
            let creature = self.creature();
            creature.deal_damage(BodyPart::Torso, DamageKind::Bash, dam);
            creature.check_dead_state();
        }
    }

    /// Flames slow every monster; only bodies that can catch are set burning.
    fn ignite_monster(&mut self, m: &Monster, slowdown: i32, burn: (i32, i32)) {
        self.creature().mod_moves(-slowdown);
        if catches_fire(m) {
            let duration = self.rng.range(burn.0, burn.1);
            self.creature().add_effect(EffectKind::OnFire, duration);
        }
    }

    fn rift_teleport_monster(&mut self) {
        let name = self.world.creatures[self.index].name.clone();
        let Some(q) = self.rift_destination() else {
            self.events
                .push(FieldEvent::Message(format!("The {} is torn apart by the rift.", name)));
            self.creature().die();
            return;
        };
        match self.world.creature_at(q).filter(|&other| other != self.index) {
            Some(other) => {
                let victim = &mut self.world.creatures[other];
                let text = format!("The {} teleports into a {}, killing them both!", name, victim.name);
                if !victim.is_player() {
                    victim.die();
                    self.events.push(FieldEvent::Message(text));
                }
                self.creature().die();
            }
            None => self.creature().pos = q,
        }
    }
}

/// Extra heat damage by what the monster is made of: soft and liquid
/// bodies take `soft`, hard ones shrug off `hard`.
fn heat_vulnerability(m: &Monster, soft: i32, hard: i32) -> i32 {
    let mut dam = 0;
    if m.made_of(Material::Flesh) {
        dam += 3;
    }
    if m.made_of(Material::Veggy) {
        dam += 12;
    }
    let soft_body = m.made_of_any(&[
        Material::Paper,
        Material::Powder,
        Material::Wood,
        Material::Cotton,
        Material::Wool,
    ]) || m.materials.iter().any(|x| x.is_liquid());
    if soft_body {
        dam += soft;
    }
    if m.made_of_any(&[Material::Stone, Material::Kevlar, Material::Steel]) {
        dam -= hard;
    }
    dam
}

fn catches_fire(m: &Monster) -> bool {
    !(m.materials.iter().any(|x| x.is_liquid())
        || m.made_of_any(&[Material::Stone, Material::Kevlar, Material::Steel])
        || m.has_flag(MonsterFlag::Firey))
}
