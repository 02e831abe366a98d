use tracing::warn;

use crate::field::catalog::{FieldDef, FieldKind};
use crate::rng::SimRng;

pub const MIN_DENSITY: i32 = 1;
pub const MAX_DENSITY: i32 = 3;

/// Breathing and eye protection of whoever is asking whether a tile is safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Protection {
    pub mouth: i32,
    pub eyes: i32,
    pub fungal_immune: bool,
}

/// One active effect instance on a tile.
///
/// Density always stays in `1..=3`. Driving it below 1 marks the entry dead;
/// the owning [`FieldSet`](crate::field::FieldSet) collects it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry {
    kind: FieldKind,
    density: i32,
    age: i32,
    alive: bool,
}

impl FieldEntry {
    pub fn new(kind: FieldKind, density: i32, age: i32) -> Self {
        if !(MIN_DENSITY..=MAX_DENSITY).contains(&density) {
            warn!(kind = %kind, density, "field created with density out of range");
        }
        Self {
            kind,
            density: density.clamp(MIN_DENSITY, MAX_DENSITY),
            age,
            alive: true,
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn density(&self) -> i32 {
        self.density
    }

    /// Ticks since the last decay event. Negative values are banked lifetime.
    pub fn age(&self) -> i32 {
        self.age
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn def(&self) -> &'static FieldDef {
        self.kind.def()
    }

    /// Display name for the current density, e.g. "thick smoke".
    pub fn name(&self) -> &'static str {
        self.def().variant(self.density).name
    }

    pub fn transparency(&self) -> f32 {
        self.def().variant(self.density).transparency
    }

    pub fn luminance(&self) -> f32 {
        self.def().variant(self.density).luminance
    }

    pub fn is_dangerous(&self) -> bool {
        self.def().variant(self.density).dangerous
    }

    /// Danger for a specific subject: breathable gases are judged against its
    /// protection instead of the static flag.
    pub fn is_dangerous_for(&self, subject: &Protection) -> bool {
        match self.kind {
            FieldKind::Smoke => subject.mouth < 7,
            FieldKind::TearGas | FieldKind::ToxicGas | FieldKind::GasVent | FieldKind::RelaxGas => {
                subject.mouth < 15
            }
            FieldKind::FungalHaze => {
                !subject.fungal_immune && (subject.mouth < 15 || subject.eyes < 15)
            }
            _ => self.is_dangerous(),
        }
    }

    /// Age one tick and roll for a density drop.
    ///
    /// Two dice of `age` sides are summed against the half-life, so an entry
    /// grows likelier to decay the longer it goes without a decay event.
    /// Returns whether the entry is still alive.
    pub fn update(&mut self, rng: &mut SimRng) -> bool {
        if !self.alive {
            return false;
        }
        self.age += 1;
        let half_life = self.def().half_life;
        if half_life <= 0 {
            return true;
        }
        if rng.dice(2, self.age) > half_life {
            self.age = 0;
            self.intensify(-1);
        }
        self.alive
    }

    /// Add to age. Negative values feed the entry and extend its life.
    pub fn decay(&mut self, delta: i32) {
        self.age += delta;
    }

    /// Change density by `delta`, re-clamping. Returns whether still alive.
    pub fn intensify(&mut self, delta: i32) -> bool {
        self.set_density(self.density + delta);
        self.alive
    }

    pub fn nullify(&mut self) {
        self.set_density(0);
    }

    pub fn maximize(&mut self) {
        self.set_density(MAX_DENSITY);
    }

    fn set_density(&mut self, density: i32) {
        if density > MAX_DENSITY {
            self.density = MAX_DENSITY;
        } else if density < MIN_DENSITY {
            self.density = MIN_DENSITY;
            self.alive = false;
        } else {
            self.density = density;
        }
    }
}

/// Exact probability that [`FieldEntry::update`] triggers a decay event for
/// an entry whose age becomes `age` this tick.
pub fn decay_chance(age: i32, half_life: i32) -> f64 {
    if half_life <= 0 || age < 1 {
        return 0.0;
    }
    let sides = age as i64;
    let half_life = half_life as i64;
    // Pairs (a, b) in [1, sides]^2 with a + b > half_life.
    let mut hits = 0_i64;
    for a in 1..=sides {
        let need = half_life - a + 1;
        let lo = need.max(1);
        if lo <= sides {
            hits += sides - lo + 1;
        }
    }
    hits as f64 / (sides * sides) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_clamps_density() {
        let high = FieldEntry::new(FieldKind::Smoke, 7, 0);
        assert_eq!(high.density(), 3);
        assert!(high.is_alive());
        let low = FieldEntry::new(FieldKind::Smoke, 0, 0);
        assert_eq!(low.density(), 1);
        assert!(low.is_alive());
    }

    #[test]
    fn intensify_below_one_kills() {
        let mut e = FieldEntry::new(FieldKind::Fire, 2, 0);
        assert!(e.intensify(-1));
        assert_eq!(e.density(), 1);
        assert!(!e.intensify(-1));
        assert_eq!(e.density(), 1);
        assert!(!e.is_alive());
    }

    #[test]
    fn intensify_saturates_at_three() {
        let mut e = FieldEntry::new(FieldKind::Fire, 2, 0);
        assert!(e.intensify(5));
        assert_eq!(e.density(), 3);
    }

    #[test]
    fn nullify_and_maximize() {
        let mut e = FieldEntry::new(FieldKind::Acid, 2, 0);
        e.maximize();
        assert_eq!(e.density(), 3);
        e.nullify();
        assert!(!e.is_alive());
        assert_eq!(e.density(), 1);
    }

    #[test]
    fn decay_moves_age_both_ways() {
        let mut e = FieldEntry::new(FieldKind::Fire, 1, 10);
        e.decay(5);
        assert_eq!(e.age(), 15);
        e.decay(-40);
        assert_eq!(e.age(), -25);
    }

    #[test]
    fn permanent_kinds_never_decay() {
        let mut rng = SimRng::seed_from_u64(11);
        let mut vent = FieldEntry::new(FieldKind::GasVent, 1, 0);
        for _ in 0..10_000 {
            assert!(vent.update(&mut rng));
        }
        assert_eq!(vent.density(), 1);
        assert_eq!(vent.age(), 10_000);
    }

    #[test]
    fn dead_entry_does_not_update() {
        let mut rng = SimRng::seed_from_u64(11);
        let mut e = FieldEntry::new(FieldKind::Smoke, 1, 4);
        e.nullify();
        assert!(!e.update(&mut rng));
        assert_eq!(e.age(), 4);
    }

    #[test]
    fn negative_age_never_decays() {
        let mut rng = SimRng::seed_from_u64(5);
        let mut fire = FieldEntry::new(FieldKind::Fire, 2, -5000);
        for _ in 0..1000 {
            assert!(fire.update(&mut rng));
        }
        assert_eq!(fire.density(), 2);
    }

    #[test]
    fn decay_event_resets_age() {
        let mut rng = SimRng::seed_from_u64(5);
        // Electricity has a half-life of 2: any age past 2 with two dice of
        // at least 2 sides beats it eventually.
        let mut spark = FieldEntry::new(FieldKind::Electricity, 3, 10);
        let mut decayed = false;
        for _ in 0..50 {
            spark.update(&mut rng);
            if spark.density() < 3 {
                decayed = true;
                break;
            }
        }
        assert!(decayed);
        assert_eq!(spark.age(), 0);
    }

    #[test]
    fn decay_chance_is_monotone_in_age() {
        for half_life in [2, 10, 300, 800] {
            let mut previous = 0.0;
            for age in 1..(half_life * 3) {
                let chance = decay_chance(age, half_life);
                assert!(
                    chance + 1e-12 >= previous,
                    "half_life {} age {}: {} < {}",
                    half_life,
                    age,
                    chance,
                    previous
                );
                previous = chance;
            }
        }
        assert_eq!(decay_chance(5, 10), 0.0);
        assert_eq!(decay_chance(0, 10), 0.0);
        assert_eq!(decay_chance(10, 0), 0.0);
    }

    #[test]
    fn sampled_decay_rate_tracks_exact_chance() {
        let mut rng = SimRng::seed_from_u64(99);
        let half_life = 10;
        for age in [6, 9, 14] {
            let trials = 20_000;
            let mut hits = 0;
            for _ in 0..trials {
                if rng.dice(2, age) > half_life {
                    hits += 1;
                }
            }
            let sampled = hits as f64 / trials as f64;
            let exact = decay_chance(age, half_life);
            assert!((sampled - exact).abs() < 0.02, "age {}: {} vs {}", age, sampled, exact);
        }
    }

    #[test]
    fn gas_danger_depends_on_protection() {
        let smoke = FieldEntry::new(FieldKind::Smoke, 1, 0);
        assert!(!smoke.is_dangerous());
        assert!(smoke.is_dangerous_for(&Protection { mouth: 0, eyes: 0, fungal_immune: false }));
        assert!(!smoke.is_dangerous_for(&Protection { mouth: 7, eyes: 0, fungal_immune: false }));

        let tear = FieldEntry::new(FieldKind::TearGas, 2, 0);
        assert!(tear.is_dangerous_for(&Protection { mouth: 14, eyes: 20, fungal_immune: false }));
        assert!(!tear.is_dangerous_for(&Protection { mouth: 15, eyes: 0, fungal_immune: false }));

        let haze = FieldEntry::new(FieldKind::FungalHaze, 2, 0);
        assert!(haze.is_dangerous_for(&Protection { mouth: 20, eyes: 10, fungal_immune: false }));
        assert!(!haze.is_dangerous_for(&Protection { mouth: 20, eyes: 20, fungal_immune: false }));
        assert!(!haze.is_dangerous_for(&Protection { mouth: 0, eyes: 0, fungal_immune: true }));

        let acid = FieldEntry::new(FieldKind::Acid, 1, 0);
        assert!(acid.is_dangerous_for(&Protection { mouth: 99, eyes: 99, fungal_immune: true }));
    }
}
