//! Per-kind transition rules, one family per module.

pub mod electricity;
pub mod fire;
pub mod gas;
pub mod hazards;
pub mod vents;

use crate::field::FieldKind;
use crate::simulation::constants::*;
use crate::simulation::engine::TickContext;
use crate::world::TerrainFlag;

/// Run the transition rule for the entry under the context's cursor.
pub fn apply(ctx: &mut TickContext, kind: FieldKind) {
    match kind {
        FieldKind::Null => {}

        FieldKind::Blood
        | FieldKind::BloodVeggy
        | FieldKind::BloodInsect
        | FieldKind::BloodInvertebrate
        | FieldKind::Bile
        | FieldKind::GibsFlesh
        | FieldKind::GibsVeggy
        | FieldKind::GibsInsect
        | FieldKind::GibsInvertebrate => {
            if ctx.world.has_flag(ctx.pos(), TerrainFlag::Swimmable) {
                ctx.decay(RESIDUE_WATER_DECAY);
            }
        }

        FieldKind::Acid => hazards::acid(ctx),

        // Only the generic aging applies.
        FieldKind::Web
        | FieldKind::Sap
        | FieldKind::Sludge
        | FieldKind::Slime
        | FieldKind::Plasma
        | FieldKind::Laser
        | FieldKind::Spotlight
        | FieldKind::Dazzling => {}

        FieldKind::Fire => fire::fire(ctx),

        FieldKind::Smoke => gas::spread_gas(ctx, kind, SMOKE_SPREAD),
        FieldKind::TearGas => gas::spread_gas(ctx, kind, TEAR_GAS_SPREAD),
        FieldKind::RelaxGas => gas::spread_gas(ctx, kind, RELAX_GAS_SPREAD),
        FieldKind::ToxicGas => gas::spread_gas(ctx, kind, TOXIC_GAS_SPREAD),
        FieldKind::CigSmoke => gas::spread_gas(ctx, kind, CIG_SMOKE_SPREAD),
        FieldKind::FungalHaze => gas::fungal_haze(ctx),
        FieldKind::WeedSmoke | FieldKind::MethSmoke | FieldKind::CrackSmoke => gas::narcotic_smoke(ctx, kind),
        FieldKind::NukeGas => gas::nuke_gas(ctx),
        FieldKind::HotAir1 | FieldKind::HotAir2 | FieldKind::HotAir3 | FieldKind::HotAir4 => {
            gas::spread_gas(ctx, kind, HOT_AIR_SPREAD)
        }

        FieldKind::GasVent => vents::gas_vent(ctx),
        FieldKind::FireVent => vents::fire_vent(ctx),
        FieldKind::FlameBurst => vents::flame_burst(ctx),
        FieldKind::ShockVent => vents::shock_vent(ctx),
        FieldKind::AcidVent => vents::acid_vent(ctx),

        FieldKind::Electricity => electricity::electricity(ctx),

        FieldKind::Fatigue => hazards::fatigue(ctx),
        FieldKind::PushItems => hazards::push_items(ctx),
        FieldKind::Bees => hazards::bees(ctx),
        FieldKind::Incendiary => hazards::incendiary(ctx),
        FieldKind::Rubble => hazards::rubble(ctx),
    }
}
