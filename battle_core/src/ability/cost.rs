//! MP cost scaling

use super::Ability;
use crate::config::CostConstants;

/// MP cost of an ability for a caster with the given derived vitality
///
/// Zero-cost abilities stay free; anything else costs at least 1:
/// `max(1, round(base * (max(1, vitality) / scale) ^ exponent))`
pub fn mp_cost(ability: &Ability, caster_vitality: f64, constants: &CostConstants) -> u32 {
    let base = ability.base_mp_cost;
    if base <= 0.0 {
        return 0;
    }
    let vitality = caster_vitality.max(1.0);
    let scaled =
        base * (vitality / constants.mp_vitality_scale).powf(constants.mp_vitality_exponent);
    scaled.max(1.0).round() as u32
}
