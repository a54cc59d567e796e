//! Crafter count sizing

use crate::error::CalcError;
use crate::models::Recipe;

const EXACT_F64_INTEGER: f64 = 9_007_199_254_740_992.0; // 2^53

/// Smallest crafter count whose combined output meets `target_per_minute`.
///
/// Targets at or below zero need no crafters. The count is checked against
/// `count * products_per_minute >= target` directly so that rounding in the
/// division never over- or under-sizes by one.
pub fn crafters_needed(recipe: &Recipe, target_per_minute: f64) -> Result<u64, CalcError> {
    if !target_per_minute.is_finite() {
        return Err(CalcError::InvalidTargetRate {
            rate: target_per_minute,
        });
    }
    let per_crafter = recipe.products_per_minute()?;
    if target_per_minute <= 0.0 {
        return Ok(0);
    }

    let overflow = || CalcError::CrafterCountOverflow {
        item: recipe.name.clone(),
        rate: target_per_minute,
    };

    let quotient = (target_per_minute / per_crafter).ceil().max(1.0);
    if !quotient.is_finite() || quotient >= u64::MAX as f64 {
        return Err(overflow());
    }
    let mut count = quotient as u64;

    // Past 2^53 neighbouring counts share an f64, so there is nothing to correct
    if quotient > EXACT_F64_INTEGER {
        return Ok(count);
    }
    while count > 1 && (count - 1) as f64 * per_crafter >= target_per_minute {
        count -= 1;
    }
    while (count as f64) * per_crafter < target_per_minute {
        count = count.checked_add(1).ok_or_else(&overflow)?;
    }
    Ok(count)
}
