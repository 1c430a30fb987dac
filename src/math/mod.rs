//! Arithmetic helpers for concentrated-liquidity calculations.
//!
//! | Module | Contents |
//! |--------|----------|
//! | `full_math` | `mul_div` and integer square root over `ethnum::U256` |
//! | `tick_math` | tick ↔ sqrt price on a pool's tick grid |
//! | `sqrt_price_math` | token amounts between prices, next price from an amount |

mod full_math;
mod sqrt_price_math;
mod tick_math;

pub use full_math::{isqrt, mul_div};
pub use sqrt_price_math::{
    amounts_for_liquidity, base_amount_delta, next_sqrt_price_from_base_in,
    next_sqrt_price_from_base_out, next_sqrt_price_from_quote_in, next_sqrt_price_from_quote_out,
    quote_amount_delta,
};
pub use tick_math::{price_to_sqrt_price_and_tick, sqrt_price_to_tick, tick_to_sqrt_price};
