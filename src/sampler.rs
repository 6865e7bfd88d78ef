//! Request-time price sampling.
//!
//! Every returned price is drawn from a normal distribution centred on the
//! stored mean with the stored standard deviation, floored at one cent and
//! rounded half-up to cents. Draws come from a generator owned by the calling
//! thread, so concurrent requests never contend on shared random state. The
//! generator is seeded from OS entropy on first use; a seeding failure is a
//! sampling error like any other.
//!
//! [`PriceSampler::sample`] cannot fail: any problem during the draw degrades
//! to the unperturbed mean price and is reported through
//! [`SampleOutcome::Fallback`] plus a warning log line.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::cell::RefCell;
use tracing::warn;


/// Lowest price the sampler ever produces.
pub const PRICE_FLOOR: Decimal = dec!(0.01);

/// Number of fractional digits in every sampled price.
pub const PRICE_SCALE: u32 = 2;

thread_local! {
    static THREAD_RNG: RefCell<Option<StdRng>> = const { RefCell::new(None) };
}

/// Reasons a single draw can fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SamplingError {
    /// Standard deviation is negative, NaN or infinite.
    #[error("invalid standard deviation: {0}")]
    InvalidStd(f64),

    /// The perturbed price could not be represented as a decimal.
    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    /// The random source could not produce a variate.
    #[error("generator error: {0}")]
    Generator(String),
}

/// Source of standard normal variates.
pub trait NormalSource: Send + Sync {
    /// Draws one value from N(0, 1).
    ///
    /// # Errors
    /// Returns [`SamplingError::Generator`] if no variate can be produced.
    fn standard_normal(&self) -> Result<f64, SamplingError>;
}

/// Draws from a lazily seeded generator private to the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadLocalNormal;

impl NormalSource for ThreadLocalNormal {
    fn standard_normal(&self) -> Result<f64, SamplingError> {
        THREAD_RNG
            .try_with(|cell| -> Result<f64, SamplingError> {
                let mut slot = cell
                    .try_borrow_mut()
                    .map_err(|_| SamplingError::Generator("generator is busy".to_string()))?;
                draw_seeded(&mut *slot, StdRng::try_from_os_rng)
            })
            .map_err(|_| SamplingError::Generator("generator was torn down".to_string()))?
    }
}

/// Draws from the generator in `slot`, seeding it with `seed` on first use.
///
/// A failed seed leaves `slot` empty so the next draw retries.
fn draw_seeded<F, E>(slot: &mut Option<StdRng>, seed: F) -> Result<f64, SamplingError>
where
    F: FnOnce() -> Result<StdRng, E>,
    E: std::fmt::Display,
{
    if slot.is_none() {
        let rng = seed().map_err(|e| SamplingError::Generator(format!("seeding failed: {e}")))?;
        *slot = Some(rng);
    }

    let rng = slot
        .as_mut()
        .ok_or_else(|| SamplingError::Generator("generator is not seeded".to_string()))?;
    Ok(StandardNormal.sample(rng))
}

/// How a [`SampledValue`] was produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    /// A random draw was applied.
    Sampled,
    /// The draw failed and the rounded mean was used instead.
    Fallback(SamplingError),
}

/// Result of [`PriceSampler::sample`].
#[derive(Debug, Clone, PartialEq)]
pub struct SampledValue {
    /// Price with exactly [`PRICE_SCALE`] fractional digits.
    pub price: Decimal,
    /// Whether the price was sampled or fell back to the mean.
    pub outcome: SampleOutcome,
}

impl SampledValue {
    /// Returns true when the mean price was used because sampling failed.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self.outcome, SampleOutcome::Fallback(_))
    }
}

/// Perturbs stored mean prices with normally distributed noise.
#[derive(Debug, Clone, Default)]
pub struct PriceSampler<S = ThreadLocalNormal> {
    source: S,
}

impl PriceSampler {
    /// Creates a sampler backed by per-thread generators.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: ThreadLocalNormal,
        }
    }
}

impl<S: NormalSource> PriceSampler<S> {
    /// Creates a sampler drawing from `source`.
    #[must_use]
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    /// Draws one price around `mean` with standard deviation `std`.
    ///
    /// # Errors
    /// Returns a [`SamplingError`] when `std` is not a finite non-negative
    /// number, the generator fails, or the result overflows a decimal.
    pub fn try_sample(&self, mean: Decimal, std: f64) -> Result<Decimal, SamplingError> {
        if !std.is_finite() || std < 0.0 {
            return Err(SamplingError::InvalidStd(std));
        }

        let z = self.source.standard_normal()?;
        if !z.is_finite() {
            return Err(SamplingError::Generator(format!("non-finite variate {z}")));
        }

        let offset = z * std;
        let offset = Decimal::from_f64(offset).ok_or_else(|| {
            SamplingError::Arithmetic(format!("offset {offset} is not representable"))
        })?;
        let sampled = mean
            .checked_add(offset)
            .ok_or_else(|| SamplingError::Arithmetic(format!("{mean} + {offset} overflows")))?;

        Ok(round_to_cents(sampled.max(PRICE_FLOOR)))
    }

    /// Draws one price for `ticker`, falling back to the rounded mean on failure.
    pub fn sample(&self, ticker: &str, mean: Decimal, std: f64) -> SampledValue {
        match self.try_sample(mean, std) {
            Ok(price) => SampledValue {
                price,
                outcome: SampleOutcome::Sampled,
            },
            Err(err) => {
                warn!(
                    ticker,
                    error = %err,
                    "price sampling failed, using mean price"
                );
                SampledValue {
                    price: round_to_cents(mean),
                    outcome: SampleOutcome::Fallback(err),
                }
            }
        }
    }
}

/// Rounds half-up to cents and fixes the scale at [`PRICE_SCALE`].
#[must_use]
pub fn round_to_cents(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(PRICE_SCALE);
    rounded
}
