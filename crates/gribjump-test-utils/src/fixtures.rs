//! Synthetic archive fixtures.
//!
//! - [`synthetic_data`]: the 100-point field with growing NaN gaps that every
//!   archived step holds.
//! - [`base_key`]: the ten-selector key those fields are archived under.
//! - [`synthetic_engine`]: a [`StubEngine`] holding the field for a number of
//!   steps, by key and by file location.
//! - [`random_field`]: a seeded field with a chosen share of missing values.

use gribjump_core::{FileLocation, RequestKey};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::stub::StubEngine;

/// Points in the synthetic field.
pub const SYNTHETIC_LEN: usize = 100;

/// Valid points in the synthetic field.
pub const SYNTHETIC_VALID: usize = 46;

/// Contiguous runs of valid points in the synthetic field.
pub const SYNTHETIC_VALID_RUNS: usize = 10;

/// File every synthetic step is archived in.
pub const SYNTHETIC_PATH: &str = "/archive/synth11.grib";

/// Bytes between consecutive synthetic messages in [`SYNTHETIC_PATH`].
pub const SYNTHETIC_MESSAGE_BYTES: u64 = 1024;

/// Value `i` is `i` where valid and NaN elsewhere.
///
/// Runs alternate valid/missing starting with one valid point; the `n`-th
/// valid run has `n` points and the `n`-th missing run `n + 1`. The final
/// run is cut short at 100 points.
pub fn synthetic_data() -> Vec<f64> {
    let mut out = Vec::with_capacity(SYNTHETIC_LEN);
    let mut run = 1;
    while out.len() < SYNTHETIC_LEN {
        for _ in 0..run {
            if out.len() == SYNTHETIC_LEN {
                break;
            }
            out.push(out.len() as f64);
        }
        for _ in 0..=run {
            if out.len() == SYNTHETIC_LEN {
                break;
            }
            out.push(f64::NAN);
        }
        run += 1;
    }
    out
}

/// `!is_nan` over [`synthetic_data`].
pub fn synthetic_mask() -> Vec<bool> {
    synthetic_data().iter().map(|v| !v.is_nan()).collect()
}

/// The archive key for one forecast step.
pub fn base_key(step: &str) -> RequestKey {
    RequestKey::builder()
        .select("domain", "g")
        .select("levtype", "sfc")
        .select("date", "20230508")
        .select("time", "1200")
        .select("step", step)
        .select("param", "151130")
        .select("class", "od")
        .select("type", "fc")
        .select("stream", "oper")
        .select("expver", "0001")
        .build()
}

/// Location of one step's message.
pub fn synthetic_location(step: usize) -> FileLocation {
    FileLocation::local(SYNTHETIC_PATH, step as u64 * SYNTHETIC_MESSAGE_BYTES)
}

/// An engine holding [`synthetic_data`] for steps `0..steps`.
pub fn synthetic_engine(steps: usize) -> StubEngine {
    let data = synthetic_data();
    (0..steps)
        .fold(StubEngine::builder(), |builder, step| {
            builder
                .field(&base_key(&step.to_string()), data.clone())
                .path(&synthetic_location(step), data.clone())
        })
        .build()
}

/// Uniform sample in `[0, 1)` from the top 53 bits of one draw.
fn unit(rng: &mut ChaCha8Rng) -> f64 {
    (rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
}

/// Deterministic field of `len` values in `[-50, 50)`, roughly
/// `missing_ratio` of them NaN.
pub fn random_field(seed: u64, len: usize, missing_ratio: f64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            if unit(&mut rng) < missing_ratio {
                f64::NAN
            } else {
                unit(&mut rng) * 100.0 - 50.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_gaps() {
        let data = synthetic_data();
        assert_eq!(data.len(), SYNTHETIC_LEN);
        assert_eq!(data.iter().filter(|v| !v.is_nan()).count(), SYNTHETIC_VALID);
        let mask = synthetic_mask();
        let runs = (0..mask.len())
            .filter(|&i| mask[i] && (i == 0 || !mask[i - 1]))
            .count();
        assert_eq!(runs, SYNTHETIC_VALID_RUNS);
        for valid in [0, 3, 4, 8, 9, 10, 15, 40, 48, 54, 63, 70, 80, 88, 99] {
            assert_eq!(data[valid], valid as f64, "position {valid}");
        }
        for missing in [1, 2, 5, 7, 11, 14, 19, 23, 29, 34, 41, 47, 55, 62, 71, 79, 89, 98] {
            assert!(data[missing].is_nan(), "position {missing}");
        }
    }

    #[test]
    fn random_field_is_seeded() {
        let a = random_field(7, 256, 0.25);
        let b = random_field(7, 256, 0.25);
        let same = a
            .iter()
            .zip(&b)
            .all(|(x, y)| x == y || (x.is_nan() && y.is_nan()));
        assert!(same);
        let missing = a.iter().filter(|v| v.is_nan()).count();
        assert!(missing > 20 && missing < 110, "missing = {missing}");
        assert!(random_field(0, 64, 0.0).iter().all(|v| (-50.0..50.0).contains(v)));
    }
}
