//! Byte statistics used by the benchmark: Shannon entropy and throughput.

use std::time::Duration;

const MIB: f64 = 1024.0 * 1024.0;

/// Shannon entropy of the byte histogram of `data`, in bits per byte.
///
/// Returns `0.0` for an empty slice. The result is always within `0.0..=8.0`.
pub fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut counts = [0u64; 256];
    for &b in data {
        counts[b as usize] += 1;
    }
    let total = data.len() as f64;
    let entropy: f64 = counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum();
    // Rounding can push a uniform histogram just past 8.0.
    entropy.clamp(0.0, 8.0)
}

/// Bytes processed per second.
///
/// A zero-length phase is not measurable and reports `0.0` rather than
/// infinity.
pub fn throughput(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs == 0.0 {
        0.0
    } else {
        bytes as f64 / secs
    }
}

/// Convert bytes per second to MiB per second.
pub fn to_mib_per_sec(bytes_per_sec: f64) -> f64 {
    bytes_per_sec / MIB
}

/// Duration in whole microseconds, saturating at `u64::MAX`.
pub fn micros(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}
