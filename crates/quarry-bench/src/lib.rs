//! Benchmark workloads for the Quarry allocation crates.
//!
//! Provides deterministic key sets so every benchmark run (and every
//! machine) probes the same table layouts:
//!
//! - [`scattered_keys`]: distinct pseudo-random integers from a seed
//! - [`word_keys`]: distinct short strings, as in symbol interning

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Generate `n` distinct pseudo-random `u64` keys from `seed`.
pub fn scattered_keys(n: usize, seed: u64) -> Vec<u64> {
    let mut keys = Vec::with_capacity(n);
    let mut seen = std::collections::HashSet::with_capacity(n);
    let mut state = seed;

    while keys.len() < n {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let key = state ^ (state >> 29);
        if seen.insert(key) {
            keys.push(key);
        }
    }

    keys
}

/// Generate `n` distinct identifier-like strings (`w0`, `w1`, ...).
pub fn word_keys(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("w{i}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scattered_keys_are_distinct() {
        let keys = scattered_keys(1000, 42);
        assert_eq!(keys.len(), 1000);
        let unique: std::collections::HashSet<u64> = keys.iter().copied().collect();
        assert_eq!(unique.len(), 1000, "all keys should be unique");
    }

    #[test]
    fn scattered_keys_deterministic() {
        assert_eq!(scattered_keys(64, 7), scattered_keys(64, 7));
        assert_ne!(scattered_keys(64, 7), scattered_keys(64, 8));
    }

    #[test]
    fn word_keys_are_distinct() {
        let words = word_keys(20);
        assert_eq!(words[0], "w0");
        assert_eq!(words[19], "w19");
    }
}
