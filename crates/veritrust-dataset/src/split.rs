//! Seeded stratified train/test split

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;
use std::hash::Hash;
use veritrust_core::{Error, Result};

/// Held-out share used when none is given
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Shuffle seed used when none is given
pub const DEFAULT_SEED: u64 = 42;

/// Two disjoint partitions of the input
#[derive(Debug, Clone)]
pub struct Split<T> {
    pub train: Vec<T>,
    pub test: Vec<T>,
}

/// Split `items` so every class keeps its share in both partitions.
///
/// Each class contributes `round(len * test_size)` items to the test set. The
/// same seed always yields the same partitions for the same input order.
pub fn stratified_split<T, K, F>(items: Vec<T>, test_size: f64, seed: u64, key: F) -> Result<Split<T>>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(Error::config(format!(
            "test size must be between 0 and 1 (exclusive), got {}",
            test_size
        )));
    }

    // Classes in first-seen order so the result does not depend on hashing.
    let mut order: Vec<K> = Vec::new();
    let mut groups: HashMap<K, Vec<T>> = HashMap::new();
    for item in items {
        let k = key(&item);
        if !groups.contains_key(&k) {
            order.push(k.clone());
        }
        groups.entry(k).or_default().push(item);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for k in order {
        let Some(mut group) = groups.remove(&k) else {
            continue;
        };
        group.shuffle(&mut rng);

        let n_test = ((group.len() as f64) * test_size).round() as usize;
        let n_test = n_test.min(group.len());
        let rest = group.split_off(n_test);
        test.extend(group);
        train.extend(rest);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    tracing::debug!(
        "Stratified split: {} train, {} test (test size {})",
        train.len(),
        test.len(),
        test_size
    );

    Ok(Split { train, test })
}
