//! Primary key generation.

use tracing::warn;

/// How the next primary key is derived from the current collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyStrategy {
    /// Key of the last record plus one.
    #[default]
    Last,
    /// Largest numeric key plus one.
    Max,
}

impl std::str::FromStr for KeyStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last" => Ok(Self::Last),
            "max" => Ok(Self::Max),
            other => Err(format!("unknown key strategy `{other}` (expected `last` or `max`)")),
        }
    }
}

/// Next key for a collection whose keys are `keys`, in collection order.
///
/// An empty collection starts at `"1"`. A candidate that would collide with an
/// existing key, or a last key that is not an integer, falls back to max plus one.
/// `None` once the largest key is `u128::MAX`: there is no unused successor left.
pub fn next_key(keys: &[&str], strategy: KeyStrategy) -> Option<String> {
    let Some(last) = keys.last() else {
        return Some("1".to_string());
    };

    let candidate = match strategy {
        KeyStrategy::Last => last.trim().parse::<u128>().ok().and_then(|n| n.checked_add(1)),
        KeyStrategy::Max => max_plus_one(keys),
    };

    match candidate.map(|n| n.to_string()) {
        Some(key) if !keys.contains(&key.as_str()) => Some(key),
        rejected => {
            let key = max_plus_one(keys)?.to_string();
            warn!(last = %last, rejected = ?rejected, key = %key, "positional key unusable, using max plus one");
            Some(key)
        }
    }
}

fn max_plus_one(keys: &[&str]) -> Option<u128> {
    match keys.iter().filter_map(|k| k.trim().parse::<u128>().ok()).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}
