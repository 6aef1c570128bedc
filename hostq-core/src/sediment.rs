//! QSL sediment log: an append-only record of portfolio runs.
//!
//! Every shot links to the previous one: its `pre_state_hash` is the prior
//! shot's `post_state_hash` (or the genesis hash for the first shot). A run
//! folds the new result into the state hash; a share only marks the current
//! state, so its pre and post hashes are equal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hex characters kept from each BLAKE3 digest.
const HASH_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotAction {
    Run,
    Share,
}

impl ShotAction {
    pub fn label(self) -> &'static str {
        match self {
            ShotAction::Run => "RUN",
            ShotAction::Share => "SHARE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotMark {
    pub action: ShotAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QslShot {
    pub id: String,
    pub layer_index: u64,
    pub mark: ShotMark,
    pub ts: DateTime<Utc>,
    pub pre_state_hash: String,
    pub post_state_hash: String,
}

fn short_hash(bytes: &[u8]) -> String {
    let hex = blake3::hash(bytes).to_hex();
    hex.as_str()[..HASH_LEN].to_string()
}

/// Hash of the empty state every log starts from.
pub fn genesis_hash() -> String {
    short_hash(b"hostq/qsl/genesis")
}

#[derive(Debug, Clone)]
pub struct SedimentLog {
    shots: Vec<QslShot>,
    state_hash: String,
}

impl Default for SedimentLog {
    fn default() -> Self {
        Self::new()
    }
}

impl SedimentLog {
    pub fn new() -> Self {
        Self {
            shots: Vec::new(),
            state_hash: genesis_hash(),
        }
    }

    pub fn len(&self) -> usize {
        self.shots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }

    /// Oldest first.
    pub fn shots(&self) -> &[QslShot] {
        &self.shots
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &QslShot> {
        self.shots.iter().rev()
    }

    pub fn state_hash(&self) -> &str {
        &self.state_hash
    }

    /// Fold `state` into the chain and append a `run` shot.
    pub fn record_run<S: Serialize>(&mut self, state: &S, ts: DateTime<Utc>) -> &QslShot {
        let canonical = serde_json::to_string(state).unwrap_or_default();
        let mut input = self.state_hash.clone().into_bytes();
        input.extend_from_slice(canonical.as_bytes());
        let post = short_hash(&input);
        self.append(ShotAction::Run, post, ts)
    }

    /// Append a `share` shot marking the current state.
    pub fn record_share(&mut self, ts: DateTime<Utc>) -> &QslShot {
        let post = self.state_hash.clone();
        self.append(ShotAction::Share, post, ts)
    }

    fn append(&mut self, action: ShotAction, post: String, ts: DateTime<Utc>) -> &QslShot {
        let layer_index = self.shots.len() as u64 + 1;
        let pre = std::mem::replace(&mut self.state_hash, post.clone());
        self.shots.push(QslShot {
            id: format!("qsl-{layer_index:04}-{}", &post[..8]),
            layer_index,
            mark: ShotMark { action },
            ts,
            pre_state_hash: pre,
            post_state_hash: post,
        });
        &self.shots[self.shots.len() - 1]
    }

    /// True when every shot links to its predecessor.
    pub fn verify_chain(&self) -> bool {
        let mut expected = genesis_hash();
        for (i, shot) in self.shots.iter().enumerate() {
            if shot.pre_state_hash != expected || shot.layer_index != i as u64 + 1 {
                return false;
            }
            if shot.mark.action == ShotAction::Share && shot.pre_state_hash != shot.post_state_hash {
                return false;
            }
            expected = shot.post_state_hash.clone();
        }
        expected == self.state_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn empty_log_starts_at_genesis() {
        let log = SedimentLog::new();
        assert!(log.is_empty());
        assert_eq!(log.state_hash(), genesis_hash());
        assert!(log.verify_chain());
    }

    #[test]
    fn runs_chain_and_share_keeps_state() {
        let mut log = SedimentLog::new();
        let first = log.record_run(&vec![1, 2, 3], ts()).clone();
        assert_eq!(first.layer_index, 1);
        assert_eq!(first.pre_state_hash, genesis_hash());
        assert_ne!(first.post_state_hash, first.pre_state_hash);

        let share = log.record_share(ts()).clone();
        assert_eq!(share.mark.action, ShotAction::Share);
        assert_eq!(share.pre_state_hash, first.post_state_hash);
        assert_eq!(share.post_state_hash, share.pre_state_hash);

        let second = log.record_run(&vec![4], ts()).clone();
        assert_eq!(second.pre_state_hash, share.post_state_hash);
        assert_eq!(second.layer_index, 3);
        assert!(log.verify_chain());
        assert_eq!(log.newest_first().next().unwrap().layer_index, 3);
    }

    #[test]
    fn same_state_different_history_differs() {
        let mut a = SedimentLog::new();
        a.record_run(&"x", ts());
        let mut b = SedimentLog::new();
        b.record_run(&"y", ts());
        b.record_run(&"x", ts());
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn hashes_are_short_hex() {
        let mut log = SedimentLog::new();
        let shot = log.record_run(&1, ts());
        assert_eq!(shot.post_state_hash.len(), HASH_LEN);
        assert!(shot.post_state_hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(shot.id.starts_with("qsl-0001-"));
    }
}
