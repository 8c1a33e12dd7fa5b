// Copyright 2026. The Nyx Wallet Community
//
// Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
// following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
// disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
// following disclaimer in the documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
// products derived from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
// INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
// WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
// USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! The coin selection policy (C3, §4.3): "prefer the smallest set whose total is ≥ target; on
//! ties prefer older coins." Excludes immature coins (§3 supplement 4) — callers are
//! expected to have already filtered `coins` down to the owning asset id and maturity via
//! [`super::CoinStore::available`]; this function only orders and picks.

use nyx_core::Amount;

use super::Coin;

#[derive(Debug, Clone)]
pub struct Selection {
    pub coins: Vec<Coin>,
    pub change: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("no combination of available coins covers the requested amount")]
    NoInputs,
}

/// Exhaustive-but-bounded: enumerates every subset of `coins` as a bitmask over the age-sorted
/// array, so unlike a sliding window it also considers non-contiguous combinations (e.g. the
/// oldest and the newest coin together, skipping the middle one). Ranks candidates by fewest
/// coins first, then smallest total (closest to `target` without going under), then — on a tie
/// in both — the combination drawing from the older coins. The coin counts this wallet deals
/// with (a handful of UTXOs per selection) make the combinatorial search trivial; a wallet
/// carrying thousands of coins would need a smarter heuristic, out of scope here.
pub fn select(coins: &[Coin], target: Amount) -> Result<Selection, SelectionError> {
    if target == Amount::ZERO {
        return Ok(Selection { coins: vec![], change: Amount::ZERO });
    }

    let mut ordered = coins.to_vec();
    ordered.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    let n = ordered.len();

    let mut best: Option<(Vec<usize>, Amount)> = None;
    for mask in 1u64..(1u64 << n) {
        let indices: Vec<usize> = (0..n).filter(|i| mask & (1 << i) != 0).collect();
        let total: Amount = indices.iter().map(|&i| ordered[i].value).sum();
        if total < target {
            continue;
        }
        let better = match &best {
            None => true,
            Some((best_indices, best_total)) => {
                indices.len() < best_indices.len()
                    || (indices.len() == best_indices.len() && (total < *best_total || (total == *best_total && indices < *best_indices)))
            },
        };
        if better {
            best = Some((indices, total));
        }
    }

    let (indices, total) = best.ok_or(SelectionError::NoInputs)?;
    let coins = indices.into_iter().map(|i| ordered[i].clone()).collect();
    let change = Amount(total.as_u64() - target.as_u64());
    Ok(Selection { coins, change })
}

#[cfg(test)]
mod test {
    use chrono::{DateTime, Utc};
    use nyx_common_types::{asset::AssetId, height::Height, types::{CommitmentFactory, PrivateKey}};
    use nyx_key_manager::CoinId;

    use super::*;
    use crate::coin::SpendStatus;

    fn coin(id: u64, value: u64, created_at: DateTime<Utc>) -> Coin {
        Coin {
            id: CoinId(id),
            commitment: CommitmentFactory::default().commit_value(&PrivateKey::default(), value),
            value: Amount(value),
            asset_id: AssetId::NATIVE,
            maturity: Height(0),
            status: SpendStatus::Available,
            reserved_for: None,
            created_at,
        }
    }

    #[test]
    fn prefers_smallest_covering_set() {
        let now = Utc::now();
        let coins = vec![coin(1, 50, now), coin(2, 60, now), coin(3, 200, now)];
        let selection = select(&coins, Amount(120)).unwrap();
        assert_eq!(selection.coins.len(), 1);
        assert_eq!(selection.coins[0].id, CoinId(3));
        assert_eq!(selection.change, Amount(80));
    }

    #[test]
    fn ties_prefer_older_coins() {
        let older = Utc::now() - chrono::Duration::seconds(60);
        let newer = Utc::now();
        let coins = vec![coin(1, 100, newer), coin(2, 100, older)];
        let selection = select(&coins, Amount(100)).unwrap();
        assert_eq!(selection.coins[0].id, CoinId(2));
    }

    #[test]
    fn considers_non_contiguous_combinations() {
        let now = Utc::now();
        // Ascending by age: 10, 5, 8. The minimal covering set for target=18 is the
        // non-contiguous {10, 8} (total 18, no change), skipping the middle coin.
        let coins = vec![coin(1, 10, now), coin(2, 5, now + chrono::Duration::seconds(1)), coin(3, 8, now + chrono::Duration::seconds(2))];
        let selection = select(&coins, Amount(18)).unwrap();
        assert_eq!(selection.coins.len(), 2);
        let ids: Vec<_> = selection.coins.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![CoinId(1), CoinId(3)]);
        assert_eq!(selection.change, Amount::ZERO);
    }

    #[test]
    fn insufficient_funds_fails() {
        let coins = vec![coin(1, 10, Utc::now())];
        assert_eq!(select(&coins, Amount(100)).unwrap_err(), SelectionError::NoInputs);
    }
}
