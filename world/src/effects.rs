//! Timed effects keyed by kind with absolute expiry timestamps.

use std::{collections::BTreeMap, time::Duration};

use dark_snake_core::{EffectKind, EffectSnapshot};

/// Map from effect kind to the instant its window closes.
#[derive(Clone, Debug, Default)]
pub(crate) struct TimedEffectSet {
    expiries: BTreeMap<EffectKind, Duration>,
}

impl TimedEffectSet {
    /// Arms `kind` until `now + duration`, refreshing any window already open.
    pub(crate) fn arm(&mut self, kind: EffectKind, now: Duration, duration: Duration) {
        let _ = self.expiries.insert(kind, now.saturating_add(duration));
    }

    pub(crate) fn is_active(&self, kind: EffectKind, now: Duration) -> bool {
        self.expiries
            .get(&kind)
            .is_some_and(|expiry| now < *expiry)
    }

    pub(crate) fn clear(&mut self) {
        self.expiries.clear();
    }

    pub(crate) fn disarm(&mut self, kind: EffectKind) {
        let _ = self.expiries.remove(&kind);
    }

    /// Removes every effect whose window closed at or before `now`.
    ///
    /// Expired kinds are appended to `expired` in kind order.
    pub(crate) fn sweep(&mut self, now: Duration, expired: &mut Vec<EffectKind>) {
        self.expiries.retain(|kind, expiry| {
            if *expiry <= now {
                expired.push(*kind);
                false
            } else {
                true
            }
        });
    }

    pub(crate) fn snapshots(&self, now: Duration) -> Vec<EffectSnapshot> {
        self.expiries
            .iter()
            .filter(|(_, expiry)| now < **expiry)
            .map(|(kind, expiry)| EffectSnapshot {
                kind: *kind,
                remaining: expiry.saturating_sub(now),
            })
            .collect()
    }
}
