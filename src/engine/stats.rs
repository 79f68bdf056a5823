//! Counters shared between the real-time thread and the control thread.
//!
//! The audio thread only ever does relaxed atomic increments here; the
//! control thread reads them whenever it likes. This is the side channel for
//! faults that must not cross the callback boundary as errors.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Faults recovered locally on the real-time path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// An operator produced NaN or infinity; its block was silenced.
    NonFinite,
    /// An input block exceeded an operator's buffer capacity.
    BlockOverflow,
    /// A carrier's note storage was full; the note was dropped.
    NoteCapacity,
    /// A note message named an operator that is not a carrier.
    UnknownTarget,
    /// The backend handed over a buffer with zero channels.
    BadChannelCount,
    /// The backend reported a stream error.
    Backend,
}

const FAULT_KINDS: usize = 6;

impl Fault {
    pub const ALL: [Fault; FAULT_KINDS] = [
        Fault::NonFinite,
        Fault::BlockOverflow,
        Fault::NoteCapacity,
        Fault::UnknownTarget,
        Fault::BadChannelCount,
        Fault::Backend,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Default)]
pub struct EngineStats {
    blocks: AtomicU64,
    frames: AtomicU64,
    faults: [AtomicU64; FAULT_KINDS],
}

impl EngineStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_fault(&self, fault: Fault) {
        self.faults[fault.slot()].fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_block(&self, frames: usize) {
        self.blocks.fetch_add(1, Ordering::Relaxed);
        self.frames.fetch_add(frames as u64, Ordering::Relaxed);
    }

    pub fn fault_count(&self, fault: Fault) -> u64 {
        self.faults[fault.slot()].load(Ordering::Relaxed)
    }

    pub fn total_faults(&self) -> u64 {
        Fault::ALL.iter().map(|&f| self.fault_count(f)).sum()
    }

    pub fn blocks_rendered(&self) -> u64 {
        self.blocks.load(Ordering::Relaxed)
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let mut faults = [0; FAULT_KINDS];
        for fault in Fault::ALL {
            faults[fault.slot()] = self.fault_count(fault);
        }
        StatsSnapshot {
            blocks: self.blocks_rendered(),
            frames: self.frames_rendered(),
            faults,
        }
    }
}

/// Plain copy of the counters at one moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub blocks: u64,
    pub frames: u64,
    faults: [u64; FAULT_KINDS],
}

impl StatsSnapshot {
    pub fn fault_count(&self, fault: Fault) -> u64 {
        self.faults[fault.slot()]
    }

    pub fn has_faults(&self) -> bool {
        self.faults.iter().any(|&n| n > 0)
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} blocks, {} frames", self.blocks, self.frames)?;
        for fault in Fault::ALL {
            let count = self.fault_count(fault);
            if count > 0 {
                write!(f, ", {fault:?}: {count}")?;
            }
        }
        Ok(())
    }
}
