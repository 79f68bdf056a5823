//! The operator capability and its closed set of variants.
//!
//! Every signal-processing unit in the graph follows the same three-step
//! contract, once per block:
//!
//! 1. `set_ins` stores the block's input samples (the sum of its producers, or
//!    silence for a source).
//! 2. `compute` fills the output buffer from the inputs and the operator's own
//!    state. It never allocates, blocks or fails; an operator that cannot
//!    produce valid output emits silence and records a [`Fault`].
//! 3. `get_outs` exposes the result, as many times as downstream needs it.
//!
//! Splitting the steps lets the graph be wired once and re-run every block,
//! and lets one producer fan out to several consumers without recomputing.

/// Note-driven, frequency-modulatable signal generator.
pub mod carrier;
/// Multi-tap delay (echo/chorus).
pub mod echo;
/// Biquad low/high-pass.
pub mod filter;

use crate::{
    engine::stats::{EngineStats, Fault},
    error::{Result, SynthError},
    MAX_BLOCK_SIZE,
};

use self::{carrier::Carrier, echo::Echo, filter::Filter};

/// Context handed to every operator for one block.
///
/// - sample_rate: stream rate in Hz
/// - start_sample: clock position of the block's first frame
/// - stats: side channel for faults recovered inside `compute`
pub struct BlockCtx<'a> {
    pub sample_rate: f32,
    pub start_sample: u64,
    pub stats: &'a EngineStats,
}

impl<'a> BlockCtx<'a> {
    pub fn new(sample_rate: f32, start_sample: u64, stats: &'a EngineStats) -> Self {
        Self {
            sample_rate,
            start_sample,
            stats,
        }
    }

    /// Absolute time of frame `frame` of this block, in seconds.
    #[inline]
    pub fn time_at(&self, frame: usize) -> f64 {
        (self.start_sample + frame as u64) as f64 / self.sample_rate as f64
    }
}

/// Core trait for units of the operator graph.
pub trait Operator: Send {
    /// Replace the input buffer with `samples` for the coming block.
    fn set_ins(&mut self, samples: &[f32]);

    /// Produce exactly as many output samples as the last `set_ins` supplied.
    fn compute(&mut self, ctx: &BlockCtx);

    /// Most recently computed block.
    fn get_outs(&self) -> &[f32];

    /// Largest block the operator's buffers hold.
    fn block_capacity(&self) -> usize;

    /// Validate against the stream's sample rate and precompute anything
    /// that depends on it. Called once when the graph is built.
    fn prepare(&mut self, _sample_rate: f32) -> Result<()> {
        Ok(())
    }

    /// Clear runtime state (phases, histories) but keep configuration.
    fn reset(&mut self) {}
}

/// Input and output storage shared by every operator.
///
/// Both buffers are allocated once at `capacity`; `len` tracks the current
/// block, which may be shorter when the backend hands over odd-sized buffers.
#[derive(Debug, Clone)]
pub struct OperatorBuffers {
    ins: Vec<f32>,
    outs: Vec<f32>,
    len: usize,
    overflowed: bool,
}

impl OperatorBuffers {
    pub fn new(capacity: usize) -> Self {
        Self {
            ins: vec![0.0; capacity],
            outs: vec![0.0; capacity],
            len: 0,
            overflowed: false,
        }
    }

    /// Buffers for an operator under construction; rejects capacities the
    /// engine can never hand over.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 || capacity > MAX_BLOCK_SIZE {
            return Err(SynthError::InvalidBlockSize {
                size: capacity,
                max: MAX_BLOCK_SIZE,
            });
        }
        Ok(Self::new(capacity))
    }

    pub fn capacity(&self) -> usize {
        self.ins.len()
    }

    /// Copy a block in. Anything past capacity is dropped and flagged so the
    /// next compute can silence itself.
    pub fn load(&mut self, samples: &[f32]) {
        let n = samples.len().min(self.capacity());
        self.overflowed = samples.len() > n;
        self.ins[..n].copy_from_slice(&samples[..n]);
        self.len = n;
    }

    pub fn ins(&self) -> &[f32] {
        &self.ins[..self.len]
    }

    pub fn outs(&self) -> &[f32] {
        &self.outs[..self.len]
    }

    /// Inputs and outputs of the current block, borrowed together.
    pub fn split(&mut self) -> (&[f32], &mut [f32]) {
        (&self.ins[..self.len], &mut self.outs[..self.len])
    }

    /// Start of compute: true if the block must be silenced because the last
    /// `load` overflowed. Records the fault.
    pub fn check_overflow(&mut self, ctx: &BlockCtx) -> bool {
        if self.overflowed {
            self.overflowed = false;
            self.silence();
            ctx.stats.record_fault(Fault::BlockOverflow);
            return true;
        }
        false
    }

    /// End of compute: silence the block if any sample is NaN or infinite.
    pub fn sanitize(&mut self, ctx: &BlockCtx) {
        if self.outs().iter().any(|s| !s.is_finite()) {
            self.silence();
            ctx.stats.record_fault(Fault::NonFinite);
        }
    }

    pub fn silence(&mut self) {
        self.outs[..self.len].fill(0.0);
    }

    pub fn clear(&mut self) {
        self.ins.fill(0.0);
        self.outs.fill(0.0);
    }
}

/// The closed set of operators the graph can hold.
///
/// Dispatch is a `match`, so the per-block path has no vtable and every
/// implementer is listed here.
pub enum OperatorNode {
    Carrier(Carrier),
    Filter(Filter),
    Echo(Echo),
}

impl OperatorNode {
    pub fn kind(&self) -> &'static str {
        match self {
            OperatorNode::Carrier(_) => "carrier",
            OperatorNode::Filter(_) => "filter",
            OperatorNode::Echo(_) => "echo",
        }
    }

    pub fn as_carrier(&self) -> Option<&Carrier> {
        match self {
            OperatorNode::Carrier(carrier) => Some(carrier),
            _ => None,
        }
    }

    pub fn as_carrier_mut(&mut self) -> Option<&mut Carrier> {
        match self {
            OperatorNode::Carrier(carrier) => Some(carrier),
            _ => None,
        }
    }
}

impl Operator for OperatorNode {
    fn set_ins(&mut self, samples: &[f32]) {
        match self {
            OperatorNode::Carrier(op) => op.set_ins(samples),
            OperatorNode::Filter(op) => op.set_ins(samples),
            OperatorNode::Echo(op) => op.set_ins(samples),
        }
    }

    fn compute(&mut self, ctx: &BlockCtx) {
        match self {
            OperatorNode::Carrier(op) => op.compute(ctx),
            OperatorNode::Filter(op) => op.compute(ctx),
            OperatorNode::Echo(op) => op.compute(ctx),
        }
    }

    fn get_outs(&self) -> &[f32] {
        match self {
            OperatorNode::Carrier(op) => op.get_outs(),
            OperatorNode::Filter(op) => op.get_outs(),
            OperatorNode::Echo(op) => op.get_outs(),
        }
    }

    fn block_capacity(&self) -> usize {
        match self {
            OperatorNode::Carrier(op) => op.block_capacity(),
            OperatorNode::Filter(op) => op.block_capacity(),
            OperatorNode::Echo(op) => op.block_capacity(),
        }
    }

    fn prepare(&mut self, sample_rate: f32) -> Result<()> {
        match self {
            OperatorNode::Carrier(op) => op.prepare(sample_rate),
            OperatorNode::Filter(op) => op.prepare(sample_rate),
            OperatorNode::Echo(op) => op.prepare(sample_rate),
        }
    }

    fn reset(&mut self) {
        match self {
            OperatorNode::Carrier(op) => op.reset(),
            OperatorNode::Filter(op) => op.reset(),
            OperatorNode::Echo(op) => op.reset(),
        }
    }
}

impl From<Carrier> for OperatorNode {
    fn from(op: Carrier) -> Self {
        OperatorNode::Carrier(op)
    }
}

impl From<Filter> for OperatorNode {
    fn from(op: Filter) -> Self {
        OperatorNode::Filter(op)
    }
}

impl From<Echo> for OperatorNode {
    fn from(op: Echo) -> Self {
        OperatorNode::Echo(op)
    }
}
