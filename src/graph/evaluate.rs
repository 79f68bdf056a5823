use crate::{
    graph::OperatorId,
    operator::{carrier::Carrier, BlockCtx, Operator, OperatorNode},
};

/// A validated operator graph with its evaluation order fixed.
///
/// The graph owns every operator. `evaluate` takes `&mut self`, so no
/// operator can be computing a second block while the first is in flight.
pub struct OperatorGraph {
    nodes: Vec<OperatorNode>,
    order: Vec<OperatorId>,
    inputs: Vec<Vec<OperatorId>>,
    output: OperatorId,
    /// Fan-in sum for the operator being fed; sized once at build.
    scratch: Vec<f32>,
    sample_rate: f32,
}

impl OperatorGraph {
    pub(crate) fn new(
        nodes: Vec<OperatorNode>,
        order: Vec<OperatorId>,
        inputs: Vec<Vec<OperatorId>>,
        output: OperatorId,
        block_size: usize,
        sample_rate: f32,
    ) -> Self {
        Self {
            nodes,
            order,
            inputs,
            output,
            scratch: vec![0.0; block_size],
            sample_rate,
        }
    }

    /// Render one block of `frames` samples and return the output operator's
    /// buffer.
    ///
    /// Each operator, in topological order, receives the sum of its
    /// producers' current outputs (silence if it has none), then computes.
    pub fn evaluate(&mut self, frames: usize, ctx: &BlockCtx) -> &[f32] {
        let Self {
            nodes,
            order,
            inputs,
            output,
            scratch,
            ..
        } = self;

        let frames = frames.min(scratch.len());
        let mix = &mut scratch[..frames];

        for &id in order.iter() {
            mix.fill(0.0);
            for &producer in &inputs[id.index()] {
                for (sum, &sample) in mix.iter_mut().zip(nodes[producer.index()].get_outs()) {
                    *sum += sample;
                }
            }

            let node = &mut nodes[id.index()];
            node.set_ins(mix);
            node.compute(ctx);
        }

        nodes[output.index()].get_outs()
    }

    /// Last block rendered by the output operator.
    pub fn outs(&self) -> &[f32] {
        self.nodes[self.output.index()].get_outs()
    }

    pub fn order(&self) -> &[OperatorId] {
        &self.order
    }

    pub fn output(&self) -> OperatorId {
        self.output
    }

    /// Producers feeding `id`, in connection order.
    pub fn inputs_of(&self, id: OperatorId) -> Option<&[OperatorId]> {
        self.inputs.get(id.index()).map(Vec::as_slice)
    }

    pub fn operator(&self, id: OperatorId) -> Option<&OperatorNode> {
        self.nodes.get(id.index())
    }

    pub fn carrier_mut(&mut self, id: OperatorId) -> Option<&mut Carrier> {
        self.nodes.get_mut(id.index())?.as_carrier_mut()
    }

    pub fn carrier_ids(&self) -> Vec<OperatorId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.as_carrier().is_some())
            .map(|(index, _)| OperatorId::from_index(index))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn block_size(&self) -> usize {
        self.scratch.len()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Reset every operator's runtime state.
    pub fn reset(&mut self) {
        for node in self.nodes.iter_mut() {
            node.reset();
        }
    }
}
