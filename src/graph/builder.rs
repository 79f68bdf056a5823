use std::collections::VecDeque;

use crate::{
    config::EngineConfig,
    error::{Result, SynthError},
    graph::{evaluate::OperatorGraph, OperatorId},
    operator::{Operator, OperatorNode},
};

/*
Building a Graph
================

Operators are added first, then connected. An edge `from → to` means "the
output of `from` is (part of) the input of `to`":

    let mut builder = GraphBuilder::new();
    let modulator = builder.add(Carrier::with_ratio(3.0, 512)?);
    let carrier   = builder.add(Carrier::with_ratio(1.0, 512)?);
    let lowpass   = builder.add(Filter::lowpass(0.707, 4000.0, 512)?);
    builder.connect(modulator, carrier)?;
    builder.connect(carrier, lowpass)?;
    let graph = builder.build(&config)?;

Everything that can be wrong with the wiring is reported here, before a
stream exists: unknown ids, self-loops, duplicate edges, cycles, buffers
sized differently from the engine's block, parameters the sample rate cannot
support, and an output that cannot be inferred.

Evaluation Order
----------------

`build` runs Kahn's algorithm once:

    1. every operator with no producers is ready, in insertion order
    2. take the first ready operator and append it to the order
    3. each successor loses one pending producer; those reaching zero
       become ready
    4. repeat until nothing is ready

If some operators were never reached, their producers form a cycle. The
resulting order is reused for every block; it is never recomputed.
*/

#[derive(Default)]
pub struct GraphBuilder {
    nodes: Vec<OperatorNode>,
    edges: Vec<(OperatorId, OperatorId)>,
    output: Option<OperatorId>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, op: impl Into<OperatorNode>) -> OperatorId {
        let id = OperatorId::from_index(self.nodes.len());
        self.nodes.push(op.into());
        id
    }

    /// Feed the output of `from` into the input of `to`.
    pub fn connect(&mut self, from: OperatorId, to: OperatorId) -> Result<()> {
        let producer = self.node(from)?;
        let consumer = self.node(to)?;
        if from == to {
            return Err(SynthError::SelfLoop(from));
        }
        if self.edges.contains(&(from, to)) {
            return Err(SynthError::DuplicateConnection { from, to });
        }
        if producer.block_capacity() != consumer.block_capacity() {
            return Err(SynthError::BlockSizeMismatch {
                id: to,
                expected: producer.block_capacity(),
                actual: consumer.block_capacity(),
            });
        }

        self.edges.push((from, to));
        Ok(())
    }

    /// Connect each operator to the next one.
    pub fn chain(&mut self, ids: &[OperatorId]) -> Result<()> {
        for pair in ids.windows(2) {
            self.connect(pair[0], pair[1])?;
        }
        Ok(())
    }

    /// Choose the operator whose output goes to the backend. Optional when
    /// exactly one operator has no successors.
    pub fn set_output(&mut self, id: OperatorId) -> Result<()> {
        self.node(id)?;
        self.output = Some(id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn build(mut self, config: &EngineConfig) -> Result<OperatorGraph> {
        config.validate()?;
        if self.nodes.is_empty() {
            return Err(SynthError::EmptyGraph);
        }

        for (index, node) in self.nodes.iter_mut().enumerate() {
            let id = OperatorId::from_index(index);
            if node.block_capacity() != config.max_block_size {
                return Err(SynthError::BlockSizeMismatch {
                    id,
                    expected: config.max_block_size,
                    actual: node.block_capacity(),
                });
            }
            node.prepare(config.sample_rate)?;
        }

        let order = topological_order(self.nodes.len(), &self.edges)?;

        let mut inputs = vec![Vec::new(); self.nodes.len()];
        for &(from, to) in &self.edges {
            inputs[to.index()].push(from);
        }

        let output = match self.output {
            Some(id) => id,
            None => self.infer_output()?,
        };

        log::debug!(
            "built graph: {} operators, {} connections, order {:?}, output {}",
            self.nodes.len(),
            self.edges.len(),
            order,
            output
        );

        Ok(OperatorGraph::new(
            self.nodes,
            order,
            inputs,
            output,
            config.max_block_size,
            config.sample_rate,
        ))
    }

    fn node(&self, id: OperatorId) -> Result<&OperatorNode> {
        self.nodes
            .get(id.index())
            .ok_or(SynthError::UnknownOperator(id))
    }

    fn infer_output(&self) -> Result<OperatorId> {
        let mut sinks = (0..self.nodes.len())
            .map(OperatorId::from_index)
            .filter(|&id| !self.edges.iter().any(|&(from, _)| from == id));

        match (sinks.next(), sinks.count()) {
            (Some(id), 0) => Ok(id),
            (Some(_), rest) => Err(SynthError::AmbiguousOutput(rest + 1)),
            // Every operator has a successor, so the edges must cycle; the
            // topological sort has already rejected that.
            (None, _) => Err(SynthError::AmbiguousOutput(0)),
        }
    }
}

/// Kahn's algorithm with insertion-order tie breaking.
fn topological_order(len: usize, edges: &[(OperatorId, OperatorId)]) -> Result<Vec<OperatorId>> {
    let mut pending = vec![0usize; len];
    let mut successors = vec![Vec::new(); len];
    for &(from, to) in edges {
        pending[to.index()] += 1;
        successors[from.index()].push(to.index());
    }

    let mut ready: VecDeque<usize> = (0..len).filter(|&i| pending[i] == 0).collect();
    let mut order = Vec::with_capacity(len);

    while let Some(index) = ready.pop_front() {
        order.push(OperatorId::from_index(index));
        for &next in &successors[index] {
            pending[next] -= 1;
            if pending[next] == 0 {
                ready.push_back(next);
            }
        }
    }

    if order.len() < len {
        return Err(SynthError::CycleDetected(find_cycle_member(&pending, edges)));
    }
    Ok(order)
}

/// Every unplaced operator still has an unplaced producer. Walking producers
/// back `len` times from any of them must end on a cycle.
fn find_cycle_member(pending: &[usize], edges: &[(OperatorId, OperatorId)]) -> OperatorId {
    let stuck = |i: usize| pending[i] > 0;
    let mut current = (0..pending.len()).find(|&i| stuck(i)).unwrap_or(0);

    for _ in 0..pending.len() {
        let producer = edges
            .iter()
            .find(|&&(from, to)| to.index() == current && stuck(from.index()))
            .map(|&(from, _)| from.index());
        match producer {
            Some(from) => current = from,
            None => break,
        }
    }
    OperatorId::from_index(current)
}
