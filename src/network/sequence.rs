use log::debug;

use crate::math::Buffer;
use crate::node::{Node, ParameterisedNode};

/// An ordered chain of nodes.
///
/// `forward` records every intermediate activation (the input plus one output
/// per node); `backward` replays them in reverse so each node receives the
/// input it saw during the matching forward call.
#[derive(Default)]
pub struct Sequence {
    nodes: Vec<Box<dyn Node>>,
    activations: Vec<Buffer>,
    is_training: bool,
}

impl Sequence {
    pub fn new() -> Sequence {
        Sequence::default()
    }

    /// Appends a node. Invalidates the activation cache.
    pub fn push<N: Node + 'static>(&mut self, node: N) {
        self.push_boxed(Box::new(node));
    }

    pub fn push_boxed(&mut self, node: Box<dyn Node>) {
        self.nodes.push(node);
        self.activations.clear();
    }

    /// Builder-style `push`.
    pub fn with<N: Node + 'static>(mut self, node: N) -> Sequence {
        self.push(node);
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Box<dyn Node>] {
        &self.nodes
    }

    /// Mode applied to every node before it runs, on each pass.
    pub fn set_training(&mut self, is_training: bool) {
        self.is_training = is_training;
    }

    pub fn is_training(&self) -> bool {
        self.is_training
    }

    /// Activations from the most recent `forward`: entry 0 is the input,
    /// entry `i + 1` is the output of node `i`.
    pub fn activations(&self) -> &[Buffer] {
        &self.activations
    }

    /// Parameterised nodes in traversal order.
    pub fn parameterised(&self) -> Vec<&dyn ParameterisedNode> {
        self.nodes.iter().filter_map(|n| n.as_parameterised()).collect()
    }

    pub fn parameterised_mut(&mut self) -> Vec<&mut dyn ParameterisedNode> {
        self.nodes.iter_mut().filter_map(|n| n.as_parameterised_mut()).collect()
    }

    /// Clears the accumulated weight and bias gradients of every layer.
    pub fn zero_grad(&mut self) {
        for layer in self.parameterised_mut() {
            layer.get_w_mut().zero_grad();
            layer.get_b_mut().zero_grad();
        }
    }

    /// Runs `x` through every node in order and returns the final output.
    pub fn forward(&mut self, x: &Buffer) -> &Buffer {
        self.activations.clear();
        self.activations.push(x.clone());

        for (i, node) in self.nodes.iter_mut().enumerate() {
            node.set_state(self.is_training);
            let y = node.forward(&self.activations[i]);
            debug!("forward node {i} ({}): {} -> {}", node.name(), self.activations[i].size(), y.size());
            self.activations.push(y);
        }

        &self.activations[self.nodes.len()]
    }

    /// Propagates `dy` (∂L/∂output) back to ∂L/∂input.
    ///
    /// `x` is the input of the matching `forward`; node inputs are taken from
    /// the activation cache.
    ///
    /// # Panics
    /// Panics if `forward` has not been called since the node list last changed.
    pub fn backward(&mut self, _x: &Buffer, dy: &Buffer) -> Buffer {
        assert_eq!(
            self.activations.len(),
            self.nodes.len() + 1,
            "backward called without a matching forward"
        );

        let mut d = dy.clone();
        for i in (0..self.nodes.len()).rev() {
            let node = &mut self.nodes[i];
            node.set_state(self.is_training);
            d = node.backward(&self.activations[i], &d);
            debug!("backward node {i} ({}): gradient of {}", node.name(), d.size());
        }
        d
    }
}
