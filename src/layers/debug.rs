use log::debug;
use serde::{Deserialize, Serialize};
use std::ops::BitOr;

use crate::math::{Buffer, TensorShape};
use crate::node::Node;

/// Which passes a `DebugLayer` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DebugFlags(u8);

impl DebugFlags {
    pub const FORWARD: DebugFlags = DebugFlags(0b01);
    pub const BACKWARD: DebugFlags = DebugFlags(0b10);
    pub const ALL: DebugFlags = DebugFlags(0b11);

    pub fn contains(self, other: DebugFlags) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for DebugFlags {
    fn default() -> Self {
        DebugFlags::ALL
    }
}

impl BitOr for DebugFlags {
    type Output = DebugFlags;

    fn bitor(self, rhs: DebugFlags) -> DebugFlags {
        DebugFlags(self.0 | rhs.0)
    }
}

/// Pass-through node that logs whatever flows through it.
#[derive(Debug, Clone)]
pub struct DebugLayer {
    shape: TensorShape,
    flags: DebugFlags,
    is_training: bool,
}

impl DebugLayer {
    pub fn new(shape: TensorShape, flags: DebugFlags) -> DebugLayer {
        DebugLayer { shape, flags, is_training: false }
    }

    pub fn shape(&self) -> &TensorShape {
        &self.shape
    }

    pub fn flags(&self) -> DebugFlags {
        self.flags
    }
}

impl Node for DebugLayer {
    fn name(&self) -> &'static str {
        "debug"
    }

    fn forward(&mut self, x: &Buffer) -> Buffer {
        if self.flags.contains(DebugFlags::FORWARD) {
            debug!(
                "forward {} training={}: {:?}",
                self.shape, self.is_training, x.as_slice()
            );
        }
        x.clone()
    }

    fn backward(&mut self, _x: &Buffer, dy: &Buffer) -> Buffer {
        if self.flags.contains(DebugFlags::BACKWARD) {
            debug!(
                "backward {} training={}: {:?}",
                self.shape, self.is_training, dy.as_slice()
            );
        }
        dy.clone()
    }

    fn set_state(&mut self, is_training: bool) {
        self.is_training = is_training;
    }
}
