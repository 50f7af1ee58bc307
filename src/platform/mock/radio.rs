//! Mock radio signal driver
//!
//! Records the primitive sequence of every frame and panics when a new frame
//! begins before the previous one was completed, mirroring the hardware
//! driver's single shared signal buffer.

use crate::platform::traits::radio::RadioSignalDriver;
use heapless::Vec;

/// Recorded driver primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioOp {
    BeginFrame,
    Bit(bool),
    EndFrame,
    RequestSend,
}

/// Maximum recorded primitives (three full 32-bit frames)
const OPS_CAPACITY: usize = 105;

/// Recording [`RadioSignalDriver`]
pub struct MockRadio {
    ops: Vec<RadioOp, OPS_CAPACITY>,
    busy: bool,
}

impl MockRadio {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            busy: false,
        }
    }

    /// Recorded primitive sequence
    pub fn ops(&self) -> &[RadioOp] {
        &self.ops
    }

    /// Forget the recorded sequence (the busy state is kept)
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// True between `request_send` and `complete_send`
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Signal the completion callback the hardware driver would deliver
    pub fn complete_send(&mut self) {
        assert!(self.busy, "no transmission outstanding");
        self.busy = false;
    }

    /// Reassemble the data bits of the last recorded frame into a word
    pub fn last_frame_word(&self) -> Option<u32> {
        let start = self
            .ops
            .iter()
            .rposition(|op| *op == RadioOp::BeginFrame)?;
        let mut word = 0u32;
        let mut bits = 0;
        for op in &self.ops[start + 1..] {
            match op {
                RadioOp::Bit(bit) => {
                    word = (word << 1) | u32::from(*bit);
                    bits += 1;
                }
                RadioOp::EndFrame => break,
                _ => return None,
            }
        }
        if bits == 32 {
            Some(word)
        } else {
            None
        }
    }
}

impl Default for MockRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioSignalDriver for MockRadio {
    fn begin_frame(&mut self) {
        assert!(
            !self.busy,
            "frame begun before the previous transmission completed"
        );
        self.ops.push(RadioOp::BeginFrame).expect("op log full");
    }

    fn emit_bit(&mut self, bit: bool) {
        self.ops.push(RadioOp::Bit(bit)).expect("op log full");
    }

    fn end_frame(&mut self) {
        self.ops.push(RadioOp::EndFrame).expect("op log full");
    }

    fn request_send(&mut self) {
        self.ops.push(RadioOp::RequestSend).expect("op log full");
        self.busy = true;
    }
}
