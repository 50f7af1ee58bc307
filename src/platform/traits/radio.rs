//! Radio signal driver abstraction
//!
//! The frame encoder serializes a telemetry word bit-by-bit through this
//! trait; the driver turns the primitive sequence into the on-air pulse
//! train. The sequence for one frame is strictly ordered:
//!
//! 1. `begin_frame()`
//! 2. `emit_bit()` for each data bit, most significant first
//! 3. `end_frame()`
//! 4. `request_send()`
//!
//! The driver owns a single shared signal buffer, so a new sequence must not
//! start before the driver has reported completion of the previous one.

/// Bit-level signal builder for the 433 MHz transmitter
pub trait RadioSignalDriver {
    /// Start a new signal and write the frame preamble
    fn begin_frame(&mut self);

    /// Append one data bit to the signal
    fn emit_bit(&mut self, bit: bool);

    /// Terminate the signal
    fn end_frame(&mut self);

    /// Hand the completed signal to the transmitter
    fn request_send(&mut self);
}
