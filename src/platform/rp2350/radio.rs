//! 433 MHz OOK signal driver
//!
//! Builds the on-air pulse train for one frame and bit-bangs it out of a
//! GPIO pin feeding the transmitter module. [`Rp2350Radio`] implements the
//! signal-builder primitives; the completed train goes through a capacity-1
//! channel to [`radio_task`], which owns the pin, repeats the train, and
//! reports the `FrameSent` event with the measured on-air time. The single
//! channel slot realizes the driver's one-shared-signal-buffer contract: a
//! frame requested while the previous one is still on the air is dropped.

use embassy_rp::gpio::Output;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Instant, Timer};
use heapless::Vec;

use crate::communication::syslog::catalog::Event;
use crate::platform::rp2350::net::with_transport;
use crate::platform::traits::radio::RadioSignalDriver;

/// Base pulse unit in microseconds
const UNIT_US: u64 = 400;

/// Mark length in units (every symbol starts with one mark)
const MARK_UNITS: u64 = 1;

/// Space length of a `0` symbol, in units
const ZERO_SPACE_UNITS: u64 = 2;

/// Space length of a `1` symbol, in units
const ONE_SPACE_UNITS: u64 = 4;

/// Space length of the frame preamble, in units
const SYNC_SPACE_UNITS: u64 = 17;

/// Times the pulse train is repeated per request
const REPEAT_COUNT: usize = 3;

/// Pulses per frame: sync + 32 data bits + terminator
const PULSES_PER_FRAME: usize = 34;

/// One mark-then-space pulse, durations in microseconds
#[derive(Debug, Clone, Copy)]
struct Pulse {
    mark_us: u64,
    space_us: u64,
}

impl Pulse {
    const fn from_units(mark: u64, space: u64) -> Self {
        Self {
            mark_us: mark * UNIT_US,
            space_us: space * UNIT_US,
        }
    }
}

/// A completed pulse train awaiting transmission
struct RadioJob {
    pulses: Vec<Pulse, PULSES_PER_FRAME>,
    word: u32,
}

static RADIO_JOBS: Channel<CriticalSectionRawMutex, RadioJob, 1> = Channel::new();

/// Signal builder for the GPIO transmitter
pub struct Rp2350Radio {
    pulses: Vec<Pulse, PULSES_PER_FRAME>,
    word: u32,
}

impl Rp2350Radio {
    pub const fn new() -> Self {
        Self {
            pulses: Vec::new(),
            word: 0,
        }
    }
}

impl Default for Rp2350Radio {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioSignalDriver for Rp2350Radio {
    fn begin_frame(&mut self) {
        self.pulses.clear();
        self.word = 0;
        let _ = self
            .pulses
            .push(Pulse::from_units(MARK_UNITS, SYNC_SPACE_UNITS));
    }

    fn emit_bit(&mut self, bit: bool) {
        self.word = (self.word << 1) | u32::from(bit);
        let space = if bit { ONE_SPACE_UNITS } else { ZERO_SPACE_UNITS };
        let _ = self.pulses.push(Pulse::from_units(MARK_UNITS, space));
    }

    fn end_frame(&mut self) {
        let _ = self.pulses.push(Pulse::from_units(MARK_UNITS, MARK_UNITS));
    }

    fn request_send(&mut self) {
        let job = RadioJob {
            pulses: self.pulses.clone(),
            word: self.word,
        };
        if RADIO_JOBS.try_send(job).is_err() {
            crate::log_warn!("radio: transmitter busy, frame dropped");
        }
    }
}

/// Transmitter pump: keys the GPIO pin with each queued pulse train.
#[embassy_executor::task]
pub async fn radio_task(mut pin: Output<'static>) -> ! {
    with_transport(|transport| transport.emit(Event::RadioStarted));
    loop {
        let job = RADIO_JOBS.receive().await;
        let started = Instant::now();
        for _ in 0..REPEAT_COUNT {
            for pulse in &job.pulses {
                pin.set_high();
                Timer::after_micros(pulse.mark_us).await;
                pin.set_low();
                Timer::after_micros(pulse.space_us).await;
            }
        }
        let micros = started.elapsed().as_micros() as u32;
        with_transport(|transport| {
            transport.emit(Event::FrameSent {
                frame: job.word,
                micros,
            })
        });
    }
}
