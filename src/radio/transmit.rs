//! Transmit Control
//!
//! Sends an encoded frame over the on/off-keyed link. Each request sends
//! the frame twice with a short pause in between; receivers often miss a
//! single burst and there is no acknowledgement.
//!
//! Pulse edges are paced by the borrowed tick clock: the transmitter sleeps
//! until the next tick, then writes the level immediately on wake. Sleeping
//! before the write rather than after keeps every edge the same distance
//! from the previous one no matter how long the bookkeeping in between took.

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::{BURSTS_PER_TRANSMIT, INTER_BURST_PAUSE_MS, TICK_RATE_HZ};
use crate::hal::gpio::RfLine;
use crate::hal::timer::{ClockController, ClockSession, TickWaiter};
use crate::protocol::{Frame, FrameEncoder};
use crate::radio::pulse::PulseEncoder;
use crate::sensor::Reading;
use crate::types::{Channel, Level, RollingId};

/// Transmit state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TxPhase {
    /// Not transmitting
    #[default]
    Idle,
    /// Saving and reprogramming the tick clock
    ConfiguringClock,
    /// Emitting pulses
    SendingBits,
    /// Giving the clock back to its owner
    RestoringClock,
    /// Waiting between the two bursts
    InterBurstPause,
}

#[cfg(feature = "embedded")]
impl defmt::Format for TxPhase {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Idle => defmt::write!(f, "IDLE"),
            Self::ConfiguringClock => defmt::write!(f, "CLK↑"),
            Self::SendingBits => defmt::write!(f, "TX"),
            Self::RestoringClock => defmt::write!(f, "CLK↓"),
            Self::InterBurstPause => defmt::write!(f, "PAUSE"),
        }
    }
}

/// Transmit failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxError<E> {
    /// Writing the RF data pin failed
    Pin(E),
}

impl<E: fmt::Debug> fmt::Display for TxError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pin(e) => write!(f, "RF data pin write failed: {e:?}"),
        }
    }
}

#[cfg(feature = "embedded")]
impl<E> defmt::Format for TxError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Pin(_) => defmt::write!(f, "TxError::Pin"),
        }
    }
}

/// Oregon Scientific v2.1 transmitter
///
/// Owns the RF data line, the borrowed tick clock, a blocking delay for the
/// inter-burst pause and the frame encoder. Construction writes the
/// per-sensor fields, so a transmitter can never send an uninitialised
/// frame.
pub struct PrecisionTransmitter<P, C, D> {
    line: RfLine<P>,
    clock: C,
    delay: D,
    encoder: FrameEncoder,
    phase: TxPhase,
    bursts_sent: u32,
}

impl<P, C, D> PrecisionTransmitter<P, C, D>
where
    P: OutputPin,
    C: ClockController + TickWaiter,
    D: DelayNs,
{
    /// Take the hardware, drive the line low and set up the frame
    ///
    /// # Errors
    ///
    /// Returns [`TxError::Pin`] if the line cannot be driven low.
    pub fn initialize(
        pin: P,
        clock: C,
        delay: D,
        channel: Channel,
        rolling_id: RollingId,
    ) -> Result<Self, TxError<P::Error>> {
        let line = RfLine::new(pin).map_err(TxError::Pin)?;

        #[cfg(feature = "embedded")]
        defmt::info!("OS21 transmitter on {} ({})", channel, rolling_id);

        Ok(Self {
            line,
            clock,
            delay,
            encoder: FrameEncoder::new(channel, rolling_id),
            phase: TxPhase::Idle,
            bursts_sent: 0,
        })
    }

    /// Encode a reading and send it twice
    ///
    /// Blocks for roughly 243 ms (two 94 ms bursts and a 55 ms pause).
    ///
    /// # Errors
    ///
    /// Returns [`TxError::Pin`] if a pin write fails. The tick clock is
    /// restored before returning either way.
    pub fn transmit(
        &mut self,
        temperature: f32,
        humidity: f32,
        low_battery: bool,
    ) -> Result<(), TxError<P::Error>> {
        let reading = Reading {
            temperature,
            humidity,
            low_battery,
        };
        self.transmit_reading(&reading)
    }

    /// Encode a [`Reading`] and send it twice
    ///
    /// # Errors
    ///
    /// Same as [`Self::transmit`].
    pub fn transmit_reading(&mut self, reading: &Reading) -> Result<(), TxError<P::Error>> {
        self.transmit_observed(reading, &mut |_: TxPhase| {})
    }

    /// Encode a [`Reading`] and send it twice, reporting every phase change
    ///
    /// `observer` runs on each transition, including the final return to
    /// [`TxPhase::Idle`]. It is called between pulse edges, so it must
    /// finish well within one tick.
    ///
    /// # Errors
    ///
    /// Same as [`Self::transmit`].
    pub fn transmit_observed<O>(
        &mut self,
        reading: &Reading,
        observer: &mut O,
    ) -> Result<(), TxError<P::Error>>
    where
        O: FnMut(TxPhase),
    {
        let _frame = self.encoder.encode(reading);

        #[cfg(feature = "embedded")]
        defmt::debug!("TX {} -> {}", reading, _frame);

        let mut result = Ok(());
        for burst in 0..BURSTS_PER_TRANSMIT {
            if burst > 0 {
                enter(&mut self.phase, TxPhase::InterBurstPause, observer);
                self.delay.delay_ms(INTER_BURST_PAUSE_MS);
            }
            result = self.burst(observer);
            if result.is_err() {
                break;
            }
        }

        enter(&mut self.phase, TxPhase::Idle, observer);
        result
    }

    /// Send the current frame once
    ///
    /// # Errors
    ///
    /// Returns [`TxError::Pin`] if a pin write fails; the line is driven low
    /// (best effort) and the clock restored before returning.
    pub fn send_frame(&mut self) -> Result<(), TxError<P::Error>> {
        let mut observer = |_: TxPhase| {};
        let result = self.burst(&mut observer);
        enter(&mut self.phase, TxPhase::Idle, &mut observer);
        result
    }

    /// One burst with the clock borrowed for its duration
    fn burst<O>(&mut self, observer: &mut O) -> Result<(), TxError<P::Error>>
    where
        O: FnMut(TxPhase),
    {
        enter(&mut self.phase, TxPhase::ConfiguringClock, observer);
        let mut session = ClockSession::open(&mut self.clock, TICK_RATE_HZ);

        enter(&mut self.phase, TxPhase::SendingBits, observer);
        let result = send_pulses(&mut self.line, &mut *session, self.encoder.frame());
        if result.is_err() {
            // Never leave the carrier keyed
            if self.line.off().is_err() {
                #[cfg(feature = "embedded")]
                defmt::warn!("RF line stuck, carrier may still be keyed");
            }
        }

        enter(&mut self.phase, TxPhase::RestoringClock, observer);
        drop(session);

        if result.is_ok() {
            self.bursts_sent = self.bursts_sent.wrapping_add(1);
        }
        result.map_err(TxError::Pin)
    }

    /// Give back the pin, clock and delay
    pub fn release(self) -> (P, C, D) {
        (self.line.release(), self.clock, self.delay)
    }
}

impl<P, C, D> PrecisionTransmitter<P, C, D> {
    /// Last phase entered
    ///
    /// `Idle` between calls. After a panic unwound out of a transmission it
    /// still names the phase that was interrupted.
    #[must_use]
    pub const fn phase(&self) -> TxPhase {
        self.phase
    }

    /// Check if the last transmission did not run to completion
    #[must_use]
    pub const fn is_transmitting(&self) -> bool {
        !matches!(self.phase, TxPhase::Idle)
    }

    /// Frame encoder
    #[must_use]
    pub const fn encoder(&self) -> &FrameEncoder {
        &self.encoder
    }

    /// Most recently encoded frame
    #[must_use]
    pub const fn frame(&self) -> &Frame {
        self.encoder.frame()
    }

    /// Last level written to the RF line
    #[must_use]
    pub const fn line_level(&self) -> Level {
        self.line.level()
    }

    /// Bursts completed since initialisation
    #[must_use]
    pub const fn bursts_sent(&self) -> u32 {
        self.bursts_sent
    }
}

/// Record a phase change and report it
fn enter<O: FnMut(TxPhase)>(slot: &mut TxPhase, next: TxPhase, observer: &mut O) {
    *slot = next;
    observer(next);
}

/// Emit one burst, then return the line to low
///
/// Every write, including the final one, waits for its own tick.
fn send_pulses<P, T>(line: &mut RfLine<P>, ticks: &mut T, frame: &Frame) -> Result<(), P::Error>
where
    P: OutputPin,
    T: TickWaiter + ?Sized,
{
    for level in PulseEncoder::new(*frame) {
        ticks.wait_for_tick();
        line.set(level)?;
    }

    ticks.wait_for_tick();
    line.off()
}
