//! Timer Abstractions
//!
//! The pulse clock borrows a hardware counter that normally belongs to
//! someone else (delays, a time driver). While it is borrowed the counter
//! ticks at the pulse rate and every tick wakes the CPU from idle sleep.
//!
//! The counter is described by two capabilities:
//! - [`ClockController`] saves, reprograms and restores its configuration
//! - [`TickWaiter`] suspends the caller until the next tick
//!
//! [`ClockSession`] ties them together: it saves the configuration when it
//! is opened and writes it back when dropped, on every exit path.
//!
//! [`sleep_until_tick`] and [`spin_until`] are the building blocks hardware
//! backends use for waiting on an interrupt-driven tick count and on
//! register handshakes.

use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicU32, Ordering};

/// Snapshot of the four configuration values of the borrowed counter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
pub struct TimerState {
    /// Counter mode / control register
    pub control: u32,
    /// Clock source selection
    pub clock_select: u32,
    /// Compare (or auto-reload) value
    pub compare: u32,
    /// Interrupt enable mask
    pub interrupt_mask: u32,
}

impl TimerState {
    /// Create a snapshot from its four values, in save/restore order
    #[must_use]
    pub const fn new(control: u32, clock_select: u32, compare: u32, interrupt_mask: u32) -> Self {
        Self {
            control,
            clock_select,
            compare,
            interrupt_mask,
        }
    }

    /// The four values in save/restore order
    #[must_use]
    pub const fn to_array(self) -> [u32; 4] {
        [
            self.control,
            self.clock_select,
            self.compare,
            self.interrupt_mask,
        ]
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for TimerState {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Timer(ctl=0x{:08X}, clk=0x{:08X}, cmp={}, ie=0x{:08X})",
            self.control,
            self.clock_select,
            self.compare,
            self.interrupt_mask
        );
    }
}

/// Save, reprogram and restore a shared hardware counter
pub trait ClockController {
    /// Read the current configuration
    fn save(&mut self) -> TimerState;

    /// Reprogram the counter to interrupt `rate_hz` times per second and
    /// enable idle sleep
    fn configure(&mut self, rate_hz: u32);

    /// Disable idle sleep and write back a saved configuration
    fn restore(&mut self, state: TimerState);
}

/// Block until the next tick of the configured counter
///
/// Work done between two calls must stay below one tick period
/// (see [`crate::config::MAX_WORK_PER_TICK_US`]), otherwise a tick is missed
/// and the following edge is one period late.
pub trait TickWaiter {
    /// Sleep until the next tick interrupt
    fn wait_for_tick(&mut self);
}

impl<T: ClockController + ?Sized> ClockController for &mut T {
    fn save(&mut self) -> TimerState {
        (**self).save()
    }

    fn configure(&mut self, rate_hz: u32) {
        (**self).configure(rate_hz);
    }

    fn restore(&mut self, state: TimerState) {
        (**self).restore(state);
    }
}

impl<T: TickWaiter + ?Sized> TickWaiter for &mut T {
    fn wait_for_tick(&mut self) {
        (**self).wait_for_tick();
    }
}

/// Interrupt masking and low-power wait of the CPU core
pub trait IdleCore {
    /// Mask interrupts
    fn mask(&mut self);

    /// Unmask interrupts; pending handlers run now
    fn unmask(&mut self);

    /// Sleep until an interrupt is pending
    ///
    /// Must return even while interrupts are masked (WFI semantics).
    fn sleep(&mut self);
}

/// Sleep until an interrupt handler moves `ticks` past `start`
///
/// The count is compared with interrupts masked. A tick that arrives between
/// the compare and the sleep stays pending and ends the sleep at once instead
/// of being lost until the following tick.
pub fn sleep_until_tick<I: IdleCore + ?Sized>(core: &mut I, ticks: &AtomicU32, start: u32) {
    loop {
        core.mask();
        if ticks.load(Ordering::Acquire) != start {
            core.unmask();
            return;
        }
        core.sleep();
        core.unmask();
    }
}

/// Poll `done` at most `max_polls` times, returns false on timeout
pub fn spin_until(max_polls: u32, mut done: impl FnMut() -> bool) -> bool {
    (0..max_polls).any(|_| done())
}

/// Exclusive borrow of a reconfigured counter
///
/// Opening a session saves the counter configuration and switches it to
/// the requested tick rate; dropping it restores the saved configuration.
pub struct ClockSession<'a, C: ClockController> {
    clock: &'a mut C,
    saved: TimerState,
}

impl<'a, C: ClockController> ClockSession<'a, C> {
    /// Save the current configuration and start ticking at `rate_hz`
    pub fn open(clock: &'a mut C, rate_hz: u32) -> Self {
        let saved = clock.save();
        clock.configure(rate_hz);
        Self { clock, saved }
    }

    /// Configuration that will be restored on drop
    #[must_use]
    pub const fn saved(&self) -> TimerState {
        self.saved
    }
}

impl<C: ClockController> Deref for ClockSession<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.clock
    }
}

impl<C: ClockController> DerefMut for ClockSession<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.clock
    }
}

impl<C: ClockController> Drop for ClockSession<'_, C> {
    fn drop(&mut self) {
        self.clock.restore(self.saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Registers {
        state: TimerState,
        rate: Option<u32>,
        restores: u32,
    }

    impl ClockController for Registers {
        fn save(&mut self) -> TimerState {
            self.state
        }

        fn configure(&mut self, rate_hz: u32) {
            self.rate = Some(rate_hz);
            self.state = TimerState::new(0x2, 0x7, 0xf, 0x1);
        }

        fn restore(&mut self, state: TimerState) {
            self.rate = None;
            self.state = state;
            self.restores += 1;
        }
    }

    #[test]
    fn session_restores_on_drop() {
        let original = TimerState::new(0x3, 0x3, 0xf9, 0x4);
        let mut regs = Registers {
            state: original,
            ..Registers::default()
        };

        {
            let session = ClockSession::open(&mut regs, 2048);
            assert_eq!(session.saved(), original);
            assert_eq!(session.rate, Some(2048));
        }

        assert_eq!(regs.state, original);
        assert_eq!(regs.rate, None);
        assert_eq!(regs.restores, 1);
    }

    #[test]
    fn state_array_order() {
        let s = TimerState::new(1, 2, 3, 4);
        assert_eq!(s.to_array(), [1, 2, 3, 4]);
    }

    /// Core whose pending interrupt is only serviced on unmask
    struct Core<'a> {
        ticks: &'a AtomicU32,
        masked: bool,
        pending: bool,
        sleeps: u32,
        /// Raise the tick interrupt right after the next mask
        tick_after_mask: bool,
        /// Raise the tick interrupt while sleeping
        tick_in_sleep: bool,
    }

    impl<'a> Core<'a> {
        fn new(ticks: &'a AtomicU32) -> Self {
            Self {
                ticks,
                masked: false,
                pending: false,
                sleeps: 0,
                tick_after_mask: false,
                tick_in_sleep: true,
            }
        }
    }

    impl IdleCore for Core<'_> {
        fn mask(&mut self) {
            self.masked = true;
            if self.tick_after_mask {
                self.tick_after_mask = false;
                self.pending = true;
            }
        }

        fn unmask(&mut self) {
            self.masked = false;
            if self.pending {
                self.pending = false;
                self.ticks.fetch_add(1, Ordering::Release);
            }
        }

        fn sleep(&mut self) {
            assert!(self.masked, "sleep entered with interrupts unmasked");
            self.sleeps += 1;
            if self.tick_in_sleep {
                self.pending = true;
            }
        }
    }

    #[test]
    fn sleep_until_tick_waits_one_tick() {
        let ticks = AtomicU32::new(7);
        let mut core = Core::new(&ticks);

        sleep_until_tick(&mut core, &ticks, 7);
        assert_eq!(ticks.load(Ordering::Relaxed), 8);
        assert_eq!(core.sleeps, 1);
        assert!(!core.masked);
    }

    #[test]
    fn tick_between_check_and_sleep_is_not_lost() {
        let ticks = AtomicU32::new(0);
        let mut core = Core::new(&ticks);
        // Interrupt lands after masking, nothing else would wake the core
        core.tick_after_mask = true;
        core.tick_in_sleep = false;

        sleep_until_tick(&mut core, &ticks, 0);
        assert_eq!(ticks.load(Ordering::Relaxed), 1);
        assert_eq!(core.sleeps, 1);
    }

    #[test]
    fn already_ticked_does_not_sleep() {
        let ticks = AtomicU32::new(3);
        let mut core = Core::new(&ticks);

        sleep_until_tick(&mut core, &ticks, 2);
        assert_eq!(core.sleeps, 0);
        assert!(!core.masked);
    }

    #[test]
    fn spin_until_times_out() {
        let mut polls = 0;
        assert!(!spin_until(100, || {
            polls += 1;
            false
        }));
        assert_eq!(polls, 100);
    }

    #[test]
    fn spin_until_stops_when_done() {
        let mut polls = 0;
        assert!(spin_until(100, || {
            polls += 1;
            polls == 3
        }));
        assert_eq!(polls, 3);
    }
}
