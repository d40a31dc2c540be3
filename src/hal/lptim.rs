//! LPTIM1 Pulse Clock (STM32G474)
//!
//! Backs [`ClockController`] and [`TickWaiter`] with LPTIM1 clocked from
//! the 32 768 Hz LSE crystal. The auto-reload value divides the crystal
//! down to the tick rate (15 → /16 → 2048 Hz) and the auto-reload match
//! interrupt wakes the core from WFI once per tick.
//!
//! The LSE must already be running (`rcc.ls = LsConfig::default_lse()`).
//! While a session is open LPTIM1 should be the only enabled interrupt
//! source; other interrupts only cost an extra loop through
//! [`LptimClock::wait_for_tick`] but delay the next edge by their runtime.
//!
//! Nothing else in the firmware uses LPTIM1 (`embassy-time` runs on TIM2),
//! so the saved state is normally "bus clock off, counter stopped". Giving
//! it back after every burst still matters: the counter stops and the core
//! is not woken 2048 times a second during the inter-burst pause or between
//! transmissions.

#![allow(unsafe_code)]

use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m::asm;
use embassy_stm32::interrupt::{self, InterruptExt};
use embassy_stm32::pac;

use super::timer::{sleep_until_tick, spin_until, ClockController, IdleCore, TickWaiter, TimerState};
use crate::config::REFERENCE_CLOCK_HZ;

/// RCC_CCIPR.LPTIM1SEL field
const LPTIM1SEL_MASK: u32 = 0b11 << 18;
/// LPTIM1SEL value for LSE
const LPTIM1SEL_LSE: u32 = 0b11 << 18;
/// RCC_APB1ENR1.LPTIM1EN
const APB1ENR1_LPTIM1EN: u32 = 1 << 31;

/// ARROK takes a few LSE cycles (~100 us); give up well after that
const ARROK_POLLS: u32 = 200_000;

const CR_ENABLE: u32 = 1 << 0;
const CR_CNTSTRT: u32 = 1 << 2;
const IER_ARRMIE: u32 = 1 << 1;
const ISR_ARROK: u32 = 1 << 4;
const ICR_ARRMCF: u32 = 1 << 1;
const ICR_ARROKCF: u32 = 1 << 4;

/// Auto-reload matches since boot
static TICKS: AtomicU32 = AtomicU32::new(0);

#[cortex_m_rt::interrupt]
fn LPTIM1() {
    pac::LPTIM1.icr().write(|w| w.0 = ICR_ARRMCF);
    TICKS.fetch_add(1, Ordering::Release);
}

/// Pulse clock on LPTIM1
pub struct LptimClock {
    /// Bus clock was enabled when saved
    bus_was_enabled: bool,
    /// Counter was running when saved
    was_running: bool,
    /// NVIC line was enabled when saved
    irq_was_enabled: bool,
    /// Idle sleep armed by `configure`
    sleep_enabled: bool,
}

impl LptimClock {
    /// Create the clock (does not touch the hardware)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bus_was_enabled: false,
            was_running: false,
            irq_was_enabled: false,
            sleep_enabled: false,
        }
    }

    /// Turn the LPTIM1 bus clock on or off
    fn set_bus_clock(on: bool) {
        pac::RCC.apb1enr1().modify(|w| {
            if on {
                w.0 |= APB1ENR1_LPTIM1EN;
            } else {
                w.0 &= !APB1ENR1_LPTIM1EN;
            }
        });
        // Read back so the enable has landed before the next register access
        let _ = pac::RCC.apb1enr1().read();
    }

    /// Write ARR; LPTIM only accepts it while enabled
    ///
    /// Returns false if the write was never acknowledged (no kernel clock).
    fn write_arr(value: u32) -> bool {
        pac::LPTIM1.cr().write(|w| w.0 = CR_ENABLE);
        pac::LPTIM1.arr().write(|w| w.0 = value);
        let acked = spin_until(ARROK_POLLS, || {
            pac::LPTIM1.isr().read().0 & ISR_ARROK != 0
        });
        pac::LPTIM1.icr().write(|w| w.0 = ICR_ARROKCF);
        acked
    }

    /// Ticks counted so far
    #[must_use]
    pub fn ticks() -> u32 {
        TICKS.load(Ordering::Relaxed)
    }
}

impl Default for LptimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockController for LptimClock {
    fn save(&mut self) -> TimerState {
        self.bus_was_enabled = pac::RCC.apb1enr1().read().0 & APB1ENR1_LPTIM1EN != 0;
        self.irq_was_enabled = interrupt::LPTIM1.is_enabled();
        if !self.bus_was_enabled {
            // Registers of an unclocked peripheral read as zero
            self.was_running = false;
            return TimerState::new(0, pac::RCC.ccipr().read().0 & LPTIM1SEL_MASK, 0, 0);
        }

        self.was_running = pac::LPTIM1.cr().read().0 & CR_ENABLE != 0;

        TimerState::new(
            pac::LPTIM1.cfgr().read().0,
            pac::RCC.ccipr().read().0 & LPTIM1SEL_MASK,
            pac::LPTIM1.arr().read().0,
            pac::LPTIM1.ier().read().0,
        )
    }

    fn configure(&mut self, rate_hz: u32) {
        let reload = (REFERENCE_CLOCK_HZ / rate_hz).saturating_sub(1);

        let acked = critical_section::with(|_| {
            Self::set_bus_clock(true);
            pac::LPTIM1.cr().write(|w| w.0 = 0);
            pac::RCC
                .ccipr()
                .modify(|w| w.0 = (w.0 & !LPTIM1SEL_MASK) | LPTIM1SEL_LSE);
            // Internal (kernel) clock, no prescaler, software start
            pac::LPTIM1.cfgr().write(|w| w.0 = 0);
            pac::LPTIM1.ier().write(|w| w.0 = IER_ARRMIE);
            if !Self::write_arr(reload) {
                pac::LPTIM1.cr().write(|w| w.0 = 0);
                return false;
            }
            pac::LPTIM1.cr().write(|w| w.0 = CR_ENABLE | CR_CNTSTRT);

            interrupt::LPTIM1.unpend();
            unsafe { interrupt::LPTIM1.enable() };
            true
        });

        if !acked {
            // Sleeping now would never wake up; pulses go out unpaced instead
            defmt::warn!("LPTIM1 did not accept ARR, is the LSE running?");
            self.sleep_enabled = false;
            return;
        }

        // Plain sleep, not deep sleep: LPTIM and the GPIO block stay clocked
        let mut core = unsafe { cortex_m::Peripherals::steal() };
        core.SCB.clear_sleepdeep();
        self.sleep_enabled = true;

        defmt::trace!("LPTIM1 ticking at {} Hz (ARR={})", rate_hz, reload);
    }

    fn restore(&mut self, state: TimerState) {
        self.sleep_enabled = false;

        critical_section::with(|_| {
            if !self.irq_was_enabled {
                interrupt::LPTIM1.disable();
            }

            pac::LPTIM1.cr().write(|w| w.0 = 0);
            pac::RCC
                .ccipr()
                .modify(|w| w.0 = (w.0 & !LPTIM1SEL_MASK) | (state.clock_select & LPTIM1SEL_MASK));

            if self.bus_was_enabled {
                pac::LPTIM1.cfgr().write(|w| w.0 = state.control);
                pac::LPTIM1.ier().write(|w| w.0 = state.interrupt_mask);
                if !Self::write_arr(state.compare) {
                    defmt::warn!("LPTIM1 ARR restore not acknowledged");
                }

                let cr = if self.was_running {
                    CR_ENABLE | CR_CNTSTRT
                } else {
                    0
                };
                pac::LPTIM1.cr().write(|w| w.0 = cr);
            } else {
                pac::LPTIM1.ier().write(|w| w.0 = 0);
            }

            pac::LPTIM1.icr().write(|w| w.0 = ICR_ARRMCF);
            interrupt::LPTIM1.unpend();

            if !self.bus_was_enabled {
                Self::set_bus_clock(false);
            }
        });
    }
}

/// PRIMASK and WFI of the Cortex-M core
struct CortexIdle;

impl IdleCore for CortexIdle {
    fn mask(&mut self) {
        cortex_m::interrupt::disable();
    }

    fn unmask(&mut self) {
        unsafe { cortex_m::interrupt::enable() };
    }

    fn sleep(&mut self) {
        asm::wfi();
    }
}

impl TickWaiter for LptimClock {
    fn wait_for_tick(&mut self) {
        if !self.sleep_enabled {
            return;
        }

        let start = TICKS.load(Ordering::Acquire);
        sleep_until_tick(&mut CortexIdle, &TICKS, start);
    }
}

/// Transmitter wired to the STM32 backends
pub type Os21Transmitter<'d> = crate::radio::transmit::PrecisionTransmitter<
    embassy_stm32::gpio::Output<'d>,
    LptimClock,
    embassy_time::Delay,
>;
