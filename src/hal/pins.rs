//! STEP/DIR driver on `embedded-hal` output pins.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::AxisTable;
use crate::error::DriverError;
use crate::motion::Signature;

use super::StepperDriver;

/// Default STEP pulse width in nanoseconds.
pub const DEFAULT_PULSE_WIDTH_NS: u32 = 2_000;

/// Default time given to drivers to latch a new direction.
pub const DEFAULT_DIRECTION_SETTLE_NS: u32 = 1_000;

/// Stepper driver for `N` axes wired to STEP and DIR pins.
///
/// Generic over:
/// - `STEP`: STEP pin type (must implement `OutputPin`)
/// - `DIR`: DIR pin type (must implement `OutputPin`)
/// - `DELAY`: Delay provider for pulse width and direction settle
pub struct PinStepperDriver<STEP, DIR, DELAY, const N: usize>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    step_pins: [STEP; N],
    dir_pins: [DIR; N],
    delay: DELAY,

    /// Axes whose DIR pin logic is inverted.
    inverted: Signature,

    /// Directions currently on the DIR pins (cached to avoid unnecessary pin writes).
    latched: Option<Signature>,

    pulse_width_ns: u32,
    settle_ns: u32,
}

impl<STEP, DIR, DELAY, const N: usize> PinStepperDriver<STEP, DIR, DELAY, N>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    /// Create a driver with default timings and no inversion.
    pub fn new(step_pins: [STEP; N], dir_pins: [DIR; N], delay: DELAY) -> Self {
        Self {
            step_pins,
            dir_pins,
            delay,
            inverted: Signature::EMPTY,
            latched: None,
            pulse_width_ns: DEFAULT_PULSE_WIDTH_NS,
            settle_ns: DEFAULT_DIRECTION_SETTLE_NS,
        }
    }

    /// Take the direction inversion of every axis from the axis table.
    pub fn with_axis_table(mut self, axes: &AxisTable<N>) -> Self {
        let mut inverted = Signature::EMPTY;
        for (i, axis) in axes.iter().enumerate() {
            inverted.set(i, axis.invert_direction);
        }
        self.inverted = inverted;
        self
    }

    /// Override the STEP pulse width and the direction settle time.
    pub fn with_timings(mut self, pulse_width_ns: u32, settle_ns: u32) -> Self {
        self.pulse_width_ns = pulse_width_ns;
        self.settle_ns = settle_ns;
        self
    }

    /// Directions currently latched on the DIR pins.
    pub fn latched_directions(&self) -> Option<Signature> {
        self.latched
    }

    /// Release the pins and the delay.
    pub fn release(self) -> ([STEP; N], [DIR; N], DELAY) {
        (self.step_pins, self.dir_pins, self.delay)
    }
}

impl<STEP, DIR, DELAY, const N: usize> StepperDriver for PinStepperDriver<STEP, DIR, DELAY, N>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    fn set_directions(&mut self, negative: Signature) -> Result<(), DriverError> {
        let changed = match self.latched {
            Some(previous) => previous ^ negative,
            None => Signature::first(N),
        };

        if changed.is_empty() {
            return Ok(());
        }

        for axis in changed.axes().filter(|&a| a < N) {
            // High moves toward positive positions unless inverted
            let pin_high = negative.contains(axis) == self.inverted.contains(axis);
            let pin = &mut self.dir_pins[axis];
            if pin_high {
                pin.set_high().map_err(|_| DriverError::DirectionPin(axis as u8))?;
            } else {
                pin.set_low().map_err(|_| DriverError::DirectionPin(axis as u8))?;
            }
        }

        self.latched = Some(negative);
        self.delay.delay_ns(self.settle_ns);
        Ok(())
    }

    fn step(&mut self, axes: Signature) -> Result<(), DriverError> {
        if axes.is_empty() {
            return Ok(());
        }

        for axis in axes.axes().filter(|&a| a < N) {
            self.step_pins[axis]
                .set_high()
                .map_err(|_| DriverError::StepPin(axis as u8))?;
        }

        self.delay.delay_ns(self.pulse_width_ns);

        for axis in axes.axes().filter(|&a| a < N) {
            self.step_pins[axis]
                .set_low()
                .map_err(|_| DriverError::StepPin(axis as u8))?;
        }

        Ok(())
    }
}
