//! Scoped masking of the stepper interrupt.

use core::ops::{Deref, DerefMut};

use super::StepperTimer;

/// Masks the stepper interrupt while alive.
///
/// Entering from a context where the interrupt is already masked (the
/// interrupt handler itself) leaves it masked on drop, so sections nest.
pub struct CriticalSection<'a, T: StepperTimer> {
    timer: &'a mut T,
    restore: bool,
}

impl<'a, T: StepperTimer> CriticalSection<'a, T> {
    /// Mask the interrupt until the guard drops.
    pub fn enter(timer: &'a mut T) -> Self {
        let restore = timer.interrupt_enabled();
        timer.disable_interrupt();
        Self { timer, restore }
    }
}

impl<T: StepperTimer> Deref for CriticalSection<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.timer
    }
}

impl<T: StepperTimer> DerefMut for CriticalSection<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.timer
    }
}

impl<T: StepperTimer> Drop for CriticalSection<'_, T> {
    fn drop(&mut self) {
        if self.restore {
            self.timer.enable_interrupt();
        }
    }
}
