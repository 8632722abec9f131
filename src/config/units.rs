//! Unit types for physical quantities.
//!
//! Speeds and accelerations are wrapped to prevent unit confusion at compile
//! time. "Units" are the machine's length unit (usually millimetres).

use serde::Deserialize;

use crate::error::ConfigError;

/// Declares a rate newtype read transparently from a TOML float.
macro_rules! rate {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub f32);

        impl $name {
            /// Raw value.
            #[inline]
            pub const fn value(self) -> f32 {
                self.0
            }
        }
    };
}

rate! {
    /// Speed in units per second. Also used for jerk limits, which bound an
    /// instantaneous speed change.
    UnitsPerSec
}

rate! {
    /// Acceleration in units per second squared.
    UnitsPerSecSquared
}

/// Target number of steps on the busiest axis per sub-movement window.
///
/// Validated at construction: a window stores per-axis distances in 8 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingSteps(u8);

impl ProcessingSteps {
    /// The default window target, one full 3-bit window.
    pub const DEFAULT: Self = Self(7);

    /// Create a new ProcessingSteps value with validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidProcessingSteps` for zero.
    pub fn new(value: u8) -> Result<Self, ConfigError> {
        if value == 0 {
            Err(ConfigError::InvalidProcessingSteps(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for ProcessingSteps {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for ProcessingSteps {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for ProcessingSteps {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use core::fmt::Write;
        let value = u8::deserialize(deserializer)?;
        ProcessingSteps::new(value).map_err(|e| {
            let mut buf = heapless::String::<128>::new();
            let _ = write!(buf, "{}", e);
            serde::de::Error::custom(buf.as_str())
        })
    }
}
