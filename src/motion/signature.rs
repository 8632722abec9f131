//! Axis bit signatures and the per-window step pattern encoder.
//!
//! A sub-movement asks every axis for at most 255 steps in one window. The
//! encoder splits the distances into their binary digits: the mask of axes
//! whose bit `k` is set must pulse `2^k` times. Interleaving the masks
//! highest weight first, with the mask for pulse `i` chosen by the number of
//! trailing ones of `i`, spreads each axis's pulses evenly over the window
//! and lands exactly on the requested distances when the window ends.

use core::ops::{BitAnd, BitOr, BitOrAssign, BitXor, Not};

/// Number of pulses in a window, indexed by encoder depth.
pub const PULSE_COUNTS: [u16; 9] = [0, 1, 3, 7, 15, 31, 63, 127, 255];

/// Deepest window the encoder produces (8-bit distances).
pub const MAX_DEPTH: usize = 8;

/// One bit per axis.
///
/// Used for step masks (axis pulses), direction masks (axis moves toward
/// negative positions) and tool sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Signature(u32);

impl Signature {
    /// No axis.
    pub const EMPTY: Self = Self(0);

    /// Maximum number of axes a signature can address.
    pub const CAPACITY: usize = 32;

    /// Build from raw bits.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Signature of a single axis, empty beyond [`CAPACITY`](Self::CAPACITY).
    #[inline]
    pub const fn axis(index: usize) -> Self {
        if index < Self::CAPACITY {
            Self(1 << index)
        } else {
            Self::EMPTY
        }
    }

    /// Signature with the first `count` axes set.
    #[inline]
    pub const fn first(count: usize) -> Self {
        if count >= Self::CAPACITY {
            Self(u32::MAX)
        } else {
            Self((1 << count) - 1)
        }
    }

    /// Raw bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Check whether no axis is set.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check whether an axis is set.
    #[inline]
    pub const fn contains(self, index: usize) -> bool {
        index < Self::CAPACITY && self.0 & (1 << index) != 0
    }

    /// Set or clear an axis. Indices beyond the capacity are ignored.
    #[inline]
    pub fn set(&mut self, index: usize, value: bool) {
        if index >= Self::CAPACITY {
            return;
        }
        if value {
            self.0 |= 1 << index;
        } else {
            self.0 &= !(1 << index);
        }
    }

    /// Number of axes set.
    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Indices of the axes set, lowest first.
    pub fn axes(self) -> impl Iterator<Item = usize> {
        let mut bits = self.0;
        core::iter::from_fn(move || {
            if bits == 0 {
                None
            } else {
                let index = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(index)
            }
        })
    }
}

impl BitOr for Signature {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Signature {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Signature {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitXor for Signature {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        Self(self.0 ^ rhs.0)
    }
}

impl Not for Signature {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

/// The ordered step masks of one sub-movement window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepPattern {
    /// Step masks, highest weight first.
    signatures: [Signature; MAX_DEPTH],
    depth: u8,
    direction: Signature,
}

impl StepPattern {
    /// The pattern of a window where nothing moves.
    pub const EMPTY: Self = Self {
        signatures: [Signature::EMPTY; MAX_DEPTH],
        depth: 0,
        direction: Signature::EMPTY,
    };

    /// Encode per-axis distances of one window.
    ///
    /// `direction` is carried along so the window can latch it before its
    /// first pulse. A zero vector encodes to an empty pattern.
    pub fn encode<const N: usize>(distances: &[u8; N], direction: Signature) -> Self {
        let mut remaining = *distances;
        let mut lsb_first = [Signature::EMPTY; MAX_DEPTH];
        let mut depth = 0;

        while remaining.iter().any(|&d| d != 0) {
            let mut mask = Signature::EMPTY;
            for (axis, d) in remaining.iter_mut().enumerate() {
                if *d & 1 != 0 {
                    mask.set(axis, true);
                }
                *d >>= 1;
            }
            lsb_first[depth] = mask;
            depth += 1;
        }

        let mut signatures = [Signature::EMPTY; MAX_DEPTH];
        for (slot, mask) in signatures.iter_mut().zip(lsb_first[..depth].iter().rev()) {
            *slot = *mask;
        }

        Self {
            signatures,
            depth: depth as u8,
            direction,
        }
    }

    /// Number of encoder iterations.
    #[inline]
    pub const fn depth(&self) -> u8 {
        self.depth
    }

    /// Number of pulses the window emits, `2^depth - 1`.
    #[inline]
    pub fn pulse_count(&self) -> u16 {
        PULSE_COUNTS[usize::from(self.depth)]
    }

    /// Check whether the window emits nothing.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.depth == 0
    }

    /// Direction mask to latch before the window.
    #[inline]
    pub const fn direction(&self) -> Signature {
        self.direction
    }

    /// Step masks, highest weight first.
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures[..usize::from(self.depth)]
    }

    /// Step mask for a pulse index.
    ///
    /// Pulses run from `pulse_count() - 1` down to 0.
    #[inline]
    pub fn signature_for_pulse(&self, index: u16) -> Signature {
        let weight = index.trailing_ones() as usize;
        self.signatures
            .get(weight)
            .copied()
            .unwrap_or(Signature::EMPTY)
    }

    /// Step masks in emission order.
    pub fn pulses(&self) -> impl Iterator<Item = Signature> + '_ {
        (0..self.pulse_count())
            .rev()
            .map(move |i| self.signature_for_pulse(i))
    }
}
