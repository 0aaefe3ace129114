//! Lane-batched execution: a runtime [`LaneWidth`] selects a const-generic
//! kernel that processes `L` blocks per step, with the scalar path covering
//! the tail.

mod lanes;

use core::fmt::Display;

pub use lanes::Lanes;

/// Number of blocks a batched kernel processes per step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LaneWidth {
    L2  = 2,
    L4  = 4,
    #[default]
    L8  = 8,
    L16 = 16,
}

impl LaneWidth {
    pub const ALL: [Self; 4] = [Self::L2, Self::L4, Self::L8, Self::L16];

    #[must_use]
    pub const fn get(self) -> usize {
        self as usize
    }
}

impl Display for LaneWidth {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl TryFrom<usize> for LaneWidth {
    type Error = usize;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::L2),
            4 => Ok(Self::L4),
            8 => Ok(Self::L8),
            16 => Ok(Self::L16),
            other => Err(other),
        }
    }
}

/// Dispatch a generic `fn<const L: usize>(...)`, or a method of that shape,
/// over a runtime lane width.
macro_rules! dispatch_lanes {
    ($width:expr, $recv:ident . $f:ident ( $($arg:expr),* $(,)? )) => {
        match $width {
            $crate::simd::LaneWidth::L2  => $recv.$f::<2>($($arg),*),
            $crate::simd::LaneWidth::L4  => $recv.$f::<4>($($arg),*),
            $crate::simd::LaneWidth::L8  => $recv.$f::<8>($($arg),*),
            $crate::simd::LaneWidth::L16 => $recv.$f::<16>($($arg),*),
        }
    };
    ($width:expr, $($f:ident)::+ ( $($arg:expr),* $(,)? )) => {
        match $width {
            $crate::simd::LaneWidth::L2  => $($f)::+::<2>($($arg),*),
            $crate::simd::LaneWidth::L4  => $($f)::+::<4>($($arg),*),
            $crate::simd::LaneWidth::L8  => $($f)::+::<8>($($arg),*),
            $crate::simd::LaneWidth::L16 => $($f)::+::<16>($($arg),*),
        }
    };
}
pub(crate) use dispatch_lanes;

/// Run `kernel` over every full group of `L` blocks and `scalar` over the
/// remainder.
#[inline]
pub fn for_each_batch<B, const L: usize>(
    blocks: &mut [B], mut kernel: impl FnMut(&mut [B; L]), mut scalar: impl FnMut(&mut B),
) {
    let (chunks, tail) = blocks.as_chunks_mut::<L>();
    for chunk in chunks {
        kernel(chunk);
    }
    for block in tail {
        scalar(block);
    }
}

/// Transpose `L` blocks of `N` words into `N` lane vectors: vector `j` holds
/// word `j` of every block.
#[inline]
#[must_use]
pub fn gather<T: Copy, const N: usize, const L: usize>(
    blocks: &[[T; N]; L],
) -> [Lanes<T, L>; N] {
    core::array::from_fn(|j| Lanes::from_fn(|l| blocks[l][j]))
}

/// Inverse of [`gather`].
#[inline]
pub fn scatter<T: Copy, const N: usize, const L: usize>(
    words: &[Lanes<T, L>; N], blocks: &mut [[T; N]; L],
) {
    for (j, w) in words.iter().enumerate() {
        for (block, &v) in blocks.iter_mut().zip(w.as_array()) {
            block[j] = v;
        }
    }
}
