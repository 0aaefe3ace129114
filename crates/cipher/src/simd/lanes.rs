use core::ops::{
    Add, AddAssign, BitAnd, BitOr, BitXor, BitXorAssign, Shl, Shr, Sub, SubAssign,
};

/// `L` independent words operated on element-wise.
///
/// Arithmetic wraps. The array layout lets the optimiser lower each operator
/// to packed instructions for the target's native vector width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct Lanes<T, const L: usize>([T; L]);

impl<T: Copy, const L: usize> Lanes<T, L> {
    #[inline]
    #[must_use]
    pub const fn from_array(a: [T; L]) -> Self {
        Self(a)
    }

    #[inline]
    #[must_use]
    pub const fn splat(v: T) -> Self {
        Self([v; L])
    }

    #[inline]
    #[must_use]
    pub fn from_fn(f: impl FnMut(usize) -> T) -> Self {
        Self(core::array::from_fn(f))
    }

    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [T; L] {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn as_array(&self) -> &[T; L] {
        &self.0
    }

    /// Apply `f` to every lane; used for per-lane table lookups.
    #[inline]
    #[must_use]
    pub fn map<U: Copy>(self, f: impl FnMut(T) -> U) -> Lanes<U, L> {
        Lanes(self.0.map(f))
    }
}

impl<T: Copy, const L: usize> From<[T; L]> for Lanes<T, L> {
    #[inline]
    fn from(a: [T; L]) -> Self {
        Self(a)
    }
}

impl<T: Copy, const L: usize> From<Lanes<T, L>> for [T; L] {
    #[inline]
    fn from(v: Lanes<T, L>) -> Self {
        v.0
    }
}

macro_rules! impl_lanes {
    ($($t:ty),*) => {
        $(
            impl<const L: usize> Lanes<$t, L> {
                #[inline]
                #[must_use]
                pub fn rotate_left(self, n: u32) -> Self {
                    self.map(|x| x.rotate_left(n))
                }

                #[inline]
                #[must_use]
                pub fn rotate_right(self, n: u32) -> Self {
                    self.map(|x| x.rotate_right(n))
                }

                /// Rotate each lane left by the matching lane of `n` (mod bit width).
                #[inline]
                #[must_use]
                pub fn rotate_left_var(self, n: Self) -> Self {
                    Self(core::array::from_fn(|i| {
                        self.0[i].rotate_left((n.0[i] % <$t>::BITS as $t) as u32)
                    }))
                }
            }

            impl<const L: usize> Add for Lanes<$t, L> {
                type Output = Self;

                #[inline]
                fn add(self, rhs: Self) -> Self {
                    Self(core::array::from_fn(|i| self.0[i].wrapping_add(rhs.0[i])))
                }
            }

            impl<const L: usize> Sub for Lanes<$t, L> {
                type Output = Self;

                #[inline]
                fn sub(self, rhs: Self) -> Self {
                    Self(core::array::from_fn(|i| self.0[i].wrapping_sub(rhs.0[i])))
                }
            }

            impl<const L: usize> BitXor for Lanes<$t, L> {
                type Output = Self;

                #[inline]
                fn bitxor(self, rhs: Self) -> Self {
                    Self(core::array::from_fn(|i| self.0[i] ^ rhs.0[i]))
                }
            }

            impl<const L: usize> BitAnd for Lanes<$t, L> {
                type Output = Self;

                #[inline]
                fn bitand(self, rhs: Self) -> Self {
                    Self(core::array::from_fn(|i| self.0[i] & rhs.0[i]))
                }
            }

            impl<const L: usize> BitOr for Lanes<$t, L> {
                type Output = Self;

                #[inline]
                fn bitor(self, rhs: Self) -> Self {
                    Self(core::array::from_fn(|i| self.0[i] | rhs.0[i]))
                }
            }

            impl<const L: usize> Shl<u32> for Lanes<$t, L> {
                type Output = Self;

                #[inline]
                fn shl(self, n: u32) -> Self {
                    self.map(|x| x << n)
                }
            }

            impl<const L: usize> Shr<u32> for Lanes<$t, L> {
                type Output = Self;

                #[inline]
                fn shr(self, n: u32) -> Self {
                    self.map(|x| x >> n)
                }
            }

            impl<const L: usize> AddAssign for Lanes<$t, L> {
                #[inline]
                fn add_assign(&mut self, rhs: Self) {
                    *self = *self + rhs;
                }
            }

            impl<const L: usize> SubAssign for Lanes<$t, L> {
                #[inline]
                fn sub_assign(&mut self, rhs: Self) {
                    *self = *self - rhs;
                }
            }

            impl<const L: usize> BitXorAssign for Lanes<$t, L> {
                #[inline]
                fn bitxor_assign(&mut self, rhs: Self) {
                    *self = *self ^ rhs;
                }
            }
        )*
    };
}

impl_lanes!(u32, u64);
