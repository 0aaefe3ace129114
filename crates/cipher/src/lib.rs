//! `ks-cipher`: keyed block transforms for the `ks-rs` keystream engine.
//!
//! `no_std`, zero-allocation. Every transform exposes a scalar
//! [`BlockTransform::encrypt`] and a lane-batched
//! [`BlockTransform::encrypt_batch`] built on the portable lane vectors in
//! [`simd`]. Substitution tables, rotation schedules and round constants are
//! `const` data owned by the transform module that uses them.
//!
//! | Transform | Block | Key | Rounds |
//! |-----------|-------|-----|--------|
//! | [`Aes128`] | `[u64; 2]` | `[u8; 16]` | 10 |
//! | [`Speck128`] | `[u64; 2]` | `[u64; 2]` | `R` (32 / 16) |
//! | [`Threefry4x64`] | `[u64; 4]` | `[u64; 4]` | `R` (20 / 72) |
//! | [`Magma`] | `[u64; 1]` | `[u32; 8]` | 32 |
//! | [`Xtea`] | `[u64; 1]` | `[u32; 4]` | 32 cycles |
//! | [`Xtea2`] | `[u32; 4]` | `[u32; 4]` | 32 |

#![no_std]
#![deny(unsafe_code)]
#![allow(clippy::many_single_char_names, clippy::cast_possible_truncation)]

mod aes128;
mod block;
mod magma;
pub mod simd;
mod speck128;
mod threefry;
mod transform;
mod xtea;
mod xtea2;

pub use aes128::Aes128;
pub use block::{InvalidKeyLength, KeyMaterial, Word, WordBlock};
pub use magma::Magma;
pub use simd::LaneWidth;
pub use speck128::{Speck128, Speck128Full, Speck128R16};
pub use threefry::{Threefry4x64, Threefry4x64R20, Threefry4x64R72};
pub use transform::{BlockTransform, KatVector, KnownAnswers, WordOf};
pub use xtea::Xtea;
pub use xtea2::Xtea2;
