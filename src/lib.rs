//! Lossy PPM compression at ~4:1: each disjoint 2x2 pixel block becomes
//! one 32-bit code word via component-video conversion, a 2x2 luminance
//! transform, quantization and bit packing.

pub mod array2d;
pub mod bitpack;
pub mod blocks;
pub mod chroma;
pub mod codec;
pub mod colorspace;
pub mod error;
pub mod ppm;
pub mod quant;
