// Quantization of block averages, and the 32-bit word layout
//
// Field layout of a code word, most significant field first:
//
//   qa:6 | qb:6 | qc:6 | qd:6 | qpb:4 | qpr:4
//
// at least-significant-bit offsets 26, 20, 14, 8, 4, 0. The six fields
// tile bits [0, 32) exactly; the upper half of the 64-bit packing
// register stays zero.

use bytemuck::Zeroable;

use crate::bitpack;
use crate::blocks::BlockAverage;
use crate::chroma;

const LSB_A: u32 = 26;
const LSB_B: u32 = 20;
const LSB_C: u32 = 14;
const LSB_D: u32 = 8;
const LSB_PB: u32 = 4;
const LSB_PR: u32 = 0;

const LUMA_WIDTH: u32 = 6;
const CHROMA_WIDTH: u32 = 4;

// The average luminance index fills the unsigned 6-bit field; the
// differential indices map [-0.3, 0.3] onto the 6-bit signed range.
const A_FACTOR: f32 = 63.0;
const DIFF_FACTOR: f32 = 50.0;

const QA_MAX: f32 = 63.0;
const DIFF_MAX: f32 = 15.0;
const CHROMA_INDEX_MAX: u32 = 8;

// Integer indices for one block. Values are saturated into range at
// production; the bitpack preconditions re-check them on every write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroable)]
pub struct QuantizedBlock {
  pub qa: u32,
  pub qb: i32,
  pub qc: i32,
  pub qd: i32,
  pub qpb: u32,
  pub qpr: u32,
}

fn quantize_diff(diff: f32) -> i32 {
  (diff * DIFF_FACTOR).round().clamp(-DIFF_MAX, DIFF_MAX) as i32
}

/// Quantize a block average to integer indices.
pub fn quantize(avg: &BlockAverage) -> QuantizedBlock {
  QuantizedBlock {
    qa: (avg.a * A_FACTOR).round().clamp(0.0, QA_MAX) as u32,
    qb: quantize_diff(avg.b),
    qc: quantize_diff(avg.c),
    qd: quantize_diff(avg.d),
    // Only every other chroma level is kept: halve here, double on decode
    qpb: (chroma::index_of_chroma(avg.pb_avg) / 2).min(CHROMA_INDEX_MAX),
    qpr: (chroma::index_of_chroma(avg.pr_avg) / 2).min(CHROMA_INDEX_MAX),
  }
}

/// Recover the (approximate) block average from its indices.
pub fn dequantize(quantized: &QuantizedBlock) -> BlockAverage {
  BlockAverage {
    a: quantized.qa as f32 / A_FACTOR,
    b: quantized.qb as f32 / DIFF_FACTOR,
    c: quantized.qc as f32 / DIFF_FACTOR,
    d: quantized.qd as f32 / DIFF_FACTOR,
    pb_avg: chroma::chroma_of_index(quantized.qpb * 2),
    pr_avg: chroma::chroma_of_index(quantized.qpr * 2),
  }
}

/// Pack the six indices into one code word.
pub fn pack(quantized: &QuantizedBlock) -> u32 {
  let mut word: u64 = 0;
  word = bitpack::new_u(word, LUMA_WIDTH, LSB_A, quantized.qa as u64);
  word = bitpack::new_s(word, LUMA_WIDTH, LSB_B, quantized.qb as i64);
  word = bitpack::new_s(word, LUMA_WIDTH, LSB_C, quantized.qc as i64);
  word = bitpack::new_s(word, LUMA_WIDTH, LSB_D, quantized.qd as i64);
  word = bitpack::new_u(word, CHROMA_WIDTH, LSB_PB, quantized.qpb as u64);
  word = bitpack::new_u(word, CHROMA_WIDTH, LSB_PR, quantized.qpr as u64);

  debug_assert_eq!(bitpack::get_u(word, 32, 32), 0);
  word as u32
}

/// Unpack a code word back into its six indices.
pub fn unpack(word: u32) -> QuantizedBlock {
  let word = word as u64;
  QuantizedBlock {
    qa: bitpack::get_u(word, LUMA_WIDTH, LSB_A) as u32,
    qb: bitpack::get_s(word, LUMA_WIDTH, LSB_B) as i32,
    qc: bitpack::get_s(word, LUMA_WIDTH, LSB_C) as i32,
    qd: bitpack::get_s(word, LUMA_WIDTH, LSB_D) as i32,
    qpb: bitpack::get_u(word, CHROMA_WIDTH, LSB_PB) as u32,
    qpr: bitpack::get_u(word, CHROMA_WIDTH, LSB_PR) as u32,
  }
}
