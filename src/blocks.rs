// 2x2 block transform
//
// Each block of component-video pixels collapses to six numbers: the mean
// luminance a, three orthogonal luminance differentials b (vertical),
// c (horizontal), d (diagonal), and the mean chroma pair. The luminance
// part is a 2x2 Hadamard transform; photographic blocks concentrate
// nearly all their energy in a, which is why a gets the wide field later.

use bytemuck::Zeroable;

use crate::colorspace::{CvImage, CvPixel};

// Differentials saturate to this interval before quantization
const DIFF_LIMIT: f32 = 0.3;
const CHROMA_LIMIT: f32 = 0.5;

pub const BLOCK_SIZE: usize = 2;

#[derive(Clone, Copy, Debug, Zeroable)]
pub struct BlockAverage {
  pub a: f32,
  pub b: f32,
  pub c: f32,
  pub d: f32,
  pub pb_avg: f32,
  pub pr_avg: f32,
}

/// Collapse the 2x2 pixel block at block coordinates (block_row,
/// block_col) into its average form.
pub fn block_average(cv: &CvImage, block_row: usize, block_col: usize) -> BlockAverage {
  let i = block_row * BLOCK_SIZE;
  let j = block_col * BLOCK_SIZE;

  // Pixel labels within the block:
  //   0 = top-left, 1 = top-right, 2 = bottom-left, 3 = bottom-right
  let p0 = cv.pixels[i][j];
  let p1 = cv.pixels[i][j + 1];
  let p2 = cv.pixels[i + 1][j];
  let p3 = cv.pixels[i + 1][j + 1];

  let (y0, y1, y2, y3) = (p0.y, p1.y, p2.y, p3.y);

  BlockAverage {
    a: (y3 + y2 + y1 + y0) / 4.0,
    b: ((y3 + y2 - y1 - y0) / 4.0).clamp(-DIFF_LIMIT, DIFF_LIMIT),
    c: ((y3 - y2 + y1 - y0) / 4.0).clamp(-DIFF_LIMIT, DIFF_LIMIT),
    d: ((y3 - y2 - y1 + y0) / 4.0).clamp(-DIFF_LIMIT, DIFF_LIMIT),
    pb_avg: ((p0.pb + p1.pb + p2.pb + p3.pb) / 4.0).clamp(-CHROMA_LIMIT, CHROMA_LIMIT),
    pr_avg: ((p0.pr + p1.pr + p2.pr + p3.pr) / 4.0).clamp(-CHROMA_LIMIT, CHROMA_LIMIT),
  }
}

/// Expand an average back into its four pixels, in the same label order.
/// Every pixel receives the block's mean chroma.
pub fn reconstruct_block(avg: &BlockAverage) -> [CvPixel; 4] {
  let y0 = avg.a - avg.b - avg.c + avg.d;
  let y1 = avg.a - avg.b + avg.c - avg.d;
  let y2 = avg.a + avg.b - avg.c - avg.d;
  let y3 = avg.a + avg.b + avg.c + avg.d;

  // CvPixel::new clamps luminance back into [0, 1]; extreme saturated
  // differentials can push the sum slightly outside
  [
    CvPixel::new(y0, avg.pb_avg, avg.pr_avg),
    CvPixel::new(y1, avg.pb_avg, avg.pr_avg),
    CvPixel::new(y2, avg.pb_avg, avg.pr_avg),
    CvPixel::new(y3, avg.pb_avg, avg.pr_avg),
  ]
}
