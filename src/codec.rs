// Pipeline glue: trim, the compress/decompress drivers, and the
// compressed stream format
//
// The stream is a text header followed by one big-endian 32-bit code word
// per 2x2 block, in row-major block order:
//
//   COMP40 Compressed image format 2\n
//   <width> <height>\n
//   <4 * (width/2) * (height/2) payload bytes>
//
// The header carries the trimmed pixel dimensions, so the payload length
// is implied exactly.

use std::io::prelude::*;

use byteorder::{ReadBytesExt, WriteBytesExt, BigEndian};
use log::debug;

use crate::array2d::Array2D;
use crate::blocks::{self, BLOCK_SIZE};
use crate::colorspace::{self, CvImage};
use crate::error::CodecError;
use crate::ppm::{self, RgbImage};
use crate::quant;

const MAGIC: &str = "COMP40 Compressed image format 2";
const WORD_BYTES: usize = 4;

/// Drop the rightmost column and/or bottommost row when the corresponding
/// dimension is odd. An already-even image passes through untouched.
pub fn trim(img: RgbImage) -> RgbImage {
  let mut width = img.width;
  let mut height = img.height;
  if width % 2 != 0 {
    width -= 1;
  }
  if height % 2 != 0 {
    height -= 1;
  }

  if width == img.width && height == img.height {
    return img;
  }

  debug!("trimming {}x{} to {}x{}", img.width, img.height, width, height);
  let pixels = Array2D::new_with(height, width, |i, j| img.pixels[i][j]);
  RgbImage {
    width: width,
    height: height,
    denominator: img.denominator,
    pixels: pixels,
  }
}

// Run the forward pipeline from an even-dimensioned image to the word
// grid. Each stage fills its own grid; the previous stage's buffer is
// dropped as soon as the next one is built.
fn image_to_words(img: &RgbImage) -> Array2D<u32> {
  let block_rows = img.height / BLOCK_SIZE;
  let block_cols = img.width / BLOCK_SIZE;

  let cv = colorspace::rgb_to_comp_vid(img);
  let averages = Array2D::new_with(block_rows, block_cols,
      |i, j| blocks::block_average(&cv, i, j));
  drop(cv);

  let quantized = Array2D::new_with(block_rows, block_cols,
      |i, j| quant::quantize(&averages[i][j]));
  drop(averages);

  Array2D::new_with(block_rows, block_cols, |i, j| quant::pack(&quantized[i][j]))
}

// Run the reverse pipeline from a word grid to an RGB image with
// denominator 255.
fn words_to_image(words: &Array2D<u32>) -> RgbImage {
  let quantized = Array2D::new_with(words.rows(), words.cols(),
      |i, j| quant::unpack(words[i][j]));
  let averages = Array2D::new_with(words.rows(), words.cols(),
      |i, j| quant::dequantize(&quantized[i][j]));
  drop(quantized);

  let mut cv = CvImage::new(words.cols() * BLOCK_SIZE, words.rows() * BLOCK_SIZE);
  for i in 0..averages.rows() {
    for j in 0..averages.cols() {
      let pixels = blocks::reconstruct_block(&averages[i][j]);
      cv.pixels[BLOCK_SIZE * i][BLOCK_SIZE * j] = pixels[0];
      cv.pixels[BLOCK_SIZE * i][BLOCK_SIZE * j + 1] = pixels[1];
      cv.pixels[BLOCK_SIZE * i + 1][BLOCK_SIZE * j] = pixels[2];
      cv.pixels[BLOCK_SIZE * i + 1][BLOCK_SIZE * j + 1] = pixels[3];
    }
  }
  drop(averages);

  colorspace::comp_vid_to_rgb(&cv)
}

fn write_compressed<W: Write>(output: &mut W, words: &Array2D<u32>,
                              width: usize, height: usize) -> Result<(), CodecError> {
  write!(output, "{}\n{} {}\n", MAGIC, width, height)?;

  for i in 0..words.rows() {
    for j in 0..words.cols() {
      output.write_u32::<BigEndian>(words[i][j])?;
    }
  }

  debug!("wrote {} code words for a {}x{} image",
         words.rows() * words.cols(), width, height);
  Ok(())
}

fn read_header_line<R: Read>(input: &mut R) -> Result<String, CodecError> {
  let mut line = Vec::new();
  loop {
    let byte = input.read_u8()
        .map_err(|_| CodecError::InvalidHeader("header ends early".to_string()))?;
    if byte == b'\n' {
      break;
    }
    line.push(byte);
    if line.len() > 128 {
      return Err(CodecError::InvalidHeader("header line too long".to_string()));
    }
  }
  String::from_utf8(line)
      .map_err(|_| CodecError::InvalidHeader("header is not ASCII".to_string()))
}

fn read_compressed<R: Read>(input: &mut R) -> Result<Array2D<u32>, CodecError> {
  let magic = read_header_line(input)?;
  if magic != MAGIC {
    return Err(CodecError::InvalidHeader(
        format!("magic line {:?} does not match {:?}", magic, MAGIC)));
  }

  let dimensions = read_header_line(input)?;
  let mut fields = dimensions.split_ascii_whitespace();
  let width = fields.next().and_then(|t| t.parse::<usize>().ok());
  let height = fields.next().and_then(|t| t.parse::<usize>().ok());
  let (width, height) = match (width, height, fields.next()) {
    (Some(w), Some(h), None) => (w, h),
    _ => {
      return Err(CodecError::InvalidHeader(
          format!("dimension line {:?} is not \"<width> <height>\"", dimensions)));
    }
  };
  if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
    return Err(CodecError::InvalidHeader(
        format!("dimensions {}x{} are not positive and even", width, height)));
  }

  let block_rows = height / BLOCK_SIZE;
  let block_cols = width / BLOCK_SIZE;
  let expected = block_rows * block_cols * WORD_BYTES;
  let mut raw = Vec::with_capacity(expected);
  input.take(expected as u64).read_to_end(&mut raw)?;
  if raw.len() < expected {
    return Err(CodecError::TruncatedStream { expected: expected, actual: raw.len() });
  }

  debug!("read {} code words for a {}x{} image", block_rows * block_cols, width, height);

  Ok(Array2D::new_with(block_rows, block_cols, |i, j| {
    let base = (i * block_cols + j) * WORD_BYTES;
    u32::from_be_bytes([raw[base], raw[base + 1], raw[base + 2], raw[base + 3]])
  }))
}

/// Compress a PPM read from `input` into the packed stream on `output`.
pub fn compress<R: Read, W: Write>(input: &mut R, output: &mut W) -> Result<(), CodecError> {
  let img = ppm::read(input)?;
  let img = trim(img);
  if img.width == 0 || img.height == 0 {
    return Err(CodecError::InvalidPpm(
        "image has no complete 2x2 block after trimming".to_string()));
  }

  let words = image_to_words(&img);
  write_compressed(output, &words, img.width, img.height)
}

/// Decompress a packed stream from `input` into a PPM on `output`.
pub fn decompress<R: Read, W: Write>(input: &mut R, output: &mut W) -> Result<(), CodecError> {
  let words = read_compressed(input)?;
  let img = words_to_image(&words);
  ppm::write(output, &img)
}

/// Compress and immediately decompress, writing the re-decoded PPM.
/// Exercises the full pipeline including the byte-stream format.
pub fn round_trip<R: Read, W: Write>(input: &mut R, output: &mut W) -> Result<(), CodecError> {
  let mut compressed = Vec::new();
  compress(input, &mut compressed)?;
  decompress(&mut compressed.as_slice(), output)
}
