// Binary PPM (P6) reading and writing
//
// The reader tolerates the usual header freedom: any run of whitespace
// between tokens and '#' comments through end of line. Samples are one
// byte each when the declared maxval fits in a byte, two bytes big-endian
// otherwise. The writer emits the minimal conformant header.

use std::io::prelude::*;

use bytemuck::Zeroable;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::debug;

use crate::array2d::Array2D;
use crate::error::CodecError;

const PPM_MAGIC: &[u8; 2] = b"P6";
const MAX_DENOMINATOR: u32 = 65535;

// One RGB sample triple, in [0, denominator]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroable)]
pub struct Rgb {
  pub red: u16,
  pub green: u16,
  pub blue: u16,
}

// A decoded pixmap. Pixels are indexed [row][col].
pub struct RgbImage {
  pub width: usize,
  pub height: usize,
  pub denominator: u16,
  pub pixels: Array2D<Rgb>,
}

fn read_header_byte<R: Read>(input: &mut R) -> Result<u8, CodecError> {
  input.read_u8().map_err(|_| CodecError::InvalidPpm("header ends early".to_string()))
}

fn is_ppm_whitespace(byte: u8) -> bool {
  matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}

// Read one decimal header field, skipping whitespace and comments before
// it. The byte terminating the digit run must be whitespace; after the
// maxval field that byte is the single separator before the raw samples.
fn read_header_value<R: Read>(input: &mut R, what: &str) -> Result<u32, CodecError> {
  let mut byte = read_header_byte(input)?;
  loop {
    if is_ppm_whitespace(byte) {
      byte = read_header_byte(input)?;
    } else if byte == b'#' {
      // Comment runs through end of line
      while byte != b'\n' {
        byte = read_header_byte(input)?;
      }
    } else {
      break;
    }
  }

  if !byte.is_ascii_digit() {
    return Err(CodecError::InvalidPpm(
        format!("expected a digit in the {} field, got byte 0x{:02x}", what, byte)));
  }

  let mut value: u32 = 0;
  while byte.is_ascii_digit() {
    value = value
        .checked_mul(10)
        .and_then(|v| v.checked_add((byte - b'0') as u32))
        .ok_or_else(|| CodecError::InvalidPpm(format!("{} field overflows", what)))?;
    byte = read_header_byte(input)?;
  }

  if !is_ppm_whitespace(byte) {
    return Err(CodecError::InvalidPpm(
        format!("{} field not terminated by whitespace", what)));
  }

  return Ok(value);
}

/// Read a binary PPM from `input`.
pub fn read<R: Read>(input: &mut R) -> Result<RgbImage, CodecError> {
  let mut magic = [0u8; 2];
  input.read_exact(&mut magic)
      .map_err(|_| CodecError::InvalidPpm("missing magic number".to_string()))?;
  if &magic != PPM_MAGIC {
    return Err(CodecError::InvalidPpm(
        format!("magic number is {:?}, expected \"P6\"", String::from_utf8_lossy(&magic))));
  }

  let width = read_header_value(input, "width")? as usize;
  let height = read_header_value(input, "height")? as usize;
  let denominator = read_header_value(input, "maxval")?;

  if width == 0 || height == 0 {
    return Err(CodecError::InvalidPpm(format!("degenerate size {}x{}", width, height)));
  }
  if denominator == 0 || denominator > MAX_DENOMINATOR {
    return Err(CodecError::InvalidPpm(format!("maxval {} out of range", denominator)));
  }

  let bytes_per_sample = if denominator < 256 { 1 } else { 2 };
  let expected = width * height * 3 * bytes_per_sample;
  let mut raw = Vec::with_capacity(expected);
  input.take(expected as u64).read_to_end(&mut raw)?;
  if raw.len() < expected {
    return Err(CodecError::InvalidPpm(
        format!("pixel data ends early: expected {} bytes, got {}", expected, raw.len())));
  }

  let pixels = Array2D::new_with(height, width, |i, j| {
    let base = (i * width + j) * 3 * bytes_per_sample;
    let sample = |k: usize| -> u16 {
      if bytes_per_sample == 1 {
        raw[base + k] as u16
      } else {
        u16::from_be_bytes([raw[base + 2 * k], raw[base + 2 * k + 1]])
      }
    };
    Rgb {
      red: sample(0),
      green: sample(1),
      blue: sample(2),
    }
  });

  debug!("read {}x{} PPM with maxval {}", width, height, denominator);

  Ok(RgbImage {
    width: width,
    height: height,
    denominator: denominator as u16,
    pixels: pixels,
  })
}

/// Write `img` to `output` as a binary PPM.
pub fn write<W: Write>(output: &mut W, img: &RgbImage) -> Result<(), CodecError> {
  write!(output, "P6\n{} {}\n{}\n", img.width, img.height, img.denominator)?;

  for i in 0..img.height {
    for j in 0..img.width {
      let pixel = img.pixels[i][j];
      if img.denominator < 256 {
        output.write_u8(pixel.red as u8)?;
        output.write_u8(pixel.green as u8)?;
        output.write_u8(pixel.blue as u8)?;
      } else {
        output.write_u16::<BigEndian>(pixel.red)?;
        output.write_u16::<BigEndian>(pixel.green)?;
        output.write_u16::<BigEndian>(pixel.blue)?;
      }
    }
  }

  Ok(())
}
