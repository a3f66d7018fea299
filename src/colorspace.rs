// RGB <-> component video conversion
//
// The forward direction normalizes against the PPM denominator, so the
// rest of the pipeline only ever sees Y in [0, 1] and Pb/Pr in
// [-0.5, 0.5]. The reverse direction always produces denominator-255
// samples regardless of what the input declared.

use bytemuck::Zeroable;

use crate::array2d::Array2D;
use crate::ppm::{Rgb, RgbImage};

pub const RGB_DENOMINATOR: u16 = 255;

// One pixel in (Y, Pb, Pr) form. Construction saturates each component
// to its valid interval.
#[derive(Clone, Copy, Debug, Zeroable)]
pub struct CvPixel {
  pub y: f32,
  pub pb: f32,
  pub pr: f32,
}

impl CvPixel {
  pub fn new(y: f32, pb: f32, pr: f32) -> Self {
    Self {
      y: y.clamp(0.0, 1.0),
      pb: pb.clamp(-0.5, 0.5),
      pr: pr.clamp(-0.5, 0.5),
    }
  }
}

pub struct CvImage {
  pub width: usize,
  pub height: usize,
  pub pixels: Array2D<CvPixel>,
}

impl CvImage {
  pub fn new(width: usize, height: usize) -> Self {
    Self {
      width: width,
      height: height,
      pixels: Array2D::zeroed(height, width),
    }
  }
}

/// Convert every pixel of `img` to component video, normalized by the
/// image's denominator.
pub fn rgb_to_comp_vid(img: &RgbImage) -> CvImage {
  let denom = img.denominator as f32;

  let pixels = Array2D::new_with(img.height, img.width, |i, j| {
    let pixel = img.pixels[i][j];
    let red = pixel.red as f32;
    let green = pixel.green as f32;
    let blue = pixel.blue as f32;

    let y = (0.299 * red + 0.587 * green + 0.114 * blue) / denom;
    let pb = (-0.168736 * red - 0.331264 * green + 0.5 * blue) / denom;
    let pr = (0.5 * red - 0.418688 * green - 0.081312 * blue) / denom;

    CvPixel::new(y, pb, pr)
  });

  CvImage {
    width: img.width,
    height: img.height,
    pixels: pixels,
  }
}

/// Convert a component-video image back to RGB with denominator 255.
pub fn comp_vid_to_rgb(cv: &CvImage) -> RgbImage {
  let pixels = Array2D::new_with(cv.height, cv.width, |i, j| {
    let pixel = cv.pixels[i][j];
    let y = pixel.y * RGB_DENOMINATOR as f32;
    let pb = pixel.pb * RGB_DENOMINATOR as f32;
    let pr = pixel.pr * RGB_DENOMINATOR as f32;

    let red = (y + 1.402 * pr) as i32;
    let green = (y - 0.344136 * pb - 0.714136 * pr) as i32;
    let blue = (y + 1.772 * pb) as i32;

    // Clamp while the values are still signed; the cast to the unsigned
    // sample type must never wrap a negative result
    Rgb {
      red: red.clamp(0, RGB_DENOMINATOR as i32) as u16,
      green: green.clamp(0, RGB_DENOMINATOR as i32) as u16,
      blue: blue.clamp(0, RGB_DENOMINATOR as i32) as u16,
    }
  });

  RgbImage {
    width: cv.width,
    height: cv.height,
    denominator: RGB_DENOMINATOR,
    pixels: pixels,
  }
}
