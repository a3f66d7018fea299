// End-to-end tests: PPM bytes in, compressed stream, PPM bytes out

use quadpix::codec;
use quadpix::error::CodecError;
use quadpix::ppm;

const MAGIC_LINE: &[u8] = b"COMP40 Compressed image format 2\n";

// Build a P6 byte stream from a per-pixel (red, green, blue) function
fn make_ppm<F>(width: usize, height: usize, f: F) -> Vec<u8>
where F: Fn(usize, usize) -> (u8, u8, u8) {
  let mut data = format!("P6\n{} {}\n255\n", width, height).into_bytes();
  for y in 0..height {
    for x in 0..width {
      let (red, green, blue) = f(x, y);
      data.push(red);
      data.push(green);
      data.push(blue);
    }
  }
  data
}

fn compress(input: &[u8]) -> Vec<u8> {
  let mut output = Vec::new();
  codec::compress(&mut &input[..], &mut output).unwrap();
  output
}

fn decompress(input: &[u8]) -> Vec<u8> {
  let mut output = Vec::new();
  codec::decompress(&mut &input[..], &mut output).unwrap();
  output
}

// Mean absolute per-channel difference between two same-sized PPMs
fn mean_abs_diff(original: &[u8], decoded: &[u8]) -> f64 {
  let a = ppm::read(&mut &original[..]).unwrap();
  let b = ppm::read(&mut &decoded[..]).unwrap();
  assert_eq!((a.width, a.height), (b.width, b.height));

  let mut total = 0.0f64;
  for i in 0..a.height {
    for j in 0..a.width {
      let pa = a.pixels[i][j];
      let pb = b.pixels[i][j];
      total += (pa.red as f64 - pb.red as f64).abs();
      total += (pa.green as f64 - pb.green as f64).abs();
      total += (pa.blue as f64 - pb.blue as f64).abs();
    }
  }
  total / (a.width * a.height * 3) as f64
}

#[test]
fn solid_black_round_trips_exactly() {
  let input = make_ppm(2, 2, |_, _| (0, 0, 0));
  let compressed = compress(&input);

  // Luminance and differentials are all zero; only the two mid-scale
  // chroma indices remain in the single code word
  let payload = &compressed[compressed.len() - 4..];
  assert_eq!(payload, &[0x00, 0x00, 0x00, 0x44]);

  let decoded = decompress(&compressed);
  let img = ppm::read(&mut &decoded[..]).unwrap();
  for j in 0..2 {
    assert_eq!(img.pixels[0][j], ppm::Rgb { red: 0, green: 0, blue: 0 });
    assert_eq!(img.pixels[1][j], ppm::Rgb { red: 0, green: 0, blue: 0 });
  }
}

#[test]
fn solid_white_round_trips_exactly() {
  let input = make_ppm(2, 2, |_, _| (255, 255, 255));
  let decoded = decompress(&compress(&input));
  let img = ppm::read(&mut &decoded[..]).unwrap();
  assert_eq!(img.denominator, 255);
  for j in 0..2 {
    assert_eq!(img.pixels[0][j], ppm::Rgb { red: 255, green: 255, blue: 255 });
    assert_eq!(img.pixels[1][j], ppm::Rgb { red: 255, green: 255, blue: 255 });
  }
}

#[test]
fn grayscale_gradient_stays_close() {
  let input = make_ppm(32, 32, |x, y| {
    let v = ((x + y) * 255 / 62) as u8;
    (v, v, v)
  });
  let decoded = decompress(&compress(&input));
  assert!(mean_abs_diff(&input, &decoded) < 8.0);
}

#[test]
fn color_gradient_stays_close() {
  let input = make_ppm(32, 32, |x, y| {
    let red = (x * 255 / 31) as u8;
    let green = ((x + y) * 255 / 62) as u8;
    let blue = (y * 255 / 31) as u8;
    (red, green, blue)
  });
  let decoded = decompress(&compress(&input));
  assert!(mean_abs_diff(&input, &decoded) < 16.0);
}

#[test]
fn compressed_stream_has_the_declared_shape() {
  let input = make_ppm(32, 32, |x, _| ((x * 8) as u8, 0, 0));
  let compressed = compress(&input);

  assert!(compressed.starts_with(MAGIC_LINE));
  let after_magic = &compressed[MAGIC_LINE.len()..];
  let dims_end = after_magic.iter().position(|&b| b == b'\n').unwrap();
  assert_eq!(&after_magic[..dims_end], b"32 32");

  // Exactly one 4-byte word per 2x2 block
  let payload = &after_magic[dims_end + 1..];
  assert_eq!(payload.len(), (32 / 2) * (32 / 2) * 4);
}

#[test]
fn odd_dimensions_are_trimmed_to_even() {
  let input = make_ppm(5, 3, |x, y| ((x * 40) as u8, (y * 60) as u8, 77));
  let decoded = decompress(&compress(&input));
  let img = ppm::read(&mut &decoded[..]).unwrap();
  assert_eq!((img.width, img.height), (4, 2));
}

#[test]
fn round_trip_mode_matches_compress_then_decompress() {
  let input = make_ppm(8, 8, |x, y| ((x * 30) as u8, (y * 30) as u8, 128));

  let mut via_round_trip = Vec::new();
  codec::round_trip(&mut &input[..], &mut via_round_trip).unwrap();

  let via_two_steps = decompress(&compress(&input));
  assert_eq!(via_round_trip, via_two_steps);
}

#[test]
fn compress_rejects_garbage_input() {
  let mut output = Vec::new();
  let result = codec::compress(&mut &b"not a ppm at all"[..], &mut output);
  assert!(matches!(result, Err(CodecError::InvalidPpm(_))));
}

#[test]
fn decompress_rejects_a_short_payload() {
  let input = make_ppm(4, 4, |_, _| (9, 9, 9));
  let mut compressed = compress(&input);
  compressed.truncate(compressed.len() - 3);

  let mut output = Vec::new();
  let result = codec::decompress(&mut &compressed[..], &mut output);
  assert!(matches!(result, Err(CodecError::TruncatedStream { .. })));
}
