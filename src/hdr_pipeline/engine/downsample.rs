use crate::hdr_pipeline::frame::types::{CHANNELS, Frame};

/// Box-filtered copy of `frame` whose longer side is `target` pixels.
///
/// Each output pixel averages the source pixels its footprint covers, rounding
/// to the nearest level. Frames already no larger than `target` are returned
/// as an unscaled copy.
pub fn downsample_to(frame: &Frame, target: usize) -> Frame {
    let (width, height) = (frame.width(), frame.height());
    let (out_width, out_height) = scaled_size(width, height, target);
    if (out_width, out_height) == (width, height) {
        return frame.clone();
    }

    let x_spans: Vec<(usize, usize)> = (0..out_width).map(|x| span(x, width, out_width)).collect();
    let src = frame.samples();
    let mut samples = Vec::with_capacity(out_width * out_height * CHANNELS);

    for y in 0..out_height {
        let (y0, y1) = span(y, height, out_height);
        for &(x0, x1) in &x_spans {
            let count = ((y1 - y0) * (x1 - x0)) as u64;
            let mut sums = [0u64; CHANNELS];
            for sy in y0..y1 {
                let row = &src[(sy * width + x0) * CHANNELS..(sy * width + x1) * CHANNELS];
                for px in row.chunks_exact(CHANNELS) {
                    for c in 0..CHANNELS {
                        sums[c] += px[c] as u64;
                    }
                }
            }
            for sum in sums {
                samples.push(((sum + count / 2) / count) as u16);
            }
        }
    }

    frame.derived(out_width, out_height, samples)
}

/// Size `downsample_to` produces for a `width` x `height` frame.
pub fn scaled_size(width: usize, height: usize, target: usize) -> (usize, usize) {
    let longest = width.max(height);
    if target >= longest {
        return (width, height);
    }

    let scale = target as f64 / longest as f64;
    (
        ((width as f64 * scale).round() as usize).max(1),
        ((height as f64 * scale).round() as usize).max(1),
    )
}

/// Source range `[start, end)` covered by output index `i`, never empty.
fn span(i: usize, src_len: usize, out_len: usize) -> (usize, usize) {
    let start = i * src_len / out_len;
    let end = ((i + 1) * src_len / out_len).max(start + 1).min(src_len);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: usize, height: usize, f: impl Fn(usize, usize) -> u16) -> Frame {
        let mut samples = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let v = f(x, y);
                samples.extend_from_slice(&[v, v, v]);
            }
        }
        Frame::new(width, height, samples, 256, 0.5).unwrap()
    }

    #[test]
    fn test_longer_side_matches_target() {
        let src = frame(400, 100, |x, y| ((x + y) % 256) as u16);
        let small = downsample_to(&src, 100);

        assert_eq!(small.width(), 100);
        assert_eq!(small.height(), 25);
        assert_eq!(small.brightness(), 0.5);
        assert_eq!(small.levels(), 256);
    }

    #[test]
    fn test_box_average() {
        let src = frame(4, 2, |x, _| [10, 20, 100, 101][x]);
        let small = downsample_to(&src, 2);

        assert_eq!((small.width(), small.height()), (2, 1));
        assert_eq!(small.samples(), &[15, 15, 15, 101, 101, 101]);
    }

    #[test]
    fn test_no_upscaling() {
        let src = frame(4, 4, |x, y| (x * 4 + y) as u16);
        let same = downsample_to(&src, 100);

        assert_eq!((same.width(), same.height()), (4, 4));
        assert_eq!(same.samples(), src.samples());
    }

    #[test]
    fn test_scaled_size_matches_downsample() {
        let src = frame(37, 23, |x, y| ((x * y) % 256) as u16);
        for target in [1, 5, 20, 36, 37, 100] {
            let small = downsample_to(&src, target);
            assert_eq!(scaled_size(37, 23, target), (small.width(), small.height()));
        }
        assert_eq!(scaled_size(1000, 1, 10), (10, 1));
    }

    #[test]
    fn test_spans_cover_source() {
        for (src_len, out_len) in [(10, 3), (7, 7), (1000, 100), (5, 1)] {
            let mut next = 0;
            for i in 0..out_len {
                let (start, end) = span(i, src_len, out_len);
                assert_eq!(start, next);
                assert!(end > start);
                next = end;
            }
            assert_eq!(next, src_len);
        }
    }
}
