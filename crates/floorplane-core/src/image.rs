use crate::{CanvasSize, Homography};
use nalgebra::Point2;

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

impl GrayImageView<'_> {
    #[inline]
    pub fn size(&self) -> CanvasSize {
        CanvasSize::new(self.width, self.height)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn size(&self) -> CanvasSize {
        CanvasSize::new(self.width, self.height)
    }
}

#[inline]
fn get_gray(src: &GrayImageView<'_>, x: i32, y: i32) -> u8 {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return 0;
    }
    src.data[y as usize * src.width + x as usize]
}

#[inline]
pub fn sample_bilinear(src: &GrayImageView<'_>, x: f32, y: f32) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_gray(src, x0, y0) as f32;
    let p10 = get_gray(src, x0 + 1, y0) as f32;
    let p01 = get_gray(src, x0, y0 + 1) as f32;
    let p11 = get_gray(src, x0 + 1, y0 + 1) as f32;

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

#[inline]
pub fn sample_bilinear_u8(src: &GrayImageView<'_>, x: f32, y: f32) -> u8 {
    sample_bilinear(src, x, y).clamp(0.0, 255.0) as u8
}

/// Resample `src` through `h_dst_from_src` into an `out_w × out_h` canvas.
///
/// Each destination pixel `(x, y)` is pulled back through the inverse
/// transform and sampled bilinearly; source reads outside the image are 0.
/// Returns `None` when `h_dst_from_src` is singular.
pub fn warp_perspective_gray(
    src: &GrayImageView<'_>,
    h_dst_from_src: &Homography,
    out_w: usize,
    out_h: usize,
) -> Option<GrayImage> {
    let h_src_from_dst = h_dst_from_src.inverse()?;
    let mut out = GrayImage::new(out_w, out_h);

    for y in 0..out_h {
        let row = &mut out.data[y * out_w..(y + 1) * out_w];
        for (x, px) in row.iter_mut().enumerate() {
            let ps = h_src_from_dst.apply(Point2::new(x as f32, y as f32));
            if ps.x.is_finite() && ps.y.is_finite() {
                *px = sample_bilinear_u8(src, ps.x, ps.y);
            }
        }
    }

    Some(out)
}

/// Bilinear resize, used for debug output.
pub fn resize_gray(src: &GrayImageView<'_>, out: CanvasSize) -> GrayImage {
    let mut dst = GrayImage::new(out.width, out.height);
    if out.width == 0 || out.height == 0 {
        return dst;
    }
    let sx = src.width as f32 / out.width as f32;
    let sy = src.height as f32 / out.height as f32;
    for y in 0..out.height {
        for x in 0..out.width {
            // Align pixel centers, then clamp so borders do not fade to black.
            let fx = ((x as f32 + 0.5) * sx - 0.5).clamp(0.0, (src.width.max(1) - 1) as f32);
            let fy = ((y as f32 + 0.5) * sy - 0.5).clamp(0.0, (src.height.max(1) - 1) as f32);
            dst.data[y * out.width + x] = sample_bilinear_u8(src, fx, fy);
        }
    }
    dst
}
