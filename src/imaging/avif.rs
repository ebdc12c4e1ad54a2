//! AVIF source support.
//!
//! The `image` crate's `"avif"` feature only provides the encoder (rav1e).
//! Decoding needs `"avif-native"`, which links the C library dav1d, so AVIF
//! sources are read with `avif-parse` (ISOBMFF container) and `rav1d`
//! (pure Rust port of dav1d), then converted to RGB here.

use super::backend::{BackendError, Dimensions};
use image::DynamicImage;
use std::path::Path;
use std::ptr::NonNull;

fn read_container(path: &Path) -> Result<avif_parse::AvifData, BackendError> {
    let bytes = std::fs::read(path)?;
    avif_parse::read_avif(&mut std::io::Cursor::new(&bytes)).map_err(|e| {
        BackendError::ProcessingFailed(format!("{}: not a readable AVIF: {e:?}", path.display()))
    })
}

/// Dimensions from container metadata, without decoding pixels.
pub(super) fn identify(path: &Path) -> Result<Dimensions, BackendError> {
    let avif = read_container(path)?;
    let meta = avif.primary_item_metadata().map_err(|e| {
        BackendError::ProcessingFailed(format!("{}: no AVIF metadata: {e:?}", path.display()))
    })?;
    Ok(Dimensions {
        width: meta.max_frame_width.get(),
        height: meta.max_frame_height.get(),
    })
}

/// Decode the primary item of an AVIF file to RGB8.
pub(super) fn decode(path: &Path) -> Result<DynamicImage, BackendError> {
    let avif = read_container(path)?;
    decode_av1(&avif.primary_item)
}

fn rav1d_failed(step: &str, code: i32) -> BackendError {
    BackendError::ProcessingFailed(format!("rav1d {step} failed ({code})"))
}

/// Run one AV1 frame through rav1d. The decoder context is closed on every path.
fn decode_av1(av1: &[u8]) -> Result<DynamicImage, BackendError> {
    use rav1d::include::dav1d::dav1d::Dav1dSettings;
    use rav1d::src::lib as dav1d;

    let mut settings = std::mem::MaybeUninit::<Dav1dSettings>::uninit();
    unsafe { dav1d::dav1d_default_settings(NonNull::new(settings.as_mut_ptr()).unwrap()) };
    let mut settings = unsafe { settings.assume_init() };
    settings.n_threads = 1;
    settings.max_frame_delay = 1;

    let mut ctx = None;
    let rc = unsafe { dav1d::dav1d_open(NonNull::new(&mut ctx), NonNull::new(&mut settings)) };
    if rc.0 != 0 {
        return Err(rav1d_failed("open", rc.0));
    }

    let decoded = (|| {
        use rav1d::include::dav1d::data::Dav1dData;
        use rav1d::include::dav1d::picture::Dav1dPicture;

        let mut data = Dav1dData::default();
        let buf = unsafe { dav1d::dav1d_data_create(NonNull::new(&mut data), av1.len()) };
        if buf.is_null() {
            return Err(BackendError::ProcessingFailed(
                "rav1d data_create failed".into(),
            ));
        }
        unsafe { std::ptr::copy_nonoverlapping(av1.as_ptr(), buf, av1.len()) };

        let rc = unsafe { dav1d::dav1d_send_data(ctx, NonNull::new(&mut data)) };
        if rc.0 != 0 {
            unsafe { dav1d::dav1d_data_unref(NonNull::new(&mut data)) };
            return Err(rav1d_failed("send_data", rc.0));
        }

        let mut pic: Dav1dPicture = unsafe { std::mem::zeroed() };
        let rc = unsafe { dav1d::dav1d_get_picture(ctx, NonNull::new(&mut pic)) };
        if rc.0 != 0 {
            return Err(rav1d_failed("get_picture", rc.0));
        }

        let converted = picture_to_rgb(&pic);
        unsafe { dav1d::dav1d_picture_unref(NonNull::new(&mut pic)) };
        converted
    })();

    unsafe { dav1d::dav1d_close(NonNull::new(&mut ctx)) };
    decoded
}

/// Chroma plane layout of a decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chroma {
    /// I400: luma only.
    Monochrome,
    /// Horizontal / vertical subsampling (I420 = both, I422 = horizontal, I444 = none).
    Subsampled { x: bool, y: bool },
}

fn picture_to_rgb(
    pic: &rav1d::include::dav1d::picture::Dav1dPicture,
) -> Result<DynamicImage, BackendError> {
    use rav1d::include::dav1d::headers::{
        DAV1D_PIXEL_LAYOUT_I400, DAV1D_PIXEL_LAYOUT_I420, DAV1D_PIXEL_LAYOUT_I422,
        DAV1D_PIXEL_LAYOUT_I444,
    };

    let chroma = match pic.p.layout {
        DAV1D_PIXEL_LAYOUT_I400 => Chroma::Monochrome,
        DAV1D_PIXEL_LAYOUT_I420 => Chroma::Subsampled { x: true, y: true },
        DAV1D_PIXEL_LAYOUT_I422 => Chroma::Subsampled { x: true, y: false },
        DAV1D_PIXEL_LAYOUT_I444 => Chroma::Subsampled { x: false, y: false },
        other => {
            return Err(BackendError::ProcessingFailed(format!(
                "unsupported AVIF pixel layout {other}"
            )));
        }
    };

    let plane = |i: usize| {
        pic.data[i]
            .map(|p| p.as_ptr() as *const u8)
            .ok_or_else(|| BackendError::ProcessingFailed(format!("AVIF plane {i} missing")))
    };
    let luma = plane(0)?;
    let (cb, cr) = match chroma {
        Chroma::Monochrome => (luma, luma),
        Chroma::Subsampled { .. } => (plane(1)?, plane(2)?),
    };

    let frame = Frame {
        luma: Plane {
            ptr: luma,
            stride: pic.stride[0],
        },
        cb: Plane {
            ptr: cb,
            stride: pic.stride[1],
        },
        cr: Plane {
            ptr: cr,
            stride: pic.stride[1],
        },
        width: pic.p.w as u32,
        height: pic.p.h as u32,
        bit_depth: pic.p.bpc as u32,
        chroma,
    };

    image::RgbImage::from_raw(frame.width, frame.height, frame.to_rgb8())
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| BackendError::ProcessingFailed("decoded AVIF buffer size mismatch".into()))
}

#[derive(Clone, Copy)]
struct Plane {
    ptr: *const u8,
    stride: isize,
}

impl Plane {
    /// Sample at (x, y); samples deeper than 8 bits are stored as u16.
    #[inline]
    fn sample(self, x: u32, y: u32, bit_depth: u32) -> f32 {
        let row = y as isize * self.stride;
        if bit_depth <= 8 {
            (unsafe { *self.ptr.offset(row + x as isize) }) as f32
        } else {
            (unsafe { *(self.ptr.offset(row + x as isize * 2) as *const u16) }) as f32
        }
    }
}

struct Frame {
    luma: Plane,
    cb: Plane,
    cr: Plane,
    width: u32,
    height: u32,
    bit_depth: u32,
    chroma: Chroma,
}

impl Frame {
    /// BT.601 YCbCr → interleaved RGB8.
    fn to_rgb8(&self) -> Vec<u8> {
        let max = ((1u32 << self.bit_depth) - 1) as f32;
        let mid = (1u32 << (self.bit_depth - 1)) as f32;
        let to_8bit = |v: f32| (v * 255.0 / max).clamp(0.0, 255.0) as u8;

        let mut rgb = Vec::with_capacity((self.width * self.height * 3) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                let l = self.luma.sample(x, y, self.bit_depth);
                let pixel = match self.chroma {
                    Chroma::Monochrome => [to_8bit(l); 3],
                    Chroma::Subsampled { x: sx, y: sy } => {
                        let cx = if sx { x / 2 } else { x };
                        let cy = if sy { y / 2 } else { y };
                        let cb = self.cb.sample(cx, cy, self.bit_depth) - mid;
                        let cr = self.cr.sample(cx, cy, self.bit_depth) - mid;
                        [
                            to_8bit(l + 1.402 * cr),
                            to_8bit(l - 0.344136 * cb - 0.714136 * cr),
                            to_8bit(l + 1.772 * cb),
                        ]
                    }
                };
                rgb.extend_from_slice(&pixel);
            }
        }
        rgb
    }
}
