//! Image and mask decoding into ndarray buffers, crop and prediction export

use crate::io::error::{PipelineError, Result};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb};
use ndarray::{Array2, Array3, ArrayView2, ArrayView3};
use num_traits::Zero;
use std::path::Path;

/// Load a color fundus image as a (height, width, 3) array
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded.
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> Result<Array3<u8>> {
    let path_buf = path.as_ref().to_path_buf();
    let img = image::open(&path_buf).map_err(|e| PipelineError::ImageLoad {
        path: path_buf,
        source: e,
    })?;
    let rgb = img.to_rgb8();

    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    let mut data = Array3::zeros((height, width, 3));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for (c, &value) in pixel.0.iter().enumerate() {
            if let Some(sample) = data.get_mut((y as usize, x as usize, c)) {
                *sample = value;
            }
        }
    }
    Ok(data)
}

/// Load a lesion mask as a (height, width) array
///
/// Mask values are semantically binary but arrive with arbitrary non-zero
/// sample values. 16-bit masks are collapsed to {0, 255} on load, since a
/// plain bit-depth conversion would truncate small labels to zero; 8-bit
/// masks keep their raw values. Consumers normalize to {0, 1} before
/// counting.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded.
pub fn load_mask<P: AsRef<Path>>(path: P) -> Result<Array2<u8>> {
    let path_buf = path.as_ref().to_path_buf();
    let img = image::open(&path_buf).map_err(|e| PipelineError::ImageLoad {
        path: path_buf,
        source: e,
    })?;

    let data = match img {
        DynamicImage::ImageLuma16(buf) => {
            let (width, height) = (buf.width() as usize, buf.height() as usize);
            let mut data = Array2::zeros((height, width));
            for (x, y, pixel) in buf.enumerate_pixels() {
                let value = pixel.0.first().copied().unwrap_or(0);
                if let Some(sample) = data.get_mut((y as usize, x as usize)) {
                    *sample = if value == 0 { 0 } else { 255 };
                }
            }
            data
        }
        other => {
            let luma = other.to_luma8();
            let (width, height) = (luma.width() as usize, luma.height() as usize);
            let mut data = Array2::zeros((height, width));
            for (x, y, pixel) in luma.enumerate_pixels() {
                if let Some(sample) = data.get_mut((y as usize, x as usize)) {
                    *sample = pixel.0.first().copied().unwrap_or(0);
                }
            }
            data
        }
    };
    Ok(data)
}

/// Count mask samples that are foreground after normalization to {0, 1}
pub fn foreground_count<T: Zero>(mask: &ArrayView2<'_, T>) -> usize {
    mask.iter().filter(|value| !value.is_zero()).count()
}

/// Normalize a mask to {0, 1} regardless of its sample values
pub fn normalize_mask<T: Zero>(mask: &ArrayView2<'_, T>) -> Array2<u8> {
    mask.map(|value| u8::from(!value.is_zero()))
}

/// Save an image crop as an RGB file
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the
/// encoder fails.
pub fn save_patch_image<P: AsRef<Path>>(crop: &ArrayView3<'_, u8>, path: P) -> Result<()> {
    let (height, width, _) = crop.dim();
    let mut img = ImageBuffer::new(width as u32, height as u32);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let at = |c: usize| crop.get((y as usize, x as usize, c)).copied().unwrap_or(0);
        *pixel = Rgb([at(0), at(1), at(2)]);
    }
    save_buffer(&DynamicImage::ImageRgb8(img), path.as_ref())
}

/// Save a mask crop as a grayscale file with its raw sample values
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the
/// encoder fails.
pub fn save_patch_mask<P: AsRef<Path>>(crop: &ArrayView2<'_, u8>, path: P) -> Result<()> {
    save_buffer(
        &DynamicImage::ImageLuma8(gray_from_array(crop)),
        path.as_ref(),
    )
}

/// Export a stitched binary mask with foreground scaled to 255
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the
/// encoder fails.
pub fn export_binary_mask<P: AsRef<Path>>(mask: &Array2<u8>, path: P) -> Result<()> {
    let scaled = mask.map(|&value| if value == 0 { 0 } else { 255 });
    save_buffer(
        &DynamicImage::ImageLuma8(gray_from_array(&scaled.view())),
        path.as_ref(),
    )
}

fn gray_from_array(data: &ArrayView2<'_, u8>) -> GrayImage {
    let (height, width) = data.dim();
    let mut img = ImageBuffer::new(width as u32, height as u32);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let value = data.get((y as usize, x as usize)).copied().unwrap_or(0);
        *pixel = Luma([value]);
    }
    img
}

fn save_buffer(img: &DynamicImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| PipelineError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }
    }
    img.save(path).map_err(|e| PipelineError::ImageExport {
        path: path.to_path_buf(),
        source: e,
    })
}
