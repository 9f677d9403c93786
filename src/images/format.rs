use crate::Result;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use ohno::IntoAppError;
use std::io::Cursor;

/// Decodes an image, crops its centred square and scales it to `size` × `size`, returning PNG bytes.
///
/// # Errors
///
/// Returns an error if the data is not an image in a supported format or the result cannot be encoded.
pub fn square_thumbnail(data: &[u8], size: u32) -> Result<Vec<u8>> {
    let image = image::load_from_memory(data).into_app_err("unable to decode image")?;
    let thumbnail = crop_square(&image).resize_exact(size, size, FilterType::Lanczos3);

    let mut png = Cursor::new(Vec::new());
    thumbnail
        .write_to(&mut png, ImageFormat::Png)
        .into_app_err("unable to encode PNG")?;

    Ok(png.into_inner())
}

fn crop_square(image: &DynamicImage) -> DynamicImage {
    let (width, height) = (image.width(), image.height());
    let side = width.min(height);
    image.crop_imm((width - side) / 2, (height - side) / 2, side, side)
}
