use crate::error::OcrError;
use image::GrayImage;
use imageproc::filter::filter3x3;

/// Laplacian cross: center 5, direct neighbors -1
const KERNEL: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];

/// Steepen stroke edges ahead of thresholding
pub fn apply(image: GrayImage) -> Result<GrayImage, OcrError> {
    let sharpened: GrayImage = filter3x3(&image, &KERNEL);
    Ok(sharpened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_soft_edge_gets_steeper() {
        // Ramp 60 -> 120 -> 180 across three columns
        let img = GrayImage::from_fn(9, 5, |x, _| match x {
            0..=3 => Luma([60]),
            4 => Luma([120]),
            _ => Luma([180]),
        });

        let result = apply(img).unwrap();
        let dark = result.get_pixel(3, 2).0[0] as i32;
        let light = result.get_pixel(5, 2).0[0] as i32;
        assert!(light - dark > 120, "edge contrast {} too small", light - dark);
    }

    #[test]
    fn test_flat_region_unchanged() {
        let img = GrayImage::from_pixel(6, 6, Luma([200]));
        let result = apply(img).unwrap();
        assert_eq!(result.get_pixel(3, 3).0[0], 200);
    }
}
