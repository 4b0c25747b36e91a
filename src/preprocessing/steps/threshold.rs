use crate::error::OcrError;
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::contrast::otsu_level;
use imageproc::integral_image::{integral_image, integral_squared_image};

/// Sauvola window side in pixels
const WINDOW_SIZE: u32 = 15;
/// Sensitivity to local contrast
const K: f64 = 0.2;
/// Dynamic range of the standard deviation for 8-bit samples
const R: f64 = 128.0;

const INK: Luma<u8> = Luma([0]);
const BACKGROUND: Luma<u8> = Luma([255]);

type Integral = ImageBuffer<Luma<u64>, Vec<u64>>;

/// Sauvola adaptive binarization: ink 0, background 255
///
/// Local threshold is `mean * (1 + k * (std_dev / R - 1))` over a square
/// window, which copes with uneven lighting better than a global level.
pub fn sauvola(image: GrayImage) -> Result<GrayImage, OcrError> {
    let (width, height) = image.dimensions();
    let sums: Integral = integral_image::<_, u64>(&image);
    let squares: Integral = integral_squared_image::<_, u64>(&image);
    let half = WINDOW_SIZE / 2;

    Ok(GrayImage::from_fn(width, height, |x, y| {
        let window = Window {
            left: x.saturating_sub(half),
            top: y.saturating_sub(half),
            right: (x + half).min(width - 1),
            bottom: (y + half).min(height - 1),
        };
        let (mean, std_dev) = window.stats(&sums, &squares);
        let level = mean * (1.0 + K * (std_dev / R - 1.0));

        if image.get_pixel(x, y).0[0] as f64 > level {
            BACKGROUND
        } else {
            INK
        }
    }))
}

/// Global Otsu binarization: ink 0, background 255
pub fn otsu(image: GrayImage) -> Result<GrayImage, OcrError> {
    let level = otsu_level(&image);
    let mut binary = image;
    for pixel in binary.pixels_mut() {
        *pixel = if pixel.0[0] > level { BACKGROUND } else { INK };
    }
    Ok(binary)
}

/// Inclusive pixel window
struct Window {
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
}

impl Window {
    fn area(&self) -> f64 {
        ((self.right - self.left + 1) * (self.bottom - self.top + 1)) as f64
    }

    /// Sum over the window from an integral image with a zero first row and column
    fn sum(&self, integral: &Integral) -> u64 {
        let at = |x: u32, y: u32| integral.get_pixel(x, y).0[0];
        let (x0, y0, x1, y1) = (self.left, self.top, self.right + 1, self.bottom + 1);
        (at(x1, y1) + at(x0, y0)) - (at(x0, y1) + at(x1, y0))
    }

    fn stats(&self, sums: &Integral, squares: &Integral) -> (f64, f64) {
        let area = self.area();
        let mean = self.sum(sums) as f64 / area;
        let variance = self.sum(squares) as f64 / area - mean * mean;
        (mean, variance.max(0.0).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_binary(img: &GrayImage) -> bool {
        img.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255)
    }

    #[test]
    fn test_sauvola_output_is_binary() {
        let img = GrayImage::from_fn(50, 50, |x, _| Luma([(x * 5).min(255) as u8]));
        assert!(is_binary(&sauvola(img).unwrap()));
    }

    #[test]
    fn test_sauvola_separates_text_from_paper() {
        let mut img = GrayImage::from_pixel(50, 20, Luma([240]));
        for x in 10..40 {
            img.put_pixel(x, 10, Luma([20]));
        }

        let result = sauvola(img).unwrap();
        assert_eq!(result.get_pixel(25, 10).0[0], 0);
        assert_eq!(result.get_pixel(25, 5).0[0], 255);
    }

    #[test]
    fn test_sauvola_preserves_clean_binary_input() {
        let mut img = GrayImage::from_pixel(40, 60, BACKGROUND);
        for y in 10..50 {
            for x in 16..24 {
                img.put_pixel(x, y, INK);
            }
        }

        let result = sauvola(img.clone()).unwrap();
        assert_eq!(result, img);
    }

    #[test]
    fn test_otsu_splits_bimodal_image() {
        let img = GrayImage::from_fn(20, 20, |x, _| if x < 8 { Luma([30]) } else { Luma([220]) });

        let result = otsu(img).unwrap();
        assert!(is_binary(&result));
        assert_eq!(result.get_pixel(2, 2).0[0], 0);
        assert_eq!(result.get_pixel(15, 2).0[0], 255);
    }

    #[test]
    fn test_window_sum_matches_direct_sum() {
        let img = GrayImage::from_fn(6, 5, |x, y| Luma([(x * 10 + y) as u8]));
        let sums: Integral = integral_image::<_, u64>(&img);
        let window = Window {
            left: 1,
            top: 2,
            right: 4,
            bottom: 3,
        };

        let direct: u64 = (1..=4)
            .flat_map(|x| (2..=3).map(move |y| (x * 10 + y) as u64))
            .sum();
        assert_eq!(window.sum(&sums), direct);
    }
}
