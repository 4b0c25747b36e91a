//! Individual preprocessing steps
//!
//! Every step after `grayscale` takes and returns an 8-bit luma image.

pub mod denoise;
pub mod despeckle;
pub mod grayscale;
pub mod normalize;
pub mod sharpen;
pub mod threshold;
