//! Decoder for 8-bit RGB, non-interlaced PNG images.
//!
//! ```no_run
//! let img = rgbpng::image::RasterGrid::load("test.png").unwrap();
//! for row in img.rows() {
//!     assert_eq!(row.len(), img.width() * 3);
//! }
//! ```
pub mod image;
