//! Terminal image display.
//!
//! Shows one or more 2D numeric arrays as character (or 24-bit colour) panels,
//! optionally with an intensity histogram beside a single image. Independent
//! of the likelihood fitter.

pub mod array;
pub mod colormap;
pub mod display;
pub mod histogram;
pub mod load;

pub use array::Image;
pub use colormap::Colormap;
pub use display::{DisplayOptions, Titles, show_images};
pub use histogram::{Histogram, histogram};
pub use load::{load_image, parse_image};
