//! Featured-workflow carousel.
//!
//! `engine` holds the pure slide state, `driver` runs it on tokio timers,
//! and `breakpoint` maps viewport widths to the number of visible slides.

pub mod breakpoint;
pub mod driver;
pub mod engine;

pub use breakpoint::Breakpoint;
pub use driver::{CarouselHandle, CarouselTiming};
pub use engine::{Carousel, CarouselSnapshot, Transition, DEFAULT_VISIBLE_COUNT};
