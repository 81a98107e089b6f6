//! Views for the clock screen
//!
//! - clock_face.rs: time, date and world clocks
//! - flyout.rs: the two settings panels and the buttons that open them

pub mod clock_face;
pub mod flyout;

pub use flyout::Flyout;
