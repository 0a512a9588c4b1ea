//! EDL 產生元件

mod events;
mod main;

pub use events::{EdlEvent, build, export};
pub use main::EdlGenerator;
