pub mod roster;
pub mod round;
pub mod words;

// Re-export main components
pub use roster::*;
pub use round::*;
pub use words::*;
