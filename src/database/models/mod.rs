pub mod reminder;
pub mod reservation;

pub use reminder::*;
pub use reservation::*;
