pub mod emergency;
pub mod user;

pub use emergency::*;
pub use user::*;
