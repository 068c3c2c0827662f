mod models;
mod status;
mod views;

pub use models::*;
pub use status::*;
pub use views::*;
