pub mod user;

pub use user::{CurrentSession, ScreenView, UserContext};
