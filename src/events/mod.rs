pub mod appearance;

pub use appearance::{AppearanceMode, ThemeTable};
