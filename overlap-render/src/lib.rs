pub mod error;
pub mod render;
pub mod text;

pub use error::RenderError;
pub use render::{FrameStats, SkiaRenderer};
pub use text::{TextAnchor, TextCache, TextSprite, blit_sprite, render_text};
