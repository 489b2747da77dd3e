use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("cannot read font: {0}")]
    FontIo(#[from] std::io::Error),
    #[error("font data is not a usable TrueType/OpenType font")]
    InvalidFont(#[from] ab_glyph::InvalidFont),
    #[error("cannot allocate a {width}x{height} canvas")]
    Canvas { width: u32, height: u32 },
    #[error("frame buffer holds {actual} bytes, canvas needs {expected}")]
    FrameSize { expected: usize, actual: usize },
}
