pub mod encode;
pub mod errors;
pub mod extract;
pub mod figure;
pub mod masking;
pub mod panel;
pub mod simulate;

pub use encode::Encode;
pub use errors::FigureError;
pub use extract::{SelectVariants, SelectionConfig};
pub use figure::{Figure, FigureConfig};
pub use masking::{Masking, MaskingConfig};
