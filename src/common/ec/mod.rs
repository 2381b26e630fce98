mod block;
mod decoder;
mod encoder;

pub use block::Block;
pub use decoder::{rectify_info, ReedSolomonDecoder};
pub use encoder::ReedSolomonEncoder;
