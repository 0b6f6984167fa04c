pub mod id;
pub mod ring;

pub use ring::RingBuffer;
