pub mod codec;
pub mod transform;
