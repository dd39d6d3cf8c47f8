//! Frame decoding, encoding, and tensor conversion helpers.

pub mod codec;
pub mod conversion;

pub use codec::{decode_frame, encode_jpeg};
pub use conversion::{cap_longest_side, face_input_tensor, FACE_INPUT_SIZE};
