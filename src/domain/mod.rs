//! Domain layer - request decoding and the transcoding recipe.

pub mod notification;
pub mod transcode;
