//! Ports - the collaborators the pipeline is written against.

pub mod storage;
pub mod transcoder;
