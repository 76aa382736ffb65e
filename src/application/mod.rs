//! Application layer - services written against ports.

pub mod pipeline;
