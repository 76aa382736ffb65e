//! The fixed rescale applied to every raw video.

use std::path::Path;

/// Rescale so the shorter edge is `short_edge` pixels, keeping the aspect
/// ratio. The other edge is rounded to an even size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScaleFilter {
    short_edge: u32,
}

impl ScaleFilter {
    pub fn short_edge(short_edge: u32) -> Self {
        Self { short_edge }
    }

    pub fn target(&self) -> u32 {
        self.short_edge
    }

    /// ffmpeg `-vf` expression for this filter.
    pub fn expression(&self) -> String {
        let n = self.short_edge;
        format!("scale='if(gte(iw,ih),-2,{n})':'if(gte(iw,ih),{n},-2)'")
    }
}

impl Default for ScaleFilter {
    fn default() -> Self {
        Self::short_edge(360)
    }
}

/// Arguments for one ffmpeg run of `filter` from `input` to `output`.
pub fn ffmpeg_args(input: &Path, output: &Path, filter: &ScaleFilter) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-nostdin".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
        "-vf".to_string(),
        filter.expression(),
        output.to_string_lossy().into_owned(),
    ]
}
