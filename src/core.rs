use crate::error::{SyntherError, SyntherResult};

/// Highest frame index the host animation system accepts.
pub const MAX_ANIMATION_FRAME: u64 = 1_048_574;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Inclusive window of animation frames, one frame per dataset item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    pub first: FrameIndex,
    pub last: FrameIndex,
}

impl FrameRange {
    pub fn new(first: FrameIndex, last: FrameIndex) -> SyntherResult<Self> {
        if first.0 > last.0 {
            return Err(SyntherError::validation("FrameRange first must be <= last"));
        }
        Ok(Self { first, last })
    }

    /// Plans the frame window for `items_to_generate` items starting at
    /// `first_item_index`, enforcing the host frame cap.
    pub fn plan(first_item_index: u64, items_to_generate: u64) -> SyntherResult<Self> {
        if items_to_generate == 0 {
            return Err(SyntherError::validation("items_to_generate must be >= 1"));
        }
        let span_end = first_item_index
            .checked_add(items_to_generate)
            .ok_or_else(|| SyntherError::range("frame span overflows"))?;
        if span_end > MAX_ANIMATION_FRAME {
            return Err(SyntherError::range(format!(
                "cannot generate {items_to_generate} items starting at index {first_item_index}: \
                 the host supports at most {MAX_ANIMATION_FRAME} animation frames"
            )));
        }
        Ok(Self {
            first: FrameIndex(first_item_index),
            last: FrameIndex(first_item_index + items_to_generate - 1),
        })
    }

    pub fn len_frames(self) -> u64 {
        self.last.0 - self.first.0 + 1
    }

    pub fn contains(self, f: FrameIndex) -> bool {
        self.first.0 <= f.0 && f.0 <= self.last.0
    }

    /// Every frame in the window, ascending.
    pub fn frames(self) -> impl Iterator<Item = FrameIndex> {
        (self.first.0..=self.last.0).map(FrameIndex)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl From<(u32, u32)> for ImageSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl From<ImageSize> for (u32, u32) {
    fn from(size: ImageSize) -> Self {
        (size.width, size.height)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

/// Bit depth of a single-channel segmentation mask. Picked from the labeled
/// object count so every pass index stays distinguishable after encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MaskDepth {
    Eight,
    Sixteen,
}

impl MaskDepth {
    pub fn for_model_count(model_count: usize) -> Self {
        if model_count < 256 {
            Self::Eight
        } else {
            Self::Sixteen
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            Self::Eight => 8,
            Self::Sixteen => 16,
        }
    }

    pub fn max_value(self) -> u32 {
        match self {
            Self::Eight => u32::from(u8::MAX),
            Self::Sixteen => u32::from(u16::MAX),
        }
    }
}

/// File stem for per-frame output artifacts: the frame index zero-padded to
/// ten digits.
pub fn frame_file_stem(frame: FrameIndex) -> String {
    format!("{:010}", frame.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_accepts_full_span() {
        let r = FrameRange::plan(0, 1_048_574).unwrap();
        assert_eq!(r.first, FrameIndex(0));
        assert_eq!(r.last, FrameIndex(1_048_573));
    }

    #[test]
    fn plan_rejects_span_past_host_cap() {
        let err = FrameRange::plan(0, 1_048_575).unwrap_err();
        assert!(matches!(err, SyntherError::Range(_)));

        let err = FrameRange::plan(1_048_574, 1).unwrap_err();
        assert!(matches!(err, SyntherError::Range(_)));
    }

    #[test]
    fn plan_computes_inclusive_last() {
        let r = FrameRange::plan(10, 5).unwrap();
        assert_eq!(r.last, FrameIndex(14));
        assert_eq!(r.len_frames(), 5);
    }

    #[test]
    fn plan_rejects_zero_items() {
        assert!(matches!(
            FrameRange::plan(0, 0),
            Err(SyntherError::Validation(_))
        ));
    }

    #[test]
    fn frames_iterates_every_index_ascending() {
        let r = FrameRange::plan(3, 4).unwrap();
        let frames: Vec<u64> = r.frames().map(|f| f.0).collect();
        assert_eq!(frames, vec![3, 4, 5, 6]);
    }

    #[test]
    fn image_size_serializes_as_pair() {
        let s = serde_json::to_string(&ImageSize::new(1920, 1080)).unwrap();
        assert_eq!(s, "[1920,1080]");
        let back: ImageSize = serde_json::from_str(&s).unwrap();
        assert_eq!(back, ImageSize::new(1920, 1080));
    }

    #[test]
    fn image_format_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&ImageFormat::Png).unwrap(), "\"PNG\"");
        assert_eq!(
            serde_json::to_string(&ImageFormat::Jpeg).unwrap(),
            "\"JPEG\""
        );
    }

    #[test]
    fn mask_depth_threshold_is_256() {
        assert_eq!(MaskDepth::for_model_count(255), MaskDepth::Eight);
        assert_eq!(MaskDepth::for_model_count(256), MaskDepth::Sixteen);
        assert_eq!(MaskDepth::Eight.max_value(), 255);
        assert_eq!(MaskDepth::Sixteen.max_value(), 65535);
    }

    #[test]
    fn frame_file_stem_is_ten_digits() {
        assert_eq!(frame_file_stem(FrameIndex(0)), "0000000000");
        assert_eq!(frame_file_stem(FrameIndex(42)), "0000000042");
        assert_eq!(frame_file_stem(FrameIndex(1_048_573)), "0001048573");
    }
}
