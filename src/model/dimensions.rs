//! Measured dimensions of the viewport and the sheet's regions.

use serde::{Deserialize, Serialize};

/// One of the three measured regions of the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// Header above the scrollable content.
    Header,
    /// Scrollable content.
    Content,
    /// Footer below the scrollable content.
    Footer,
}

impl Region {
    /// All regions in layout order.
    pub const ALL: [Region; 3] = [Region::Header, Region::Content, Region::Footer];
}

/// Snapshot of every dimension snap-point resolution depends on.
///
/// All values are non-negative. `max_height` is the caller-controlled override
/// when one is set, otherwise the viewport height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DimensionSnapshot {
    /// Height of the viewport.
    pub viewport_height: f64,
    /// Border-box height of the header region.
    pub header_height: f64,
    /// Border-box height of the content region.
    pub content_height: f64,
    /// Border-box height of the footer region.
    pub footer_height: f64,
    /// Tallest the sheet may ever be.
    pub max_height: f64,
}

impl DimensionSnapshot {
    /// Snapshot with the given viewport and regions, `max_height` following the viewport.
    pub fn new(viewport_height: f64, header: f64, content: f64, footer: f64) -> Self {
        Self {
            viewport_height: sanitize(viewport_height),
            header_height: sanitize(header),
            content_height: sanitize(content),
            footer_height: sanitize(footer),
            max_height: sanitize(viewport_height),
        }
    }

    /// Replace `max_height` with a controlled override.
    pub fn with_max_height(mut self, max_height: f64) -> Self {
        self.max_height = sanitize(max_height);
        self
    }

    /// Whether the content region has been measured yet.
    ///
    /// Until it has, snap-point resolution short-circuits to `[0]`.
    pub fn is_measured(&self) -> bool {
        self.content_height > 0.0
    }

    /// Smallest height that still shows the header and footer.
    pub fn min_content(&self) -> f64 {
        self.header_height + self.footer_height
    }

    /// Height that shows all content without scrolling, capped at `max_height`.
    pub fn max_content(&self) -> f64 {
        (self.header_height + self.content_height + self.footer_height).min(self.max_height)
    }

    /// Height of a single region.
    pub fn region(&self, region: Region) -> f64 {
        match region {
            Region::Header => self.header_height,
            Region::Content => self.content_height,
            Region::Footer => self.footer_height,
        }
    }

    /// Set a single region's height.
    pub fn set_region(&mut self, region: Region, height: f64) {
        let height = sanitize(height);
        match region {
            Region::Header => self.header_height = height,
            Region::Content => self.content_height = height,
            Region::Footer => self.footer_height = height,
        }
    }
}

/// Negative and non-finite measurements are treated as zero.
fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
