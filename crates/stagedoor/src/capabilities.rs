//! Layer capability negotiation
//!
//! At session-open time the platform offers a capability set (pixel
//! formats, foveation support, view layouts). [`negotiate`] selects the
//! layer configuration from that offer: a pure, stateless function that
//! runs exactly once per session open.
//!
//! Selection rules:
//! - depth format: highest precision offered
//! - color format: the standard display-referred sRGB-encoded format
//! - foveation: requested whenever the platform supports it
//! - layout: layered views when offered (under foveation when foveation
//!   was requested), else one surface per view

use serde::{Deserialize, Serialize};

/// Depth attachment formats, by rising precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthFormat {
    Depth16Unorm,
    Depth24UnormStencil8,
    Depth32Float,
}

impl DepthFormat {
    /// Depth precision in bits, the negotiation sort key
    pub fn precision_bits(&self) -> u8 {
        match self {
            DepthFormat::Depth16Unorm => 16,
            DepthFormat::Depth24UnormStencil8 => 24,
            DepthFormat::Depth32Float => 32,
        }
    }
}

/// Color attachment formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorFormat {
    Rgba8Unorm,
    Bgra8Unorm,
    Rgba8UnormSrgb,
    Bgra8UnormSrgb,
    Rgba16Float,
}

impl ColorFormat {
    /// Whether the format is display-referred sRGB-encoded
    pub fn is_srgb_encoded(&self) -> bool {
        matches!(
            self,
            ColorFormat::Rgba8UnormSrgb | ColorFormat::Bgra8UnormSrgb
        )
    }
}

/// How per-eye views map onto render surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewLayout {
    /// One surface per view
    Dedicated,
    /// All views as slices of one layered surface
    Layered,
}

/// Capability set offered by the platform at session-open time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerCapabilities {
    pub depth_formats: Vec<DepthFormat>,
    pub color_formats: Vec<ColorFormat>,
    pub supports_foveation: bool,
    /// Layouts offered without foveation
    pub layouts: Vec<ViewLayout>,
    /// Layouts offered when foveation is requested
    pub layouts_foveated: Vec<ViewLayout>,
}

impl LayerCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_depth_format(mut self, format: DepthFormat) -> Self {
        self.depth_formats.push(format);
        self
    }

    pub fn with_color_format(mut self, format: ColorFormat) -> Self {
        self.color_formats.push(format);
        self
    }

    pub fn with_foveation(mut self, supported: bool) -> Self {
        self.supports_foveation = supported;
        self
    }

    pub fn with_layout(mut self, layout: ViewLayout) -> Self {
        self.layouts.push(layout);
        self
    }

    pub fn with_foveated_layout(mut self, layout: ViewLayout) -> Self {
        self.layouts_foveated.push(layout);
        self
    }

    /// Layouts offered for the given foveation choice
    pub fn supported_layouts(&self, foveated: bool) -> &[ViewLayout] {
        if foveated {
            &self.layouts_foveated
        } else {
            &self.layouts
        }
    }
}

/// The configuration selected from an offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerConfiguration {
    pub depth_format: DepthFormat,
    pub color_format: ColorFormat,
    pub foveation_enabled: bool,
    pub layout: ViewLayout,
}

/// Error raised when an offer cannot satisfy the contract
#[derive(Debug, Clone, thiserror::Error)]
pub enum CapabilityError {
    #[error("platform offered no depth format")]
    NoDepthFormat,
    #[error("platform offered no sRGB-encoded color format")]
    NoSrgbColorFormat,
}

/// Select a layer configuration from a platform offer
pub fn negotiate(caps: &LayerCapabilities) -> Result<LayerConfiguration, CapabilityError> {
    let depth_format = caps
        .depth_formats
        .iter()
        .copied()
        .max_by_key(DepthFormat::precision_bits)
        .ok_or(CapabilityError::NoDepthFormat)?;

    let color_format = [ColorFormat::Bgra8UnormSrgb, ColorFormat::Rgba8UnormSrgb]
        .into_iter()
        .find(|f| caps.color_formats.contains(f))
        .ok_or(CapabilityError::NoSrgbColorFormat)?;

    let foveation_enabled = caps.supports_foveation;
    let layout = if caps
        .supported_layouts(foveation_enabled)
        .contains(&ViewLayout::Layered)
    {
        ViewLayout::Layered
    } else {
        ViewLayout::Dedicated
    };

    Ok(LayerConfiguration {
        depth_format,
        color_format,
        foveation_enabled,
        layout,
    })
}
