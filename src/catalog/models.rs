use serde::{Deserialize, Serialize};

/// Icon used when `APP_{TYPE}_ICON` is not set
pub const DEFAULT_ICON: &str = "📱";

/// Color token used when `APP_{TYPE}_COLOR` is not set
pub const DEFAULT_COLOR: &str = "from-gray-500 to-gray-600";

/// An application the launcher knows how to open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDescriptor {
    /// Stable identifier, the lower-cased application type (e.g. "travel")
    pub id: String,
    /// Identifier of the application in Frontegg
    pub app_id: String,
    /// Display name
    pub name: String,
    pub description: String,
    /// Launch URL, opened in a new tab
    pub url: String,
    /// Icon glyph (usually an emoji)
    pub icon: String,
    /// Gradient color token for the tile icon
    pub color: String,
}
