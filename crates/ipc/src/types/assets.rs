//! Catalog of placeable assets offered by the wizard editor.

use serde::{Deserialize, Serialize};

const TREE_URL: &str =
    "https://vazxmixjsiawhamofees.supabase.co/storage/v1/object/public/models/tree-spruce/model.gltf";
const BENCH_URL: &str =
    "https://vazxmixjsiawhamofees.supabase.co/storage/v1/object/public/models/bench-2/model.gltf";
const LAMP_URL: &str =
    "https://vazxmixjsiawhamofees.supabase.co/storage/v1/object/public/models/lamp-post/model.gltf";

/// Assets the wizard can drop into the shared scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    Tree,
    Bench,
    Lamp,
}

impl AssetKind {
    /// All catalog entries, in menu order
    pub fn all() -> &'static [AssetKind] {
        &[AssetKind::Tree, AssetKind::Bench, AssetKind::Lamp]
    }

    /// Display name for menus
    pub fn display_name(&self) -> &'static str {
        match self {
            AssetKind::Tree => "Tree",
            AssetKind::Bench => "Bench",
            AssetKind::Lamp => "Lamp",
        }
    }

    /// Asset reference stored on scene objects
    pub fn asset_ref(&self) -> &'static str {
        match self {
            AssetKind::Tree => TREE_URL,
            AssetKind::Bench => BENCH_URL,
            AssetKind::Lamp => LAMP_URL,
        }
    }

    /// Render-time scale multiplier so the source models come out at a sensible size
    pub fn render_scale(&self) -> f32 {
        match self {
            AssetKind::Tree => 0.1,
            AssetKind::Bench | AssetKind::Lamp => 1.0,
        }
    }

    /// Reverse lookup from an asset reference
    pub fn from_asset_ref(asset_ref: &str) -> Option<Self> {
        Self::all().iter().copied().find(|a| a.asset_ref() == asset_ref)
    }
}

/// Render scale for an arbitrary asset reference (1.0 for anything outside the catalog)
pub fn render_scale_for(asset_ref: &str) -> f32 {
    AssetKind::from_asset_ref(asset_ref)
        .map(|a| a.render_scale())
        .unwrap_or(1.0)
}
