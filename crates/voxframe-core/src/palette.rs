//! Palettes and the palette-provider seam.
//!
//! Palettes are owned outside the grid: voxels only carry a [`ColorIndex`].
//! Geometry code consumes nothing but the alpha channel, reduced to a boolean
//! transparency flag (`alpha < 1.0`).

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::types::ColorIndex;

/// Index of a palette inside a [`PaletteProvider`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PaletteIndex(pub u32);

impl PaletteIndex {
    /// Index as a `usize`, for slice lookups.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// One palette entry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaletteColor {
    /// Linear RGBA color
    pub color: Vec4,
    /// Emissive intensity multiplier
    pub emissive_intensity: f32,
    /// Metallic (0.0 = dielectric, 1.0 = metal)
    pub metallic: f32,
    /// Smoothness (0.0 = rough, 1.0 = mirror)
    pub smoothness: f32,
}

impl Default for PaletteColor {
    fn default() -> Self {
        Self {
            color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            emissive_intensity: 0.0,
            metallic: 0.0,
            smoothness: 1.0,
        }
    }
}

impl PaletteColor {
    /// Plain color with default material parameters
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            color: Vec4::new(r, g, b, a),
            ..Default::default()
        }
    }

    /// Set the emissive intensity.
    pub fn with_emissive(mut self, intensity: f32) -> Self {
        self.emissive_intensity = intensity;
        self
    }

    /// Set metallic and smoothness.
    pub fn with_surface(mut self, metallic: f32, smoothness: f32) -> Self {
        self.metallic = metallic;
        self.smoothness = smoothness;
        self
    }

    /// Returns true if the color lets light through (`alpha < 1.0`)
    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.color.w < 1.0
    }
}

/// A named, ordered list of colors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    /// Display name, unique inside a [`PaletteSet`]
    pub name: String,
    /// Colors addressed by [`ColorIndex`]
    pub colors: Vec<PaletteColor>,
}

impl Palette {
    /// Create a palette
    pub fn new(name: impl Into<String>, colors: Vec<PaletteColor>) -> Self {
        Self {
            name: name.into(),
            colors,
        }
    }

    /// Number of colors
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns true if the palette has no colors
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Look up a color
    #[inline]
    pub fn get(&self, index: ColorIndex) -> Option<&PaletteColor> {
        self.colors.get(index.as_usize())
    }

    /// Returns true if `index` addresses a color of this palette
    #[inline]
    pub fn contains(&self, index: ColorIndex) -> bool {
        index.as_usize() < self.colors.len()
    }

    /// Boolean transparency table for this palette
    pub fn transparency_mask(&self) -> TransparencyMask {
        TransparencyMask(self.colors.iter().map(PaletteColor::is_transparent).collect())
    }
}

/// Ordered collection of palettes shared by every edited object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PaletteSet {
    palettes: Vec<Palette>,
}

impl PaletteSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a palette; returns false if a palette with the same name is present.
    pub fn add(&mut self, palette: Palette) -> bool {
        if self.palettes.iter().any(|p| p.name == palette.name) {
            return false;
        }
        self.palettes.push(palette);
        true
    }

    /// Remove and return the palette at `index`.
    pub fn remove(&mut self, index: PaletteIndex) -> Option<Palette> {
        (index.as_usize() < self.palettes.len()).then(|| self.palettes.remove(index.as_usize()))
    }

    /// Replace the palette at `index`; returns false if out of range.
    pub fn replace(&mut self, index: PaletteIndex, palette: Palette) -> bool {
        match self.palettes.get_mut(index.as_usize()) {
            Some(slot) => {
                *slot = palette;
                true
            }
            None => false,
        }
    }

    /// Number of palettes
    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    /// Returns true if the set has no palettes
    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    /// Palette names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.palettes.iter().map(|p| p.name.as_str())
    }

    /// All palettes in order
    pub fn palettes(&self) -> &[Palette] {
        &self.palettes
    }
}

impl FromIterator<Palette> for PaletteSet {
    fn from_iter<I: IntoIterator<Item = Palette>>(iter: I) -> Self {
        let mut set = Self::new();
        for palette in iter {
            set.add(palette);
        }
        set
    }
}

/// Source of palettes, passed explicitly to whoever needs colors.
pub trait PaletteProvider {
    /// Look up a palette
    fn palette(&self, index: PaletteIndex) -> Option<&Palette>;

    /// Look up one color of one palette
    fn color(&self, palette: PaletteIndex, color: ColorIndex) -> Option<&PaletteColor> {
        self.palette(palette).and_then(|p| p.get(color))
    }

    /// Transparency table of a palette
    fn transparency(&self, palette: PaletteIndex) -> Option<TransparencyMask> {
        self.palette(palette).map(Palette::transparency_mask)
    }
}

impl PaletteProvider for PaletteSet {
    fn palette(&self, index: PaletteIndex) -> Option<&Palette> {
        self.palettes.get(index.as_usize())
    }
}

impl PaletteProvider for Palette {
    /// A lone palette answers to index 0 only.
    fn palette(&self, index: PaletteIndex) -> Option<&Palette> {
        (index.0 == 0).then_some(self)
    }
}

/// Color-index → transparent lookup used by face culling.
pub trait Transparency {
    /// Returns true if voxels of this color are see-through
    fn is_transparent(&self, color: ColorIndex) -> bool;
}

/// Precomputed transparency flags indexed by color. Unknown colors are opaque.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransparencyMask(pub Vec<bool>);

impl TransparencyMask {
    /// Mask where every color is opaque
    pub fn opaque() -> Self {
        Self(Vec::new())
    }
}

impl Transparency for TransparencyMask {
    #[inline]
    fn is_transparent(&self, color: ColorIndex) -> bool {
        self.0.as_slice().is_transparent(color)
    }
}

impl Transparency for [bool] {
    #[inline]
    fn is_transparent(&self, color: ColorIndex) -> bool {
        self.get(color.as_usize()).copied().unwrap_or(false)
    }
}

impl Transparency for Palette {
    #[inline]
    fn is_transparent(&self, color: ColorIndex) -> bool {
        self.get(color).is_some_and(PaletteColor::is_transparent)
    }
}
