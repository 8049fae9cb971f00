//! Packing rules: the five independent layout axes and their named presets.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

/// Graphics API family a layout is interpreted for.
///
/// Only used to pick default packing and to enable D3D-specific validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFamily {
    #[default]
    D3D,
    OpenGL,
    Vulkan,
}

impl ApiFamily {
    pub fn is_d3d(self) -> bool {
        matches!(self, Self::D3D)
    }

    /// Packing used when the format text doesn't select one.
    pub fn default_packing(self, cbuffer: bool) -> PackingPreset {
        match (self.is_d3d(), cbuffer) {
            (true, true) => PackingPreset::D3DConstantBuffer,
            (true, false) => PackingPreset::D3DUav,
            (false, true) => PackingPreset::Std140,
            (false, false) => PackingPreset::Std430,
        }
    }

    /// Most conservative preset the estimator starts narrowing from.
    pub fn strictest_packing(self) -> PackingPreset {
        if self.is_d3d() {
            PackingPreset::D3DConstantBuffer
        } else {
            PackingPreset::Std140
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "d3d" | "d3d11" | "d3d12" | "dx" | "hlsl" => Some(Self::D3D),
            "gl" | "opengl" | "gles" => Some(Self::OpenGL),
            "vk" | "vulkan" | "spirv" => Some(Self::Vulkan),
            _ => None,
        }
    }
}

/// A fixed combination of packing axes with a user-facing name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackingPreset {
    D3DConstantBuffer,
    D3DUav,
    Std140,
    Std430,
    C,
    Scalar,
}

impl PackingPreset {
    pub const ALL: [Self; 6] = [
        Self::D3DConstantBuffer,
        Self::D3DUav,
        Self::Std140,
        Self::Std430,
        Self::C,
        Self::Scalar,
    ];

    pub const fn rules(self) -> PackingRules {
        let none = PackingRules::NONE;
        match self {
            Self::D3DConstantBuffer => PackingRules {
                vector_align_component: true,
                trailing_overlap: true,
                ..none
            },
            Self::D3DUav | Self::C => PackingRules {
                vector_align_component: true,
                vector_straddle_16b: true,
                tight_arrays: true,
                ..none
            },
            Self::Std140 => none,
            Self::Std430 => PackingRules {
                tight_arrays: true,
                ..none
            },
            Self::Scalar => PackingRules {
                vector_align_component: true,
                vector_straddle_16b: true,
                tight_arrays: true,
                trailing_overlap: true,
                tight_bitfield_packing: true,
            },
        }
    }

    /// Name written in `#pack(...)`.
    pub fn name(self) -> &'static str {
        match self {
            Self::D3DConstantBuffer => "cbuffer",
            Self::D3DUav => "d3duav",
            Self::Std140 => "std140",
            Self::Std430 => "std430",
            Self::C => "c",
            Self::Scalar => "scalar",
        }
    }

    /// Resolves a preset name or one of its synonyms, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "cbuffer" | "d3dcbuffer" | "d3dcb" | "cb" => Some(Self::D3DConstantBuffer),
            "d3duav" | "uav" | "structured" => Some(Self::D3DUav),
            "std140" | "ubo" | "glsl" | "gl" => Some(Self::Std140),
            "std430" | "ssbo" => Some(Self::Std430),
            "c" => Some(Self::C),
            "scalar" => Some(Self::Scalar),
            _ => None,
        }
    }
}

/// One of the five independent packing axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PackingAxis {
    VectorAlignComponent,
    VectorStraddle16b,
    TightArrays,
    TrailingOverlap,
    TightBitfieldPacking,
}

impl PackingAxis {
    /// Ordered so that replaying the toggles never trips the straddle invariant.
    pub const ALL: [Self; 5] = [
        Self::VectorAlignComponent,
        Self::VectorStraddle16b,
        Self::TightArrays,
        Self::TrailingOverlap,
        Self::TightBitfieldPacking,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Self::VectorAlignComponent => "vector_align_component",
            Self::VectorStraddle16b => "vector_straddle_16b",
            Self::TightArrays => "tight_arrays",
            Self::TrailingOverlap => "trailing_overlap",
            Self::TightBitfieldPacking => "tight_bitfield_packing",
        }
    }

    /// Parses `axis` or `no_axis` into the axis and the value it sets.
    pub fn from_keyword(keyword: &str) -> Option<(Self, bool)> {
        let keyword = keyword.to_ascii_lowercase();
        let (name, value) = match keyword.strip_prefix("no_") {
            Some(rest) => (rest, false),
            None => (keyword.as_str(), true),
        };
        Self::ALL
            .into_iter()
            .find(|axis| axis.keyword() == name)
            .map(|axis| (axis, value))
    }

    fn explain(self, value: bool) -> &'static str {
        match (self, value) {
            (Self::VectorAlignComponent, true) => "vectors are aligned to their component size",
            (Self::VectorAlignComponent, false) => {
                "vectors are aligned to their full size, up to 16 bytes"
            }
            (Self::VectorStraddle16b, true) => "vectors may straddle a 16-byte boundary",
            (Self::VectorStraddle16b, false) => "vectors never straddle a 16-byte boundary",
            (Self::TightArrays, true) => "array elements and structs are tightly packed",
            (Self::TightArrays, false) => "array elements and structs are padded to 16 bytes",
            (Self::TrailingOverlap, true) => {
                "members may be placed in the trailing padding of a struct or array"
            }
            (Self::TrailingOverlap, false) => "trailing padding of structs and arrays is reserved",
            (Self::TightBitfieldPacking, true) => {
                "bitfields may straddle the boundary of their base type"
            }
            (Self::TightBitfieldPacking, false) => {
                "bitfields roll over to the next base type boundary"
            }
        }
    }
}

/// The five independent booleans that parameterize a memory layout.
///
/// `vector_straddle_16b` implies `vector_align_component`; [`PackingRules::with`]
/// keeps that invariant when toggling axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackingRules {
    pub vector_align_component: bool,
    pub vector_straddle_16b: bool,
    pub tight_arrays: bool,
    pub trailing_overlap: bool,
    pub tight_bitfield_packing: bool,
}

impl Default for PackingRules {
    fn default() -> Self {
        PackingPreset::Std140.rules()
    }
}

impl PackingRules {
    /// Every axis off. The same bit pattern as std140.
    pub const NONE: Self = Self {
        vector_align_component: false,
        vector_straddle_16b: false,
        tight_arrays: false,
        trailing_overlap: false,
        tight_bitfield_packing: false,
    };

    pub const fn preset(preset: PackingPreset) -> Self {
        preset.rules()
    }

    pub fn get(&self, axis: PackingAxis) -> bool {
        match axis {
            PackingAxis::VectorAlignComponent => self.vector_align_component,
            PackingAxis::VectorStraddle16b => self.vector_straddle_16b,
            PackingAxis::TightArrays => self.tight_arrays,
            PackingAxis::TrailingOverlap => self.trailing_overlap,
            PackingAxis::TightBitfieldPacking => self.tight_bitfield_packing,
        }
    }

    pub fn with(mut self, axis: PackingAxis, value: bool) -> Self {
        match axis {
            PackingAxis::VectorAlignComponent => {
                self.vector_align_component = value;
                if !value {
                    self.vector_straddle_16b = false;
                }
            }
            PackingAxis::VectorStraddle16b => {
                self.vector_straddle_16b = value;
                if value {
                    self.vector_align_component = true;
                }
            }
            PackingAxis::TightArrays => self.tight_arrays = value,
            PackingAxis::TrailingOverlap => self.trailing_overlap = value,
            PackingAxis::TightBitfieldPacking => self.tight_bitfield_packing = value,
        }
        self
    }

    /// Every axis set in either rule set.
    pub fn union(self, other: Self) -> Self {
        Self {
            vector_align_component: self.vector_align_component || other.vector_align_component,
            vector_straddle_16b: self.vector_straddle_16b || other.vector_straddle_16b,
            tight_arrays: self.tight_arrays || other.tight_arrays,
            trailing_overlap: self.trailing_overlap || other.trailing_overlap,
            tight_bitfield_packing: self.tight_bitfield_packing || other.tight_bitfield_packing,
        }
    }

    /// Whether every axis set here is also set in `other`.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        PackingAxis::ALL
            .into_iter()
            .all(|axis| !self.get(axis) || other.get(axis))
    }

    /// The preset these rules match exactly, if any.
    ///
    /// C and D3D UAV share a bit pattern; D3D sees it as `D3DUav`, everything else as `C`.
    pub fn matching_preset(&self, api: ApiFamily) -> Option<PackingPreset> {
        PackingPreset::ALL
            .into_iter()
            .filter(|preset| preset.rules() == *self)
            .find(|preset| match preset {
                PackingPreset::D3DUav => api.is_d3d(),
                PackingPreset::C => !api.is_d3d(),
                _ => true,
            })
    }

    /// Display name of the exactly matching preset.
    pub fn preset_name(&self, api: ApiFamily) -> Option<&'static str> {
        self.matching_preset(api).map(PackingPreset::name)
    }

    /// Renders the rules as `#pack` directives that parse back to exactly `self`.
    pub fn describe(&self, api: ApiFamily) -> String {
        if let Some(name) = self.preset_name(api) {
            return format!("#pack({name})\n");
        }

        let mut out = String::from("// custom packing rules\n");
        for axis in PackingAxis::ALL {
            let value = self.get(axis);
            let active = directive(axis, value);
            let inactive = directive(axis, !value);
            let _ = writeln!(out, "{:<36}// {}", active, axis.explain(value));
            let _ = writeln!(
                out,
                "{:<36}// {}",
                format!("// {inactive}"),
                axis.explain(!value)
            );
        }
        out
    }
}

fn directive(axis: PackingAxis, value: bool) -> String {
    if value {
        format!("#pack({})", axis.keyword())
    } else {
        format!("#pack(no_{})", axis.keyword())
    }
}
