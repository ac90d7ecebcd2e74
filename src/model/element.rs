//! Element - an axial bar, cable or strut between two nodes

use serde::{Deserialize, Serialize};

/// Modeling hint for which side of the stress-strain curve is physically
/// permitted. The solvers only look at the `(compression, tension)` property
/// pairs; the tag is carried for the host's bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    /// Carries both tension and compression
    Bar,
    /// Tension-only
    Cable,
    /// Compression-only
    Strut,
}

/// A `(compression, tension)` scalar pair, used for both cross-section area
/// (mm²) and elastic modulus (MPa). The MPa·mm² product is a force in N, so
/// axial rigidities combine without unit conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideValues {
    /// Value active while the element is in compression
    pub compression: f64,
    /// Value active while the element is in tension
    pub tension: f64,
}

impl SideValues {
    /// Same value on both sides
    pub fn symmetric(value: f64) -> Self {
        Self {
            compression: value,
            tension: value,
        }
    }

    /// Active in tension only (slack in compression)
    pub fn tension_only(value: f64) -> Self {
        Self {
            compression: 0.0,
            tension: value,
        }
    }

    /// Active in compression only
    pub fn compression_only(value: f64) -> Self {
        Self {
            compression: value,
            tension: 0.0,
        }
    }

    /// Side selected by the sign of the current tension
    /// (tension >= 0 selects the tension side)
    pub fn active(&self, tension: f64) -> f64 {
        if tension >= 0.0 {
            self.tension
        } else {
            self.compression
        }
    }
}

/// An axial element referencing two node indices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Start node index
    pub end_a: usize,
    /// End node index
    pub end_b: usize,
    /// Modeling hint
    pub kind: ElementKind,
    /// Cross-section area pair (mm²)
    pub area: SideValues,
    /// Elastic modulus pair (MPa)
    pub modulus: SideValues,
    /// Unstressed length (m). Zero means "use the as-built chord length",
    /// resolved when the structure is assembled.
    pub free_length: f64,
    /// Current axial force (N), positive in tension
    pub tension: f64,
}

impl Element {
    /// Create a bar carrying both tension and compression
    pub fn bar(end_a: usize, end_b: usize, area: f64, modulus: f64) -> Self {
        Self {
            end_a,
            end_b,
            kind: ElementKind::Bar,
            area: SideValues::symmetric(area),
            modulus: SideValues::symmetric(modulus),
            free_length: 0.0,
            tension: 0.0,
        }
    }

    /// Create a tension-only cable
    pub fn cable(end_a: usize, end_b: usize, area: f64, modulus: f64) -> Self {
        Self {
            end_a,
            end_b,
            kind: ElementKind::Cable,
            area: SideValues::tension_only(area),
            modulus: SideValues::tension_only(modulus),
            free_length: 0.0,
            tension: 0.0,
        }
    }

    /// Create a compression-only strut
    pub fn strut(end_a: usize, end_b: usize, area: f64, modulus: f64) -> Self {
        Self {
            end_a,
            end_b,
            kind: ElementKind::Strut,
            area: SideValues::compression_only(area),
            modulus: SideValues::compression_only(modulus),
            free_length: 0.0,
            tension: 0.0,
        }
    }

    /// Set the unstressed length explicitly (m)
    pub fn with_free_length(mut self, free_length: f64) -> Self {
        self.free_length = free_length;
        self
    }

    /// Set the initial axial force (N)
    pub fn with_tension(mut self, tension: f64) -> Self {
        self.tension = tension;
        self
    }

    /// Set an asymmetric property pair explicitly
    pub fn with_sides(mut self, area: SideValues, modulus: SideValues) -> Self {
        self.area = area;
        self.modulus = modulus;
        self
    }

    /// Active axial rigidity E·A (N), selected by the sign of the current tension
    pub fn axial_rigidity(&self) -> f64 {
        self.modulus.active(self.tension) * self.area.active(self.tension)
    }

    /// Axial flexibility free_length / (E·A) (m/N). A zero active rigidity
    /// (slack cable, unloaded strut) yields infinite flexibility, which
    /// contributes zero stiffness; no division by zero can occur.
    pub fn flexibility(&self) -> f64 {
        let ea = self.axial_rigidity();
        if ea > 0.0 {
            self.free_length / ea
        } else {
            f64::INFINITY
        }
    }
}
