//! Basic value types shared by the neuronal model.

/// A 3D position.
pub type Point = [f32; 3];

/// Index of a section in a morphology's property store.
pub type SectionId = u32;

/// Parent id marking "no parent", both for samples and sections.
pub const NO_PARENT: i32 = -1;

/// First and last code usable for custom section types.
const CUSTOM_TYPE_RANGE: std::ops::RangeInclusive<i32> = 5..=19;

// =#========================================================================#=
// SECTION TYPE
// =#========================================================================$=
/// Structural type of a sample or section, using SWC type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionType {
    Undefined,
    Soma,
    Axon,
    BasalDendrite,
    ApicalDendrite,
    /// Custom type with code in `5..=19`
    Custom(u8),
}

impl SectionType {
    /// Maps an SWC type code onto a section type.
    ///
    /// # Returns
    /// `None` for negative codes and codes above the custom range.
    ///
    /// # Example
    /// ```
    /// use neuromorph::model::SectionType;
    ///
    /// assert_eq!(SectionType::from_code(3), Some(SectionType::BasalDendrite));
    /// assert_eq!(SectionType::from_code(7), Some(SectionType::Custom(7)));
    /// assert_eq!(SectionType::from_code(42), None);
    /// ```
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(SectionType::Undefined),
            1 => Some(SectionType::Soma),
            2 => Some(SectionType::Axon),
            3 => Some(SectionType::BasalDendrite),
            4 => Some(SectionType::ApicalDendrite),
            c if CUSTOM_TYPE_RANGE.contains(&c) => Some(SectionType::Custom(c as u8)),
            _ => None,
        }
    }

    /// Returns the SWC type code.
    pub fn code(self) -> i32 {
        match self {
            SectionType::Undefined => 0,
            SectionType::Soma => 1,
            SectionType::Axon => 2,
            SectionType::BasalDendrite => 3,
            SectionType::ApicalDendrite => 4,
            SectionType::Custom(c) => i32::from(c),
        }
    }
}

// =#========================================================================#=
// SOMA TYPE
// =#========================================================================$=
/// Shape of the soma, also used as the soma handling policy a reader hands
/// to the builder.
///
/// | Policy | Handling of soma samples |
/// |--------|--------------------------|
/// | `Undefined` | rejected |
/// | `SinglePoint` | kept as-is |
/// | `Cylinders` | kept as-is |
/// | `Contour` | averaged into one representative point |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SomaType {
    #[default]
    Undefined,
    SinglePoint,
    Cylinders,
    Contour,
}

/// Returns `true` if the two positions are exactly equal.
pub(crate) fn same_position(a: &Point, b: &Point) -> bool {
    a[0] == b[0] && a[1] == b[1] && a[2] == b[2]
}

/// Euclidean distance between two positions.
pub(crate) fn distance(a: &Point, b: &Point) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}
