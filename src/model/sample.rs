//! Raw input records as produced by format readers.

use crate::model::types::{NO_PARENT, Point, SectionType};

/// One raw point record of an input file.
///
/// Samples are transient: the builder consumes them and only keeps their
/// positions and diameters in the property store.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Id as written in the file
    pub id: u32,
    pub section_type: SectionType,
    pub point: Point,
    /// Diameter (twice the radius written in SWC files)
    pub diameter: f32,
    /// Id of the parent sample, [NO_PARENT] for none
    pub parent_id: i32,
    /// 1-based line of the record, 0 if unknown
    pub line_number: usize,
}

impl Sample {
    /// Creates a sample without line information.
    pub fn new(id: u32, section_type: SectionType, point: Point, diameter: f32, parent_id: i32) -> Self {
        Self {
            id,
            section_type,
            point,
            diameter,
            parent_id,
            line_number: 0,
        }
    }

    /// Attaches the line the sample was read from.
    pub fn with_line(mut self, line_number: usize) -> Self {
        self.line_number = line_number;
        self
    }

    /// Returns `true` if the sample declares no parent.
    pub fn has_no_parent(&self) -> bool {
        self.parent_id == NO_PARENT
    }

    pub fn is_soma(&self) -> bool {
        self.section_type == SectionType::Soma
    }
}
