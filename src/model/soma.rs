//! The cell body, kept outside the section numbering.

use crate::model::types::{Point, SomaType};

/// Soma points and diameters of a morphology.
///
/// Empty when the input had no soma samples.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Soma {
    soma_type: SomaType,
    points: Vec<Point>,
    diameters: Vec<f32>,
}

impl Soma {
    /// Creates a soma; `points` and `diameters` must have equal length.
    pub(crate) fn new(soma_type: SomaType, points: Vec<Point>, diameters: Vec<f32>) -> Self {
        debug_assert_eq!(points.len(), diameters.len());
        Self {
            soma_type,
            points,
            diameters,
        }
    }

    pub fn soma_type(&self) -> SomaType {
        self.soma_type
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn diameters(&self) -> &[f32] {
        &self.diameters
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let soma = Soma::new(SomaType::SinglePoint, vec![[2.0, 3.0, 4.0]], vec![6.0]);
        assert_eq!(soma.soma_type(), SomaType::SinglePoint);
        assert_eq!(soma.points(), &[[2.0, 3.0, 4.0]]);
        assert_eq!(soma.diameters(), &[6.0]);
        assert!(!soma.is_empty());
    }

    #[test]
    fn test_default_is_empty() {
        let soma = Soma::default();
        assert!(soma.is_empty());
        assert_eq!(soma.soma_type(), SomaType::Undefined);
    }
}
