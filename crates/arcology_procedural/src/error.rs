//! # Procedural Error Types
//!
//! Configuration errors only. Expected absences (no path, unplaced
//! furniture, fewer Voronoi cells) are reported through return values.

use thiserror::Error;

/// Errors raised when a generator is given an invalid configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProceduralError {
    /// Width or height is zero, negative, or not finite.
    #[error("invalid dimensions: {width} x {height}")]
    InvalidDimensions {
        /// Requested width
        width: f64,
        /// Requested height
        height: f64,
    },

    /// A partition was asked for fewer than one cell.
    #[error("invalid cell count: {0} (must be at least 1)")]
    InvalidCellCount(usize),

    /// A numeric parameter is outside its legal range.
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// A region is smaller than the minimum size its partitioner needs.
    #[error("region {width} x {height} is smaller than the minimum {minimum}")]
    RegionTooSmall {
        /// Region width
        width: f64,
        /// Region height
        height: f64,
        /// Minimum side length
        minimum: f64,
    },

    /// The padded area left for seed points is empty.
    #[error("boundary padding {padding} leaves no room in {width} x {height}")]
    PaddingTooLarge {
        /// Boundary padding
        padding: f64,
        /// Area width
        width: f64,
        /// Area height
        height: f64,
    },

    /// A room template references furniture that does not exist.
    #[error("template `{template}` references unknown furniture `{furniture}`")]
    UnknownFurniture {
        /// Template name
        template: String,
        /// Furniture id
        furniture: String,
    },
}

/// Result type for procedural operations.
pub type ProceduralResult<T> = Result<T, ProceduralError>;

/// Checks that a width/height pair describes a non-empty area.
pub(crate) fn check_dimensions(width: f64, height: f64) -> ProceduralResult<()> {
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Ok(())
    } else {
        Err(ProceduralError::InvalidDimensions { width, height })
    }
}

/// Checks that `value` is finite and strictly positive.
pub(crate) fn check_positive(name: &'static str, value: f64) -> ProceduralResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ProceduralError::InvalidParameter { name, value })
    }
}

/// Checks that `value` lies in `[0, 1]`.
pub(crate) fn check_unit(name: &'static str, value: f64) -> ProceduralResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ProceduralError::InvalidParameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_checks() {
        assert!(check_dimensions(10.0, 10.0).is_ok());
        assert_eq!(
            check_dimensions(0.0, 10.0),
            Err(ProceduralError::InvalidDimensions { width: 0.0, height: 10.0 })
        );
        assert!(check_dimensions(f64::NAN, 10.0).is_err());
        assert!(check_dimensions(10.0, -1.0).is_err());
    }

    #[test]
    fn test_error_messages_name_the_value() {
        let err = ProceduralError::InvalidParameter { name: "radius", value: -2.0 };
        assert_eq!(err.to_string(), "invalid parameter `radius`: -2");
        assert!(check_unit("probability", 1.5).is_err());
        assert!(check_positive("scale", 0.0).is_err());
    }
}
