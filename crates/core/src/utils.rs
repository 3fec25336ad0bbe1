//! Geometry helpers shared by the margin model, detector and filters.
//!
//! Provides:
//! - The `Rect` tuple type in PDF user space (points, y grows upward)
//! - The `HasBBox` accessor trait
//! - Millimetre/point conversion

/// Points per millimetre (72 pt per inch, 25.4 mm per inch).
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// Small epsilon for floating-point comparisons in tests and helpers.
pub const EPSILON: f64 = 1e-9;

/// A rectangle defined by (x0, y0, x1, y1) where (x0, y0) is the bottom-left
/// and (x1, y1) the top-right corner.
pub type Rect = (f64, f64, f64, f64);

/// Compares two floats for approximate equality.
#[inline]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Converts millimetres to points.
#[inline]
pub fn mm_to_pt(mm: f64) -> f64 {
    mm * PT_PER_MM
}

/// Returns the rectangle with its corners ordered so that x0 <= x1 and y0 <= y1.
pub fn normalize_rect(rect: Rect) -> Rect {
    let (x0, y0, x1, y1) = rect;
    (x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
}

/// True when every coordinate is a finite number.
pub fn rect_is_finite(rect: Rect) -> bool {
    let (x0, y0, x1, y1) = rect;
    x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()
}

/// True when `inner` lies within `outer`, bounds inclusive.
pub fn rect_contains(outer: Rect, inner: Rect) -> bool {
    outer.0 <= inner.0 && outer.1 <= inner.1 && inner.2 <= outer.2 && inner.3 <= outer.3
}

pub trait HasBBox {
    fn x0(&self) -> f64;
    fn y0(&self) -> f64;
    fn x1(&self) -> f64;
    fn y1(&self) -> f64;

    fn bbox(&self) -> Rect {
        (self.x0(), self.y0(), self.x1(), self.y1())
    }

    fn width(&self) -> f64 {
        self.x1() - self.x0()
    }

    fn height(&self) -> f64 {
        self.y1() - self.y0()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_millimetres_in_points() {
        assert!(approx_eq(mm_to_pt(10.0), 28.346_456_692_913_385, 1e-12));
        assert!(approx_eq(mm_to_pt(25.4), 72.0, EPSILON));
    }

    #[test]
    fn containment_is_inclusive() {
        let outer = (10.0, 10.0, 100.0, 50.0);
        assert!(rect_contains(outer, outer));
        assert!(rect_contains(outer, (10.0, 20.0, 100.0, 30.0)));
        assert!(!rect_contains(outer, (10.0, 20.0, 100.5, 30.0)));
        assert!(!rect_contains(outer, (9.9, 20.0, 50.0, 30.0)));
    }

    #[test]
    fn normalize_swaps_inverted_corners() {
        assert_eq!(normalize_rect((5.0, 8.0, 1.0, 2.0)), (1.0, 2.0, 5.0, 8.0));
    }

    #[test]
    fn finite_check_rejects_nan() {
        assert!(rect_is_finite((0.0, 0.0, 1.0, 1.0)));
        assert!(!rect_is_finite((0.0, f64::NAN, 1.0, 1.0)));
        assert!(!rect_is_finite((0.0, 0.0, f64::INFINITY, 1.0)));
    }
}
