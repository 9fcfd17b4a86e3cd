/// Piecewise linear interpolant over strictly increasing knots.
///
/// Queries outside the knot range are clamped to the first/last value.
#[derive(Debug, Clone)]
pub(crate) struct LinearInterpolant {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl LinearInterpolant {
    /// Returns `None` when fewer than two knots are given or the knots are not
    /// strictly increasing.
    pub(crate) fn new(points: &[(f64, f64)]) -> Option<Self> {
        if points.len() < 2 || points.windows(2).any(|w| w[1].0 <= w[0].0) {
            return None;
        }
        let (xs, ys) = points.iter().copied().unzip();
        Some(Self { xs, ys })
    }

    pub(crate) fn at(&self, x: f64) -> f64 {
        // first knot strictly greater than x
        let upper = self.xs.partition_point(|&knot| knot <= x);
        if upper == 0 {
            return self.ys[0];
        }
        if upper == self.xs.len() {
            return self.ys[self.ys.len() - 1];
        }
        let (x0, x1) = (self.xs[upper - 1], self.xs[upper]);
        let (y0, y1) = (self.ys[upper - 1], self.ys[upper]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_short_or_unsorted_knots() {
        assert!(LinearInterpolant::new(&[(0., 0.)]).is_none());
        assert!(LinearInterpolant::new(&[(0., 0.), (0., 1.)]).is_none());
        assert!(LinearInterpolant::new(&[(1., 0.), (0., 1.)]).is_none());
    }

    #[test]
    fn test_interpolates_between_knots() {
        let curve = LinearInterpolant::new(&[(0., 0.), (10., 100.), (20., 150.)]).unwrap();
        assert_eq!(curve.at(0.), 0.);
        assert_eq!(curve.at(5.), 50.);
        assert_eq!(curve.at(10.), 100.);
        assert_eq!(curve.at(15.), 125.);
        assert_eq!(curve.at(20.), 150.);
    }

    #[test]
    fn test_clamps_outside_domain() {
        let curve = LinearInterpolant::new(&[(0., 3.), (1., 4.)]).unwrap();
        assert_eq!(curve.at(-2.), 3.);
        assert_eq!(curve.at(7.), 4.);
    }
}
