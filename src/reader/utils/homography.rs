use crate::common::error::{QRError, QRResult};

use super::geometry::Point;

// Projective map from module space onto the image
//------------------------------------------------------------------------------

// Row major 3x3 matrix with the last coefficient fixed to 1
#[derive(Debug, PartialEq, Clone)]
pub struct Homography(pub [f64; 8]);

impl Homography {
    /// Solves for the map sending `src[i]` to `dst[i]`.
    pub fn compute(src: [Point; 4], dst: [Point; 4]) -> QRResult<Self> {
        // Two equations per correspondence, right hand side in the last column
        let mut sys = [[0.0_f64; 9]; 8];
        for (i, (s, d)) in src.iter().zip(&dst).enumerate() {
            sys[2 * i] = [s.x, s.y, 1.0, 0.0, 0.0, 0.0, -d.x * s.x, -d.x * s.y, d.x];
            sys[2 * i + 1] = [0.0, 0.0, 0.0, s.x, s.y, 1.0, -d.y * s.x, -d.y * s.y, d.y];
        }
        gauss_jordan(&mut sys)?;
        Ok(Self(sys.map(|row| row[8])))
    }

    pub fn map(&self, x: f64, y: f64) -> QRResult<Point> {
        let [a, b, c, d, e, f, g, h] = self.0;
        let w = g * x + h * y + 1.0;
        if w.abs() <= f64::EPSILON {
            return Err(QRError::PointAtInfinity);
        }
        Ok(Point::new((a * x + b * y + c) / w, (d * x + e * y + f) / w))
    }
}

// Reduces an augmented system to identity in place, picking the largest pivot per column
fn gauss_jordan(sys: &mut [[f64; 9]; 8]) -> QRResult<()> {
    for col in 0..8 {
        let best = (col..8)
            .max_by(|&r, &s| sys[r][col].abs().total_cmp(&sys[s][col].abs()))
            .unwrap_or(col);
        sys.swap(col, best);

        let pivot = sys[col][col];
        if pivot.abs() < f64::EPSILON {
            return Err(QRError::SingularMatrix);
        }
        sys[col].iter_mut().for_each(|v| *v /= pivot);

        let pivot_row = sys[col];
        for (r, row) in sys.iter_mut().enumerate() {
            let factor = row[col];
            if r == col || factor == 0.0 {
                continue;
            }
            row.iter_mut().zip(&pivot_row).for_each(|(v, p)| *v -= factor * p);
        }
    }
    Ok(())
}
