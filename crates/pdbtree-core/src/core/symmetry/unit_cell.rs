use super::SymmetryError;
use nalgebra::Matrix3;

fn valid_angle(angle: f64) -> bool {
    angle > 0.0 && angle < 180.0
}

/// Unit cell parameters: edge lengths in Angstroms and angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitCell {
    a: f64,
    b: f64,
    c: f64,
    alpha: f64,
    beta: f64,
    gamma: f64,
}

impl UnitCell {
    pub fn new(
        a: f64,
        b: f64,
        c: f64,
        alpha: f64,
        beta: f64,
        gamma: f64,
    ) -> Result<Self, SymmetryError> {
        let parameters = [a, b, c, alpha, beta, gamma];
        if !(a > 0.0 && b > 0.0 && c > 0.0) {
            return Err(SymmetryError::InvalidUnitCell {
                parameters,
                reason: "cell lengths must be positive",
            });
        }
        if !(valid_angle(alpha) && valid_angle(beta) && valid_angle(gamma)) {
            return Err(SymmetryError::InvalidUnitCell {
                parameters,
                reason: "cell angles must be within (0, 180)",
            });
        }
        let cell = Self {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
        };
        if cell.volume_factor() <= 0.0 {
            return Err(SymmetryError::InvalidUnitCell {
                parameters,
                reason: "cell angles do not describe a parallelepiped",
            });
        }
        Ok(cell)
    }

    pub fn from_parameters(parameters: [f64; 6]) -> Result<Self, SymmetryError> {
        let [a, b, c, alpha, beta, gamma] = parameters;
        Self::new(a, b, c, alpha, beta, gamma)
    }

    /// The unit cube, used when no cell is known.
    pub fn unit_cube() -> Self {
        Self {
            a: 1.0,
            b: 1.0,
            c: 1.0,
            alpha: 90.0,
            beta: 90.0,
            gamma: 90.0,
        }
    }

    pub fn parameters(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.alpha, self.beta, self.gamma]
    }

    #[inline]
    pub fn lengths(&self) -> (f64, f64, f64) {
        (self.a, self.b, self.c)
    }

    #[inline]
    pub fn angles(&self) -> (f64, f64, f64) {
        (self.alpha, self.beta, self.gamma)
    }

    fn cosines(&self) -> (f64, f64, f64) {
        (
            self.alpha.to_radians().cos(),
            self.beta.to_radians().cos(),
            self.gamma.to_radians().cos(),
        )
    }

    fn volume_factor(&self) -> f64 {
        let (ca, cb, cg) = self.cosines();
        1.0 - ca * ca - cb * cb - cg * cg + 2.0 * ca * cb * cg
    }

    pub fn volume(&self) -> f64 {
        self.a * self.b * self.c * self.volume_factor().max(0.0).sqrt()
    }

    /// Maps fractional to Cartesian coordinates, with a along x and b in the
    /// xy plane.
    pub fn orthogonalization_matrix(&self) -> Matrix3<f64> {
        let (ca, cb, cg) = self.cosines();
        let sg = self.gamma.to_radians().sin();
        Matrix3::new(
            self.a,
            self.b * cg,
            self.c * cb,
            0.0,
            self.b * sg,
            self.c * (ca - cb * cg) / sg,
            0.0,
            0.0,
            self.volume() / (self.a * self.b * sg),
        )
    }

    /// The inverse of [`UnitCell::orthogonalization_matrix`], in closed form.
    pub fn fractionalization_matrix(&self) -> Matrix3<f64> {
        let (ca, cb, cg) = self.cosines();
        let sg = self.gamma.to_radians().sin();
        let v = self.volume();
        Matrix3::new(
            1.0 / self.a,
            -cg / (self.a * sg),
            self.b * self.c * (ca * cg - cb) / (v * sg),
            0.0,
            1.0 / (self.b * sg),
            self.a * self.c * (cb * cg - ca) / (v * sg),
            0.0,
            0.0,
            self.a * self.b * sg / v,
        )
    }

    /// Compares lengths by ratio and angles by absolute difference in degrees.
    pub fn is_similar_to(
        &self,
        other: &UnitCell,
        relative_length_tolerance: f64,
        absolute_angle_tolerance: f64,
    ) -> bool {
        let lengths_match = [(self.a, other.a), (self.b, other.b), (self.c, other.c)]
            .iter()
            .all(|&(x, y)| (x.min(y) / x.max(y) - 1.0).abs() <= relative_length_tolerance);
        let angles_match = [
            (self.alpha, other.alpha),
            (self.beta, other.beta),
            (self.gamma, other.gamma),
        ]
        .iter()
        .all(|&(x, y)| (x - y).abs() <= absolute_angle_tolerance);
        lengths_match && angles_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_impossible_cells() {
        assert!(UnitCell::new(0.0, 1.0, 1.0, 90.0, 90.0, 90.0).is_err());
        assert!(UnitCell::new(1.0, 1.0, 1.0, 180.0, 90.0, 90.0).is_err());
        assert!(UnitCell::new(1.0, 1.0, 1.0, 10.0, 10.0, 170.0).is_err());
    }

    #[test]
    fn orthorhombic_cell_has_diagonal_matrices() {
        let cell = UnitCell::new(50.84, 42.77, 28.95, 90.0, 90.0, 90.0).unwrap();
        assert!((cell.volume() - 50.84 * 42.77 * 28.95).abs() < 1e-6);
        let f = cell.fractionalization_matrix();
        assert!((f[(0, 0)] - 1.0 / 50.84).abs() < 1e-12);
        assert!((f[(1, 1)] - 1.0 / 42.77).abs() < 1e-12);
        assert!(f[(0, 1)].abs() < 1e-12);
    }

    #[test]
    fn fractionalization_inverts_orthogonalization() {
        let cell = UnitCell::new(10.0, 12.0, 15.0, 70.0, 80.0, 100.0).unwrap();
        let product = cell.orthogonalization_matrix() * cell.fractionalization_matrix();
        let identity = Matrix3::<f64>::identity();
        assert!((product - identity).abs().max() < 1e-12);
    }

    #[test]
    fn similarity_uses_relative_lengths_and_absolute_angles() {
        let cell = UnitCell::new(100.0, 100.0, 100.0, 90.0, 90.0, 90.0).unwrap();
        let close = UnitCell::new(100.5, 100.0, 99.5, 90.9, 90.0, 89.5).unwrap();
        let far = UnitCell::new(102.0, 100.0, 100.0, 90.0, 90.0, 90.0).unwrap();
        let skewed = UnitCell::new(100.0, 100.0, 100.0, 90.0, 92.0, 90.0).unwrap();
        assert!(cell.is_similar_to(&close, 0.01, 1.0));
        assert!(!cell.is_similar_to(&far, 0.01, 1.0));
        assert!(!cell.is_similar_to(&skewed, 0.01, 1.0));
    }
}
