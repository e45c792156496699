// ============================================================
// Layer 5 - Rotation Matrices
// ============================================================
// Intrinsic z-y'-x'' (yaw, pitch, roll) rotation, intended for a
// perspective-warp stage that is not part of the compositor yet.
//
//   R = Rz(yaw) * Ry(pitch) * Rx(roll)
//
// Applied to a column vector this rotates about x first, then y,
// then z. All rotations are counter-clockwise for positive angles.

use std::ops::Mul;

use serde::{Deserialize, Serialize};

/// Row-major 3x3 matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat3(pub [[f64; 3]; 3]);

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);

    /// Counter-clockwise rotation about the x axis
    pub fn rot_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Mat3([[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]])
    }

    /// Counter-clockwise rotation about the y axis
    pub fn rot_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Mat3([[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]])
    }

    /// Counter-clockwise rotation about the z axis
    pub fn rot_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Mat3([[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]])
    }

    pub fn mul_vec(&self, v: [f64; 3]) -> [f64; 3] {
        std::array::from_fn(|i| (0..3).map(|k| self.0[i][k] * v[k]).sum())
    }

    pub fn transpose(&self) -> Self {
        Mat3(std::array::from_fn(|i| std::array::from_fn(|j| self.0[j][i])))
    }

    pub fn determinant(&self) -> f64 {
        let m = &self.0;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }
}

impl Mul for Mat3 {
    type Output = Mat3;

    fn mul(self, rhs: Mat3) -> Mat3 {
        Mat3(std::array::from_fn(|i| {
            std::array::from_fn(|j| (0..3).map(|k| self.0[i][k] * rhs.0[k][j]).sum())
        }))
    }
}

/// Rotation matrix for yaw (about z), pitch (about y) and roll (about x).
pub fn euler_matrix(yaw: f64, pitch: f64, roll: f64) -> Mat3 {
    Mat3::rot_z(yaw) * Mat3::rot_y(pitch) * Mat3::rot_x(roll)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_close(a: [f64; 3], b: [f64; 3]) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < 1e-12, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn test_yaw_pi_flips_x() {
        assert_close(euler_matrix(PI, 0.0, 0.0).mul_vec([1.0, 0.0, 0.0]), [-1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_each_angle_binds_its_own_axis() {
        // yaw turns x towards y
        assert_close(euler_matrix(FRAC_PI_2, 0.0, 0.0).mul_vec([1.0, 0.0, 0.0]), [0.0, 1.0, 0.0]);
        // pitch turns z towards x
        assert_close(euler_matrix(0.0, FRAC_PI_2, 0.0).mul_vec([0.0, 0.0, 1.0]), [1.0, 0.0, 0.0]);
        // roll turns y towards z
        assert_close(euler_matrix(0.0, 0.0, FRAC_PI_2).mul_vec([0.0, 1.0, 0.0]), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_roll_applies_before_yaw() {
        // roll takes y to z, which yaw then leaves alone
        let v = euler_matrix(FRAC_PI_2, 0.0, FRAC_PI_2).mul_vec([0.0, 1.0, 0.0]);
        assert_close(v, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_orthonormal_with_unit_determinant() {
        let r = euler_matrix(1.0, 1.0, 1.0);
        let product = r * r.transpose();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((product.0[i][j] - expected).abs() < 1e-12);
            }
        }
        assert!((r.determinant() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_angles_is_identity() {
        assert_eq!(euler_matrix(0.0, 0.0, 0.0), Mat3::IDENTITY);
    }
}
