use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};

use crate::error::{LandmarkError, Result};
use crate::frames::{Index, IndexPoint, Point3D, World, WorldPoint};

/// Index <-> world mapping of a volume.
///
/// Both directions are stored so neither call pays for an inversion; when
/// built through [`AffineTransform::from_pair`] the caller guarantees they
/// are inverses of each other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    index_to_world: Matrix4<f64>,
    world_to_index: Matrix4<f64>,
}

impl AffineTransform {
    pub fn from_index_to_world(index_to_world: Matrix4<f64>) -> Result<Self> {
        let world_to_index = index_to_world
            .try_inverse()
            .ok_or(LandmarkError::SingularAffine)?;
        Ok(Self {
            index_to_world,
            world_to_index,
        })
    }

    /// Uses a host-supplied inverse as-is.
    pub fn from_pair(index_to_world: Matrix4<f64>, world_to_index: Matrix4<f64>) -> Self {
        Self {
            index_to_world,
            world_to_index,
        }
    }

    /// Embeds a homogeneous 2D map; the third axis passes through unchanged.
    pub fn from_homogeneous_2d(m: Matrix3<f64>) -> Result<Self> {
        #[rustfmt::skip]
        let full = Matrix4::new(
            m[(0, 0)], m[(0, 1)], 0.0, m[(0, 2)],
            m[(1, 0)], m[(1, 1)], 0.0, m[(1, 2)],
            0.0,       0.0,       1.0, 0.0,
            m[(2, 0)], m[(2, 1)], 0.0, m[(2, 2)],
        );
        Self::from_index_to_world(full)
    }

    /// Builds the affine from a 3x3 direction-times-spacing block and the
    /// world position of voxel (0, 0, 0), the layout stored in landmark
    /// metadata.
    pub fn from_direction_origin(ijk_to_ras: [[f64; 3]; 3], origin: [f64; 3]) -> Result<Self> {
        let mut m = Matrix4::identity();
        for (r, row) in ijk_to_ras.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                m[(r, c)] = *value;
            }
            m[(r, 3)] = origin[r];
        }
        Self::from_index_to_world(m)
    }

    pub fn identity() -> Self {
        Self::from_pair(Matrix4::identity(), Matrix4::identity())
    }

    pub fn index_to_world_matrix(&self) -> &Matrix4<f64> {
        &self.index_to_world
    }

    pub fn world_to_index_matrix(&self) -> &Matrix4<f64> {
        &self.world_to_index
    }

    pub fn index_to_world(&self, p: Point3D<Index>) -> Point3D<World> {
        let (x, y, z) = apply(&self.index_to_world, p.x, p.y, p.z);
        Point3D::new(x, y, z)
    }

    pub fn world_to_index(&self, p: Point3D<World>) -> Point3D<Index> {
        let (x, y, z) = apply(&self.world_to_index, p.x, p.y, p.z);
        Point3D::new(x, y, z)
    }

    /// In-plane convenience: k = 0 on the way in, the world z is dropped.
    pub fn index_to_world_2d(&self, p: IndexPoint) -> WorldPoint {
        self.index_to_world(p.with_z(0.0)).xy()
    }

    pub fn world_to_index_2d(&self, p: WorldPoint) -> IndexPoint {
        self.world_to_index(p.with_z(0.0)).xy()
    }

    /// Upper-left 3x3 block in row-major order.
    pub fn direction(&self) -> [[f64; 3]; 3] {
        let m = &self.index_to_world;
        [
            [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
            [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
            [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
        ]
    }

    /// Column norms of the linear block, i.e. the voxel spacing.
    pub fn spacing(&self) -> [f64; 3] {
        let linear = self.index_to_world.fixed_view::<3, 3>(0, 0);
        [
            linear.column(0).norm(),
            linear.column(1).norm(),
            linear.column(2).norm(),
        ]
    }

    pub fn origin(&self) -> [f64; 3] {
        let t: Vector3<f64> = self.index_to_world.fixed_view::<3, 1>(0, 3).into_owned();
        [t.x, t.y, t.z]
    }
}

fn apply(m: &Matrix4<f64>, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
    let h = m * Vector4::new(x, y, z, 1.0);
    (h.x, h.y, h.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn oblique_affine() -> AffineTransform {
        // x/y flipped, 0.7 mm in-plane, 2.5 mm slices, small in-plane rotation
        let (s, c) = 0.2f64.sin_cos();
        AffineTransform::from_direction_origin(
            [
                [-0.7 * c, 0.7 * s, 0.0],
                [-0.7 * s, -0.7 * c, 0.0],
                [0.0, 0.0, 2.5],
            ],
            [120.0, -85.5, 33.0],
        )
        .unwrap()
    }

    #[test]
    fn test_identity_is_noop() {
        let t = AffineTransform::identity();
        let p = t.index_to_world(Point3D::new(1.0, 2.0, 3.0));
        assert_eq!((p.x, p.y, p.z), (1.0, 2.0, 3.0));
    }

    #[test]
    fn test_origin_maps_to_voxel_zero() {
        let t = oblique_affine();
        let p = t.index_to_world(Point3D::new(0.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 120.0);
        assert_relative_eq!(p.y, -85.5);
        assert_relative_eq!(p.z, 33.0);
        assert_eq!(t.origin(), [120.0, -85.5, 33.0]);
        let spacing = t.spacing();
        assert_relative_eq!(spacing[0], 0.7, epsilon = 1e-12);
        assert_relative_eq!(spacing[2], 2.5, epsilon = 1e-12);
        assert_eq!(t.direction()[2], [0.0, 0.0, 2.5]);
    }

    #[test]
    fn test_round_trip() {
        let t = oblique_affine();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let p = Point3D::<Index>::new(
                rng.random_range(-10.0..600.0),
                rng.random_range(-10.0..600.0),
                rng.random_range(0.0..80.0),
            );
            let back = t.world_to_index(t.index_to_world(p));
            assert_relative_eq!(back.x, p.x, epsilon = 1e-9);
            assert_relative_eq!(back.y, p.y, epsilon = 1e-9);
            assert_relative_eq!(back.z, p.z, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_two_d_helpers_zero_third_axis() {
        let t = oblique_affine();
        let w = t.index_to_world_2d(IndexPoint::new(10.0, 20.0));
        let full = t.index_to_world(Point3D::new(10.0, 20.0, 0.0));
        assert_eq!(w, full.xy());
    }

    #[test]
    fn test_homogeneous_2d() {
        let m = Matrix3::new(2.0, 0.0, 5.0, 0.0, 3.0, -1.0, 0.0, 0.0, 1.0);
        let t = AffineTransform::from_homogeneous_2d(m).unwrap();
        let w = t.index_to_world_2d(IndexPoint::new(1.0, 1.0));
        assert_relative_eq!(w.x, 7.0);
        assert_relative_eq!(w.y, 2.0);
        let back = t.world_to_index_2d(w);
        assert_relative_eq!(back.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(back.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_affine_rejected() {
        let err = AffineTransform::from_direction_origin(
            [[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
            [0.0; 3],
        )
        .unwrap_err();
        assert_eq!(err, LandmarkError::SingularAffine);
    }

    #[test]
    fn test_from_pair_uses_given_inverse() {
        let fwd = Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 2.0, 2.0));
        let inv = Matrix4::new_nonuniform_scaling(&Vector3::new(0.5, 0.5, 0.5));
        let t = AffineTransform::from_pair(fwd, inv);
        let p = t.world_to_index(Point3D::new(4.0, 4.0, 4.0));
        assert_relative_eq!(p.x, 2.0);
    }
}
