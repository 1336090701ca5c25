use crate::error::{LandmarkError, Result};
use crate::frames::{Frame, Point2D, Vector2D};

/// Vector from `a` to `b`.
pub fn vector_from_points<F: Frame>(a: Point2D<F>, b: Point2D<F>) -> Vector2D<F> {
    b - a
}

pub fn midpoint<F: Frame>(a: Point2D<F>, b: Point2D<F>) -> Point2D<F> {
    Point2D::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Euclidean norm.
pub fn length<F: Frame>(v: Vector2D<F>) -> f64 {
    v.x.hypot(v.y)
}

pub fn normalize<F: Frame>(v: Vector2D<F>) -> Result<Vector2D<F>> {
    let len = nonzero_length(v, "normalization")?;
    Ok(Vector2D::new(v.x / len, v.y / len))
}

/// Unsigned angle between two vectors in degrees, in [0, 180].
pub fn angle_between<F: Frame>(v1: Vector2D<F>, v2: Vector2D<F>) -> Result<f64> {
    let len1 = nonzero_length(v1, "angle between vectors")?;
    let len2 = nonzero_length(v2, "angle between vectors")?;
    // acos is undefined just outside [-1, 1]
    let cos_theta = (v1.dot(&v2) / (len1 * len2)).clamp(-1.0, 1.0);
    Ok(cos_theta.acos().to_degrees())
}

/// Angle of the line through `v` against the horizontal axis, in [-90, 90].
///
/// Image y grows downward, so the sign is flipped: a vector pointing "up"
/// the screen has a positive slope. Both directions of a line give the same
/// value.
pub fn signed_slope_angle<F: Frame>(v: Vector2D<F>) -> Result<f64> {
    nonzero_length(v, "slope angle")?;
    let ang = fold_line_angle(v.y.atan2(v.x).to_degrees());
    Ok(-ang)
}

/// Angle of the line through `v` against the headward (-y) axis, in
/// [-90, 90]. Positive means tilted anterior (+x).
pub fn signed_vertical_angle<F: Frame>(v: Vector2D<F>) -> Result<f64> {
    nonzero_length(v, "vertical angle")?;
    Ok(fold_line_angle(v.x.atan2(-v.y).to_degrees()))
}

/// Wraps any finite angle into [-180, 180].
pub fn wrap_signed(angle: f64) -> f64 {
    if (-180.0..=180.0).contains(&angle) {
        return angle;
    }
    // lands in [-180, 180)
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && angle > 0.0 {
        180.0
    } else {
        wrapped
    }
}

/// Folds an `atan2` result in (-180, 180] onto [-90, 90] by adding or
/// subtracting a half turn.
fn fold_line_angle(ang: f64) -> f64 {
    if ang > 90.0 {
        ang - 180.0
    } else if ang < -90.0 {
        ang + 180.0
    } else {
        ang
    }
}

fn nonzero_length<F: Frame>(v: Vector2D<F>, context: &str) -> Result<f64> {
    let len = length(v);
    if len == 0.0 {
        return Err(LandmarkError::degenerate(context));
    }
    Ok(len)
}
