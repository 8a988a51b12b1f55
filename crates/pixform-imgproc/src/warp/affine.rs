use std::f32::consts::PI;

use pixform_image::{Image, ImageError, ImageSize};

use crate::interpolation::{interpolate_pixel, InterpolationMode};
use crate::parallel;

/// Threshold under which an affine determinant is treated as singular.
const DEGENERATE_EPS: f32 = 1e-6;

#[rustfmt::skip]
fn det3(m: &[f32; 9]) -> f32 {
    m[0] * (m[4] * m[8] - m[5] * m[7]) -
    m[1] * (m[3] * m[8] - m[5] * m[6]) +
    m[2] * (m[3] * m[7] - m[4] * m[6])
}

/// Applies an affine transformation to a point.
fn transform_point(x: f32, y: f32, m: &[f32; 6]) -> (f32, f32) {
    let u = m[0] * x + m[1] * y + m[2];
    let v = m[3] * x + m[4] * y + m[5];
    (u, v)
}

/// Inverts a 2x3 affine transformation matrix.
///
/// A matrix with an exactly singular linear part inverts to the zero matrix,
/// following the OpenCV convention.
///
/// Arguments:
///
/// * `m` - The 2x3 affine transformation matrix.
///
/// Returns:
///
/// The inverted 2x3 affine transformation matrix.
pub fn invert_affine_transform(m: &[f32; 6]) -> [f32; 6] {
    let (a, b, c, d, e, f) = (m[0], m[1], m[2], m[3], m[4], m[5]);

    let determinant = a * e - b * d;
    let inv_determinant = if determinant != 0.0 {
        1.0 / determinant
    } else {
        0.0
    };

    let new_a = e * inv_determinant;
    let new_b = -b * inv_determinant;
    let new_d = -d * inv_determinant;
    let new_e = a * inv_determinant;
    let new_c = -(new_a * c + new_b * f);
    let new_f = -(new_d * c + new_e * f);

    [new_a, new_b, new_c, new_d, new_e, new_f]
}

/// Returns a 2x3 rotation matrix for a 2D rotation around a center point.
///
/// The rotation matrix is defined as:
///
/// | alpha  beta  tx |
/// | -beta  alpha ty |
///
/// where:
///
/// alpha = scale * cos(angle)
/// beta = scale * sin(angle)
/// tx = (1 - alpha) * center.x - beta * center.y
/// ty = beta * center.x + (1 - alpha) * center.y
///
/// Positive angles rotate counter-clockwise, matching the OpenCV convention.
/// Note that [`super::rotate`] uses the opposite sign convention.
///
/// # Arguments
///
/// * `center` - The center point of the rotation.
/// * `angle` - The angle of rotation in degrees.
/// * `scale` - The scale factor.
///
/// # Example
///
/// ```
/// use pixform_imgproc::warp::get_rotation_matrix2d;
///
/// let center = (0.0, 0.0);
/// let angle = 90.0;
/// let scale = 1.0;
/// let rotation_matrix = get_rotation_matrix2d(center, angle, scale);
/// ```
pub fn get_rotation_matrix2d(center: (f32, f32), angle: f32, scale: f32) -> [f32; 6] {
    let angle = angle * PI / 180.0f32;
    let alpha = scale * angle.cos();
    let beta = scale * angle.sin();

    let tx = (1.0 - alpha) * center.0 - beta * center.1;
    let ty = beta * center.0 + (1.0 - alpha) * center.1;

    [alpha, beta, tx, -beta, alpha, ty]
}

/// Solves the 2x3 affine matrix mapping three source points to three
/// destination points.
///
/// The system has six unknowns and six equations, one pair per point
/// correspondence, and is solved by Cramer's rule. The source points must
/// not be collinear.
///
/// # Arguments
///
/// * `src` - Three source points (x, y).
/// * `dst` - The corresponding destination points.
///
/// # Returns
///
/// The 2x3 matrix `m` such that `m * [x, y, 1]^T = [x', y']^T` sends each
/// `src[i]` to `dst[i]`.
///
/// # Errors
///
/// Returns [`ImageError::DegenerateTransform`] when the source points are
/// collinear or nearly so, instead of producing a NaN matrix.
///
/// # Example
///
/// ```
/// use pixform_imgproc::warp::get_affine_transform;
///
/// let src = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)];
/// let dst = [(0.0, 0.0), (2.0, 0.0), (0.0, 2.0)];
///
/// let m = get_affine_transform(&src, &dst).unwrap();
///
/// assert_eq!(m, [2.0, 0.0, 0.0, 0.0, 2.0, 0.0]);
/// ```
pub fn get_affine_transform(
    src: &[(f32, f32); 3],
    dst: &[(f32, f32); 3],
) -> Result<[f32; 6], ImageError> {
    let [(x1, y1), (x2, y2), (x3, y3)] = *src;

    // twice the signed area of the source triangle
    let det = det3(&[x1, y1, 1.0, x2, y2, 1.0, x3, y3, 1.0]);
    if det.abs() < DEGENERATE_EPS {
        return Err(ImageError::DegenerateTransform);
    }
    let inv_det = 1.0 / det;

    let [(u1, v1), (u2, v2), (u3, v3)] = *dst;

    // one 3x3 system per output row, replacing a column by the destination
    // coordinates
    let a = det3(&[u1, y1, 1.0, u2, y2, 1.0, u3, y3, 1.0]) * inv_det;
    let b = det3(&[x1, u1, 1.0, x2, u2, 1.0, x3, u3, 1.0]) * inv_det;
    let c = det3(&[x1, y1, u1, x2, y2, u2, x3, y3, u3]) * inv_det;
    let d = det3(&[v1, y1, 1.0, v2, y2, 1.0, v3, y3, 1.0]) * inv_det;
    let e = det3(&[x1, v1, 1.0, x2, v2, 1.0, x3, v3, 1.0]) * inv_det;
    let f = det3(&[x1, y1, v1, x2, y2, v2, x3, y3, v3]) * inv_det;

    Ok([a, b, c, d, e, f])
}

/// Applies an affine transformation to an image.
///
/// The destination is filled by inverse mapping: each destination pixel is
/// mapped back through the inverted matrix and interpolated from the source,
/// so the output is dense. Destination pixels whose source position falls
/// outside the image keep their current value.
///
/// # Arguments
///
/// * `src` - The input image with shape (height, width, channels).
/// * `dst` - The output image with shape (height, width, channels).
/// * `m` - The 2x3 affine transformation matrix.
/// * `interpolation` - The interpolation mode to use.
///
/// # Example
///
/// ```
/// use pixform_image::{Image, ImageSize};
/// use pixform_imgproc::interpolation::InterpolationMode;
/// use pixform_imgproc::warp::warp_affine;
///
/// let src = Image::<f32, 3>::from_size_val(
///     ImageSize {
///         width: 4,
///         height: 5,
///     },
///     1.0f32,
/// ).unwrap();
///
/// let m = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
///
/// let mut dst = Image::<f32, 3>::from_size_val(
///     ImageSize {
///         width: 4,
///         height: 5,
///     },
///     0.0,
/// ).unwrap();
///
/// warp_affine(&src, &mut dst, &m, InterpolationMode::Nearest).unwrap();
///
/// assert_eq!(dst.size().width, 4);
/// assert_eq!(dst.size().height, 5);
/// ```
pub fn warp_affine<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    m: &[f32; 6],
    interpolation: InterpolationMode,
) -> Result<(), ImageError> {
    // invert the affine transform to find for each destination pixel its
    // corresponding position in the source
    let m_inv = invert_affine_transform(m);

    let (src_cols, src_rows) = (src.cols() as f32, src.rows() as f32);

    parallel::par_iter_rows_indexed_mut(dst, |row_idx, row| {
        for (col_idx, dst_pixel) in row.chunks_exact_mut(C).enumerate() {
            let (u, v) = transform_point(col_idx as f32, row_idx as f32, &m_inv);

            // check if the position is within the bounds of the src image
            if u >= 0.0 && u < src_cols && v >= 0.0 && v < src_rows {
                dst_pixel
                    .iter_mut()
                    .enumerate()
                    .for_each(|(k, pixel)| *pixel = interpolate_pixel(src, u, v, k, interpolation));
            }
        }
    });

    Ok(())
}

/// Applies the affine transformation defined by three point correspondences,
/// sizing the output to contain the whole transformed image.
///
/// The four corners of the source extent are pushed through the matrix to
/// obtain the transformed bounding box, the translation column is adjusted so
/// the minimum corner lands at the output origin, and the canvas is allocated
/// as `round(x_max - x_min)` by `round(y_max - y_min)`. The fill then runs by
/// inverse mapping as in [`warp_affine`], with pixels mapping outside the
/// source left black.
///
/// A zero-sized input yields a zero-sized output.
///
/// # Arguments
///
/// * `src` - The input image with shape (height, width, channels).
/// * `src_pts` - Three source points (x, y).
/// * `dst_pts` - The corresponding destination points.
/// * `interpolation` - The interpolation mode to use.
///
/// # Returns
///
/// The transformed image, sized to the transformed extent of `src`.
///
/// # Errors
///
/// Returns [`ImageError::DegenerateTransform`] when either point triple is
/// collinear or nearly so.
///
/// # Example
///
/// ```
/// use pixform_image::{Image, ImageSize};
/// use pixform_imgproc::interpolation::InterpolationMode;
/// use pixform_imgproc::warp::warp_affine_fit;
///
/// let src = Image::<f32, 1>::from_size_val(
///     ImageSize {
///         width: 4,
///         height: 4,
///     },
///     1.0f32,
/// ).unwrap();
///
/// let src_pts = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)];
/// let dst_pts = [(0.0, 0.0), (2.0, 0.0), (0.0, 2.0)];
///
/// let dst = warp_affine_fit(&src, &src_pts, &dst_pts, InterpolationMode::Nearest).unwrap();
///
/// assert_eq!(dst.size().width, 8);
/// assert_eq!(dst.size().height, 8);
/// ```
pub fn warp_affine_fit<const C: usize>(
    src: &Image<f32, C>,
    src_pts: &[(f32, f32); 3],
    dst_pts: &[(f32, f32); 3],
    interpolation: InterpolationMode,
) -> Result<Image<f32, C>, ImageError> {
    let mut m = get_affine_transform(src_pts, dst_pts)?;

    // a near-singular linear part (collinear destination points) cannot be
    // inverse-mapped
    if (m[0] * m[4] - m[1] * m[3]).abs() < DEGENERATE_EPS {
        return Err(ImageError::DegenerateTransform);
    }

    // transform the four corners of the source extent
    let (w, h) = (src.cols() as f32, src.rows() as f32);
    let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)];

    let (mut x_min, mut y_min) = (f32::INFINITY, f32::INFINITY);
    let (mut x_max, mut y_max) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
    for (x, y) in corners {
        let (u, v) = transform_point(x, y, &m);
        x_min = x_min.min(u);
        x_max = x_max.max(u);
        y_min = y_min.min(v);
        y_max = y_max.max(v);
    }

    // shift the transform so the minimum corner lands at the canvas origin
    m[2] -= x_min;
    m[5] -= y_min;

    let mut dst = Image::from_size_val(
        ImageSize {
            width: (x_max - x_min).round() as usize,
            height: (y_max - y_min).round() as usize,
        },
        0.0,
    )?;

    warp_affine(src, &mut dst, &m, interpolation)?;

    Ok(dst)
}
