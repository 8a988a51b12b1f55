use pixform_image::{Image, ImageError, ImageSize};
use rayon::prelude::*;

/// Rotates an image clockwise around a pivot point, expanding the output
/// canvas to contain the whole rotated image.
///
/// Positive angles rotate clockwise; the angle is negated internally and the
/// standard counter-clockwise formula `x' = x cos t - y sin t`,
/// `y' = x sin t + y cos t` is applied to every pixel, relative to the pivot.
/// The output canvas is the tight bounding box of the rotated point cloud,
/// translated so its minimum coordinate lands at the origin. Since that
/// translation renormalizes the canvas, the result is the same for every
/// pivot up to float rounding.
///
/// This is a forward mapping: each source pixel is pushed to its rounded
/// destination. Several sources may collide on one destination and some
/// destinations receive no writer, so non-axis-aligned angles leave black
/// holes in the output. Use [`super::get_rotation_matrix2d`] with
/// [`super::warp_affine`] for a dense, interpolated rotation instead.
///
/// A zero-sized input yields a zero-sized output.
///
/// # Arguments
///
/// * `src` - The input image with shape (height, width, channels).
/// * `pivot` - The (x, y) point to rotate around.
/// * `angle_degrees` - The clockwise rotation angle in degrees.
///
/// # Returns
///
/// The rotated image on a zero-initialized canvas sized to the rotated
/// extent of `src`.
///
/// # Example
///
/// ```
/// use pixform_image::{Image, ImageSize};
/// use pixform_imgproc::warp::rotate;
///
/// let image = Image::<f32, 3>::from_size_val(
///     ImageSize {
///         width: 10,
///         height: 5,
///     },
///     1.0f32,
/// ).unwrap();
///
/// let rotated = rotate(&image, (0.0, 0.0), 90.0).unwrap();
///
/// assert_eq!(rotated.size().width, 5);
/// assert_eq!(rotated.size().height, 10);
/// ```
pub fn rotate<const C: usize>(
    src: &Image<f32, C>,
    pivot: (f32, f32),
    angle_degrees: f32,
) -> Result<Image<f32, C>, ImageError> {
    if src.width() == 0 || src.height() == 0 {
        return Image::from_size_val(
            ImageSize {
                width: 0,
                height: 0,
            },
            0.0,
        );
    }

    // clockwise for positive angles: negate before the counter-clockwise
    // formula
    let theta = -angle_degrees.to_radians();
    let (sin_t, cos_t) = theta.sin_cos();

    let map = |x: f32, y: f32| {
        let (dx, dy) = (x - pivot.0, y - pivot.1);
        (
            dx * cos_t - dy * sin_t + pivot.0,
            dx * sin_t + dy * cos_t + pivot.1,
        )
    };

    // first pass: bound the whole rotated point cloud, not only the corners
    let (cols, rows) = (src.cols(), src.rows());
    let (x_min, x_max, y_min, y_max) = (0..rows)
        .into_par_iter()
        .map(|y| {
            let mut row_bounds = (
                f32::INFINITY,
                f32::NEG_INFINITY,
                f32::INFINITY,
                f32::NEG_INFINITY,
            );
            for x in 0..cols {
                let (u, v) = map(x as f32, y as f32);
                row_bounds.0 = row_bounds.0.min(u);
                row_bounds.1 = row_bounds.1.max(u);
                row_bounds.2 = row_bounds.2.min(v);
                row_bounds.3 = row_bounds.3.max(v);
            }
            row_bounds
        })
        .reduce(
            || {
                (
                    f32::INFINITY,
                    f32::NEG_INFINITY,
                    f32::INFINITY,
                    f32::NEG_INFINITY,
                )
            },
            |a, b| (a.0.min(b.0), a.1.max(b.1), a.2.min(b.2), a.3.max(b.3)),
        );

    // destinations are rounded to integer coordinates, so the tight canvas
    // spans round(max - min) + 1 cells per axis
    let mut dst = Image::from_size_val(
        ImageSize {
            width: (x_max - x_min).round() as usize + 1,
            height: (y_max - y_min).round() as usize + 1,
        },
        0.0,
    )?;

    // second pass: push every source pixel to its rounded destination;
    // writes that round outside the canvas are dropped
    let src_data = src.as_slice();
    let (dst_cols, dst_rows) = (dst.cols(), dst.rows());
    let dst_data = dst.as_slice_mut();
    for y in 0..rows {
        for x in 0..cols {
            let (u, v) = map(x as f32, y as f32);
            let dst_x = (u - x_min).round() as i64;
            let dst_y = (v - y_min).round() as i64;
            if dst_x < 0 || dst_x >= dst_cols as i64 || dst_y < 0 || dst_y >= dst_rows as i64 {
                continue;
            }

            let src_idx = (y * cols + x) * C;
            let dst_idx = (dst_y as usize * dst_cols + dst_x as usize) * C;
            dst_data[dst_idx..dst_idx + C].copy_from_slice(&src_data[src_idx..src_idx + C]);
        }
    }

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use pixform_image::{Image, ImageError, ImageSize};

    #[test]
    fn rotate_zero_angle_identity() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 4,
                height: 3,
            },
            (0..12).map(|x| x as f32).collect(),
        )?;

        let rotated = super::rotate(&image, (0.0, 0.0), 0.0)?;

        assert_eq!(rotated.size(), image.size());
        assert_eq!(rotated.as_slice(), image.as_slice());

        Ok(())
    }

    #[test]
    fn rotate_full_turn_dims() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 5,
                height: 4,
            },
            1.0,
        )?;

        let rotated = super::rotate(&image, (0.0, 0.0), 360.0)?;

        assert_eq!(rotated.size(), image.size());

        Ok(())
    }

    #[test]
    fn rotate_90_single_pixel() -> Result<(), ImageError> {
        let mut data = vec![0.0f32; 10 * 10];
        data[5 * 10 + 5] = 255.0;
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 10,
                height: 10,
            },
            data,
        )?;

        let rotated = super::rotate(&image, (0.0, 0.0), 90.0)?;

        // (5, 5) maps to (5, -5); with y_min = -9 that lands at row 4, col 5
        assert_eq!(rotated.size().width, 10);
        assert_eq!(rotated.size().height, 10);
        assert_eq!(rotated.get([4, 5, 0]), Some(&255.0f32));

        let white_count = rotated.as_slice().iter().filter(|&&v| v == 255.0).count();
        assert_eq!(white_count, 1);

        Ok(())
    }

    #[test]
    fn rotate_roundtrip_90() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 4,
                height: 4,
            },
            (0..16).map(|x| x as f32).collect(),
        )?;

        let once = super::rotate(&image, (0.0, 0.0), 90.0)?;
        let back = super::rotate(&once, (0.0, 0.0), -90.0)?;

        assert_eq!(back.size(), image.size());
        assert_eq!(back.as_slice(), image.as_slice());

        Ok(())
    }

    #[test]
    fn rotate_roundtrip_values_survive() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 6,
                height: 6,
            },
            (1..=36).map(|x| x as f32).collect(),
        )?;

        let once = super::rotate(&image, (0.0, 0.0), 25.0)?;
        let back = super::rotate(&once, (0.0, 0.0), -25.0)?;

        // holes stay black; every surviving value comes from the original
        let survivors = back
            .as_slice()
            .iter()
            .filter(|&&v| v != 0.0)
            .collect::<Vec<_>>();
        assert!(!survivors.is_empty());
        assert!(survivors.len() <= 36);
        assert!(survivors.iter().all(|&&v| (1.0..=36.0).contains(&v)));

        Ok(())
    }

    #[test]
    fn rotate_pivot_invariance() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 5,
                height: 5,
            },
            (0..25).map(|x| x as f32).collect(),
        )?;

        let about_origin = super::rotate(&image, (0.0, 0.0), 90.0)?;
        let about_point = super::rotate(&image, (2.0, 3.0), 90.0)?;

        assert_eq!(about_origin.size(), about_point.size());
        assert_eq!(about_origin.as_slice(), about_point.as_slice());

        Ok(())
    }

    #[test]
    fn rotate_45_leaves_holes() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 8,
                height: 8,
            },
            1.0,
        )?;

        let rotated = super::rotate(&image, (0.0, 0.0), 45.0)?;

        // the canvas grows and the forward mapping leaves unwritten pixels
        assert!(rotated.size().width > 8);
        assert!(rotated.size().height > 8);

        let written = rotated.as_slice().iter().filter(|&&v| v == 1.0).count();
        let holes = rotated.as_slice().iter().filter(|&&v| v == 0.0).count();
        assert!(written > 0);
        assert!(written <= 64);
        assert!(holes > 0);

        Ok(())
    }

    #[test]
    fn rotate_ch3_smoke() -> Result<(), ImageError> {
        let mut data = vec![0.0f32; 4 * 4 * 3];
        // one red pixel at (1, 2)
        data[(2 * 4 + 1) * 3] = 255.0;
        let image = Image::<f32, 3>::new(
            ImageSize {
                width: 4,
                height: 4,
            },
            data,
        )?;

        let rotated = super::rotate(&image, (0.0, 0.0), 90.0)?;

        assert_eq!(rotated.num_channels(), 3);
        assert_eq!(rotated.size().width, 4);
        assert_eq!(rotated.size().height, 4);
        // (1, 2) maps to (2, -1); with y_min = -3 that lands at row 2, col 2
        assert_eq!(rotated.get([2, 2, 0]), Some(&255.0f32));
        assert_eq!(rotated.get([2, 2, 1]), Some(&0.0f32));

        Ok(())
    }

    #[test]
    fn rotate_empty_image() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 0,
                height: 0,
            },
            vec![],
        )?;

        let rotated = super::rotate(&image, (0.0, 0.0), 33.0)?;

        assert_eq!(rotated.size().width, 0);
        assert_eq!(rotated.size().height, 0);

        Ok(())
    }
}
