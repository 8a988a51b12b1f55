use rayon::prelude::*;

use pixform_image::Image;

/// Apply a function to each (source, destination) pixel pair in parallel.
///
/// The image is processed row by row on the global Rayon thread pool, which
/// is more cache-friendly than parallelizing over single elements.
pub fn par_iter_rows<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    f: impl Fn(&[T1], &mut [T2]) + Send + Sync,
) where
    T1: Send + Sync,
    T2: Send + Sync,
{
    let src_stride = C1 * src.cols();
    let dst_stride = C2 * src.cols();
    if src_stride == 0 || dst_stride == 0 {
        return;
    }

    src.as_slice()
        .par_chunks_exact(src_stride)
        .zip(dst.as_slice_mut().par_chunks_exact_mut(dst_stride))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .chunks_exact(C1)
                .zip(dst_chunk.chunks_exact_mut(C2))
                .for_each(|(src_pixel, dst_pixel)| {
                    f(src_pixel, dst_pixel);
                });
        });
}

/// Fill each destination row in parallel, passing the row index to the closure.
///
/// Used by resampling operations that compute source coordinates on the fly
/// for every destination pixel.
pub fn par_iter_rows_indexed_mut<T, const C: usize>(
    dst: &mut Image<T, C>,
    f: impl Fn(usize, &mut [T]) + Send + Sync,
) where
    T: Send + Sync,
{
    let row_stride = C * dst.cols();
    if row_stride == 0 {
        return;
    }

    dst.as_slice_mut()
        .par_chunks_exact_mut(row_stride)
        .enumerate()
        .for_each(|(row_idx, row)| f(row_idx, row));
}
