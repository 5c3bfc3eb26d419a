// convolution.rs — Valid-region 1D passes and the Gaussian filter.
//
// A 2D Gaussian kernel is the outer product of two 1D Gaussians, so the
// filter decomposes into two 1D passes:
//   convolve_rows_valid() → horizontal pass
//   convolve_cols_valid() → vertical pass
// reducing cost from O(k²) to O(2k) per pixel.
//
// BORDER HANDLING: none. Only pixels whose full window lies inside the
// source are computed, so each pass shrinks the image by (k - 1) along the
// filtered axis. A filter with half-size r turns W×H into (W-2r)×(H-2r),
// and callers map coordinates back by adding r.
//
// The kernel is applied as a correlation: output[x] = Σ k[i]·src[x + i].
// For symmetric kernels this is identical to convolution.

use crate::image::{Image, Pixel};

fn check_kernel(kernel: &[f32]) {
    assert!(!kernel.is_empty(), "kernel must not be empty");
    assert!(kernel.len() % 2 == 1, "kernel length must be odd (got {})", kernel.len());
}

/// Correlate each row of `src` with a 1D kernel (horizontal pass).
///
/// Output is `(W - K + 1) × H` for a kernel of length K; output pixel
/// `(x, y)` is centered on source pixel `(x + K/2, y)`.
///
/// # Panics
/// Panics if the kernel is empty, has even length, or is wider than `src`.
pub fn convolve_rows_valid<T: Pixel>(src: &Image<T>, kernel: &[f32]) -> Image<f32> {
    check_kernel(kernel);
    assert!(
        src.width() >= kernel.len(),
        "image width {} smaller than kernel length {}",
        src.width(),
        kernel.len()
    );

    let out_w = src.width() + 1 - kernel.len();
    let mut dst = Image::<f32>::new(out_w, src.height());
    dst.for_each_row_mut(|y, row| {
        let src_row = src.row(y);
        for (x, out) in row.iter_mut().enumerate() {
            let window = &src_row[x..x + kernel.len()];
            *out = window
                .iter()
                .zip(kernel)
                .map(|(&s, &kv)| s.to_f32() * kv)
                .sum();
        }
    });
    dst
}

/// Correlate each column of `src` with a 1D kernel (vertical pass).
///
/// Output is `W × (H - K + 1)`; output pixel `(x, y)` is centered on source
/// pixel `(x, y + K/2)`.
///
/// # Panics
/// Panics if the kernel is empty, has even length, or is taller than `src`.
pub fn convolve_cols_valid<T: Pixel>(src: &Image<T>, kernel: &[f32]) -> Image<f32> {
    check_kernel(kernel);
    assert!(
        src.height() >= kernel.len(),
        "image height {} smaller than kernel length {}",
        src.height(),
        kernel.len()
    );

    let out_h = src.height() + 1 - kernel.len();
    let mut dst = Image::<f32>::new(src.width(), out_h);
    dst.for_each_row_mut(|y, row| {
        for (ki, &kv) in kernel.iter().enumerate() {
            let src_row = src.row(y + ki);
            for (out, &s) in row.iter_mut().zip(src_row) {
                *out += s.to_f32() * kv;
            }
        }
    });
    dst
}

/// Generate a 1D Gaussian kernel with the given half-size and sigma.
///
/// Returns a kernel of length `2 * half_size + 1`, normalized so the
/// coefficients sum to 1.0.
///
/// # Examples
/// ```
/// let k = harris_corners::convolution::gaussian_kernel_1d(2, 1.0);
/// assert_eq!(k.len(), 5);
/// assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-6);
/// ```
///
/// # Panics
/// Panics if `sigma <= 0`.
pub fn gaussian_kernel_1d(half_size: usize, sigma: f32) -> Vec<f32> {
    assert!(sigma > 0.0, "sigma must be positive");
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..2 * half_size + 1)
        .map(|i| {
            let x = i as f32 - half_size as f32;
            (-x * x / two_sigma_sq).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Generate a 2D Gaussian kernel (row-major, `(2h+1)²` taps) as the outer
/// product of [`gaussian_kernel_1d`] with itself. Sums to 1.0.
pub fn gaussian_kernel_2d(half_size: usize, sigma: f32) -> Vec<f32> {
    let k1 = gaussian_kernel_1d(half_size, sigma);
    k1.iter()
        .flat_map(|&ky| k1.iter().map(move |&kx| ky * kx))
        .collect()
}

/// Separable Gaussian filter over the valid region.
///
/// Output is `(W - 2r) × (H - 2r)`; output `(x, y)` is the weighted sum of
/// the `(2r+1)²` neighborhood centered on source `(x + r, y + r)`.
/// With `filter_range == 0` the kernel is `[1.0]` and the output equals the
/// input.
///
/// # Panics
/// Panics if `sigma <= 0` or either side of `src` is below `2r + 1`.
pub fn gaussian_filter(src: &Image<f32>, filter_range: usize, sigma: f32) -> Image<f32> {
    let kernel = gaussian_kernel_1d(filter_range, sigma);
    let horizontal = convolve_rows_valid(src, &kernel);
    convolve_cols_valid(&horizontal, &kernel)
}

/// Single-pass 2D Gaussian filter. Same contract as [`gaussian_filter`];
/// kept as the reference the separable version is checked against.
///
/// # Panics
/// Panics if `sigma <= 0` or either side of `src` is below `2r + 1`.
pub fn gaussian_filter_2d(src: &Image<f32>, filter_range: usize, sigma: f32) -> Image<f32> {
    let size = 2 * filter_range + 1;
    assert!(
        src.width() >= size && src.height() >= size,
        "image {}×{} smaller than {size}×{size} kernel",
        src.width(),
        src.height()
    );
    let kernel = gaussian_kernel_2d(filter_range, sigma);

    let mut dst = Image::<f32>::new(src.width() + 1 - size, src.height() + 1 - size);
    dst.for_each_row_mut(|y, row| {
        for (x, out) in row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for ky in 0..size {
                let src_row = &src.row(y + ky)[x..x + size];
                let k_row = &kernel[ky * size..(ky + 1) * size];
                for (&s, &kv) in src_row.iter().zip(k_row) {
                    acc += s * kv;
                }
            }
            *out = acc;
        }
    });
    dst
}
