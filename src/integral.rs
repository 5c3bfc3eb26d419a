// integral.rs — Summed-area table and the box (mean) filter built on it.
//
// The table has one extra row and column of zeros:
//
//   table(0, _) = table(_, 0) = 0
//   table(c + 1, r + 1) = Σ src(x, y) for x ≤ c, y ≤ r
//
// so the sum over any half-open rectangle [x0, x1) × [y0, y1) is
//
//   table(x1, y1) - table(x0, y1) - table(x1, y0) + table(x0, y0)
//
// regardless of window size. Partial sums are kept in f64: they grow with
// the image area and f32 would lose the low bits of small windows.

use crate::image::{Image, Pixel};

/// Summed-area table of a single-channel image.
pub struct IntegralImage {
    data: Vec<f64>,
    /// Table width = source width + 1.
    width: usize,
    /// Table height = source height + 1.
    height: usize,
}

impl IntegralImage {
    /// Build the `(W+1) × (H+1)` table for `src`.
    pub fn new<T: Pixel>(src: &Image<T>) -> Self {
        let width = src.width() + 1;
        let height = src.height() + 1;
        let mut data = vec![0.0f64; width * height];

        for y in 0..src.height() {
            let mut row_sum = 0.0f64;
            for (x, &v) in src.row(y).iter().enumerate() {
                row_sum += v.to_f32() as f64;
                let above = data[y * width + x + 1];
                data[(y + 1) * width + x + 1] = above + row_sum;
            }
        }

        IntegralImage {
            data,
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Table entry `(x, y)`: sum of source pixels in `[0, x) × [0, y)`.
    ///
    /// # Panics
    /// Panics if `x >= width()` or `y >= height()`.
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f64 {
        assert!(
            x < self.width && y < self.height,
            "table entry ({x},{y}) out of bounds for {}×{}",
            self.width,
            self.height
        );
        self.data[y * self.width + x]
    }

    /// Sum of source pixels in the half-open rectangle `[x0, x1) × [y0, y1)`.
    ///
    /// # Panics
    /// Panics if `x0 > x1`, `y0 > y1`, or the rectangle leaves the source.
    #[inline]
    pub fn rect_sum(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> f64 {
        assert!(x0 <= x1 && y0 <= y1, "inverted rectangle ({x0},{y0})-({x1},{y1})");
        self.at(x1, y1) - self.at(x0, y1) - self.at(x1, y0) + self.at(x0, y0)
    }
}

/// Mean filter over `(2r+1)²` windows, valid region only.
///
/// Output is `(W - 2r) × (H - 2r)`; output `(x, y)` is the mean of the
/// window centered on source `(x + r, y + r)`. With `filter_range == 0` the
/// output equals the input.
///
/// # Panics
/// Panics if either side of `src` is below `2r + 1`.
pub fn box_filter(src: &Image<f32>, filter_range: usize) -> Image<f32> {
    let size = 2 * filter_range + 1;
    assert!(
        src.width() >= size && src.height() >= size,
        "image {}×{} smaller than {size}×{size} window",
        src.width(),
        src.height()
    );

    let table = IntegralImage::new(src);
    let area = (size * size) as f64;
    let mut dst = Image::<f32>::new(src.width() + 1 - size, src.height() + 1 - size);
    dst.for_each_row_mut(|y, row| {
        for (x, out) in row.iter_mut().enumerate() {
            *out = (table.rect_sum(x, y, x + size, y + size) / area) as f32;
        }
    });
    dst
}
