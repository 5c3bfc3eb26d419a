// image.rs — Dense single-channel grid, generic over pixel type.
//
// Every stage of the Harris pipeline produces a new, smaller grid from the
// previous one: input (W×H) → derivatives (W-2 × H-2) → smoothed
// (W-2-2r × H-2-2r) → response. Grids are owned values that move from
// stage to stage; nothing is shared and nothing is updated in place.
//
// Layout is row-major with no padding, so a row is a contiguous slice and
// chunking the buffer by `width` yields disjoint rows. That is what lets
// `for_each_row_mut` hand rows to rayon workers without any locking.

use std::fmt;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

// ---------------------------------------------------------------------------
// Pixel Trait
// ---------------------------------------------------------------------------

/// Trait for types that can serve as pixel values in an Image.
///
/// `Send + Sync` are required so grids can be read from and written to by
/// parallel row workers.
pub trait Pixel: Copy + Default + Send + Sync + PartialOrd + 'static {
    /// Convert this pixel value to f32 (raw, not normalized).
    fn to_f32(self) -> f32;

    /// Construct a pixel from an f32 value (with appropriate clamping/rounding).
    fn from_f32(v: f32) -> Self;
}

impl Pixel for u8 {
    #[inline]
    fn to_f32(self) -> f32 {
        // Raw cast. Use convert::u8_to_f32_normalized() for [0,1] mapping.
        self as f32
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v.clamp(0.0, 255.0).round() as u8
    }
}

impl Pixel for f32 {
    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v
    }
}

// ---------------------------------------------------------------------------
// Image<T>
// ---------------------------------------------------------------------------

/// A 2D single-channel image with runtime dimensions.
#[derive(Clone, PartialEq)]
pub struct Image<T: Pixel> {
    /// Pixel data in row-major order. Length = width * height.
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T: Pixel> Image<T> {
    /// Create a zero-initialized image.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }

    /// Create an image with every pixel set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Image {
            data: vec![value; width * height],
            width,
            height,
        }
    }

    /// Create an image from an existing row-major pixel vector.
    ///
    /// # Panics
    /// Panics if `data.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Self {
        assert_eq!(
            data.len(),
            width * height,
            "data length ({}) must equal width * height ({})",
            data.len(),
            width * height,
        );
        Image {
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

    /// True when both images have identical width and height.
    #[inline]
    pub fn same_size<U: Pixel>(&self, other: &Image<U>) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Get the pixel value at (x, y). x is column, y is row.
    ///
    /// # Panics
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.bounds_check(x, y);
        self.data[y * self.width + x]
    }

    /// Set the pixel at (x, y).
    ///
    /// # Panics
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.bounds_check(x, y);
        let idx = y * self.width + x;
        self.data[idx] = value;
    }

    /// Borrow a single row as a slice.
    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        assert!(y < self.height, "row {y} out of bounds (height {})", self.height);
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    /// Mutable borrow of a single row.
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        assert!(y < self.height, "row {y} out of bounds (height {})", self.height);
        let start = y * self.width;
        &mut self.data[start..start + self.width]
    }

    /// Fill the image row by row.
    ///
    /// `f(y, row)` receives the row index and the mutable row slice. With the
    /// `rayon` feature the rows are distributed over the global thread pool;
    /// each call writes only its own row, so the result does not depend on
    /// scheduling.
    pub fn for_each_row_mut<F>(&mut self, f: F)
    where
        F: Fn(usize, &mut [T]) + Send + Sync,
    {
        if self.width == 0 {
            return;
        }
        let width = self.width;

        #[cfg(feature = "rayon")]
        self.data
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| f(y, row));

        #[cfg(not(feature = "rayon"))]
        self.data
            .chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    }

    /// Iterate over all pixels as `(x, y, value)` tuples in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| (x, y, self.data[y * self.width + x]))
        })
    }

    /// Access the underlying data as a flat row-major slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Consume the image, returning its pixel buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    #[inline]
    fn bounds_check(&self, x: usize, y: usize) {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x},{y}) out of bounds for image {}×{}",
            self.width,
            self.height,
        );
    }
}

// Debug formatting — prints at most an 8×16 corner of the image.
impl<T: Pixel + fmt::Debug> fmt::Debug for Image<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Image<{}> {{ {}×{} }}",
            std::any::type_name::<T>(),
            self.width,
            self.height,
        )?;
        for y in 0..self.height.min(8) {
            write!(f, "  row {y}: [")?;
            for x in 0..self.width.min(16) {
                if x > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:?}", self.get(x, y))?;
            }
            if self.width > 16 {
                write!(f, ", ...")?;
            }
            writeln!(f, "]")?;
        }
        if self.height > 8 {
            writeln!(f, "  ...")?;
        }
        Ok(())
    }
}

impl<T: Pixel> std::ops::Index<(usize, usize)> for Image<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &T {
        self.bounds_check(x, y);
        &self.data[y * self.width + x]
    }
}

impl<T: Pixel> std::ops::IndexMut<(usize, usize)> for Image<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        self.bounds_check(x, y);
        let idx = y * self.width + x;
        &mut self.data[idx]
    }
}
