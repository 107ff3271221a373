//! Binary mask and square-element morphology.
//!
//! The window is clipped at the image border, which for a 3x3 element gives the
//! same result as edge reflection.

/// Foreground/background mask, row-major, `true` = foreground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<bool>,
}

impl Mask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![false; width * height],
        }
    }

    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> bool) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        self.data[row * self.width + col] = value;
    }

    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }
}

/// Square structuring element of a given side length.
#[derive(Debug, Clone, Copy)]
pub struct SquareElement {
    size: usize,
}

impl SquareElement {
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    /// Offsets covered by the element, relative to its origin.
    /// Even sizes put the extra cell on the positive side.
    fn offsets(&self) -> (isize, isize) {
        let lo = -((self.size / 2) as isize);
        let hi = self.size as isize - 1 + lo;
        (lo, hi)
    }

    fn is_identity(&self) -> bool {
        self.size <= 1
    }

    pub fn dilate(&self, mask: &Mask) -> Mask {
        if self.is_identity() {
            return mask.clone();
        }
        let (lo, hi) = self.offsets();
        // Dilation uses the reflected element.
        sweep(mask, -hi, -lo, false)
    }

    pub fn erode(&self, mask: &Mask) -> Mask {
        if self.is_identity() {
            return mask.clone();
        }
        let (lo, hi) = self.offsets();
        sweep(mask, lo, hi, true)
    }

    /// Dilation followed by erosion.
    pub fn close(&self, mask: &Mask) -> Mask {
        self.erode(&self.dilate(mask))
    }

    /// Erosion followed by dilation.
    pub fn open(&self, mask: &Mask) -> Mask {
        self.dilate(&self.erode(mask))
    }
}

/// Separable min/max filter over `[lo, hi]` on both axes.
/// `all == true` computes erosion (every in-bounds neighbour set), otherwise dilation.
fn sweep(mask: &Mask, lo: isize, hi: isize, all: bool) -> Mask {
    let (w, h) = (mask.width, mask.height);
    let mut horizontal = Mask::new(w, h);
    for row in 0..h {
        for col in 0..w {
            let mut acc = all;
            for d in lo..=hi {
                let c = col as isize + d;
                if c < 0 || c >= w as isize {
                    continue;
                }
                let v = mask.get(row, c as usize);
                if all && !v {
                    acc = false;
                    break;
                }
                if !all && v {
                    acc = true;
                    break;
                }
            }
            horizontal.set(row, col, acc);
        }
    }

    let mut out = Mask::new(w, h);
    for row in 0..h {
        for col in 0..w {
            let mut acc = all;
            for d in lo..=hi {
                let r = row as isize + d;
                if r < 0 || r >= h as isize {
                    continue;
                }
                let v = horizontal.get(r as usize, col);
                if all && !v {
                    acc = false;
                    break;
                }
                if !all && v {
                    acc = true;
                    break;
                }
            }
            out.set(row, col, acc);
        }
    }
    out
}
