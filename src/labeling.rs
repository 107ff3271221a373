use crate::morphology::Mask;
use bumpalo::Bump;

/// Connected-component labels, row-major. 0 is background.
#[derive(Debug, Clone)]
pub struct LabelGrid {
    pub width: usize,
    pub height: usize,
    pub labels: Vec<u32>,
    pub num_labels: u32,
}

impl LabelGrid {
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.labels[row * self.width + col]
    }
}

/// Label the 8-connected foreground components of `mask`.
///
/// Labels start at 1 and follow the row-major position of each component's
/// first pixel.
pub fn label(mask: &Mask) -> LabelGrid {
    let (width, height) = (mask.width, mask.height);
    let mut labels = vec![0u32; width * height];
    let mut next_label = 0u32;

    // Scratch stack for the flood fill, reused across components.
    let arena = Bump::new();
    let mut stack = bumpalo::collections::Vec::new_in(&arena);

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            if !mask.data[idx] || labels[idx] != 0 {
                continue;
            }

            next_label += 1;
            labels[idx] = next_label;
            stack.push((x, y));

            while let Some((cx, cy)) = stack.pop() {
                for dy in -1i32..=1 {
                    for dx in -1i32..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = cx as i32 + dx;
                        let ny = cy as i32 + dy;
                        if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                            continue;
                        }
                        let nidx = ny as usize * width + nx as usize;
                        if mask.data[nidx] && labels[nidx] == 0 {
                            labels[nidx] = next_label;
                            stack.push((nx as usize, ny as usize));
                        }
                    }
                }
            }
        }
    }

    LabelGrid {
        width,
        height,
        labels,
        num_labels: next_label,
    }
}
