//! Connected-component labeling for change masks
//!
//! Groups adjacent set pixels into regions via breadth-first flood fill.
//! Labels are assigned in row-major discovery order, so identical masks
//! always produce identical label maps.

use canopy_core::raster::{Mask, Raster};
use std::collections::VecDeque;

/// 4-neighborhood offsets (edge-adjacent)
const OFFSETS_FOUR: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

/// 8-neighborhood offsets (edge- and corner-adjacent)
const OFFSETS_EIGHT: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Pixel adjacency rule for region grouping.
///
/// `Eight` is the default: vegetation-loss patches follow terrain and
/// clearing patterns, and diagonal-adjacent fragments are almost always
/// one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Edge-adjacent only
    Four,
    /// Edge- and corner-adjacent
    #[default]
    Eight,
}

impl Connectivity {
    fn offsets(self) -> &'static [(isize, isize)] {
        match self {
            Connectivity::Four => &OFFSETS_FOUR,
            Connectivity::Eight => &OFFSETS_EIGHT,
        }
    }
}

/// Label connected regions of set pixels in a mask.
///
/// Returns a label raster (0 = background, regions numbered from 1 in
/// row-major discovery order) and the number of regions found.
///
/// # Arguments
/// * `mask` - Input mask, `true` = pixel belongs to some region
/// * `connectivity` - Adjacency rule for grouping
pub fn label_regions(mask: &Mask, connectivity: Connectivity) -> (Raster<i32>, usize) {
    let (rows, cols) = mask.dim();
    let mut labels: Raster<i32> = Raster::new(rows, cols);
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
    let offsets = connectivity.offsets();

    let mut next_label: i32 = 0;

    for row in 0..rows {
        for col in 0..cols {
            if !mask[(row, col)] {
                continue;
            }
            if unsafe { labels.get_unchecked(row, col) } != 0 {
                continue;
            }

            next_label += 1;
            unsafe { labels.set_unchecked(row, col, next_label) };
            queue.push_back((row, col));

            while let Some((r, c)) = queue.pop_front() {
                for &(dr, dc) in offsets {
                    let nr = r as isize + dr;
                    let nc = c as isize + dc;
                    if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                        continue;
                    }
                    let nr = nr as usize;
                    let nc = nc as usize;

                    if !mask[(nr, nc)] {
                        continue;
                    }
                    if unsafe { labels.get_unchecked(nr, nc) } != 0 {
                        continue;
                    }

                    unsafe { labels.set_unchecked(nr, nc, next_label) };
                    queue.push_back((nr, nc));
                }
            }
        }
    }

    (labels, next_label as usize)
}
