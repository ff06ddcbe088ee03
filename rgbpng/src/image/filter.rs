use super::{Result, Error};
use super::header::CHANNELS;

use std::convert::TryFrom;
use log::{debug, trace};

/// Distance in bytes to the same channel of the pixel on the left.
const BPP: usize = CHANNELS;

/// Per-scanline filter selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FilterType {
    None  = 0,
    Sub   = 1,
    Up    = 2,
    Avg   = 3,
    Paeth = 4,
}

impl TryFrom<u8> for FilterType {
    type Error = u8;
    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Ok(match value {
            0 => FilterType::None,
            1 => FilterType::Sub,
            2 => FilterType::Up,
            3 => FilterType::Avg,
            4 => FilterType::Paeth,
            _ => return Err(value),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Predictor {
    None,
    Sub,
    Up,
    Avg,
    Paeth,
    /// average against a zero prior row
    AvgFirst,
}

impl Predictor {
    // The row above the first one is all zeros, so the filters that look up
    // collapse into cheaper ones: up(0) = none, paeth(a, 0, 0) = a = sub.
    fn first_row(filter: FilterType) -> Self {
        match filter {
            FilterType::None  => Predictor::None,
            FilterType::Sub   => Predictor::Sub,
            FilterType::Up    => Predictor::None,
            FilterType::Avg   => Predictor::AvgFirst,
            FilterType::Paeth => Predictor::Sub,
        }
    }

    fn other_rows(filter: FilterType) -> Self {
        match filter {
            FilterType::None  => Predictor::None,
            FilterType::Sub   => Predictor::Sub,
            FilterType::Up    => Predictor::Up,
            FilterType::Avg   => Predictor::Avg,
            FilterType::Paeth => Predictor::Paeth,
        }
    }
}

pub fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let (ia, ib, ic) = (a as i16, b as i16, c as i16);
    let p = ia + ib - ic;
    let pa = (p-ia).abs();
    let pb = (p-ib).abs();
    let pc = (p-ic).abs();
    if pa <= pb && pa <= pc { return a; }
    if pb <= pc { return b; }
    c
}

/// Reverses the filter of one scanline into `cur`.
///
/// `prior` is the reconstructed row above. It is never read by the first row
/// predictors, which is the only case where it may be empty.
fn unfilter_row(pred: Predictor, raw: &[u8], prior: &[u8], cur: &mut [u8]) {
    debug_assert_eq!(raw.len(), cur.len());

    // first pixel: left and above-left are zero
    for k in 0..BPP {
        let delta = match pred {
            Predictor::None     => 0,
            Predictor::Sub      => 0,
            Predictor::Up       => prior[k],
            Predictor::Avg      => prior[k] >> 1,
            Predictor::Paeth    => paeth(0, prior[k], 0),
            Predictor::AvgFirst => 0,
        };
        cur[k] = raw[k].wrapping_add(delta);
    }

    let nk = raw.len();
    match pred {
        Predictor::None => {
            cur[BPP..].copy_from_slice(&raw[BPP..]);
        },
        _ => {
            for k in BPP..nk {
                let left = cur[k-BPP];
                let delta = match pred {
                    Predictor::None     => 0,
                    Predictor::Sub      => left,
                    Predictor::Up       => prior[k],
                    Predictor::Avg      => ((prior[k] as u16 + left as u16) >> 1) as u8,
                    Predictor::Paeth    => paeth(left, prior[k], prior[k-BPP]),
                    Predictor::AvgFirst => left >> 1,
                };
                cur[k] = raw[k].wrapping_add(delta);
            }
        },
    }
}

/// Turns the decompressed stream into `height` rows of `width` RGB pixels.
///
/// Each scanline is a filter byte followed by `width * 3` filtered bytes. Data
/// past the last scanline is ignored.
pub fn unfilter_scanlines(filtered: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    trace!("unfilter_scanlines: width={}, height={}, filtered={}", width, height, filtered.len());
    let stride = width.checked_mul(BPP).ok_or_else(|| Error::bad_dims("too large"))?;
    let img_len = stride.checked_add(1)
        .and_then(|line| line.checked_mul(height))
        .ok_or_else(|| Error::bad_dims("too large"))?;
    if stride == 0 || height == 0 { return Err(Error::bad_dims("0-pixel image")); }

    if filtered.len() < img_len {
        return Err(Error::truncated(format!("not enough pixels: need {}, got {}", img_len, filtered.len())));
    }
    if filtered.len() > img_len {
        debug!("{} bytes after the last scanline ignored", filtered.len() - img_len);
    }

    let mut out = vec![0u8; stride * height];
    for (j, line) in filtered[..img_len].chunks_exact(stride + 1).enumerate() {
        let (selector, raw) = (line[0], &line[1..]);
        let filter = FilterType::try_from(selector).map_err(|v| Error::invalid_filter(j, v))?;

        let (done, rest) = out.split_at_mut(j * stride);
        let cur = &mut rest[..stride];
        if j == 0 {
            unfilter_row(Predictor::first_row(filter), raw, &[], cur);
        } else {
            unfilter_row(Predictor::other_rows(filter), raw, &done[(j-1)*stride..], cur);
        }
    }

    Ok(out)
}

/// Lays out `pixels` as scanlines that all use filter `None`.
pub fn filter_none(pixels: &[u8], width: usize) -> Vec<u8> {
    let stride = width * BPP;
    if stride == 0 { return Vec::new(); }
    let mut out = Vec::with_capacity(pixels.len() + pixels.len() / stride);
    for row in pixels.chunks(stride) {
        out.push(FilterType::None as u8);
        out.extend_from_slice(row);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ErrorKind;
    use quickcheck::{quickcheck, TestResult};

    // Forward filtering, straight from the definitions, zeros outside the image.
    fn filter_reference(filter: FilterType, pixels: &[u8], width: usize) -> Vec<u8> {
        let stride = width * BPP;
        let at = |row: Option<usize>, x: Option<usize>| -> i32 {
            match (row, x) {
                (Some(r), Some(x)) => pixels[r*stride + x] as i32,
                _ => 0,
            }
        };
        let mut out = vec![];
        for y in 0..pixels.len() / stride {
            out.push(filter as u8);
            for x in 0..stride {
                let up = y.checked_sub(1);
                let left = x.checked_sub(BPP);
                let (a, b, c) = (at(Some(y), left), at(up, Some(x)), at(up, left));
                let pred = match filter {
                    FilterType::None  => 0,
                    FilterType::Sub   => a,
                    FilterType::Up    => b,
                    FilterType::Avg   => (a + b) / 2,
                    FilterType::Paeth => paeth(a as u8, b as u8, c as u8) as i32,
                };
                out.push((at(Some(y), Some(x)) - pred) as u8);
            }
        }
        out
    }

    #[test]
    fn paeth_prefers_closest() {
        // p = 15, distances (5, 5, 0)
        assert_eq!(paeth(10, 20, 15), 15);
    }

    #[test]
    fn paeth_tie_break_order() {
        // p = 10: pa = 0
        assert_eq!(paeth(10, 10, 10), 10);
        // p = 20, pa = 10, pb = 0, pc = 10
        assert_eq!(paeth(10, 20, 10), 20);
        // p = 0, pa = 10 pb = 10 pc = 20: left wins the tie
        assert_eq!(paeth(10, 10, 20), 10);
        // p = 15, pa = 5 pb = 15 pc = 10
        assert_eq!(paeth(20, 0, 5), 20);
        // p = -5, pa = 5 pb = 5 pc = 10
        assert_eq!(paeth(0, 0, 5), 0);
    }

    #[test]
    fn paeth_is_computed_wide() {
        // p = 255 + 255 - 0 = 510 must not wrap
        assert_eq!(paeth(255, 255, 0), 255);
        assert_eq!(paeth(0, 255, 255), 0);
    }

    #[test]
    fn sub_uses_pixel_stride() {
        let filtered = [1, 5, 0, 0, 3, 0, 0];
        let out = unfilter_scanlines(&filtered, 2, 1).unwrap();
        assert_eq!(out, vec![5, 0, 0, 8, 0, 0]);
    }

    #[test]
    fn single_pixel_none() {
        let out = unfilter_scanlines(&[0, 10, 20, 30], 1, 1).unwrap();
        assert_eq!(out, vec![10, 20, 30]);
    }

    #[test]
    fn up_and_avg_read_the_previous_row() {
        let filtered = [
            0, 100, 200, 250,
            2,  10,  60,  10,
            3,   1,   2,   3,
        ];
        let out = unfilter_scanlines(&filtered, 1, 3).unwrap();
        assert_eq!(out, vec![
            100, 200, 250,
            110,   4,   4, // wraps mod 256
             56,   4,   5,
        ]);
    }

    #[test]
    fn avg_sum_does_not_overflow() {
        // left = 200, above = 200: (200 + 200) / 2 = 200, not (400 mod 256) / 2
        let filtered = [
            0, 200, 0, 0, 200, 0, 0,
            3, 100, 0, 0,   0, 0, 0,
        ];
        let out = unfilter_scanlines(&filtered, 2, 2).unwrap();
        assert_eq!(&out[6..], &[200, 0, 0, 200, 0, 0]);
    }

    #[test]
    fn first_row_filters_see_zero_above() {
        let row = [7, 8, 9, 70, 80, 90];
        for &f in [FilterType::Up, FilterType::Avg, FilterType::Paeth].iter() {
            let filtered = filter_reference(f, &row, 2);
            assert_eq!(unfilter_scanlines(&filtered, 2, 1).unwrap(), row.to_vec(), "{:?}", f);
        }
    }

    #[test]
    fn invalid_selector() {
        let filtered = [0, 1, 2, 3, 5, 1, 2, 3];
        let err = unfilter_scanlines(&filtered, 1, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFilterSelector { row: 1, value: 5 });
    }

    #[test]
    fn short_stream_is_truncated() {
        let err = unfilter_scanlines(&[0, 1, 2, 3, 0, 1, 2], 1, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
    }

    #[test]
    fn trailing_data_is_ignored() {
        let out = unfilter_scanlines(&[0, 1, 2, 3, 0, 0, 0], 1, 1).unwrap();
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    fn filter_none_prefixes_rows() {
        assert_eq!(filter_none(&[1, 2, 3, 4, 5, 6], 1), vec![0, 1, 2, 3, 0, 4, 5, 6]);
    }

    quickcheck! {
        fn none_round_trip(w: u8, h: u8, seed: Vec<u8>) -> TestResult {
            let (w, h) = (w as usize % 16 + 1, h as usize % 16 + 1);
            if seed.is_empty() { return TestResult::discard(); }
            let pixels: Vec<u8> = seed.iter().cycle().take(w * h * BPP).copied().collect();
            let out = unfilter_scanlines(&filter_none(&pixels, w), w, h).unwrap();
            TestResult::from_bool(out == pixels)
        }

        fn every_filter_round_trips(w: u8, h: u8, kind: u8, seed: Vec<u8>) -> TestResult {
            let (w, h) = (w as usize % 12 + 1, h as usize % 12 + 1);
            if seed.is_empty() { return TestResult::discard(); }
            let filter = FilterType::try_from(kind % 5).unwrap();
            let pixels: Vec<u8> = seed.iter().cycle().take(w * h * BPP).copied().collect();
            let out = unfilter_scanlines(&filter_reference(filter, &pixels, w), w, h).unwrap();
            TestResult::from_bool(out == pixels)
        }
    }
}
