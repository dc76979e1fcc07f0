//! Generic volume algorithms
//!
//! Each algorithm is written once over the element type and reached from a
//! type-erased representation through dispatch.
//!
//! # Parallel Processing
//!
//! When the `parallel` feature is enabled, range and histogram computation
//! and format conversion use rayon.

use std::sync::atomic::{AtomicBool, Ordering};

use implore_formats::{convert_normalized, from_dvec, All, Element, Primitive, Size3, Vec4d};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::HistogramConfig;
use crate::error::{ConfigError, VolumeError, VolumeResult};
use crate::index::pos_to_index;
use crate::representation::{
    dispatch2, VolumeDispatcher, VolumeDispatcher2, VolumeDispatcherMut, VolumeRepresentation,
};
use crate::typed::TypedVolume;

/// Value range of one channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelRange {
    pub min: f64,
    pub max: f64,
}

impl ChannelRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    const EMPTY: ChannelRange = ChannelRange {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    fn include(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Smallest range covering both
    pub fn merge(mut self, other: ChannelRange) -> ChannelRange {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

/// Per-channel min/max over all voxels, NaN values ignored
pub fn data_range(volume: &dyn VolumeRepresentation) -> VolumeResult<Vec<ChannelRange>> {
    volume.dispatch::<All, _>(DataRange)?
}

struct DataRange;

impl VolumeDispatcher for DataRange {
    type Output = VolumeResult<Vec<ChannelRange>>;

    fn call<T: Element>(self, volume: &TypedVolume<T>) -> Self::Output {
        let data = volume.data();
        if data.is_empty() {
            return Err(VolumeError::Empty);
        }

        let init = || vec![ChannelRange::EMPTY; T::COMPONENTS];
        let fold = |mut acc: Vec<ChannelRange>, value: &T| {
            for (range, c) in acc.iter_mut().zip(value.components()) {
                range.include(c.to_f64());
            }
            acc
        };

        #[cfg(feature = "parallel")]
        let ranges = data.par_iter().fold(init, fold).reduce(init, merge_ranges);

        #[cfg(not(feature = "parallel"))]
        let ranges = data.iter().fold(init(), fold);

        Ok(ranges)
    }
}

#[cfg(feature = "parallel")]
fn merge_ranges(a: Vec<ChannelRange>, b: Vec<ChannelRange>) -> Vec<ChannelRange> {
    a.into_iter().zip(b).map(|(a, b)| a.merge(b)).collect()
}

/// Histogram of one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Value range covered by the bins
    pub range: ChannelRange,
    /// Sample count per bin
    pub counts: Vec<u64>,
    /// Number of samples that fell inside the range
    pub total: u64,
}

impl Histogram {
    fn empty(range: ChannelRange, bins: usize) -> Self {
        Self {
            range,
            counts: vec![0; bins],
            total: 0,
        }
    }

    /// Bin containing `value`, `None` outside the range or for NaN
    pub fn bin_of(&self, value: f64) -> Option<usize> {
        if !(value >= self.range.min && value <= self.range.max) {
            return None;
        }
        let bins = self.counts.len();
        let width = self.range.width();
        if width <= 0.0 {
            return Some(0);
        }
        let bin = ((value - self.range.min) / width * bins as f64) as usize;
        Some(bin.min(bins - 1))
    }

    fn add(&mut self, value: f64) {
        if let Some(bin) = self.bin_of(value) {
            self.counts[bin] += 1;
            self.total += 1;
        }
    }

    fn merge(mut self, other: &Histogram) -> Histogram {
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
        self.total += other.total;
        self
    }

    /// Largest bin count
    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Lower edge of `bin`
    pub fn bin_start(&self, bin: usize) -> f64 {
        self.range.min + self.range.width() * bin as f64 / self.counts.len() as f64
    }
}

/// Per-channel histograms with `bins` bins, sampling every
/// `sample_rate`-th voxel along each axis.
///
/// Without `range` each channel is binned over its own data range.
pub fn calculate_histogram(
    volume: &dyn VolumeRepresentation,
    bins: usize,
    sample_rate: Size3,
    range: Option<ChannelRange>,
) -> VolumeResult<Vec<Histogram>> {
    histograms(volume, bins, sample_rate, range, None)
}

/// [`calculate_histogram`] that gives up with [`VolumeError::Cancelled`]
/// once `stop` is set. The flag is polled once per z-slice.
pub fn calculate_histogram_cancellable(
    volume: &dyn VolumeRepresentation,
    bins: usize,
    sample_rate: Size3,
    range: Option<ChannelRange>,
    stop: &AtomicBool,
) -> VolumeResult<Vec<Histogram>> {
    histograms(volume, bins, sample_rate, range, Some(stop))
}

fn histograms(
    volume: &dyn VolumeRepresentation,
    bins: usize,
    sample_rate: Size3,
    range: Option<ChannelRange>,
    stop: Option<&AtomicBool>,
) -> VolumeResult<Vec<Histogram>> {
    if bins == 0 {
        return Err(ConfigError::OutOfRange("histogram bins must be positive".to_string()).into());
    }
    if sample_rate.product() == 0 {
        return Err(ConfigError::OutOfRange(format!(
            "histogram sample rate must be at least 1 on every axis, got {sample_rate}"
        ))
        .into());
    }

    let ranges = match range {
        Some(range) => vec![range; volume.data_format().components],
        None => data_range(volume)?,
    };

    let histograms = volume.dispatch::<All, _>(Histograms {
        bins,
        sample_rate,
        ranges,
        stop,
    })?;

    let Some(histograms) = histograms else {
        tracing::debug!(format = %volume.format_id(), "histogram calculation cancelled");
        return Err(VolumeError::Cancelled);
    };

    tracing::debug!(
        format = %volume.format_id(),
        dimensions = %volume.dimensions(),
        bins,
        samples = histograms.first().map_or(0, |h| h.total),
        "calculated volume histograms"
    );
    Ok(histograms)
}

/// [`calculate_histogram`] with bins and sample rate from `config`
pub fn calculate_histogram_with(
    volume: &dyn VolumeRepresentation,
    config: &HistogramConfig,
) -> VolumeResult<Vec<Histogram>> {
    calculate_histogram(volume, config.bins, config.sample_rate, None)
}

struct Histograms<'a> {
    bins: usize,
    sample_rate: Size3,
    ranges: Vec<ChannelRange>,
    stop: Option<&'a AtomicBool>,
}

impl VolumeDispatcher for Histograms<'_> {
    /// `None` when cancelled
    type Output = Option<Vec<Histogram>>;

    fn call<T: Element>(self, volume: &TypedVolume<T>) -> Self::Output {
        let dims = volume.dimensions();
        let data = volume.data();
        let step = self.sample_rate;
        let stopped = || self.stop.is_some_and(|stop| stop.load(Ordering::Relaxed));
        let init = || -> Vec<Histogram> {
            self.ranges
                .iter()
                .map(|&range| Histogram::empty(range, self.bins))
                .collect()
        };
        let slice = |z: usize| {
            let mut histograms = init();
            if stopped() {
                return histograms;
            }
            for y in (0..dims.y).step_by(step.y) {
                for x in (0..dims.x).step_by(step.x) {
                    let value = &data[pos_to_index(Size3::new(x, y, z), dims)];
                    for (h, c) in histograms.iter_mut().zip(value.components()) {
                        h.add(c.to_f64());
                    }
                }
            }
            histograms
        };
        let merge = |a: Vec<Histogram>, b: Vec<Histogram>| -> Vec<Histogram> {
            a.into_iter().zip(&b).map(|(a, b)| a.merge(b)).collect()
        };

        let slices: Vec<usize> = (0..dims.z).step_by(step.z).collect();

        #[cfg(feature = "parallel")]
        let histograms = slices.into_par_iter().map(slice).reduce(init, merge);

        #[cfg(not(feature = "parallel"))]
        let histograms = slices.into_iter().map(slice).fold(init(), merge);

        (!stopped()).then_some(histograms)
    }
}

/// Set every voxel to `value`, converted like
/// [`VolumeRepresentation::set_from_dvec4`]
pub fn fill(volume: &mut dyn VolumeRepresentation, value: Vec4d) -> VolumeResult<()> {
    volume.dispatch_mut::<All, _>(Fill(value))
}

struct Fill(Vec4d);

impl VolumeDispatcherMut for Fill {
    type Output = ();

    fn call<T: Element>(self, volume: &mut TypedVolume<T>) {
        let value: T = from_dvec(self.0.to_array());
        volume.data_mut().fill(value);
    }
}

/// Convert `src` into `dst` voxel by voxel with normalized conversion.
///
/// Both volumes must have the same dimensions; formats may differ.
pub fn convert_into(
    src: &dyn VolumeRepresentation,
    dst: &mut dyn VolumeRepresentation,
) -> VolumeResult<()> {
    if src.dimensions() != dst.dimensions() {
        return Err(VolumeError::DimensionMismatch {
            expected: dst.dimensions(),
            actual: src.dimensions(),
        });
    }
    dispatch2::<All, All, _>(src, dst, ConvertInto)
}

struct ConvertInto;

impl VolumeDispatcher2 for ConvertInto {
    type Output = ();

    fn call<S: Element, D: Element>(self, src: &TypedVolume<S>, dst: &mut TypedVolume<D>) {
        let src = src.data();

        #[cfg(feature = "parallel")]
        dst.data_mut()
            .par_iter_mut()
            .zip(src.par_iter())
            .for_each(|(d, s)| *d = convert_normalized(s));

        #[cfg(not(feature = "parallel"))]
        dst.data_mut()
            .iter_mut()
            .zip(src)
            .for_each(|(d, s)| *d = convert_normalized(s));
    }
}
