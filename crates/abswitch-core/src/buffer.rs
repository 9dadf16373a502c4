//! Planar multichannel block view.
//!
//! [`PlanarBlock`] borrows one contiguous slice and treats it as `channels`
//! consecutive runs of `frames` samples. The router mixes channels of the same
//! block into each other, which needs a destination and a source channel
//! borrowed at once; [`PlanarBlock::dest_and_source`] hands out that pair
//! without copying.

/// Borrowed planar audio block (channel-major, no interleaving).
#[derive(Debug)]
pub struct PlanarBlock<'a> {
    data: &'a mut [f32],
    channels: usize,
    frames: usize,
}

impl<'a> PlanarBlock<'a> {
    /// Wrap `data` as `channels` × `frames`.
    ///
    /// Returns `None` if `data` is shorter than `channels * frames`. Extra
    /// trailing samples are ignored.
    pub fn new(data: &'a mut [f32], channels: usize, frames: usize) -> Option<Self> {
        let needed = channels.checked_mul(frames)?;
        let data = data.get_mut(..needed)?;
        Some(Self {
            data,
            channels,
            frames,
        })
    }

    /// Number of channels.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Samples per channel.
    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Read access to one channel.
    #[inline]
    pub fn channel(&self, ch: usize) -> &[f32] {
        &self.data[ch * self.frames..(ch + 1) * self.frames]
    }

    /// Write access to one channel.
    #[inline]
    pub fn channel_mut(&mut self, ch: usize) -> &mut [f32] {
        &mut self.data[ch * self.frames..(ch + 1) * self.frames]
    }

    /// Zero one channel.
    #[inline]
    pub fn clear(&mut self, ch: usize) {
        self.channel_mut(ch).fill(0.0);
    }

    /// Borrow `dest` mutably and `source` immutably at the same time.
    ///
    /// Requires `dest < source`; the router only ever mixes higher channel
    /// groups down into the first one.
    #[inline]
    pub fn dest_and_source(&mut self, dest: usize, source: usize) -> (&mut [f32], &[f32]) {
        debug_assert!(dest < source, "dest {dest} must precede source {source}");
        let frames = self.frames;
        let (head, tail) = self.data.split_at_mut(source * frames);
        (
            &mut head[dest * frames..(dest + 1) * frames],
            &tail[..frames],
        )
    }
}

/// Multiply `buf` by a gain moving linearly from `start` to `end`.
///
/// Equal gains take the flat path: zero clears, unity leaves the samples
/// untouched, anything else scales.
#[inline]
pub fn apply_gain_ramp(buf: &mut [f32], start: f32, end: f32) {
    if start == end {
        apply_gain(buf, start);
        return;
    }

    let increment = (end - start) / buf.len() as f32;
    let mut gain = start;
    for sample in buf.iter_mut() {
        *sample *= gain;
        gain += increment;
    }
}

/// Add `src` into `dest`, scaled by a gain moving linearly from `start` to
/// `end`.
#[inline]
pub fn add_from_with_ramp(dest: &mut [f32], src: &[f32], start: f32, end: f32) {
    let len = dest.len().min(src.len());
    if start == end {
        add_from(&mut dest[..len], &src[..len], start);
        return;
    }

    let increment = (end - start) / len as f32;
    let mut gain = start;
    for (d, &s) in dest[..len].iter_mut().zip(&src[..len]) {
        *d += gain * s;
        gain += increment;
    }
}

#[inline]
fn apply_gain(buf: &mut [f32], gain: f32) {
    if gain == 0.0 {
        buf.fill(0.0);
    } else if gain != 1.0 {
        for sample in buf.iter_mut() {
            *sample *= gain;
        }
    }
}

#[inline]
fn add_from(dest: &mut [f32], src: &[f32], gain: f32) {
    if gain == 0.0 {
        return;
    }
    if gain == 1.0 {
        for (d, &s) in dest.iter_mut().zip(src) {
            *d += s;
        }
    } else {
        for (d, &s) in dest.iter_mut().zip(src) {
            *d += gain * s;
        }
    }
}
