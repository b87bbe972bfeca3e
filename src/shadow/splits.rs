use super::MAX_SHADOW_CASCADES;

/// View-space far depth of each cascade, rebuilt every frame from the configured percentages.
///
/// Cascade `i` covers `[boundary(i - 1), boundary(i)]`, with the camera near plane standing in for
/// `boundary(-1)`. Unused entries repeat the last active boundary so the whole array stays non-decreasing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeSplits {
    near: f32,
    count: usize,
    boundaries: [f32; MAX_SHADOW_CASCADES],
    repaired: bool,
}

impl CascadeSplits {
    /// Converts percentages of the `[near, far]` range into split depths.
    ///
    /// Percentages are clamped to `[0, 100]`, the cascade count to `[1, MAX_SHADOW_CASCADES]` (an empty
    /// list yields one full-range cascade), and out-of-order entries are pulled onto their neighbour.
    pub fn compute(near: f32, far: f32, percentages: &[f32]) -> Self {
        let count = percentages.len().clamp(1, MAX_SHADOW_CASCADES);
        let near = if near.is_finite() { near } else { 0.0 };
        let far = if far.is_finite() && far >= near { far } else { near };
        let mut boundaries = [far; MAX_SHADOW_CASCADES];
        for (idx, boundary) in boundaries.iter_mut().enumerate().take(count) {
            let percent = percentages.get(idx).copied().unwrap_or(100.0);
            let percent = if percent.is_finite() { percent.clamp(0.0, 100.0) } else { 100.0 };
            let t = percent / 100.0;
            // Endpoint-exact form of `near + t * (far - near)`.
            *boundary = (near * (1.0 - t) + far * t).clamp(near, far);
        }
        let repaired = enforce_monotonic(&mut boundaries[..count]);
        let last = boundaries[count - 1];
        for boundary in boundaries.iter_mut().skip(count) {
            *boundary = last;
        }
        Self { near, count, boundaries, repaired }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Active boundaries, one per cascade.
    pub fn boundaries(&self) -> &[f32] {
        &self.boundaries[..self.count]
    }

    /// Full fixed-size array as handed to the shading stage.
    pub fn padded(&self) -> [f32; MAX_SHADOW_CASCADES] {
        self.boundaries
    }

    /// `[zNear, zFar]` of one cascade.
    pub fn range(&self, cascade: usize) -> (f32, f32) {
        let cascade = cascade.min(self.count - 1);
        let start = if cascade == 0 { self.near } else { self.boundaries[cascade - 1] };
        (start, self.boundaries[cascade])
    }

    /// Whether the configured percentages were out of order and had to be repaired.
    pub fn was_repaired(&self) -> bool {
        self.repaired
    }
}

/// Two sweeps: left-to-right raises any entry below its predecessor, right-to-left lowers any entry above
/// its successor. Returns `true` when something moved.
fn enforce_monotonic(values: &mut [f32]) -> bool {
    let mut repaired = false;
    for idx in 1..values.len() {
        if values[idx] < values[idx - 1] {
            values[idx] = values[idx - 1];
            repaired = true;
        }
    }
    for idx in (0..values.len().saturating_sub(1)).rev() {
        if values[idx] > values[idx + 1] {
            values[idx] = values[idx + 1];
            repaired = true;
        }
    }
    repaired
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-4 * b.abs().max(1.0)
    }

    #[test]
    fn single_full_cascade_reaches_far_plane() {
        let splits = CascadeSplits::compute(0.001, 200.0, &[100.0]);
        assert_eq!(splits.count(), 1);
        assert_eq!(splits.boundaries(), &[200.0]);
        assert!(!splits.was_repaired());
    }

    #[test]
    fn out_of_order_percentages_are_repaired() {
        let splits = CascadeSplits::compute(0.0, 100.0, &[10.0, 90.0, 50.0]);
        assert!(splits.was_repaired());
        let b = splits.boundaries();
        assert!(b.windows(2).all(|pair| pair[0] <= pair[1]), "{b:?}");
        assert!(approx(b[0], 10.0));
        assert!(approx(b[1], 90.0));
        assert_eq!(b[2], b[1]);
    }

    #[test]
    fn percentages_are_clamped() {
        let splits = CascadeSplits::compute(1.0, 11.0, &[-20.0, 250.0]);
        assert_eq!(splits.boundaries(), &[1.0, 11.0]);
    }

    #[test]
    fn cascade_count_is_clamped() {
        let many = [10.0; 12];
        assert_eq!(CascadeSplits::compute(0.1, 50.0, &many).count(), MAX_SHADOW_CASCADES);
        let none = CascadeSplits::compute(0.1, 50.0, &[]);
        assert_eq!(none.count(), 1);
        assert_eq!(none.boundaries(), &[50.0]);
    }

    #[test]
    fn degenerate_range_collapses_boundaries() {
        let splits = CascadeSplits::compute(5.0, 5.0, &[10.0, 50.0, 100.0]);
        assert!(splits.boundaries().iter().all(|b| *b == 5.0));
        assert_eq!(splits.range(2), (5.0, 5.0));
    }

    #[test]
    fn ranges_chain_from_near_plane() {
        let splits = CascadeSplits::compute(0.5, 100.5, &[10.0, 40.0, 100.0]);
        let (start, end) = splits.range(0);
        assert_eq!(start, 0.5);
        assert!(approx(end, 10.5));
        let (start, end) = splits.range(1);
        assert_eq!(start, splits.boundaries()[0]);
        assert!(approx(end, 40.5));
        assert_eq!(splits.range(2).1, 100.5);
        assert_eq!(splits.padded()[7], 100.5);
    }
}
