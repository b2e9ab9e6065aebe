//! Waterfall image pipeline
//!
//! Maps line intensities to RGB, accumulates a scrolling history image in
//! live mode and renders the full clip range through a re-entrant offline
//! scan. The engine owns pixel values only; blitting the image is the
//! host's job.

use sc_core::{ScError, ScResult};

/// Rows rendered per `OfflineScan::step` call. Keeps one step short enough
/// to interleave with UI work.
const ROWS_PER_STEP: usize = 20;

/// Intensity byte to waterfall RGB. Warm map: red saturates early, green
/// needs strong input, blue fades out as intensity rises.
pub fn color_map(v: u8) -> [u8; 3] {
    let x = v as f64 / 255.0;
    let r = 255.0 * x.powf(0.9);
    let g = 255.0 * x.powf(2.0);
    let b = 255.0 * (1.2 - x.powf(0.55));
    [
        r.clamp(0.0, 255.0) as u8,
        g.clamp(0.0, 255.0) as u8,
        b.clamp(0.0, 255.0) as u8,
    ]
}

/// Flat RGB8 image, row 0 at the top.
#[derive(Debug, Clone)]
pub struct WaterfallImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl WaterfallImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * 3],
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

    /// Raw RGB8 bytes, `width * height * 3`.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Write one line into `row`, mapping intensities through the color
    /// map. Lines narrower than the image leave the remainder black.
    pub fn write_row(&mut self, row: usize, line: &[u8]) {
        if row >= self.height {
            return;
        }
        let start = row * self.width * 3;
        let cols = line.len().min(self.width);
        for (px, &v) in line.iter().take(cols).enumerate() {
            let rgb = color_map(v);
            self.pixels[start + px * 3..start + px * 3 + 3].copy_from_slice(&rgb);
        }
        for px in cols..self.width {
            self.pixels[start + px * 3..start + px * 3 + 3].copy_from_slice(&[0, 0, 0]);
        }
    }

    /// Scroll the image down one row, freeing row 0.
    pub fn scroll_down(&mut self) {
        let row_bytes = self.width * 3;
        if self.pixels.len() > row_bytes {
            let last = self.pixels.len() - row_bytes;
            self.pixels.copy_within(0..last, row_bytes);
        }
        let n = row_bytes.min(self.pixels.len());
        self.pixels[..n].fill(0);
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }
}

/// Live scrolling waterfall with a time-window cadence: one row every
/// `window_seconds / height` so the image always spans the configured
/// window regardless of tick rate.
#[derive(Debug)]
pub struct LiveWaterfall {
    image: WaterfallImage,
    window_seconds: f64,
    last_row_ms: Option<f64>,
}

impl LiveWaterfall {
    pub fn new(width: usize, height: usize, window_seconds: f64) -> Self {
        Self {
            image: WaterfallImage::new(width, height.max(1)),
            window_seconds,
            last_row_ms: None,
        }
    }

    #[inline]
    pub fn image(&self) -> &WaterfallImage {
        &self.image
    }

    /// Milliseconds between rows for the current window and height.
    pub fn row_interval_ms(&self) -> f64 {
        self.window_seconds * 1000.0 / self.image.height() as f64
    }

    pub fn set_window_seconds(&mut self, seconds: f64) {
        self.window_seconds = seconds;
    }

    /// Replace the image wholesale on a size change. History does not
    /// survive a resize.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.image.width() || height != self.image.height() {
            self.image = WaterfallImage::new(width, height.max(1));
            self.last_row_ms = None;
        }
    }

    /// Offer a line at wall-clock time `now_ms`. Returns true when a row
    /// was written. The first offer only arms the timer.
    pub fn offer(&mut self, now_ms: f64, line: &[u8]) -> bool {
        let last = match self.last_row_ms {
            Some(last) => last,
            None => {
                self.last_row_ms = Some(now_ms);
                return false;
            }
        };
        if now_ms - last < self.row_interval_ms() {
            return false;
        }
        self.image.scroll_down();
        self.image.write_row(0, line);
        self.last_row_ms = Some(now_ms);
        true
    }

    /// Clear the image and disarm the cadence timer.
    pub fn reset(&mut self) {
        self.image.clear();
        self.last_row_ms = None;
    }
}

/// Progress report for one rendered scan row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanProgress {
    pub row: usize,
    pub total_rows: usize,
    pub time_sec: f64,
}

/// Re-entrant offline scan over a clip time range. Each `step` renders a
/// bounded batch of rows so a long scan never blocks the caller.
#[derive(Debug)]
pub struct OfflineScan {
    image: WaterfallImage,
    start_sec: f64,
    end_sec: f64,
    next_row: usize,
}

impl OfflineScan {
    pub fn new(width: usize, height: usize, start_sec: f64, end_sec: f64) -> ScResult<Self> {
        if height == 0 || width == 0 {
            return Err(ScError::InvalidParam(format!(
                "scan image {width}x{height} is empty"
            )));
        }
        if !start_sec.is_finite() || !end_sec.is_finite() || end_sec < start_sec {
            return Err(ScError::InvalidParam(format!(
                "scan range {start_sec}..{end_sec} is invalid"
            )));
        }
        Ok(Self {
            image: WaterfallImage::new(width, height),
            start_sec,
            end_sec,
            next_row: 0,
        })
    }

    #[inline]
    pub fn image(&self) -> &WaterfallImage {
        &self.image
    }

    #[inline]
    pub fn total_rows(&self) -> usize {
        self.image.height()
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.next_row >= self.total_rows()
    }

    /// Clip time for a row: rows spread evenly over the range, first row at
    /// the start, last row at the end.
    pub fn time_for_row(&self, row: usize) -> f64 {
        let rows = self.total_rows();
        if rows <= 1 {
            return self.start_sec;
        }
        let t = row as f64 / (rows - 1) as f64;
        self.start_sec + t * (self.end_sec - self.start_sec)
    }

    /// Render up to [`ROWS_PER_STEP`] rows. `render` produces the line for
    /// one clip time; `progress` is invoked once per finished row. Returns
    /// true when the scan is complete.
    pub fn step(
        &mut self,
        mut render: impl FnMut(f64) -> Vec<u8>,
        mut progress: impl FnMut(ScanProgress),
    ) -> bool {
        let total = self.total_rows();
        let end = (self.next_row + ROWS_PER_STEP).min(total);
        for row in self.next_row..end {
            let time_sec = self.time_for_row(row);
            let line = render(time_sec);
            self.image.write_row(row, &line);
            progress(ScanProgress {
                row,
                total_rows: total,
                time_sec,
            });
        }
        self.next_row = end;
        self.is_done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn color_map_endpoints() {
        assert_eq!(color_map(0), [0, 0, 255]);
        let [r, g, b] = color_map(255);
        assert_eq!(r, 255);
        assert_eq!(g, 255);
        assert!(b <= 51, "hot end stays warm, got blue {b}");
    }

    #[test]
    fn color_map_green_is_monotone() {
        let mut prev = 0;
        for v in 0..=255u8 {
            let [_, g, _] = color_map(v);
            assert!(g >= prev);
            prev = g;
        }
    }

    #[test]
    fn scroll_moves_rows_down() {
        let mut img = WaterfallImage::new(2, 3);
        img.write_row(0, &[255, 255]);
        img.scroll_down();
        // Row 0 is cleared, row 1 holds the old top row.
        assert_eq!(&img.pixels()[..6], &[0, 0, 0, 0, 0, 0]);
        assert_eq!(&img.pixels()[6..9], &color_map(255));
    }

    #[test]
    fn short_line_pads_with_black() {
        let mut img = WaterfallImage::new(4, 1);
        img.write_row(0, &[255]);
        assert_eq!(&img.pixels()[3..], &[0u8; 9][..]);
    }

    #[test]
    fn live_cadence_first_offer_only_arms() {
        let mut wf = LiveWaterfall::new(4, 10, 10.0);
        // 10 s over 10 rows: one row per second.
        assert_relative_eq!(wf.row_interval_ms(), 1000.0);
        assert!(!wf.offer(0.0, &[255; 4]));
        assert!(!wf.offer(500.0, &[255; 4]));
        assert!(wf.offer(1000.0, &[255; 4]));
        assert!(!wf.offer(1100.0, &[255; 4]));
        assert!(wf.offer(2100.0, &[255; 4]));
    }

    #[test]
    fn live_reset_disarms_timer() {
        let mut wf = LiveWaterfall::new(4, 10, 10.0);
        assert!(!wf.offer(0.0, &[255; 4]));
        assert!(wf.offer(5000.0, &[255; 4]));
        wf.reset();
        assert!(wf.image().pixels().iter().all(|&p| p == 0));
        assert!(!wf.offer(9000.0, &[255; 4]), "timer re-arms after reset");
    }

    #[test]
    fn scan_rows_span_the_range() {
        let scan = OfflineScan::new(8, 100, 0.0, 10.0).unwrap();
        assert_relative_eq!(scan.time_for_row(0), 0.0);
        assert_relative_eq!(scan.time_for_row(99), 10.0);
        assert_relative_eq!(scan.time_for_row(50), 50.0 / 99.0 * 10.0);
    }

    #[test]
    fn scan_single_row_uses_range_start() {
        let scan = OfflineScan::new(8, 1, 3.0, 7.0).unwrap();
        assert_relative_eq!(scan.time_for_row(0), 3.0);
    }

    #[test]
    fn scan_steps_in_bounded_batches() {
        let mut scan = OfflineScan::new(2, 45, 0.0, 1.0).unwrap();
        let mut rows = Vec::new();
        let mut steps = 0;
        loop {
            steps += 1;
            let done = scan.step(|_| vec![128, 128], |p| rows.push(p.row));
            if done {
                break;
            }
        }
        assert_eq!(steps, 3, "45 rows at 20 per step");
        assert_eq!(rows, (0..45).collect::<Vec<_>>());
        assert!(scan.is_done());
    }

    #[test]
    fn scan_rejects_inverted_range() {
        assert!(OfflineScan::new(8, 10, 5.0, 1.0).is_err());
        assert!(OfflineScan::new(8, 0, 0.0, 1.0).is_err());
    }
}
