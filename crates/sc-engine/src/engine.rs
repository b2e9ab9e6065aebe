//! Engine facade
//!
//! Owns the analyzers, display followers, waterfall and markers for one
//! analysis session, and dispatches each tick to the analyzer the current
//! mode selects. Hosts drive it with live frames or offline time points
//! and paint whatever comes back.

use sc_core::{
    AnalysisConfig, AnalysisMode, Decibels, ExpanderParams, Sample, SampleClip, ScError, ScResult,
};
use sc_dsp::display::{AutoGain, NoiseFloor, PeakLabel, PeakStabilizer};
use sc_dsp::fixed::{ByteSpectrum, LiveFixedAnalyzer, OfflineFixedAnalyzer};
use sc_dsp::logfreq::{LogFreqAnalyzer, LogVariant};
use sc_dsp::multiband::{default_band_plan, MultiBandAnalyzer};
use sc_dsp::Analyzer;

use crate::axis::FreqAxis;
use crate::line::LineBuilder;
use crate::marker::{Marker, MarkerChannel, MarkerOptions, MarkerPixel};
use crate::waterfall::{LiveWaterfall, OfflineScan, ScanProgress, WaterfallImage};

/// One live analysis frame.
///
/// The fixed live path consumes a byte spectrum the audio stack already
/// computed; the other modes need the raw sample block.
#[derive(Debug)]
pub enum LiveFrame<'a> {
    Bytes(&'a ByteSpectrum),
    Samples {
        samples: &'a [Sample],
        sample_rate: f64,
    },
}

/// Result of one live tick.
#[derive(Debug, Clone)]
pub struct TickOutput {
    /// Render line, one intensity byte per plot pixel
    pub line: Vec<u8>,
    /// True when the waterfall scrolled and consumed this line
    pub waterfall_row: bool,
}

/// Per-session analysis engine.
pub struct SpectrumEngine {
    config: AnalysisConfig,
    sample_rate: f64,
    plot_width: usize,
    clip: Option<SampleClip>,

    live_fixed: LiveFixedAnalyzer,
    offline_fixed: OfflineFixedAnalyzer,
    multiband: MultiBandAnalyzer,
    cqt: LogFreqAnalyzer,
    wavelet: LogFreqAnalyzer,

    noise_gate: bool,
    noise_floor: NoiseFloor,
    auto_gain: AutoGain,
    peak_stabilizer: PeakStabilizer,
    line: LineBuilder,

    waterfall: LiveWaterfall,
    scan: Option<OfflineScan>,
    markers: [Marker; 2],
    expander: ExpanderParams,
}

impl SpectrumEngine {
    pub fn new(sample_rate: f64, plot_width: usize, waterfall_height: usize) -> Self {
        let config = AnalysisConfig::default();
        let waterfall = LiveWaterfall::new(
            plot_width,
            waterfall_height,
            config.waterfall_seconds_clamped(),
        );
        Self {
            offline_fixed: OfflineFixedAnalyzer::new(config.fft_size),
            config,
            sample_rate,
            plot_width: plot_width.max(1),
            clip: None,
            live_fixed: LiveFixedAnalyzer::new(),
            multiband: MultiBandAnalyzer::new(&default_band_plan()),
            cqt: LogFreqAnalyzer::new(LogVariant::Cqt),
            wavelet: LogFreqAnalyzer::new(LogVariant::Wavelet),
            noise_gate: true,
            noise_floor: NoiseFloor::new(),
            auto_gain: AutoGain::new(),
            peak_stabilizer: PeakStabilizer::new(),
            line: LineBuilder::new(),
            waterfall,
            scan: None,
            markers: [Marker::default(), Marker::default()],
            expander: ExpanderParams::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Swap in a new configuration. A mode change discards the transient
    /// display state; everything else takes effect on the next tick.
    pub fn set_config(&mut self, config: AnalysisConfig) {
        if config.mode != self.config.mode {
            log::debug!(
                "analysis mode {:?} -> {:?}, resetting session state",
                self.config.mode,
                config.mode
            );
            self.reset_session();
        }
        self.config = config;
        self.waterfall
            .set_window_seconds(self.config.waterfall_seconds_clamped());
    }

    /// Validated expander settings for the host's live input gate. The
    /// engine does not process audio through them; it is the single place
    /// they are stored and range-checked.
    #[inline]
    pub fn expander_params(&self) -> &ExpanderParams {
        &self.expander
    }

    #[inline]
    pub fn expander_params_mut(&mut self) -> &mut ExpanderParams {
        &mut self.expander
    }

    /// Enable or disable noise-floor gating on the live fixed path.
    pub fn set_noise_gate(&mut self, enabled: bool) {
        if !enabled {
            self.noise_floor.reset();
        }
        self.noise_gate = enabled;
    }

    /// Load a decoded clip for offline analysis.
    pub fn load_clip(&mut self, samples: Vec<Sample>, sample_rate: f64) -> ScResult<()> {
        let clip = SampleClip::new(samples, sample_rate)?;
        log::info!(
            "clip loaded: {} samples at {} Hz ({:.2} s)",
            clip.len(),
            clip.sample_rate(),
            clip.duration_secs()
        );
        self.sample_rate = clip.sample_rate();
        self.clip = Some(clip);
        self.scan = None;
        Ok(())
    }

    #[inline]
    pub fn clip(&self) -> Option<&SampleClip> {
        self.clip.as_ref()
    }

    fn axis(&self) -> FreqAxis {
        FreqAxis::new(self.config.resolve(self.sample_rate), self.plot_width)
    }

    /// Process one live frame: update the mode's analyzer, build the
    /// render line, fold it into the peak EMA and offer it to the
    /// waterfall. `now_ms` is the host's monotonic clock.
    pub fn render_live_frame(&mut self, frame: LiveFrame<'_>, now_ms: f64) -> TickOutput {
        let from_bytes = matches!(frame, LiveFrame::Bytes(_));
        match frame {
            LiveFrame::Bytes(snapshot) => {
                self.sample_rate = snapshot.sample_rate;
                if self.noise_gate {
                    self.noise_floor.update(&snapshot.data);
                }
                let floor = self.noise_gate.then_some(&self.noise_floor);
                self.live_fixed.prepare(snapshot, floor);
            }
            LiveFrame::Samples {
                samples,
                sample_rate,
            } => {
                self.sample_rate = sample_rate;
                let center = samples.len() as i64 / 2;
                self.prepare_buffer_analyzer(samples, sample_rate, center);
            }
        }

        let axis = self.axis();
        // Field-level borrows so the line builder can take the analyzer
        // shared and the smoothing state mutably at once.
        let analyzer: &dyn Analyzer = if from_bytes {
            &self.live_fixed
        } else {
            match self.config.mode {
                AnalysisMode::Fixed => &self.offline_fixed,
                AnalysisMode::Multi => &self.multiband,
                AnalysisMode::Cqt => &self.cqt,
                AnalysisMode::Wavelet => &self.wavelet,
            }
        };
        let line = self
            .line
            .build_live(analyzer, &axis, &self.config, &mut self.auto_gain);
        self.peak_stabilizer.update(&line);
        self.waterfall
            .set_window_seconds(self.config.waterfall_seconds_clamped());
        let waterfall_row = self.waterfall.offer(now_ms, &line);
        TickOutput {
            line,
            waterfall_row,
        }
    }

    /// Render a line for one clip time point. Without a clip this is a
    /// silent line rather than an error, so scrubbing never tears the UI.
    pub fn render_line_at_time(&mut self, time_sec: f64) -> Vec<u8> {
        let (sample_rate, center) = match &self.clip {
            Some(clip) => (clip.sample_rate(), clip.index_at(time_sec)),
            None => return vec![0; self.plot_width],
        };
        self.sample_rate = sample_rate;

        // Split borrow: clip samples stay shared while analyzers mutate.
        let range = self.config.resolve(sample_rate);
        let detail = self.config.detail;
        let clip = match &self.clip {
            Some(clip) => clip,
            None => return vec![0; self.plot_width],
        };
        let samples = clip.samples();
        match self.config.mode {
            AnalysisMode::Fixed => {
                self.offline_fixed.set_fft_size(self.config.fft_size);
                self.offline_fixed.prepare(samples, sample_rate, center);
            }
            AnalysisMode::Multi => self.multiband.prepare(samples, sample_rate, center),
            AnalysisMode::Cqt => self.cqt.prepare(samples, sample_rate, center, &range, detail),
            AnalysisMode::Wavelet => {
                self.wavelet
                    .prepare(samples, sample_rate, center, &range, detail)
            }
        }

        let axis = FreqAxis::new(range, self.plot_width);
        let analyzer: &dyn Analyzer = match self.config.mode {
            AnalysisMode::Fixed => &self.offline_fixed,
            AnalysisMode::Multi => &self.multiband,
            AnalysisMode::Cqt => &self.cqt,
            AnalysisMode::Wavelet => &self.wavelet,
        };
        self.line
            .build_at_time(analyzer, &axis, &self.config, &mut self.auto_gain)
    }

    fn prepare_buffer_analyzer(&mut self, samples: &[Sample], sample_rate: f64, center: i64) {
        let range = self.config.resolve(sample_rate);
        let detail = self.config.detail;
        match self.config.mode {
            AnalysisMode::Fixed => {
                self.offline_fixed.set_fft_size(self.config.fft_size);
                self.offline_fixed.prepare(samples, sample_rate, center);
            }
            AnalysisMode::Multi => self.multiband.prepare(samples, sample_rate, center),
            AnalysisMode::Cqt => self.cqt.prepare(samples, sample_rate, center, &range, detail),
            AnalysisMode::Wavelet => {
                self.wavelet
                    .prepare(samples, sample_rate, center, &range, detail)
            }
        }
    }

    /// Start a full-range scan over `[start_sec, end_sec]` into an image
    /// the size of the live waterfall.
    pub fn begin_scan(&mut self, start_sec: f64, end_sec: f64) -> ScResult<()> {
        if self.clip.is_none() {
            return Err(ScError::NoClip);
        }
        if self.is_scanning() {
            return Err(ScError::ScanBusy);
        }
        let height = self.waterfall.image().height();
        self.scan = Some(OfflineScan::new(
            self.plot_width,
            height,
            start_sec,
            end_sec,
        )?);
        log::debug!("scan started: {start_sec:.2}..{end_sec:.2} s over {height} rows");
        Ok(())
    }

    /// Advance the active scan by one bounded batch of rows. Returns true
    /// when no scan is active or the scan just finished.
    pub fn scan_step(&mut self, mut progress: impl FnMut(ScanProgress)) -> bool {
        let mut scan = match self.scan.take() {
            Some(scan) => scan,
            None => return true,
        };
        let was_done = scan.is_done();
        let done = scan.step(|t| self.render_line_at_time(t), &mut progress);
        if done && !was_done {
            log::debug!("scan finished: {} rows", scan.total_rows());
        }
        self.scan = Some(scan);
        done
    }

    #[inline]
    pub fn is_scanning(&self) -> bool {
        self.scan.as_ref().is_some_and(|s| !s.is_done())
    }

    pub fn cancel_scan(&mut self) {
        self.scan = None;
    }

    /// Completed or in-progress scan image, row order start to end.
    #[inline]
    pub fn scan_image(&self) -> Option<&WaterfallImage> {
        self.scan.as_ref().map(|s| s.image())
    }

    #[inline]
    pub fn waterfall_image(&self) -> &WaterfallImage {
        self.waterfall.image()
    }

    /// Resize the plot. Ignored while a scan is running so row geometry
    /// stays consistent for the whole image.
    pub fn resize(&mut self, plot_width: usize, waterfall_height: usize) {
        if self.is_scanning() {
            log::debug!("resize ignored while a scan is running");
            return;
        }
        self.plot_width = plot_width.max(1);
        self.waterfall.resize(self.plot_width, waterfall_height);
    }

    /// Drop all transient display state: noise floor, auto gain, waterfall
    /// timer and image, peak EMA and line smoothing history. Config, clip
    /// and markers survive.
    pub fn reset_session(&mut self) {
        self.noise_floor.reset();
        self.auto_gain.reset();
        self.peak_stabilizer.reset();
        self.line.reset();
        self.waterfall.reset();
        self.live_fixed.reset();
        self.offline_fixed.reset();
        self.multiband.reset();
        self.cqt.reset();
        self.wavelet.reset();
    }

    pub fn set_marker(&mut self, channel: MarkerChannel, hz: Option<f64>) {
        self.markers[channel.index()].set_frequency(hz);
    }

    pub fn set_marker_options(&mut self, channel: MarkerChannel, options: MarkerOptions) {
        self.markers[channel.index()].set_options(options);
    }

    pub fn marker_frequency(&self, channel: MarkerChannel) -> Option<f64> {
        self.markers[channel.index()].frequency()
    }

    /// Marker overlay lines for one channel on the current axis.
    pub fn marker_pixels(&self, channel: MarkerChannel) -> Vec<MarkerPixel> {
        self.markers[channel.index()].pixels(&self.axis())
    }

    #[inline]
    pub fn frequency_to_pixel(&self, hz: f64) -> f64 {
        self.axis().freq_to_pixel(hz)
    }

    #[inline]
    pub fn pixel_to_frequency(&self, px: f64) -> f64 {
        self.axis().pixel_to_freq(px)
    }

    /// Current auto-gain multiplier, for host-side level readouts.
    #[inline]
    pub fn render_gain(&self) -> f64 {
        self.auto_gain.value()
    }

    /// Auto-gain expressed in decibels.
    #[inline]
    pub fn render_gain_db(&self) -> Decibels {
        Decibels::from_gain(self.auto_gain.value())
    }

    /// Stable peak labels over recent render lines.
    pub fn peaks(&self) -> Vec<PeakLabel> {
        self.peak_stabilizer.peaks()
    }
}
