//! Filter chain controller
//!
//! Turns a [`ChainSettings`] snapshot into coefficients and installs them into
//! both channel chains. Each band is designed once per call and copied into
//! each channel, so the chains never share coefficient storage.
//!
//! Design is pure, so calling [`FilterChainController::update`] every block
//! with unchanged settings is safe; stages skip the copy when the designed set
//! equals the installed one.

use eq3_core::ChainSettings;

use crate::chain::ChannelChain;
use crate::cut::CutKind;
use crate::peak;

/// Designs and installs coefficients for the left and right chains
#[derive(Debug, Default)]
pub struct FilterChainController {
    rejected_designs: u64,
}

impl FilterChainController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Design all three bands for `settings` and install them into both chains
    ///
    /// Allocation free. A band whose design is not finite keeps its previous
    /// coefficients in both channels.
    pub fn update(
        &mut self,
        settings: &ChainSettings,
        sample_rate: f64,
        left: &mut ChannelChain,
        right: &mut ChannelChain,
    ) {
        self.update_low_cut(settings, sample_rate, left, right);
        self.update_peak(settings, sample_rate, left, right);
        self.update_high_cut(settings, sample_rate, left, right);
    }

    fn update_low_cut(
        &mut self,
        settings: &ChainSettings,
        sample_rate: f64,
        left: &mut ChannelChain,
        right: &mut ChannelChain,
    ) {
        let slope = settings.low_cut_slope;
        let coeffs = CutKind::LowCut.design(settings.low_cut_freq, sample_rate, slope);

        let installed = left.low_cut_mut().install(&coeffs, slope)
            & right.low_cut_mut().install(&coeffs, slope);
        self.track(installed, "low cut");
    }

    fn update_peak(
        &mut self,
        settings: &ChainSettings,
        sample_rate: f64,
        left: &mut ChannelChain,
        right: &mut ChannelChain,
    ) {
        let coeffs = peak::design(
            settings.peak_freq,
            settings.peak_gain_db,
            settings.peak_quality,
            sample_rate,
        );

        let installed = left.peak_mut().install(&coeffs) & right.peak_mut().install(&coeffs);
        self.track(installed, "peak");
    }

    fn update_high_cut(
        &mut self,
        settings: &ChainSettings,
        sample_rate: f64,
        left: &mut ChannelChain,
        right: &mut ChannelChain,
    ) {
        let slope = settings.high_cut_slope;
        let coeffs = CutKind::HighCut.design(settings.high_cut_freq, sample_rate, slope);

        let installed = left.high_cut_mut().install(&coeffs, slope)
            & right.high_cut_mut().install(&coeffs, slope);
        self.track(installed, "high cut");
    }

    #[inline]
    fn track(&mut self, installed: bool, band: &'static str) {
        if !installed {
            if self.rejected_designs == 0 {
                log::warn!("Non-finite {band} design, keeping previous coefficients");
            }
            self.rejected_designs += 1;
        }
    }

    /// Number of band designs refused because they were not finite
    #[inline]
    pub fn rejected_designs(&self) -> u64 {
        self.rejected_designs
    }
}
