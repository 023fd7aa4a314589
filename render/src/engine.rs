//! The panel engine: a state machine over a single CPU surface.
//!
//! Two states: *Idle* (no panel cached) and *PanelReady* (the 5-row
//! icon/HP-bar background is composited and cached). `prepare` moves either
//! state to PanelReady and is idempotent with respect to the latest roster;
//! the `refresh_*` operations require PanelReady and report
//! [`RenderError::PanelNotPrepared`] otherwise.
//!
//! Every method here mutates graphics state and must therefore run on the
//! engine's owning thread, i.e. only inside a render job processed by
//! [`crate::event_loop::run_event_loop`].

use std::path::PathBuf;

use tiny_skia::{Color, Pixmap};
use tracing::warn;

use clanpanel_core::{BOSS_SLOTS, ProgressValue};

use crate::colors;
use crate::error::RenderError;
use crate::raster::Raster;
use crate::snapshot::Snapshot;

pub const PANEL_WIDTH: u32 = 480;
pub const PANEL_HEIGHT: u32 = 640;

const MARGIN: f32 = 10.0;
const CLIP_X: f32 = 10.0;
const CLIP_Y: f32 = 30.0;
const CLIP_W: f32 = 460.0;
const CLIP_H: f32 = 580.0;

const ICON_SIZE: f32 = 80.0;
const ROW_STRIDE: f32 = ICON_SIZE + MARGIN * 2.0;
const ICON_X: f32 = CLIP_X + MARGIN;

const BAR_X: f32 = ICON_X + ICON_SIZE + MARGIN * 2.0;
const BAR_W: f32 = CLIP_X + CLIP_W - BAR_X - MARGIN;
const HP_BAR_H: f32 = 20.0;
const HP_BAR_OFFSET: f32 = ICON_SIZE / 5.0 * 2.0;

const BADGE_W: f32 = 72.0;
const BADGE_H: f32 = 22.0;

const TOTAL_BAR_H: f32 = 24.0;
const TOTAL_BAR_Y: [f32; 2] = [CLIP_Y + 8.0, CLIP_Y + 8.0 + TOTAL_BAR_H + 12.0];

const TITLE_FONT: f32 = 20.0;
const LAP_FONT: f32 = 18.0;
const HP_FONT: f32 = 12.0;

const FALLBACK_ICON: &str = "000000.png";

/// Top edge of a slot's icon row. Slot 4 occupies the bottom row; rows are
/// drawn bottom-to-top.
fn row_top(slot: usize) -> f32 {
    CLIP_Y + CLIP_H - (BOSS_SLOTS - slot) as f32 * ROW_STRIDE + MARGIN
}

/// Filled width of an HP bar: `bar_w * current / total`, clamped so a
/// non-zero HP always shows at least a 1px sliver, and never overflows.
pub fn fill_width(bar_w: f32, value: ProgressValue) -> f32 {
    if value.total == 0 {
        return 0.0;
    }
    let w = bar_w * value.current as f32 / value.total as f32;
    if value.current > 0 && w < 1.0 {
        1.0
    } else {
        w.min(bar_w)
    }
}

/// Width of the darkening overlay on a countdown bar: the bar empties as
/// `current` rises toward `total`. Zero for an unbounded value.
pub fn remainder_width(bar_w: f32, value: ProgressValue) -> f32 {
    bar_w * value.remainder_fraction()
}

/// Label for the lap bar: "current/total", or "∞" when the lap count is
/// uncapped (zero total).
pub fn lap_bar_label(value: ProgressValue) -> String {
    if value.is_unbounded() {
        "∞".to_string()
    } else {
        format!("{}/{}", value.current, value.total)
    }
}

/// Display letter for a numeric phase index. Presentation only; the data
/// path stays numeric throughout.
pub fn phase_letter(phase: usize) -> char {
    (b'A' + phase.min(25) as u8) as char
}

/// Coarse countdown: the largest non-zero unit wins.
pub fn format_countdown(seconds: u64) -> String {
    const DAY: u64 = 86_400;
    const HOUR: u64 = 3_600;
    const MINUTE: u64 = 60;
    if seconds >= DAY {
        format!("{}d", seconds / DAY)
    } else if seconds >= HOUR {
        format!("{}h", seconds / HOUR)
    } else if seconds >= MINUTE {
        format!("{}m", seconds / MINUTE)
    } else {
        format!("{seconds}s")
    }
}

pub struct EngineConfig {
    /// Directory of `{id:06}.png` icon assets.
    pub icon_dir: PathBuf,
    /// Optional panel font; absent or unreadable degrades to system fonts.
    pub font_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            icon_dir: PathBuf::from("icon"),
            font_path: None,
        }
    }
}

pub struct PanelEngine {
    raster: Raster,
    surface: Pixmap,
    /// Cached composited background. `None` == Idle state.
    panel: Option<Pixmap>,
    fallback_icon: Option<Pixmap>,
    icon_dir: PathBuf,
}

impl PanelEngine {
    pub fn new(config: EngineConfig) -> Result<Self, RenderError> {
        let mut raster = Raster::new();
        if let Some(path) = &config.font_path {
            match std::fs::read(path) {
                Ok(bytes) => raster.load_font_bytes(bytes),
                Err(error) => {
                    warn!(path = %path.display(), %error, "panel font unavailable, using system fonts");
                }
            }
        }
        let surface =
            Pixmap::new(PANEL_WIDTH, PANEL_HEIGHT).ok_or(RenderError::SurfaceAlloc {
                width: PANEL_WIDTH,
                height: PANEL_HEIGHT,
            })?;
        let fallback_icon = Pixmap::load_png(config.icon_dir.join(FALLBACK_ICON)).ok();
        Ok(Self {
            raster,
            surface,
            panel: None,
            fallback_icon,
            icon_dir: config.icon_dir,
        })
    }

    pub fn is_prepared(&self) -> bool {
        self.panel.is_some()
    }

    /// Recomposite the 5-row background from scratch and cache it.
    /// Always safe to call again; replaces any previous cached panel.
    pub fn prepare(&mut self, icon_ids: &[u64; BOSS_SLOTS]) {
        self.clear(colors::panel_backdrop());
        self.fill(CLIP_X, CLIP_Y, CLIP_W, CLIP_H, colors::panel_face());

        for slot in (0..BOSS_SLOTS).rev() {
            let top = row_top(slot);
            self.fill(CLIP_X, top - MARGIN, CLIP_W, 1.0, colors::bar_bg());
            self.draw_icon(icon_ids[slot], ICON_X, top);
            self.fill(BAR_X, top + HP_BAR_OFFSET, BAR_W, HP_BAR_H, colors::bar_bg());
        }
        for y in TOTAL_BAR_Y {
            self.fill(BAR_X, y, BAR_W, TOTAL_BAR_H, colors::bar_bg());
        }

        self.panel = Some(self.surface.clone());
    }

    /// Clear to the phase color and re-blit the cached panel.
    pub fn refresh_background(&mut self, phase: usize) -> Result<(), RenderError> {
        let panel = self.panel.clone().ok_or(RenderError::PanelNotPrepared)?;
        self.clear(colors::phase_background(phase));
        let (w, h) = (self.surface.width(), self.surface.height());
        self.raster
            .blit(self.surface.data_mut(), w, h, panel.as_ref(), 0.0, 0.0);
        Ok(())
    }

    /// Overlay the event-countdown and lap-range bars plus their labels,
    /// and the phase letter block.
    pub fn refresh_total_progress(
        &mut self,
        phase: usize,
        totals: &[ProgressValue; 2],
    ) -> Result<(), RenderError> {
        if self.panel.is_none() {
            return Err(RenderError::PanelNotPrepared);
        }

        let labels = [
            format!("Ends in {}", format_countdown(totals[0].current)),
            lap_bar_label(totals[1]),
        ];
        for (i, value) in totals.iter().enumerate() {
            let overlay = remainder_width(BAR_W, *value);
            if overlay > 0.0 {
                self.fill(
                    BAR_X + BAR_W - overlay,
                    TOTAL_BAR_Y[i],
                    overlay,
                    TOTAL_BAR_H,
                    colors::bar_bg(),
                );
            }
            self.text_centered(
                &labels[i],
                BAR_X,
                TOTAL_BAR_Y[i],
                BAR_W,
                TOTAL_BAR_H,
                TITLE_FONT,
                colors::text_dark(),
            );
        }

        let header_h = TOTAL_BAR_Y[1] + TOTAL_BAR_H - CLIP_Y;
        self.text_centered(
            "Phase",
            ICON_X,
            CLIP_Y,
            ICON_SIZE,
            header_h / 2.0,
            TITLE_FONT,
            colors::text_dark(),
        );
        self.text_centered(
            &phase_letter(phase).to_string(),
            ICON_X,
            CLIP_Y + header_h / 2.0,
            ICON_SIZE,
            header_h / 2.0,
            TITLE_FONT,
            colors::text_dark(),
        );
        Ok(())
    }

    /// Draw the five HP bars and lap badges, bottom-to-top (slot 4 first).
    pub fn refresh_boss_progress(
        &mut self,
        lap: u64,
        lap_flags: &[bool; BOSS_SLOTS],
        bosses: &[ProgressValue; BOSS_SLOTS],
    ) -> Result<(), RenderError> {
        if self.panel.is_none() {
            return Err(RenderError::PanelNotPrepared);
        }

        for slot in (0..BOSS_SLOTS).rev() {
            let top = row_top(slot);
            let bar_y = top + HP_BAR_OFFSET;

            self.fill(BAR_X, bar_y, BAR_W, HP_BAR_H, colors::bar_bg());
            let filled = fill_width(BAR_W, bosses[slot]);
            if filled > 0.0 {
                self.fill(BAR_X, bar_y, filled, HP_BAR_H, colors::hp_fill());
            }
            let hp_label = format!("{}/{}", bosses[slot].current, bosses[slot].total);
            self.text_centered(
                &hp_label,
                BAR_X,
                bar_y,
                BAR_W,
                HP_BAR_H,
                HP_FONT,
                colors::text_light(),
            );

            let badge_y = top + 2.0;
            self.fill(
                BAR_X,
                badge_y,
                BADGE_W,
                BADGE_H,
                colors::lap_badge(lap_flags[slot]),
            );
            let lap_label = format!("Lap {}", lap + lap_flags[slot] as u64);
            self.text_left(
                &lap_label,
                BAR_X + MARGIN / 2.0,
                badge_y,
                BADGE_H,
                LAP_FONT,
                colors::text_light(),
            );
        }
        Ok(())
    }

    /// Read back the current surface contents. Engine-thread-only, like
    /// every other operation here.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_pixmap(&self.surface)
    }

    fn clear(&mut self, color: Color) {
        let (w, h) = (self.surface.width(), self.surface.height());
        self.raster.clear(self.surface.data_mut(), w, h, color);
    }

    fn fill(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let (sw, sh) = (self.surface.width(), self.surface.height());
        self.raster
            .fill_rect(self.surface.data_mut(), sw, sh, x, y, w, h, color);
    }

    fn draw_icon(&mut self, id: u64, x: f32, y: f32) {
        let path = self.icon_dir.join(format!("{id:06}.png"));
        let icon = Pixmap::load_png(&path)
            .ok()
            .or_else(|| self.fallback_icon.clone());
        // A missing or undecodable asset leaves the slot blank.
        if let Some(icon) = icon {
            let (sw, sh) = (self.surface.width(), self.surface.height());
            self.raster.blit_scaled(
                self.surface.data_mut(),
                sw,
                sh,
                icon.as_ref(),
                x,
                y,
                ICON_SIZE,
                ICON_SIZE,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn text_centered(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        font_size: f32,
        color: Color,
    ) {
        let (tw, _) = self.raster.measure_text(text, font_size);
        let tx = x + (w - tw) / 2.0;
        let ty = y + h / 2.0 + font_size / 3.0;
        let (sw, sh) = (self.surface.width(), self.surface.height());
        self.raster
            .draw_text(self.surface.data_mut(), sw, sh, text, tx, ty, font_size, color);
    }

    fn text_left(&mut self, text: &str, x: f32, y: f32, h: f32, font_size: f32, color: Color) {
        let ty = y + h / 2.0 + font_size / 3.0;
        let (sw, sh) = (self.surface.width(), self.surface.height());
        self.raster
            .draw_text(self.surface.data_mut(), sw, sh, text, x, ty, font_size, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_width_is_proportional() {
        let w = fill_width(340.0, ProgressValue::new(30, 100));
        assert!((w - 340.0 * 0.3).abs() < 0.001);
    }

    #[test]
    fn fill_width_keeps_a_sliver_at_low_hp() {
        let w = fill_width(340.0, ProgressValue::new(1, 10_000_000));
        assert_eq!(w, 1.0);
    }

    #[test]
    fn fill_width_zero_when_dead_or_unbounded() {
        assert_eq!(fill_width(340.0, ProgressValue::new(0, 100)), 0.0);
        assert_eq!(fill_width(340.0, ProgressValue::new(0, 0)), 0.0);
    }

    #[test]
    fn remainder_width_empties_as_current_rises() {
        let w = remainder_width(100.0, ProgressValue::new(30, 100));
        assert!((w - 70.0).abs() < 0.001);
        assert_eq!(remainder_width(100.0, ProgressValue::new(0, 0)), 0.0);
    }

    #[test]
    fn lap_label_selects_infinity_for_uncapped() {
        assert_eq!(lap_bar_label(ProgressValue::new(0, 0)), "∞");
        assert_eq!(lap_bar_label(ProgressValue::new(3, 6)), "3/6");
    }

    #[test]
    fn phase_letters() {
        assert_eq!(phase_letter(0), 'A');
        assert_eq!(phase_letter(4), 'E');
        assert_eq!(phase_letter(99), 'Z');
    }

    #[test]
    fn countdown_picks_largest_unit() {
        assert_eq!(format_countdown(3 * 86_400 + 5), "3d");
        assert_eq!(format_countdown(7_200), "2h");
        assert_eq!(format_countdown(90), "1m");
        assert_eq!(format_countdown(42), "42s");
    }

    #[test]
    fn refresh_before_prepare_is_a_precondition_violation() {
        let mut engine = PanelEngine::new(EngineConfig::default()).unwrap();
        assert!(!engine.is_prepared());
        assert!(matches!(
            engine.refresh_background(0),
            Err(RenderError::PanelNotPrepared)
        ));
        assert!(matches!(
            engine.refresh_total_progress(0, &[ProgressValue::default(); 2]),
            Err(RenderError::PanelNotPrepared)
        ));
        assert!(matches!(
            engine.refresh_boss_progress(1, &[false; 5], &[ProgressValue::default(); 5]),
            Err(RenderError::PanelNotPrepared)
        ));
    }

    #[test]
    fn prepared_engine_accepts_refreshes() {
        let mut engine = PanelEngine::new(EngineConfig::default()).unwrap();
        engine.prepare(&[1000, 1001, 1002, 1003, 1004]);
        assert!(engine.is_prepared());

        engine.refresh_background(2).unwrap();
        // 0/0 everywhere must take the unbounded path, not divide.
        engine
            .refresh_total_progress(2, &[ProgressValue::new(0, 0); 2])
            .unwrap();
        engine
            .refresh_boss_progress(5, &[false, true, false, true, false], &[
                ProgressValue::new(0, 0); 5
            ])
            .unwrap();

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.width, PANEL_WIDTH);
        assert_eq!(snapshot.height, PANEL_HEIGHT);
    }

    #[test]
    fn prepare_is_idempotent() {
        let mut engine = PanelEngine::new(EngineConfig::default()).unwrap();
        engine.prepare(&[1, 2, 3, 4, 5]);
        engine.prepare(&[6, 7, 8, 9, 10]);
        assert!(engine.is_prepared());
        engine.refresh_background(0).unwrap();
    }
}
