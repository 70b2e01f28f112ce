use egui::{Color32, RichText};

use crate::color::Rgb;
use crate::config::NEW_BLOCK_TOAST_SECS;
use crate::ekg::{Ekg, LOUD_SAMPLE};
use crate::organism::Organism;
use crate::particles::Species;
use crate::snapshot::{NetworkSnapshot, ScoreTier};
use crate::stats::{FrameStats, RingBuffer};

/// Overlay visibility plus the transient new-block toast.
#[derive(Default)]
pub struct HudState {
    pub visible: bool,
    toast_until: Option<f64>,
}

impl HudState {
    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn notify_block(&mut self, now: f64) {
        self.toast_until = Some(now + NEW_BLOCK_TOAST_SECS);
    }

    pub fn toast_active(&self, now: f64) -> bool {
        self.toast_until.is_some_and(|until| now < until)
    }
}

/// Draw the overlay on top of the canvas. `now` is unix seconds.
pub fn draw(state: &HudState, org: &Organism, stats: &FrameStats, ekg: &Ekg, now: f64) {
    egui_macroquad::ui(|ctx| {
        if state.visible {
            draw_metrics_window(ctx, org, stats, ekg, now);
        }
        if state.toast_active(now) {
            if let Some(data) = &org.data {
                draw_block_toast(ctx, data);
            }
        }
    });

    egui_macroquad::draw();
}

fn draw_metrics_window(
    ctx: &egui::Context,
    org: &Organism,
    stats: &FrameStats,
    ekg: &Ekg,
    now: f64,
) {
    egui::Window::new("Decred Pulse")
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-12.0, 12.0))
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            let Some(data) = &org.data else {
                ui.label(RichText::new("Waiting for network data...").italics());
                draw_particle_section(ui, org, stats);
                return;
            };

            let tier = ScoreTier::from_score(data.network_score);
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(format!("{} {}", data.network_score, tier.label()))
                        .strong()
                        .color(color32(tier.color())),
                );
                let (live, color) = if data.is_live {
                    ("LIVE", Color32::from_rgb(59, 240, 192))
                } else {
                    ("OFFLINE", Color32::from_rgb(150, 170, 185))
                };
                ui.label(RichText::new(live).small().strong().color(color));
            });
            ui.label(RichText::new(tier.flavor()).small().italics());
            draw_ekg(ui, ekg, color32(org.config.palette.green));
            ui.separator();

            egui::Grid::new("hud_metrics").num_columns(2).striped(true).show(ui, |ui| {
                row(ui, "Block", format!("#{}", data.block_height));
                row(ui, "Block age", time_since(data.block_time, now));
                let palette = &org.config.palette;
                let trend = if data.price_change_24h >= 0.0 { palette.green } else { palette.red };
                ui.label(RichText::new("Price").color(Color32::from_rgb(150, 170, 185)));
                ui.label(
                    RichText::new(format!("${:.2} ({:+.1}%)", data.price, data.price_change_24h))
                        .color(color32(trend)),
                );
                ui.end_row();
                row(ui, "Staked", format!("{:.1}%", data.stake_participation));
                row(
                    ui,
                    "Treasury",
                    format!(
                        "{} DCR / {}",
                        format_dcr(data.treasury_balance, 0),
                        format_usd(data.treasury_balance * data.price)
                    ),
                );
                row(
                    ui,
                    "Runway",
                    data.runway_months()
                        .map_or_else(|| "n/a".to_string(), |m| format!("{m} months")),
                );
                row(
                    ui,
                    "Ticket pool",
                    format!("{:.0} / {:.0}", data.ticket_pool_size, data.ticket_pool_target),
                );
                row(ui, "Ticket price", format!("{:.2} DCR", data.ticket_price));
                row(ui, "Hashrate", format_hashrate(data.hashrate));
                row(ui, "Mixed", format!("{:.1}%", data.mixed_percent));
                row(ui, "Market cap", format_usd(data.market_cap));
                row(ui, "Volume 24h", format_usd(data.volume_24h));
            });

            ui.separator();
            draw_particle_section(ui, org, stats);
        });
}

fn draw_particle_section(ui: &mut egui::Ui, org: &Organism, stats: &FrameStats) {
    ui.horizontal_wrapped(|ui| {
        for species in Species::ALL {
            chip(ui, species.label(), org.particles.count(species).to_string());
        }
        chip(ui, "fps", format!("{:.0}", stats.fps()));
    });
    draw_sparkline(ui, &stats.particle_totals, Color32::from_rgb(59, 240, 192));
}

fn draw_block_toast(ctx: &egui::Context, data: &NetworkSnapshot) {
    egui::Area::new(egui::Id::new("new_block_toast"))
        .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 24.0))
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.label(
                    RichText::new(format!("New block #{}", data.block_height))
                        .strong()
                        .color(Color32::from_rgb(240, 176, 64)),
                );
            });
        });
}

fn row(ui: &mut egui::Ui, key: &str, value: String) {
    ui.label(RichText::new(key).color(Color32::from_rgb(150, 170, 185)));
    ui.label(RichText::new(value).color(Color32::from_rgb(205, 215, 225)));
    ui.end_row();
}

fn chip(ui: &mut egui::Ui, key: &str, value: String) {
    ui.group(|ui| {
        ui.label(RichText::new(format!("{key}: {value}")).small());
    });
}

fn draw_sparkline(ui: &mut egui::Ui, buffer: &RingBuffer, color: Color32) {
    let size = egui::vec2(ui.available_width().max(160.0), 36.0);
    let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
    let rect = response.rect;
    painter.rect_filled(rect, 2.0, Color32::from_gray(20));

    let len = buffer.len();
    if len < 2 {
        return;
    }
    let samples: Vec<f32> = buffer.iter().collect();
    let max = samples.iter().copied().fold(1.0f32, f32::max);
    let min = samples.iter().copied().fold(max, f32::min);
    let range = (max - min).max(1.0);

    let points: Vec<egui::Pos2> = samples
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let x = rect.left() + i as f32 / (len - 1) as f32 * rect.width();
            let y = rect.bottom() - (v - min) / range * rect.height();
            egui::pos2(x, y)
        })
        .collect();
    for pair in points.windows(2) {
        painter.line_segment([pair[0], pair[1]], egui::Stroke::new(1.5, color));
    }
}

/// Trace scrolls right to left, 3 px per sample, newest sample on the right
/// edge with a white leading dot.
fn draw_ekg(ui: &mut egui::Ui, ekg: &Ekg, color: Color32) {
    let size = egui::vec2(ui.available_width().max(160.0), 80.0);
    let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
    let rect = response.rect;
    painter.rect_filled(rect, 2.0, Color32::from_gray(12));

    let trace = ekg.trace();
    let len = trace.len();
    let mid = rect.center().y;
    let points: Vec<egui::Pos2> = trace
        .iter()
        .enumerate()
        .map(|(i, v)| egui::pos2(rect.right() - (len - i) as f32 * 3.0, mid - v))
        .filter(|p| p.x >= rect.left())
        .collect();
    for pair in points.windows(2) {
        painter.line_segment([pair[0], pair[1]], egui::Stroke::new(2.0, color));
    }

    if let Some(last) = trace.last() {
        let radius = if last.abs() > LOUD_SAMPLE { 3.0 } else { 2.0 };
        painter.circle_filled(egui::pos2(rect.right(), mid - last), radius, Color32::WHITE);
    }
}

fn color32(c: Rgb) -> Color32 {
    Color32::from_rgb(c.r, c.g, c.b)
}

/// DCR amount with K/M suffixes.
pub fn format_dcr(value: f64, decimals: usize) -> String {
    if value >= 1_000_000.0 {
        format!("{:.*}M", decimals, value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.*}K", decimals, value / 1_000.0)
    } else {
        format!("{:.*}", decimals, value)
    }
}

pub fn format_usd(value: f64) -> String {
    if value >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else if value >= 1e3 {
        format!("${:.1}K", value / 1e3)
    } else {
        format!("${value:.2}")
    }
}

/// Hashes per second in the largest fitting unit, GH/s at minimum.
pub fn format_hashrate(hashes: f64) -> String {
    if hashes >= 1e18 {
        format!("{:.2} EH/s", hashes / 1e18)
    } else if hashes >= 1e15 {
        format!("{:.2} PH/s", hashes / 1e15)
    } else if hashes >= 1e12 {
        format!("{:.2} TH/s", hashes / 1e12)
    } else {
        format!("{:.2} GH/s", hashes / 1e9)
    }
}

/// Coarse age of a unix timestamp relative to `now`.
pub fn time_since(unix_seconds: f64, now: f64) -> String {
    if !(unix_seconds > 0.0) {
        return "unknown".to_string();
    }
    let diff = (now - unix_seconds).floor().max(0.0) as u64;
    match diff {
        0..=59 => format!("{diff}s ago"),
        60..=3_599 => format!("{}m ago", diff / 60),
        3_600..=86_399 => format!("{}h ago", diff / 3_600),
        _ => format!("{}d ago", diff / 86_400),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dcr_uses_suffixes() {
        assert_eq!(format_dcr(872_000.0, 0), "872K");
        assert_eq!(format_dcr(16_150_000.0, 1), "16.1M");
        assert_eq!(format_dcr(248.5, 1), "248.5");
    }

    #[test]
    fn usd_scales() {
        assert_eq!(format_usd(298_000_000.0), "$298.00M");
        assert_eq!(format_usd(1_500_000_000.0), "$1.50B");
        assert_eq!(format_usd(4_200.0), "$4.2K");
        assert_eq!(format_usd(18.45), "$18.45");
    }

    #[test]
    fn hashrate_units() {
        assert_eq!(format_hashrate(1.25e17), "125.00 PH/s");
        assert_eq!(format_hashrate(2e18), "2.00 EH/s");
        assert_eq!(format_hashrate(3e12), "3.00 TH/s");
        assert_eq!(format_hashrate(5e9), "5.00 GH/s");
    }

    #[test]
    fn time_since_buckets() {
        let now = 1_700_000_000.0;
        assert_eq!(time_since(now - 42.0, now), "42s ago");
        assert_eq!(time_since(now - 300.0, now), "5m ago");
        assert_eq!(time_since(now - 7_200.0, now), "2h ago");
        assert_eq!(time_since(now - 3.0 * 86_400.0, now), "3d ago");
        assert_eq!(time_since(now + 10.0, now), "0s ago");
        assert_eq!(time_since(0.0, now), "unknown");
    }

    #[test]
    fn toast_lasts_three_seconds() {
        let mut hud = HudState::default();
        assert!(!hud.toast_active(0.0));
        hud.notify_block(100.0);
        assert!(hud.toast_active(100.0));
        assert!(hud.toast_active(102.9));
        assert!(!hud.toast_active(103.0));
    }

    #[test]
    fn hud_starts_hidden_and_toggles() {
        let mut hud = HudState::default();
        assert!(!hud.visible);
        hud.toggle();
        assert!(hud.visible);
        hud.toggle();
        assert!(!hud.visible);
    }
}
