//! Dark, square-cornered look shared by every dashboard page.

use eframe::egui::{
    Color32, Frame, Margin, Stroke, Visuals,
    epaint::{CornerRadius, Shadow},
};

use crate::api::WarningSeverity;
use crate::train::NotificationTone;

/// Colours by role rather than by widget.
#[derive(Clone, Copy)]
pub struct Palette {
    /// Cards, windows and text inputs.
    pub surface: Color32,
    /// Page and panel background behind the cards.
    pub page: Color32,
    /// Idle buttons and other raised controls.
    pub raised: Color32,
    pub outline: Color32,
    pub divider: Color32,
    pub text: Color32,
    pub text_muted: Color32,
    pub accent: Color32,
    pub accent_dim: Color32,
    pub warning: Color32,
    pub error: Color32,
    pub success: Color32,
}

const PALETTE: Palette = Palette {
    surface: Color32::from_rgb(12, 13, 16),
    page: Color32::from_rgb(24, 27, 31),
    raised: Color32::from_rgb(40, 45, 52),
    outline: Color32::from_rgb(44, 50, 58),
    divider: Color32::from_rgb(31, 35, 40),
    text: Color32::from_rgb(200, 206, 214),
    text_muted: Color32::from_rgb(134, 142, 154),
    accent: Color32::from_rgb(122, 196, 255),
    accent_dim: Color32::from_rgb(40, 78, 112),
    warning: Color32::from_rgb(222, 168, 76),
    error: Color32::from_rgb(214, 98, 88),
    success: Color32::from_rgb(96, 184, 132),
};

pub fn palette() -> Palette {
    PALETTE
}

pub fn apply_visuals(visuals: &mut Visuals) {
    let p = PALETTE;
    visuals.window_fill = p.surface;
    visuals.panel_fill = p.page;
    visuals.extreme_bg_color = p.surface;
    visuals.faint_bg_color = p.divider;
    visuals.override_text_color = Some(p.text);
    visuals.hyperlink_color = p.accent;
    visuals.warn_fg_color = p.warning;
    visuals.error_fg_color = p.error;
    visuals.selection.bg_fill = p.accent_dim;
    visuals.selection.stroke = Stroke::new(1.0, p.accent);
    visuals.window_corner_radius = CornerRadius::ZERO;
    visuals.menu_corner_radius = CornerRadius::ZERO;
    visuals.popup_shadow = Shadow::NONE;
    visuals.window_shadow = Shadow::NONE;

    let widgets = &mut visuals.widgets;
    widgets.noninteractive.bg_fill = p.page;
    widgets.noninteractive.bg_stroke = Stroke::new(1.0, p.divider);
    widgets.noninteractive.fg_stroke = Stroke::new(1.0, p.text);
    for state in [
        &mut widgets.inactive,
        &mut widgets.hovered,
        &mut widgets.active,
        &mut widgets.open,
    ] {
        state.corner_radius = CornerRadius::ZERO;
        state.bg_fill = p.raised;
        state.weak_bg_fill = p.raised;
        state.bg_stroke = Stroke::new(1.0, p.outline);
        state.fg_stroke = Stroke::new(1.0, p.text);
    }
    widgets.hovered.bg_stroke = Stroke::new(1.0, p.accent);
    widgets.active.bg_fill = p.accent_dim;
}

/// Outline of side panels and the footer.
pub fn section_stroke() -> Stroke {
    Stroke::new(1.0, PALETTE.outline)
}

/// Hairline used inside panels (badges, avatar).
pub fn inner_border() -> Stroke {
    Stroke::new(1.0, PALETTE.divider)
}

pub fn card_frame() -> Frame {
    Frame::new()
        .fill(PALETTE.surface)
        .stroke(section_stroke())
        .inner_margin(Margin::same(12))
}

/// Accent-outlined card for the current choice (problem type, model).
pub fn selected_card_frame() -> Frame {
    card_frame()
        .fill(PALETTE.divider)
        .stroke(Stroke::new(1.0, PALETTE.accent))
}

pub fn tone_color(tone: NotificationTone) -> Color32 {
    match tone {
        NotificationTone::Success => PALETTE.success,
        NotificationTone::Warning => PALETTE.warning,
        NotificationTone::Error => PALETTE.error,
    }
}

pub fn severity_color(severity: WarningSeverity) -> Color32 {
    match severity {
        WarningSeverity::Info => PALETTE.accent,
        WarningSeverity::Warning => PALETTE.warning,
        WarningSeverity::Error => PALETTE.error,
    }
}
