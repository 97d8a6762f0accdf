use egui::style::{Selection, Visuals, WidgetVisuals, Widgets};
use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Style, TextStyle};

const PANEL_BG: Color32 = Color32::from_rgb(30, 33, 40);
const ACCENT: Color32 = Color32::from_rgb(59, 130, 246);

fn widget(bg_fill: Color32, stroke: Color32, fg: Color32, expansion: f32) -> WidgetVisuals {
    WidgetVisuals {
        bg_fill,
        weak_bg_fill: bg_fill,
        bg_stroke: Stroke::new(1.0, stroke),
        fg_stroke: Stroke::new(1.0, fg),
        rounding: Rounding::same(4.0),
        expansion,
    }
}

/// Dark theme with slightly larger text, used for every page.
pub fn dark_theme(ctx: &egui::Context) -> Style {
    let mut style = (*ctx.style()).clone();

    style.text_styles = [
        (TextStyle::Heading, FontId::new(20.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(15.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(14.0, FontFamily::Monospace)),
        (TextStyle::Button, FontId::new(15.0, FontFamily::Proportional)),
        (TextStyle::Small, FontId::new(12.0, FontFamily::Proportional)),
    ]
    .into();

    style.visuals = Visuals::dark();
    style.visuals.override_text_color = Some(Color32::from_gray(215));
    style.visuals.widgets = Widgets {
        noninteractive: widget(PANEL_BG, Color32::from_gray(60), Color32::from_gray(200), 0.0),
        inactive: widget(Color32::from_rgb(40, 44, 52), Color32::from_gray(75), Color32::from_gray(215), 0.0),
        hovered: widget(Color32::from_rgb(52, 57, 68), Color32::WHITE, Color32::WHITE, 0.5),
        active: widget(Color32::from_rgb(62, 68, 80), ACCENT, Color32::WHITE, 1.0),
        open: widget(Color32::from_rgb(44, 48, 58), Color32::WHITE, Color32::WHITE, 0.0),
    };
    style.visuals.selection = Selection {
        bg_fill: ACCENT.gamma_multiply(0.6),
        stroke: Stroke::new(1.0, Color32::WHITE),
    };

    style.visuals.window_rounding = Rounding::same(6.0);
    style.visuals.window_shadow = egui::Shadow {
        offset: egui::vec2(0.0, 2.0),
        blur: 6.0,
        spread: 0.0,
        color: Color32::from_black_alpha(140),
    };
    style.visuals.popup_shadow = style.visuals.window_shadow;
    style.visuals.window_fill = PANEL_BG;
    style.visuals.window_stroke = Stroke::new(1.0, Color32::from_gray(60));
    style.visuals.panel_fill = PANEL_BG;
    style.visuals.hyperlink_color = ACCENT;

    style.spacing.window_margin = egui::Margin::same(6.0);
    style.spacing.button_padding = egui::vec2(6.0, 3.0);

    style
}
