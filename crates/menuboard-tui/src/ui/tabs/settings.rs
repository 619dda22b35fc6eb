use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use menuboard_core::models::{RestaurantSettings, MAX_BANNER_IMAGES};
use menuboard_core::utils::{darken_color, format_optional};

use crate::app::App;
use crate::ui::styles;

use super::{field, panel};

/// Fraction used for the hover shade shown next to the primary color
const HOVER_DARKEN: f64 = 0.2;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.dashboard.settings {
        Some(ref settings) => settings_lines(settings),
        None => vec![Line::from(Span::styled(
            "No settings saved for this restaurant yet",
            styles::muted_style(),
        ))],
    };

    frame.render_widget(
        Paragraph::new(lines).block(panel(" Restaurant Settings ".to_string(), false)),
        area,
    );
}

fn swatch(hex: &str) -> Span<'static> {
    match styles::color_from_hex(hex) {
        Some(color) => Span::styled("  ██  ", Style::default().fg(color)),
        None => Span::styled("  (invalid)", styles::error_style()),
    }
}

fn settings_lines(settings: &RestaurantSettings) -> Vec<Line<'static>> {
    let color = settings.primary_color_or_default().to_string();
    let hover = darken_color(&color, HOVER_DARKEN)
        .map(|(r, g, b)| format!("#{:02X}{:02X}{:02X}", r, g, b));

    let mut lines = vec![
        field("Name:          ", settings.restaurant_name_ar.clone()),
        field("English name:  ", format_optional(&settings.restaurant_name_en, "-")),
        field("Currency:      ", settings.currency_or_default().to_string()),
        Line::from(vec![
            Span::styled("Primary color: ", styles::highlight_style()),
            Span::raw(color.clone()),
            swatch(&color),
        ]),
    ];
    if let Some(hover) = hover {
        lines.push(Line::from(vec![
            Span::styled("Hover color:   ", styles::highlight_style()),
            Span::raw(hover.clone()),
            swatch(&hover),
        ]));
    }
    lines.push(field("Logo:          ", format_optional(&settings.logo_url, "-")));

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Social", styles::title_style())));
    let links = settings.social_links();
    if links.is_empty() {
        lines.push(Line::from(Span::styled("  None", styles::muted_style())));
    }
    for (label, url) in links {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<10}", label), styles::highlight_style()),
            Span::raw(url.to_string()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "Banners ({}/{})",
            settings.ad_banner_urls.len(),
            MAX_BANNER_IMAGES
        ),
        styles::title_style(),
    )));
    for url in &settings.ad_banner_urls {
        lines.push(Line::from(format!("  {}", url)));
    }
    for (label, value) in [
        ("Ad image:      ", &settings.social_ad_image),
        ("Ad video:      ", &settings.social_ad_video),
    ] {
        if value.is_some() {
            lines.push(field(label, format_optional(value, "")));
        }
    }

    lines
}
