//! Plain-text rendering of the dashboard for the terminal.

use std::fmt::Write as _;

use console::{Style, style};
use saarthi_net_api::dashboard::NO_DATA_MESSAGE;

use crate::app::Dashboard;
use crate::insights_panel::{CardBody, Emphasis, InsightCard};
use crate::legend::{LEGEND_DISCLAIMER, legend_items};
use crate::map_panel::MapView;

fn card_style(emphasis: Emphasis) -> Style {
    match emphasis {
        Emphasis::Neutral => Style::new(),
        Emphasis::Focused => Style::new().bold().cyan(),
        Emphasis::Emphasized => Style::new().bold(),
        Emphasis::Deemphasized => Style::new().dim(),
    }
}

fn render_card(out: &mut String, card: &InsightCard) {
    let style = card_style(card.emphasis);
    let marker = match card.emphasis {
        Emphasis::Focused => "▶ ",
        _ => "  ",
    };
    let _ = writeln!(out, "{marker}{}", style.apply_to(card.title));

    match &card.body {
        CardBody::Loading => {
            let _ = writeln!(out, "    {}", style.apply_to("Loading…").italic());
        }
        CardBody::Error => {
            let _ = writeln!(out, "    {}", style.apply_to("Unable to load data").red());
        }
        CardBody::Populated(rows) => {
            for row in rows {
                let _ = writeln!(
                    out,
                    "    {:<20} {}",
                    style.apply_to(row.label),
                    style.apply_to(&row.value)
                );
            }
        }
    }
}

fn render_map(out: &mut String, view: &MapView) {
    let _ = writeln!(out, "{}", style("Map").bold().underlined());
    match view {
        MapView::Placeholder { active_layers } => {
            let _ = writeln!(out, "  Interactive map unavailable (no map access token)");
            if *active_layers > 0 {
                let plural = if *active_layers > 1 { "s" } else { "" };
                let _ = writeln!(out, "  {active_layers} layer{plural} active");
            }
        }
        MapView::Interactive {
            active_layers,
            viewport,
            hovered,
        } => {
            let labels = active_layers
                .iter()
                .map(|l| l.legend_label())
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "  Active layers: {} ({labels})", active_layers.len());
            let _ = writeln!(out, "  Viewport: {viewport}");
            if let Some(tooltip) = hovered {
                let _ = writeln!(
                    out,
                    "  {} {}",
                    style(&tooltip.title).cyan(),
                    style(&tooltip.metric).dim()
                );
            }
        }
    }
}

/// Renders the whole dashboard: header, filters, map summary, insight
/// cards, and legend.
#[must_use]
pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::new();

    let header = dashboard.header();
    let _ = writeln!(
        out,
        "{}  {}",
        style(header.title).bold().green(),
        style(header.subtitle).dim()
    );
    let _ = writeln!(out, "{} · {}", header.district, header.period);
    out.push('\n');

    let filters = dashboard.filters();
    let _ = writeln!(out, "{}", style("Layers").bold().underlined());
    for toggle in &filters.toggles {
        let checkbox = if toggle.checked { "[x]" } else { "[ ]" };
        let locked = if toggle.disabled { " (locked)" } else { "" };
        let _ = writeln!(out, "  {checkbox} {}{locked}", toggle.label);
    }
    out.push('\n');

    render_map(&mut out, &dashboard.map().view());
    out.push('\n');

    let queries = dashboard.queries();
    if let Some(message) = queries.loading_message() {
        let _ = writeln!(out, "{}", style(message).yellow());
    } else if !queries.has_any_data() {
        let _ = writeln!(out, "{}", style(NO_DATA_MESSAGE).dim());
    }
    for card in dashboard.insight_cards() {
        render_card(&mut out, &card);
    }
    out.push('\n');

    let legend = legend_items()
        .iter()
        .map(|item| item.label)
        .collect::<Vec<_>>()
        .join("  ·  ");
    let _ = writeln!(out, "{legend}");
    let _ = writeln!(out, "{}", style(LEGEND_DISCLAIMER).dim().italic());

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use saarthi_net_api::ApiConfig;
    use saarthi_net_dashboard_models::FilterDefaults;
    use saarthi_net_store::FilterStore;

    #[test]
    fn renders_every_section() {
        console::set_colors_enabled(false);
        let dashboard =
            Dashboard::new(FilterStore::new(FilterDefaults::demo()), &ApiConfig::default())
                .unwrap();

        let text = render_dashboard(&dashboard);

        assert!(text.contains("Saarthi Net"));
        assert!(text.contains("Patna · Last 30 Days"));
        assert!(text.contains("[x] Migration Heatmap (locked)"));
        assert!(text.contains("1 layer active"));
        assert!(text.contains(NO_DATA_MESSAGE));
        assert!(text.contains("Migration Overview"));
        assert!(text.contains(LEGEND_DISCLAIMER));
    }
}
