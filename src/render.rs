// Scene Renderer - Draws the simulation state as an SVG document

use crate::config::VisualizationConfig;
use crate::orbit::{orbit_path, Vector2};
use crate::simulation::{SimulationState, TooltipView};

const TOOLTIP_LINE_HEIGHT: f64 = 16.0;
const TOOLTIP_PADDING: f64 = 8.0;
const TOOLTIP_CHAR_WIDTH: f64 = 7.0;

/// Escape text for use in SVG content and attribute values
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Path data for an outline given relative to `center`
fn path_data(points: &[Vector2], center: &Vector2) -> String {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let command = if i == 0 { 'M' } else { 'L' };
            format!("{}{:.2},{:.2}", command, center.x + p.x, center.y + p.y)
        })
        .collect::<Vec<_>>()
        .join("")
}

/// Sun sits on the focus of the first tracked orbit, or the center when empty
fn sun_position(state: &SimulationState, config: &VisualizationConfig) -> Vector2 {
    state
        .bodies
        .first()
        .map(|b| b.geometry.focus())
        .unwrap_or_else(|| config.center())
}

fn render_tooltip(tooltip: &TooltipView) -> String {
    let longest = tooltip.lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = longest as f64 * TOOLTIP_CHAR_WIDTH + 2.0 * TOOLTIP_PADDING;
    let height = tooltip.lines.len() as f64 * TOOLTIP_LINE_HEIGHT + 2.0 * TOOLTIP_PADDING;

    let mut out = format!(
        "<g class=\"tooltip\" transform=\"translate({:.2},{:.2})\" opacity=\"{:.3}\">\n",
        tooltip.x, tooltip.y, tooltip.opacity
    );
    out.push_str(&format!(
        "<rect width=\"{:.1}\" height=\"{:.1}\" rx=\"4\" fill=\"white\" stroke=\"#333\" stroke-width=\"0.5\"/>\n",
        width, height
    ));
    out.push_str("<text font-family=\"sans-serif\" font-size=\"12\" fill=\"#111\">");
    for (i, line) in tooltip.lines.iter().enumerate() {
        out.push_str(&format!(
            "<tspan x=\"{:.1}\" y=\"{:.1}\">{}</tspan>",
            TOOLTIP_PADDING,
            TOOLTIP_PADDING + (i as f64 + 0.8) * TOOLTIP_LINE_HEIGHT,
            escape_xml(line)
        ));
    }
    out.push_str("</text>\n</g>\n");
    out
}

/// Full frame: orbit outlines, sun, comet markers, then the tooltip on top
pub fn render_svg(state: &SimulationState, config: &VisualizationConfig) -> String {
    let (width, height) = config.surface_size();
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{:.0}\" height=\"{:.0}\">\n",
        width, height
    );

    for (index, body) in state.bodies.iter().enumerate() {
        let outline = orbit_path(&body.geometry, config.orbit_sample_step);
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" opacity=\"{:.3}\"/>\n",
            path_data(&outline, &body.geometry.center),
            escape_xml(&config.orbit_stroke),
            config.orbit_stroke_width,
            state.path_opacity(index, config)
        ));
    }

    let sun = sun_position(state, config);
    let half = config.sun_size / 2.0;
    svg.push_str(&format!(
        "<image href=\"{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{}\" height=\"{}\"/>\n",
        escape_xml(&config.sun_href),
        sun.x - half,
        sun.y - half,
        config.sun_size,
        config.sun_size
    ));

    for body in &state.bodies {
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.3}\" fill=\"{}\" opacity=\"{}\"><title>{}</title></circle>\n",
            body.position.x,
            body.position.y,
            body.geometry.marker_radius,
            escape_xml(&config.marker_fill),
            config.marker_opacity,
            escape_xml(&body.elements.name)
        ));
    }

    if let Some(tooltip) = state.tooltip(config) {
        svg.push_str(&render_tooltip(&tooltip));
    }

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CometCatalog;
    use crate::orbit::OrbitalElements;
    use crate::simulation::Event;

    fn state_with(names: &[&str]) -> (SimulationState, VisualizationConfig) {
        let config = VisualizationConfig::default();
        let comets = names
            .iter()
            .enumerate()
            .map(|(i, name)| OrbitalElements {
                name: name.to_string(),
                perihelion: 0.5 + i as f64,
                aphelion: 5.0 + i as f64,
                eccentricity: 0.6,
                moid: 0.3,
                period: 10.0,
            })
            .collect();
        let state = SimulationState::new(CometCatalog::from_elements(comets), &config);
        (state, config)
    }

    #[test]
    fn test_one_marker_and_outline_per_body() {
        let (state, config) = state_with(&["A", "B", "C"]);
        let svg = render_svg(&state, &config);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("width=\"1230\" height=\"750\""));
        assert_eq!(svg.matches("<circle").count(), 3);
        assert_eq!(svg.matches("<path").count(), 3);
        assert_eq!(svg.matches("<image").count(), 1);
        assert!(!svg.contains("class=\"tooltip\""));
    }

    #[test]
    fn test_sun_on_first_focus() {
        let (state, config) = state_with(&["A"]);
        let focus = state.bodies[0].geometry.focus();
        let svg = render_svg(&state, &config);
        let expected = format!("x=\"{:.2}\" y=\"{:.2}\"", focus.x - 20.0, focus.y - 20.0);
        assert!(svg.contains(&expected), "{}", svg);
    }

    #[test]
    fn test_empty_scene_renders_backdrop() {
        let (state, config) = state_with(&[]);
        let svg = render_svg(&state, &config);
        assert_eq!(svg.matches("<circle").count(), 0);
        assert!(svg.contains("x=\"595.00\" y=\"355.00\""));
    }

    #[test]
    fn test_tooltip_escaped() {
        let (mut state, config) = state_with(&["C/2020 <Odd> & Co"]);
        let target = state.bodies[0].position;
        state.handle_event(Event::PointerMove { x: target.x, y: target.y }, &config);

        let svg = render_svg(&state, &config);
        assert!(svg.contains("class=\"tooltip\""));
        assert!(svg.contains("Name: C/2020 &lt;Odd&gt; &amp; Co"));
        assert!(svg.contains("opacity=\"1.000\""));
    }
}
