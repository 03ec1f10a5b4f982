//! Layout export: a structured JSON document and a static SVG rendering.
//!
//! The JSON form is the layout itself and re-imports to an equal layout.
//! The SVG form is drawn from a freshly built [`Scene`] so it matches what the
//! editor paints, minus selection and temporary geometry.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use crate::camera::Point;
use crate::doc::Layout;
use crate::error::DesignerError;
use crate::render::{EntityKey, Node, Primitive, Scene};
use crate::selection::SelectionState;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Serialize a layout as pretty-printed JSON.
///
/// # Errors
///
/// [`DesignerError::Export`] if serialization fails.
pub fn to_json(layout: &Layout) -> Result<String, DesignerError> {
    serde_json::to_string_pretty(layout).map_err(|e| DesignerError::Export(e.to_string()))
}

/// Parse and validate a layout document.
///
/// # Errors
///
/// [`DesignerError::Import`] when the document is malformed or violates a
/// layout invariant.
pub fn from_json(json: &str) -> Result<Layout, DesignerError> {
    let layout: Layout = serde_json::from_str(json).map_err(|e| DesignerError::Import(e.to_string()))?;
    layout.validate()?;
    Ok(layout)
}

/// Render a layout as a standalone SVG document sized to its canvas.
#[must_use]
pub fn to_svg(layout: &Layout) -> String {
    let mut scene = Scene::new();
    scene.rebuild(layout, &SelectionState::new());

    let (w, h) = (layout.canvas_width, layout.canvas_height);
    let mut svg = format!(r#"<svg xmlns="{SVG_NS}" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#);
    svg.push('\n');
    if let Some(image) = &layout.background.image {
        svg.push_str(&format!(
            r#"  <image href="{}" x="{}" y="{}" width="{}" height="{}" opacity="{}" />"#,
            escape_xml(&image.url),
            image.offset_x,
            image.offset_y,
            w * image.scale,
            h * image.scale,
            image.opacity,
        ));
        svg.push('\n');
    }
    for node in scene.paint_order() {
        svg.push_str("  ");
        svg.push_str(&node_element(layout, node));
        svg.push('\n');
    }
    svg.push_str("</svg>\n");
    svg
}

fn node_element(layout: &Layout, node: &Node) -> String {
    let opacity = if node.opacity < 1.0 { format!(r#" opacity="{}""#, node.opacity) } else { String::new() };
    let title = match node.key {
        Some(EntityKey::Seat(id)) => layout
            .seat(&id)
            .map(|seat| format!("<title>{}</title>", escape_xml(&seat.display_name)))
            .unwrap_or_default(),
        _ => String::new(),
    };
    match &node.primitive {
        Primitive::Path { points, closed, fill, stroke, dashed } => {
            let tag = if *closed { "polygon" } else { "polyline" };
            let dash = if *dashed { r#" stroke-dasharray="4 4""# } else { "" };
            let attrs = format!(
                r#"points="{}"{}{}{dash}{opacity}"#,
                points_attr(points),
                paint("fill", fill.as_deref()),
                paint("stroke", stroke.as_deref()),
            );
            if title.is_empty() { format!("<{tag} {attrs} />") } else { format!("<{tag} {attrs}>{title}</{tag}>") }
        }
        Primitive::Circle { center, radius, fill, stroke } => {
            let attrs = format!(
                r#"cx="{}" cy="{}" r="{radius}"{}{}{opacity}"#,
                center.x,
                center.y,
                paint("fill", fill.as_deref()),
                paint("stroke", stroke.as_deref()),
            );
            if title.is_empty() { format!("<circle {attrs} />") } else { format!("<circle {attrs}>{title}</circle>") }
        }
        Primitive::Text { at, content, size, fill, rotation } => format!(
            r#"<text x="{x}" y="{y}" font-size="{size}" fill="{fill}" text-anchor="middle" dominant-baseline="central" transform="rotate({rotation} {x} {y})"{opacity}>{}</text>"#,
            escape_xml(content),
            x = at.x,
            y = at.y,
            fill = escape_xml(fill),
        ),
        Primitive::Segments { segments, stroke } => {
            let d = segments
                .iter()
                .map(|[a, b]| format!("M{},{} L{},{}", a.x, a.y, b.x, b.y))
                .collect::<Vec<_>>()
                .join(" ");
            format!(r#"<path d="{d}" fill="none"{}{opacity} />"#, paint("stroke", Some(stroke)))
        }
    }
}

fn points_attr(points: &[Point]) -> String {
    points.iter().map(|p| format!("{},{}", p.x, p.y)).collect::<Vec<_>>().join(" ")
}

/// `fill`/`stroke` attribute; `none` when absent.
fn paint(attr: &str, color: Option<&str>) -> String {
    format!(r#" {attr}="{}""#, color.map_or_else(|| "none".to_string(), escape_xml))
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}
