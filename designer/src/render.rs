//! Scene graph: the retained drawing primitives for a layout.
//!
//! The scene is an arena of [`Node`]s addressed by generational
//! [`NodeHandle`]s, plus a registry mapping model ids ([`EntityKey`]) to the
//! handle of the node that draws them. It is kept separate from the model:
//! the engine tells the scene which sections changed and the scene rebuilds
//! only their nodes. Every primitive is in layout coordinates; the host
//! applies the camera transform when it paints.
//!
//! Nodes live on four layers, painted bottom to top: background, sections,
//! seats (and tables), and the draw layer holding temporary shapes.
//!
//! Seats are drawn in their row's rotated frame and in their own shape,
//! turned to their facing angle. Blocked seats are greyed out and crossed.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::HashMap;

use std::f64::consts::{FRAC_PI_2, PI};

use crate::camera::{Point, Rect};
use crate::consts::{BLOCK_MARK_HALF, STADIUM_CAP_SEGMENTS, STADIUM_DEPTH_RATIO, TABLE_LABEL_SIZE};
use crate::doc::{Layout, Row, RowId, Seat, SeatId, SeatShape, Section, SectionId, Shape, Table};
use crate::input::{GeometryCache, TempShape};
use crate::selection::SelectionState;

/// Fill used for selected seats and outlines.
pub const SELECTION_COLOR: &str = "#F59E0B";
/// Outline of seats and tables whose row is selected.
pub const ROW_SELECTION_COLOR: &str = "#FFD700";
/// Stroke used for previews and the marquee.
pub const PREVIEW_COLOR: &str = "#2563EB";
pub const BLOCKED_FILL: &str = "#9CA3AF";
pub const BLOCKED_STROKE: &str = "#DC2626";
const TABLE_FILL: &str = "#D1D5DB";
const TABLE_TEXT_COLOR: &str = "#111827";

/// Paint order, bottom first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Background,
    Sections,
    Seats,
    Draw,
}

/// Stable reference to an arena slot. Stale after the node is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    index: usize,
    generation: u32,
}

/// Model entity drawn by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Background,
    Section(SectionId),
    Seat(SeatId),
    /// Cross over a blocked seat.
    BlockMark(SeatId),
    Table(RowId),
    TableLabel(RowId),
}

/// A drawable shape in layout coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Closed or open outline through world points.
    Path { points: Vec<Point>, closed: bool, fill: Option<String>, stroke: Option<String>, dashed: bool },
    Circle { center: Point, radius: f64, fill: Option<String>, stroke: Option<String> },
    Text { at: Point, content: String, size: f64, fill: String, rotation: f64 },
    /// Unconnected line segments.
    Segments { segments: Vec<[Point; 2]>, stroke: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub layer: Layer,
    pub key: Option<EntityKey>,
    pub primitive: Primitive,
    pub opacity: f64,
    pub selected: bool,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena of nodes plus the id→handle registry.
#[derive(Debug, Default)]
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<usize>,
    registry: HashMap<EntityKey, NodeHandle>,
    /// Keys drawn on behalf of each section, so a section can be rebuilt alone.
    owned: HashMap<SectionId, Vec<EntityKey>>,
    draw: Vec<NodeHandle>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Arena ---

    pub fn insert(&mut self, node: Node) -> NodeHandle {
        let key = node.key;
        let handle = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            NodeHandle { index, generation: slot.generation }
        } else {
            self.slots.push(Slot { generation: 0, node: Some(node) });
            NodeHandle { index: self.slots.len() - 1, generation: 0 }
        };
        if let Some(key) = key {
            if let Some(old) = self.registry.insert(key, handle) {
                self.release(old);
            }
        }
        handle
    }

    /// Remove a node; returns it if the handle was still live.
    pub fn remove(&mut self, handle: NodeHandle) -> Option<Node> {
        let node = self.release(handle)?;
        if let Some(key) = node.key {
            if self.registry.get(&key) == Some(&handle) {
                self.registry.remove(&key);
            }
        }
        Some(node)
    }

    fn release(&mut self, handle: NodeHandle) -> Option<Node> {
        let slot = self.slots.get_mut(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Some(node)
    }

    #[must_use]
    pub fn get(&self, handle: NodeHandle) -> Option<&Node> {
        self.slots.get(handle.index).filter(|s| s.generation == handle.generation)?.node.as_ref()
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.slots.get_mut(handle.index).filter(|s| s.generation == handle.generation)?.node.as_mut()
    }

    // --- Registry ---

    #[must_use]
    pub fn handle_of(&self, key: &EntityKey) -> Option<NodeHandle> {
        self.registry.get(key).copied()
    }

    #[must_use]
    pub fn node_for(&self, key: &EntityKey) -> Option<&Node> {
        self.handle_of(key).and_then(|h| self.get(h))
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live nodes on `layer`, in slot order.
    #[must_use]
    pub fn layer_nodes(&self, layer: Layer) -> Vec<&Node> {
        self.slots.iter().filter_map(|s| s.node.as_ref()).filter(|n| n.layer == layer).collect()
    }

    /// Every live node, painted bottom to top.
    #[must_use]
    pub fn paint_order(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.slots.iter().filter_map(|s| s.node.as_ref()).collect();
        nodes.sort_by_key(|n| n.layer);
        nodes
    }

    // --- Sync from the model ---

    /// Drop everything and rebuild from `layout`.
    pub fn rebuild(&mut self, layout: &Layout, selection: &SelectionState) {
        *self = Self::default();
        self.insert(Node {
            layer: Layer::Background,
            key: Some(EntityKey::Background),
            primitive: Primitive::Path {
                points: rect_points(Rect::new(0.0, 0.0, layout.canvas_width, layout.canvas_height)),
                closed: true,
                fill: Some(layout.background.fill.clone()),
                stroke: None,
                dashed: false,
            },
            opacity: 1.0,
            selected: false,
        });
        for section in &layout.sections {
            self.add_section(section, selection);
        }
    }

    /// Rebuild the nodes of one section, or drop them if it no longer exists.
    pub fn sync_section(&mut self, layout: &Layout, id: SectionId, selection: &SelectionState) {
        for key in self.owned.remove(&id).unwrap_or_default() {
            if let Some(handle) = self.handle_of(&key) {
                self.remove(handle);
            }
        }
        if let Some(section) = layout.section(&id) {
            self.add_section(section, selection);
        }
    }

    fn add_section(&mut self, section: &Section, selection: &SelectionState) {
        let mut keys = Vec::new();
        let opacity = section.style.opacity;
        let selected = selection.active_section == Some(section.id);

        let key = EntityKey::Section(section.id);
        self.insert(Node { layer: Layer::Sections, key: Some(key), primitive: section_primitive(section), opacity, selected });
        keys.push(key);

        for row in &section.rows {
            let row_selected = selection.rows.contains(&(section.id, row.id));
            if let Some(table) = &row.table {
                let mut put = |key, primitive| {
                    self.insert(Node { layer: Layer::Seats, key: Some(key), primitive, opacity, selected: row_selected });
                    keys.push(key);
                };
                put(EntityKey::Table(row.id), table_primitive(section, row, table, row_selected));
                put(EntityKey::TableLabel(row.id), table_label(section, row, table));
            }
            for (seat, at) in row.seat_points() {
                let selected = selection.seats.contains(&seat.id);
                let paint = seat_paint(section, seat, selected, row_selected);
                let key = EntityKey::Seat(seat.id);
                self.insert(Node {
                    layer: Layer::Seats,
                    key: Some(key),
                    primitive: seat_primitive(section, row, seat, at, paint),
                    opacity,
                    selected: selected || row_selected,
                });
                keys.push(key);
                if seat.blocked {
                    let key = EntityKey::BlockMark(seat.id);
                    self.insert(Node {
                        layer: Layer::Seats,
                        key: Some(key),
                        primitive: block_mark(section, at),
                        opacity,
                        selected: false,
                    });
                    keys.push(key);
                }
            }
        }
        self.owned.insert(section.id, keys);
    }

    /// Refresh selection flags, seat paint and table outlines without
    /// rebuilding geometry. Seats of a selected row count as selected.
    pub fn update_selection(&mut self, layout: &Layout, selection: &SelectionState) {
        for section in &layout.sections {
            if let Some(node) = self.handle_of(&EntityKey::Section(section.id)).and_then(|h| self.get_mut(h)) {
                node.selected = selection.active_section == Some(section.id);
            }
            for row in &section.rows {
                let row_selected = selection.rows.contains(&(section.id, row.id));
                if let Some(node) = self.handle_of(&EntityKey::Table(row.id)).and_then(|h| self.get_mut(h)) {
                    node.selected = row_selected;
                    if let Primitive::Path { stroke, .. } | Primitive::Circle { stroke, .. } = &mut node.primitive {
                        *stroke = row_selected.then(|| ROW_SELECTION_COLOR.to_string());
                    }
                }
                for seat in &row.seats {
                    let selected = selection.seats.contains(&seat.id);
                    let Some(node) = self.handle_of(&EntityKey::Seat(seat.id)).and_then(|h| self.get_mut(h)) else {
                        continue;
                    };
                    node.selected = selected || row_selected;
                    let (color, outline) = seat_paint(section, seat, selected, row_selected);
                    if let Primitive::Path { fill, stroke, .. } | Primitive::Circle { fill, stroke, .. } =
                        &mut node.primitive
                    {
                        *fill = Some(color);
                        *stroke = outline;
                    }
                }
            }
        }
    }

    /// Replace the draw layer with the cached temporary geometry.
    pub fn set_draw_layer(&mut self, cache: &GeometryCache) {
        for handle in std::mem::take(&mut self.draw) {
            self.remove(handle);
        }
        let mut primitives = Vec::new();
        if !cache.polygon.is_empty() && !matches!(cache.temp, Some(TempShape::Polyline(_))) {
            primitives.push(preview_path(cache.polygon.clone(), false, false));
        }
        if let Some(temp) = &cache.temp {
            primitives.extend(temp_primitives(temp));
        }
        for primitive in primitives {
            let handle =
                self.insert(Node { layer: Layer::Draw, key: None, primitive, opacity: 1.0, selected: false });
            self.draw.push(handle);
        }
    }

    /// Number of nodes on the draw layer.
    #[must_use]
    pub fn draw_layer_len(&self) -> usize {
        self.draw.len()
    }
}

/// Fill and stroke of a seat. Selection wins over blocking for the fill; a
/// selected row's outline wins over the blocked outline.
fn seat_paint(section: &Section, seat: &Seat, selected: bool, row_selected: bool) -> (String, Option<String>) {
    let fill = if selected {
        SELECTION_COLOR
    } else if seat.blocked {
        BLOCKED_FILL
    } else {
        section.style.seat_color.as_str()
    };
    let stroke = if row_selected {
        Some(ROW_SELECTION_COLOR)
    } else if seat.blocked {
        Some(BLOCKED_STROKE)
    } else {
        None
    };
    (fill.to_string(), stroke.map(str::to_string))
}

/// A seat at row-frame point `at`, in its shape, turned to its facing angle
/// plus the row rotation.
fn seat_primitive(section: &Section, row: &Row, seat: &Seat, at: Point, paint: (String, Option<String>)) -> Primitive {
    let (fill, stroke) = paint;
    let size = section.style.seat_size;
    let outline = match seat.shape {
        SeatShape::Circle => {
            return Primitive::Circle {
                center: section.to_world(at),
                radius: section.world_seat_size() / 2.0,
                fill: Some(fill),
                stroke,
            };
        }
        SeatShape::Rect => rect_points(Rect::around(Point::default(), size)),
        SeatShape::Stadium => stadium_outline(size),
    };
    let turn = seat.angle + row.rotation;
    let points = outline
        .into_iter()
        .map(|p| {
            let r = p.rotated(turn);
            section.to_world(Point::new(at.x + r.x, at.y + r.y))
        })
        .collect();
    Primitive::Path { points, closed: true, fill: Some(fill), stroke, dashed: false }
}

/// Outline of a stadium `size` wide and `size * STADIUM_DEPTH_RATIO` deep,
/// centered on the origin with its straight sides along x.
fn stadium_outline(size: f64) -> Vec<Point> {
    let r = size * STADIUM_DEPTH_RATIO / 2.0;
    let reach = (size / 2.0 - r).max(0.0);
    let step = PI / f64::from(STADIUM_CAP_SEGMENTS);
    let cap = |cx: f64, from: f64| {
        (0..=STADIUM_CAP_SEGMENTS).map(move |i| {
            let a = from + step * f64::from(i);
            Point::new(cx + r * a.cos(), r * a.sin())
        })
    };
    cap(reach, -FRAC_PI_2).chain(cap(-reach, FRAC_PI_2)).collect()
}

fn block_mark(section: &Section, at: Point) -> Primitive {
    let h = BLOCK_MARK_HALF;
    let end = |dx: f64, dy: f64| section.to_world(Point::new(at.x + dx, at.y + dy));
    Primitive::Segments {
        segments: vec![[end(-h, -h), end(h, h)], [end(-h, h), end(h, -h)]],
        stroke: BLOCKED_STROKE.into(),
    }
}

fn rect_points(r: Rect) -> Vec<Point> {
    vec![Point::new(r.x, r.y), Point::new(r.right(), r.y), Point::new(r.right(), r.bottom()), Point::new(r.x, r.bottom())]
}

fn section_primitive(section: &Section) -> Primitive {
    let fill = Some(section.style.fill.clone());
    let world = |points: &[Point]| points.iter().map(|p| section.to_world(*p)).collect::<Vec<_>>();
    match &section.shape {
        Shape::Rectangle => Primitive::Path {
            points: world(&rect_points(Rect::new(0.0, 0.0, section.pose.width, section.pose.height))),
            closed: true,
            fill,
            stroke: None,
            dashed: false,
        },
        Shape::Polygon { points } => {
            Primitive::Path { points: world(points), closed: true, fill, stroke: None, dashed: false }
        }
        Shape::Line { points } => {
            Primitive::Path { points: world(points), closed: false, fill: None, stroke: fill, dashed: false }
        }
        Shape::Circle { radius } => Primitive::Circle {
            center: section.world_center(),
            radius: radius * section.pose.scale,
            fill,
            stroke: None,
        },
        Shape::Text { content, font } => Primitive::Text {
            at: section.world_center(),
            content: content.clone(),
            size: font.size * section.pose.scale,
            fill: section.style.fill.clone(),
            rotation: section.pose.rotation,
        },
    }
}

fn table_primitive(section: &Section, row: &Row, table: &Table, selected: bool) -> Primitive {
    let fill = Some(row.table_style.color.clone().unwrap_or_else(|| TABLE_FILL.into()));
    let stroke = selected.then(|| ROW_SELECTION_COLOR.to_string());
    match *table {
        Table::Round { center, radius } => {
            Primitive::Circle { center: section.to_world(center), radius: radius * section.pose.scale, fill, stroke }
        }
        Table::Rect { center, width, height } => {
            let corners = rect_points(Rect::new(-width / 2.0, -height / 2.0, width, height));
            let points = corners
                .into_iter()
                .map(|p| {
                    let r = p.rotated(row.rotation);
                    section.to_world(Point::new(center.x + r.x, center.y + r.y))
                })
                .collect();
            Primitive::Path { points, closed: true, fill, stroke, dashed: false }
        }
    }
}

fn table_label(section: &Section, row: &Row, table: &Table) -> Primitive {
    Primitive::Text {
        at: section.to_world(table.center()),
        content: row.label.clone(),
        size: TABLE_LABEL_SIZE * section.pose.scale,
        fill: row.table_style.text_color.clone().unwrap_or_else(|| TABLE_TEXT_COLOR.into()),
        rotation: section.pose.rotation + row.rotation,
    }
}

fn preview_path(points: Vec<Point>, closed: bool, dashed: bool) -> Primitive {
    Primitive::Path { points, closed, fill: None, stroke: Some(PREVIEW_COLOR.into()), dashed }
}

fn temp_primitives(temp: &TempShape) -> Vec<Primitive> {
    match temp {
        TempShape::Rect(r) => vec![preview_path(rect_points(*r), true, false)],
        TempShape::Marquee(r) => vec![preview_path(rect_points(*r), true, true)],
        TempShape::Line { from, to } => vec![preview_path(vec![*from, *to], false, false)],
        TempShape::Polyline(points) => vec![preview_path(points.clone(), false, false)],
        TempShape::Circle { center, radius } => vec![Primitive::Circle {
            center: *center,
            radius: *radius,
            fill: None,
            stroke: Some(PREVIEW_COLOR.into()),
        }],
        TempShape::Seats { centers, size } => centers
            .iter()
            .map(|c| Primitive::Circle { center: *c, radius: size / 2.0, fill: None, stroke: Some(PREVIEW_COLOR.into()) })
            .collect(),
    }
}
