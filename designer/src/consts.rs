//! Shared numeric constants for the designer crate.

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space radius in pixels around the first polygon vertex that closes the shape.
pub const POLYGON_CLOSE_RADIUS_PX: f64 = 10.0;

/// Screen-space hit slop in pixels for seats and thin line sections.
pub const HIT_SLOP_PX: f64 = 4.0;

// ── Camera ──────────────────────────────────────────────────────

/// Smallest allowed zoom factor.
pub const ZOOM_MIN: f64 = 0.1;

/// Largest allowed zoom factor.
pub const ZOOM_MAX: f64 = 8.0;

/// Multiplicative zoom step applied per wheel notch.
pub const ZOOM_STEP: f64 = 1.1;

// ── Drawing thresholds ──────────────────────────────────────────

/// Minimum side length for a drawn rectangular section.
pub const MIN_RECT_SECTION_SIDE: f64 = 20.0;

/// Minimum length for a drawn line.
pub const MIN_LINE_LENGTH: f64 = 10.0;

/// Minimum radius for a drawn circle.
pub const MIN_CIRCLE_RADIUS: f64 = 5.0;

/// Angular step used when snapping a line with the modifier held.
pub const LINE_SNAP_DEGREES: f64 = 15.0;

// ── Generation ──────────────────────────────────────────────────

/// Default seat diameter in layout units.
pub const DEFAULT_SEAT_SIZE: f64 = 15.0;

/// Default gap between neighbouring seats.
pub const DEFAULT_SEAT_SPACING: f64 = 20.0;

/// Default gap between generated rows.
pub const DEFAULT_ROW_SPACING: f64 = 20.0;

/// Gap between a table's edge and the seats around it.
pub const TABLE_SEAT_MARGIN: f64 = 5.0;

/// Fewest seats a generated table may carry.
pub const MIN_TABLE_SEATS: usize = 3;

/// Smallest round-table radius.
pub const MIN_ROUND_TABLE_RADIUS: f64 = 20.0;

/// Round-table radius grows by this much per seat.
pub const ROUND_TABLE_RADIUS_PER_SEAT: f64 = 4.0;

/// Extra width per seat along a rectangular table side.
pub const RECT_TABLE_SEAT_PADDING: f64 = 10.0;

/// Height of a generated rectangular table.
pub const RECT_TABLE_HEIGHT: f64 = 30.0;

/// Most seats a single drawn row may carry.
pub const MAX_ROW_SEATS: usize = 100;

/// Most rows a single drawn block may carry.
pub const MAX_GRID_ROWS: usize = 50;

/// Default y-tolerance band used when clustering seats into rows.
pub const DEFAULT_ROW_TOLERANCE: f64 = 15.0;

/// Padding kept from the section edge when aligning rows.
pub const ROW_ALIGN_PADDING: f64 = 10.0;

// ── Drawn sections ──────────────────────────────────────────────

/// Stroke padding added around a drawn line's bounding box.
pub const LINE_BOX_PADDING: f64 = 1.0;

/// Approximate glyph width as a fraction of the font size, for text section boxes.
pub const TEXT_WIDTH_FACTOR: f64 = 0.6;

/// Text section box height as a multiple of the font size.
pub const TEXT_HEIGHT_FACTOR: f64 = 1.4;

// ── Seat rendering ──────────────────────────────────────────────

/// Depth of a stadium seat as a fraction of its width.
pub const STADIUM_DEPTH_RATIO: f64 = 0.6;

/// Straight segments used to draw each rounded end of a stadium seat.
pub const STADIUM_CAP_SEGMENTS: u32 = 6;

/// Half the width of the cross drawn over a blocked seat.
pub const BLOCK_MARK_HALF: f64 = 5.0;

/// Font size of table labels in layout units.
pub const TABLE_LABEL_SIZE: f64 = 12.0;

// ── Keyboard ────────────────────────────────────────────────────

/// Arrow-key nudge distance in layout units.
pub const NUDGE_STEP: f64 = 1.0;

/// Arrow-key nudge distance with the modifier held.
pub const NUDGE_STEP_LARGE: f64 = 10.0;

/// Counts and coordinate comparisons tolerate this much floating-point error.
pub const GEOMETRY_EPSILON: f64 = 1e-9;
