/// Smallest time scale reachable with the zoom slider (most zoomed in)
pub const MIN_MS_PER_PX: f64 = 10.0;

/// Largest time scale reachable with the zoom slider (most zoomed out)
pub const MAX_MS_PER_PX: f64 = 600_000.0;

/// Range of the logarithmic zoom slider
pub const ZOOM_SLIDER_MIN: f64 = 0.0;
pub const ZOOM_SLIDER_MAX: f64 = 100.0;

/// Multiplier applied per wheel notch
pub const WHEEL_ZOOM_FACTOR: f64 = 1.1;

/// Bounds for the space zoom ratio
pub const MIN_ZOOM_RATIO: f64 = 0.1;
pub const MAX_ZOOM_RATIO: f64 = 25.0;

/// Shift+wheel pan speed (pixels per wheel delta unit)
pub const WHEEL_PAN_SPEED: f64 = 0.5;

/// Minimum vertical distance between two labelled manchette rows
pub const MANCHETTE_MIN_LABEL_SPACE: f64 = 16.0;

/// Pointer distance under which a path counts as hovered
pub const PATH_HIT_TOLERANCE: f64 = 5.0;

/// Rectangles smaller than this on either side are ignored by rect-zoom
pub const MIN_RECT_ZOOM_SIZE: f64 = 4.0;

/// Maximum number of view snapshots kept for undo
pub const DEFAULT_HISTORY_LEVELS: usize = 50;
