use super::Grid;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Grid variant tag declared in the configuration document.
///
/// The variant decides where nodes sit within the axis range and, with the
/// per-axis periodicity, how spacing is derived from the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridKind {
    /// Nodes on the bounds themselves: spacing is `(upper - lower) / (points - 1)`
    /// on bounded axes. On periodic axes the upper edge aliases the lower one,
    /// so spacing is `(upper - lower) / points` and the last node sits one
    /// spacing below the upper edge.
    Uniform,
    /// Bin-centered nodes for histogram-style accumulation: spacing is
    /// `(upper - lower) / points` on every axis and node `i` sits at
    /// `lower + (i + 0.5) * spacing`.
    Histogram,
}

/// The grid configuration document.
///
/// ```toml
/// kind = "uniform"
/// lower = [0.0, 0.0]
/// upper = [1.0, 6.2831853]
/// periodic = [false, true]
/// points = [25, 32]
/// extra = 2
/// ```
///
/// All per-axis arrays must have the same length; `extra` (auxiliary
/// components per node) is optional and defaults to zero.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    pub kind: GridKind,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub periodic: Vec<bool>,
    pub points: Vec<usize>,
    #[serde(default)]
    pub extra: usize,
}

/// Errors raised while building a grid from its configuration document.
///
/// Every variant names the offending file or field path so a bad sampling
/// input can be traced back to its source without re-reading the document.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },

    #[error("TOML parsing error: {source}")]
    Parse { source: toml::de::Error },

    #[error("grid configuration declares no axes ('lower' is empty)")]
    NoAxes,

    #[error("array length mismatch at '{field}': expected {expected} entries, got {actual}")]
    ArrayLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("inverted bounds at '{field}': lower edge {lower} is not below upper edge {upper}")]
    InvertedBounds {
        field: String,
        lower: f64,
        upper: f64,
    },

    #[error("too few points at '{field}': {points} (minimum {minimum})")]
    TooFewPoints {
        field: String,
        points: usize,
        minimum: usize,
    },
}

impl Grid {
    /// Builds a grid from a validated configuration document.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] naming the offending field path if the per-axis
    /// arrays disagree in length, any axis has inverted bounds, or any axis has
    /// fewer points than its kind supports.
    pub fn from_config(config: &GridConfig) -> Result<Self, BuildError> {
        let ndim = config.lower.len();
        if ndim == 0 {
            return Err(BuildError::NoAxes);
        }

        for (field, len) in [
            ("upper", config.upper.len()),
            ("periodic", config.periodic.len()),
            ("points", config.points.len()),
        ] {
            if len != ndim {
                return Err(BuildError::ArrayLength {
                    field,
                    expected: ndim,
                    actual: len,
                });
            }
        }

        let minimum = match config.kind {
            GridKind::Uniform => 2,
            GridKind::Histogram => 1,
        };

        let mut spacing = Vec::with_capacity(ndim);
        for axis in 0..ndim {
            let (lower, upper) = (config.lower[axis], config.upper[axis]);
            if lower >= upper {
                return Err(BuildError::InvertedBounds {
                    field: format!("upper[{axis}]"),
                    lower,
                    upper,
                });
            }

            let points = config.points[axis];
            if points < minimum {
                return Err(BuildError::TooFewPoints {
                    field: format!("points[{axis}]"),
                    points,
                    minimum,
                });
            }

            let cells = match config.kind {
                GridKind::Uniform if !config.periodic[axis] => points - 1,
                _ => points,
            };
            spacing.push((upper - lower) / cells as f64);
        }

        let node_offset = match config.kind {
            GridKind::Uniform => 0.0,
            GridKind::Histogram => 0.5,
        };

        let grid = Grid::from_parts(
            config.lower.clone(),
            config.upper.clone(),
            config.periodic.clone(),
            config.points.clone(),
            spacing,
            node_offset,
            config.extra,
        );
        info!(
            "Grid built: {:?}, {} axes, {} nodes, {} extra components",
            config.kind,
            grid.ndim(),
            grid.len(),
            grid.extra_len()
        );
        Ok(grid)
    }

    /// Builds a grid from an in-memory TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Parse`] for malformed TOML (including an unknown
    /// `kind` tag), otherwise the validation errors of [`Grid::from_config`].
    pub fn from_toml_str(content: &str) -> Result<Self, BuildError> {
        let config: GridConfig =
            toml::from_str(content).map_err(|e| BuildError::Parse { source: e })?;
        Self::from_config(&config)
    }

    /// Builds a grid from a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Io`] or [`BuildError::Toml`] carrying the file
    /// path, otherwise the validation errors of [`Grid::from_config`].
    pub fn from_toml_path(path: &Path) -> Result<Self, BuildError> {
        let content = std::fs::read_to_string(path).map_err(|e| BuildError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let config: GridConfig = toml::from_str(&content).map_err(|e| BuildError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_config(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TOLERANCE: f64 = 1e-12;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn base_config() -> GridConfig {
        GridConfig {
            kind: GridKind::Uniform,
            lower: vec![0.0, -1.0],
            upper: vec![1.0, 1.0],
            periodic: vec![false, false],
            points: vec![3, 5],
            extra: 0,
        }
    }

    #[test]
    fn uniform_spacing_spans_bounds_inclusively() {
        let grid = Grid::from_config(&base_config()).unwrap();
        assert!(f64_approx_equal(grid.spacing()[0], 0.5));
        assert!(f64_approx_equal(grid.spacing()[1], 0.5));
        assert_eq!(grid.location_at(&[2, 4]).unwrap(), vec![1.0, 1.0]);
    }

    #[test]
    fn uniform_periodic_axis_excludes_upper_edge() {
        let grid = Grid::from_config(&GridConfig {
            kind: GridKind::Uniform,
            lower: vec![0.0],
            upper: vec![10.0],
            periodic: vec![true],
            points: vec![10],
            extra: 0,
        })
        .unwrap();
        assert!(f64_approx_equal(grid.spacing()[0], 1.0));
        assert_eq!(grid.location_at(&[9]).unwrap(), vec![9.0]);
    }

    #[test]
    fn histogram_kind_centers_nodes_in_bins() {
        let grid = Grid::from_config(&GridConfig {
            kind: GridKind::Histogram,
            lower: vec![0.0],
            upper: vec![4.0],
            periodic: vec![false],
            points: vec![4],
            extra: 0,
        })
        .unwrap();
        assert!(f64_approx_equal(grid.spacing()[0], 1.0));
        assert_eq!(grid.location_at(&[0]).unwrap(), vec![0.5]);
        assert_eq!(grid.location_at(&[3]).unwrap(), vec![3.5]);
        // A value in the first bin resolves to its center node.
        assert_eq!(grid.indices_for(&[0.9]).unwrap(), vec![0]);
    }

    #[test]
    fn mismatched_axis_arrays_cite_the_field() {
        let mut config = base_config();
        config.periodic = vec![false];
        match Grid::from_config(&config) {
            Err(BuildError::ArrayLength {
                field,
                expected,
                actual,
            }) => {
                assert_eq!(field, "periodic");
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("expected ArrayLength error, got {other:?}"),
        }
    }

    #[test]
    fn inverted_bounds_cite_the_axis() {
        let mut config = base_config();
        config.upper[1] = -2.0;
        match Grid::from_config(&config) {
            Err(BuildError::InvertedBounds { field, .. }) => assert_eq!(field, "upper[1]"),
            other => panic!("expected InvertedBounds error, got {other:?}"),
        }
    }

    #[test]
    fn single_point_uniform_axis_is_rejected() {
        let mut config = base_config();
        config.points[0] = 1;
        match Grid::from_config(&config) {
            Err(BuildError::TooFewPoints {
                field, minimum, ..
            }) => {
                assert_eq!(field, "points[0]");
                assert_eq!(minimum, 2);
            }
            other => panic!("expected TooFewPoints error, got {other:?}"),
        }
    }

    #[test]
    fn empty_axis_arrays_are_rejected() {
        let config = GridConfig {
            kind: GridKind::Uniform,
            lower: vec![],
            upper: vec![],
            periodic: vec![],
            points: vec![],
            extra: 0,
        };
        assert!(matches!(Grid::from_config(&config), Err(BuildError::NoAxes)));
    }

    #[test]
    fn toml_document_round_trips_through_the_factory() {
        let grid = Grid::from_toml_str(
            r#"
            kind = "uniform"
            lower = [0.0, 0.0]
            upper = [1.0, 1.0]
            periodic = [false, true]
            points = [3, 4]
            extra = 1
            "#,
        )
        .unwrap();
        assert_eq!(grid.ndim(), 2);
        assert_eq!(grid.len(), 12);
        assert_eq!(grid.extra_len(), 1);
    }

    #[test]
    fn extra_defaults_to_zero_when_omitted() {
        let grid = Grid::from_toml_str(
            r#"
            kind = "histogram"
            lower = [0.0]
            upper = [1.0]
            periodic = [false]
            points = [8]
            "#,
        )
        .unwrap();
        assert_eq!(grid.extra_len(), 0);
    }

    #[test]
    fn unknown_kind_tag_fails_to_parse() {
        let result = Grid::from_toml_str(
            r#"
            kind = "adaptive"
            lower = [0.0]
            upper = [1.0]
            periodic = [false]
            points = [3]
            "#,
        );
        assert!(matches!(result, Err(BuildError::Parse { .. })));
    }

    #[test]
    fn file_loader_reports_the_path_on_parse_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "kind = 12").unwrap();

        match Grid::from_toml_path(file.path()) {
            Err(BuildError::Toml { path, .. }) => {
                assert_eq!(path, file.path().to_string_lossy());
            }
            other => panic!("expected Toml error, got {other:?}"),
        }
    }

    #[test]
    fn file_loader_reports_the_path_on_missing_file() {
        let result = Grid::from_toml_path(Path::new("/definitely/not/here.toml"));
        match result {
            Err(BuildError::Io { path, .. }) => assert!(path.ends_with("here.toml")),
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
