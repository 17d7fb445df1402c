//! Region boundary provider.
//!
//! The facility siting sampler needs exactly two capabilities from region
//! data: a point-in-region containment test, and a per-region acceptance
//! counter used to bias sampling toward under-represented regions. This
//! module supplies both over a set of named boundary polygons loaded from a
//! GeoJSON `FeatureCollection` (e.g. a conversion of the TM World Borders
//! dataset) and filtered by an ISO-3166 alpha-3 allow-list.

use std::fs;
use std::path::{
    Path,
    PathBuf,
};

use geo::{
    Contains,
    Geometry,
    MultiPolygon,
    Point,
};
use geojson::GeoJson;
use thiserror::Error;
use tracing::{
    debug,
    warn,
};

/// Feature property holding the ISO-3166 alpha-3 region code.
const CODE_PROPERTY: &str = "ISO3";
/// Feature property holding the human-readable region name.
const NAME_PROPERTY: &str = "NAME";

/// Default allow-list of region codes: the European countries plus China,
/// India, South Africa, the United States, Turkey and Iran.
pub const DEFAULT_REGION_CODES: &[&str] = &[
    "ARM", "BIH", "CYP", "DNK", "IRL", "AUT", "EST", "CZE", "FIN", "FRA", "DEU", "GRC", "HRV",
    "HUN", "ISL", "ITA", "LTU", "LVA", "BLR", "MLT", "BEL", "AND", "GIB", "LUX", "MCO", "NLD",
    "NOR", "POL", "PRT", "ROU", "MDA", "ESP", "CHE", "GBR", "SRB", "SWE", "ALB", "MKD", "MNE",
    "SVK", "SVN", "CHN", "IND", "ZAF", "USA", "TUR", "IRN",
];

/// Errors raised while loading or filtering region data.
///
/// These are resource errors in the generator's taxonomy: fatal and
/// propagated before any generation starts.
#[derive(Debug, Error)]
pub enum RegionError {
    /// The region file could not be read.
    #[error("failed to read region file {path}: {source}")]
    Io {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The region file was not valid GeoJSON, or a geometry could not be
    /// converted.
    #[error("failed to parse region data: {0}")]
    Parse(#[from] geojson::Error),

    /// The region file parsed, but was not a `FeatureCollection`.
    #[error("region data must be a GeoJSON FeatureCollection")]
    NotFeatureCollection,

    /// No usable regions remained after applying the allow-list.
    #[error("no usable regions remain after filtering ({allowed} codes in allow-list)")]
    Empty {
        /// Number of codes in the allow-list that produced no regions.
        allowed: usize,
    },
}

/// A named boundary polygon with its acceptance counter.
#[derive(Debug, Clone)]
pub struct Region {
    /// ISO-3166 alpha-3 code identifying the region.
    pub code: String,
    /// Human-readable region name.
    pub name: String,
    /// Region boundary; all containment tests run against this.
    boundary: MultiPolygon<f64>,
    /// Number of sampled points this region has accepted so far.
    accepted: u64,
}

impl Region {
    /// Create a region from a code, display name and boundary.
    pub fn new(code: impl Into<String>, name: impl Into<String>, boundary: MultiPolygon<f64>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            boundary,
            accepted: 0,
        }
    }

    /// Whether the region contains the given (lon, lat) point.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.boundary.contains(&Point::new(lon, lat))
    }
}

/// An ordered set of permitted regions with acceptance bookkeeping.
#[derive(Debug, Clone)]
pub struct RegionSet {
    /// The permitted regions, in load order.
    regions: Vec<Region>,
}

impl RegionSet {
    /// Build a set from already-constructed regions.
    ///
    /// Fails with [`RegionError::Empty`] if `regions` is empty, so that no
    /// generation can start without region data.
    pub fn new(regions: Vec<Region>) -> Result<Self, RegionError> {
        if regions.is_empty() {
            return Err(RegionError::Empty { allowed: 0 });
        }
        Ok(Self { regions })
    }

    /// Load a region set from a GeoJSON file, keeping only features whose
    /// code property appears in `allow`.
    pub fn from_geojson_file(path: &Path, allow: &[&str]) -> Result<Self, RegionError> {
        let contents = fs::read_to_string(path).map_err(|source| RegionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_geojson_str(&contents, allow)
    }

    /// Parse a region set from a GeoJSON string, keeping only features whose
    /// code property appears in `allow`.
    ///
    /// Features without a code property or without an areal geometry are
    /// skipped with a warning; if nothing survives the filter the whole load
    /// fails with [`RegionError::Empty`].
    pub fn from_geojson_str(contents: &str, allow: &[&str]) -> Result<Self, RegionError> {
        let geojson: GeoJson = contents.parse()?;
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(RegionError::NotFeatureCollection);
        };

        let mut regions = Vec::new();
        for feature in collection.features {
            let Some(code) = feature
                .properties
                .as_ref()
                .and_then(|props| props.get(CODE_PROPERTY))
                .and_then(|value| value.as_str())
                .map(str::to_owned)
            else {
                warn!("skipping feature without a {CODE_PROPERTY} property");
                continue;
            };
            if !allow.contains(&code.as_str()) {
                continue;
            }

            let name = feature
                .properties
                .as_ref()
                .and_then(|props| props.get(NAME_PROPERTY))
                .and_then(|value| value.as_str())
                .unwrap_or(code.as_str())
                .to_owned();

            let Some(geometry) = feature.geometry else {
                warn!(%code, "skipping region feature without geometry");
                continue;
            };
            let boundary = match Geometry::<f64>::try_from(geometry.value)? {
                Geometry::Polygon(polygon) => MultiPolygon::new(vec![polygon]),
                Geometry::MultiPolygon(multi) => multi,
                _ => {
                    warn!(%code, "skipping region with non-areal geometry");
                    continue;
                },
            };

            debug!(%code, %name, "loaded region boundary");
            regions.push(Region::new(code, name, boundary));
        }

        if regions.is_empty() {
            return Err(RegionError::Empty { allowed: allow.len() });
        }
        Ok(Self { regions })
    }

    /// Number of permitted regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the set holds no regions (never true for a constructed set).
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// ISO code of the region at `index`.
    pub fn code(&self, index: usize) -> &str {
        &self.regions[index].code
    }

    /// Test a point against the permitted regions, biased toward
    /// under-represented regions.
    ///
    /// Regions are probed in ascending order of how many points they have
    /// already accepted (ties broken by load order, stable), and the first
    /// containing region accepts the point and increments its counter.
    /// Returns the index of the accepting region, or `None` if no region
    /// contains the point.
    pub fn accept(&mut self, lon: f64, lat: f64) -> Option<usize> {
        let mut order: Vec<usize> = (0..self.regions.len()).collect();
        order.sort_by_key(|&i| self.regions[i].accepted);

        for index in order {
            if self.regions[index].contains(lon, lat) {
                self.regions[index].accepted += 1;
                return Some(index);
            }
        }
        None
    }

    /// Whether any permitted region contains the point. Does not touch the
    /// acceptance counters.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.regions.iter().any(|region| region.contains(lon, lat))
    }

    /// Per-region acceptance counts, in load order.
    pub fn acceptance_counts(&self) -> impl Iterator<Item = (&str, u64)> {
        self.regions.iter().map(|region| (region.code.as_str(), region.accepted))
    }
}
