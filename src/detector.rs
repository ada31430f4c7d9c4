//! Detector lookup table
//!
//! Maps the total channel count of a frame to a named detector and the sizes
//! of its (up to three) channel planes. A zero plane size means the detector
//! has no such plane.
//!
//! Channel counts missing from the table fall back to a single plane that
//! spans every channel.

/// Number of plane slots every detector layout describes.
pub const PLANE_SLOTS: usize = 3;

/// A detector layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detector {
    pub name: String,
    pub plane_sizes: [usize; PLANE_SLOTS],
}

impl Detector {
    pub fn total_channels(&self) -> usize {
        self.plane_sizes.iter().sum()
    }

    /// Number of planes this detector actually has.
    pub fn plane_count(&self) -> usize {
        self.plane_sizes.iter().filter(|&&s| s > 0).count()
    }

    /// Channel range covered by each plane slot, `None` for absent planes.
    pub fn plane_ranges(&self) -> [Option<std::ops::Range<usize>>; PLANE_SLOTS] {
        let mut cursor = 0;
        self.plane_sizes.map(|size| {
            if size == 0 {
                None
            } else {
                let range = cursor..cursor + size;
                cursor += size;
                Some(range)
            }
        })
    }

    /// Whether this layout came from the table rather than the fallback.
    pub fn is_known(&self) -> bool {
        TABLE.iter().any(|(_, name, _)| *name == self.name)
    }
}

/// `(total channels, name, plane sizes)`
static TABLE: &[(usize, &str, [usize; PLANE_SLOTS])] = &[
    (2560, "apa", [800, 800, 960]),
    (1600, "apauv", [800, 800, 0]),
    (800, "apaind", [800, 0, 0]),
    (960, "apacol", [0, 0, 960]),
];

/// Look up the detector for a channel count.
pub fn lookup(total_channels: usize) -> Detector {
    match TABLE.iter().find(|(n, _, _)| *n == total_channels) {
        Some((_, name, sizes)) => Detector {
            name: (*name).to_string(),
            plane_sizes: *sizes,
        },
        None => Detector {
            name: format!("det{}", total_channels),
            plane_sizes: [total_channels, 0, 0],
        },
    }
}

/// Channel counts the table knows about.
pub fn known_channel_counts() -> impl Iterator<Item = usize> {
    TABLE.iter().map(|(n, _, _)| *n)
}
