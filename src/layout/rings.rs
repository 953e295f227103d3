use crate::config::LayoutConfig;

#[derive(Clone, Debug, PartialEq)]
pub struct Ring {
    pub category: String,
    pub inner: f32,
    pub outer: f32,
}

impl Ring {
    pub fn midpoint(&self) -> f32 {
        (self.inner + self.outer) * 0.5
    }

    pub fn width(&self) -> f32 {
        self.outer - self.inner
    }

    /// Radial band left after insetting both edges by `margin`; collapses to the midpoint when
    /// the ring is too thin.
    pub fn inset_band(&self, margin: f32) -> (f32, f32) {
        let low = self.inner + margin;
        let high = self.outer - margin;
        if low <= high {
            (low, high)
        } else {
            let mid = self.midpoint();
            (mid, mid)
        }
    }
}

/// Category bands for the session. Built once and never changed.
#[derive(Clone, Debug, Default)]
pub struct RingTable {
    rings: Vec<Ring>,
}

impl RingTable {
    /// Explicit rings from the config when present; otherwise uniform bands assigned in the
    /// order categories first appear.
    pub fn build<'a, I>(config: &LayoutConfig, categories: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        if !config.rings.is_empty() {
            return Self {
                rings: config
                    .rings
                    .iter()
                    .map(|spec| Ring {
                        category: spec.category.clone(),
                        inner: spec.inner,
                        outer: spec.outer,
                    })
                    .collect(),
            };
        }

        let mut rings: Vec<Ring> = Vec::new();
        for category in categories {
            if rings.iter().any(|ring| ring.category == category) {
                continue;
            }
            let inner = config.center_radius + rings.len() as f32 * config.ring_width;
            rings.push(Ring {
                category: category.to_owned(),
                inner,
                outer: inner + config.ring_width,
            });
        }
        Self { rings }
    }

    pub fn get(&self, category: &str) -> Option<&Ring> {
        self.rings.iter().find(|ring| ring.category == category)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ring> {
        self.rings.iter()
    }

    pub fn outer_radius(&self) -> f32 {
        self.rings
            .iter()
            .map(|ring| ring.outer)
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RingSpec;

    #[test]
    fn uniform_bands_follow_first_appearance() {
        let config = LayoutConfig::default();
        let table = RingTable::build(&config, ["Art", "War", "Art", "Science"]);

        let bands = table
            .iter()
            .map(|ring| (ring.category.as_str(), ring.inner, ring.outer))
            .collect::<Vec<_>>();
        assert_eq!(
            bands,
            [
                ("Art", 0.0, 200.0),
                ("War", 200.0, 400.0),
                ("Science", 400.0, 600.0)
            ]
        );
        assert_eq!(table.outer_radius(), 600.0);
    }

    #[test]
    fn explicit_rings_override_and_skip_unlisted_categories() {
        let mut config = LayoutConfig::default();
        config.rings = vec![RingSpec {
            category: "War".into(),
            inner: 50.0,
            outer: 120.0,
        }];
        let table = RingTable::build(&config, ["Art", "War"]);

        assert!(table.get("Art").is_none());
        let war = table.get("War").expect("configured ring");
        assert_eq!((war.inner, war.outer), (50.0, 120.0));
    }

    #[test]
    fn inset_band_collapses_on_thin_rings() {
        let ring = Ring {
            category: "X".into(),
            inner: 100.0,
            outer: 130.0,
        };
        assert_eq!(ring.inset_band(20.0), (115.0, 115.0));
        assert_eq!(ring.inset_band(5.0), (105.0, 125.0));
        assert_eq!(ring.width(), 30.0);
    }
}
