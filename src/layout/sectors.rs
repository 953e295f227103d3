use std::collections::HashMap;
use std::f32::consts::TAU;

use super::geometry::normalize_angle;

#[derive(Clone, Debug, PartialEq)]
pub struct Sector {
    pub category: String,
    pub period: String,
    pub start_angle: f32,
    pub end_angle: f32,
}

impl Sector {
    pub fn width(&self) -> f32 {
        if self.start_angle <= self.end_angle {
            self.end_angle - self.start_angle
        } else {
            (TAU - self.start_angle) + self.end_angle
        }
    }

    pub fn midpoint(&self) -> f32 {
        normalize_angle(self.start_angle + self.width() * 0.5)
    }

    /// Half-open containment; `start > end` wraps through zero.
    pub fn contains(&self, angle: f32) -> bool {
        let angle = normalize_angle(angle);
        if self.start_angle <= self.end_angle {
            angle >= self.start_angle && angle < self.end_angle
        } else {
            angle >= self.start_angle || angle < self.end_angle
        }
    }
}

/// Sectors grouped by category, each group in angular order.
#[derive(Clone, Debug, Default)]
pub struct SectorTable {
    by_category: HashMap<String, Vec<Sector>>,
    categories: Vec<String>,
}

impl SectorTable {
    pub fn get(&self, category: &str, period: &str) -> Option<&Sector> {
        self.by_category
            .get(category)?
            .iter()
            .find(|sector| sector.period == period)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    pub fn sectors_for(&self, category: &str) -> &[Sector] {
        self.by_category
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn periods(&self, category: &str) -> Vec<&str> {
        self.sectors_for(category)
            .iter()
            .map(|sector| sector.period.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_category.values().map(Vec::len).sum()
    }

    pub fn insert(&mut self, sector: Sector) {
        if !self.by_category.contains_key(&sector.category) {
            self.categories.push(sector.category.clone());
        }
        let sectors = self
            .by_category
            .entry(sector.category.clone())
            .or_default();
        match sectors
            .iter_mut()
            .find(|existing| existing.period == sector.period)
        {
            Some(existing) => *existing = sector,
            None => sectors.push(sector),
        }
    }
}

/// Leading ordinal token (`"1a"` in `"1a Bronze Age"`), or the whole label when it has none.
pub fn period_sort_key(label: &str) -> &str {
    let trimmed = label.trim_start();
    let digits = trimmed
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map(|(index, _)| index)
        .unwrap_or(trimmed.len());
    if digits == 0 {
        return label;
    }

    let token_end = trimmed[digits..]
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_alphabetic())
        .map(|(index, _)| digits + index)
        .unwrap_or(trimmed.len());
    &trimmed[..token_end]
}

/// Distinct periods per category, ordered by [`period_sort_key`], each given an equal slice of
/// the full circle.
pub fn partition<'a, I>(entries: I) -> SectorTable
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut periods_by_category: Vec<(&str, Vec<&str>)> = Vec::new();
    for (category, period) in entries {
        match periods_by_category
            .iter_mut()
            .find(|(name, _)| *name == category)
        {
            Some((_, periods)) => {
                if !periods.contains(&period) {
                    periods.push(period);
                }
            }
            None => periods_by_category.push((category, vec![period])),
        }
    }

    let mut table = SectorTable::default();
    for (category, mut periods) in periods_by_category {
        periods.sort_by(|a, b| period_sort_key(a).cmp(period_sort_key(b)));

        let count = periods.len();
        let slice = TAU / count as f32;
        for (index, period) in periods.into_iter().enumerate() {
            let end_angle = if index + 1 == count {
                TAU
            } else {
                (index + 1) as f32 * slice
            };
            table.insert(Sector {
                category: category.to_owned(),
                period: period.to_owned(),
                start_angle: index as f32 * slice,
                end_angle,
            });
        }
        tracing::debug!(category, sectors = count, "partitioned category");
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sort_key_takes_leading_ordinal_token() {
        assert_eq!(period_sort_key("1a Bronze Age"), "1a");
        assert_eq!(period_sort_key("2b: Iron"), "2b");
        assert_eq!(period_sort_key("12"), "12");
        assert_eq!(period_sort_key("Medieval"), "Medieval");
        assert_eq!(period_sort_key("  3c late"), "3c");
    }

    #[test]
    fn periods_sort_by_key_and_split_circle_evenly() {
        let entries = [
            ("Art", "2a Renaissance"),
            ("Art", "1b Gothic"),
            ("Art", "2a Renaissance"),
            ("Art", "1a Romanesque"),
            ("War", "1a Antiquity"),
        ];
        let table = partition(entries);

        assert_eq!(
            table.periods("Art"),
            ["1a Romanesque", "1b Gothic", "2a Renaissance"]
        );
        let gothic = table.get("Art", "1b Gothic").expect("sector exists");
        assert!((gothic.start_angle - TAU / 3.0).abs() < 1e-5);
        assert!((gothic.end_angle - 2.0 * TAU / 3.0).abs() < 1e-5);

        let war = table.get("War", "1a Antiquity").expect("sector exists");
        assert_eq!((war.start_angle, war.end_angle), (0.0, TAU));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn labels_without_token_keep_lexicographic_heuristic() {
        let table = partition([("X", "Modern"), ("X", "10a"), ("X", "2a"), ("X", "Ancient")]);
        // Raw string comparison: "10a" < "2a" < "Ancient" < "Modern".
        assert_eq!(table.periods("X"), ["10a", "2a", "Ancient", "Modern"]);
    }

    #[test]
    fn equal_keys_keep_first_appearance_order() {
        let table = partition([("X", "1a later"), ("X", "1a earlier")]);
        assert_eq!(table.periods("X"), ["1a later", "1a earlier"]);
    }

    #[test]
    fn containment_handles_wraparound() {
        let sector = Sector {
            category: "X".into(),
            period: "p".into(),
            start_angle: 5.5,
            end_angle: 0.5,
        };
        assert!(sector.contains(6.0));
        assert!(sector.contains(0.25));
        assert!(sector.contains(-0.1));
        assert!(!sector.contains(3.0));
        assert!((sector.width() - (TAU - 5.0)).abs() < 1e-5);
        assert!(sector.contains(sector.midpoint()));
    }

    #[test]
    fn empty_input_produces_no_sectors() {
        let table = partition(std::iter::empty());
        assert_eq!(table.len(), 0);
        assert_eq!(table.categories().count(), 0);
    }

    proptest! {
        #[test]
        fn sectors_tile_the_circle(labels in prop::collection::vec("[0-9]{0,2}[a-c]{0,1} ?[A-Z][a-z]{0,4}", 1..12)) {
            let entries = labels.iter().map(|label| ("Cat", label.as_str())).collect::<Vec<_>>();
            let table = partition(entries);
            let sectors = table.sectors_for("Cat");

            let total: f32 = sectors.iter().map(|sector| sector.width()).sum();
            prop_assert!((total - TAU).abs() < 1e-4);
            prop_assert_eq!(sectors[0].start_angle, 0.0);
            for pair in sectors.windows(2) {
                prop_assert_eq!(pair[0].end_angle, pair[1].start_angle);
                prop_assert!(period_sort_key(&pair[0].period) <= period_sort_key(&pair[1].period));
            }
        }
    }
}
