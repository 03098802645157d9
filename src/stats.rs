//! Per-day rating summaries

use std::collections::HashMap;

use crate::data::AggregateRating;

/// Rating summary for one day's menu
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MenuStats {
    /// Mean of my ratings over the items I rated
    pub my_average: f64,
    /// Number of items I rated
    pub my_rated: usize,
    /// Mean of community averages over items that have one
    pub community_average: f64,
    /// Number of items with a community average
    pub community_rated: usize,
    /// Sum of rating counts across all items
    pub total_ratings: u32,
}

impl MenuStats {
    /// Summarizes `items` against my ratings and the community aggregates
    pub fn for_items(
        items: &[String],
        user_ratings: &HashMap<String, u8>,
        averages: &HashMap<String, AggregateRating>,
    ) -> Self {
        let mine: Vec<f64> = items
            .iter()
            .filter_map(|item| user_ratings.get(item))
            .filter(|score| **score > 0)
            .map(|score| f64::from(*score))
            .collect();

        let community: Vec<f64> = items
            .iter()
            .filter_map(|item| averages.get(item))
            .map(|aggregate| aggregate.average_rating)
            .filter(|average| *average > 0.0)
            .collect();

        let total_ratings = items
            .iter()
            .filter_map(|item| averages.get(item))
            .map(|aggregate| aggregate.total_ratings)
            .sum();

        Self {
            my_average: mean(&mine),
            my_rated: mine.len(),
            community_average: mean(&community),
            community_rated: community.len(),
            total_ratings,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Formats an average with one decimal, the way scores are shown
pub fn format_average(average: f64) -> String {
    format!("{:.1}", average)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn aggregate(average: f64, total: u32) -> AggregateRating {
        AggregateRating {
            average_rating: average,
            total_ratings: total,
            total_score: (average * f64::from(total)).round() as u32,
        }
    }

    #[test]
    fn test_empty_menu_is_zero() {
        let stats = MenuStats::for_items(&[], &HashMap::new(), &HashMap::new());
        assert_eq!(stats, MenuStats::default());
        assert_eq!(format_average(stats.my_average), "0.0");
    }

    #[test]
    fn test_my_average_counts_only_rated_items() {
        let menu = items(&["쌀밥", "미역국", "김치"]);
        let mut mine = HashMap::new();
        mine.insert("쌀밥".to_string(), 4);
        mine.insert("김치".to_string(), 5);
        mine.insert("다른날음식".to_string(), 1);

        let stats = MenuStats::for_items(&menu, &mine, &HashMap::new());
        assert_eq!(stats.my_rated, 2);
        assert!((stats.my_average - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_community_average_skips_unrated_items() {
        let menu = items(&["쌀밥", "미역국", "김치"]);
        let mut averages = HashMap::new();
        averages.insert("쌀밥".to_string(), aggregate(4.0, 2));
        averages.insert("미역국".to_string(), aggregate(0.0, 0));
        averages.insert("김치".to_string(), aggregate(3.0, 3));

        let stats = MenuStats::for_items(&menu, &HashMap::new(), &averages);
        assert_eq!(stats.community_rated, 2);
        assert!((stats.community_average - 3.5).abs() < f64::EPSILON);
        assert_eq!(stats.total_ratings, 5);
        assert_eq!(format_average(stats.community_average), "3.5");
    }
}
