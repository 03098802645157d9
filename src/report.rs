//! Korean date labels and the plain-text day report used by --print

use std::fmt::Write;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::orchestrator::MealOrchestrator;
use crate::stats::format_average;

/// Shown in place of a menu for days without one
pub const NO_MEAL_MESSAGE: &str = "급식 정보가 없습니다";

/// One-character Korean weekday name
pub fn korean_weekday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "월",
        Weekday::Tue => "화",
        Weekday::Wed => "수",
        Weekday::Thu => "목",
        Weekday::Fri => "금",
        Weekday::Sat => "토",
        Weekday::Sun => "일",
    }
}

/// "2024년 3월 4일 (월)"
pub fn format_korean_date(date: NaiveDate) -> String {
    format!(
        "{}년 {}월 {}일 ({})",
        date.year(),
        date.month(),
        date.day(),
        korean_weekday(date.weekday())
    )
}

/// "3/4(월)"
pub fn format_short_date(date: NaiveDate) -> String {
    format!(
        "{}/{}({})",
        date.month(),
        date.day(),
        korean_weekday(date.weekday())
    )
}

/// Renders a day's menu with ratings as plain text
pub fn day_report(orchestrator: &MealOrchestrator, date: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} 급식", format_korean_date(date));

    let items = orchestrator.meals_for_date(date);
    if items.is_empty() {
        let _ = writeln!(out, "{}", NO_MEAL_MESSAGE);
        return out;
    }

    for food in items {
        let _ = write!(out, "- {}", food);
        if let Some(mine) = orchestrator.user_rating(food) {
            let _ = write!(out, "  나의 별점 ★{}", mine);
        }
        let aggregate = orchestrator.average_rating(food);
        if aggregate.total_ratings > 0 {
            let _ = write!(
                out,
                "  평균 ★{} ({}명)",
                format_average(aggregate.average_rating),
                aggregate.total_ratings
            );
        }
        if orchestrator.is_favorite(food) {
            out.push_str("  ♥");
        }
        out.push('\n');
    }

    let stats = orchestrator.menu_stats(date);
    if orchestrator.is_signed_in() {
        let _ = writeln!(
            out,
            "나의 평균 별점: {} ({}개)",
            format_average(stats.my_average),
            stats.my_rated
        );
    }
    let _ = writeln!(
        out,
        "전체 평균 별점: {} ({}개, 총 {}명)",
        format_average(stats.community_average),
        stats.community_rated,
        stats.total_ratings
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::LocalIdentity;
    use crate::data::{MealMenus, MealSource, MealSourceError};
    use crate::orchestrator::{Collaborators, Policy};
    use crate::store::LocalStore;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct OneDay;

    #[async_trait]
    impl MealSource for OneDay {
        async fn fetch_meals(
            &self,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<MealMenus, MealSourceError> {
            let mut menus = MealMenus::new();
            menus.insert(
                NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
                vec!["쌀밥".to_string(), "미역국".to_string()],
            );
            Ok(menus)
        }
    }

    fn orchestrator() -> MealOrchestrator {
        let store = Arc::new(LocalStore::in_memory());
        MealOrchestrator::new(
            Collaborators {
                meals: Arc::new(OneDay),
                ratings: store.clone(),
                favorites: store,
                identity: Arc::new(LocalIdentity::new()),
            },
            "7480075",
            Policy::default(),
        )
    }

    #[test]
    fn test_korean_date_labels() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(format_korean_date(date), "2024년 3월 4일 (월)");
        assert_eq!(format_short_date(date), "3/4(월)");
        assert_eq!(korean_weekday(Weekday::Sun), "일");
    }

    #[tokio::test]
    async fn test_report_for_empty_day() {
        let mut orchestrator = orchestrator();
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        orchestrator.ensure_data_for_date(date).await;

        let report = day_report(&orchestrator, date);
        assert!(report.contains(NO_MEAL_MESSAGE));
    }

    #[tokio::test]
    async fn test_report_lists_ratings_and_favorites() {
        let mut orchestrator = orchestrator();
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        orchestrator.sign_in("kim").await.unwrap();
        orchestrator.submit_rating("쌀밥", 4, date).await.unwrap();
        orchestrator.toggle_favorite("미역국").await.unwrap();

        let report = day_report(&orchestrator, date);

        assert!(report.starts_with("2024년 3월 4일 (월) 급식"));
        assert!(report.contains("- 쌀밥  나의 별점 ★4  평균 ★4.0 (1명)"));
        assert!(report.contains("- 미역국  ♥"));
        assert!(report.contains("나의 평균 별점: 4.0 (1개)"));
        assert!(report.contains("전체 평균 별점: 4.0 (1개, 총 1명)"));
    }
}
