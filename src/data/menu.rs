//! Menu text cleanup
//!
//! NEIS publishes a day's dishes as one string, separated by `<br/>` and
//! decorated with allergen codes such as `쌀밥(1.2.3)`.

use std::sync::LazyLock;

use regex::Regex;

/// Separator between dishes in the `DDISH_NM` field
const DISH_SEPARATOR: &str = "<br/>";

static ALLERGEN_CODES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([0-9.,]+\)").expect("allergen pattern is valid"));

/// Removes every parenthetical run of digits, commas and periods
///
/// Nested runs such as `떡(1(2))` are removed layer by layer until nothing
/// matches, so applying this twice gives the same result as once. Text
/// without such runs is returned unchanged (apart from trimming).
pub fn strip_allergens(item: &str) -> String {
    let mut current = item.to_string();
    loop {
        let next = ALLERGEN_CODES.replace_all(&current, "").into_owned();
        if next == current {
            break;
        }
        current = next;
    }
    current.trim().to_string()
}

/// Splits a raw `DDISH_NM` value into clean dish names
pub fn parse_dish_names(raw: &str) -> Vec<String> {
    raw.split(DISH_SEPARATOR)
        .map(str::trim)
        .map(strip_allergens)
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_allergens_removes_codes() {
        assert_eq!(strip_allergens("쌀밥(1.2.3)"), "쌀밥");
        assert_eq!(strip_allergens("김치찌개(5,9,13)"), "김치찌개");
    }

    #[test]
    fn test_strip_allergens_without_parentheses_is_unchanged() {
        assert_eq!(strip_allergens("배추김치"), "배추김치");
    }

    #[test]
    fn test_strip_allergens_keeps_non_code_parentheses() {
        assert_eq!(strip_allergens("우유(저지방)"), "우유(저지방)");
    }

    #[test]
    fn test_strip_allergens_is_idempotent() {
        let inputs = [
            "쌀밥(1.2.3)",
            "닭갈비(5.6)(13)",
            "(1)",
            "샐러드 (2.5.) 소스",
            "떡(1(2))",
            "((1)(2))",
        ];
        for input in inputs {
            let once = strip_allergens(input);
            assert_eq!(strip_allergens(&once), once, "input: {}", input);
        }
    }

    #[test]
    fn test_strip_allergens_removes_every_run() {
        assert_eq!(strip_allergens("닭갈비(5.6)(13)"), "닭갈비");
        assert_eq!(strip_allergens("(1)"), "");
    }

    #[test]
    fn test_strip_allergens_removes_nested_runs() {
        assert_eq!(strip_allergens("떡(1(2))"), "떡");
        assert_eq!(strip_allergens("김밥(1.2(5))(13)"), "김밥");
    }

    #[test]
    fn test_parse_dish_names_splits_and_cleans() {
        let raw = "쌀밥(1.2.3)<br/>미역국(5.6) <br/> 배추김치(9)<br/>";
        assert_eq!(parse_dish_names(raw), vec!["쌀밥", "미역국", "배추김치"]);
    }

    #[test]
    fn test_parse_dish_names_drops_code_only_items() {
        assert_eq!(parse_dish_names("(1.2)<br/>우유"), vec!["우유"]);
    }

    #[test]
    fn test_parse_dish_names_empty_input() {
        assert!(parse_dish_names("").is_empty());
    }
}
