// libs/appointment-cell/src/services/rules.rs
use std::collections::BTreeSet;
use tracing::debug;

use catalog_cell::ServiceCategory;

use crate::models::RuleVerdict;

type CategorySet = BTreeSet<ServiceCategory>;

/// One combination rule: `violated` returns true when the booking must be rejected.
pub struct CategoryRule {
    pub code: &'static str,
    pub message: &'static str,
    violated: fn(&CategorySet) -> bool,
}

/// Evaluated in order. Only the first violation is reported, so the order is
/// part of the observable behaviour.
pub static CATEGORY_RULES: [CategoryRule; 4] = [
    CategoryRule {
        code: "HAIRSTYLE_ONLY",
        message: "hairstyle-only booking not allowed",
        violated: hairstyle_only,
    },
    CategoryRule {
        code: "BRIDAL_WITH_SOCIAL",
        message: "cannot combine bridal with social/mature-skin",
        violated: bridal_with_social,
    },
    CategoryRule {
        code: "TOO_MANY_CATEGORIES",
        message: "no more than two service categories per booking",
        violated: too_many_categories,
    },
    CategoryRule {
        code: "INVALID_PAIR",
        message: "two categories may only be combined as a hairstyle plus one makeup service",
        violated: invalid_pair,
    },
];

fn hairstyle_only(set: &CategorySet) -> bool {
    !set.is_empty() && !set.iter().any(ServiceCategory::is_makeup)
}

fn bridal_with_social(set: &CategorySet) -> bool {
    set.contains(&ServiceCategory::Bridal)
        && (set.contains(&ServiceCategory::Social) || set.contains(&ServiceCategory::MatureSkin))
}

fn too_many_categories(set: &CategorySet) -> bool {
    set.len() > 2
}

fn invalid_pair(set: &CategorySet) -> bool {
    set.len() == 2 && set.iter().all(ServiceCategory::is_makeup)
}

/// Checks a booking's categories. Repeated entries are ignored.
pub fn validate_categories<'a>(categories: impl IntoIterator<Item = &'a ServiceCategory>) -> RuleVerdict {
    let distinct: CategorySet = categories.into_iter().copied().collect();

    match CATEGORY_RULES.iter().find(|rule| (rule.violated)(&distinct)) {
        Some(rule) => {
            debug!("Category rule {} rejected {:?}", rule.code, distinct);
            RuleVerdict::rejected(rule.code, rule.message)
        }
        None => RuleVerdict::ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ServiceCategory::*;

    #[test]
    fn test_single_makeup_categories_pass() {
        assert!(validate_categories(&[Bridal]).valid);
        assert!(validate_categories(&[Social, Social]).valid);
        assert!(validate_categories(&[MatureSkin]).valid);
    }

    #[test]
    fn test_hairstyle_plus_makeup_passes() {
        assert!(validate_categories(&[Hairstyle, Bridal]).valid);
        assert!(validate_categories(&[Social, Hairstyle, Hairstyle]).valid);
        assert!(validate_categories(&[MatureSkin, Hairstyle]).valid);
    }

    #[test]
    fn test_hairstyle_only_rejected() {
        let verdict = validate_categories(&[Hairstyle]);
        assert!(!verdict.valid);
        assert_eq!(verdict.rule, Some("HAIRSTYLE_ONLY"));
        assert_eq!(verdict.reason.as_deref(), Some("hairstyle-only booking not allowed"));
    }

    #[test]
    fn test_bridal_with_social_rejected() {
        let verdict = validate_categories(&[Bridal, Social]);
        assert_eq!(verdict.reason.as_deref(), Some("cannot combine bridal with social/mature-skin"));

        let verdict = validate_categories(&[MatureSkin, Bridal]);
        assert_eq!(verdict.rule, Some("BRIDAL_WITH_SOCIAL"));
    }

    #[test]
    fn test_rule_order_decides_reported_reason() {
        // Three categories with bridal+social trips rule 2 before rule 3.
        let verdict = validate_categories(&[Bridal, Social, Hairstyle]);
        assert_eq!(verdict.rule, Some("BRIDAL_WITH_SOCIAL"));

        let verdict = validate_categories(&[Social, MatureSkin, Hairstyle]);
        assert_eq!(verdict.rule, Some("TOO_MANY_CATEGORIES"));
    }

    #[test]
    fn test_two_makeup_categories_rejected() {
        let verdict = validate_categories(&[Social, MatureSkin]);
        assert_eq!(verdict.rule, Some("INVALID_PAIR"));
    }

    #[test]
    fn test_accepts_category_sets() {
        let set: CategorySet = [Hairstyle, Bridal].into_iter().collect();
        assert!(validate_categories(&set).valid);

        let hair_only: CategorySet = [Hairstyle].into_iter().collect();
        assert_eq!(validate_categories(&hair_only).rule, Some("HAIRSTYLE_ONLY"));
    }

    #[test]
    fn test_verdict_depends_only_on_distinct_set() {
        let cases: [&[ServiceCategory]; 4] = [
            &[Hairstyle, Social],
            &[Social, Hairstyle],
            &[Social, Social, Hairstyle],
            &[Hairstyle, Hairstyle, Social, Social],
        ];
        let first = validate_categories(cases[0]);
        for case in cases {
            assert_eq!(validate_categories(case), first);
        }

        assert_eq!(validate_categories(&[Social, Bridal]), validate_categories(&[Bridal, Bridal, Social]));
    }
}
