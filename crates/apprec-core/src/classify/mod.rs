//! Item classification from description fragments.
//!
//! A line item arrives as an ordered list of lowercased text fragments split
//! on element boundaries in the description cell. An ordered rule table maps
//! the fragment shape (count plus keyword positions) to an [`ItemType`]; the
//! first matching rule wins and anything unmatched is `Unknown`, which is a
//! terminal classification rather than an error.
//!
//! The derivation functions below are total over `ItemType`: adding a new
//! variant forces every `match` here to account for it.

mod catalog;

pub use catalog::{
    clean_service_desc, clean_streaming_desc, APPLE_ONE_TIERS, INDIVIDUAL_SUBSCRIPTIONS,
    SERVICE_SUBSCRIPTIONS, SOFTWARE_SUBSCRIPTIONS, STREAMING_SERVICES,
};

use chrono::NaiveDate;

use crate::dates::parse_date_loose;
use crate::models::receipt::{ItemType, SubscriptionCadence};

/// A single classification rule: fragment-shape predicate to item type.
struct Rule {
    item_type: ItemType,
    matches: fn(&[String]) -> bool,
}

/// Ordered rule table; first match wins.
static RULES: &[Rule] = &[
    Rule {
        item_type: ItemType::MovieRental,
        matches: |f| f.len() == 4 && f[2] == "movie rental",
    },
    Rule {
        item_type: ItemType::MoviePurchase,
        matches: |f| f.len() == 4 && f[2] == "movie",
    },
    Rule {
        item_type: ItemType::InAppPurchase,
        matches: |f| f.len() == 4 && f[2] == "in-app purchase",
    },
    Rule {
        item_type: ItemType::InAppMovieRental,
        matches: |f| f.len() == 3 && f[1] == "in-app purchase",
    },
    Rule {
        item_type: ItemType::StreamingSubscription,
        matches: |f| {
            f.len() == 3
                && f[2].starts_with("renews")
                && STREAMING_SERVICES.contains(&clean_streaming_desc(&f[1]).as_str())
        },
    },
    Rule {
        item_type: ItemType::SoftwareSubscription,
        matches: |f| {
            f.len() == 3
                && f[2].starts_with("renews")
                && SOFTWARE_SUBSCRIPTIONS.contains(&f[0].as_str())
        },
    },
    Rule {
        item_type: ItemType::ServiceSubscription,
        matches: |f| {
            f.len() == 3
                && f[2].starts_with("renews")
                && SERVICE_SUBSCRIPTIONS.contains(&clean_service_desc(&f[0]).as_str())
        },
    },
    Rule {
        item_type: ItemType::IndividualSubscription,
        matches: |f| {
            f.len() == 4
                && f[2].starts_with("renews")
                && INDIVIDUAL_SUBSCRIPTIONS.contains(&f[0].as_str())
        },
    },
];

/// Classify an item from its lowercased description fragments.
///
/// Total and pure: the same fragments always yield the same type.
pub fn classify(fragments: &[String]) -> ItemType {
    RULES
        .iter()
        .find(|rule| (rule.matches)(fragments))
        .map(|rule| rule.item_type)
        .unwrap_or(ItemType::Unknown)
}

fn before_colon(s: &str) -> &str {
    s.split(':').next().unwrap_or(s).trim()
}

fn after_colon(s: &str) -> Option<String> {
    s.split_once(':').map(|(_, rest)| rest.trim().to_string())
}

/// Derive the primary (product) description.
///
/// Every recognized type yields a nonempty description when the fragments
/// that classified it are nonempty.
pub fn primary_description(item_type: ItemType, fragments: &[String]) -> String {
    let first = fragments.first().cloned().unwrap_or_default();

    match item_type {
        ItemType::StreamingSubscription => {
            let cleaned = clean_streaming_desc(&first);
            if cleaned.contains(':') {
                before_colon(&cleaned).to_string()
            } else if cleaned.contains("apple tv") {
                // The product line is generic; the plan line names the channel.
                clean_streaming_desc(fragments.get(1).map(String::as_str).unwrap_or_default())
            } else {
                cleaned
            }
        }
        ItemType::SoftwareSubscription | ItemType::IndividualSubscription => {
            before_colon(&first).to_string()
        }
        ItemType::ServiceSubscription => {
            let cleaned = clean_service_desc(&first);
            if APPLE_ONE_TIERS.contains(&cleaned.as_str()) {
                "apple one".to_string()
            } else {
                cleaned
            }
        }
        ItemType::MovieRental
        | ItemType::MoviePurchase
        | ItemType::InAppPurchase
        | ItemType::InAppMovieRental
        | ItemType::Unknown => first,
    }
}

/// Derive the secondary (qualifier) description, when one exists.
pub fn secondary_description(item_type: ItemType, fragments: &[String]) -> Option<String> {
    let first = fragments.first().cloned().unwrap_or_default();

    match item_type {
        ItemType::MovieRental | ItemType::MoviePurchase | ItemType::InAppPurchase => {
            fragments.get(1).cloned()
        }
        ItemType::StreamingSubscription => after_colon(&clean_streaming_desc(&first)),
        ItemType::SoftwareSubscription | ItemType::IndividualSubscription => after_colon(&first),
        ItemType::ServiceSubscription => {
            let cleaned = clean_service_desc(&first);
            APPLE_ONE_TIERS.contains(&cleaned.as_str()).then_some(cleaned)
        }
        // Preserve the unmatched residual so nothing is silently dropped.
        ItemType::Unknown => {
            if fragments.len() > 1 {
                Some(fragments[1..].join("|"))
            } else {
                None
            }
        }
        ItemType::InAppMovieRental => None,
    }
}

/// Derive the billing cadence for subscription types; `None` otherwise.
pub fn subscription_cadence(
    item_type: ItemType,
    fragments: &[String],
) -> Option<SubscriptionCadence> {
    match item_type {
        ItemType::StreamingSubscription
        | ItemType::SoftwareSubscription
        | ItemType::ServiceSubscription
        | ItemType::IndividualSubscription => {
            let plan = fragments.get(1).map(String::as_str).unwrap_or_default();
            let cadence = if plan.contains("monthly") {
                SubscriptionCadence::Monthly
            } else if plan.contains("6 month") {
                SubscriptionCadence::SemiAnnual
            } else if plan.contains("(annual)") || plan.contains("(yearly)") {
                SubscriptionCadence::Annual
            } else {
                SubscriptionCadence::Unknown
            };
            Some(cadence)
        }
        ItemType::MovieRental
        | ItemType::MoviePurchase
        | ItemType::InAppPurchase
        | ItemType::InAppMovieRental
        | ItemType::Unknown => None,
    }
}

/// Derive the next renewal date for subscription types.
///
/// The renewal fragment reads "renews <date> ..."; the fixed prefix is
/// skipped and the remainder parsed loosely. Unparsable dates are `None`.
pub fn renewal_date(item_type: ItemType, fragments: &[String]) -> Option<NaiveDate> {
    match item_type {
        ItemType::StreamingSubscription
        | ItemType::SoftwareSubscription
        | ItemType::ServiceSubscription
        | ItemType::IndividualSubscription => fragments
            .get(2)
            .and_then(|renewal| renewal.get(7..))
            .and_then(parse_date_loose),
        ItemType::MovieRental
        | ItemType::MoviePurchase
        | ItemType::InAppPurchase
        | ItemType::InAppMovieRental
        | ItemType::Unknown => None,
    }
}

/// Derive the purchasing device, for types that carry one.
pub fn device(item_type: ItemType, fragments: &[String]) -> Option<String> {
    match item_type {
        ItemType::MovieRental
        | ItemType::MoviePurchase
        | ItemType::InAppPurchase
        | ItemType::IndividualSubscription => fragments.get(3).cloned(),
        ItemType::InAppMovieRental => fragments.get(2).cloned(),
        ItemType::StreamingSubscription
        | ItemType::SoftwareSubscription
        | ItemType::ServiceSubscription
        | ItemType::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frags(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_lowercase()).collect()
    }

    #[test]
    fn test_classify_movie_rental() {
        let f = frags(&["Blink Twice", "Thriller", "Movie Rental", "Device A"]);
        assert_eq!(classify(&f), ItemType::MovieRental);
        assert_eq!(primary_description(ItemType::MovieRental, &f), "blink twice");
        assert_eq!(
            secondary_description(ItemType::MovieRental, &f),
            Some("thriller".to_string())
        );
        assert_eq!(device(ItemType::MovieRental, &f), Some("device a".to_string()));
        assert_eq!(subscription_cadence(ItemType::MovieRental, &f), None);
        assert_eq!(renewal_date(ItemType::MovieRental, &f), None);
    }

    #[test]
    fn test_classify_movie_purchase() {
        let f = frags(&["Heretic", "Horror", "Movie", "Device B"]);
        assert_eq!(classify(&f), ItemType::MoviePurchase);
        assert_eq!(device(ItemType::MoviePurchase, &f), Some("device b".to_string()));
    }

    #[test]
    fn test_classify_in_app_purchase() {
        let f = frags(&["Gardenscapes", "Coin Pack", "In-App Purchase", "Device C"]);
        assert_eq!(classify(&f), ItemType::InAppPurchase);
        assert_eq!(
            secondary_description(ItemType::InAppPurchase, &f),
            Some("coin pack".to_string())
        );
    }

    #[test]
    fn test_classify_in_app_movie_rental() {
        let f = frags(&["Dr. Seuss' How the Grinch Stole Christmas", "In-App Purchase", "Device H"]);
        assert_eq!(classify(&f), ItemType::InAppMovieRental);
        assert_eq!(device(ItemType::InAppMovieRental, &f), Some("device h".to_string()));
        assert_eq!(secondary_description(ItemType::InAppMovieRental, &f), None);
    }

    #[test]
    fn test_classify_streaming_subscription() {
        let f = frags(&[
            "Max: Stream HBO, TV, & Movies",
            "Max Standard Monthly (Monthly)",
            "Renews March 24, 2025",
        ]);
        assert_eq!(classify(&f), ItemType::StreamingSubscription);
        assert_eq!(primary_description(ItemType::StreamingSubscription, &f), "max");
        assert_eq!(
            secondary_description(ItemType::StreamingSubscription, &f),
            Some("stream hbo, tv, & movies".to_string())
        );
        assert_eq!(
            subscription_cadence(ItemType::StreamingSubscription, &f),
            Some(SubscriptionCadence::Monthly)
        );
        assert_eq!(
            renewal_date(ItemType::StreamingSubscription, &f),
            NaiveDate::from_ymd_opt(2025, 3, 24)
        );
        assert_eq!(device(ItemType::StreamingSubscription, &f), None);
    }

    #[test]
    fn test_classify_software_subscription_annual() {
        let f = frags(&[
            "Copilot: Track & Budget Money",
            "Copilot Premium (Yearly)",
            "Renews Dec 18, 2024",
        ]);
        assert_eq!(classify(&f), ItemType::SoftwareSubscription);
        assert_eq!(primary_description(ItemType::SoftwareSubscription, &f), "copilot");
        assert_eq!(
            secondary_description(ItemType::SoftwareSubscription, &f),
            Some("track & budget money".to_string())
        );
        assert_eq!(
            subscription_cadence(ItemType::SoftwareSubscription, &f),
            Some(SubscriptionCadence::Annual)
        );
        assert_eq!(
            renewal_date(ItemType::SoftwareSubscription, &f),
            NaiveDate::from_ymd_opt(2024, 12, 18)
        );
    }

    #[test]
    fn test_classify_service_subscription_maps_to_bundle() {
        let f = frags(&[
            "Premier (Automatic Renewal)",
            "Monthly",
            "Renews January 5, 2025",
        ]);
        assert_eq!(classify(&f), ItemType::ServiceSubscription);
        assert_eq!(primary_description(ItemType::ServiceSubscription, &f), "apple one");
        assert_eq!(
            secondary_description(ItemType::ServiceSubscription, &f),
            Some("premier".to_string())
        );
        assert_eq!(
            subscription_cadence(ItemType::ServiceSubscription, &f),
            Some(SubscriptionCadence::Monthly)
        );
    }

    #[test]
    fn test_classify_individual_subscription_with_device() {
        let f = frags(&[
            "NYT Games: Word, Number, Logic",
            "NYT Games (Monthly)",
            "Renews February 1, 2025",
            "Device G",
        ]);
        assert_eq!(classify(&f), ItemType::IndividualSubscription);
        assert_eq!(primary_description(ItemType::IndividualSubscription, &f), "nyt games");
        assert_eq!(
            device(ItemType::IndividualSubscription, &f),
            Some("device g".to_string())
        );
    }

    #[test]
    fn test_classify_unknown_fallthrough() {
        let f = frags(&["Something New", "Mystery Line"]);
        assert_eq!(classify(&f), ItemType::Unknown);
        assert_eq!(primary_description(ItemType::Unknown, &f), "something new");
        assert_eq!(
            secondary_description(ItemType::Unknown, &f),
            Some("mystery line".to_string())
        );
        assert_eq!(subscription_cadence(ItemType::Unknown, &f), None);
        assert_eq!(device(ItemType::Unknown, &f), None);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let f = frags(&["Blink Twice", "Thriller", "Movie Rental", "Device A"]);
        let first = classify(&f);
        for _ in 0..10 {
            assert_eq!(classify(&f), first);
        }
    }

    #[test]
    fn test_unrecognized_renewal_cadence() {
        let f = frags(&[
            "Max: Stream HBO, TV, & Movies",
            "Max Standard",
            "Renews March 24, 2025",
        ]);
        assert_eq!(classify(&f), ItemType::StreamingSubscription);
        assert_eq!(
            subscription_cadence(ItemType::StreamingSubscription, &f),
            Some(SubscriptionCadence::Unknown)
        );
    }

    #[test]
    fn test_cadence_and_renewal_follow_item_type() {
        // The plan and renewal fragments are present either way; only the
        // item type decides whether they are read.
        let f = frags(&["Starz", "Starz (Monthly)", "Renews March 1, 2025", "Device Z"]);

        for item_type in [
            ItemType::MovieRental,
            ItemType::MoviePurchase,
            ItemType::InAppPurchase,
            ItemType::InAppMovieRental,
            ItemType::Unknown,
        ] {
            assert_eq!(subscription_cadence(item_type, &f), None);
            assert_eq!(renewal_date(item_type, &f), None);
        }

        for item_type in [
            ItemType::StreamingSubscription,
            ItemType::SoftwareSubscription,
            ItemType::ServiceSubscription,
            ItemType::IndividualSubscription,
        ] {
            assert_eq!(
                subscription_cadence(item_type, &f),
                Some(SubscriptionCadence::Monthly)
            );
            assert_eq!(
                renewal_date(item_type, &f),
                NaiveDate::from_ymd_opt(2025, 3, 1)
            );
        }
    }

    #[test]
    fn test_renewal_date_unparsable_is_none() {
        let f = frags(&["Starz", "Starz (Monthly)", "Renews soon"]);
        assert_eq!(renewal_date(ItemType::StreamingSubscription, &f), None);
    }
}
