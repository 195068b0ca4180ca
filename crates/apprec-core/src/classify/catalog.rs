//! Reference lists and description cleaning for item classification.
//!
//! The lists are closed: membership is checked against lowercased fragments
//! after cleaning, and anything outside them falls through to `Unknown`.

/// Streaming subscription plan names, matched against the cleaned plan line.
pub const STREAMING_SERVICES: &[&str] = &[
    "max standard",
    "max ad-free",
    "hbo max ad-free",
    "starz",
];

/// App subscriptions billed through the storefront.
pub const SOFTWARE_SUBSCRIPTIONS: &[&str] = &[
    "copilot: track & budget money",
    "bumble - dating. friends. bizz",
    "coffee meets bagel dating app",
    "hinge dating app: meet people",
    "noom: healthy weight loss",
    "paramount+",
    "snapchat",
];

/// First-party service subscriptions (bundle tiers and news).
pub const SERVICE_SUBSCRIPTIONS: &[&str] = &["family", "premier", "apple news+"];

/// Bundle tier names that roll up under a single product description.
pub const APPLE_ONE_TIERS: &[&str] = &["individual", "family", "premier"];

/// Subscriptions that carry a per-device fourth fragment.
pub const INDIVIDUAL_SUBSCRIPTIONS: &[&str] = &[
    "nyt games: word, number, logic",
    "bumble - dating. friends. bizz",
    "coffee meets bagel dating app",
    "hinge dating app: meet people",
    "paramount+",
    "snapchat",
];

/// Strip cadence annotations from a streaming plan line.
///
/// "max standard monthly (monthly)" -> "max standard".
pub fn clean_streaming_desc(desc: &str) -> String {
    desc.replace(" monthly", "")
        .replace(" (monthly)", "")
        .replace(" (automatic renewal)", "")
}

/// Strip cadence annotations and NBSP artifacts from a service tier line.
///
/// "premier (automatic renewal)" -> "premier".
pub fn clean_service_desc(desc: &str) -> String {
    desc.replace(" monthly", "")
        .replace(" (automatic renewal)", "")
        .replace('\u{00a0}', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clean_streaming_strips_cadence() {
        assert_eq!(clean_streaming_desc("max standard monthly (monthly)"), "max standard");
        assert_eq!(clean_streaming_desc("starz (automatic renewal)"), "starz");
        assert_eq!(clean_streaming_desc("max ad-free"), "max ad-free");
    }

    #[test]
    fn test_clean_service_strips_renewal_and_nbsp() {
        assert_eq!(clean_service_desc("premier (automatic renewal)"), "premier");
        assert_eq!(clean_service_desc("apple\u{00a0}news+"), "apple news+");
        assert_eq!(clean_service_desc("family monthly"), "family");
    }
}
