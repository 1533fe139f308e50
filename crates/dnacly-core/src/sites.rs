// Site resolution for PnP claims
//
// Devices can only be claimed onto buildings and floors. A site is
// recognised as one when any of its `additionalInfo` entries carries
// `attributes.type` of `building` or `floor`.

use dnacly_api::models::Site;
use serde::Serialize;

const CLAIMABLE_TYPES: [&str; 2] = ["building", "floor"];

/// A building or floor a device can be claimed onto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimableSite {
    pub hierarchy: String,
    pub id: String,
}

pub fn is_claimable(site: &Site) -> bool {
    site.location_types().any(|t| CLAIMABLE_TYPES.contains(&t))
}

/// Buildings and floors, one entry per hierarchy in first-seen order.
/// When a hierarchy repeats, its last id wins.
pub fn claimable_sites(sites: &[Site]) -> Vec<ClaimableSite> {
    let mut out: Vec<ClaimableSite> = Vec::new();
    for site in sites.iter().filter(|s| is_claimable(s)) {
        if let Some(existing) = out
            .iter_mut()
            .find(|c| c.hierarchy == site.site_name_hierarchy)
        {
            existing.id.clone_from(&site.id);
        } else {
            out.push(ClaimableSite {
                hierarchy: site.site_name_hierarchy.clone(),
                id: site.id.clone(),
            });
        }
    }
    out
}

/// Id of the claimable site whose hierarchy or id equals `reference`.
pub fn resolve_site<'a>(sites: &'a [ClaimableSite], reference: &str) -> Option<&'a str> {
    sites
        .iter()
        .find(|s| s.hierarchy == reference || s.id == reference)
        .map(|s| s.id.as_str())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn site(id: &str, hierarchy: &str, kind: Option<&str>) -> Site {
        let info = kind.map_or_else(
            || json!([{ "nameSpace": "ETA", "attributes": {} }]),
            |k| json!([{ "nameSpace": "Location", "attributes": { "type": k } }]),
        );
        serde_json::from_value(json!({
            "id": id,
            "siteNameHierarchy": hierarchy,
            "additionalInfo": info,
        }))
        .expect("valid site")
    }

    #[test]
    fn only_buildings_and_floors_are_claimable() {
        let sites = vec![
            site("a", "Global/US", Some("area")),
            site("b", "Global/US/HQ", Some("building")),
            site("f", "Global/US/HQ/Floor 1", Some("floor")),
            site("x", "Global/Lab", None),
        ];

        let claimable = claimable_sites(&sites);

        let ids: Vec<&str> = claimable.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "f"]);
    }

    #[test]
    fn repeated_hierarchy_keeps_last_id_and_first_position() {
        let sites = vec![
            site("b1", "Global/US/HQ", Some("building")),
            site("f", "Global/US/HQ/Floor 1", Some("floor")),
            site("b2", "Global/US/HQ", Some("building")),
        ];

        let claimable = claimable_sites(&sites);

        assert_eq!(claimable.len(), 2);
        assert_eq!(claimable[0].hierarchy, "Global/US/HQ");
        assert_eq!(claimable[0].id, "b2");
    }

    #[test]
    fn resolves_by_hierarchy_or_id() {
        let sites = vec![ClaimableSite {
            hierarchy: "Global/US/HQ/Floor 1".into(),
            id: "f1".into(),
        }];

        assert_eq!(resolve_site(&sites, "Global/US/HQ/Floor 1"), Some("f1"));
        assert_eq!(resolve_site(&sites, "f1"), Some("f1"));
        assert_eq!(resolve_site(&sites, "Global/US/HQ"), None);
    }
}
