//! Fixed neighborhood searches exposed to unauthenticated callers.
//!
//! Public visitors never supply filters of their own; a slug selects one of these
//! bundles or nothing at all.

use super::query::Query;

pub const PRESET_STATUSES: &[&str] = &["Active", "Coming Soon", "Pending"];
pub const PRESET_PROPERTY_TYPES: &[&str] = &["Residential"];
pub const PRESET_PHOTO_FIELDS: &[&str] = &["media_key", "uri_640", "is_primary"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geography {
    City(&'static str),
    Subdivision(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborhoodPreset {
    pub slug: &'static str,
    pub geography: Geography,
}

const PRESETS: &[NeighborhoodPreset] = &[
    NeighborhoodPreset {
        slug: "anchorage",
        geography: Geography::City("Anchorage"),
    },
    NeighborhoodPreset {
        slug: "audubon-park",
        geography: Geography::City("Audubon Park"),
    },
    NeighborhoodPreset {
        slug: "cherokee-triangle",
        geography: Geography::Subdivision(&["Cherokee Triangle"]),
    },
    NeighborhoodPreset {
        slug: "crescent-hill",
        geography: Geography::Subdivision(&["Crescent Hill"]),
    },
    NeighborhoodPreset {
        slug: "forest-springs",
        geography: Geography::Subdivision(&["Forest Springs", "Forest Springs North"]),
    },
    NeighborhoodPreset {
        slug: "highlands",
        geography: Geography::Subdivision(&["Highlands"]),
    },
    NeighborhoodPreset {
        slug: "hunting-creek",
        geography: Geography::Subdivision(&["Hunting Creek"]),
    },
    NeighborhoodPreset {
        slug: "indian-hills",
        geography: Geography::Subdivision(&["Indian Hills"]),
    },
    NeighborhoodPreset {
        slug: "lake-forest",
        geography: Geography::Subdivision(&["Lake Forest Estates"]),
    },
    NeighborhoodPreset {
        slug: "mockingbird-valley",
        geography: Geography::Subdivision(&["Mockingbird Valley"]),
    },
    NeighborhoodPreset {
        slug: "norton-commons",
        geography: Geography::Subdivision(&["NORTON COMMONS"]),
    },
    NeighborhoodPreset {
        slug: "owl-creek",
        geography: Geography::Subdivision(&["OWL CREEK"]),
    },
    NeighborhoodPreset {
        slug: "polo-fields",
        geography: Geography::Subdivision(&["Polo Fields"]),
    },
];

impl NeighborhoodPreset {
    pub fn query(&self) -> Query {
        let builder = Query::builder()
            .all_fields()
            .photos(PRESET_PHOTO_FIELDS.iter().copied())
            .one_of("mls_status", PRESET_STATUSES.iter().copied())
            .one_of("property_type", PRESET_PROPERTY_TYPES.iter().copied());

        match self.geography {
            Geography::City(city) => builder.eq("city", city),
            Geography::Subdivision([name]) => builder.eq("subdivision_name", *name),
            Geography::Subdivision(names) => {
                builder.one_of("subdivision_name", names.iter().copied())
            }
        }
        .build()
    }
}

pub fn find(slug: &str) -> Option<&'static NeighborhoodPreset> {
    PRESETS.iter().find(|preset| preset.slug == slug)
}

/// Query for a neighborhood slug; `None` for anything outside the table.
pub fn neighborhood(slug: &str) -> Option<Query> {
    find(slug).map(NeighborhoodPreset::query)
}

pub fn slugs() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|preset| preset.slug)
}
