//! The fixed image catalog the admin panel picks task artwork from.
//!
//! Task images must name a catalog entry; reward images are free-form
//! optional references.

/// Known image keys, matching the client's bundled asset map.
pub const IMAGE_CATALOG: &[&str] = &[
    "mainCharacter",
    "crystal1",
    "crystal2",
    "crystal3",
    "crystal4",
    "crystal5",
    "crystal6",
    "crystal7",
    "crystal8",
    "crystal9",
    "telegram",
    "friends",
    "coin",
];

/// Whether `name` references a catalog entry.
pub fn is_catalog_image(name: &str) -> bool {
    IMAGE_CATALOG.contains(&name)
}
