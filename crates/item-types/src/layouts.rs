//! Nested layouts shared by several thing types.

use std::sync::Arc;

use once_cell::sync::Lazy;

use healthvault_thing::{FieldRule, FieldSpec, Layout, ValueKind};

/// Field names of an `occurrence`: something that happened at a time of day
/// and lasted some minutes.
pub mod occurrence {
    pub const WHEN: &str = "when";
    pub const MINUTES: &str = "minutes";
}

/// Field names of a defibrillator episode field.
pub mod episode_field {
    pub const FIELD_NAME: &str = "field-name";
    pub const FIELD_VALUE: &str = "field-value";
}

/// Field names of one image in a medical image study series.
pub mod series_image {
    pub const IMAGE_BLOB_NAME: &str = "image-blob-name";
    pub const IMAGE_PREVIEW_BLOB_NAME: &str = "image-preview-blob-name";
}

static OCCURRENCE: Lazy<Arc<Layout>> = Lazy::new(|| {
    Layout::builder()
        .field(FieldSpec::required(occurrence::WHEN, ValueKind::ApproximateTime))
        .field(
            FieldSpec::required(occurrence::MINUTES, ValueKind::Integer)
                .with_rule(FieldRule::at_least(0)),
        )
        .build()
});

static EPISODE_FIELD: Lazy<Arc<Layout>> = Lazy::new(|| {
    Layout::builder()
        .field(FieldSpec::required(
            episode_field::FIELD_NAME,
            ValueKind::CodableValue,
        ))
        .field(FieldSpec::required(
            episode_field::FIELD_VALUE,
            ValueKind::CodableValue,
        ))
        .build()
});

static SERIES_IMAGE: Lazy<Arc<Layout>> = Lazy::new(|| {
    Layout::builder()
        .field(
            FieldSpec::required(series_image::IMAGE_BLOB_NAME, ValueKind::Text)
                .with_rule(FieldRule::NotBlank),
        )
        .field(
            FieldSpec::optional(series_image::IMAGE_PREVIEW_BLOB_NAME, ValueKind::Text)
                .with_rule(FieldRule::NotBlank),
        )
        .build()
});

pub fn occurrence_layout() -> Arc<Layout> {
    Arc::clone(&OCCURRENCE)
}

pub fn defibrillator_episode_field_layout() -> Arc<Layout> {
    Arc::clone(&EPISODE_FIELD)
}

pub fn medical_image_series_image_layout() -> Arc<Layout> {
    Arc::clone(&SERIES_IMAGE)
}

/// Every shared layout with the element name it is usually written under.
pub fn all() -> Vec<(&'static str, Arc<Layout>)> {
    vec![
        ("occurrence", occurrence_layout()),
        ("defibrillator-episode-field", defibrillator_episode_field_layout()),
        ("image", medical_image_series_image_layout()),
    ]
}
