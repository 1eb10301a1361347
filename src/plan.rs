//! Variant plans: the named size table for each entity kind.
//!
//! Plans are pure data. The pipeline iterates whichever plan the entity kind
//! selects; adding a size means extending a table here, never touching the
//! publish logic.

/// One named size variant to derive from a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSpec {
    pub name: &'static str,
    /// `None` means passthrough: no resize, still re-encoded to the
    /// delivery format.
    pub max_dimensions: Option<(u32, u32)>,
}

const UPLOAD_PLAN: &[VariantSpec] = &[
    VariantSpec {
        name: "original",
        max_dimensions: None,
    },
    VariantSpec {
        name: "large",
        max_dimensions: Some((1200, 1200)),
    },
    VariantSpec {
        name: "medium",
        max_dimensions: Some((600, 600)),
    },
    VariantSpec {
        name: "thumb",
        max_dimensions: Some((150, 150)),
    },
];

const AVATAR_PLAN: &[VariantSpec] = &[
    VariantSpec {
        name: "original",
        max_dimensions: None,
    },
    VariantSpec {
        name: "large",
        max_dimensions: Some((400, 400)),
    },
    VariantSpec {
        name: "medium",
        max_dimensions: Some((200, 200)),
    },
    VariantSpec {
        name: "thumb",
        max_dimensions: Some((80, 80)),
    },
];

/// Which fixed plan an operation publishes under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    ImageUpload,
    Avatar,
}

impl EntityKind {
    pub fn plan(self) -> &'static [VariantSpec] {
        match self {
            EntityKind::ImageUpload => UPLOAD_PLAN,
            EntityKind::Avatar => AVATAR_PLAN,
        }
    }
}

/// Storage key for one variant: `{prefix}/{variant}.jpg`.
///
/// Keys are deterministic in `(prefix, variant)`, so repeated runs for the
/// same entity overwrite prior objects instead of accumulating new ones.
pub fn storage_key(prefix: &str, variant: &str) -> String {
    format!("{prefix}/{variant}.jpg")
}
