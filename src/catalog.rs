//! Static campaign catalog.
//!
//! The upstream campaign listing endpoint is not always reachable, so the
//! known recurring campaigns are compiled in. This is the same list the
//! bundled snapshot datasets cover.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Campaign {
    pub slug: &'static str,
    pub name: &'static str,
}

pub const CAMPAIGNS: [Campaign; 7] = [
    Campaign { slug: "earth", name: "Wiki Loves Earth" },
    Campaign { slug: "monuments", name: "Wiki Loves Monuments" },
    Campaign { slug: "folklore", name: "Wiki Loves Folklore" },
    Campaign { slug: "africa", name: "Wiki Loves Africa" },
    Campaign { slug: "food", name: "Wiki Loves Food" },
    Campaign { slug: "public_art", name: "Wiki Loves Public Art" },
    Campaign { slug: "science", name: "Wiki Science Competition" },
];

/// Display name for a campaign slug, if it is a known campaign.
pub fn display_name(slug: &str) -> Option<&'static str> {
    CAMPAIGNS
        .iter()
        .find(|campaign| campaign.slug == slug)
        .map(|campaign| campaign.name)
}
