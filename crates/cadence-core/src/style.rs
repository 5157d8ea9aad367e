//! Presentation lookup tables for the closed post enumerations.
//!
//! Each table is an exhaustive `match`, so adding a variant is a compile
//! error until its descriptor exists.

use crate::post::{ContentType, Platform, PostStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub label: &'static str,
    /// Short glyph used in compact cells.
    pub icon: &'static str,
    pub hex: &'static str,
    /// SGR colour code for terminal output.
    pub ansi: &'static str,
}

const INSTAGRAM: Descriptor = Descriptor {
    label: "Instagram",
    icon: "IG",
    hex: "#e1306c",
    ansi: "35",
};
const TWITTER: Descriptor = Descriptor {
    label: "Twitter",
    icon: "TW",
    hex: "#1da1f2",
    ansi: "36",
};
const LINKEDIN: Descriptor = Descriptor {
    label: "LinkedIn",
    icon: "LI",
    hex: "#0a66c2",
    ansi: "34",
};
const TIKTOK: Descriptor = Descriptor {
    label: "TikTok",
    icon: "TT",
    hex: "#010101",
    ansi: "37",
};
const YOUTUBE: Descriptor = Descriptor {
    label: "YouTube",
    icon: "YT",
    hex: "#ff0000",
    ansi: "31",
};
const FACEBOOK: Descriptor = Descriptor {
    label: "Facebook",
    icon: "FB",
    hex: "#1877f2",
    ansi: "34",
};

impl Platform {
    pub fn style(self) -> &'static Descriptor {
        match self {
            Self::Instagram => &INSTAGRAM,
            Self::Twitter => &TWITTER,
            Self::Linkedin => &LINKEDIN,
            Self::Tiktok => &TIKTOK,
            Self::Youtube => &YOUTUBE,
            Self::Facebook => &FACEBOOK,
        }
    }
}

const DRAFT: Descriptor = Descriptor {
    label: "Draft",
    icon: "D",
    hex: "#9ca3af",
    ansi: "90",
};
const SCHEDULED: Descriptor = Descriptor {
    label: "Scheduled",
    icon: "S",
    hex: "#3b82f6",
    ansi: "34",
};
const PUBLISHED: Descriptor = Descriptor {
    label: "Published",
    icon: "P",
    hex: "#22c55e",
    ansi: "32",
};
const FAILED: Descriptor = Descriptor {
    label: "Failed",
    icon: "F",
    hex: "#ef4444",
    ansi: "31",
};

impl PostStatus {
    pub fn style(self) -> &'static Descriptor {
        match self {
            Self::Draft => &DRAFT,
            Self::Scheduled => &SCHEDULED,
            Self::Published => &PUBLISHED,
            Self::Failed => &FAILED,
        }
    }
}

impl ContentType {
    pub fn style(self) -> &'static Descriptor {
        const IMAGE: Descriptor = Descriptor {
            label: "Image",
            icon: "img",
            hex: "#f59e0b",
            ansi: "33",
        };
        const VIDEO: Descriptor = Descriptor {
            label: "Video",
            icon: "vid",
            hex: "#ef4444",
            ansi: "31",
        };
        const CAROUSEL: Descriptor = Descriptor {
            label: "Carousel",
            icon: "car",
            hex: "#8b5cf6",
            ansi: "35",
        };
        const TEXT: Descriptor = Descriptor {
            label: "Text",
            icon: "txt",
            hex: "#6b7280",
            ansi: "37",
        };
        const STORY: Descriptor = Descriptor {
            label: "Story",
            icon: "sty",
            hex: "#ec4899",
            ansi: "35",
        };
        const REEL: Descriptor = Descriptor {
            label: "Reel",
            icon: "rel",
            hex: "#14b8a6",
            ansi: "36",
        };
        const TWEET: Descriptor = Descriptor {
            label: "Tweet",
            icon: "twt",
            hex: "#1da1f2",
            ansi: "36",
        };

        match self {
            Self::Image => &IMAGE,
            Self::Video => &VIDEO,
            Self::Carousel => &CAROUSEL,
            Self::Text => &TEXT,
            Self::Story => &STORY,
            Self::Reel => &REEL,
            Self::Tweet => &TWEET,
        }
    }
}
