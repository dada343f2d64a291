//! Compiled regex patterns used across the extraction pipeline.
//!
//! All patterns are compiled once at first use with `LazyLock`. Class and id
//! patterns are matched against single whitespace-separated tokens, so they
//! anchor on `^`/`$` instead of relying on substring luck ("header" must not
//! match an `ad` rule, "shadow" must not match `ad` either).

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Class/ID Token Patterns (structural noise rules)
// =============================================================================

/// Navigation menus, breadcrumbs, skip links.
pub static NAVIGATION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(nav|navbar|navigation|menu|menubar|main-menu|mega-menu|breadcrumbs?|crumbs?|site-nav|top-?bar|toolbar|skip-?link|skip-to-content)$|^(nav|menu|breadcrumb)[-_]|[-_](nav|menu|navigation)$",
    )
    .expect("NAVIGATION_TOKEN regex")
});

/// Advertising slots and sponsored units.
pub static ADVERTISING_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(ad|ads|adv|advert|adverts|advertisement|advertising|adsense|adslot|ad-slot|ad-unit|dfp|gpt-ad|sponsor|sponsored|sponsor-box|promo|promoted|native-ad)$|^ad[-_]|[-_]ads?$|^ads[-_]",
    )
    .expect("ADVERTISING_TOKEN regex")
});

/// Social sharing bars and follow widgets.
pub static SOCIAL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(^|[-_])(share|sharing|shares|social|sharethis|addtoany|a2a|follow-us|social-links)([-_]|$)")
        .expect("SOCIAL_TOKEN regex")
});

/// Comment sections and discussion threads.
pub static COMMENTS_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(comments?|comment-list|comment-section|commentlist|disqus|disqus_thread|respond|replies|discussion)$|^comments?[-_]")
        .expect("COMMENTS_TOKEN regex")
});

/// Related / recommended content rails.
pub static RELATED_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(^|[-_])(related|recommended|recommendations|more-stories|read-next|up-next|you-may-like|most-popular|trending|outbrain|taboola)([-_]|$)",
    )
    .expect("RELATED_TOKEN regex")
});

/// Newsletter sign-up, cookie/consent banners, paywall and modal overlays.
pub static BANNER_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(^|[-_])(newsletter|subscribe|subscription|signup|sign-up|cookie|cookies|consent|gdpr|cmp|paywall|popup|modal|overlay|interstitial)([-_]|$)",
    )
    .expect("BANNER_TOKEN regex")
});

/// Pagination controls.
pub static PAGINATION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(pagination|pager|page-numbers|paging|nav-links|post-nav|post-navigation|prev-next|next-prev)$|^pagination[-_]")
        .expect("PAGINATION_TOKEN regex")
});

/// Hidden and accessibility-only helpers.
pub static HIDDEN_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(hidden|hide|is-hidden|d-none|sr-only|screen-reader-text|screen-reader-only|visually-hidden|visuallyhidden|offscreen)$")
        .expect("HIDDEN_TOKEN regex")
});

/// In-content noise removed after location: related, share, author bio, tag lists.
pub static IN_CONTENT_NOISE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(^|[-_])(related|share|sharing|social|author-bio|author-box|about-the-author|bio-box|tags|tag-list|tag-links|post-tags|entry-tags|article-tags)([-_]|$)",
    )
    .expect("IN_CONTENT_NOISE_TOKEN regex")
});

/// Inline `style` attribute hiding the element.
pub static HIDDEN_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)display\s*:\s*none|visibility\s*:\s*hidden").expect("HIDDEN_STYLE regex")
});

// =============================================================================
// Text Noise Patterns
// =============================================================================

/// Boilerplate phrases found in short leaf text (button labels, teasers).
pub static NOISE_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(read more|continue reading|read the full|subscribe|sign up|sign in|log in|register now|related articles|related stories|related posts|more stories|share this|share on|follow us|advertisement|sponsored|click here|load more|show more|see more|accept all|accept cookies|cookie settings|newsletter|skip to content|skip to main|back to top|you may also like|recommended for you|most popular|trending now|print this|email this|leave a comment|post a comment|view comments|\d+ comments?)\b",
    )
    .expect("NOISE_TEXT regex")
});

/// Whole-line boilerplate used by the line filter and heading filter.
pub static NOISE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\W*(read more|continue reading|subscribe( now| today)?|sign up( now)?|sign in|log in|share( this)?( article| story| post)?|share on \w+|advertisement|sponsored( content)?|related( articles| stories| posts)?|follow us.*|skip to (main )?content|back to top|click here.*|you may also like|recommended( for you)?|most popular|trending( now)?|comments?|\d+ comments?|leave a (comment|reply)|tags?:.*|posted in:?.*|filed under:?.*|advertisement - scroll to continue)\W*$",
    )
    .expect("NOISE_LINE regex")
});

/// Navigational anchor labels.
pub static NAV_LINK_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(read more|learn more|next|prev|previous)\b").expect("NAV_LINK_TEXT regex")
});

/// Decorative image markers in `src` or `alt`.
pub static DECORATIVE_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(icon|logo|avatar|placeholder|spacer|blank\.gif|pixel|tracking|1x1|transparent\.(gif|png)|data:image/gif)")
        .expect("DECORATIVE_IMAGE regex")
});

// =============================================================================
// Text Cleaning Patterns
// =============================================================================

/// Matches whitespace runs for normalization.
pub static WHITESPACE_NORMALIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").expect("WHITESPACE_NORMALIZE regex")
});

/// Matches three or more consecutive newlines.
pub static MULTIPLE_NEWLINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n{3,}").expect("MULTIPLE_NEWLINES regex")
});

/// Named and numeric HTML entities left in text after parsing.
pub static HTML_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[a-zA-Z]{2,8});").expect("HTML_ENTITY regex")
});

/// Trailing ` | Site` or ` - Site` title suffix.
pub static TITLE_SITE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>.+?)\s+[|\-–—]\s+[^|\-–—]+$").expect("TITLE_SITE_SUFFIX regex")
});
