//! Issue classification passes
//!
//! Three independent rule passes over [`PageFacts`]. Each pass records every
//! check it runs, either as an issue or as a cleared check, and none depends
//! on another's output.

use crate::audit::analyzer::PageFacts;
use crate::audit::types::{AuditResult, Cleared, Issue};
use url::Url;

pub const TITLE_MIN_CHARS: usize = 10;
pub const TITLE_MAX_CHARS: usize = 60;
pub const META_DESC_MIN_CHARS: usize = 50;
pub const META_DESC_MAX_CHARS: usize = 160;
pub const MIN_WORD_COUNT: usize = 300;
pub const MIN_TEXT_HTML_RATIO: f64 = 10.0;
pub const MIN_INTERNAL_LINKS: usize = 3;
pub const MAX_INTERNAL_LINKS: usize = 100;
pub const MAX_OUTGOING_LINKS: usize = 50;
pub const MAX_QUERY_CHARS: usize = 50;
pub const MAX_HTML_SIZE_KB: f64 = 1024.0;

/// Status, indexability, core tags, canonical, orphan, sitemap, resources, mobile
pub fn audit_critical(facts: &PageFacts, url: &Url, status: u16, from_sitemap: bool) -> AuditResult {
    let mut result = AuditResult::default();

    result.check(status >= 500, Issue::ServerError, Cleared::StatusOk);
    if (400..500).contains(&status) {
        result.flag(Issue::BrokenPage);
    } else if status < 400 {
        result.clear(Cleared::NotBrokenPage);
    }
    result.check(
        (300..400).contains(&status),
        Issue::RedirectChain,
        Cleared::NoRedirectChain,
    );

    result.check(facts.is_noindex(), Issue::Noindex, Cleared::Indexable);
    result.check(facts.is_nofollow(), Issue::Nofollow, Cleared::Followable);

    result.check(facts.title.is_empty(), Issue::MissingTitle, Cleared::TitlePresent);
    result.check(
        facts.meta_description.is_empty(),
        Issue::MissingMetaDescription,
        Cleared::MetaPresent,
    );
    result.check(facts.h1.is_empty(), Issue::MissingH1, Cleared::H1Present);

    match &facts.canonical {
        Some(href) => result.check(
            !canonical_matches(href, url),
            Issue::CanonicalError,
            Cleared::CanonicalCorrect,
        ),
        None => result.clear(Cleared::CanonicalAbsent),
    }

    result.check(
        facts.internal_link_count == 0,
        Issue::OrphanPage,
        Cleared::NotOrphan,
    );

    if from_sitemap {
        result.check(
            status >= 400 || facts.is_noindex(),
            Issue::SitemapError,
            Cleared::SitemapOk,
        );
    }

    result.check(
        facts.broken_resource_count() > 0,
        Issue::BrokenCssJs,
        Cleared::CssJsOk,
    );

    if url.scheme() == "https" {
        result.check(
            facts.has_insecure_resources(),
            Issue::MixedContent,
            Cleared::NoMixedContent,
        );
    }

    result.check(
        !facts.has_viewport,
        Issue::NotMobileFriendly,
        Cleared::MobileFriendly,
    );

    result
}

/// Content quality: lengths, headings, word count, ratio, Open Graph, alt text, link density
pub fn audit_warning(facts: &PageFacts) -> AuditResult {
    let mut result = AuditResult::default();

    if !facts.title.is_empty() {
        let len = facts.title.chars().count();
        if len < TITLE_MIN_CHARS {
            result.flag(Issue::TitleTooShort);
        } else if len > TITLE_MAX_CHARS {
            result.flag(Issue::TitleTooLong);
        } else {
            result.clear(Cleared::TitleLengthOk);
        }
    }

    if !facts.meta_description.is_empty() {
        let len = facts.meta_description.chars().count();
        if len < META_DESC_MIN_CHARS {
            result.flag(Issue::MetaDescTooShort);
        } else if len > META_DESC_MAX_CHARS {
            result.flag(Issue::MetaDescTooLong);
        } else {
            result.clear(Cleared::MetaDescLengthOk);
        }
    }

    result.check(facts.h1.len() > 1, Issue::MultipleH1, Cleared::H1Single);
    result.check(
        facts.word_count < MIN_WORD_COUNT,
        Issue::LowWordCount,
        Cleared::WordCountOk,
    );
    result.check(
        facts.text_html_ratio < MIN_TEXT_HTML_RATIO,
        Issue::LowTextHtmlRatio,
        Cleared::TextHtmlRatioOk,
    );

    let og = &facts.og;
    result.check(
        og.title.is_none() || og.description.is_none() || og.image.is_none(),
        Issue::MissingOg,
        Cleared::OgPresent,
    );

    result.check(
        facts.h2_h3_count == 0,
        Issue::MissingH2H3,
        Cleared::H2H3Present,
    );

    if facts.images_missing_alt.is_empty() {
        result.clear(Cleared::AllImagesHaveAlt);
    } else {
        for _ in &facts.images_missing_alt {
            result.flag(Issue::MissingAltText);
        }
    }

    if facts.internal_link_count < MIN_INTERNAL_LINKS {
        result.flag(Issue::TooFewInternalLinks);
    } else if facts.internal_link_count > MAX_INTERNAL_LINKS {
        result.flag(Issue::TooManyInternalLinks);
    } else {
        result.clear(Cleared::InternalLinksOk);
    }

    result
}

/// Outgoing links, URL parameters, document size, social tags
pub fn audit_notice(facts: &PageFacts, url: &Url) -> AuditResult {
    let mut result = AuditResult::default();

    result.check(
        facts.external_link_count > MAX_OUTGOING_LINKS,
        Issue::TooManyOutgoingLinks,
        Cleared::OutgoingLinksOk,
    );

    let query_len = url.query().map_or(0, str::len);
    result.check(
        query_len > MAX_QUERY_CHARS,
        Issue::LongUrlParameters,
        Cleared::UrlParamsOk,
    );

    result.check(
        facts.html_size_kb_exact() > MAX_HTML_SIZE_KB,
        Issue::HtmlSizeTooLarge,
        Cleared::HtmlSizeOk,
    );

    result.check(
        facts.og.title.is_none() && facts.og.description.is_none() && facts.twitter_card.is_none(),
        Issue::MissingSocialTags,
        Cleared::SocialTagsPresent,
    );

    result
}

/// Whether a canonical href resolves to the page's own URL, ignoring fragments
fn canonical_matches(href: &str, page_url: &Url) -> bool {
    let Ok(mut canonical) = page_url.join(href) else {
        return false;
    };
    canonical.set_fragment(None);

    let mut own = page_url.clone();
    own.set_fragment(None);

    canonical == own
}
