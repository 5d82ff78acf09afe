use crate::crawler::FetchSource;
use serde::Serialize;
use std::fmt;

/// How urgent an issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Notice,
}

/// A failed SEO check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Issue {
    // Critical
    ServerError,
    BrokenPage,
    RedirectChain,
    Noindex,
    Nofollow,
    MissingTitle,
    MissingMetaDescription,
    MissingH1,
    CanonicalError,
    OrphanPage,
    SitemapError,
    BrokenCssJs,
    MixedContent,
    NotMobileFriendly,
    // Warning
    TitleTooShort,
    TitleTooLong,
    MetaDescTooShort,
    MetaDescTooLong,
    MultipleH1,
    LowWordCount,
    LowTextHtmlRatio,
    MissingOg,
    MissingH2H3,
    MissingAltText,
    TooFewInternalLinks,
    TooManyInternalLinks,
    // Notice
    TooManyOutgoingLinks,
    LongUrlParameters,
    HtmlSizeTooLarge,
    MissingSocialTags,
}

impl Issue {
    /// The issue's wire name, as it appears in reports
    pub fn code(&self) -> &'static str {
        match self {
            Issue::ServerError => "SERVER_ERROR",
            Issue::BrokenPage => "BROKEN_PAGE",
            Issue::RedirectChain => "REDIRECT_CHAIN",
            Issue::Noindex => "NOINDEX",
            Issue::Nofollow => "NOFOLLOW",
            Issue::MissingTitle => "MISSING_TITLE",
            Issue::MissingMetaDescription => "MISSING_META_DESCRIPTION",
            Issue::MissingH1 => "MISSING_H1",
            Issue::CanonicalError => "CANONICAL_ERROR",
            Issue::OrphanPage => "ORPHAN_PAGE",
            Issue::SitemapError => "SITEMAP_ERROR",
            Issue::BrokenCssJs => "BROKEN_CSS_JS",
            Issue::MixedContent => "MIXED_CONTENT",
            Issue::NotMobileFriendly => "NOT_MOBILE_FRIENDLY",
            Issue::TitleTooShort => "TITLE_TOO_SHORT",
            Issue::TitleTooLong => "TITLE_TOO_LONG",
            Issue::MetaDescTooShort => "META_DESC_TOO_SHORT",
            Issue::MetaDescTooLong => "META_DESC_TOO_LONG",
            Issue::MultipleH1 => "MULTIPLE_H1",
            Issue::LowWordCount => "LOW_WORD_COUNT",
            Issue::LowTextHtmlRatio => "LOW_TEXT_HTML_RATIO",
            Issue::MissingOg => "MISSING_OG",
            Issue::MissingH2H3 => "MISSING_H2_H3",
            Issue::MissingAltText => "MISSING_ALT_TEXT",
            Issue::TooFewInternalLinks => "TOO_FEW_INTERNAL_LINKS",
            Issue::TooManyInternalLinks => "TOO_MANY_INTERNAL_LINKS",
            Issue::TooManyOutgoingLinks => "TOO_MANY_OUTGOING_LINKS",
            Issue::LongUrlParameters => "LONG_URL_PARAMETERS",
            Issue::HtmlSizeTooLarge => "HTML_SIZE_TOO_LARGE",
            Issue::MissingSocialTags => "MISSING_SOCIAL_TAGS",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Issue::ServerError
            | Issue::BrokenPage
            | Issue::RedirectChain
            | Issue::Noindex
            | Issue::Nofollow
            | Issue::MissingTitle
            | Issue::MissingMetaDescription
            | Issue::MissingH1
            | Issue::CanonicalError
            | Issue::OrphanPage
            | Issue::SitemapError
            | Issue::BrokenCssJs
            | Issue::MixedContent
            | Issue::NotMobileFriendly => Severity::Critical,
            Issue::TooManyOutgoingLinks
            | Issue::LongUrlParameters
            | Issue::HtmlSizeTooLarge
            | Issue::MissingSocialTags => Severity::Notice,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A passed SEO check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cleared {
    StatusOk,
    NotBrokenPage,
    NoRedirectChain,
    Indexable,
    Followable,
    TitlePresent,
    MetaPresent,
    H1Present,
    CanonicalCorrect,
    /// No canonical link was declared; reported under its historical code
    #[serde(rename = "CANONICAL_PRESENT")]
    CanonicalAbsent,
    NotOrphan,
    SitemapOk,
    CssJsOk,
    NoMixedContent,
    MobileFriendly,
    TitleLengthOk,
    MetaDescLengthOk,
    H1Single,
    WordCountOk,
    TextHtmlRatioOk,
    OgPresent,
    H2H3Present,
    AllImagesHaveAlt,
    InternalLinksOk,
    OutgoingLinksOk,
    UrlParamsOk,
    HtmlSizeOk,
    SocialTagsPresent,
}

/// Outcome of one classification pass
///
/// `issues` may repeat an entry (one `MISSING_ALT_TEXT` per offending image);
/// `cleared` never does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditResult {
    pub issues: Vec<Issue>,
    pub cleared: Vec<Cleared>,
}

impl AuditResult {
    pub fn flag(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn clear(&mut self, check: Cleared) {
        if !self.cleared.contains(&check) {
            self.cleared.push(check);
        }
    }

    /// Records `issue` when `failed`, otherwise `check`
    pub fn check(&mut self, failed: bool, issue: Issue, check: Cleared) {
        if failed {
            self.flag(issue);
        } else {
            self.clear(check);
        }
    }

    pub fn has(&self, issue: Issue) -> bool {
        self.issues.contains(&issue)
    }

    pub fn is_cleared(&self, check: Cleared) -> bool {
        self.cleared.contains(&check)
    }
}

/// Open Graph metadata of a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OpenGraph {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
}

/// An `<img>` without usable alt text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub src: String,
    pub alt: String,
}

/// Full audit record of one page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAudit {
    pub url: String,
    /// HTTP status, 0 when unknown
    pub status: u16,
    pub load_time_ms: f64,
    pub html_size_kb: f64,
    pub title: String,
    pub meta_description: String,
    pub h1: Vec<String>,
    pub word_count: usize,
    pub text_html_ratio: f64,
    pub canonical: Option<String>,
    pub og: OpenGraph,
    /// Images missing alt text
    pub images: Vec<ImageRef>,
    pub internal_link_count: usize,
    pub external_link_count: usize,
    pub html: String,
    pub critical_issues: AuditResult,
    pub warning_issues: AuditResult,
    pub notice_issues: AuditResult,
    pub from_sitemap: bool,
    /// Link depth at which the page was discovered
    pub depth: u32,
    pub fetch_source: FetchSource,
}

impl PageAudit {
    /// Every issue across the three severities
    pub fn all_issues(&self) -> impl Iterator<Item = Issue> + '_ {
        self.critical_issues
            .issues
            .iter()
            .chain(&self.warning_issues.issues)
            .chain(&self.notice_issues.issues)
            .copied()
    }

    pub fn has_issue(&self, issue: Issue) -> bool {
        self.all_issues().any(|i| i == issue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_serializes_as_code() {
        for issue in [
            Issue::MissingH2H3,
            Issue::BrokenCssJs,
            Issue::Noindex,
            Issue::MissingH1,
            Issue::MultipleH1,
            Issue::MetaDescTooLong,
            Issue::LongUrlParameters,
        ] {
            let json = serde_json::to_string(&issue).unwrap();
            assert_eq!(json, format!("\"{}\"", issue.code()));
        }
    }

    #[test]
    fn test_cleared_serialization() {
        assert_eq!(
            serde_json::to_string(&Cleared::H2H3Present).unwrap(),
            "\"H2_H3_PRESENT\""
        );
        assert_eq!(
            serde_json::to_string(&Cleared::CssJsOk).unwrap(),
            "\"CSS_JS_OK\""
        );
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(Issue::ServerError.severity(), Severity::Critical);
        assert_eq!(Issue::NotMobileFriendly.severity(), Severity::Critical);
        assert_eq!(Issue::MissingAltText.severity(), Severity::Warning);
        assert_eq!(Issue::TooManyInternalLinks.severity(), Severity::Warning);
        assert_eq!(Issue::MissingSocialTags.severity(), Severity::Notice);
    }

    #[test]
    fn test_audit_result_cleared_is_unique() {
        let mut result = AuditResult::default();
        result.clear(Cleared::StatusOk);
        result.clear(Cleared::StatusOk);
        result.flag(Issue::MissingAltText);
        result.flag(Issue::MissingAltText);

        assert_eq!(result.cleared, vec![Cleared::StatusOk]);
        assert_eq!(result.issues.len(), 2);
        assert!(result.has(Issue::MissingAltText));
        assert!(result.is_cleared(Cleared::StatusOk));
    }
}
