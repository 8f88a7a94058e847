use crate::engine::PageType;
use crate::report::Category;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Main configuration structure for an audit
///
/// Every section and key is optional in the TOML file; anything left out
/// falls back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AuditConfig {
    pub weights: CategoryWeights,
    pub thresholds: Thresholds,
    pub fetcher: FetcherConfig,
    pub ai: AiConfig,
    pub schema: SchemaRules,
    pub pipeline: PipelineConfig,
}

/// Percentage contribution of each category to the overall score
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CategoryWeights {
    pub technical: f64,
    pub content: f64,
    pub on_page: f64,
    pub geo: f64,
    pub schema: f64,
    pub performance: f64,
    pub images: f64,
}

impl CategoryWeights {
    /// Returns the configured weight for a category
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Technical => self.technical,
            Category::Content => self.content,
            Category::OnPage => self.on_page,
            Category::Geo => self.geo,
            Category::Schema => self.schema,
            Category::Performance => self.performance,
            Category::Images => self.images,
        }
    }

    /// Sum of all configured weights
    pub fn total(&self) -> f64 {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            technical: 25.0,
            content: 25.0,
            on_page: 20.0,
            geo: 5.0,
            schema: 10.0,
            performance: 10.0,
            images: 5.0,
        }
    }
}

/// Rule thresholds shared by the analyzers
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Thresholds {
    /// Accepted title length in characters (inclusive)
    pub title_min: usize,
    pub title_max: usize,

    /// Accepted meta description length in characters (inclusive)
    pub meta_description_min: usize,
    pub meta_description_max: usize,

    pub word_count: WordCountMinimums,
    pub core_web_vitals: CoreWebVitals,

    pub min_internal_links: usize,
    pub max_url_path_length: usize,
    pub max_query_params: usize,
    pub max_stylesheets: usize,
    pub max_dom_elements: usize,

    /// A robots.txt Crawl-delay above this many seconds is reported
    pub max_crawl_delay_secs: f64,

    /// Number of leading images treated as above the fold
    pub above_fold_images: usize,

    /// Paragraph length range (in words) that AI answers tend to quote
    pub citable_min_words: usize,
    pub citable_max_words: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            title_min: 30,
            title_max: 60,
            meta_description_min: 120,
            meta_description_max: 160,
            word_count: WordCountMinimums::default(),
            core_web_vitals: CoreWebVitals::default(),
            min_internal_links: 3,
            max_url_path_length: 100,
            max_query_params: 2,
            max_stylesheets: 5,
            max_dom_elements: 1500,
            max_crawl_delay_secs: 10.0,
            above_fold_images: 1,
            citable_min_words: 50,
            citable_max_words: 200,
        }
    }
}

/// Minimum word counts by page type
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WordCountMinimums {
    pub homepage: usize,
    pub blog: usize,
    pub service: usize,
    pub product: usize,
    pub other: usize,
}

impl WordCountMinimums {
    pub fn for_page_type(&self, page_type: PageType) -> usize {
        match page_type {
            PageType::Homepage => self.homepage,
            PageType::Blog => self.blog,
            PageType::Service => self.service,
            PageType::Product => self.product,
            PageType::Other => self.other,
        }
    }
}

impl Default for WordCountMinimums {
    fn default() -> Self {
        Self {
            homepage: 500,
            blog: 1500,
            service: 800,
            product: 400,
            other: 500,
        }
    }
}

/// Core Web Vitals targets
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CoreWebVitals {
    pub lcp_seconds: f64,
    pub inp_ms: f64,
    pub cls: f64,
}

impl Default for CoreWebVitals {
    fn default() -> Self {
        Self {
            lcp_seconds: 2.5,
            inp_ms: 200.0,
            cls: 0.1,
        }
    }
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetcherConfig {
    /// Name of the auditing agent (sent in the User-Agent header)
    pub agent_name: String,

    /// Version of the auditing agent
    pub agent_version: String,

    /// URL with information about the agent
    pub contact_url: String,

    /// Timeout for the primary page fetch (seconds)
    pub timeout_secs: u64,

    /// Timeout for each auxiliary fetch: robots.txt, sitemap, llms.txt (seconds)
    pub auxiliary_timeout_secs: u64,

    pub connect_timeout_secs: u64,

    /// Maximum number of redirect hops followed before giving up
    pub max_redirects: usize,
}

impl FetcherConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL)`
    pub fn user_agent(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.agent_name, self.agent_version, self.contact_url
        )
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            agent_name: "SeoAudit".to_string(),
            agent_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/seo-audit/seo-audit".to_string(),
            timeout_secs: 15,
            auxiliary_timeout_secs: 10,
            connect_timeout_secs: 10,
            max_redirects: 10,
        }
    }
}

/// E-E-A-T classification service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AiConfig {
    pub enabled: bool,

    /// Messages endpoint of the classification service
    pub endpoint: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Name of the environment variable holding the API key
    pub api_key_env: String,

    pub api_version: String,

    /// Hard timeout for the single classification call (seconds)
    pub timeout_secs: u64,

    pub max_tokens: u32,

    /// Page text is truncated to this many words before it is sent
    pub max_words: usize,

    /// Pages with less body text than this are not sent at all
    pub min_text_chars: usize,

    /// Share (percent) of the content score taken by the E-E-A-T sub-score
    pub eeat_share: f64,

    /// Upper bound of the rule-only E-E-A-T estimate used when the call fails
    pub fallback_cap: f64,

    pub eeat_weights: EeatWeights,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            model: "claude-3-5-haiku-latest".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            api_version: "2023-06-01".to_string(),
            timeout_secs: 20,
            max_tokens: 1024,
            max_words: 3000,
            min_text_chars: 100,
            eeat_share: 30.0,
            fallback_cap: 60.0,
            eeat_weights: EeatWeights::default(),
        }
    }
}

/// Sub-weights (percent) of the four E-E-A-T dimensions
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EeatWeights {
    pub experience: f64,
    pub expertise: f64,
    pub authoritativeness: f64,
    pub trustworthiness: f64,
}

impl EeatWeights {
    pub fn total(&self) -> f64 {
        self.experience + self.expertise + self.authoritativeness + self.trustworthiness
    }
}

impl Default for EeatWeights {
    fn default() -> Self {
        Self {
            experience: 20.0,
            expertise: 25.0,
            authoritativeness: 25.0,
            trustworthiness: 30.0,
        }
    }
}

/// Versioned schema.org reference data
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SchemaRules {
    /// Free-form version label of this rule set, carried into the fingerprint
    pub rules_version: String,

    /// Types that stopped producing rich results on the given date
    pub deprecated: Vec<SchemaTypeRule>,

    /// Types that only qualify for a restricted set of sites
    pub restricted: Vec<SchemaTypeRule>,

    /// Required properties per schema.org type
    pub required_properties: BTreeMap<String, Vec<String>>,
}

/// A dated rule about one schema.org type
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SchemaTypeRule {
    #[serde(rename = "type")]
    pub type_name: String,

    /// The rule applies to audits on or after this date
    pub effective: NaiveDate,

    #[serde(default)]
    pub note: String,
}

impl SchemaTypeRule {
    fn new(type_name: &str, effective: (i32, u32, u32), note: &str) -> Self {
        let (y, m, d) = effective;
        Self {
            type_name: type_name.to_string(),
            effective: NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN),
            note: note.to_string(),
        }
    }

    pub fn is_effective(&self, as_of: NaiveDate) -> bool {
        as_of >= self.effective
    }
}

impl Default for SchemaRules {
    fn default() -> Self {
        let deprecated = vec![
            SchemaTypeRule::new("HowTo", (2023, 9, 1), "HowTo rich results retired"),
            SchemaTypeRule::new(
                "SpecialAnnouncement",
                (2025, 7, 1),
                "SpecialAnnouncement rich results retired",
            ),
            SchemaTypeRule::new("CourseInfo", (2025, 6, 1), "Course info rich results retired"),
            SchemaTypeRule::new(
                "EstimatedSalary",
                (2025, 6, 1),
                "Estimated salary rich results retired",
            ),
            SchemaTypeRule::new(
                "LearningVideo",
                (2025, 6, 1),
                "Learning video rich results retired",
            ),
            SchemaTypeRule::new("ClaimReview", (2025, 6, 1), "Fact check rich results retired"),
            SchemaTypeRule::new(
                "VehicleListing",
                (2025, 6, 1),
                "Vehicle listing rich results retired",
            ),
            SchemaTypeRule::new("Dataset", (2025, 11, 1), "Dataset rich results retired"),
        ];

        let restricted = vec![SchemaTypeRule::new(
            "FAQPage",
            (2023, 8, 1),
            "FAQ rich results are limited to government and health authority sites",
        )];

        let required = [
            ("Organization", &["name", "url"][..]),
            ("LocalBusiness", &["name", "address"]),
            ("Product", &["name"]),
            ("Article", &["headline", "author", "datePublished"]),
            ("BlogPosting", &["headline", "author", "datePublished"]),
            ("NewsArticle", &["headline", "author", "datePublished"]),
            ("WebSite", &["name", "url"]),
            ("BreadcrumbList", &["itemListElement"]),
            ("VideoObject", &["name", "uploadDate"]),
            ("Event", &["name", "startDate"]),
        ];
        let required_properties = required
            .iter()
            .map(|(ty, props)| {
                (
                    ty.to_string(),
                    props.iter().map(|p| p.to_string()).collect(),
                )
            })
            .collect();

        Self {
            rules_version: "2025-11".to_string(),
            deprecated,
            restricted,
            required_properties,
        }
    }
}

/// Pipeline-wide settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PipelineConfig {
    /// Deadline for the whole audit (seconds)
    pub timeout_secs: u64,

    /// Maximum number of findings surfaced as priority fixes
    pub max_priority_fixes: usize,

    /// Fixed date for effective-dated rules; today (UTC) when unset
    pub reference_date: Option<NaiveDate>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            max_priority_fixes: 10,
            reference_date: None,
        }
    }
}
