//! Robots.txt parser implementation
//!
//! Allow/disallow decisions are delegated to the robotstxt crate (Google's
//! matcher). Group structure, `Crawl-delay` and `Sitemap` lines, which the
//! matcher does not expose, are parsed here.

use robotstxt::DefaultMatcher;

/// Agent token that only ever matches the `*` group
const GENERIC_AGENT: &str = "SeoAuditGenericAgent";

/// One `User-agent` group
#[derive(Debug, Clone, PartialEq)]
struct Group {
    /// Lower-cased agent tokens
    agents: Vec<String>,
    disallows: Vec<String>,
    crawl_delay: Option<f64>,
}

/// Parsed robots.txt data
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content (empty string means allow all)
    content: String,
    groups: Vec<Group>,
    sitemaps: Vec<String>,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    ///
    /// # Returns
    ///
    /// A ParsedRobots instance that can be used to check URL permissions
    pub fn from_content(content: &str) -> Self {
        let (groups, sitemaps) = parse_groups(content);
        Self {
            content: content.to_string(),
            groups,
            sitemaps,
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is used when robots.txt is missing or could not be fetched.
    pub fn allow_all() -> Self {
        Self::from_content("")
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL (or path) to check
    /// * `user_agent` - The agent's product token, e.g. `GPTBot`
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// True if the `*` group disallows the site root
    pub fn blocks_everything(&self, origin: &str) -> bool {
        let has_wildcard_root_rule = self
            .groups
            .iter()
            .filter(|g| g.agents.iter().any(|a| a == "*"))
            .any(|g| g.disallows.iter().any(|d| d == "/"));

        has_wildcard_root_rule && !self.is_allowed(&root_url(origin), GENERIC_AGENT)
    }

    /// True if the file has a group naming this agent explicitly
    pub fn has_group_for(&self, user_agent: &str) -> bool {
        let agent = user_agent.to_lowercase();
        self.groups
            .iter()
            .any(|g| g.agents.iter().any(|a| *a == agent))
    }

    /// True if a group naming this agent explicitly keeps it off the site root
    pub fn explicitly_blocks(&self, origin: &str, user_agent: &str) -> bool {
        self.has_group_for(user_agent) && !self.is_allowed(&root_url(origin), user_agent)
    }

    /// URLs listed in `Sitemap:` lines
    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }

    /// Gets the crawl delay for a specific user agent
    ///
    /// A group naming the agent wins over the `*` group.
    ///
    /// # Returns
    ///
    /// * `Some(f64)` - The crawl delay in seconds
    /// * `None` - If no crawl delay is specified
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        let agent = user_agent.to_lowercase();

        let specific = self
            .groups
            .iter()
            .filter(|g| g.agents.iter().any(|a| a != "*" && agent.contains(a.as_str())))
            .find_map(|g| g.crawl_delay);

        specific.or_else(|| {
            self.groups
                .iter()
                .filter(|g| g.agents.iter().any(|a| a == "*"))
                .find_map(|g| g.crawl_delay)
        })
    }
}

fn root_url(origin: &str) -> String {
    format!("{}/", origin.trim_end_matches('/'))
}

/// Splits robots.txt into user-agent groups plus the global sitemap list
///
/// Consecutive `User-agent` lines share one group; the first rule line closes
/// the agent list so the next `User-agent` starts a new group.
fn parse_groups(content: &str) -> (Vec<Group>, Vec<String>) {
    let mut groups: Vec<Group> = Vec::new();
    let mut sitemaps = Vec::new();
    let mut collecting_agents = false;

    for line in content.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();

        match key.as_str() {
            "user-agent" => {
                if !collecting_agents || groups.is_empty() {
                    groups.push(Group {
                        agents: Vec::new(),
                        disallows: Vec::new(),
                        crawl_delay: None,
                    });
                }
                // An empty agent token names nobody
                if let Some(group) = groups.last_mut().filter(|_| !value.is_empty()) {
                    group.agents.push(value.to_lowercase());
                }
                collecting_agents = true;
            }
            "disallow" => {
                collecting_agents = false;
                if let Some(group) = groups.last_mut() {
                    if !value.is_empty() {
                        group.disallows.push(value.to_string());
                    }
                }
            }
            "crawl-delay" => {
                collecting_agents = false;
                if let (Some(group), Ok(delay)) = (groups.last_mut(), value.parse::<f64>()) {
                    group.crawl_delay = Some(delay);
                }
            }
            "sitemap" => {
                // Not part of any group
                if !value.is_empty() {
                    sitemaps.push(value.to_string());
                }
            }
            _ => {
                collecting_agents = false;
            }
        }
    }

    (groups, sitemaps)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://example.com";

    #[test]
    fn test_allow_all() {
        let robots = ParsedRobots::allow_all();
        assert!(robots.is_allowed("https://example.com/any/path", "TestBot"));
        assert!(!robots.blocks_everything(ORIGIN));
    }

    #[test]
    fn test_parse_disallow_all() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /");
        assert!(!robots.is_allowed("https://example.com/", "TestBot"));
        assert!(!robots.is_allowed("https://example.com/page", "TestBot"));
        assert!(robots.blocks_everything(ORIGIN));
    }

    #[test]
    fn test_parse_disallow_specific() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /admin");
        assert!(robots.is_allowed("https://example.com/page", "TestBot"));
        assert!(!robots.is_allowed("https://example.com/admin/users", "TestBot"));
        assert!(!robots.blocks_everything(ORIGIN));
    }

    #[test]
    fn test_parse_allow_and_disallow() {
        let robots =
            ParsedRobots::from_content("User-agent: *\nDisallow: /private\nAllow: /private/public");
        assert!(!robots.is_allowed("https://example.com/private", "TestBot"));
        assert!(robots.is_allowed("https://example.com/private/public", "TestBot"));
    }

    #[test]
    fn test_specific_agent_block() {
        let content = "User-agent: GPTBot\nDisallow: /\n\nUser-agent: *\nAllow: /";
        let robots = ParsedRobots::from_content(content);
        assert!(robots.explicitly_blocks(ORIGIN, "GPTBot"));
        assert!(!robots.explicitly_blocks(ORIGIN, "ClaudeBot"));
        assert!(robots.is_allowed("https://example.com/page", "ClaudeBot"));
        assert!(!robots.blocks_everything(ORIGIN));
    }

    #[test]
    fn test_grouped_agents_share_rules() {
        let content = "User-agent: GPTBot\nUser-agent: ClaudeBot\nDisallow: /\n";
        let robots = ParsedRobots::from_content(content);
        assert!(robots.explicitly_blocks(ORIGIN, "GPTBot"));
        assert!(robots.explicitly_blocks(ORIGIN, "ClaudeBot"));
        assert!(!robots.has_group_for("PerplexityBot"));
    }

    #[test]
    fn test_invalid_robots_txt() {
        let robots = ParsedRobots::from_content("This is not valid robots.txt {{{");
        assert!(robots.is_allowed("https://example.com/any/path", "TestBot"));
    }

    #[test]
    fn test_sitemap_lines() {
        let content = "Sitemap: https://example.com/sitemap.xml\nUser-agent: *\nDisallow:\n";
        let robots = ParsedRobots::from_content(content);
        assert_eq!(robots.sitemaps(), &["https://example.com/sitemap.xml".to_string()]);
    }

    #[test]
    fn test_crawl_delay_wildcard() {
        let robots = ParsedRobots::from_content("User-agent: *\nCrawl-delay: 10\nDisallow: /admin");
        assert_eq!(robots.crawl_delay("TestBot"), Some(10.0));
    }

    #[test]
    fn test_crawl_delay_specific_agent() {
        let content = "User-agent: TestBot\nCrawl-delay: 5\n\nUser-agent: *\nCrawl-delay: 10";
        let robots = ParsedRobots::from_content(content);
        assert_eq!(robots.crawl_delay("TestBot"), Some(5.0));
        assert_eq!(robots.crawl_delay("OtherBot"), Some(10.0));
    }

    #[test]
    fn test_crawl_delay_multiple_user_agents() {
        let content = "User-agent: BotA\nUser-agent: BotB\nCrawl-delay: 3";
        let robots = ParsedRobots::from_content(content);
        assert_eq!(robots.crawl_delay("BotA"), Some(3.0));
        assert_eq!(robots.crawl_delay("BotB"), Some(3.0));
        assert_eq!(robots.crawl_delay("BotC"), None);
    }

    #[test]
    fn test_empty_user_agent_matches_nobody() {
        let robots = ParsedRobots::from_content("User-agent:\nCrawl-delay: 60");
        assert_eq!(robots.crawl_delay("Googlebot"), None);

        let content = "User-agent:\nCrawl-delay: 60\n\nUser-agent: *\nCrawl-delay: 2";
        let robots = ParsedRobots::from_content(content);
        assert_eq!(robots.crawl_delay("Googlebot"), Some(2.0));
    }

    #[test]
    fn test_comments_ignored() {
        let content = "# hello\nUser-agent: * # everyone\nDisallow: / # all\n";
        let robots = ParsedRobots::from_content(content);
        assert!(robots.blocks_everything(ORIGIN));
    }
}
