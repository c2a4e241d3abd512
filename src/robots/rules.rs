//! robots.txt parsing and path permission matching.

use std::collections::HashMap;

/// Parsed robots.txt permission rules.
///
/// The default (empty) value permits everything, which is also the fail-open
/// stand-in when no robots.txt can be obtained.
#[derive(Debug, Clone, Default)]
pub struct RobotsRules {
    /// Rules per user-agent token (lowercase)
    agents: HashMap<String, AgentRules>,

    /// Rules for the wildcard agent (*)
    wildcard: AgentRules,
}

#[derive(Debug, Clone, Default)]
struct AgentRules {
    /// Disallowed path prefixes
    disallow: Vec<String>,

    /// Allowed path prefixes (override disallow)
    allow: Vec<String>,
}

impl RobotsRules {
    /// Parse robots.txt content. Unknown directives are ignored.
    pub fn parse(content: &str) -> Self {
        let mut rules = Self::default();
        let mut group_agents: Vec<String> = Vec::new();
        let mut group = AgentRules::default();

        let mut flush = |agents: &mut Vec<String>, group: &mut AgentRules, rules: &mut Self| {
            for agent in agents.drain(..) {
                if agent == "*" {
                    rules.wildcard = group.clone();
                } else {
                    rules.agents.insert(agent, group.clone());
                }
            }
            *group = AgentRules::default();
        };

        for line in content.lines() {
            // Strip trailing comments and surrounding whitespace
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let Some((directive, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match directive.trim().to_lowercase().as_str() {
                "user-agent" => {
                    // A directive between agent lines closes the group
                    if !group_agents.is_empty()
                        && (!group.disallow.is_empty() || !group.allow.is_empty())
                    {
                        flush(&mut group_agents, &mut group, &mut rules);
                    }
                    group_agents.push(value.to_lowercase());
                }
                "disallow" => {
                    if !value.is_empty() {
                        group.disallow.push(value.to_string());
                    }
                }
                "allow" => {
                    if !value.is_empty() {
                        group.allow.push(value.to_string());
                    }
                }
                _ => {}
            }
        }
        flush(&mut group_agents, &mut group, &mut rules);

        rules
    }

    /// Check whether `path` is permitted for `user_agent`.
    pub fn is_allowed(&self, user_agent: &str, path: &str) -> bool {
        let agent_lower = user_agent.to_lowercase();

        let rules = self
            .agents
            .get(&agent_lower)
            .or_else(|| {
                // Product-token match: "MyBot/2.1" matches a "mybot" group.
                // Whole tokens only, so a short group name never matches
                // mid-string in an unrelated UA.
                let tokens: Vec<&str> = agent_lower
                    .split(|c: char| c.is_whitespace() || c == '/')
                    .filter(|t| !t.is_empty())
                    .collect();
                self.agents
                    .iter()
                    .find(|(token, _)| tokens.contains(&token.as_str()))
                    .map(|(_, r)| r)
            })
            .unwrap_or(&self.wildcard);

        // Allow rules take precedence over disallow
        if rules.allow.iter().any(|prefix| path.starts_with(prefix)) {
            return true;
        }

        !rules.disallow.iter().any(|prefix| path.starts_with(prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let content = r#"
# comment line
User-agent: *
Disallow: /private/
Disallow: /admin/
Allow: /public/
        "#;

        let rules = RobotsRules::parse(content);

        assert!(rules.is_allowed("TestBot", "/public/page"));
        assert!(!rules.is_allowed("TestBot", "/private/page"));
        assert!(!rules.is_allowed("TestBot", "/admin/"));
        assert!(rules.is_allowed("TestBot", "/other/page"));
    }

    #[test]
    fn test_specific_user_agent_overrides_wildcard() {
        let content = r#"
User-agent: *
Disallow: /

User-agent: goodbot
Allow: /
        "#;

        let rules = RobotsRules::parse(content);

        assert!(!rules.is_allowed("BadBot", "/page"));
        assert!(rules.is_allowed("GoodBot/3.0", "/page"));
    }

    #[test]
    fn test_allow_overrides_disallow() {
        let content = r#"
User-agent: *
Disallow: /private/
Allow: /private/public/
        "#;

        let rules = RobotsRules::parse(content);

        assert!(!rules.is_allowed("Bot", "/private/secret"));
        assert!(rules.is_allowed("Bot", "/private/public/page"));
    }

    #[test]
    fn test_empty_permits_everything() {
        let rules = RobotsRules::parse("");
        assert!(rules.is_allowed("AnyBot", "/any/path"));

        let rules = RobotsRules::default();
        assert!(rules.is_allowed("AnyBot", "/"));
    }

    #[test]
    fn test_disallow_all() {
        let content = "User-agent: *\nDisallow: /\n";
        let rules = RobotsRules::parse(content);

        assert!(!rules.is_allowed("Bot", "/"));
        assert!(!rules.is_allowed("Bot", "/anything"));
    }

    #[test]
    fn test_agent_match_is_whole_token_only() {
        let content = "User-agent: a\nDisallow: /blocked/\n";
        let rules = RobotsRules::parse(content);

        assert!(!rules.is_allowed("a", "/blocked/x"));
        assert!(!rules.is_allowed("A/2.0", "/blocked/x"));
        // The letter appears in these UA strings but never as a product token
        assert!(rules.is_allowed("ExampleBot/1.0", "/blocked/x"));
        assert!(rules.is_allowed("Mozilla/5.0 compatible", "/blocked/x"));
    }

    #[test]
    fn test_multiple_agents_share_group() {
        let content = r#"
User-agent: alpha
User-agent: beta
Disallow: /blocked/
        "#;

        let rules = RobotsRules::parse(content);

        assert!(!rules.is_allowed("alpha", "/blocked/x"));
        assert!(!rules.is_allowed("beta", "/blocked/x"));
        assert!(rules.is_allowed("gamma", "/blocked/x"));
    }
}
