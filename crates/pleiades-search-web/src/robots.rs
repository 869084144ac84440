//! robots.txt rules for a single site.

use std::{fmt, time::Duration};

use texting_robots::Robot;
use tracing::{debug, warn};

enum Rules {
    AllowAll,
    DisallowAll,
    Parsed(Box<Robot>),
}

/// What a site's robots.txt lets this client fetch, and how often.
pub struct RobotsPolicy {
    rules: Rules,
    crawl_delay: Option<Duration>,
}

impl RobotsPolicy {
    #[must_use]
    pub const fn allow_all() -> Self {
        Self {
            rules: Rules::AllowAll,
            crawl_delay: None,
        }
    }

    /// Build the policy from a robots.txt response.
    ///
    /// A 2xx body is parsed for `agent`. A 4xx status means there are no
    /// rules. Any other status disallows everything. An unparsable body is
    /// treated as having no rules.
    #[must_use]
    pub fn from_response(agent: &str, status: u16, body: &[u8]) -> Self {
        match status {
            200..=299 => match Robot::new(agent, body) {
                Ok(robot) => {
                    let crawl_delay = robot
                        .delay
                        .and_then(|seconds| Duration::try_from_secs_f32(seconds).ok());
                    debug!(agent, ?crawl_delay, "Parsed robots.txt");
                    Self {
                        rules: Rules::Parsed(Box::new(robot)),
                        crawl_delay,
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Unreadable robots.txt, assuming no rules");
                    Self::allow_all()
                }
            },
            400..=499 => Self::allow_all(),
            _ => {
                warn!(status, "robots.txt unavailable, refusing to crawl");
                Self {
                    rules: Rules::DisallowAll,
                    crawl_delay: None,
                }
            }
        }
    }

    #[must_use]
    pub fn allowed(&self, uri: &str) -> bool {
        match &self.rules {
            Rules::AllowAll => true,
            Rules::DisallowAll => false,
            Rules::Parsed(robot) => robot.allowed(uri),
        }
    }

    #[must_use]
    pub const fn crawl_delay(&self) -> Option<Duration> {
        self.crawl_delay
    }
}

impl fmt::Debug for RobotsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules = match self.rules {
            Rules::AllowAll => "allow all",
            Rules::DisallowAll => "disallow all",
            Rules::Parsed(_) => "parsed",
        };
        f.debug_struct("RobotsPolicy")
            .field("rules", &rules)
            .field("crawl_delay", &self.crawl_delay)
            .finish()
    }
}

/// The product token robots.txt groups are matched against
/// (`CosmicBurritoBot/7.3 (+http://...)` -> `CosmicBurritoBot`).
#[must_use]
pub fn robots_agent(user_agent: &str) -> &str {
    user_agent
        .split(['/', ' '])
        .next()
        .filter(|token| !token.is_empty())
        .unwrap_or(user_agent)
}
