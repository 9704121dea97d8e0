use std::time::Duration;

/// How often and for how long to poll while waiting for an element condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementPoller {
    /// Check once and return immediately.
    NoWait,
    /// Poll up to the timeout, sleeping for the interval between polls.
    TimeoutWithInterval(Duration, Duration),
    /// Poll the given number of times, sleeping for the interval between polls.
    NumTriesWithInterval(u32, Duration),
    /// Poll up to the timeout, but at least the given number of times.
    TimeoutWithIntervalAndMinTries(Duration, Duration, u32),
}

impl Default for ElementPoller {
    fn default() -> Self {
        ElementPoller::TimeoutWithInterval(Duration::from_secs(20), Duration::from_millis(500))
    }
}

/// Per-session settings used by element queries and widget operations.
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    /// Default poller for `wait_until()` conditions.
    pub query_poller: ElementPoller,
    /// Implicit wait restored after sections that temporarily set it to zero.
    pub implicit_wait: Duration,
    /// How many times the HTML select refreshes itself while waiting for a
    /// changed element after a click.
    pub max_refresh_times: u32,
    /// Refresh the HTML select after clicking an option.
    pub force_refresh: bool,
    /// Pause before verifying a selection, giving the page time to react.
    pub wait_ready: Duration,
    /// Scroll items into view before clicking them.
    pub force_scroll: bool,
}

impl WebDriverConfig {
    pub fn new() -> Self {
        WebDriverConfig::default()
    }
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        WebDriverConfig {
            query_poller: ElementPoller::default(),
            implicit_wait: Duration::from_secs(0),
            max_refresh_times: crate::components::combobox::DEFAULT_MAX_REFRESH_TIMES,
            force_refresh: false,
            wait_ready: Duration::from_millis(200),
            force_scroll: true,
        }
    }
}
