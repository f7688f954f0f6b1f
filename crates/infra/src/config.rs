use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    /// Length of the `status_authkey` capability tokens minted for
    /// attendees
    pub status_authkey_len: usize,
    /// Upper bound for the page size of event searches. This is used to
    /// avoid having sync clients ask for thousands of events in one go,
    /// each of which may drag a pile of recurrence exceptions along.
    pub search_max_page_size: usize,
}

fn env_usize(name: &str, default: usize) -> usize {
    match std::env::var(name) {
        Ok(value) => match value.parse::<usize>() {
            Ok(parsed) if parsed > 0 => parsed,
            _ => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    name, value, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            status_authkey_len: env_usize("STATUS_AUTHKEY_LENGTH", 40),
            search_max_page_size: env_usize("SEARCH_MAX_PAGE_SIZE", 500),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
