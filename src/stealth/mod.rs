//! Stealth Layer
//!
//! Browser fingerprint generation: randomized, self-consistent Chrome
//! header sets.

pub mod fingerprint;

pub use fingerprint::{
    chrome_version_from_user_agent, random_accept_language, random_chrome_version,
    random_headers, random_user_agent, sec_ch_ua, Fingerprint, FingerprintGenerator, Platform,
    SecFetch, MAX_CHROME_VERSION, MIN_CHROME_VERSION,
};
