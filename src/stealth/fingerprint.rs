//! Browser fingerprint generation
//!
//! Generates realistic, randomized Chrome header sets. The Chrome major
//! version appears in both `User-Agent` and `Sec-Ch-Ua` and always matches.

use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Error, Result};
use crate::headers::HeaderSet;

/// Lowest Chrome major version handed out
pub const MIN_CHROME_VERSION: u32 = 122;

/// Highest Chrome major version handed out (inclusive)
pub const MAX_CHROME_VERSION: u32 = 129;

const DEFAULT_OPERATING_SYSTEM: (&str, Platform) =
    ("Windows NT 10.0; Win64; x64", Platform::Windows);

/// Operating system tokens (Windows builds, Apple silicon macOS builds)
const OPERATING_SYSTEMS: &[(&str, Platform)] = &[
    DEFAULT_OPERATING_SYSTEM,
    ("Windows NT 11.0; Win64; x64", Platform::Windows),
    ("Macintosh; Apple M1 Mac OS X 14_0", Platform::MacOS),
    ("Macintosh; Apple M1 Mac OS X 14_1", Platform::MacOS),
    ("Macintosh; Apple M2 Mac OS X 14_2", Platform::MacOS),
    ("Macintosh; Apple M2 Mac OS X 14_3", Platform::MacOS),
    ("Macintosh; Apple M3 Mac OS X 14_4", Platform::MacOS),
];

const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Accept-Language values seen from real browsers
const ACCEPT_LANGUAGES: &[&str] = &[
    DEFAULT_ACCEPT_LANGUAGE,
    "en-GB,en;q=0.8",
    "zh-CN,zh;q=0.9,en;q=0.8",
    "fr-FR,fr;q=0.9,en-US;q=0.8,en;q=0.7",
    "zh-CN,zh;q=0.9,en;q=0.8,en-GB;q=0.7,en-US;q=0.6",
];

const DEFAULT_SEC_FETCH: SecFetch = SecFetch::new("same-origin", "cors", "empty");

/// Sec-Fetch (site, mode, dest) combinations that real browsers emit
const SEC_FETCH_CONTEXTS: &[SecFetch] = &[
    DEFAULT_SEC_FETCH,
    SecFetch::new("same-site", "cors", "empty"),
    SecFetch::new("cross-site", "cors", "empty"),
    SecFetch::new("same-origin", "no-cors", "script"),
    SecFetch::new("same-origin", "navigate", "document"),
];

const SEC_FETCH_PROBABILITY: f64 = 0.5;
const PLATFORM_HINT_PROBABILITY: f64 = 0.3;

const ACCEPT: &str = "application/json, text/plain, */*";
const CONTENT_TYPE: &str = "application/json";

/// Operating system family named in a User-Agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOS,
    Windows,
}

impl Platform {
    /// Value of the `Sec-Ch-Ua-Platform` client hint (quoted)
    pub fn client_hint(&self) -> &'static str {
        match self {
            Platform::MacOS => "\"macOS\"",
            Platform::Windows => "\"Windows\"",
        }
    }

    /// Guess the platform from a User-Agent string
    pub fn detect(user_agent: &str) -> Option<Self> {
        if user_agent.contains("Windows") {
            Some(Platform::Windows)
        } else if user_agent.contains("Macintosh") || user_agent.contains("Mac OS X") {
            Some(Platform::MacOS)
        } else {
            None
        }
    }
}

/// A correlated Sec-Fetch header triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecFetch {
    pub site: &'static str,
    pub mode: &'static str,
    pub dest: &'static str,
}

impl SecFetch {
    const fn new(site: &'static str, mode: &'static str, dest: &'static str) -> Self {
        Self { site, mode, dest }
    }

    /// All triples the generator can pick from
    pub fn catalog() -> &'static [SecFetch] {
        SEC_FETCH_CONTEXTS
    }
}

/// Browser fingerprint: the identifying header set of one client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    chrome_version: u32,
    platform: Option<Platform>,
    headers: HeaderSet,
}

impl Fingerprint {
    /// Generate a random consistent fingerprint
    pub fn random() -> Self {
        FingerprintGenerator::thread_local().random_fingerprint()
    }

    /// Build a fingerprint around a fixed user agent.
    ///
    /// Fails with [`Error::InvalidUserAgent`] when the string has no
    /// `Chrome/<major>` token.
    pub fn from_user_agent(user_agent: &str) -> Result<Self> {
        FingerprintGenerator::thread_local().fingerprint(Some(user_agent))
    }

    /// Chrome major version shared by `User-Agent` and `Sec-Ch-Ua`
    pub fn chrome_version(&self) -> u32 {
        self.chrome_version
    }

    /// Platform named by the user agent, if recognisable
    pub fn platform(&self) -> Option<Platform> {
        self.platform
    }

    pub fn user_agent(&self) -> &str {
        self.headers.get("User-Agent").unwrap_or_default()
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn into_headers(self) -> HeaderSet {
        self.headers
    }
}

/// `Sec-Ch-Ua` brand list for a Chrome major version
pub fn sec_ch_ua(chrome_version: u32) -> String {
    format!(
        r#""Google Chrome";v="{v}", "Not=A?Brand";v="8", "Chromium";v="{v}""#,
        v = chrome_version
    )
}

/// Extract the major version from the first `Chrome/<digits>` token
pub fn chrome_version_from_user_agent(user_agent: &str) -> Option<u32> {
    let (_, rest) = user_agent.split_once("Chrome/")?;
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

/// Fingerprint generator over an explicit randomness source.
///
/// Pass a seeded `StdRng` for reproducible output; the free functions in this
/// module use the thread-local RNG.
#[derive(Debug, Clone)]
pub struct FingerprintGenerator<R = ThreadRng> {
    rng: R,
}

impl FingerprintGenerator<ThreadRng> {
    /// Generator backed by the thread-local RNG
    pub fn thread_local() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl<R: Rng> FingerprintGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Uniform Chrome major version in `MIN_CHROME_VERSION..=MAX_CHROME_VERSION`
    pub fn chrome_version(&mut self) -> u32 {
        self.rng.gen_range(MIN_CHROME_VERSION..=MAX_CHROME_VERSION)
    }

    /// Random user agent for the given Chrome major version.
    ///
    /// macOS builds carry a random build number (`<major>.0.<0-99>.0`),
    /// Windows builds use `<major>.0.0.0`.
    pub fn user_agent(&mut self, chrome_version: u32) -> String {
        let (system, platform) = self.pick(OPERATING_SYSTEMS, DEFAULT_OPERATING_SYSTEM);
        let full_version = match platform {
            Platform::Windows => format!("{}.0.0.0", chrome_version),
            Platform::MacOS => {
                let build = self.rng.gen_range(0..100u32);
                format!("{}.0.{}.0", chrome_version, build)
            }
        };
        format!(
            "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
            system, full_version
        )
    }

    pub fn accept_language(&mut self) -> &'static str {
        self.pick(ACCEPT_LANGUAGES, DEFAULT_ACCEPT_LANGUAGE)
    }

    pub fn sec_fetch(&mut self) -> SecFetch {
        self.pick(SEC_FETCH_CONTEXTS, DEFAULT_SEC_FETCH)
    }

    /// Fresh fingerprint with version, user agent and language all randomized
    pub fn random_fingerprint(&mut self) -> Fingerprint {
        let chrome_version = self.chrome_version();
        let user_agent = self.user_agent(chrome_version);
        self.assemble(chrome_version, user_agent)
    }

    /// Build a fingerprint, around `user_agent` if one is given
    pub fn fingerprint(&mut self, user_agent: Option<&str>) -> Result<Fingerprint> {
        match user_agent {
            Some(ua) => {
                let chrome_version = chrome_version_from_user_agent(ua)
                    .ok_or_else(|| Error::InvalidUserAgent(ua.to_string()))?;
                Ok(self.assemble(chrome_version, ua.to_string()))
            }
            None => Ok(self.random_fingerprint()),
        }
    }

    fn assemble(&mut self, chrome_version: u32, user_agent: String) -> Fingerprint {
        let platform = Platform::detect(&user_agent);
        let accept_language = self.accept_language();

        let mut headers = HeaderSet::new();
        headers.insert("Accept", ACCEPT);
        headers.insert("Content-Type", CONTENT_TYPE);
        headers.insert("Sec-Ch-Ua", sec_ch_ua(chrome_version));
        headers.insert("Sec-Ch-Ua-Mobile", "?0");
        headers.insert("User-Agent", user_agent);
        headers.insert("Accept-Language", accept_language);

        if self.rng.gen_bool(SEC_FETCH_PROBABILITY) {
            let fetch = self.sec_fetch();
            headers.insert("Sec-Fetch-Site", fetch.site);
            headers.insert("Sec-Fetch-Mode", fetch.mode);
            headers.insert("Sec-Fetch-Dest", fetch.dest);
        }

        if self.rng.gen_bool(PLATFORM_HINT_PROBABILITY) {
            // Taken from the user agent instead of a uniform Windows/macOS
            // draw, so the hint cannot contradict it. Uniform only when the
            // user agent names neither.
            let hint = match platform {
                Some(p) => p,
                None => self.pick(&[Platform::Windows, Platform::MacOS], Platform::Windows),
            };
            headers.insert("Sec-Ch-Ua-Platform", hint.client_hint());
        }

        Fingerprint {
            chrome_version,
            platform,
            headers,
        }
    }

    /// Uniform choice from `items`, `fallback` if it is empty
    fn pick<T: Copy>(&mut self, items: &[T], fallback: T) -> T {
        items.choose(&mut self.rng).copied().unwrap_or(fallback)
    }
}

/// Random Chrome major version
pub fn random_chrome_version() -> u32 {
    FingerprintGenerator::thread_local().chrome_version()
}

/// Random realistic user agent for a Chrome major version
pub fn random_user_agent(chrome_version: u32) -> String {
    FingerprintGenerator::thread_local().user_agent(chrome_version)
}

/// Random Accept-Language value
pub fn random_accept_language() -> &'static str {
    FingerprintGenerator::thread_local().accept_language()
}

/// Random browser header set
pub fn random_headers() -> HeaderSet {
    Fingerprint::random().into_headers()
}
