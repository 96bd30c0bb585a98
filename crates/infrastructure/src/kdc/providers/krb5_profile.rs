//! MIT krb5 profile (`krb5.conf`) reader and the `mit` realm provider.
//!
//! ```text
//! [libdefaults]
//!     dns_lookup_kdc = false
//! [realms]
//!     EXAMPLE.COM = {
//!         kdc = kdc1.example.com:88
//!         admin_server = kdc1.example.com:749
//!     }
//! ```
//!
//! Supports comments, nested subsections, quoted values, the final-marker
//! `*` (accepted and ignored) and `include` / `includedir` directives.

use async_trait::async_trait;
use kdc_proxy_application::ports::RealmProvider;
use kdc_proxy_domain::{DomainError, ServerSpec, ServiceKind};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PROVIDER_NAME: &str = "mit";
const DEFAULT_KRB5_CONFIG: &str = "/etc/krb5.conf";
const MAX_INCLUDE_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValue {
    String(String),
    Section(Vec<(String, ProfileValue)>),
}

impl ProfileValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ProfileValue::String(s) => Some(s),
            ProfileValue::Section(_) => None,
        }
    }

    pub fn as_section(&self) -> Option<&[(String, ProfileValue)]> {
        match self {
            ProfileValue::String(_) => None,
            ProfileValue::Section(relations) => Some(relations),
        }
    }
}

type Relations = Vec<(String, ProfileValue)>;

/// A parsed profile. Sections repeated across files are kept separately and
/// read in file order.
#[derive(Debug, Default)]
pub struct Krb5Profile {
    sections: Vec<(String, Relations)>,
}

fn profile_error(reason: impl Into<String>) -> DomainError {
    DomainError::ProviderLookup {
        provider: PROVIDER_NAME.to_string(),
        reason: reason.into(),
    }
}

impl Krb5Profile {
    pub fn load(path: &Path) -> Result<Self, DomainError> {
        let mut profile = Self::default();
        profile.load_file(path, 0)?;
        Ok(profile)
    }

    /// Parses profile text. Include directives resolve relative to the
    /// working directory.
    pub fn parse(contents: &str) -> Result<Self, DomainError> {
        let mut profile = Self::default();
        profile.parse_into(contents, "<inline>", 0)?;
        Ok(profile)
    }

    /// All relations of every section called `name`, in file order.
    pub fn section<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a (String, ProfileValue)> {
        self.sections
            .iter()
            .filter(move |(section, _)| section == name)
            .flat_map(|(_, relations)| relations.iter())
    }

    pub fn get_string<'a>(&'a self, section: &'a str, key: &str) -> Option<&'a str> {
        self.section(section)
            .find(|(name, _)| name == key)
            .and_then(|(_, value)| value.as_str())
    }

    pub fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        self.get_string(section, key).and_then(parse_bool)
    }

    fn load_file(&mut self, path: &Path, depth: usize) -> Result<(), DomainError> {
        if depth > MAX_INCLUDE_DEPTH {
            return Err(profile_error(format!(
                "include depth exceeded at {}",
                path.display()
            )));
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| profile_error(format!("failed to read {}: {}", path.display(), e)))?;
        self.parse_into(&contents, &path.display().to_string(), depth)
    }

    fn include_dir(&mut self, dir: &Path, depth: usize) -> Result<(), DomainError> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| profile_error(format!("failed to read {}: {}", dir.display(), e)))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(is_includable_name)
            })
            .collect();
        files.sort();

        for file in files {
            self.load_file(&file, depth + 1)?;
        }
        Ok(())
    }

    fn parse_into(&mut self, contents: &str, origin: &str, depth: usize) -> Result<(), DomainError> {
        let mut current: Option<usize> = None;
        let mut open: Vec<(String, Relations)> = Vec::new();

        for (index, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            let at = |msg: &str| profile_error(format!("{}:{}: {}", origin, index + 1, msg));

            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if open.is_empty() {
                if let Some(path) = line.strip_prefix("includedir") {
                    if path.starts_with(char::is_whitespace) {
                        self.include_dir(Path::new(path.trim()), depth)?;
                        current = None;
                        continue;
                    }
                }
                if let Some(path) = line.strip_prefix("include") {
                    if path.starts_with(char::is_whitespace) {
                        self.load_file(Path::new(path.trim()), depth + 1)?;
                        current = None;
                        continue;
                    }
                }
                if let Some(rest) = line.strip_prefix('[') {
                    let (name, _) = rest
                        .split_once(']')
                        .ok_or_else(|| at("unterminated section header"))?;
                    self.sections.push((name.trim().to_string(), Vec::new()));
                    current = Some(self.sections.len() - 1);
                    continue;
                }
            }

            if line.starts_with('}') {
                let (name, relations) = open.pop().ok_or_else(|| at("unmatched '}'"))?;
                let target = match open.last_mut() {
                    Some((_, parent)) => parent,
                    None => match current {
                        Some(idx) => &mut self.sections[idx].1,
                        None => return Err(at("subsection outside any section")),
                    },
                };
                target.push((name, ProfileValue::Section(relations)));
                continue;
            }

            let (name, value) = line
                .split_once('=')
                .ok_or_else(|| at("expected 'name = value'"))?;
            let name = name.trim().trim_end_matches('*').trim_end().to_string();
            let value = value.trim();
            if name.is_empty() {
                return Err(at("missing relation name"));
            }

            if value == "{" {
                open.push((name, Vec::new()));
                continue;
            }

            let relation = (name, ProfileValue::String(unquote(value)));
            match open.last_mut() {
                Some((_, relations)) => relations.push(relation),
                None => match current {
                    Some(idx) => self.sections[idx].1.push(relation),
                    None => return Err(at("relation outside any section")),
                },
            }
        }

        if let Some((name, _)) = open.last() {
            return Err(profile_error(format!(
                "{}: subsection '{}' is never closed",
                origin, name
            )));
        }
        Ok(())
    }
}

/// `includedir` only picks up `*.conf` files and names made of
/// alphanumerics, dashes and underscores.
fn is_includable_name(name: &str) -> bool {
    name.ends_with(".conf")
        || (!name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'))
}

fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    else {
        return value.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "t" | "1" | "on" => Some(true),
        "n" | "no" | "false" | "nil" | "0" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct MitRealm {
    kdc: Vec<ServerSpec>,
    kpasswd: Vec<ServerSpec>,
}

/// Realms from the system Kerberos configuration.
pub struct MitConfigProvider {
    realms: HashMap<String, MitRealm>,
    use_dns: bool,
}

impl MitConfigProvider {
    /// Picks the configured path, then the first entry of `$KRB5_CONFIG`,
    /// then /etc/krb5.conf.
    pub fn config_path(configured: Option<&str>) -> PathBuf {
        if let Some(path) = configured {
            return PathBuf::from(path);
        }
        std::env::var("KRB5_CONFIG")
            .ok()
            .and_then(|v| v.split(':').find(|p| !p.is_empty()).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_KRB5_CONFIG))
    }

    pub fn load(path: &Path) -> Result<Self, DomainError> {
        let profile = Krb5Profile::load(path)?;
        let provider = Self::from_profile(&profile);
        debug!(path = %path.display(), realms = provider.realms.len(), use_dns = provider.use_dns, "Loaded krb5 profile");
        Ok(provider)
    }

    pub fn from_profile(profile: &Krb5Profile) -> Self {
        let use_dns = profile
            .get_bool("libdefaults", "dns_lookup_kdc")
            .or_else(|| profile.get_bool("libdefaults", "dns_fallback"))
            .unwrap_or(true);

        let mut realms: HashMap<String, MitRealm> = HashMap::new();
        for (realm, value) in profile.section("realms") {
            let Some(relations) = value.as_section() else {
                continue;
            };
            let entry = realms.entry(realm.clone()).or_default();
            let mut admin_servers = Vec::new();

            for (key, value) in relations {
                let Some(raw) = value.as_str() else {
                    continue;
                };
                let target = match key.as_str() {
                    "kdc" => &mut entry.kdc,
                    "kpasswd_server" => &mut entry.kpasswd,
                    "admin_server" => &mut admin_servers,
                    _ => continue,
                };
                match raw.parse::<ServerSpec>() {
                    Ok(spec) => target.push(spec),
                    Err(e) => {
                        warn!(realm = %realm, key = %key, value = raw, error = %e, "Skipping krb5.conf server entry");
                    }
                }
            }

            // The admin server's port belongs to kadmin, not kpasswd.
            entry
                .kpasswd
                .extend(admin_servers.into_iter().map(|spec| ServerSpec { port: None, ..spec }));
        }

        Self { realms, use_dns }
    }

    pub fn realm_count(&self) -> usize {
        self.realms.len()
    }
}

#[async_trait]
impl RealmProvider for MitConfigProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn lookup(
        &self,
        realm: &str,
        service: ServiceKind,
    ) -> Result<Vec<ServerSpec>, DomainError> {
        Ok(self
            .realms
            .get(realm)
            .map(|entry| match service {
                ServiceKind::Kdc => entry.kdc.clone(),
                ServiceKind::Kpasswd => entry.kpasswd.clone(),
            })
            .unwrap_or_default())
    }

    fn dns_preference(&self) -> Option<bool> {
        Some(self.use_dns)
    }
}
