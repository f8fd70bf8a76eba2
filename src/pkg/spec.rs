//! Parsing of human-written dependency strings.
//!
//! A spec string must match `(URL|OWNER/REPO)[:branch][@version][ at path]`
//! where `URL` is an `http(s)` git URL whose final segment names the library
//! and `OWNER/REPO` is shorthand for a GitHub repository. Parsing a batch is
//! all-or-nothing; installation failures are handled per package later.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::pkg::PackageError;

static URL_SCHEMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<url>https?://\S+/(?P<name>[\w.\-]+))(:(?P<branch>[\w\-]+))?(@(?P<version>[\w.\-]+))?( at (?P<path>\S+))?$",
    )
    .unwrap()
});

static GITHUB_SCHEMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<github>[\w\-]+/(?P<name>[\w\-]+))(:(?P<branch>[\w\-]+))?(@(?P<version>[\w.\-]+))?( at (?P<path>\S+))?$",
    )
    .unwrap()
});

/// A parsed dependency, constructed fresh per spec string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Identifier extracted from the source URL or shorthand.
    pub unqualified_name: String,

    /// Resolved fetch URL.
    pub url: String,

    /// Tracked branch; `None` means the upstream default.
    pub branch: Option<String>,

    /// Tag to check out after fetch; `None` means the tip of the branch.
    pub version: Option<String>,

    /// Project-relative location the package is linked into.
    pub path: String,

    /// Unique manifest key: the unqualified name qualified by branch and
    /// version, so the same upstream library can be installed twice at
    /// different refs side by side.
    pub name: String,
}

impl Package {
    /// Build a package, deriving `name` and defaulting `path`.
    pub fn new(
        unqualified_name: impl Into<String>,
        url: impl Into<String>,
        branch: Option<String>,
        version: Option<String>,
        path: Option<String>,
    ) -> Self {
        let unqualified_name = unqualified_name.into();
        let mut name = unqualified_name.clone();
        if let Some(branch) = &branch {
            name.push('-');
            name.push_str(branch);
        }
        if let Some(version) = &version {
            name.push('-');
            name.push_str(version);
        }
        let path = path.unwrap_or_else(|| format!("lib/{}", unqualified_name));

        Package {
            unqualified_name,
            url: url.into(),
            branch,
            version,
            path,
            name,
        }
    }

    /// The fetch origin in spec notation, for error messages.
    pub fn origin(&self) -> String {
        let mut origin = self.url.clone();
        if let Some(branch) = &self.branch {
            origin.push(':');
            origin.push_str(branch);
        }
        if let Some(version) = &self.version {
            origin.push('@');
            origin.push_str(version);
        }
        origin
    }
}

/// Parse one spec string.
pub fn parse(spec: &str) -> Result<Package, PackageError> {
    if let Some(caps) = URL_SCHEMA.captures(spec) {
        let url = caps["url"].to_string();
        if Url::parse(&url).is_err() {
            return Err(PackageError::MalformedSpec(spec.to_string()));
        }
        return Ok(build(&caps, url));
    }
    if let Some(caps) = GITHUB_SCHEMA.captures(spec) {
        let url = format!("https://github.com/{}", &caps["github"]);
        return Ok(build(&caps, url));
    }
    Err(PackageError::MalformedSpec(spec.to_string()))
}

/// Parse a batch of spec strings, failing on the first malformed one.
pub fn parse_many(specs: &[String]) -> Result<Vec<Package>, PackageError> {
    specs.iter().map(|s| parse(s)).collect()
}

fn build(caps: &regex::Captures<'_>, url: String) -> Package {
    Package::new(
        &caps["name"],
        url,
        caps.name("branch").map(|m| m.as_str().to_string()),
        caps.name("version").map(|m| m.as_str().to_string()),
        caps.name("path").map(|m| m.as_str().to_string()),
    )
}
