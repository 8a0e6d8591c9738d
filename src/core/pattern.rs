//! URI template compilation.
//!
//! A template such as `/users/:id/posts/{post}` is turned into an anchored
//! regular expression plus the ordered list of parameter names. Two placeholder
//! spellings are recognised:
//!
//! * `:name` - a colon followed by one or more characters other than `/` or `(`.
//!   A bare `:` right before `/` or the end of the template stays literal.
//! * `{name}` - braces around an identifier whose first character is not a digit.
//!
//! Every placeholder matches one or more non-slash characters. The rest of the
//! template is matched literally, and the whole path must match with at most one
//! optional trailing `/`.
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Capture group substituted for every placeholder.
const PARAM_CAPTURE: &str = "([^/]+)";

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r":([^/(]+)|\{([^0-9}][^}]*)\}").expect("placeholder expression is valid")
});

/// Errors produced while compiling a template.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PatternError {
    /// The generated expression was rejected by the regex engine (size limits).
    #[error("Failed to compile URI template '{template}': {source}")]
    Regex {
        template: String,
        #[source]
        source: regex::Error,
    },
}

/// A compiled URI template.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    raw_template: String,
    matcher: Regex,
    param_names: Vec<String>,
}

impl RoutePattern {
    /// The template exactly as registered.
    pub fn raw_template(&self) -> &str {
        &self.raw_template
    }

    /// Source of the compiled matcher. This is the key the search index files
    /// the pattern under.
    pub fn search_term(&self) -> &str {
        self.matcher.as_str()
    }

    pub fn matcher(&self) -> &Regex {
        &self.matcher
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }

    /// Bind parameter values for a matching path, in declaration order.
    pub fn captures(&self, path: &str) -> Option<Params> {
        let caps = self.matcher.captures(path)?;
        let pairs = self
            .param_names
            .iter()
            .zip(caps.iter().skip(1))
            .filter_map(|(name, value)| value.map(|v| (name.clone(), v.as_str().to_string())))
            .collect();
        Some(Params(pairs))
    }
}

/// Compile a URI template into a [`RoutePattern`].
pub fn compile(template: &str) -> Result<RoutePattern, PatternError> {
    let mut source = String::with_capacity(template.len() + 16);
    let mut param_names = Vec::new();
    let mut last = 0;

    source.push('^');
    for caps in PLACEHOLDER.captures_iter(template) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(name) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };

        source.push_str(&regex::escape(&template[last..whole.start()]));
        source.push_str(PARAM_CAPTURE);
        param_names.push(name.as_str().to_string());
        last = whole.end();
    }
    source.push_str(&regex::escape(&template[last..]));

    // "^/" is the root route; any other trailing slash becomes the optional one
    if source.len() > 2 && source.ends_with('/') {
        source.pop();
    }
    source.push_str("/?$");

    let matcher = Regex::new(&source).map_err(|source| PatternError::Regex {
        template: template.to_string(),
        source,
    })?;

    Ok(RoutePattern {
        raw_template: template.to_string(),
        matcher,
        param_names,
    })
}

/// Path parameters bound for one request, kept in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    /// First value bound to `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Params(iter.into_iter().collect())
    }
}
