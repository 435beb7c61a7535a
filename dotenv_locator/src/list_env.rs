//! Environment provider that reads selected keys as lists.
//!
//! Wraps `figment::providers::Env`. Keys registered with
//! [`ListEnv::comma_list`] are split on commas and keys registered with
//! [`ListEnv::path_list`] are split with [`std::env::split_paths`], so
//! `DOTENV_SEARCH_DIRS` reads like `PATH`. Both always produce arrays, even
//! for a single item, and drop empty items. Every other key is parsed as a
//! scalar.

use std::ffi::OsStr;

use figment::providers::Env;
use figment::{
    Profile, Provider,
    error::Error,
    util::nest,
    value::{Dict, Map, Value},
};
use uncased::UncasedStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListStyle {
    Comma,
    Paths,
}

/// Environment provider with list-valued keys.
///
/// # Examples
///
/// ```rust,no_run
/// use dotenv_locator::ListEnv;
/// use figment::Figment;
///
/// #[derive(serde::Deserialize)]
/// struct Search {
///     dirs: Vec<String>,
/// }
///
/// let search: Search = Figment::from(ListEnv::prefixed("APP_").path_list("dirs"))
///     .extract()
///     .expect("APP_DIRS is set");
/// # let _ = search.dirs;
/// ```
#[derive(Clone)]
pub struct ListEnv {
    inner: Env,
    lists: Vec<(String, ListStyle)>,
}

impl ListEnv {
    /// Create a provider reading variables that start with `prefix`; the
    /// prefix is stripped and keys are lowercased.
    #[must_use]
    pub fn prefixed(prefix: &str) -> Self {
        Self {
            inner: Env::prefixed(prefix),
            lists: Vec::new(),
        }
    }

    /// Treat `key` as a comma-separated list.
    #[must_use]
    pub fn comma_list(mut self, key: &str) -> Self {
        self.lists.push((key.to_owned(), ListStyle::Comma));
        self
    }

    /// Treat `key` as a platform path list.
    #[must_use]
    pub fn path_list(mut self, key: &str) -> Self {
        self.lists.push((key.to_owned(), ListStyle::Paths));
        self
    }

    fn list_style(&self, key: &UncasedStr) -> Option<ListStyle> {
        self.lists
            .iter()
            .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
            .map(|(_, style)| *style)
    }

    fn parse_list(raw: &str, style: ListStyle) -> Value {
        let items: Vec<Value> = match style {
            ListStyle::Comma => raw
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| Value::from(item.to_owned()))
                .collect(),
            ListStyle::Paths => std::env::split_paths(OsStr::new(raw))
                .filter(|path| !path.as_os_str().is_empty())
                .map(|path| Value::from(path.to_string_lossy().into_owned()))
                .collect(),
        };
        items.into()
    }

    fn parse_scalar(raw: &str) -> Value {
        let trimmed = raw.trim();
        trimmed
            .parse()
            .unwrap_or_else(|_| Value::from(trimmed.to_owned()))
    }
}

impl Provider for ListEnv {
    fn metadata(&self) -> figment::Metadata {
        self.inner.metadata()
    }

    fn profile(&self) -> Option<Profile> {
        Some(self.inner.profile.clone())
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();
        for (k, v) in self.inner.iter() {
            let value = match self.list_style(&k) {
                Some(style) => Self::parse_list(&v, style),
                None => Self::parse_scalar(&v),
            };
            let Some(nested) = nest(k.as_str(), value).into_dict() else {
                return Err(Error::from(format!(
                    "environment key `{k}` produced a non-object value"
                )));
            };
            dict.extend(nested);
        }
        Ok(self.inner.profile.collect(dict))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{Result, anyhow, ensure};
    use figment::Figment;
    use rstest::rstest;
    use serde::Deserialize;
    use serial_test::serial;
    use test_helpers::figment::{figment_error, with_jail};

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Lists {
        #[serde(default)]
        names: Vec<String>,
        #[serde(default)]
        dirs: Vec<String>,
        #[serde(default)]
        flag: bool,
    }

    fn extract(j: &mut figment::Jail, vars: &[(&str, &str)]) -> figment::error::Result<Lists> {
        for (key, value) in vars {
            j.set_env(key, value);
        }
        Figment::from(
            ListEnv::prefixed("LISTENV_")
                .comma_list("names")
                .path_list("dirs"),
        )
        .extract()
        .map_err(figment_error)
    }

    #[rstest]
    #[case("single", &["single"])]
    #[case("a,b,c", &["a", "b", "c"])]
    #[case(" a , b ", &["a", "b"])]
    #[case("a,,b,", &["a", "b"])]
    #[case("", &[])]
    #[serial]
    fn comma_lists_always_become_arrays(
        #[case] raw: &str,
        #[case] expected: &[&str],
    ) -> Result<()> {
        let lists = with_jail(|j| extract(j, &[("LISTENV_NAMES", raw)]))?;
        ensure!(
            lists.names == expected,
            "expected {expected:?}, got {:?}",
            lists.names
        );
        Ok(())
    }

    #[test]
    #[serial]
    fn path_lists_use_platform_separator() -> Result<()> {
        let joined = std::env::join_paths(["first", "second dir"])
            .map_err(|err| anyhow!(err))?
            .into_string()
            .map_err(|_| anyhow!("joined paths are not UTF-8"))?;
        let lists = with_jail(|j| extract(j, &[("LISTENV_DIRS", joined.as_str())]))?;
        ensure!(
            lists.dirs == ["first", "second dir"],
            "unexpected dirs {:?}",
            lists.dirs
        );
        Ok(())
    }

    #[test]
    #[serial]
    fn unlisted_keys_parse_as_scalars() -> Result<()> {
        let lists = with_jail(|j| extract(j, &[("LISTENV_FLAG", "true")]))?;
        ensure!(lists.flag, "expected flag to parse as a boolean");
        ensure!(lists.names.is_empty(), "expected no names");
        Ok(())
    }
}
