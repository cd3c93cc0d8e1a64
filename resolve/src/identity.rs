//! Assembly identity: `Name[, Version=V][, Culture=C][, PublicKeyToken=T]`.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::error::InputError;
use crate::version::AssemblyVersion;

/// A parsed `Name[, Version=V][, Culture=C][, PublicKeyToken=T]` reference string.
///
/// Equality is case-insensitive on `name`; two identities with the same name and
/// non-empty, differing tokens are never considered equivalent.
#[derive(Debug, Clone)]
pub struct AssemblyIdentity {
    pub name: String,
    pub version: Option<AssemblyVersion>,
    pub culture: Option<String>,
    pub public_key_token: Option<String>,
}

impl AssemblyIdentity {
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        IdentityParser::new(raw).parse()
    }

    /// True if `self` and `other` name the same assembly: case-insensitive name match,
    /// and tokens that are either equal or where one side is absent.
    pub fn compatible_with(&self, other: &AssemblyIdentity) -> bool {
        if !self.name.eq_ignore_ascii_case(&other.name) {
            return false;
        }
        match (&self.public_key_token, &other.public_key_token) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => true,
        }
    }

    pub fn name_key(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}

impl fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(v) = &self.version {
            write!(f, ", Version={v}")?;
        }
        if let Some(c) = &self.culture {
            write!(f, ", Culture={c}")?;
        }
        if let Some(t) = &self.public_key_token {
            write!(f, ", PublicKeyToken={t}")?;
        }
        Ok(())
    }
}

struct IdentityParser<'a> {
    raw: &'a str,
    chars: Peekable<Chars<'a>>,
}

impl<'a> IdentityParser<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            raw,
            chars: raw.chars().peekable(),
        }
    }

    fn parse(mut self) -> Result<AssemblyIdentity, InputError> {
        let name = self.take_segment();
        if name.is_empty() {
            return Err(InputError::MalformedIdentity(self.raw.to_string()));
        }

        let mut version = None;
        let mut culture = None;
        let mut public_key_token = None;

        while self.skip_comma() {
            let segment = self.take_segment();
            let Some((key, value)) = segment.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            match key {
                "Version" => version = AssemblyVersion::parse(value).ok(),
                "Culture" => culture = Some(value.to_string()),
                "PublicKeyToken" => {
                    public_key_token = if value.eq_ignore_ascii_case("null") {
                        None
                    } else {
                        Some(value.to_ascii_lowercase())
                    }
                }
                _ => {}
            }
        }

        Ok(AssemblyIdentity {
            name: name.trim().to_string(),
            version,
            culture,
            public_key_token,
        })
    }

    /// Consumes characters up to (not including) the next top-level comma.
    fn take_segment(&mut self) -> String {
        let mut out = String::new();
        while let Some(&c) = self.chars.peek() {
            if c == ',' {
                break;
            }
            out.push(c);
            self.chars.next();
        }
        out
    }

    fn skip_comma(&mut self) -> bool {
        match self.chars.peek() {
            Some(&',') => {
                self.chars.next();
                while matches!(self.chars.peek(), Some(&' ')) {
                    self.chars.next();
                }
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_identity() {
        let id = AssemblyIdentity::parse(
            "Newtonsoft.Json, Version=12.0.3, Culture=neutral, PublicKeyToken=30ad4fe6b2a6aeed",
        )
        .unwrap();
        assert_eq!(id.name, "Newtonsoft.Json");
        assert_eq!(id.culture.as_deref(), Some("neutral"));
        assert_eq!(id.public_key_token.as_deref(), Some("30ad4fe6b2a6aeed"));
    }

    #[test]
    fn parses_bare_name() {
        let id = AssemblyIdentity::parse("System.Core").unwrap();
        assert_eq!(id.name, "System.Core");
        assert!(id.version.is_none());
    }

    #[test]
    fn null_token_is_absent() {
        let id = AssemblyIdentity::parse("Foo, PublicKeyToken=null").unwrap();
        assert!(id.public_key_token.is_none());
    }

    #[test]
    fn name_match_is_case_insensitive() {
        let a = AssemblyIdentity::parse("Foo").unwrap();
        let b = AssemblyIdentity::parse("FOO").unwrap();
        assert!(a.compatible_with(&b));
    }

    #[test]
    fn mismatched_tokens_are_incompatible() {
        let a = AssemblyIdentity::parse("Foo, PublicKeyToken=aaaaaaaaaaaaaaaa").unwrap();
        let b = AssemblyIdentity::parse("Foo, PublicKeyToken=bbbbbbbbbbbbbbbb").unwrap();
        assert!(!a.compatible_with(&b));
    }
}
