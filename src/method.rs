//! HTTP method as a typed enum.
//!
//! Covers RFC 9110 standard methods, WebDAV extensions (RFC 4918 / 4791 /
//! 3253 / 5323), and `PURGE` used by nginx and Varnish for cache invalidation.
//!
//! Routing tables key handler specs by method, stored in the lower-case form
//! returned by [`Method::as_str`]. Parsing is case-insensitive, so `"GET"`,
//! `"get"` and `"Get"` all name the same method. An unknown method string is
//! rejected with [`Error::InvalidArgument`] before it ever reaches a handler.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A known HTTP method.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Method {
    // RFC 9110
    Connect,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
    // WebDAV RFC 4918
    Copy,
    Lock,
    Mkcol,
    Move,
    Propfind,
    Proppatch,
    Unlock,
    // WebDAV extensions
    Mkcalendar, // RFC 4791, CalDAV
    Report,     // RFC 3253
    Search,     // RFC 5323
    // Cache invalidation
    Purge, // nginx / Varnish
}

impl Method {
    /// Returns the lower-case storage form (e.g. `"get"`), the form under
    /// which handler specs are keyed in a routing table.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect    => "connect",
            Self::Copy       => "copy",
            Self::Delete     => "delete",
            Self::Get        => "get",
            Self::Head       => "head",
            Self::Lock       => "lock",
            Self::Mkcalendar => "mkcalendar",
            Self::Mkcol      => "mkcol",
            Self::Move       => "move",
            Self::Options    => "options",
            Self::Patch      => "patch",
            Self::Post       => "post",
            Self::Propfind   => "propfind",
            Self::Proppatch  => "proppatch",
            Self::Purge      => "purge",
            Self::Put        => "put",
            Self::Report     => "report",
            Self::Search     => "search",
            Self::Trace      => "trace",
            Self::Unlock     => "unlock",
        }
    }

    /// Uppercase wire form for log lines (`"GET"`).
    pub fn upper(self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

/// Parses a method string case-insensitively.
impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "connect"    => Ok(Self::Connect),
            "copy"       => Ok(Self::Copy),
            "delete"     => Ok(Self::Delete),
            "get"        => Ok(Self::Get),
            "head"       => Ok(Self::Head),
            "lock"       => Ok(Self::Lock),
            "mkcalendar" => Ok(Self::Mkcalendar),
            "mkcol"      => Ok(Self::Mkcol),
            "move"       => Ok(Self::Move),
            "options"    => Ok(Self::Options),
            "patch"      => Ok(Self::Patch),
            "post"       => Ok(Self::Post),
            "propfind"   => Ok(Self::Propfind),
            "proppatch"  => Ok(Self::Proppatch),
            "purge"      => Ok(Self::Purge),
            "put"        => Ok(Self::Put),
            "report"     => Ok(Self::Report),
            "search"     => Ok(Self::Search),
            "trace"      => Ok(Self::Trace),
            "unlock"     => Ok(Self::Unlock),
            _            => Err(Error::InvalidArgument(format!("unknown HTTP method: {s}"))),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("dElEtE".parse::<Method>().unwrap(), Method::Delete);
    }

    #[test]
    fn storage_form_is_lower_case() {
        assert_eq!(Method::Post.as_str(), "post");
        assert_eq!(Method::Post.upper(), "POST");
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert!("BREW".parse::<Method>().is_err());
        assert!("".parse::<Method>().is_err());
    }
}
