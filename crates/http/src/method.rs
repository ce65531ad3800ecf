use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// HTTP methods issued by the helper verbs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Issued by `get` / `get_response`
    #[default]
    Get,
    /// Issued by `post` / `post_response`
    Post,
    /// Issued by `put` / `put_response`
    Put,
    /// Issued by `del` / `del_response`
    Delete,
}

impl Method {
    /// Whether a 3xx answer to this method is followed. Only GET is, so
    /// the other verbs never reach a redirect target under a rewritten method.
    pub fn follows_redirects(&self) -> bool {
        match self {
            Self::Get => true,
            Self::Post | Self::Put | Self::Delete => false,
        }
    }

    /// Returns the string representation of the method in uppercase
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Name of the helper verb that forces this method
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "del",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}

impl core::str::FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" | "DEL" => Ok(Self::Delete),
            _ => Err(format!("Unknown HTTP method: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_uppercase() {
        assert_eq!(Method::Delete.to_string(), "DELETE");
        assert_eq!(Method::Get.as_ref(), "GET");
    }

    #[test]
    fn parses_verb_names() {
        assert_eq!("del".parse::<Method>().unwrap(), Method::Delete);
        assert_eq!("post".parse::<Method>().unwrap(), Method::Post);
        assert!("patch".parse::<Method>().is_err());
    }

    #[test]
    fn only_get_follows_redirects() {
        assert!(Method::Get.follows_redirects());
        assert!(!Method::Post.follows_redirects());
        assert!(!Method::Put.follows_redirects());
        assert!(!Method::Delete.follows_redirects());
    }

    #[test]
    fn converts_to_reqwest() {
        assert_eq!(reqwest::Method::from(Method::Put), reqwest::Method::PUT);
    }
}
