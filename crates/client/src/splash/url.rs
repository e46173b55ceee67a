//! Splash endpoint URL construction.
//!
//! `/execute` takes every argument in the query string:
//!
//! - `url`: target page (trimmed)
//! - `timeout`, `resource_timeout`: integer seconds
//! - `wait`: seconds with one decimal
//! - `cookies`: raw `Cookie` header value
//! - `formdata`: Lua table literal, `{}` when empty
//! - `headers`: Lua table literal, only when custom headers are set
//! - `lua_source`: the script, chosen by [`script_for`]

use std::collections::BTreeMap;

use splashkit_core::{Error, FetchRequest, SplashConfig};
use url::Url;

use super::scripts::script_for;

/// Base URL of the Splash service, `http://<host>/`.
pub fn base_url(config: &SplashConfig) -> Result<Url, Error> {
    let host = config.host.trim().trim_end_matches('/');
    if host.is_empty() {
        return Err(Error::InvalidUrl("empty Splash host".into()));
    }
    Url::parse(&format!("http://{host}/")).map_err(|e| Error::InvalidUrl(format!("splash host {host:?}: {e}")))
}

/// URL of a Splash endpoint such as `_gc` or `_ping`.
pub fn endpoint_url(config: &SplashConfig, endpoint: &str) -> Result<Url, Error> {
    base_url(config)?
        .join(endpoint)
        .map_err(|e| Error::InvalidUrl(e.to_string()))
}

/// Full `/execute` URL for one fetch.
pub fn execute_url(config: &SplashConfig, req: &FetchRequest) -> Result<Url, Error> {
    let target = req.url.trim();
    if target.is_empty() {
        return Err(Error::InvalidUrl("empty target URL".into()));
    }

    let mut url = endpoint_url(config, "execute")?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("url", target)
            .append_pair("timeout", &config.timeout.to_string())
            .append_pair("resource_timeout", &config.resource_timeout.to_string())
            .append_pair("wait", &format!("{:.1}", config.wait))
            .append_pair("cookies", &req.cookies)
            .append_pair("formdata", &lua_table(&req.form_params));
        if let Some(headers) = &req.headers {
            query.append_pair("headers", &lua_table(headers));
        }
        query.append_pair("lua_source", script_for(target));
    }
    Ok(url)
}

/// Render a string map as a Lua table literal: `{["k"]="v",...}`.
pub fn lua_table(params: &BTreeMap<String, String>) -> String {
    let fields: Vec<String> =
        params.iter().map(|(k, v)| format!("[{}]={}", lua_string(k), lua_string(v))).collect();
    format!("{{{}}}", fields.join(","))
}

fn lua_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\000"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splash::scripts::{BASE_SCRIPT, ROBOTS_SCRIPT};

    fn query(url: &Url) -> BTreeMap<String, String> {
        url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect()
    }

    #[test]
    fn test_execute_url_parameters() {
        let config =
            SplashConfig { host: "splash:8050".into(), timeout: 60, resource_timeout: 10, wait: 2.0, ..Default::default() };
        let req = FetchRequest::new("https://example.com/page?q=1&r=2").with_cookies("a=1; b=2");

        let url = execute_url(&config, &req).unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.host_str(), Some("splash"));
        assert_eq!(url.port(), Some(8050));
        assert_eq!(url.path(), "/execute");

        let q = query(&url);
        assert_eq!(q["url"], "https://example.com/page?q=1&r=2");
        assert_eq!(q["timeout"], "60");
        assert_eq!(q["resource_timeout"], "10");
        assert_eq!(q["wait"], "2.0");
        assert_eq!(q["cookies"], "a=1; b=2");
        assert_eq!(q["formdata"], "{}");
        assert_eq!(q["lua_source"], BASE_SCRIPT);
        assert!(!q.contains_key("headers"));
    }

    #[test]
    fn test_execute_url_wait_one_decimal() {
        let config = SplashConfig { wait: 1.26, ..Default::default() };
        let url = execute_url(&config, &FetchRequest::new("https://example.com")).unwrap();
        assert_eq!(query(&url)["wait"], "1.3");
    }

    #[test]
    fn test_execute_url_robots_script() {
        let url = execute_url(&SplashConfig::default(), &FetchRequest::new("https://example.com/robots.txt")).unwrap();
        assert_eq!(query(&url)["lua_source"], ROBOTS_SCRIPT);
    }

    #[test]
    fn test_execute_url_form_and_headers() {
        let req = FetchRequest::new("https://example.com/login")
            .with_form_param("user", "me")
            .with_form_param("pass", "p&w=\"1\"")
            .with_header("Referer", "https://example.com/");
        let url = execute_url(&SplashConfig::default(), &req).unwrap();
        let q = query(&url);
        assert_eq!(q["formdata"], r#"{["pass"]="p&w=\"1\"",["user"]="me"}"#);
        assert_eq!(q["headers"], r#"{["Referer"]="https://example.com/"}"#);
    }

    #[test]
    fn test_execute_url_empty_target() {
        let result = execute_url(&SplashConfig::default(), &FetchRequest::new("  "));
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_endpoint_urls() {
        let config = SplashConfig { host: "localhost:8050/".into(), ..Default::default() };
        assert_eq!(endpoint_url(&config, "_gc").unwrap().as_str(), "http://localhost:8050/_gc");
        assert_eq!(endpoint_url(&config, "_ping").unwrap().as_str(), "http://localhost:8050/_ping");
    }

    #[test]
    fn test_lua_string_escaping() {
        assert_eq!(lua_string("a\\b\n\"c\""), r#""a\\b\n\"c\"""#);
    }

    #[test]
    fn test_lua_string_nul_before_digit() {
        // `\01` would read back as byte 0x01.
        assert_eq!(lua_string("\u{0}1"), r#""\0001""#);
        assert_eq!(lua_string("a\u{0}"), r#""a\000""#);
    }
}
