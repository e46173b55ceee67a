//! Lua scripts run by Splash's `/execute` endpoint.
//!
//! Both scripts return the same JSON shape: `html`, plus `request` and
//! `response` from the last `splash:history()` entry, or `error` when
//! navigation fails. Splash error reasons (`http404`, `network3`, ...) pass
//! through unchanged.
//!
//! `formdata` and `headers` arrive as Lua table literals and are evaluated with
//! `loadstring`, which needs Splash started with `--disable-lua-sandbox` when
//! either is non-empty.

/// Full render: cookies, custom headers and optional form submission, then
/// wait for the page to settle.
pub const BASE_SCRIPT: &str = r#"
local function table_arg(value)
  if value == nil or value == "" or value == "{}" then
    return nil
  end
  return assert(loadstring("return " .. value))()
end

function main(splash, args)
  local headers = table_arg(args.headers) or {}
  if args.cookies ~= nil and args.cookies ~= "" then
    headers["Cookie"] = args.cookies
  end

  local formdata = table_arg(args.formdata)
  local ok, reason
  if formdata then
    ok, reason = splash:go{args.url, headers = headers, http_method = "POST", formdata = formdata}
  else
    ok, reason = splash:go{args.url, headers = headers}
  end
  if not ok then
    return {error = reason}
  end

  splash:wait(tonumber(args.wait) or 0.5)

  local entries = splash:history()
  local last = entries[#entries]
  return {
    html = splash:html(),
    request = last and last.request,
    response = last and last.response,
  }
end
"#;

/// robots.txt: no rendering, keep the raw body (base64 in `response.content.text`).
pub const ROBOTS_SCRIPT: &str = r#"
function main(splash, args)
  splash.response_body_enabled = true
  local ok, reason = splash:go(args.url)
  if not ok then
    return {error = reason}
  end

  local entries = splash:history()
  local last = entries[#entries]
  return {
    html = splash:html(),
    request = last and last.request,
    response = last and last.response,
  }
end
"#;

/// Script for a target URL.
pub fn script_for(url: &str) -> &'static str {
    if splashkit_core::request::is_robots_txt(url) { ROBOTS_SCRIPT } else { BASE_SCRIPT }
}
