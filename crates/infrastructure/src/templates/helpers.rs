//! Default template helpers
//!
//! Functions:
//! - `javascript(names=[..])`, `stylesheet(names=[..])`: asset tags
//! - `image(src, alt, class)`: an `<img>` tag resolved through `imagepath`
//! - `icon(name, size)`: a font icon
//! - `year()`: the current year
//!
//! Filters:
//! - `imagepath`, `slugify`, `title`, `first_name`, `pad_left(width, pad)`,
//!   `replace_all(from, to)`, `currency`, `format_date(format)`
//! - `has_value`, `is_blank` for conditionals
//! - `plain_to_html`, `content`, `address`, `json`: HTML output, never re-escaped

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::{Datelike, Utc};
use domain::value_objects::params::parse_timestamp;
use tera::{Filter, Function, Value};
use tracing::warn;

use super::registry::TemplateFunctionRegistry;

type Args = HashMap<String, Value>;

/// Marks a helper's output as HTML so auto-escaping leaves it alone
struct Html<F>(F);

impl<F> Function for Html<F>
where
    F: Fn(&Args) -> tera::Result<Value> + Send + Sync,
{
    fn call(&self, args: &Args) -> tera::Result<Value> {
        (self.0)(args)
    }

    fn is_safe(&self) -> bool {
        true
    }
}

impl<F> Filter for Html<F>
where
    F: Fn(&Value, &Args) -> tera::Result<Value> + Send + Sync,
{
    fn filter(&self, value: &Value, args: &Args) -> tera::Result<Value> {
        (self.0)(value, args)
    }

    fn is_safe(&self) -> bool {
        true
    }
}

/// Register the default helper set
pub(super) fn install(registry: &TemplateFunctionRegistry) {
    let results = [
        registry.register_function("javascript", Html(javascript)),
        registry.register_function("stylesheet", Html(stylesheet)),
        registry.register_function("image", Html(image)),
        registry.register_function("icon", Html(icon)),
        registry.register_function("year", year),
        registry.register_filter("imagepath", imagepath),
        registry.register_filter("plain_to_html", Html(plain_to_html)),
        registry.register_filter("content", Html(content)),
        registry.register_filter("address", Html(address)),
        registry.register_filter("json", Html(json)),
        registry.register_filter("slugify", slugify),
        registry.register_filter("title", title),
        registry.register_filter("first_name", first_name),
        registry.register_filter("pad_left", pad_left),
        registry.register_filter("replace_all", replace_all),
        registry.register_filter("currency", currency),
        registry.register_filter("format_date", format_date),
        registry.register_filter("has_value", has_value),
        registry.register_filter("is_blank", is_blank),
    ];

    for err in results.into_iter().filter_map(Result::err) {
        warn!(error = %err, "Default template helper was not registered");
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn str_arg(args: &Args, key: &str) -> String {
    args.get(key).map(as_text).unwrap_or_default()
}

fn names_arg(args: &Args, helper: &str) -> tera::Result<Vec<String>> {
    match args.get("names").or_else(|| args.get("name")) {
        Some(Value::Array(items)) => Ok(items.iter().map(as_text).collect()),
        Some(Value::String(name)) => Ok(vec![name.clone()]),
        _ => Err(tera::Error::msg(format!(
            "`{helper}` requires a `names` argument"
        ))),
    }
}

fn javascript(args: &Args) -> tera::Result<Value> {
    let tags: String = names_arg(args, "javascript")?
        .iter()
        .map(|name| {
            let src = if name.starts_with("http") {
                format!("{name}.js")
            } else {
                format!("/js/{name}.js")
            };
            format!("<script src='{src}' type='text/javascript'></script>")
        })
        .collect();
    Ok(Value::String(tags))
}

fn stylesheet(args: &Args) -> tera::Result<Value> {
    let tags: String = names_arg(args, "stylesheet")?
        .iter()
        .map(|name| {
            format!("<link rel='stylesheet' href='/css/{name}.css' type='text/css' media='screen' />\n")
        })
        .collect();
    Ok(Value::String(tags))
}

fn image_path(name: &str) -> String {
    if name.starts_with("data:") || name.starts_with('/') {
        name.to_string()
    } else {
        format!("/images/{name}")
    }
}

fn image(args: &Args) -> tera::Result<Value> {
    let src = args
        .get("src")
        .map(as_text)
        .ok_or_else(|| tera::Error::msg("`image` requires a `src` argument"))?;
    Ok(Value::String(format!(
        "<img src='{}' alt='{}' class='{}' />",
        image_path(&src),
        tera::escape_html(&str_arg(args, "alt")),
        tera::escape_html(&str_arg(args, "class")),
    )))
}

fn icon(args: &Args) -> tera::Result<Value> {
    let name = tera::escape_html(&str_arg(args, "name"));
    let size = tera::escape_html(&str_arg(args, "size"));
    Ok(Value::String(format!(
        "<span class=\"icon {size}\"><i class=\"far fa-{name}\"></i></span>"
    )))
}

fn year(_: &Args) -> tera::Result<Value> {
    Ok(Value::from(Utc::now().year()))
}

fn imagepath(value: &Value, _: &Args) -> tera::Result<Value> {
    Ok(Value::String(image_path(&as_text(value))))
}

fn plain_to_html(value: &Value, _: &Args) -> tera::Result<Value> {
    Ok(Value::String(
        tera::escape_html(&as_text(value)).replace('\n', "<br>"),
    ))
}

fn content(value: &Value, _: &Args) -> tera::Result<Value> {
    Ok(Value::String(format!(
        "<div class='content'>{}</div>",
        as_text(value)
    )))
}

fn address(value: &Value, _: &Args) -> tera::Result<Value> {
    let text = as_text(value);
    let lines: Vec<String> = text
        .split(',')
        .map(|part| tera::escape_html(part.trim()))
        .collect();
    Ok(Value::String(lines.join("<br>")))
}

fn json(value: &Value, _: &Args) -> tera::Result<Value> {
    serde_json::to_string(value)
        .map(Value::String)
        .map_err(|e| tera::Error::msg(format!("`json` could not serialize value: {e}")))
}

fn slugify(value: &Value, _: &Args) -> tera::Result<Value> {
    let mut slug = String::new();
    for ch in as_text(value).to_lowercase().chars() {
        if ch.is_alphanumeric() {
            slug.push(ch);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    Ok(Value::String(slug.trim_end_matches('-').to_string()))
}

fn title(value: &Value, _: &Args) -> tera::Result<Value> {
    let text = as_text(value);
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if at_word_start {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = ch.is_whitespace();
    }
    Ok(Value::String(out))
}

fn first_name(value: &Value, _: &Args) -> tera::Result<Value> {
    let text = as_text(value);
    Ok(Value::String(
        text.split(' ').next().unwrap_or_default().to_string(),
    ))
}

/// Widest result `pad_left` produces
const MAX_PAD_WIDTH: usize = 256;

fn pad_left(value: &Value, args: &Args) -> tera::Result<Value> {
    let width = args
        .get("width")
        .and_then(Value::as_u64)
        .ok_or_else(|| tera::Error::msg("`pad_left` requires a numeric `width` argument"))?;
    let pad = args
        .get("pad")
        .map(as_text)
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "0".to_string());

    let mut text = as_text(value);
    let width = usize::try_from(width).map_or(MAX_PAD_WIDTH, |w| w.min(MAX_PAD_WIDTH));
    while text.chars().count() < width {
        text.insert_str(0, &pad);
    }
    Ok(Value::String(text))
}

fn replace_all(value: &Value, args: &Args) -> tera::Result<Value> {
    let from = args
        .get("from")
        .map(as_text)
        .ok_or_else(|| tera::Error::msg("`replace_all` requires a `from` argument"))?;
    let to = str_arg(args, "to");
    Ok(Value::String(as_text(value).replace(&from, &to)))
}

/// Format an amount as dollars with thousands separators and two decimals
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let digits = (cents / 100).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

fn currency(value: &Value, _: &Args) -> tera::Result<Value> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| tera::Error::msg("`currency` requires a number"))?;
    Ok(Value::String(format_currency(amount)))
}

fn format_date(value: &Value, args: &Args) -> tera::Result<Value> {
    let format = args
        .get("format")
        .map(as_text)
        .unwrap_or_else(|| "%Y-%m-%d".to_string());
    let timestamp = parse_timestamp("format_date", &as_text(value))
        .map_err(|e| tera::Error::msg(e.to_string()))?;

    let mut out = String::new();
    write!(out, "{}", timestamp.format(&format))
        .map_err(|_| tera::Error::msg(format!("`format_date` got an invalid format: {format}")))?;
    Ok(Value::String(out))
}

fn has_value(value: &Value, _: &Args) -> tera::Result<Value> {
    Ok(Value::Bool(match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }))
}

fn is_blank(value: &Value, _: &Args) -> tera::Result<Value> {
    Ok(Value::Bool(match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tera::{Context, Tera};

    fn args(pairs: &[(&str, Value)]) -> Args {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn s(value: &str) -> Value {
        Value::String(value.to_string())
    }

    fn render(source: &str, ctx: &Context) -> String {
        let registry = TemplateFunctionRegistry::with_defaults();
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);
        registry.install_into(&mut tera);
        tera.add_raw_template("page.html", source).unwrap();
        tera.render("page.html", ctx).unwrap()
    }

    #[test]
    fn javascript_tags() {
        let out = javascript(&args(&[(
            "names",
            serde_json::json!(["app", "https://cdn.example.com/lib"]),
        )]))
        .unwrap();
        assert_eq!(
            out,
            s("<script src='/js/app.js' type='text/javascript'></script>\
               <script src='https://cdn.example.com/lib.js' type='text/javascript'></script>")
        );
    }

    #[test]
    fn javascript_requires_names() {
        assert!(javascript(&Args::new()).is_err());
    }

    #[test]
    fn stylesheet_tag() {
        let out = stylesheet(&args(&[("name", s("site"))])).unwrap();
        assert!(out.as_str().unwrap().contains("href='/css/site.css'"));
    }

    #[test]
    fn image_paths() {
        assert_eq!(image_path("logo.png"), "/images/logo.png");
        assert_eq!(image_path("/attachments/a.png"), "/attachments/a.png");
        assert_eq!(image_path("data:image/png;base64,AA"), "data:image/png;base64,AA");
    }

    #[test]
    fn image_escapes_attributes() {
        let out = image(&args(&[("src", s("a.png")), ("alt", s("x' onload='y"))])).unwrap();
        assert_eq!(
            out,
            s("<img src='/images/a.png' alt='x&#x27; onload=&#x27;y' class='' />")
        );
    }

    #[test]
    fn plain_text_to_html_escapes_then_breaks_lines() {
        let out = plain_to_html(&s("a < b\nc"), &Args::new()).unwrap();
        assert_eq!(out, s("a &lt; b<br>c"));
    }

    #[test]
    fn address_lines() {
        let out = address(&s("1 Main St, Springfield, USA"), &Args::new()).unwrap();
        assert_eq!(out, s("1 Main St<br>Springfield<br>USA"));
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify(&s("Hello, World!"), &Args::new()).unwrap(), s("hello-world"));
        assert_eq!(slugify(&s("  Already-slugged  "), &Args::new()).unwrap(), s("already-slugged"));
    }

    #[test]
    fn title_case_keeps_the_rest() {
        assert_eq!(title(&s("hello wORLD"), &Args::new()).unwrap(), s("Hello WORLD"));
    }

    #[test]
    fn first_names() {
        assert_eq!(first_name(&s("Ada Lovelace"), &Args::new()).unwrap(), s("Ada"));
        assert_eq!(first_name(&s(""), &Args::new()).unwrap(), s(""));
    }

    #[test]
    fn padding() {
        let out = pad_left(&Value::from(7), &args(&[("width", Value::from(3))])).unwrap();
        assert_eq!(out, s("007"));
        let out = pad_left(&s("abcd"), &args(&[("width", Value::from(2))])).unwrap();
        assert_eq!(out, s("abcd"));
        assert!(pad_left(&s("x"), &Args::new()).is_err());
    }

    #[test]
    fn padding_width_is_capped() {
        let out = pad_left(&s("x"), &args(&[("width", Value::from(u64::MAX))])).unwrap();
        assert_eq!(out.as_str().unwrap().chars().count(), MAX_PAD_WIDTH);
    }

    #[test]
    fn replacing() {
        let out = replace_all(&s("a-b-c"), &args(&[("from", s("-")), ("to", s("+"))])).unwrap();
        assert_eq!(out, s("a+b+c"));
    }

    #[test]
    fn currency_formatting() {
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(-1000.0), "-$1,000.00");
        assert_eq!(format_currency(999_999.99), "$999,999.99");
        assert!(currency(&s("nope"), &Args::new()).is_err());
    }

    #[test]
    fn dates() {
        let out = format_date(
            &s("2024-03-05T10:30:00+00:00"),
            &args(&[("format", s("%d/%m/%Y"))]),
        )
        .unwrap();
        assert_eq!(out, s("05/03/2024"));
        assert!(format_date(&s("yesterday"), &Args::new()).is_err());
    }

    #[test]
    fn blankness() {
        assert_eq!(has_value(&Value::Null, &Args::new()).unwrap(), Value::Bool(false));
        assert_eq!(has_value(&s(""), &Args::new()).unwrap(), Value::Bool(false));
        assert_eq!(has_value(&Value::from(0), &Args::new()).unwrap(), Value::Bool(true));
        assert_eq!(is_blank(&s(""), &Args::new()).unwrap(), Value::Bool(true));
        assert_eq!(is_blank(&s("x"), &Args::new()).unwrap(), Value::Bool(false));
    }

    #[test]
    fn html_helpers_are_not_escaped_again() {
        let mut ctx = Context::new();
        ctx.insert("notes", "line one\nline two");
        ctx.insert("name", "<b>");
        let out = render("{{ notes | plain_to_html }}|{{ name }}", &ctx);
        assert_eq!(out, "line one<br>line two|&lt;b&gt;");
    }

    #[test]
    fn json_is_embedded_raw() {
        let mut ctx = Context::new();
        ctx.insert("data", &serde_json::json!({"a": 1}));
        assert_eq!(render("{{ data | json }}", &ctx), r#"{"a":1}"#);
    }
}
