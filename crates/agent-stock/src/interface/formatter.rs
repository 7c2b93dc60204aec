//! Rendering of quotes and news lists

use crate::api::{NewsArticle, Quote};
use crate::error::{Result, StockError};
use minijinja::{Environment, context};
use std::str::FromStr;

const NEWS_HTML: &str = r#"{% for a in articles %}<div><b>{{ a.title }}</b> - <a href="{{ a.url }}" target="_blank">{{ a.source }}</a></div>{% endfor %}"#;

const NEWS_TEXT: &str = "{% for a in articles %}• {{ a.title }} - {{ a.source }}\n  {{ a.url }}{% if not loop.last %}\n{% endif %}{% endfor %}";

/// Output flavor for rendered step content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Markup for an embedding page
    Html,
    /// Plain lines for a terminal
    #[default]
    Text,
}

impl FromStr for OutputFormat {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "text" | "plain" => Ok(Self::Text),
            other => Err(StockError::ConfigError(format!("unknown output format: {other}"))),
        }
    }
}

pub trait Formatter: Send + Sync {
    fn output_format(&self) -> OutputFormat;

    /// One-line quote summary, e.g. `ACME: $100.00 (+10.00, 11.11%)`
    fn format_quote(&self, quote: &Quote) -> String {
        let percent = quote
            .change_percent
            .map_or_else(|| "n/a".to_string(), |p| format!("{p:.2}%"));
        format!(
            "{}: ${:.2} ({:+.2}, {})",
            quote.symbol, quote.price, quote.change, percent
        )
    }

    fn format_news(&self, articles: &[NewsArticle]) -> Result<String>;
}

fn template_env(name: &'static str, source: &'static str) -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_template(name, source)?;
    Ok(env)
}

/// Renders news as escaped HTML fragments
pub struct HtmlFormatter {
    env: Environment<'static>,
}

impl HtmlFormatter {
    pub fn new() -> Result<Self> {
        // `.html` names get HTML auto-escaping
        Ok(Self {
            env: template_env("news.html", NEWS_HTML)?,
        })
    }
}

impl Formatter for HtmlFormatter {
    fn output_format(&self) -> OutputFormat {
        OutputFormat::Html
    }

    fn format_news(&self, articles: &[NewsArticle]) -> Result<String> {
        Ok(self
            .env
            .get_template("news.html")?
            .render(context! { articles })?)
    }
}

pub struct TextFormatter {
    env: Environment<'static>,
}

impl TextFormatter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            env: template_env("news.txt", NEWS_TEXT)?,
        })
    }
}

impl Formatter for TextFormatter {
    fn output_format(&self) -> OutputFormat {
        OutputFormat::Text
    }

    fn format_news(&self, articles: &[NewsArticle]) -> Result<String> {
        Ok(self
            .env
            .get_template("news.txt")?
            .render(context! { articles })?)
    }
}

pub struct FormatterFactory;

impl FormatterFactory {
    pub fn create(format: OutputFormat) -> Result<Box<dyn Formatter>> {
        Ok(match format {
            OutputFormat::Html => Box::new(HtmlFormatter::new()?),
            OutputFormat::Text => Box::new(TextFormatter::new()?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str) -> NewsArticle {
        NewsArticle {
            title: title.to_string(),
            url: "https://example.com/a".to_string(),
            source: "example.com".to_string(),
            published_at: "2024-05-01T10:00:00Z".to_string(),
            description: "No summary available".to_string(),
        }
    }

    #[test]
    fn test_format_quote() {
        let formatter = TextFormatter::new().unwrap();

        let up = Quote::new("ACME", 100.0, 90.0, None, None, None);
        assert_eq!(formatter.format_quote(&up), "ACME: $100.00 (+10.00, 11.11%)");

        let down = Quote::new("ACME", 90.0, 100.0, None, None, None);
        assert_eq!(formatter.format_quote(&down), "ACME: $90.00 (-10.00, -10.00%)");

        let flat = Quote::new("NEW", 5.0, 0.0, None, None, None);
        assert_eq!(formatter.format_quote(&flat), "NEW: $5.00 (+5.00, n/a)");
    }

    #[test]
    fn test_html_news_is_escaped() {
        let formatter = HtmlFormatter::new().unwrap();
        let html = formatter
            .format_news(&[article("ACME soars"), article("<script>x</script>")])
            .unwrap();

        assert!(html.starts_with("<div><b>ACME soars</b> - <a href=\""));
        assert!(html.contains("target=\"_blank\">example.com</a></div>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert_eq!(html.matches("<div>").count(), 2);
    }

    #[test]
    fn test_text_news() {
        let formatter = TextFormatter::new().unwrap();
        let text = formatter.format_news(&[article("ACME soars")]).unwrap();
        assert_eq!(text, "• ACME soars - example.com\n  https://example.com/a");
    }

    #[test]
    fn test_factory() {
        assert_eq!(
            FormatterFactory::create(OutputFormat::Html).unwrap().output_format(),
            OutputFormat::Html
        );
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("pdf".parse::<OutputFormat>().is_err());
    }
}
